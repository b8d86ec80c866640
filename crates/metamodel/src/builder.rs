//! Metamodel builder
//!
//! Assembles a [`SpecificationLoaderDefault`] from a class path and optional
//! replacements for each collaborator.
//!
//! ```ignore
//! let loader = MetamodelBuilder::new(class_path)
//!     .config(MetamodelConfig::from_file(path)?)
//!     .build()?;
//! ```
//!
//! `open()` returns the loader without creating the metamodel; `build()`
//! also creates it and fails if validation found problems.

use crate::bean_types::{
    CausewayBeanTypeClassifier, CausewayBeanTypeClassifierDefault, CausewayBeanTypeRegistry,
    CausewayBeanTypeRegistryDefault,
};
use crate::config::MetamodelConfig;
use crate::loader::default::LoaderParts;
use crate::loader::{SpecificationLoader, SpecificationLoaderDefault};
use crate::menubars::{MenuBarsService, MenuBarsServiceDefault};
use crate::programming_model::{
    DefaultProgrammingModel, ProgrammingModel, ProgrammingModelInitFilter,
};
use crate::substitutor::{ClassSubstitutor, ClassSubstitutorDefault, ClassSubstitutorRegistry};
use crate::value_semantics::{ValueSemanticsResolver, ValueSemanticsResolverDefault};
use causeway_core::{Class, ClassPath, MetamodelResult};
use std::sync::Arc;

/// Builder for a specification loader
pub struct MetamodelBuilder {
    class_path: Arc<ClassPath>,
    config: MetamodelConfig,
    programming_model: Option<Arc<dyn ProgrammingModel>>,
    init_filter: ProgrammingModelInitFilter,
    substitutors: Vec<Arc<dyn ClassSubstitutor>>,
    classifier: Option<Arc<dyn CausewayBeanTypeClassifier>>,
    bean_types: Option<Arc<dyn CausewayBeanTypeRegistry>>,
    value_semantics: Option<Arc<dyn ValueSemanticsResolver>>,
    menu_bars: Option<Arc<dyn MenuBarsService>>,
    additional_types: Vec<Class>,
}

impl MetamodelBuilder {
    /// Builder over `class_path` with default collaborators
    pub fn new(class_path: Arc<ClassPath>) -> Self {
        Self {
            class_path,
            config: MetamodelConfig::default(),
            programming_model: None,
            init_filter: ProgrammingModelInitFilter::default(),
            substitutors: Vec::new(),
            classifier: None,
            bean_types: None,
            value_semantics: None,
            menu_bars: None,
            additional_types: Vec::new(),
        }
    }

    /// Builder over a fresh class path holding `classes`
    pub fn with_classes(classes: impl IntoIterator<Item = Class>) -> Self {
        Self::new(Arc::new(ClassPath::with_classes(classes)))
    }

    /// Use `config`
    pub fn config(mut self, config: MetamodelConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the programming model
    pub fn programming_model(mut self, model: Arc<dyn ProgrammingModel>) -> Self {
        self.programming_model = Some(model);
        self
    }

    /// Filter applied to the programming model at creation
    pub fn init_filter(mut self, filter: ProgrammingModelInitFilter) -> Self {
        self.init_filter = filter;
        self
    }

    /// Add a substitutor, consulted before the default one
    pub fn substitutor(mut self, substitutor: Arc<dyn ClassSubstitutor>) -> Self {
        self.substitutors.push(substitutor);
        self
    }

    /// Replace the bean type classifier
    pub fn classifier(mut self, classifier: Arc<dyn CausewayBeanTypeClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Replace the bean type registry
    pub fn bean_type_registry(mut self, registry: Arc<dyn CausewayBeanTypeRegistry>) -> Self {
        self.bean_types = Some(registry);
        self
    }

    /// Replace the value semantics resolver
    pub fn value_semantics(mut self, resolver: Arc<dyn ValueSemanticsResolver>) -> Self {
        self.value_semantics = Some(resolver);
        self
    }

    /// Replace the menu bars service
    pub fn menu_bars(mut self, service: Arc<dyn MenuBarsService>) -> Self {
        self.menu_bars = Some(service);
        self
    }

    /// Prime `class` at creation even if the scan would not find it
    pub fn add_type(mut self, class: Class) -> Self {
        self.additional_types.push(class);
        self
    }

    /// The loader, metamodel not yet created
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the config is invalid.
    pub fn open(self) -> MetamodelResult<Arc<SpecificationLoaderDefault>> {
        self.config.validate()?;

        let value_semantics = self.value_semantics.unwrap_or_else(|| {
            Arc::new(ValueSemanticsResolverDefault::new(Arc::clone(&self.class_path)))
        });
        let classifier = self.classifier.unwrap_or_else(|| {
            Arc::new(CausewayBeanTypeClassifierDefault::new(Arc::clone(&value_semantics)))
        });
        let bean_types = self.bean_types.unwrap_or_else(|| {
            Arc::new(CausewayBeanTypeRegistryDefault::new(
                Arc::clone(&self.class_path),
                Arc::clone(&classifier),
            ))
        });
        let mut substitutors = self.substitutors;
        substitutors.push(Arc::new(ClassSubstitutorDefault));

        Ok(SpecificationLoaderDefault::new(LoaderParts {
            config: self.config,
            class_path: self.class_path,
            programming_model: self
                .programming_model
                .unwrap_or_else(|| Arc::new(DefaultProgrammingModel::new())),
            init_filter: self.init_filter,
            substitutors: ClassSubstitutorRegistry::new(substitutors),
            classifier,
            bean_types,
            value_semantics,
            menu_bars: self
                .menu_bars
                .unwrap_or_else(|| Arc::new(MenuBarsServiceDefault::new())),
            additional_types: self.additional_types,
        }))
    }

    /// The loader with its metamodel created and validated
    ///
    /// # Errors
    ///
    /// Returns an error if introspection fails, or an aggregate validation
    /// error listing every failure.
    pub fn build(self) -> MetamodelResult<Arc<SpecificationLoaderDefault>> {
        let loader = self.open()?;
        loader.create_meta_model()?;
        loader.get_or_assess_validation_result()?.to_result()?;
        Ok(loader)
    }
}
