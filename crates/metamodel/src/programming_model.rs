//! Programming model: the ordered facet factories, validators and
//! post-processors the loader applies
//!
//! Elements carry markers; [`ProgrammingModelInitFilter`] decides at
//! `init` which markers are admitted.

use crate::facets::factories::{
    ChoicesFacetFactory, DefaultedFacetFactory, DisabledFacetFactory, HiddenFacetFactory,
    LogicalTypeFacetFactory, MandatoryFacetFactory, MaxLengthFacetFactory, MixinFacetFactory,
    ObjectValidateFacetFactory, TitleFacetFactory, ValidateFacetFactory,
};
use crate::facets::{DisabledFacet, FacetFactory};
use crate::spec::members::{ObjectAction, OneToManyAssociation, OneToOneAssociation};
use crate::spec::ObjectSpecification;
use crate::validation::validators::{
    LogicalTypeNameUniquenessValidator, MixinWellFormednessValidator,
    OrphanedSupportingMethodValidator,
};
use crate::validation::MetaModelValidator;
use parking_lot::RwLock;
use std::sync::Arc;

/// Marker on a programming model element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Scheduled for removal
    Deprecated,
    /// Not yet stable
    Incubating,
}

/// Which marked elements `init` admits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgrammingModelInitFilter {
    /// Admit deprecated elements
    pub include_deprecated: bool,
    /// Admit incubating elements
    pub include_incubating: bool,
}

impl Default for ProgrammingModelInitFilter {
    fn default() -> Self {
        Self {
            include_deprecated: true,
            include_incubating: false,
        }
    }
}

impl ProgrammingModelInitFilter {
    /// True if an element with `markers` is admitted
    pub fn admits(&self, markers: &[Marker]) -> bool {
        markers.iter().all(|m| match m {
            Marker::Deprecated => self.include_deprecated,
            Marker::Incubating => self.include_incubating,
        })
    }
}

/// Refines members after all factories have run
pub trait PostProcessor: Send + Sync {
    /// Name, for diagnostics
    fn name(&self) -> &'static str;

    /// Refine a property
    fn process_property(&self, _spec: &ObjectSpecification, _property: &mut OneToOneAssociation) {}

    /// Refine a collection
    fn process_collection(
        &self,
        _spec: &ObjectSpecification,
        _collection: &mut OneToManyAssociation,
    ) {
    }

    /// Refine an action
    fn process_action(&self, _spec: &ObjectSpecification, _action: &mut ObjectAction) {}
}

/// Disables properties that cannot be written
#[derive(Debug, Default)]
pub struct ImmutablePropertyPostProcessor;

impl PostProcessor for ImmutablePropertyPostProcessor {
    fn name(&self) -> &'static str {
        "ImmutablePropertyPostProcessor"
    }

    fn process_property(&self, _spec: &ObjectSpecification, property: &mut OneToOneAssociation) {
        if !property.has_setter() && !property.facets().contains("DisabledFacet") {
            property.facets_mut().add(DisabledFacet::new("Immutable property"));
        }
    }
}

/// Supplies the pluggable parts of introspection and validation
pub trait ProgrammingModel: Send + Sync {
    /// Apply `filter`; called once per metamodel creation
    fn init(&self, filter: ProgrammingModelInitFilter);

    /// Facet factories, in application order
    fn factories(&self) -> Vec<Arc<dyn FacetFactory>>;

    /// Metamodel validators
    fn validators(&self) -> Vec<Arc<dyn MetaModelValidator>>;

    /// Member post-processors, in application order
    fn post_processors(&self) -> Vec<Arc<dyn PostProcessor>>;
}

struct Element<T: ?Sized> {
    markers: Vec<Marker>,
    item: Arc<T>,
}

impl<T: ?Sized> Clone for Element<T> {
    fn clone(&self) -> Self {
        Self {
            markers: self.markers.clone(),
            item: Arc::clone(&self.item),
        }
    }
}

/// The built-in programming model
pub struct DefaultProgrammingModel {
    filter: RwLock<ProgrammingModelInitFilter>,
    factories: Vec<Element<dyn FacetFactory>>,
    validators: Vec<Element<dyn MetaModelValidator>>,
    post_processors: Vec<Element<dyn PostProcessor>>,
}

impl DefaultProgrammingModel {
    /// Built-in factories, validators and post-processors
    pub fn new() -> Self {
        Self::empty()
            .with_factory(Arc::new(LogicalTypeFacetFactory))
            .with_factory(Arc::new(MixinFacetFactory))
            .with_factory(Arc::new(TitleFacetFactory))
            .with_factory(Arc::new(ObjectValidateFacetFactory))
            .with_factory(Arc::new(HiddenFacetFactory))
            .with_factory(Arc::new(DisabledFacetFactory))
            .with_factory(Arc::new(MandatoryFacetFactory))
            .with_factory(Arc::new(MaxLengthFacetFactory))
            .with_factory(Arc::new(ValidateFacetFactory))
            .with_factory(Arc::new(DefaultedFacetFactory))
            .with_factory(Arc::new(ChoicesFacetFactory))
            .with_validator(Arc::new(LogicalTypeNameUniquenessValidator))
            .with_validator(Arc::new(OrphanedSupportingMethodValidator))
            .with_validator(Arc::new(MixinWellFormednessValidator))
            .with_post_processor(Arc::new(ImmutablePropertyPostProcessor))
    }

    /// No elements at all
    pub fn empty() -> Self {
        Self {
            filter: RwLock::new(ProgrammingModelInitFilter::default()),
            factories: Vec::new(),
            validators: Vec::new(),
            post_processors: Vec::new(),
        }
    }

    /// Append a facet factory
    pub fn with_factory(self, factory: Arc<dyn FacetFactory>) -> Self {
        self.with_marked_factory(factory, &[])
    }

    /// Append a marked facet factory
    pub fn with_marked_factory(mut self, factory: Arc<dyn FacetFactory>, markers: &[Marker]) -> Self {
        self.factories.push(Element {
            markers: markers.to_vec(),
            item: factory,
        });
        self
    }

    /// Append a validator
    pub fn with_validator(self, validator: Arc<dyn MetaModelValidator>) -> Self {
        self.with_marked_validator(validator, &[])
    }

    /// Append a marked validator
    pub fn with_marked_validator(
        mut self,
        validator: Arc<dyn MetaModelValidator>,
        markers: &[Marker],
    ) -> Self {
        self.validators.push(Element {
            markers: markers.to_vec(),
            item: validator,
        });
        self
    }

    /// Append a post-processor
    pub fn with_post_processor(mut self, post_processor: Arc<dyn PostProcessor>) -> Self {
        self.post_processors.push(Element {
            markers: Vec::new(),
            item: post_processor,
        });
        self
    }

    fn admitted<T: ?Sized>(&self, elements: &[Element<T>]) -> Vec<Arc<T>> {
        let filter = *self.filter.read();
        elements
            .iter()
            .filter(|e| filter.admits(&e.markers))
            .map(|e| Arc::clone(&e.item))
            .collect()
    }
}

impl Default for DefaultProgrammingModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgrammingModel for DefaultProgrammingModel {
    fn init(&self, filter: ProgrammingModelInitFilter) {
        *self.filter.write() = filter;
    }

    fn factories(&self) -> Vec<Arc<dyn FacetFactory>> {
        self.admitted(&self.factories)
    }

    fn validators(&self) -> Vec<Arc<dyn MetaModelValidator>> {
        self.admitted(&self.validators)
    }

    fn post_processors(&self) -> Vec<Arc<dyn PostProcessor>> {
        self.admitted(&self.post_processors)
    }
}
