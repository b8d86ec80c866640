//! Built-in validators

use super::{MetaModelValidator, ValidationFailures};
use crate::loader::SpecificationLoader;
use causeway_core::{IntrospectionState, MetamodelResult, MixinContribution};
use std::collections::BTreeMap;

/// Each logical type name (or alias) maps to exactly one concrete class
#[derive(Debug, Default)]
pub struct LogicalTypeNameUniquenessValidator;

impl MetaModelValidator for LogicalTypeNameUniquenessValidator {
    fn name(&self) -> &'static str {
        "LogicalTypeNameUniquenessValidator"
    }

    fn validate(
        &self,
        loader: &dyn SpecificationLoader,
        failures: &mut ValidationFailures,
    ) -> MetamodelResult<()> {
        let mut by_name: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for spec in loader.snapshot_specifications() {
            let class = spec.class();
            if class.is_abstract() || !class.has_type_identity() {
                continue;
            }
            let names = std::iter::once(spec.logical_type_name().to_string())
                .chain(spec.aliases().iter().cloned());
            for name in names {
                let classes = by_name.entry(name).or_default();
                if !classes.iter().any(|c| c == class.name()) {
                    classes.push(class.name().to_string());
                }
            }
        }
        for (name, mut classes) in by_name {
            if classes.len() < 2 {
                continue;
            }
            classes.sort();
            let message = format!(
                "Logical type name '{}' mapped to multiple non-abstract classes: {}",
                name,
                classes.join(", ")
            );
            for class in classes {
                failures.add(class, message.clone());
            }
        }
        Ok(())
    }
}

/// Every supporting method (`hideX`, `validate0X`, ...) supports some member
#[derive(Debug, Default)]
pub struct OrphanedSupportingMethodValidator;

impl MetaModelValidator for OrphanedSupportingMethodValidator {
    fn name(&self) -> &'static str {
        "OrphanedSupportingMethodValidator"
    }

    fn validate(
        &self,
        loader: &dyn SpecificationLoader,
        failures: &mut ValidationFailures,
    ) -> MetamodelResult<()> {
        for spec in loader.snapshot_specifications() {
            if spec.introspection_state() != IntrospectionState::FullyIntrospected {
                continue;
            }
            for method in spec.orphaned_supporting_methods() {
                failures.add(
                    format!("{}#{}", spec.logical_type_name(), method),
                    format!(
                        "Supporting method '{}' does not match any member of {}",
                        method,
                        spec.class()
                    ),
                );
            }
        }
        Ok(())
    }
}

/// Mixins name an existing mixee and a main method fitting their contribution
#[derive(Debug, Default)]
pub struct MixinWellFormednessValidator;

impl MetaModelValidator for MixinWellFormednessValidator {
    fn name(&self) -> &'static str {
        "MixinWellFormednessValidator"
    }

    fn validate(
        &self,
        loader: &dyn SpecificationLoader,
        failures: &mut ValidationFailures,
    ) -> MetamodelResult<()> {
        for spec in loader.snapshot_specifications() {
            let Some(mixin) = spec.mixin_facet() else {
                continue;
            };
            let origin = spec.logical_type_name().to_string();
            if loader.class_path().lookup(mixin.mixee()).is_none() {
                failures.add(
                    origin.clone(),
                    format!("Mixin's mixee class '{}' is not on the class path", mixin.mixee()),
                );
            }
            let Some(main) = spec.class().find_method(mixin.main()) else {
                failures.add(
                    origin,
                    format!("Mixin main method '{}' not found", mixin.main()),
                );
                continue;
            };
            let problem = match mixin.contribution() {
                MixinContribution::Action => None,
                MixinContribution::Property
                    if main.param_count() != 0 || main.returns().is_void() =>
                {
                    Some("a property mixin's main method must take no arguments and return a value")
                }
                MixinContribution::Collection
                    if main.param_count() != 0 || !main.returns().is_plural() =>
                {
                    Some("a collection mixin's main method must take no arguments and return a collection")
                }
                _ => None,
            };
            if let Some(problem) = problem {
                failures.add(format!("{}#{}", origin, mixin.main()), problem);
            }
        }
        Ok(())
    }
}
