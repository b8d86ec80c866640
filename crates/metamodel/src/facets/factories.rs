//! Facet factories
//!
//! Factories run during introspection: class-level factories at TYPE level,
//! member and parameter factories while members are built. Supporting
//! methods (`hideX`, `disableX`, `validateX`, ...) are looked up through
//! [`SupportingMethods`], which records what was consumed so that orphans
//! can be reported by validation.

use super::builtin::*;
use super::FacetHolder;
use causeway_core::{
    capitalize, Class, FeatureKind, LogicalType, MetamodelResult, MethodDescriptor, TypeRef,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// Prefixes that mark a method as supporting another member
pub const SUPPORTING_PREFIXES: &[&str] = &[
    "hide", "disable", "validate", "default", "choices", "clear",
];

/// Supporting methods of one class, with consumption tracking
#[derive(Debug, Default)]
pub struct SupportingMethods {
    methods: FxHashMap<String, MethodDescriptor>,
    consumed: FxHashSet<String>,
}

impl SupportingMethods {
    /// Index the supporting methods among `methods`
    pub fn collect<'a>(methods: impl IntoIterator<Item = &'a MethodDescriptor>) -> Self {
        let methods = methods
            .into_iter()
            .filter(|m| Self::is_supporting_name(m.name()))
            .map(|m| (m.name().to_string(), m.clone()))
            .collect();
        Self {
            methods,
            consumed: FxHashSet::default(),
        }
    }

    /// `hideX`, `validate0X`, ...: a known prefix followed by an uppercase
    /// letter or a digit
    pub fn is_supporting_name(name: &str) -> bool {
        SUPPORTING_PREFIXES.iter().any(|prefix| {
            name.strip_prefix(prefix)
                .and_then(|rest| rest.chars().next())
                .map_or(false, |c| c.is_ascii_uppercase() || c.is_ascii_digit())
        })
    }

    /// True if `name` is one of the indexed supporting methods
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Take `name`, marking it consumed
    pub fn take(&mut self, name: &str) -> Option<MethodDescriptor> {
        let method = self.methods.get(name)?.clone();
        self.consumed.insert(name.to_string());
        Some(method)
    }

    /// Supporting methods nobody consumed, sorted
    pub fn orphans(&self) -> Vec<String> {
        let mut orphans: Vec<String> = self
            .methods
            .keys()
            .filter(|name| !self.consumed.contains(*name))
            .cloned()
            .collect();
        orphans.sort();
        orphans
    }
}

/// Input to class-level factories
pub struct ClassProcessingContext<'a> {
    /// Class being introspected
    pub class: &'a Class,
    /// Type-level facets
    pub facets: &'a mut FacetHolder,
}

/// Input to member-level factories
pub struct MemberProcessingContext<'a> {
    /// Declaring class
    pub class: &'a Class,
    /// Property, collection or action
    pub kind: FeatureKind,
    /// Member id used to name supporting methods
    pub member_name: &'a str,
    /// Getter (associations) or action method
    pub method: &'a MethodDescriptor,
    /// Supporting methods of the class
    pub supporting: &'a mut SupportingMethods,
    /// Member facets
    pub facets: &'a mut FacetHolder,
}

impl MemberProcessingContext<'_> {
    /// Take `<prefix><Member>`
    pub fn take_supporting(&mut self, prefix: &str) -> Option<MethodDescriptor> {
        let name = format!("{}{}", prefix, capitalize(self.member_name));
        self.supporting.take(&name)
    }
}

/// Input to parameter-level factories
pub struct ParamProcessingContext<'a> {
    /// Declaring class
    pub class: &'a Class,
    /// Action id used to name supporting methods
    pub action_name: &'a str,
    /// Action method
    pub action_method: &'a MethodDescriptor,
    /// Zero-based parameter position
    pub position: usize,
    /// Declared parameter type
    pub param_type: &'a TypeRef,
    /// Supporting methods of the class
    pub supporting: &'a mut SupportingMethods,
    /// Parameter facets
    pub facets: &'a mut FacetHolder,
}

impl ParamProcessingContext<'_> {
    /// Take `<prefix><N><Action>`
    pub fn take_supporting(&mut self, prefix: &str) -> Option<MethodDescriptor> {
        let name = format!("{}{}{}", prefix, self.position, capitalize(self.action_name));
        self.supporting.take(&name)
    }
}

/// Attaches facets during introspection
pub trait FacetFactory: Send + Sync {
    /// Name, for diagnostics
    fn name(&self) -> &'static str;

    /// Process the class itself
    fn process_class(&self, _ctx: &mut ClassProcessingContext<'_>) -> MetamodelResult<()> {
        Ok(())
    }

    /// Process a property, collection or action
    fn process_member(&self, _ctx: &mut MemberProcessingContext<'_>) -> MetamodelResult<()> {
        Ok(())
    }

    /// Process an action parameter
    fn process_param(&self, _ctx: &mut ParamProcessingContext<'_>) -> MetamodelResult<()> {
        Ok(())
    }
}

// ============================================================================
// Class-level factories
// ============================================================================

/// [`LogicalTypeFacet`] and [`AliasedFacet`]
#[derive(Debug, Default)]
pub struct LogicalTypeFacetFactory;

impl FacetFactory for LogicalTypeFacetFactory {
    fn name(&self) -> &'static str {
        "LogicalTypeFacetFactory"
    }

    fn process_class(&self, ctx: &mut ClassProcessingContext<'_>) -> MetamodelResult<()> {
        ctx.facets
            .add(LogicalTypeFacet::new(LogicalType::infer(ctx.class)));
        if !ctx.class.aliases().is_empty() {
            ctx.facets
                .add(AliasedFacet::new(ctx.class.aliases().to_vec()));
        }
        Ok(())
    }
}

/// [`MixinFacet`]
#[derive(Debug, Default)]
pub struct MixinFacetFactory;

impl FacetFactory for MixinFacetFactory {
    fn name(&self) -> &'static str {
        "MixinFacetFactory"
    }

    fn process_class(&self, ctx: &mut ClassProcessingContext<'_>) -> MetamodelResult<()> {
        if let Some(facet) = MixinFacet::for_class(ctx.class) {
            ctx.facets.add(facet);
        }
        Ok(())
    }
}

/// [`TitleFacet`]: `title()`, then `toString()`, then the logical simple name
#[derive(Debug, Default)]
pub struct TitleFacetFactory;

impl FacetFactory for TitleFacetFactory {
    fn name(&self) -> &'static str {
        "TitleFacetFactory"
    }

    fn process_class(&self, ctx: &mut ClassProcessingContext<'_>) -> MetamodelResult<()> {
        let method = ["title", "toString"].iter().find_map(|name| {
            ctx.class
                .find_method(name)
                .filter(|m| m.param_count() == 0)
        });
        let facet = match method {
            Some(method) => TitleFacet::Method(method),
            None => TitleFacet::Fallback(
                LogicalType::infer(ctx.class)
                    .logical_simple_name()
                    .to_string(),
            ),
        };
        ctx.facets.add(facet);
        Ok(())
    }
}

/// [`ObjectValidateFacet`] from `validate()`
#[derive(Debug, Default)]
pub struct ObjectValidateFacetFactory;

impl FacetFactory for ObjectValidateFacetFactory {
    fn name(&self) -> &'static str {
        "ObjectValidateFacetFactory"
    }

    fn process_class(&self, ctx: &mut ClassProcessingContext<'_>) -> MetamodelResult<()> {
        if let Some(method) = ctx
            .class
            .find_method("validate")
            .filter(|m| m.param_count() == 0)
        {
            ctx.facets.add(ObjectValidateFacet::new(method));
        }
        Ok(())
    }
}

// ============================================================================
// Member-level factories
// ============================================================================

/// [`HiddenFacet`] and [`HideForContextFacet`]
#[derive(Debug, Default)]
pub struct HiddenFacetFactory;

impl FacetFactory for HiddenFacetFactory {
    fn name(&self) -> &'static str {
        "HiddenFacetFactory"
    }

    fn process_member(&self, ctx: &mut MemberProcessingContext<'_>) -> MetamodelResult<()> {
        if let Some(method) = ctx.take_supporting("hide") {
            ctx.facets.add(HideForContextFacet::new(method));
        }
        // static hiding outranks the supporting method
        if ctx.method.annotations().hidden {
            ctx.facets.remove("HideForContextFacet");
            ctx.facets.add(HiddenFacet);
        }
        Ok(())
    }
}

/// [`DisabledFacet`] and [`DisableForContextFacet`]
#[derive(Debug, Default)]
pub struct DisabledFacetFactory;

impl FacetFactory for DisabledFacetFactory {
    fn name(&self) -> &'static str {
        "DisabledFacetFactory"
    }

    fn process_member(&self, ctx: &mut MemberProcessingContext<'_>) -> MetamodelResult<()> {
        if let Some(method) = ctx.take_supporting("disable") {
            ctx.facets.add(DisableForContextFacet::new(method));
        }
        if ctx.kind == FeatureKind::Property && ctx.class.is_editing_disabled() {
            ctx.facets.add(DisabledFacet::new("Editing disabled"));
        }
        if let Some(reason) = &ctx.method.annotations().disabled {
            ctx.facets.add(DisabledFacet::new(reason.clone()));
        }
        Ok(())
    }
}

/// [`MandatoryFacet`] unless annotated optional
#[derive(Debug, Default)]
pub struct MandatoryFacetFactory;

impl FacetFactory for MandatoryFacetFactory {
    fn name(&self) -> &'static str {
        "MandatoryFacetFactory"
    }

    fn process_member(&self, ctx: &mut MemberProcessingContext<'_>) -> MetamodelResult<()> {
        if ctx.kind == FeatureKind::Property && !ctx.method.annotations().optional {
            ctx.facets.add(MandatoryFacet);
        }
        Ok(())
    }

    fn process_param(&self, ctx: &mut ParamProcessingContext<'_>) -> MetamodelResult<()> {
        if !ctx.action_method.annotations().optional {
            ctx.facets.add(MandatoryFacet);
        }
        Ok(())
    }
}

/// [`MaxLengthFacet`]
#[derive(Debug, Default)]
pub struct MaxLengthFacetFactory;

impl FacetFactory for MaxLengthFacetFactory {
    fn name(&self) -> &'static str {
        "MaxLengthFacetFactory"
    }

    fn process_member(&self, ctx: &mut MemberProcessingContext<'_>) -> MetamodelResult<()> {
        if ctx.kind == FeatureKind::Property {
            if let Some(max) = ctx.method.annotations().max_length {
                ctx.facets.add(MaxLengthFacet::new(max));
            }
        }
        Ok(())
    }
}

/// `validateX` and `validate<N>X`
#[derive(Debug, Default)]
pub struct ValidateFacetFactory;

impl FacetFactory for ValidateFacetFactory {
    fn name(&self) -> &'static str {
        "ValidateFacetFactory"
    }

    fn process_member(&self, ctx: &mut MemberProcessingContext<'_>) -> MetamodelResult<()> {
        match ctx.kind {
            FeatureKind::Property => {
                if let Some(method) = ctx.take_supporting("validate") {
                    ctx.facets.add(PropertyValidateFacet::new(method));
                }
            }
            FeatureKind::Action => {
                if let Some(method) = ctx.take_supporting("validate") {
                    ctx.facets.add(ActionValidateFacet::new(method));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn process_param(&self, ctx: &mut ParamProcessingContext<'_>) -> MetamodelResult<()> {
        if let Some(method) = ctx.take_supporting("validate") {
            ctx.facets.add(ActionParameterValidateFacet::new(method));
        }
        Ok(())
    }
}

/// `defaultX` and `default<N>X`
#[derive(Debug, Default)]
pub struct DefaultedFacetFactory;

impl FacetFactory for DefaultedFacetFactory {
    fn name(&self) -> &'static str {
        "DefaultedFacetFactory"
    }

    fn process_member(&self, ctx: &mut MemberProcessingContext<'_>) -> MetamodelResult<()> {
        if ctx.kind == FeatureKind::Property {
            if let Some(method) = ctx.take_supporting("default") {
                ctx.facets.add(DefaultedFacet::new(method));
            }
        }
        Ok(())
    }

    fn process_param(&self, ctx: &mut ParamProcessingContext<'_>) -> MetamodelResult<()> {
        if let Some(method) = ctx.take_supporting("default") {
            ctx.facets.add(DefaultedFacet::new(method));
        }
        Ok(())
    }
}

/// `choicesX` and `choices<N>X`
#[derive(Debug, Default)]
pub struct ChoicesFacetFactory;

impl FacetFactory for ChoicesFacetFactory {
    fn name(&self) -> &'static str {
        "ChoicesFacetFactory"
    }

    fn process_member(&self, ctx: &mut MemberProcessingContext<'_>) -> MetamodelResult<()> {
        if ctx.kind == FeatureKind::Property {
            if let Some(method) = ctx.take_supporting("choices") {
                ctx.facets.add(ChoicesFacet::new(method));
            }
        }
        Ok(())
    }

    fn process_param(&self, ctx: &mut ParamProcessingContext<'_>) -> MetamodelResult<()> {
        if let Some(method) = ctx.take_supporting("choices") {
            ctx.facets.add(ChoicesFacet::new(method));
        }
        Ok(())
    }
}
