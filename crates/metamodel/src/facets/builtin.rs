//! Built-in facets

use super::{DisablingAdvisor, Facet, HidingAdvisor, ValidatingAdvisor};
use crate::interaction::InteractionContext;
use causeway_core::{
    Class, DomainNature, LogicalType, MetamodelResult, MethodDescriptor, MixinContribution, Pojo,
    Value,
};
use std::any::Any;

macro_rules! facet_impl {
    ($name:literal) => {
        fn facet_type(&self) -> &'static str {
            $name
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    };
}

fn call(method: &MethodDescriptor, target: &Pojo, args: &[Value]) -> MetamodelResult<Value> {
    Ok(method.invoke(target, args)?)
}

/// A supporting method answers with a non-empty string to veto
fn reason_of(value: Value) -> Option<String> {
    match value {
        Value::Str(reason) if !reason.is_empty() => Some(reason),
        _ => None,
    }
}

// ============================================================================
// Hiding
// ============================================================================

/// Always hidden
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenFacet;

impl Facet for HiddenFacet {
    facet_impl!("HiddenFacet");

    fn as_hiding(&self) -> Option<&dyn HidingAdvisor> {
        Some(self)
    }
}

impl HidingAdvisor for HiddenFacet {
    fn hides(&self, _ctx: &InteractionContext) -> MetamodelResult<Option<String>> {
        Ok(Some("Hidden".to_string()))
    }
}

/// Hidden when `hide<Member>()` returns true
#[derive(Debug, Clone)]
pub struct HideForContextFacet {
    method: MethodDescriptor,
}

impl HideForContextFacet {
    /// Backed by `method`
    pub fn new(method: MethodDescriptor) -> Self {
        Self { method }
    }
}

impl Facet for HideForContextFacet {
    facet_impl!("HideForContextFacet");

    fn as_hiding(&self) -> Option<&dyn HidingAdvisor> {
        Some(self)
    }
}

impl HidingAdvisor for HideForContextFacet {
    fn hides(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>> {
        let hidden = call(&self.method, ctx.head.target(), &[])?;
        Ok(match hidden {
            Value::Bool(true) => Some("Hidden".to_string()),
            _ => None,
        })
    }
}

// ============================================================================
// Disabling
// ============================================================================

/// Always disabled, with a fixed reason
#[derive(Debug, Clone)]
pub struct DisabledFacet {
    reason: String,
}

impl DisabledFacet {
    /// Disabled for `reason`
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Facet for DisabledFacet {
    facet_impl!("DisabledFacet");

    fn as_disabling(&self) -> Option<&dyn DisablingAdvisor> {
        Some(self)
    }
}

impl DisablingAdvisor for DisabledFacet {
    fn disables(&self, _ctx: &InteractionContext) -> MetamodelResult<Option<String>> {
        Ok(Some(self.reason.clone()))
    }
}

/// Disabled when `disable<Member>()` returns a reason
#[derive(Debug, Clone)]
pub struct DisableForContextFacet {
    method: MethodDescriptor,
}

impl DisableForContextFacet {
    /// Backed by `method`
    pub fn new(method: MethodDescriptor) -> Self {
        Self { method }
    }
}

impl Facet for DisableForContextFacet {
    facet_impl!("DisableForContextFacet");

    fn as_disabling(&self) -> Option<&dyn DisablingAdvisor> {
        Some(self)
    }
}

impl DisablingAdvisor for DisableForContextFacet {
    fn disables(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>> {
        Ok(reason_of(call(&self.method, ctx.head.target(), &[])?))
    }
}

// ============================================================================
// Validating
// ============================================================================

/// Proposed value must not be null
#[derive(Debug, Clone, Copy, Default)]
pub struct MandatoryFacet;

impl Facet for MandatoryFacet {
    facet_impl!("MandatoryFacet");

    fn as_validating(&self) -> Option<&dyn ValidatingAdvisor> {
        Some(self)
    }
}

impl ValidatingAdvisor for MandatoryFacet {
    fn invalidates(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>> {
        Ok(match &ctx.proposed {
            Some(value) if value.is_null() => Some("Mandatory".to_string()),
            _ => None,
        })
    }
}

/// Proposed string must not exceed a length
#[derive(Debug, Clone, Copy)]
pub struct MaxLengthFacet {
    max: usize,
}

impl MaxLengthFacet {
    /// At most `max` characters
    pub fn new(max: usize) -> Self {
        Self { max }
    }

    /// Limit
    pub fn max(&self) -> usize {
        self.max
    }
}

impl Facet for MaxLengthFacet {
    facet_impl!("MaxLengthFacet");

    fn as_validating(&self) -> Option<&dyn ValidatingAdvisor> {
        Some(self)
    }
}

impl ValidatingAdvisor for MaxLengthFacet {
    fn invalidates(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>> {
        Ok(match ctx.proposed.as_ref().and_then(Value::as_str) {
            Some(s) if s.chars().count() > self.max => Some(format!(
                "The value proposed exceeds the maximum length of {}",
                self.max
            )),
            _ => None,
        })
    }
}

/// `validate<Property>(proposed)`
#[derive(Debug, Clone)]
pub struct PropertyValidateFacet {
    method: MethodDescriptor,
}

impl PropertyValidateFacet {
    /// Backed by `method`
    pub fn new(method: MethodDescriptor) -> Self {
        Self { method }
    }
}

impl Facet for PropertyValidateFacet {
    facet_impl!("PropertyValidateFacet");

    fn as_validating(&self) -> Option<&dyn ValidatingAdvisor> {
        Some(self)
    }
}

impl ValidatingAdvisor for PropertyValidateFacet {
    fn invalidates(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>> {
        let proposed = ctx.proposed.clone().unwrap_or_default();
        Ok(reason_of(call(&self.method, ctx.head.target(), &[proposed])?))
    }
}

/// `validate<N><Action>(proposed)`
#[derive(Debug, Clone)]
pub struct ActionParameterValidateFacet {
    method: MethodDescriptor,
}

impl ActionParameterValidateFacet {
    /// Backed by `method`
    pub fn new(method: MethodDescriptor) -> Self {
        Self { method }
    }
}

impl Facet for ActionParameterValidateFacet {
    facet_impl!("ActionParameterValidateFacet");

    fn as_validating(&self) -> Option<&dyn ValidatingAdvisor> {
        Some(self)
    }
}

impl ValidatingAdvisor for ActionParameterValidateFacet {
    fn invalidates(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>> {
        let proposed = ctx.proposed.clone().unwrap_or_default();
        Ok(reason_of(call(&self.method, ctx.head.target(), &[proposed])?))
    }
}

/// `validate<Action>(args...)`
#[derive(Debug, Clone)]
pub struct ActionValidateFacet {
    method: MethodDescriptor,
}

impl ActionValidateFacet {
    /// Backed by `method`
    pub fn new(method: MethodDescriptor) -> Self {
        Self { method }
    }
}

impl Facet for ActionValidateFacet {
    facet_impl!("ActionValidateFacet");

    fn as_validating(&self) -> Option<&dyn ValidatingAdvisor> {
        Some(self)
    }
}

impl ValidatingAdvisor for ActionValidateFacet {
    fn invalidates(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>> {
        Ok(reason_of(call(&self.method, ctx.head.target(), &ctx.args)?))
    }
}

/// Object-level `validate()`, consulted before saving
#[derive(Debug, Clone)]
pub struct ObjectValidateFacet {
    method: MethodDescriptor,
}

impl ObjectValidateFacet {
    /// Backed by `method`
    pub fn new(method: MethodDescriptor) -> Self {
        Self { method }
    }
}

impl Facet for ObjectValidateFacet {
    facet_impl!("ObjectValidateFacet");

    fn as_validating(&self) -> Option<&dyn ValidatingAdvisor> {
        Some(self)
    }
}

impl ValidatingAdvisor for ObjectValidateFacet {
    fn invalidates(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>> {
        Ok(reason_of(call(&self.method, ctx.head.target(), &[])?))
    }
}

// ============================================================================
// Defaults, choices, title
// ============================================================================

/// `default<Member>()` or `default<N><Action>()`
#[derive(Debug, Clone)]
pub struct DefaultedFacet {
    method: MethodDescriptor,
}

impl DefaultedFacet {
    /// Backed by `method`
    pub fn new(method: MethodDescriptor) -> Self {
        Self { method }
    }

    /// Default value for `target`
    pub fn default_value(&self, target: &Pojo) -> MetamodelResult<Value> {
        call(&self.method, target, &[])
    }
}

impl Facet for DefaultedFacet {
    facet_impl!("DefaultedFacet");
}

/// `choices<Member>()` or `choices<N><Action>()`
#[derive(Debug, Clone)]
pub struct ChoicesFacet {
    method: MethodDescriptor,
}

impl ChoicesFacet {
    /// Backed by `method`
    pub fn new(method: MethodDescriptor) -> Self {
        Self { method }
    }

    /// Choices for `target`; a non-list result is a single choice
    pub fn choices(&self, target: &Pojo) -> MetamodelResult<Vec<Value>> {
        Ok(match call(&self.method, target, &[])? {
            Value::List(list) => list.to_vec(),
            Value::Null => Vec::new(),
            other => vec![other],
        })
    }
}

impl Facet for ChoicesFacet {
    facet_impl!("ChoicesFacet");
}

/// How an object's title is derived
#[derive(Debug, Clone)]
pub enum TitleFacet {
    /// `title()` or `toString()`
    Method(MethodDescriptor),
    /// Fixed text, typically the logical simple name
    Fallback(String),
}

impl TitleFacet {
    /// Title of `pojo`
    pub fn title(&self, pojo: &Pojo) -> MetamodelResult<String> {
        match self {
            TitleFacet::Method(method) => Ok(match call(method, pojo, &[])? {
                Value::Null => String::new(),
                other => other.to_string(),
            }),
            TitleFacet::Fallback(text) => Ok(text.clone()),
        }
    }
}

impl Facet for TitleFacet {
    facet_impl!("TitleFacet");
}

// ============================================================================
// Type-level metadata
// ============================================================================

/// Marks a mixin type and what it contributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinFacet {
    mixee: String,
    main: String,
    contribution: MixinContribution,
    member_name: String,
}

impl MixinFacet {
    /// Facet for `class`, if it is a mixin
    pub fn for_class(class: &Class) -> Option<Self> {
        match class.nature() {
            DomainNature::Mixin {
                mixee,
                main,
                contribution,
                member_name,
            } => Some(Self {
                mixee: mixee.clone(),
                main: main.clone(),
                contribution: *contribution,
                member_name: member_name
                    .clone()
                    .unwrap_or_else(|| derive_member_name(class.simple_name())),
            }),
            _ => None,
        }
    }

    /// Mixee class name
    pub fn mixee(&self) -> &str {
        &self.mixee
    }

    /// Name of the method implementing the member
    pub fn main(&self) -> &str {
        &self.main
    }

    /// Kind of member contributed
    pub fn contribution(&self) -> MixinContribution {
        self.contribution
    }

    /// Name of the member as seen on the mixee
    pub fn member_name(&self) -> &str {
        &self.member_name
    }
}

impl Facet for MixinFacet {
    facet_impl!("MixinFacet");
}

/// `Customer_placeOrder` → `placeOrder`
fn derive_member_name(simple_name: &str) -> String {
    match simple_name.rfind('_') {
        Some(pos) if pos + 1 < simple_name.len() => simple_name[pos + 1..].to_string(),
        _ => causeway_core::decapitalize(simple_name),
    }
}

/// Alternative logical type names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasedFacet {
    aliases: Vec<String>,
}

impl AliasedFacet {
    /// With `aliases`
    pub fn new(aliases: Vec<String>) -> Self {
        Self { aliases }
    }

    /// The aliases
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

impl Facet for AliasedFacet {
    facet_impl!("AliasedFacet");
}

/// The type's logical type
#[derive(Debug, Clone)]
pub struct LogicalTypeFacet {
    logical_type: LogicalType,
}

impl LogicalTypeFacet {
    /// For `logical_type`
    pub fn new(logical_type: LogicalType) -> Self {
        Self { logical_type }
    }

    /// The logical type
    pub fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }
}

impl Facet for LogicalTypeFacet {
    facet_impl!("LogicalTypeFacet");
}
