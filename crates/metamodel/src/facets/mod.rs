//! Facets: pluggable units of per-type and per-member behavior
//!
//! A facet is attached to a [`FacetHolder`] during introspection. Facets that
//! take part in interaction checks expose an advisor through
//! [`Facet::as_hiding`], [`Facet::as_disabling`] or [`Facet::as_validating`].

pub mod builtin;
pub mod factories;

use crate::interaction::InteractionContext;
use causeway_core::MetamodelResult;
use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub use builtin::{
    ActionParameterValidateFacet, ActionValidateFacet, AliasedFacet, ChoicesFacet,
    DefaultedFacet, DisableForContextFacet, DisabledFacet, HiddenFacet, HideForContextFacet,
    LogicalTypeFacet, MandatoryFacet, MaxLengthFacet, MixinFacet, ObjectValidateFacet,
    PropertyValidateFacet, TitleFacet,
};
pub use factories::{
    ClassProcessingContext, FacetFactory, MemberProcessingContext, ParamProcessingContext,
    SupportingMethods,
};

/// Advises whether a feature is hidden
pub trait HidingAdvisor {
    /// `Some(reason)` if hidden
    fn hides(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>>;
}

/// Advises whether a feature is disabled
pub trait DisablingAdvisor {
    /// `Some(reason)` if disabled
    fn disables(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>>;
}

/// Advises whether a proposed change is invalid
pub trait ValidatingAdvisor {
    /// `Some(reason)` if invalid
    fn invalidates(&self, ctx: &InteractionContext) -> MetamodelResult<Option<String>>;
}

/// A unit of metadata or behavior attached to a type, member or parameter
pub trait Facet: Send + Sync + fmt::Debug {
    /// Key under which the facet is stored; one facet per key per holder
    fn facet_type(&self) -> &'static str;

    /// For downcasting to the concrete facet
    fn as_any(&self) -> &dyn Any;

    /// Hiding advisor, if this facet hides
    fn as_hiding(&self) -> Option<&dyn HidingAdvisor> {
        None
    }

    /// Disabling advisor, if this facet disables
    fn as_disabling(&self) -> Option<&dyn DisablingAdvisor> {
        None
    }

    /// Validating advisor, if this facet validates
    fn as_validating(&self) -> Option<&dyn ValidatingAdvisor> {
        None
    }
}

/// Ordered set of facets, at most one per facet type
#[derive(Clone, Default)]
pub struct FacetHolder {
    facets: SmallVec<[Arc<dyn Facet>; 4]>,
}

impl FacetHolder {
    /// Empty holder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `facet`, replacing any facet of the same type in place
    pub fn add(&mut self, facet: impl Facet + 'static) {
        self.add_shared(Arc::new(facet));
    }

    /// Add an already shared facet
    pub fn add_shared(&mut self, facet: Arc<dyn Facet>) {
        match self
            .facets
            .iter()
            .position(|f| f.facet_type() == facet.facet_type())
        {
            Some(pos) => self.facets[pos] = facet,
            None => self.facets.push(facet),
        }
    }

    /// Remove the facet of `facet_type`
    pub fn remove(&mut self, facet_type: &str) -> Option<Arc<dyn Facet>> {
        let pos = self
            .facets
            .iter()
            .position(|f| f.facet_type() == facet_type)?;
        Some(self.facets.remove(pos))
    }

    /// Facet of concrete type `F`
    pub fn get<F: Facet + 'static>(&self) -> Option<&F> {
        self.facets
            .iter()
            .find_map(|f| f.as_any().downcast_ref::<F>())
    }

    /// True if a facet of `facet_type` is present
    pub fn contains(&self, facet_type: &str) -> bool {
        self.facets.iter().any(|f| f.facet_type() == facet_type)
    }

    /// Facets in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Facet>> {
        self.facets.iter()
    }

    /// Number of facets
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// True if there are no facets
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

impl fmt::Debug for FacetHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.facets.iter().map(|facet| facet.facet_type()))
            .finish()
    }
}
