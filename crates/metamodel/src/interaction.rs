//! Interaction model: contexts, events, results and consent
//!
//! Every check the wrapper layer performs (visibility, usability, validity)
//! is evaluated by asking a member's facets for advice within an
//! [`InteractionContext`]. The outcome is an [`InteractionResult`] wrapping
//! the [`InteractionEvent`] that is reported to listeners; a vetoed event
//! becomes the corresponding interaction exception.

use crate::facets::FacetHolder;
use causeway_core::{Identifier, MetamodelResult, Pojo, Value};
use std::fmt;

/// Who initiated an interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionInitiatedBy {
    /// An end user; business rules apply
    #[default]
    User,
    /// The framework itself; rules are passed through
    Framework,
}

impl InteractionInitiatedBy {
    /// Framework-initiated interactions skip rule evaluation
    pub fn is_pass_through(&self) -> bool {
        matches!(self, InteractionInitiatedBy::Framework)
    }
}

/// The object an interaction is about
///
/// For regular members `owner` and `target` are the same object. For
/// mixed-in members `owner` is the mixee and `target` is the mixin instance
/// on which supporting methods are invoked.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionHead {
    owner: Pojo,
    target: Pojo,
}

impl InteractionHead {
    /// Head for a regular member
    pub fn regular(owner: Pojo) -> Self {
        Self {
            target: owner.clone(),
            owner,
        }
    }

    /// Head for a mixed-in member
    pub fn mixin(mixee: Pojo, mixin: Pojo) -> Self {
        Self {
            owner: mixee,
            target: mixin,
        }
    }

    /// The domain object (mixee for mixins)
    pub fn owner(&self) -> &Pojo {
        &self.owner
    }

    /// The object supporting methods run against
    pub fn target(&self) -> &Pojo {
        &self.target
    }

    /// True for mixed-in heads
    pub fn is_mixin(&self) -> bool {
        !self.owner.same_instance(&self.target)
    }
}

/// Everything an advisor may consult
#[derive(Debug, Clone)]
pub struct InteractionContext {
    /// Object interacted with
    pub head: InteractionHead,
    /// Member (or type) identifier
    pub identifier: Identifier,
    /// User or framework
    pub initiated_by: InteractionInitiatedBy,
    /// Proposed new value (property modify, single argument checks)
    pub proposed: Option<Value>,
    /// Full argument list (action checks)
    pub args: Vec<Value>,
    /// Argument position (parameter checks)
    pub position: Option<usize>,
}

impl InteractionContext {
    /// Context with no proposed values
    pub fn new(
        head: InteractionHead,
        identifier: Identifier,
        initiated_by: InteractionInitiatedBy,
    ) -> Self {
        Self {
            head,
            identifier,
            initiated_by,
            proposed: None,
            args: Vec::new(),
            position: None,
        }
    }

    /// With a proposed value
    pub fn with_proposed(mut self, proposed: Value) -> Self {
        self.proposed = Some(proposed);
        self
    }

    /// With action arguments
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// With argument position
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

// ============================================================================
// Events
// ============================================================================

/// Broad category of an event; decides which exception a veto raises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Is the member visible?
    Visibility,
    /// Is the member usable?
    Usability,
    /// Is the proposed change valid?
    Validity,
    /// Informational: a member was read or a plural method called
    Access,
}

/// Specific kind of interaction event
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionEventKind {
    /// Property visibility check
    PropertyVisibility,
    /// Property usability check
    PropertyUsability,
    /// Property modification validity check
    PropertyModify {
        /// Proposed value
        proposed: Value,
    },
    /// Property read
    PropertyAccess {
        /// Value read
        value: Value,
    },
    /// Collection visibility check
    CollectionVisibility,
    /// Collection usability check
    CollectionUsability,
    /// Collection read
    CollectionAccess,
    /// Method called on a wrapped collection or map
    CollectionMethod {
        /// Method name
        method: String,
        /// Arguments
        args: Vec<Value>,
    },
    /// Action visibility check
    ActionVisibility,
    /// Action usability check
    ActionUsability,
    /// Single action argument validity check
    ActionArgument {
        /// Argument position
        position: usize,
        /// Proposed argument
        proposed: Value,
    },
    /// Whole action invocation validity check
    ActionInvocation {
        /// Arguments
        args: Vec<Value>,
    },
    /// Object validity check before saving
    ObjectValidity,
    /// Object title read
    ObjectTitle {
        /// The title
        title: String,
    },
}

impl InteractionEventKind {
    /// Category of this kind
    pub fn category(&self) -> EventCategory {
        match self {
            InteractionEventKind::PropertyVisibility
            | InteractionEventKind::CollectionVisibility
            | InteractionEventKind::ActionVisibility => EventCategory::Visibility,
            InteractionEventKind::PropertyUsability
            | InteractionEventKind::CollectionUsability
            | InteractionEventKind::ActionUsability => EventCategory::Usability,
            InteractionEventKind::PropertyModify { .. }
            | InteractionEventKind::ActionArgument { .. }
            | InteractionEventKind::ActionInvocation { .. }
            | InteractionEventKind::ObjectValidity => EventCategory::Validity,
            InteractionEventKind::PropertyAccess { .. }
            | InteractionEventKind::CollectionAccess
            | InteractionEventKind::CollectionMethod { .. }
            | InteractionEventKind::ObjectTitle { .. } => EventCategory::Access,
        }
    }
}

/// A veto: why and by whom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Veto {
    /// Human-readable reason
    pub reason: String,
    /// Facet type of the advisor
    pub advisor: String,
}

/// Structured signal describing an interaction check or access
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionEvent {
    kind: InteractionEventKind,
    identifier: Identifier,
    source: Pojo,
    vetoes: Vec<Veto>,
}

impl InteractionEvent {
    /// Event about `identifier` on `source`, not vetoed
    pub fn new(kind: InteractionEventKind, identifier: Identifier, source: Pojo) -> Self {
        Self {
            kind,
            identifier,
            source,
            vetoes: Vec::new(),
        }
    }

    /// Kind of event
    pub fn kind(&self) -> &InteractionEventKind {
        &self.kind
    }

    /// Category of event
    pub fn category(&self) -> EventCategory {
        self.kind.category()
    }

    /// Member or type concerned
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Domain object concerned
    pub fn source(&self) -> &Pojo {
        &self.source
    }

    /// True if any advisor vetoed
    pub fn is_veto(&self) -> bool {
        !self.vetoes.is_empty()
    }

    /// All vetoes, in advice order
    pub fn vetoes(&self) -> &[Veto] {
        &self.vetoes
    }

    /// Combined veto reason
    pub fn reason(&self) -> Option<String> {
        if self.vetoes.is_empty() {
            None
        } else {
            Some(
                self.vetoes
                    .iter()
                    .map(|v| v.reason.as_str())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        }
    }

    fn advise(&mut self, reason: String, advisor: impl Into<String>) {
        self.vetoes.push(Veto {
            reason,
            advisor: advisor.into(),
        });
    }
}

impl fmt::Display for InteractionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{:?} on {} vetoed: {}", self.kind, self.identifier, reason),
            None => write!(f, "{:?} on {}", self.kind, self.identifier),
        }
    }
}

// ============================================================================
// Result and consent
// ============================================================================

/// Outcome of evaluating advisors for one event
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionResult {
    event: InteractionEvent,
}

impl InteractionResult {
    /// Start from an un-vetoed event
    pub fn new(event: InteractionEvent) -> Self {
        Self { event }
    }

    /// Record a veto
    pub fn advise(&mut self, reason: impl Into<String>, advisor: impl Into<String>) {
        self.event.advise(reason.into(), advisor);
    }

    /// True if vetoed
    pub fn is_vetoed(&self) -> bool {
        self.event.is_veto()
    }

    /// True if not vetoed
    pub fn is_not_vetoed(&self) -> bool {
        !self.is_vetoed()
    }

    /// The event
    pub fn event(&self) -> &InteractionEvent {
        &self.event
    }

    /// Take the event
    pub fn into_event(self) -> InteractionEvent {
        self.event
    }

    /// Consent view of this result
    pub fn consent(&self) -> Consent {
        match self.event.reason() {
            Some(reason) => Consent::Veto(reason),
            None => Consent::Allow,
        }
    }
}

/// Allowed, or vetoed with a reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Consent {
    /// Allowed
    Allow,
    /// Vetoed, with reason
    Veto(String),
}

impl Consent {
    /// True if allowed
    pub fn is_allowed(&self) -> bool {
        matches!(self, Consent::Allow)
    }

    /// Veto reason, if vetoed
    pub fn reason(&self) -> Option<&str> {
        match self {
            Consent::Allow => None,
            Consent::Veto(reason) => Some(reason),
        }
    }
}

// ============================================================================
// Advisor evaluation
// ============================================================================

/// Ask every hiding advisor among `facets`
pub fn is_visible_result(
    facets: &FacetHolder,
    ctx: &InteractionContext,
    event: InteractionEvent,
) -> MetamodelResult<InteractionResult> {
    let mut result = InteractionResult::new(event);
    if ctx.initiated_by.is_pass_through() {
        return Ok(result);
    }
    for facet in facets.iter() {
        if let Some(advisor) = facet.as_hiding() {
            if let Some(reason) = advisor.hides(ctx)? {
                result.advise(reason, facet.facet_type());
            }
        }
    }
    Ok(result)
}

/// Ask every disabling advisor among `facets`
pub fn is_usable_result(
    facets: &FacetHolder,
    ctx: &InteractionContext,
    event: InteractionEvent,
) -> MetamodelResult<InteractionResult> {
    let mut result = InteractionResult::new(event);
    if ctx.initiated_by.is_pass_through() {
        return Ok(result);
    }
    for facet in facets.iter() {
        if let Some(advisor) = facet.as_disabling() {
            if let Some(reason) = advisor.disables(ctx)? {
                result.advise(reason, facet.facet_type());
            }
        }
    }
    Ok(result)
}

/// Ask every validating advisor among `facets`
pub fn is_valid_result(
    facets: &FacetHolder,
    ctx: &InteractionContext,
    event: InteractionEvent,
) -> MetamodelResult<InteractionResult> {
    let mut result = InteractionResult::new(event);
    if ctx.initiated_by.is_pass_through() {
        return Ok(result);
    }
    for facet in facets.iter() {
        if let Some(advisor) = facet.as_validating() {
            if let Some(reason) = advisor.invalidates(ctx)? {
                result.advise(reason, facet.facet_type());
            }
        }
    }
    Ok(result)
}
