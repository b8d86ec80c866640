//! Member intents
//!
//! Every call into a wrapped object is resolved, once, to the member it
//! concerns and to what the call intends to do with it. Dispatch is a match
//! on the intent; nothing inspects the method at call time.

use causeway_metamodel::MethodRole;

/// Wrapper-only method returning the underlying object
pub const ORIGIN_METHOD: &str = "__causeway_origin";
/// Wrapper-only method persisting the underlying object
pub const SAVE_METHOD: &str = "__causeway_save";

/// What a wrapped call intends to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberIntent {
    /// Read a property or collection
    Accessor,
    /// Write a property
    Modify,
    /// Clear a property
    Clear,
    /// Run an action
    Execute,
    /// `hideX`
    CheckIfHidden,
    /// `disableX`
    CheckIfDisabled,
    /// `validateX`, `validate<N>X`
    CheckIfValid,
    /// `defaultX`, `default<N>X`
    DefaultsFor,
    /// `choicesX`, `choices<N>X`
    ChoicesFor,
    /// `title()`
    Title,
    /// Persist the object
    Save,
    /// `toString()`
    ToString,
    /// `equals(other)`
    Equals,
    /// `hashCode()`
    HashCode,
    /// The underlying object
    Origin,
}

impl MemberIntent {
    /// Intent of a method playing `role` for its member
    pub fn from_role(role: MethodRole) -> Self {
        match role {
            MethodRole::Accessor => MemberIntent::Accessor,
            MethodRole::Modifier => MemberIntent::Modify,
            MethodRole::Clearer => MemberIntent::Clear,
            MethodRole::Action => MemberIntent::Execute,
            MethodRole::Hide => MemberIntent::CheckIfHidden,
            MethodRole::Disable => MemberIntent::CheckIfDisabled,
            MethodRole::Validate | MethodRole::ValidateParam(_) => MemberIntent::CheckIfValid,
            MethodRole::Default | MethodRole::DefaultParam(_) => MemberIntent::DefaultsFor,
            MethodRole::Choices | MethodRole::ChoicesParam(_) => MemberIntent::ChoicesFor,
        }
    }

    /// Intent of a special method, matched by name and arity
    pub fn special(method: &str, arity: usize) -> Option<Self> {
        match (method, arity) {
            ("title", 0) => Some(MemberIntent::Title),
            ("toString", 0) => Some(MemberIntent::ToString),
            ("equals", 1) => Some(MemberIntent::Equals),
            ("hashCode", 0) => Some(MemberIntent::HashCode),
            (SAVE_METHOD, 0) => Some(MemberIntent::Save),
            (ORIGIN_METHOD, 0) => Some(MemberIntent::Origin),
            _ => None,
        }
    }

    /// Supporting methods may not be invoked through a wrapper
    pub fn is_supporting(&self) -> bool {
        matches!(
            self,
            MemberIntent::CheckIfHidden
                | MemberIntent::CheckIfDisabled
                | MemberIntent::CheckIfValid
                | MemberIntent::DefaultsFor
                | MemberIntent::ChoicesFor
        )
    }

    /// Changes state and so notifies command listeners
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            MemberIntent::Modify | MemberIntent::Clear | MemberIntent::Execute
        )
    }
}
