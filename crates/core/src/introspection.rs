//! Introspection state of a specification
//!
//! States only ever move forward. The two "being introspected" states mark
//! an introspection in progress, so a re-entrant request for the same
//! specification (a type referring to itself) does not recurse.

use std::fmt;

/// Progress of a specification through staged introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum IntrospectionState {
    /// Created, nothing introspected
    NotIntrospected = 0,
    /// Type-level introspection running
    TypeBeingIntrospected = 1,
    /// Type-level facets and hierarchy known
    TypeIntrospected = 2,
    /// Member introspection running
    MembersBeingIntrospected = 3,
    /// Members and their facets known
    FullyIntrospected = 4,
}

impl IntrospectionState {
    /// True for the two in-progress states
    pub fn is_being_introspected(&self) -> bool {
        matches!(
            self,
            IntrospectionState::TypeBeingIntrospected
                | IntrospectionState::MembersBeingIntrospected
        )
    }

    /// True if this state is strictly before `other`
    pub fn is_less_than(&self, other: IntrospectionState) -> bool {
        *self < other
    }

    /// Raw representation, for atomic storage
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Inverse of [`IntrospectionState::as_u8`]; unknown values map to
    /// `FullyIntrospected`
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            0 => IntrospectionState::NotIntrospected,
            1 => IntrospectionState::TypeBeingIntrospected,
            2 => IntrospectionState::TypeIntrospected,
            3 => IntrospectionState::MembersBeingIntrospected,
            _ => IntrospectionState::FullyIntrospected,
        }
    }
}

impl fmt::Display for IntrospectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IntrospectionState::NotIntrospected => "NOT_INTROSPECTED",
            IntrospectionState::TypeBeingIntrospected => "TYPE_BEING_INTROSPECTED",
            IntrospectionState::TypeIntrospected => "TYPE_INTROSPECTED",
            IntrospectionState::MembersBeingIntrospected => "MEMBERS_BEING_INTROSPECTED",
            IntrospectionState::FullyIntrospected => "FULLY_INTROSPECTED",
        };
        write!(f, "{}", s)
    }
}
