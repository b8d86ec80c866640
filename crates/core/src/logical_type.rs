//! Logical types and member identifiers
//!
//! A [`LogicalType`] pairs a stable, user-facing type name with the class
//! currently implementing it. Bookmarks and the REST surface only ever see
//! the logical name, so classes can be renamed or moved freely.

use crate::class::Class;
use std::fmt;

/// Logical type name bound to its implementing class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogicalType {
    name: String,
    class: Class,
}

impl LogicalType {
    /// Bind `name` to `class`
    pub fn new(name: impl Into<String>, class: Class) -> Self {
        Self {
            name: name.into(),
            class,
        }
    }

    /// The logical type of `class`: its explicit name, else its class name
    pub fn infer(class: &Class) -> Self {
        let name = class.logical_type_name().unwrap_or_else(|| class.name());
        Self::new(name, class.clone())
    }

    /// Fully qualified logical name
    pub fn logical_name(&self) -> &str {
        &self.name
    }

    /// Part before the last `.`; empty if there is none
    pub fn namespace(&self) -> &str {
        match self.name.rfind('.') {
            Some(pos) => &self.name[..pos],
            None => "",
        }
    }

    /// Part after the last `.`
    pub fn logical_simple_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(pos) => &self.name[pos + 1..],
            None => &self.name,
        }
    }

    /// Implementing class
    pub fn corresponding_class(&self) -> &Class {
        &self.class
    }

    /// Same logical name bound to another class (used for aliases)
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.class.clone())
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Kind of feature an [`Identifier`] names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// The type itself
    Class,
    /// A property
    Property,
    /// A collection
    Collection,
    /// An action
    Action,
    /// An action parameter
    Parameter,
}

/// Identifies a type or one of its members
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    logical_type_name: String,
    member: Option<String>,
    kind: FeatureKind,
}

impl Identifier {
    /// Identifier for the type itself
    pub fn class_identifier(logical_type: &LogicalType) -> Self {
        Self {
            logical_type_name: logical_type.logical_name().to_string(),
            member: None,
            kind: FeatureKind::Class,
        }
    }

    /// Identifier for a member of the type
    pub fn member_identifier(
        logical_type: &LogicalType,
        member: impl Into<String>,
        kind: FeatureKind,
    ) -> Self {
        Self {
            logical_type_name: logical_type.logical_name().to_string(),
            member: Some(member.into()),
            kind,
        }
    }

    /// Logical name of the owning type
    pub fn logical_type_name(&self) -> &str {
        &self.logical_type_name
    }

    /// Member name; `None` for type identifiers
    pub fn member_name(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// Kind of feature
    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// `type#member` form used in messages
    pub fn full_identity_string(&self) -> String {
        match &self.member {
            Some(member) => format!("{}#{}", self.logical_type_name, member),
            None => self.logical_type_name.clone(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_identity_string())
    }
}
