//! Bean sort: how the framework treats a discovered type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a type for metamodel purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeanSort {
    /// Value type (strings, numbers, declared value classes)
    Value,
    /// View model
    ViewModel,
    /// Persistent entity
    Entity,
    /// Mixin contributing members to another type
    Mixin,
    /// Managed bean whose actions are exposed
    ManagedBeanContributing,
    /// Managed bean not exposed in the UI
    ManagedBeanNotContributing,
    /// Abstract type (superclass or interface of domain types)
    Abstract,
    /// Explicitly excluded
    Vetoed,
    /// Collection or map type
    Collection,
    /// Not classified
    Unknown,
}

impl BeanSort {
    /// Entity or view model
    pub fn is_domain_object(&self) -> bool {
        matches!(self, BeanSort::Entity | BeanSort::ViewModel)
    }

    /// Either kind of managed bean
    pub fn is_managed_bean(&self) -> bool {
        matches!(
            self,
            BeanSort::ManagedBeanContributing | BeanSort::ManagedBeanNotContributing
        )
    }

    /// Managed bean whose actions are exposed
    pub fn is_managed_bean_contributing(&self) -> bool {
        matches!(self, BeanSort::ManagedBeanContributing)
    }

    /// Mixin
    pub fn is_mixin(&self) -> bool {
        matches!(self, BeanSort::Mixin)
    }

    /// Value type
    pub fn is_value(&self) -> bool {
        matches!(self, BeanSort::Value)
    }

    /// Entity
    pub fn is_entity(&self) -> bool {
        matches!(self, BeanSort::Entity)
    }

    /// View model
    pub fn is_view_model(&self) -> bool {
        matches!(self, BeanSort::ViewModel)
    }

    /// Abstract type
    pub fn is_abstract(&self) -> bool {
        matches!(self, BeanSort::Abstract)
    }

    /// Vetoed
    pub fn is_vetoed(&self) -> bool {
        matches!(self, BeanSort::Vetoed)
    }

    /// Unknown
    pub fn is_unknown(&self) -> bool {
        matches!(self, BeanSort::Unknown)
    }

    /// Types that receive a spec eagerly during metamodel creation
    pub fn is_eagerly_introspected(&self) -> bool {
        self.is_domain_object() || self.is_managed_bean() || self.is_mixin() || self.is_value()
    }

    /// Instances can be identified by a bookmark
    pub fn is_bookmarkable(&self) -> bool {
        self.is_domain_object() || self.is_managed_bean()
    }
}

impl fmt::Display for BeanSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BeanSort::Value => "VALUE",
            BeanSort::ViewModel => "VIEW_MODEL",
            BeanSort::Entity => "ENTITY",
            BeanSort::Mixin => "MIXIN",
            BeanSort::ManagedBeanContributing => "MANAGED_BEAN_CONTRIBUTING",
            BeanSort::ManagedBeanNotContributing => "MANAGED_BEAN_NOT_CONTRIBUTING",
            BeanSort::Abstract => "ABSTRACT",
            BeanSort::Vetoed => "VETOED",
            BeanSort::Collection => "COLLECTION",
            BeanSort::Unknown => "UNKNOWN",
        };
        write!(f, "{}", s)
    }
}
