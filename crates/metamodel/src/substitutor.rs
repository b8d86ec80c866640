//! Class substitution
//!
//! Before a spec is created the loader asks the substitutor registry what to
//! do with the class: keep it, skip it (never introspect), or replace it with
//! another class (e.g. strip an enhancement proxy down to the domain class).

use causeway_core::Class;
use dashmap::DashMap;
use std::sync::Arc;

/// Outcome of substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// Use the class as is
    Retain,
    /// Never introspect the class
    Never,
    /// Introspect this class instead
    ReplaceWith(Class),
}

impl Substitution {
    /// The class to introspect, if any
    pub fn apply(&self, class: &Class) -> Option<Class> {
        match self {
            Substitution::Retain => Some(class.clone()),
            Substitution::Never => None,
            Substitution::ReplaceWith(replacement) => Some(replacement.clone()),
        }
    }

    /// True for [`Substitution::Never`]
    pub fn is_never_introspect(&self) -> bool {
        matches!(self, Substitution::Never)
    }
}

/// One substitution rule
pub trait ClassSubstitutor: Send + Sync {
    /// `Retain` if this rule has no opinion
    fn substitution_for(&self, class: &Class) -> Substitution;
}

/// Honors `never_introspect` and `proxy_of` on the class descriptor
#[derive(Debug, Default)]
pub struct ClassSubstitutorDefault;

impl ClassSubstitutor for ClassSubstitutorDefault {
    fn substitution_for(&self, class: &Class) -> Substitution {
        if class.is_never_introspect() {
            return Substitution::Never;
        }
        match class.proxy_of() {
            Some(target) => Substitution::ReplaceWith(target.clone()),
            None => Substitution::Retain,
        }
    }
}

/// Consults its substitutors in order; the first non-`Retain` answer wins.
/// Results are memoized per class.
pub struct ClassSubstitutorRegistry {
    substitutors: Vec<Arc<dyn ClassSubstitutor>>,
    memo: DashMap<Class, Substitution>,
}

impl ClassSubstitutorRegistry {
    /// Registry over `substitutors`
    pub fn new(substitutors: Vec<Arc<dyn ClassSubstitutor>>) -> Self {
        Self {
            substitutors,
            memo: DashMap::new(),
        }
    }

    /// Substitution for `class`
    pub fn substitution(&self, class: &Class) -> Substitution {
        if let Some(memo) = self.memo.get(class) {
            return memo.value().clone();
        }
        let substitution = self
            .substitutors
            .iter()
            .map(|s| s.substitution_for(class))
            .find(|s| *s != Substitution::Retain)
            .unwrap_or(Substitution::Retain);
        self.memo.insert(class.clone(), substitution.clone());
        substitution
    }

    /// Forget memoized results
    pub fn clear(&self) {
        self.memo.clear();
    }
}

impl Default for ClassSubstitutorRegistry {
    fn default() -> Self {
        Self::new(vec![Arc::new(ClassSubstitutorDefault)])
    }
}
