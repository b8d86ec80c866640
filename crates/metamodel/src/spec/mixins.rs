//! Mixin index: mixee class → contributing mixin classes
//!
//! Mixins register here at TYPE level. Every registration bumps a
//! generation counter; holders memoize their mixed-in members against the
//! generation they were computed at, so a mixin discovered late is picked
//! up on the next query regardless of introspection order.

use super::members::{MixinOrigin, ObjectMember};
use super::{IntrospectionContext, ObjectSpecification};
use causeway_core::{Class, IntrospectionState, MetamodelResult};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Mixee → mixins, with a generation counter
#[derive(Debug, Default)]
pub struct MixinIndex {
    by_mixee: DashMap<String, Vec<Class>>,
    generation: AtomicU64,
}

impl MixinIndex {
    /// Empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `mixin` contributes to the class named `mixee`.
    /// Returns false if it was already recorded.
    pub fn register(&self, mixee: &str, mixin: Class) -> bool {
        {
            let mut mixins = self.by_mixee.entry(mixee.to_string()).or_default();
            if mixins.contains(&mixin) {
                return false;
            }
            mixins.push(mixin);
            // discovery order varies under parallel introspection
            mixins.sort();
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        true
    }

    /// Mixins contributing to `class` or any of its superclasses
    pub fn mixins_for(&self, class: &Class) -> Vec<Class> {
        let mut result = Vec::new();
        let mut current = Some(class);
        while let Some(c) = current {
            if let Some(mixins) = self.by_mixee.get(c.name()) {
                result.extend(mixins.iter().cloned());
            }
            current = c.superclass();
        }
        result
    }

    /// Current generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Number of mixee classes with at least one mixin
    pub fn len(&self) -> usize {
        self.by_mixee.len()
    }

    /// True if no mixins are registered
    pub fn is_empty(&self) -> bool {
        self.by_mixee.is_empty()
    }

    /// Forget all mixins
    pub fn clear(&self) {
        self.by_mixee.clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// Members contributed to `holder` by the mixins currently indexed.
/// A declared member with the same id wins over a contributed one.
pub(crate) fn compute_mixed_in_members(
    holder: &ObjectSpecification,
    ctx: &dyn IntrospectionContext,
) -> MetamodelResult<Vec<ObjectMember>> {
    let mut members: Vec<ObjectMember> = Vec::new();
    for mixin_class in ctx.mixin_index().mixins_for(holder.class()) {
        let Some(mixin_spec) = ctx.load_spec(&mixin_class, IntrospectionState::FullyIntrospected)?
        else {
            continue;
        };
        let Some(facet) = mixin_spec.mixin_facet() else {
            continue;
        };
        // a missing main method is reported by validation
        let Some(main) = mixin_spec.declared_member(facet.main()) else {
            continue;
        };
        if holder.declared_member(facet.member_name()).is_some()
            || members.iter().any(|m| m.id() == facet.member_name())
        {
            continue;
        }
        members.push(main.mixed_into(
            holder.logical_type(),
            facet.member_name(),
            MixinOrigin::new(mixin_class.clone(), facet.main()),
        ));
    }
    debug!(
        target: "causeway::spec",
        holder = %holder.logical_type(),
        count = members.len(),
        "Computed mixed-in members"
    );
    Ok(members)
}
