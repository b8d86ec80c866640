//! Calls on collections and maps read through a wrapper
//!
//! Read-only methods are intercepted: the owning association's visibility is
//! re-checked, the call is delegated (unless execution is skipped, which
//! yields null), and a collection-method event is published. Mutating methods are vetoed outright, since changing the
//! plural directly would bypass the owner's rules.

use super::{handle_failure, single_arg, Phases, WrapperContext};
use crate::control::SyncControl;
use crate::error::{WrapperError, WrapperResult};
use crate::proxy::{Invoked, WrappedCollection, WrappedMap};
use causeway_core::{SharedList, SharedMap, Value};
use causeway_metamodel::{
    InteractionEvent, InteractionEventKind, InteractionHead, OneToManyAssociation,
};
use std::sync::Arc;

const LIST_INTERCEPTED: &[&str] = &["contains", "size", "is_empty", "get"];
const LIST_VETOED: &[&str] = &["add", "remove", "clear", "retain_all"];
const MAP_INTERCEPTED: &[&str] = &["contains_key", "contains_value", "size", "is_empty", "get"];
const MAP_VETOED: &[&str] = &["put", "remove", "clear"];

#[derive(Debug, Clone)]
pub(crate) enum Plural {
    List(SharedList),
    Map(SharedMap),
}

#[derive(Clone)]
pub(crate) struct PluralHandler {
    ctx: Arc<WrapperContext>,
    head: InteractionHead,
    association: Arc<OneToManyAssociation>,
    control: SyncControl,
    plural: Plural,
}

impl PluralHandler {
    pub(crate) fn new(
        ctx: Arc<WrapperContext>,
        head: InteractionHead,
        association: Arc<OneToManyAssociation>,
        control: SyncControl,
        plural: Plural,
    ) -> Self {
        Self {
            ctx,
            head,
            association,
            control,
            plural,
        }
    }

    /// Wrap a value read from `association`; non-plurals pass through
    pub(crate) fn wrap(
        ctx: Arc<WrapperContext>,
        head: InteractionHead,
        association: Arc<OneToManyAssociation>,
        control: SyncControl,
        value: Value,
    ) -> Invoked {
        match value {
            Value::List(list) => Invoked::Collection(WrappedCollection::new(Self::new(
                ctx,
                head,
                association,
                control,
                Plural::List(list),
            ))),
            Value::Map(map) => Invoked::Map(WrappedMap::new(Self::new(
                ctx,
                head,
                association,
                control,
                Plural::Map(map),
            ))),
            other => Invoked::Value(other),
        }
    }

    pub(crate) fn association(&self) -> &Arc<OneToManyAssociation> {
        &self.association
    }

    pub(crate) fn plural(&self) -> &Plural {
        &self.plural
    }

    /// Call `method` on the plural
    pub(crate) fn invoke(&self, method: &str, args: &[Value]) -> WrapperResult<Value> {
        let (intercepted, vetoed) = match self.plural {
            Plural::List(_) => (LIST_INTERCEPTED, LIST_VETOED),
            Plural::Map(_) => (MAP_INTERCEPTED, MAP_VETOED),
        };
        if vetoed.contains(&method) {
            return Err(WrapperError::unsupported(format!(
                "Method '{}' may not be called directly.",
                method
            )));
        }
        if !intercepted.contains(&method) {
            return Err(WrapperError::illegal_argument(format!(
                "Method '{}' is not available on a wrapped {}",
                method,
                match self.plural {
                    Plural::List(_) => "collection",
                    Plural::Map(_) => "map",
                }
            )));
        }
        handle_failure(&self.control, self.intercept(method, args), |v| v)
    }

    fn intercept(&self, method: &str, args: &[Value]) -> WrapperResult<Value> {
        let phases = Phases::new(&self.ctx, &self.control);
        phases.check(|by| self.association.is_visible(&self.head, by))?;
        phases.execute(|| {
            let value = self.delegate(method, args)?;
            phases.notify(InteractionEvent::new(
                InteractionEventKind::CollectionMethod {
                    method: method.to_string(),
                    args: args.to_vec(),
                },
                self.association.identifier().clone(),
                self.head.owner().clone(),
            ));
            Ok(value)
        })
    }

    fn delegate(&self, method: &str, args: &[Value]) -> WrapperResult<Value> {
        let value = match (&self.plural, method) {
            (Plural::List(list), "contains") => Value::Bool(list.contains(single_arg(method, args)?)),
            (Plural::List(list), "size") => Value::Int(list.len() as i64),
            (Plural::List(list), "is_empty") => Value::Bool(list.is_empty()),
            (Plural::List(list), "get") => {
                let index = single_arg(method, args)?.to_int_arg(0)?;
                usize::try_from(index)
                    .ok()
                    .and_then(|i| list.get(i))
                    .unwrap_or(Value::Null)
            }
            (Plural::Map(map), "contains_key") => {
                Value::Bool(map.contains_key(&single_arg(method, args)?.to_string_arg(0)?))
            }
            (Plural::Map(map), "contains_value") => {
                Value::Bool(map.contains_value(single_arg(method, args)?))
            }
            (Plural::Map(map), "size") => Value::Int(map.len() as i64),
            (Plural::Map(map), "is_empty") => Value::Bool(map.is_empty()),
            (Plural::Map(map), "get") => map
                .get(&single_arg(method, args)?.to_string_arg(0)?)
                .unwrap_or(Value::Null),
            (_, other) => {
                return Err(WrapperError::illegal_state(format!(
                    "no delegate for '{}'",
                    other
                )))
            }
        };
        Ok(value)
    }
}
