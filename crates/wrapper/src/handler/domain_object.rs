//! Calls on wrapped domain objects and mixins
//!
//! A call is resolved to a member and a [`MemberIntent`] through the spec's
//! method index. For a mixin wrapper the only member method is the mixin's
//! main method, and it resolves to the member the mixin contributes to its
//! mixee: rules are those of the contributed member, evaluated against the
//! mixee, while the body runs against the mixin instance.

use super::plural::PluralHandler;
use super::{handle_failure, single_arg, Phases, WrapperContext};
use crate::control::{Command, SyncControl};
use crate::error::{WrapperError, WrapperResult};
use crate::intent::MemberIntent;
use crate::proxy::Invoked;
use causeway_core::{Class, DomainNature, Pojo, Value};
use causeway_metamodel::{
    InteractionEvent, InteractionEventKind, InteractionHead, ObjectAction, ObjectMember,
    ObjectSpecification, OneToManyAssociation, OneToOneAssociation,
};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
struct MixinBinding {
    mixee: Pojo,
    mixee_spec: Arc<ObjectSpecification>,
    main: String,
}

#[derive(Clone)]
pub(crate) struct DomainObjectHandler {
    ctx: Arc<WrapperContext>,
    spec: Arc<ObjectSpecification>,
    target: Pojo,
    mixin: Option<MixinBinding>,
    control: SyncControl,
}

impl DomainObjectHandler {
    pub(crate) fn for_object(
        ctx: Arc<WrapperContext>,
        target: Pojo,
        control: SyncControl,
    ) -> WrapperResult<Self> {
        let spec = ctx.loader.spec_for_type_else_fail(target.class())?;
        Ok(Self {
            ctx,
            spec,
            target,
            mixin: None,
            control,
        })
    }

    pub(crate) fn for_mixin(
        ctx: Arc<WrapperContext>,
        mixin_class: &Class,
        mixee: Pojo,
        control: SyncControl,
    ) -> WrapperResult<Self> {
        let DomainNature::Mixin { main, .. } = mixin_class.nature() else {
            return Err(WrapperError::illegal_argument(format!(
                "{} is not a mixin",
                mixin_class
            )));
        };
        let target = mixin_class.instantiate_mixin(&mixee).ok_or_else(|| {
            WrapperError::illegal_state(format!("mixin {} has no constructor", mixin_class))
        })?;
        let spec = ctx.loader.spec_for_type_else_fail(mixin_class)?;
        let mixee_spec = ctx.loader.spec_for_type_else_fail(mixee.class())?;
        Ok(Self {
            ctx,
            spec,
            target,
            mixin: Some(MixinBinding {
                mixee,
                mixee_spec,
                main: main.clone(),
            }),
            control,
        })
    }

    pub(crate) fn spec(&self) -> &Arc<ObjectSpecification> {
        &self.spec
    }

    pub(crate) fn target(&self) -> &Pojo {
        &self.target
    }

    pub(crate) fn mixee(&self) -> Option<&Pojo> {
        self.mixin.as_ref().map(|m| &m.mixee)
    }

    pub(crate) fn control(&self) -> &SyncControl {
        &self.control
    }

    pub(crate) fn context(&self) -> &Arc<WrapperContext> {
        &self.ctx
    }

    fn phases(&self) -> Phases<'_> {
        Phases::new(&self.ctx, &self.control)
    }

    /// Head the member's rules are evaluated in
    pub(crate) fn head_for(&self, member: &ObjectMember) -> WrapperResult<InteractionHead> {
        match &self.mixin {
            Some(binding) => Ok(InteractionHead::mixin(
                binding.mixee.clone(),
                self.target.clone(),
            )),
            None => Ok(member.head_for(&self.target)?),
        }
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Call `method` by name
    pub(crate) fn invoke(&self, method: &str, args: &[Value]) -> WrapperResult<Invoked> {
        debug!(
            target: "causeway::wrapper",
            method,
            class = %self.target.class(),
            mixin = self.mixin.is_some(),
            "wrapped call"
        );
        self.guard(|| self.dispatch(method, args), Invoked::Value)
    }

    /// Run `call`, routing failures through the exception handler
    pub(crate) fn guard<T>(
        &self,
        call: impl FnOnce() -> WrapperResult<T>,
        recover: impl FnOnce(Value) -> T,
    ) -> WrapperResult<T> {
        handle_failure(&self.control, call(), recover)
    }

    fn dispatch(&self, method: &str, args: &[Value]) -> WrapperResult<Invoked> {
        if let Some(intent) = MemberIntent::special(method, args.len()) {
            return self.special(intent, args).map(Invoked::Value);
        }
        let (member, intent) = self.resolve(method)?;
        if intent.is_supporting() {
            return Err(WrapperError::unsupported(format!(
                "Cannot invoke supporting method '{}'; the wrapper applies it as part of {}",
                method,
                member.identifier()
            )));
        }
        match (&member, intent) {
            (ObjectMember::Property(p), MemberIntent::Accessor) => {
                self.read_property(p).map(Invoked::Value)
            }
            (ObjectMember::Property(p), MemberIntent::Modify) => {
                let value = single_arg(method, args)?.clone();
                self.modify_property(p, value).map(|()| Invoked::Value(Value::Null))
            }
            (ObjectMember::Property(p), MemberIntent::Clear) => {
                self.clear_property(p).map(|()| Invoked::Value(Value::Null))
            }
            (ObjectMember::Collection(c), MemberIntent::Accessor) => self.read_collection(c),
            (ObjectMember::Action(a), MemberIntent::Execute) => {
                self.execute_action(a, args).map(Invoked::Value)
            }
            (member, intent) => Err(WrapperError::illegal_state(format!(
                "{:?} does not apply to {}",
                intent,
                member.identifier()
            ))),
        }
    }

    fn resolve(&self, method: &str) -> WrapperResult<(ObjectMember, MemberIntent)> {
        match &self.mixin {
            Some(binding) => {
                if method != binding.main {
                    return Err(WrapperError::illegal_argument(format!(
                        "Method '{}' is not the main method '{}' of mixin {}",
                        method,
                        binding.main,
                        self.target.class()
                    )));
                }
                let member = binding
                    .mixee_spec
                    .mixed_in_member_for(self.target.class())?
                    .ok_or_else(|| {
                        WrapperError::illegal_state(format!(
                            "Could not locate the member mixin {} contributes to {}",
                            self.target.class(),
                            binding.mixee_spec.logical_type_name()
                        ))
                    })?;
                let intent = match member {
                    ObjectMember::Action(_) => MemberIntent::Execute,
                    _ => MemberIntent::Accessor,
                };
                Ok((member, intent))
            }
            None => {
                let (member, role) = self.spec.lookup_method(method)?.ok_or_else(|| {
                    WrapperError::illegal_argument(format!(
                        "Method '{}' is not a member of {}",
                        method,
                        self.spec.logical_type_name()
                    ))
                })?;
                Ok((member, MemberIntent::from_role(role)))
            }
        }
    }

    /// Member by id; for a mixin wrapper only the contributed member
    pub(crate) fn member(&self, id: &str) -> WrapperResult<ObjectMember> {
        let found = match &self.mixin {
            Some(binding) => binding
                .mixee_spec
                .mixed_in_member_for(self.target.class())?
                .filter(|m| m.id() == id),
            None => self.spec.member(id)?,
        };
        found.ok_or_else(|| {
            WrapperError::illegal_argument(format!(
                "No member '{}' on {}",
                id,
                self.spec.logical_type_name()
            ))
        })
    }

    // ========================================================================
    // Members
    // ========================================================================

    pub(crate) fn read_property(&self, property: &Arc<OneToOneAssociation>) -> WrapperResult<Value> {
        let head = self.head_for(&ObjectMember::Property(Arc::clone(property)))?;
        let phases = self.phases();
        phases.check(|by| property.is_visible(&head, by))?;
        phases.execute(|| {
            let value = property.get(&head)?;
            phases.notify(InteractionEvent::new(
                InteractionEventKind::PropertyAccess {
                    value: value.clone(),
                },
                property.identifier().clone(),
                head.owner().clone(),
            ));
            Ok(value)
        })
    }

    pub(crate) fn modify_property(
        &self,
        property: &Arc<OneToOneAssociation>,
        value: Value,
    ) -> WrapperResult<()> {
        let head = self.head_for(&ObjectMember::Property(Arc::clone(property)))?;
        let phases = self.phases();
        phases.check(|by| property.is_visible(&head, by))?;
        phases.check(|by| property.is_usable(&head, by))?;
        phases.check(|by| property.is_association_valid(&head, &value, by))?;
        phases.execute(|| {
            phases.command(Command::new(
                property.identifier().clone(),
                MemberIntent::Modify,
                head.owner().clone(),
                vec![value.clone()],
            ));
            property.set(&head, value)?;
            Ok(Value::Null)
        })?;
        Ok(())
    }

    pub(crate) fn clear_property(&self, property: &Arc<OneToOneAssociation>) -> WrapperResult<()> {
        let head = self.head_for(&ObjectMember::Property(Arc::clone(property)))?;
        let phases = self.phases();
        phases.check(|by| property.is_visible(&head, by))?;
        phases.check(|by| property.is_usable(&head, by))?;
        phases.check(|by| property.is_association_valid(&head, &Value::Null, by))?;
        phases.execute(|| {
            phases.command(Command::new(
                property.identifier().clone(),
                MemberIntent::Clear,
                head.owner().clone(),
                Vec::new(),
            ));
            property.clear(&head)?;
            Ok(Value::Null)
        })?;
        Ok(())
    }

    /// Read a collection; lists and maps come back wrapped
    pub(crate) fn read_collection(
        &self,
        collection: &Arc<OneToManyAssociation>,
    ) -> WrapperResult<Invoked> {
        let head = self.head_for(&ObjectMember::Collection(Arc::clone(collection)))?;
        let phases = self.phases();
        phases.check(|by| collection.is_visible(&head, by))?;
        let value = phases.execute(|| {
            let value = collection.get(&head)?;
            phases.notify(InteractionEvent::new(
                InteractionEventKind::CollectionAccess,
                collection.identifier().clone(),
                head.owner().clone(),
            ));
            Ok(value)
        })?;
        Ok(PluralHandler::wrap(
            Arc::clone(&self.ctx),
            head,
            Arc::clone(collection),
            self.control.clone(),
            value,
        ))
    }

    pub(crate) fn execute_action(
        &self,
        action: &Arc<ObjectAction>,
        args: &[Value],
    ) -> WrapperResult<Value> {
        let head = self.head_for(&ObjectMember::Action(Arc::clone(action)))?;
        let phases = self.phases();
        phases.check(|by| action.is_visible(&head, by))?;
        phases.check(|by| action.is_usable(&head, by))?;
        phases.check(|by| action.is_arguments_valid(&head, args, by))?;
        phases.execute(|| {
            phases.command(Command::new(
                action.identifier().clone(),
                MemberIntent::Execute,
                head.owner().clone(),
                args.to_vec(),
            ));
            Ok(action.execute(&head, args)?)
        })
    }

    // ========================================================================
    // Special methods
    // ========================================================================

    fn special(&self, intent: MemberIntent, args: &[Value]) -> WrapperResult<Value> {
        match intent {
            MemberIntent::Title => self.title().map(Value::Str),
            MemberIntent::Save => self.save().map(|()| Value::Null),
            MemberIntent::ToString => match self.target.class().find_method("toString") {
                Some(method) if method.param_count() == 0 => Ok(method.invoke(&self.target, &[])?),
                _ => self.title().map(Value::Str),
            },
            MemberIntent::Equals => Ok(Value::Bool(match single_arg("equals", args)? {
                Value::Object(other) => other.same_instance(&self.target),
                _ => false,
            })),
            MemberIntent::HashCode => Ok(Value::Int(self.target.identity_hash() as i64)),
            MemberIntent::Origin => Ok(Value::Object(self.target.clone())),
            other => Err(WrapperError::illegal_state(format!(
                "{:?} is not a special method",
                other
            ))),
        }
    }

    pub(crate) fn title(&self) -> WrapperResult<String> {
        let title = self.spec.title(&self.target)?;
        self.phases().notify(InteractionEvent::new(
            InteractionEventKind::ObjectTitle {
                title: title.clone(),
            },
            self.spec.identifier(),
            self.target.clone(),
        ));
        Ok(title)
    }

    /// Check object-level validity, then hand the object to the persister
    pub(crate) fn save(&self) -> WrapperResult<()> {
        let phases = self.phases();
        phases.check(|by| self.spec.is_object_valid(&self.target, by))?;
        phases.execute(|| {
            let persister = self.ctx.persister.as_ref().ok_or_else(|| {
                WrapperError::illegal_state(format!(
                    "no object persister configured; cannot save {}",
                    self.spec.logical_type_name()
                ))
            })?;
            persister.persist(&self.target)?;
            Ok(Value::Null)
        })?;
        Ok(())
    }
}
