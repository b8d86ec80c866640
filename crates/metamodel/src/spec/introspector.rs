//! Member introspection by naming convention
//!
//! | Method | Becomes |
//! |--------|---------|
//! | `getX()` / `isX()` (bool) | property `x`, or collection `x` if plural |
//! | `setX(v)` | mutator of property `x` |
//! | `clearX()` | clear method of property `x` |
//! | `hideX`, `disableX`, `validateX`, `validate<N>X`, `defaultX`, `default<N>X`, `choicesX`, `choices<N>X` | supporting methods |
//! | `title`, `toString`, `equals`, `hashCode`, `validate()` | special, not members |
//! | programmatic methods | ignored |
//! | anything else | action |
//!
//! A mixin class contributes exactly one member, built from its main method.

use super::members::{
    ActionParameter, MethodRole, ObjectAction, ObjectMember, OneToManyAssociation,
    OneToOneAssociation,
};
use super::{DeclaredMembers, IntrospectionContext, ObjectSpecification};
use crate::facets::factories::{
    FacetFactory, MemberProcessingContext, ParamProcessingContext, SupportingMethods,
};
use crate::facets::FacetHolder;
use causeway_core::{
    capitalize, decapitalize, FeatureKind, IntrospectionState, MetamodelResult,
    MethodDescriptor, MixinContribution, TypeRef,
};
use std::sync::Arc;

/// Methods that never become members
pub const SPECIAL_METHODS: &[&str] = &["title", "toString", "equals", "hashCode"];

fn is_special(method: &MethodDescriptor) -> bool {
    SPECIAL_METHODS.contains(&method.name())
        || (method.name() == "validate" && method.param_count() == 0)
}

/// `getName` → `name`; `isActive` → `active` (bool only)
fn property_name(method: &MethodDescriptor) -> Option<String> {
    if method.param_count() != 0 || method.returns().is_void() {
        return None;
    }
    let rest = match method.name().strip_prefix("get") {
        Some(rest) => rest,
        None if *method.returns() == TypeRef::boolean() => method.name().strip_prefix("is")?,
        None => return None,
    };
    match rest.chars().next() {
        Some(c) if c.is_ascii_uppercase() => Some(decapitalize(rest)),
        _ => None,
    }
}

/// `setName` → `name`
fn setter_name(method: &MethodDescriptor) -> Option<String> {
    if method.param_count() != 1 {
        return None;
    }
    let rest = method.name().strip_prefix("set")?;
    match rest.chars().next() {
        Some(c) if c.is_ascii_uppercase() => Some(decapitalize(rest)),
        _ => None,
    }
}

struct Builder<'a> {
    spec: &'a ObjectSpecification,
    factories: Vec<Arc<dyn FacetFactory>>,
    supporting: SupportingMethods,
    members: DeclaredMembers,
}

impl<'a> Builder<'a> {
    fn member_facets(
        &mut self,
        kind: FeatureKind,
        member_name: &str,
        method: &MethodDescriptor,
    ) -> MetamodelResult<FacetHolder> {
        let mut facets = FacetHolder::new();
        for factory in &self.factories {
            factory.process_member(&mut MemberProcessingContext {
                class: self.spec.class(),
                kind,
                member_name,
                method,
                supporting: &mut self.supporting,
                facets: &mut facets,
            })?;
        }
        Ok(facets)
    }

    fn add_property(
        &mut self,
        id: &str,
        getter: MethodDescriptor,
        setter: Option<MethodDescriptor>,
    ) -> MetamodelResult<()> {
        let clearer = self.supporting.take(&format!("clear{}", capitalize(id)));
        let facets = self.member_facets(FeatureKind::Property, id, &getter)?;
        let property = OneToOneAssociation::new(
            self.spec.logical_type(),
            id,
            getter,
            setter,
            clearer,
            facets,
        );
        self.members.properties.push(Arc::new(property));
        Ok(())
    }

    fn add_collection(&mut self, id: &str, getter: MethodDescriptor) -> MetamodelResult<()> {
        let facets = self.member_facets(FeatureKind::Collection, id, &getter)?;
        let collection = OneToManyAssociation::new(self.spec.logical_type(), id, getter, facets);
        self.members.collections.push(Arc::new(collection));
        Ok(())
    }

    fn add_action(&mut self, method: MethodDescriptor) -> MetamodelResult<()> {
        let id = method.name().to_string();
        let facets = self.member_facets(FeatureKind::Action, &id, &method)?;
        let mut params = Vec::with_capacity(method.param_count());
        for (position, param_type) in method.params().iter().enumerate() {
            let mut param_facets = FacetHolder::new();
            for factory in &self.factories {
                factory.process_param(&mut ParamProcessingContext {
                    class: self.spec.class(),
                    action_name: &id,
                    action_method: &method,
                    position,
                    param_type,
                    supporting: &mut self.supporting,
                    facets: &mut param_facets,
                })?;
            }
            params.push(ActionParameter::new(position, param_type.clone(), param_facets));
        }
        let action = ObjectAction::new(self.spec.logical_type(), &id, method, params, facets);
        self.members.actions.push(Arc::new(action));
        Ok(())
    }

    fn add_mixin_main(
        &mut self,
        main: MethodDescriptor,
        contribution: MixinContribution,
    ) -> MetamodelResult<()> {
        let id = main.name().to_string();
        match contribution {
            MixinContribution::Action => self.add_action(main),
            MixinContribution::Property => self.add_property(&id, main, None),
            MixinContribution::Collection => self.add_collection(&id, main),
        }
    }

    fn build_index(&mut self) {
        let mut index = std::mem::take(&mut self.members.method_index);
        for p in &self.members.properties {
            let member = ObjectMember::Property(Arc::clone(p));
            let cap = capitalize(p.id());
            index.insert(p.getter().name().to_string(), (member.clone(), MethodRole::Accessor));
            if let Some(setter) = p.setter() {
                index.insert(setter.name().to_string(), (member.clone(), MethodRole::Modifier));
            }
            if let Some(clearer) = p.clearer() {
                index.insert(clearer.name().to_string(), (member.clone(), MethodRole::Clearer));
            }
            for (prefix, role) in [
                ("hide", MethodRole::Hide),
                ("disable", MethodRole::Disable),
                ("validate", MethodRole::Validate),
                ("default", MethodRole::Default),
                ("choices", MethodRole::Choices),
            ] {
                index.insert(format!("{}{}", prefix, cap), (member.clone(), role));
            }
        }
        for c in &self.members.collections {
            let member = ObjectMember::Collection(Arc::clone(c));
            let cap = capitalize(c.id());
            index.insert(c.getter().name().to_string(), (member.clone(), MethodRole::Accessor));
            index.insert(format!("hide{}", cap), (member.clone(), MethodRole::Hide));
            index.insert(format!("disable{}", cap), (member, MethodRole::Disable));
        }
        for a in &self.members.actions {
            let member = ObjectMember::Action(Arc::clone(a));
            let cap = capitalize(a.id());
            index.insert(a.id().to_string(), (member.clone(), MethodRole::Action));
            for (prefix, role) in [
                ("hide", MethodRole::Hide),
                ("disable", MethodRole::Disable),
                ("validate", MethodRole::Validate),
            ] {
                index.insert(format!("{}{}", prefix, cap), (member.clone(), role));
            }
            for position in 0..a.parameters().len() {
                for (prefix, role) in [
                    ("validate", MethodRole::ValidateParam(position)),
                    ("default", MethodRole::DefaultParam(position)),
                    ("choices", MethodRole::ChoicesParam(position)),
                ] {
                    index.insert(format!("{}{}{}", prefix, position, cap), (member.clone(), role));
                }
            }
        }
        // only names the class actually declares
        let declared: Vec<String> = self
            .spec
            .class()
            .all_methods()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        index.retain(|name, _| declared.contains(name));
        self.members.method_index = index;
    }
}

/// Build the declared members of `spec`, apply post-processors and load
/// (without introspecting) the specs of referenced types.
pub(crate) fn build_members(
    spec: &ObjectSpecification,
    ctx: &dyn IntrospectionContext,
) -> MetamodelResult<DeclaredMembers> {
    let model = ctx.programming_model();
    let methods: Vec<MethodDescriptor> = spec
        .class()
        .all_methods()
        .into_iter()
        .filter(|m| !m.annotations().programmatic)
        .collect();

    let mut builder = Builder {
        spec,
        factories: model.factories(),
        supporting: SupportingMethods::collect(methods.iter()),
        members: DeclaredMembers::default(),
    };

    if let Some(mixin) = spec.mixin_facet() {
        if let Some(main) = methods.iter().find(|m| m.name() == mixin.main()) {
            builder.add_mixin_main(main.clone(), mixin.contribution())?;
        }
    } else {
        let mut getters: Vec<(String, MethodDescriptor)> = Vec::new();
        let mut setters: Vec<(String, MethodDescriptor)> = Vec::new();
        let mut actions: Vec<MethodDescriptor> = Vec::new();
        for method in &methods {
            if is_special(method) || builder.supporting.contains(method.name()) {
                continue;
            }
            if let Some(id) = property_name(method) {
                if !getters.iter().any(|(existing, _)| *existing == id) {
                    getters.push((id, method.clone()));
                }
            } else if let Some(id) = setter_name(method) {
                setters.push((id, method.clone()));
            } else {
                actions.push(method.clone());
            }
        }

        for (id, getter) in getters {
            if getter.returns().is_plural() {
                builder.add_collection(&id, getter)?;
            } else {
                let setter = setters
                    .iter()
                    .position(|(name, _)| *name == id)
                    .map(|pos| setters.remove(pos).1);
                builder.add_property(&id, getter, setter)?;
            }
        }
        // setters without a matching getter are plain actions
        actions.extend(setters.into_iter().map(|(_, m)| m));
        for method in actions {
            builder.add_action(method)?;
        }
    }

    for post_processor in model.post_processors() {
        for property in builder.members.properties.iter_mut() {
            if let Some(property) = Arc::get_mut(property) {
                post_processor.process_property(spec, property);
            }
        }
        for collection in builder.members.collections.iter_mut() {
            if let Some(collection) = Arc::get_mut(collection) {
                post_processor.process_collection(spec, collection);
            }
        }
        for action in builder.members.actions.iter_mut() {
            if let Some(action) = Arc::get_mut(action) {
                post_processor.process_action(spec, action);
            }
        }
    }

    builder.build_index();
    builder.members.orphaned = builder.supporting.orphans();

    // discover referenced types; introspected lazily on first use
    let mut referenced: Vec<&TypeRef> = Vec::new();
    referenced.extend(builder.members.properties.iter().map(|p| p.type_ref()));
    referenced.extend(builder.members.collections.iter().map(|c| c.type_ref()));
    for action in &builder.members.actions {
        referenced.push(action.return_type());
        referenced.extend(action.parameters().iter().map(|p| p.type_ref()));
    }
    for type_ref in referenced {
        if let Some(class) = ctx.resolve_class(type_ref) {
            if class != *spec.class() {
                ctx.load_spec(&class, IntrospectionState::NotIntrospected)?;
            }
        }
    }

    Ok(builder.members)
}
