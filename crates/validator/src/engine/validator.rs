//! Traversal engine
//!
//! [`Validator`] walks a live value against resolved schemas and records
//! every failure in the context's [`ErrorMap`]. It never stops at the first
//! failure; the exceptions are a failed required rule, which skips the rest of
//! that member, and the faults (depth overflow, cancellation), which abort the
//! whole call.
//!
//! # Per member
//!
//! 1. absent + nullable + not required: skip
//! 2. enter `prefix.member`
//! 3. required rule first; on failure record and stop
//! 4. remaining rules in declared order
//! 5. depth check before any nested descent
//! 6. enumerable: each element at `member[i]` gets the element rules and,
//!    with a nested schema, its own descent; nested lists are walked at
//!    `member[i][j]`
//! 7. otherwise descend into the nested schema
//!
//! Only objects are descended into. Null and scalar elements cost no depth,
//! so an empty list at the limit is fine.
//!
//! # Per type
//!
//! Members in declared order, then the matching subtype schema at the same
//! prefix, then the self-validation hook.

use std::sync::Arc;

use tracing::{debug, debug_span, error, trace};

use crate::foundation::{ErrorMap, Object, TypeName, ValidationFault, Value};
use crate::rules::{Rule, RuleContext};
use crate::schema::{
    DeclaredType, HookContext, MemberDef, MemberDescriptor, SchemaCache, SelfValidate, TypeSchema,
};

use super::config::{DepthPolicy, ValidatorOptions};
use super::context::{PathScope, ValidationContext};

/// Recursive validator over cached schemas.
///
/// Cheap to clone and safe to share: the only shared state is the cache.
#[derive(Debug, Clone)]
pub struct Validator {
    cache: Arc<SchemaCache>,
    options: ValidatorOptions,
}

impl Validator {
    /// Creates a validator with default options.
    #[must_use]
    pub fn new(cache: Arc<SchemaCache>) -> Self {
        Self {
            cache,
            options: ValidatorOptions::default(),
        }
    }

    /// Replaces the options.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// The schema cache.
    #[must_use]
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Fresh context configured from this validator's options.
    #[must_use]
    pub fn context(&self) -> ValidationContext {
        ValidationContext::from_options(&self.options)
    }

    // ========================================================================
    // ENTRY POINTS
    // ========================================================================

    /// Validates `value` as `type_name` in a fresh context.
    ///
    /// # Errors
    ///
    /// A [`ValidationFault`] when the call was aborted. Validation failures
    /// are returned in the map, never as `Err`.
    pub fn check(&self, type_name: &TypeName, value: &Value) -> Result<ErrorMap, ValidationFault> {
        let mut cx = self.context();
        self.validate_type(type_name, value, &mut cx)?;
        Ok(cx.into_errors())
    }

    /// Resolves the schema of `type_name` and validates `value` against it.
    ///
    /// A type without schema is not validatable and produces no errors.
    pub fn validate_type(
        &self,
        type_name: &TypeName,
        value: &Value,
        cx: &mut ValidationContext,
    ) -> Result<(), ValidationFault> {
        let span = debug_span!("validate", type_name = %type_name);
        let _enter = span.enter();

        let Some(schema) = self.cache.get_or_resolve(type_name)? else {
            trace!("no schema, nothing to validate");
            return Ok(());
        };
        self.validate(&schema, value, cx)
    }

    /// Validates a bound parameter.
    ///
    /// The resolved parameter descriptor puts the parameter name at the root
    /// of every key. A parameter no resolver describes falls back to its
    /// declared type's schema at the current prefix.
    pub fn validate_parameter(
        &self,
        parameter: &MemberDef,
        value: &Value,
        cx: &mut ValidationContext,
    ) -> Result<(), ValidationFault> {
        cx.check_cancelled()?;
        if let Some(member) = self.cache.resolve_parameter(parameter)? {
            return self.validate_member(&member, value, cx);
        }

        let Some(target) = parameter.declared.named_target() else {
            return Ok(());
        };
        match value {
            Value::List(items) if parameter.declared.is_enumerable() => {
                let owner = parameter.declared.to_string();
                let element_type = parameter.declared.element_type();
                self.visit_nested_items(&parameter.name, &owner, target, element_type, items, cx)
            }
            _ => self.validate_nested(target, value, cx),
        }
    }

    /// Per-type validation at the context's current prefix.
    pub fn validate(
        &self,
        schema: &TypeSchema,
        value: &Value,
        cx: &mut ValidationContext,
    ) -> Result<(), ValidationFault> {
        match value {
            Value::Object(object) => self.validate_object(schema, object, cx),
            _ => Ok(()),
        }
    }

    /// Per-member validation at the context's current prefix.
    pub fn validate_member(
        &self,
        member: &MemberDescriptor,
        value: &Value,
        cx: &mut ValidationContext,
    ) -> Result<(), ValidationFault> {
        let owner = member.declared_type().to_string();
        self.visit_member(member, &owner, value, cx)
    }

    // ========================================================================
    // TRAVERSAL
    // ========================================================================

    fn validate_object(
        &self,
        schema: &TypeSchema,
        object: &Object,
        cx: &mut ValidationContext,
    ) -> Result<(), ValidationFault> {
        let recorded_before = cx.errors().message_count();

        for member in schema.members() {
            cx.check_cancelled()?;
            if cx.is_saturated() {
                return Ok(());
            }
            let value = object.get(member.name());
            self.visit_member(member, schema.type_name().as_str(), &value, cx)?;
        }

        let runtime = object.type_name();
        if runtime != schema.type_name()
            && schema.subtypes().contains(runtime)
            && let Some(subtype) = self.cache.get_or_resolve(runtime)?
        {
            trace!(base = %schema.type_name(), subtype = %runtime, "applying subtype schema");
            self.validate_object(&subtype, object, cx)?;
        }

        if let Some(hook) = schema.self_validation() {
            let members_failed = cx.errors().message_count() > recorded_before;
            if cx.is_saturated() || (members_failed && !self.options.validate_self_after_member_errors) {
                return Ok(());
            }
            run_hook(hook, object, cx);
        }
        Ok(())
    }

    fn visit_member(
        &self,
        member: &MemberDescriptor,
        owner: &str,
        value: &Value,
        cx: &mut ValidationContext,
    ) -> Result<(), ValidationFault> {
        if value.is_null() && member.is_nullable() && !member.is_required() {
            return Ok(());
        }

        let mut scope = cx.enter_member(member.name());

        let mut rules = member.rules().iter();
        if member.is_required()
            && let Some(required) = rules.next()
            && apply_rule(required, member, value, &mut scope)
        {
            return Ok(());
        }
        for rule in rules {
            apply_rule(rule, member, value, &mut scope);
        }

        let nested = member.nested_type();
        if member.is_enumerable() {
            let Some(items) = value.as_list() else {
                return Ok(());
            };
            if nested.is_none() && member.element_rules().is_empty() {
                return Ok(());
            }
            self.visit_elements(member, owner, items, nested, &mut scope)
        } else {
            match nested {
                Some(type_name) if value.as_object().is_some() => {
                    let mut inner = self.descend(member.name(), owner, &mut scope)?;
                    self.validate_nested(type_name, value, &mut inner)
                }
                _ => Ok(()),
            }
        }
    }

    fn visit_elements(
        &self,
        member: &MemberDescriptor,
        owner: &str,
        items: &[Value],
        nested: Option<&TypeName>,
        cx: &mut ValidationContext,
    ) -> Result<(), ValidationFault> {
        for (index, item) in items.iter().enumerate() {
            cx.check_cancelled()?;
            if cx.is_saturated() {
                break;
            }
            let mut element = cx.enter_index(index);
            for rule in member.element_rules() {
                apply_rule(rule, member, item, &mut element);
            }
            if let Some(type_name) = nested {
                let element_type = member.declared_type().element_type();
                self.visit_nested_element(member.name(), owner, type_name, element_type, item, &mut element)?;
            }
        }
        Ok(())
    }

    /// Walks list items below a member, without element rules.
    fn visit_nested_items(
        &self,
        member: &str,
        owner: &str,
        type_name: &TypeName,
        declared: Option<&DeclaredType>,
        items: &[Value],
        cx: &mut ValidationContext,
    ) -> Result<(), ValidationFault> {
        for (index, item) in items.iter().enumerate() {
            cx.check_cancelled()?;
            if cx.is_saturated() {
                break;
            }
            let mut element = cx.enter_index(index);
            self.visit_nested_element(member, owner, type_name, declared, item, &mut element)?;
        }
        Ok(())
    }

    /// One element already entered at its index. `declared` is the element's
    /// declared type, used to recognize lists of lists.
    fn visit_nested_element(
        &self,
        member: &str,
        owner: &str,
        type_name: &TypeName,
        declared: Option<&DeclaredType>,
        item: &Value,
        cx: &mut ValidationContext,
    ) -> Result<(), ValidationFault> {
        match item {
            Value::Object(_) => {
                let mut inner = self.descend(member, owner, cx)?;
                self.validate_nested(type_name, item, &mut inner)
            }
            Value::List(items) if declared.is_some_and(DeclaredType::is_enumerable) => {
                let element_type = declared.and_then(DeclaredType::element_type);
                match self.options.depth_policy {
                    DepthPolicy::EveryDescent => {
                        let mut inner = self.descend(member, owner, cx)?;
                        self.visit_nested_items(member, owner, type_name, element_type, items, &mut inner)
                    }
                    DepthPolicy::ObjectsOnly => {
                        self.visit_nested_items(member, owner, type_name, element_type, items, cx)
                    }
                }
            }
            _ => Ok(()),
        }
    }

    fn validate_nested(
        &self,
        type_name: &TypeName,
        value: &Value,
        cx: &mut ValidationContext,
    ) -> Result<(), ValidationFault> {
        match self.cache.get_or_resolve(type_name)? {
            Some(schema) => self.validate(&schema, value, cx),
            None => Ok(()),
        }
    }

    /// Enters one level deeper, or faults at the depth limit.
    fn descend<'a>(
        &self,
        member: &str,
        owner: &str,
        cx: &'a mut ValidationContext,
    ) -> Result<PathScope<'a>, ValidationFault> {
        if cx.depth() >= cx.max_depth() {
            debug!(
                max_depth = cx.max_depth(),
                member,
                owner,
                path = cx.path(),
                "maximum validation depth exceeded"
            );
            return Err(ValidationFault::MaxDepthExceeded {
                max_depth: cx.max_depth(),
                member: member.to_owned(),
                type_name: owner.to_owned(),
                path: cx.path().to_owned(),
            });
        }
        Ok(cx.descend())
    }
}

/// Runs a self-validation hook and records its failures.
///
/// A failure naming members is recorded under each `prefix.member`; one
/// naming none under the prefix itself. Identical messages merge.
fn run_hook(hook: &dyn SelfValidate, object: &Object, cx: &mut ValidationContext) {
    let failures = {
        let hook_cx = HookContext {
            type_name: object.type_name(),
            path: cx.path(),
            services: cx.services(),
        };
        hook.validate(object, &hook_cx)
    };

    for failure in failures {
        if failure.members.is_empty() {
            cx.record(failure.message);
            continue;
        }
        for name in &failure.members {
            let key = cx.member_key(name);
            cx.record_at(key, failure.message.clone());
        }
    }
}

/// Evaluates one rule at the context's path. Returns true if it failed.
///
/// A rule that cannot execute is logged and recorded as a failure at the
/// same path, so the rest of the graph is still validated.
fn apply_rule(rule: &Rule, member: &MemberDescriptor, value: &Value, cx: &mut ValidationContext) -> bool {
    let outcome = {
        let rule_cx = RuleContext::new(member.name(), member.display_name(), cx.path(), cx.services());
        rule.evaluate(value, &rule_cx)
    };
    match outcome {
        Ok(None) => false,
        Ok(Some(message)) => {
            cx.record(message);
            true
        }
        Err(err) => {
            error!(rule = rule.kind(), path = cx.path(), error = %err, "rule execution failed");
            cx.record(err.to_string());
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DeclaredType, ExplicitResolver};
    use pretty_assertions::assert_eq;

    fn validator(schemas: Vec<TypeSchema>) -> Validator {
        let mut explicit = ExplicitResolver::new();
        for schema in schemas {
            explicit.register(schema);
        }
        Validator::new(Arc::new(SchemaCache::builder().resolver(explicit).build()))
    }

    fn member(name: &str, declared: DeclaredType) -> crate::schema::MemberDescriptorBuilder {
        MemberDescriptor::builder(name, declared)
    }

    #[test]
    fn test_required_failure_skips_remaining_rules() {
        let schema = TypeSchema::builder("User")
            .member(
                member("name", DeclaredType::Text)
                    .rule(Rule::min_length(3))
                    .rule(Rule::required())
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let validator = validator(vec![schema]);

        let errors = validator
            .check(&"User".into(), &Object::new("User").with("name", "").into())
            .unwrap();
        assert_eq!(errors.get("name"), Some(&["required".to_string()][..]));
    }

    #[test]
    fn test_nullable_member_without_required_is_skipped() {
        let schema = TypeSchema::builder("User")
            .member(
                member("nickname", DeclaredType::Text)
                    .rule(Rule::custom("always", |_: &Value, _: &RuleContext<'_>| {
                        Ok(Some("ran".to_string()))
                    }))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let validator = validator(vec![schema]);

        let errors = validator.check(&"User".into(), &Object::new("User").into()).unwrap();
        assert!(errors.is_empty());
    }

    fn node_schema(member_name: &str, declared: DeclaredType) -> TypeSchema {
        TypeSchema::builder("Node")
            .member(member(member_name, declared).nested("Node").build().unwrap())
            .build()
            .unwrap()
    }

    fn with_policy(schema: TypeSchema, policy: DepthPolicy) -> Validator {
        validator(vec![schema]).with_options(
            ValidatorOptions::new()
                .with_max_depth(4)
                .with_depth_policy(policy),
        )
    }

    #[test]
    fn test_each_list_element_costs_one_level() {
        let chain = |levels: usize| {
            let mut current = Object::new("Node");
            for _ in 0..levels {
                current = Object::new("Node").with("children", vec![Value::from(current)]);
            }
            Value::from(current)
        };

        for policy in [DepthPolicy::EveryDescent, DepthPolicy::ObjectsOnly] {
            let validator = with_policy(node_schema("children", DeclaredType::list(DeclaredType::named("Node"))), policy);
            assert!(validator.check(&"Node".into(), &chain(4)).is_ok(), "{policy:?}");

            let fault = validator.check(&"Node".into(), &chain(5)).unwrap_err();
            match fault {
                ValidationFault::MaxDepthExceeded { path, .. } => {
                    assert_eq!(path, vec!["children[0]"; 5].join("."), "{policy:?}");
                }
                other => panic!("unexpected fault: {other:?}"),
            }
        }
    }

    #[test]
    fn test_objects_only_policy_does_not_count_nested_lists() {
        let grid = |levels: usize| {
            let mut current = Object::new("Node");
            for _ in 0..levels {
                current = Object::new("Node").with("grid", vec![Value::List(vec![Value::from(current)])]);
            }
            Value::from(current)
        };
        let declared = DeclaredType::list(DeclaredType::list(DeclaredType::named("Node")));

        // Entering the inner list is a descent of its own.
        let every = with_policy(node_schema("grid", declared.clone()), DepthPolicy::EveryDescent);
        assert!(every.check(&"Node".into(), &grid(2)).is_ok());
        assert!(every.check(&"Node".into(), &grid(3)).unwrap_err().is_max_depth());

        let objects_only = with_policy(node_schema("grid", declared), DepthPolicy::ObjectsOnly);
        assert!(objects_only.check(&"Node".into(), &grid(4)).is_ok());
        assert!(objects_only.check(&"Node".into(), &grid(5)).unwrap_err().is_max_depth());
    }

    #[test]
    fn test_lists_without_objects_cost_nothing_at_the_limit() {
        let validator = validator(vec![node_schema(
            "children",
            DeclaredType::list(DeclaredType::named("Node")),
        )])
        .with_options(ValidatorOptions::new().with_max_depth(0));

        let empty = Object::new("Node").with("children", Vec::<Value>::new());
        assert!(validator.check(&"Node".into(), &empty.into()).unwrap().is_empty());

        let nulls = Object::new("Node").with("children", vec![Value::Null, Value::Null]);
        assert!(validator.check(&"Node".into(), &nulls.into()).unwrap().is_empty());

        let one = Object::new("Node").with("children", vec![Value::from(Object::new("Node"))]);
        assert!(validator.check(&"Node".into(), &one.into()).unwrap_err().is_max_depth());
    }

    #[test]
    fn test_list_of_lists_validates_inner_elements() {
        let cell = TypeSchema::builder("Cell")
            .member(member("value", DeclaredType::Int).rule(Rule::min(0.0)).build().unwrap())
            .build()
            .unwrap();
        let sheet = TypeSchema::builder("Sheet")
            .member(
                member("rows", DeclaredType::list(DeclaredType::list(DeclaredType::named("Cell"))))
                    .nested("Cell")
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let validator = validator(vec![sheet, cell]);

        let cell = |value: i64| Value::from(Object::new("Cell").with("value", value));
        let value = Object::new("Sheet").with(
            "rows",
            vec![
                Value::List(vec![cell(1), cell(-1)]),
                Value::List(vec![cell(-2)]),
            ],
        );

        let errors = validator.check(&"Sheet".into(), &value.into()).unwrap();
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["rows[0][1].value", "rows[1][0].value"]);
    }

    #[test]
    fn test_non_object_value_is_a_no_op() {
        let schema = TypeSchema::builder("User")
            .member(member("name", DeclaredType::Text).rule(Rule::required()).build().unwrap())
            .build()
            .unwrap();
        let validator = validator(vec![schema]);
        assert!(validator.check(&"User".into(), &Value::from("not an object")).unwrap().is_empty());
        assert!(validator.check(&"User".into(), &Value::Null).unwrap().is_empty());
    }
}
