//! # tessera-validator
//!
//! A recursive object-graph validation engine.
//!
//! Validation happens in two phases:
//!
//! 1. **Resolution** (once per type): declared metadata is turned into an
//!    immutable [`TypeSchema`](schema::TypeSchema) by a chain of
//!    [`SchemaResolver`](schema::SchemaResolver)s and memoized in the
//!    [`SchemaCache`](schema::SchemaCache). Type-level cycles are cut while
//!    resolving.
//! 2. **Traversal** (per value): the [`Validator`](engine::Validator) walks a
//!    live [`Value`](foundation::Value) against the cached schemas and
//!    collects every failure in an [`ErrorMap`](foundation::ErrorMap) keyed
//!    by error path (`Customer.Addresses[2].Zip`). Instance-level cycles are
//!    stopped by a depth limit.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use tessera_validator::prelude::*;
//!
//! let catalog = TypeCatalog::new().with_type(
//!     TypeDef::new("Profile")
//!         .member(MemberDef::new("name", DeclaredType::Text).spec(RuleSpec::required()))
//!         .member(MemberDef::new("age", DeclaredType::Int).spec(RuleSpec::min(0.0)))
//!         .member(
//!             MemberDef::new("tags", DeclaredType::list(DeclaredType::Text))
//!                 .element_spec(RuleSpec::not_empty()),
//!         ),
//! );
//! let cache = SchemaCache::builder().resolver(ReflectionResolver::new(catalog)).build();
//! let validator = Validator::new(Arc::new(cache));
//!
//! let value = Value::from(json!({ "$type": "Profile", "name": null, "age": -1, "tags": ["ok", ""] }));
//! let errors = validator.check(&"Profile".into(), &value).unwrap();
//!
//! assert_eq!(
//!     serde_json::to_value(&errors).unwrap(),
//!     json!({ "name": ["required"], "age": ["must be >= 0"], "tags[1]": ["must not be empty"] })
//! );
//! ```
//!
//! ## Failures, errors and faults
//!
//! - invalid data is recorded in the [`ErrorMap`](foundation::ErrorMap)
//! - authoring mistakes fail resolution with a [`SchemaError`](foundation::SchemaError)
//! - depth overflow and cancellation abort the call with a
//!   [`ValidationFault`](foundation::ValidationFault)

pub mod engine;
pub mod foundation;
pub mod prelude;
pub mod rules;
pub mod schema;
