//! Core value and error types
//!
//! This module contains the building blocks shared by schema resolution and
//! traversal:
//!
//! - **Values**: [`Value`], [`Object`], [`TypeName`]
//! - **Errors**: [`ErrorMap`], [`SchemaError`], [`ValidationFault`], [`RuleError`]
//! - **Ambient state**: [`Services`], [`KeyNaming`]
//!
//! # Error taxonomy
//!
//! ```rust,ignore
//! // Data problem: recorded, never returned as Err
//! errors.add("age", "must be >= 0");
//!
//! // Authoring bug: fails loudly while building the schema
//! Err(SchemaError::RequiredWithoutCheck { member: "name".into() })
//!
//! // Refusal to go on: aborts the top-level call
//! Err(ValidationFault::MaxDepthExceeded { .. })
//! ```

pub mod error;
pub mod json;
pub mod naming;
pub mod services;
pub mod value;

pub use error::{ErrorMap, RuleError, SchemaError, ValidationFault};
pub use naming::{KeyNaming, NamingFn};
pub use services::{Services, ServicesBuilder};
pub use value::{Object, TypeName, Value};
