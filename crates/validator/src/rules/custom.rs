//! Host-registered rules
//!
//! Custom rules cover checks that the built-in constraint set cannot express.
//! They are registered in code, never authored as data.
//!
//! ```rust
//! use tessera_validator::foundation::{RuleError, Value};
//! use tessera_validator::rules::{Rule, RuleContext};
//!
//! let even = Rule::custom("even", |value: &Value, _cx: &RuleContext<'_>| {
//!     Ok(match value {
//!         Value::Int(n) if n % 2 != 0 => Some("must be even".to_string()),
//!         _ => None,
//!     })
//! });
//! assert_eq!(even.kind(), "even");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::foundation::{RuleError, Value};

use super::RuleContext;

/// Signature of a custom check: `Ok(Some(message))` on failure.
pub type CustomCheck =
    dyn Fn(&Value, &RuleContext<'_>) -> Result<Option<String>, RuleError> + Send + Sync;

/// Named, shareable custom check.
#[derive(Clone)]
pub struct CustomRule {
    name: Arc<str>,
    check: Arc<CustomCheck>,
}

impl CustomRule {
    /// Wraps a closure as a custom rule.
    pub fn new<F>(name: impl AsRef<str>, check: F) -> Self
    where
        F: Fn(&Value, &RuleContext<'_>) -> Result<Option<String>, RuleError> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name.as_ref()),
            check: Arc::new(check),
        }
    }

    /// Name used in logs and rule-execution errors.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn run(&self, value: &Value, cx: &RuleContext<'_>) -> Result<Option<String>, RuleError> {
        (self.check)(value, cx)
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CustomRule").field(&self.name).finish()
    }
}
