//! Execution-time validation context
//!
//! One [`ValidationContext`] is threaded through a top-level validation call.
//! It carries the current error-path prefix and depth, the accumulated
//! [`ErrorMap`] and the ambient services.
//!
//! Path and depth follow a strict stack discipline. Every descent goes
//! through a [`PathScope`] guard that restores both when it is dropped, on
//! early `?` returns too, so siblings never see each other's path.
//!
//! ```rust
//! use tessera_validator::engine::ValidationContext;
//!
//! let mut cx = ValidationContext::new();
//! {
//!     let mut customer = cx.enter_member("Customer");
//!     let mut addresses = customer.enter_member("Addresses");
//!     let mut third = addresses.enter_index(2);
//!     let zip = third.enter_member("Zip");
//!     assert_eq!(zip.path(), "Customer.Addresses[2].Zip");
//! }
//! assert_eq!(cx.path(), "");
//! ```

use std::fmt::Write as _;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::foundation::{ErrorMap, KeyNaming, Services, ValidationFault};

use super::config::{DEFAULT_MAX_DEPTH, ValidatorOptions};

// ============================================================================
// VALIDATION CONTEXT
// ============================================================================

/// Mutable state of one top-level validation call.
#[derive(Debug)]
pub struct ValidationContext {
    path: String,
    depth: usize,
    errors: ErrorMap,
    services: Arc<Services>,
    naming: KeyNaming,
    max_depth: usize,
    max_errors: Option<usize>,
    cancellation: Option<CancellationToken>,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationContext {
    /// Creates a context with default limits and no services.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: String::new(),
            depth: 0,
            errors: ErrorMap::new(),
            services: Arc::new(Services::new()),
            naming: KeyNaming::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_errors: None,
            cancellation: None,
        }
    }

    /// Creates a context with the limits and naming of `options`.
    #[must_use]
    pub fn from_options(options: &ValidatorOptions) -> Self {
        Self {
            naming: options.key_naming.clone(),
            max_depth: options.max_depth,
            max_errors: options.max_errors,
            ..Self::new()
        }
    }

    /// Sets the ambient services.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_services(mut self, services: Arc<Services>) -> Self {
        self.services = services;
        self
    }

    /// Sets the key naming convention.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_naming(mut self, naming: KeyNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Sets the depth limit.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Caps the number of recorded messages.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }

    /// Attaches a cancellation token, checked before every member.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Starts from a non-empty path prefix.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path = prefix.into();
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Current error-path prefix.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current recursion depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Configured depth limit.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Configured message cap.
    #[must_use]
    pub fn max_errors(&self) -> Option<usize> {
        self.max_errors
    }

    /// Errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Consumes the context and returns its errors.
    #[must_use]
    pub fn into_errors(self) -> ErrorMap {
        self.errors
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Ambient services.
    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Key naming convention.
    #[must_use]
    pub fn naming(&self) -> &KeyNaming {
        &self.naming
    }

    // ------------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------------

    /// Error key of `member` under the current prefix, without entering it.
    #[must_use]
    pub fn member_key(&self, member: &str) -> String {
        let segment = self.naming.apply(member);
        if self.path.is_empty() {
            segment
        } else {
            format!("{}.{segment}", self.path)
        }
    }

    /// Appends a member segment for the lifetime of the returned guard.
    pub fn enter_member(&mut self, member: &str) -> PathScope<'_> {
        let mut scope = PathScope::new(self);
        let segment = scope.cx.naming.apply(member);
        if !scope.cx.path.is_empty() {
            scope.cx.path.push('.');
        }
        scope.cx.path.push_str(&segment);
        scope
    }

    /// Appends an index segment `[index]` for the lifetime of the guard.
    pub fn enter_index(&mut self, index: usize) -> PathScope<'_> {
        let mut scope = PathScope::new(self);
        // Writing to a String cannot fail.
        let _ = write!(scope.cx.path, "[{index}]");
        scope
    }

    /// Increments the depth for the lifetime of the guard.
    pub fn descend(&mut self) -> PathScope<'_> {
        let mut scope = PathScope::new(self);
        scope.cx.depth += 1;
        scope
    }

    // ------------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------------

    /// Records `message` at the current path.
    pub fn record(&mut self, message: impl Into<String>) -> bool {
        let path = self.path.clone();
        self.record_at(path, message)
    }

    /// Records `message` at `path`, honouring the message cap.
    ///
    /// Reaching the cap marks the map truncated. Returns true if the message
    /// was added (not a duplicate, not capped).
    pub fn record_at(&mut self, path: impl Into<String>, message: impl Into<String>) -> bool {
        if self.is_saturated() {
            return false;
        }
        let added = self.errors.add(path, message);
        if self.is_saturated() {
            self.errors.mark_truncated();
        }
        added
    }

    /// Returns true once the message cap is reached.
    #[must_use]
    pub fn is_saturated(&self) -> bool {
        self.max_errors
            .is_some_and(|max| self.errors.message_count() >= max)
    }

    /// Fails with [`ValidationFault::Cancelled`] if the token was cancelled.
    pub fn check_cancelled(&self) -> Result<(), ValidationFault> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(ValidationFault::Cancelled {
                path: self.path.clone(),
            }),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// PATH SCOPE
// ============================================================================

/// Guard that restores the context's path and depth when dropped.
///
/// Dereferences to the [`ValidationContext`], so scopes nest naturally.
#[derive(Debug)]
pub struct PathScope<'a> {
    cx: &'a mut ValidationContext,
    path_len: usize,
    depth: usize,
}

impl<'a> PathScope<'a> {
    fn new(cx: &'a mut ValidationContext) -> Self {
        let path_len = cx.path.len();
        let depth = cx.depth;
        Self { cx, path_len, depth }
    }
}

impl Deref for PathScope<'_> {
    type Target = ValidationContext;

    fn deref(&self) -> &ValidationContext {
        self.cx
    }
}

impl DerefMut for PathScope<'_> {
    fn deref_mut(&mut self) -> &mut ValidationContext {
        self.cx
    }
}

impl Drop for PathScope<'_> {
    fn drop(&mut self) {
        self.cx.path.truncate(self.path_len);
        self.cx.depth = self.depth;
    }
}
