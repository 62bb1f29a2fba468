//! The policy capability contract.
//!
//! A policy gives meaning to a templated string. It must be able to
//! interpret any template eagerly ([`TemplatePolicy::apply`]) and may offer
//! a precomputed executor for one call site ([`TemplatePolicy::specialize`]).
//!
//! ```
//! use stencil_core::{Dynamic, PolicyError, TemplatePolicy, TemplatedString};
//!
//! struct Count;
//!
//! impl TemplatePolicy for Count {
//!     fn apply(&self, _: &TemplatedString, args: &[Dynamic]) -> Result<Dynamic, PolicyError> {
//!         Ok(Dynamic::Int(args.len() as i64))
//!     }
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::{Dynamic, Executor, PolicyError, PolicyType, SiteSignature, TemplatedString};

/// Type identity of a policy behind `dyn TemplatePolicy`.
///
/// Blanket-implemented for every `'static` type; policies never implement it
/// by hand.
pub trait PolicyAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn policy_type(&self) -> PolicyType;
}

impl<T: Any + Send + Sync> PolicyAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn policy_type(&self) -> PolicyType {
        PolicyType::of::<T>()
    }
}

/// A template policy.
///
/// Implementations are shared between threads, and a call site may hold on
/// to executors a policy returned long after `specialize` ran.
pub trait TemplatePolicy: PolicyAny {
    /// Interpret `templated` with `args`.
    ///
    /// `args` holds the collected varargs pack, one value per parameter. The
    /// policy validates the count and kinds it needs and reports its own
    /// error otherwise.
    fn apply(&self, templated: &TemplatedString, args: &[Dynamic]) -> Result<Dynamic, PolicyError>;

    /// Produce an executor for one call site.
    ///
    /// Called once per (call site, policy type). The returned executor must
    /// be adaptable to `signature`; returning `Ok(None)` breaks the contract
    /// and the call site rejects it. The default is the generic executor
    /// that calls [`apply`](TemplatePolicy::apply) on every invocation.
    fn specialize(
        &self,
        templated: &Arc<TemplatedString>,
        signature: &SiteSignature,
    ) -> Result<Option<Executor>, PolicyError> {
        Ok(Some(Executor::eager(signature)))
    }
}

impl std::fmt::Debug for dyn TemplatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TemplatePolicy({})", self.policy_type().name())
    }
}
