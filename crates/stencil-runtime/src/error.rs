//! Errors raised by call sites.
//!
//! ```text
//! CallSiteError
//! ├── Template                 - the template did not parse
//! ├── SignatureMismatch        - an executor cannot be adapted to the site
//! ├── PolicyContractViolation  - specialize broke its contract
//! ├── ReturnTypeMismatch       - a result does not fit the site return type
//! └── Policy                   - the policy's own error, unchanged
//! ```

use stencil_core::{PolicyError, PolicyType, SiteSignature, TemplateError, ValueType};
use thiserror::Error;

/// Why an executor shape does not fit a call-site signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MismatchKind {
    #[error("executor takes {actual} parameters, call site passes {expected}")]
    Arity { expected: usize, actual: usize },

    #[error("parameter {index}: executor takes {actual}, call site passes {expected}")]
    Parameter {
        index: usize,
        expected: ValueType,
        actual: ValueType,
    },

    #[error("executor returns {actual}, call site expects {expected}")]
    ReturnType {
        expected: ValueType,
        actual: ValueType,
    },

    #[error("executor is bound to receiver {actual}, call site receives {expected}")]
    Receiver {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("parameter {index} of type {parameter} cannot be collected into varargs of {element}")]
    VarargsElement {
        index: usize,
        element: ValueType,
        parameter: ValueType,
    },

    #[error("executor shape {actual} differs from {expected}")]
    Exact {
        expected: SiteSignature,
        actual: SiteSignature,
    },
}

/// Errors raised while bootstrapping or invoking a call site.
#[derive(Debug, Error)]
pub enum CallSiteError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Fatal for the installation; retrying with the same policy type
    /// reproduces it.
    #[error("signature mismatch at call site {site}: {kind}")]
    SignatureMismatch {
        site: SiteSignature,
        kind: MismatchKind,
    },

    #[error("policy contract violation by {policy}: {reason}")]
    PolicyContractViolation {
        policy: PolicyType,
        reason: &'static str,
    },

    #[error("return type mismatch: call site expects {expected}, got {actual}")]
    ReturnTypeMismatch {
        expected: ValueType,
        actual: &'static str,
    },

    /// Raised by the policy or one of its executors; never wrapped further.
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

impl CallSiteError {
    /// The policy's own error, if this is one.
    pub fn as_policy_error(&self) -> Option<&PolicyError> {
        match self {
            CallSiteError::Policy(err) => Some(err),
            _ => None,
        }
    }

    /// Downcast a policy error to the policy's concrete error type.
    pub fn downcast_policy_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.as_policy_error().and_then(PolicyError::downcast_ref::<E>)
    }

    pub fn is_signature_mismatch(&self) -> bool {
        matches!(self, CallSiteError::SignatureMismatch { .. })
    }
}
