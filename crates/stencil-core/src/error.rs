//! Error types shared by templates, values and policies.
//!
//! ```text
//! TemplateError    - parse-time failures (arity, absent types)
//! ConversionError  - a Dynamic value does not fit the requested type
//! PolicyError      - opaque error raised by a policy or executor
//! ```

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Errors raised while parsing a templated string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Placeholder count differs from the number of declared parameter types.
    #[error(
        "invalid number of parameter types: template has {placeholders} placeholders, {declared} types declared"
    )]
    Arity { placeholders: usize, declared: usize },

    /// A required type was the absent type.
    #[error("{what} is absent")]
    NullContract { what: &'static str },
}

/// Errors converting a [`Dynamic`](crate::Dynamic) into a requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("integer overflow: {value} does not fit in {target_type}")]
    IntegerOverflow {
        value: i64,
        target_type: &'static str,
    },

    #[error("argument index {index} out of bounds (count: {count})")]
    ArgumentIndexOutOfBounds { index: usize, count: usize },
}

impl ConversionError {
    pub(crate) fn mismatch(expected: impl fmt::Display, actual: impl fmt::Display) -> Self {
        ConversionError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// An error raised by a policy's own logic.
///
/// Call sites never interpret these; they are propagated unchanged. The
/// original error is recoverable with [`PolicyError::downcast_ref`].
pub struct PolicyError {
    inner: Box<dyn StdError + Send + Sync + 'static>,
}

impl PolicyError {
    /// Wrap a policy-defined error.
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            inner: Box::new(error),
        }
    }

    /// Create an error from a message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Message(message.into()))
    }

    /// Borrow the wrapped error as `E`, if it is one.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.inner.downcast_ref::<E>()
    }

    /// Whether the wrapped error is an `E`.
    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.inner.is::<E>()
    }

    /// Unwrap into the boxed error.
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.inner
    }
}

impl fmt::Debug for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PolicyError").field(&self.inner).finish()
    }
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for PolicyError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

impl From<ConversionError> for PolicyError {
    fn from(error: ConversionError) -> Self {
        PolicyError::new(error)
    }
}

impl From<TemplateError> for PolicyError {
    fn from(error: TemplateError) -> Self {
        PolicyError::new(error)
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}
