//! JSON literal policy.
//!
//! The template is a JSON document where each sentinel is a hole for one
//! argument:
//!
//! ```
//! use stencil_core::{Dynamic, TemplatePolicy, TemplatedString, ValueType};
//! use stencil_policies::{JsonLiteral, JsonValue};
//!
//! let templated = TemplatedString::parse(
//!     "{ \"name\": \u{FFFC}, \"age\": \u{FFFC} }",
//!     ValueType::native::<JsonValue>(),
//!     None,
//!     &[ValueType::String, ValueType::Int],
//! )
//! .unwrap();
//! let value = JsonLiteral
//!     .apply(&templated, &[Dynamic::String("Bob".into()), Dynamic::Int(77)])
//!     .unwrap();
//! let json = value.as_native::<JsonValue>().unwrap();
//! assert_eq!(json.get("age"), Some(&JsonValue::Int(77)));
//! ```
//!
//! Specializing parses the template once per call site. A template without
//! holes folds to a constant: every call returns the same `JsonValue`
//! instance.

mod lexer;
mod skeleton;
mod value;

use std::sync::Arc;

use stencil_core::{
    Dynamic, ExecContext, Executor, PolicyError, SiteSignature, TemplatePolicy, TemplatedString,
    ValueType,
};
use thiserror::Error;

pub use lexer::TokenKind;
pub use skeleton::Skeleton;
pub use value::{JsonObject, JsonValue};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JsonError {
    #[error("expected {expected} but found {found} at offset {offset}")]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        offset: usize,
    },

    #[error("unexpected character {ch:?} at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unknown literal '{word}' at offset {offset}")]
    UnknownLiteral { word: String, offset: usize },

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("unterminated string starting at offset {offset}")]
    UnterminatedString { offset: usize },

    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },

    #[error("object opened at offset {offset} is never closed")]
    Unclosed { offset: usize },

    #[error("nesting deeper than {limit} levels at offset {offset}")]
    TooDeep { limit: usize, offset: usize },

    #[error("duplicate key '{key}' at offset {offset}")]
    DuplicateKey { key: String, offset: usize },

    #[error("template takes {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("{type_name} cannot be stored in a JSON value")]
    UnsupportedValue { type_name: &'static str },
}

impl From<JsonError> for PolicyError {
    fn from(error: JsonError) -> Self {
        PolicyError::new(error)
    }
}

/// Builds [`JsonValue`]s from JSON templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLiteral;

impl TemplatePolicy for JsonLiteral {
    fn apply(&self, templated: &TemplatedString, args: &[Dynamic]) -> Result<Dynamic, PolicyError> {
        let skeleton = Skeleton::parse(templated.template())?;
        Ok(Dynamic::native(skeleton.fill(args)?))
    }

    fn specialize(
        &self,
        templated: &Arc<TemplatedString>,
        signature: &SiteSignature,
    ) -> Result<Option<Executor>, PolicyError> {
        let skeleton = Skeleton::parse(templated.template())?;
        let shape = signature
            .clone()
            .with_return_type(ValueType::native::<JsonValue>());

        if skeleton.holes() == 0 {
            let value = Dynamic::native(skeleton.fill(&[])?);
            return Ok(Some(Executor::constant(shape, value)));
        }
        Ok(Some(Executor::new(shape, move |ctx: &mut ExecContext<'_>| {
            Ok(Dynamic::native(skeleton.fill(ctx.args())?))
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::ExecutorFlags;

    fn templated(template: &str, params: &[ValueType]) -> Arc<TemplatedString> {
        Arc::new(
            TemplatedString::parse(template, ValueType::native::<JsonValue>(), None, params).unwrap(),
        )
    }

    #[test]
    fn constant_template_folds() {
        let templated = templated("{ \"x\": 35.2, \"y\": 42.9 }", &[]);
        let sig = SiteSignature::new(ValueType::native::<JsonValue>(), []);
        let executor = JsonLiteral.specialize(&templated, &sig).unwrap().unwrap();
        assert!(executor.flags().contains(ExecutorFlags::CONSTANT));

        let mut ctx = ExecContext::new(&JsonLiteral, &templated, &[]);
        let a = executor.call(&mut ctx).unwrap();
        let b = executor.call(&mut ctx).unwrap();
        assert!(a.same_instance(&b));
        assert_eq!(
            a.as_native::<JsonValue>(),
            Some(&JsonValue::object([
                ("x", JsonValue::from(35.2)),
                ("y", JsonValue::from(42.9)),
            ]))
        );
    }

    #[test]
    fn parameterized_template_fills_per_call() {
        let templated = templated("[ \u{FFFC} ]", &[ValueType::Int]);
        let sig = SiteSignature::new(ValueType::Any, [ValueType::Int]);
        let executor = JsonLiteral.specialize(&templated, &sig).unwrap().unwrap();
        assert_eq!(
            executor.shape().return_type(),
            &ValueType::native::<JsonValue>()
        );

        let one = [Dynamic::Int(1)];
        let mut ctx = ExecContext::new(&JsonLiteral, &templated, &one);
        let a = executor.call(&mut ctx).unwrap();
        let b = executor.call(&mut ctx).unwrap();
        assert!(!a.same_instance(&b));
        assert_eq!(
            a.as_native::<JsonValue>(),
            Some(&JsonValue::array([JsonValue::Int(1)]))
        );
    }

    #[test]
    fn deep_templates_fail_to_specialize() {
        let source = format!("{}{}", "[".repeat(10_000), "]".repeat(10_000));
        let templated = templated(&source, &[]);
        let sig = SiteSignature::new(ValueType::Any, []);
        let err = JsonLiteral.specialize(&templated, &sig).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<JsonError>(),
            Some(JsonError::TooDeep { .. })
        ));
    }

    #[test]
    fn syntax_errors_surface_from_specialize() {
        let templated = templated("{ oops }", &[]);
        let sig = SiteSignature::new(ValueType::Any, []);
        let err = JsonLiteral.specialize(&templated, &sig).unwrap_err();
        assert!(err.is::<JsonError>());
    }
}
