//! String concatenation policies.
//!
//! [`StringConcat`] interprets the template on every call.
//! [`StringConcatOptimized`] compiles it once per call site into a
//! [`Recipe`] of literal runs and argument slots.

use std::sync::Arc;

use stencil_core::{
    Dynamic, ExecContext, Executor, PolicyError, Segment, SiteSignature, TemplatePolicy,
    TemplatedString, ValueType,
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConcatError {
    #[error("template takes {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
}

impl From<ConcatError> for PolicyError {
    fn from(error: ConcatError) -> Self {
        PolicyError::new(error)
    }
}

fn check_count(expected: usize, actual: usize) -> Result<(), ConcatError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ConcatError::ArgumentCount { expected, actual })
    }
}

/// Concatenates text segments with the display form of each argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConcat;

impl TemplatePolicy for StringConcat {
    fn apply(&self, templated: &TemplatedString, args: &[Dynamic]) -> Result<Dynamic, PolicyError> {
        check_count(templated.parameter_count(), args.len())?;
        let mut out = String::with_capacity(templated.template().len());
        for segment in templated.segments() {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Parameter(parameter) => {
                    push_value(&mut out, &args[parameter.index()]);
                }
            }
        }
        Ok(Dynamic::String(out))
    }
}

/// Like [`StringConcat`], but specializes each call site into a [`Recipe`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConcatOptimized;

impl TemplatePolicy for StringConcatOptimized {
    fn apply(&self, templated: &TemplatedString, args: &[Dynamic]) -> Result<Dynamic, PolicyError> {
        Ok(Recipe::compile(templated).run(args)?)
    }

    fn specialize(
        &self,
        templated: &Arc<TemplatedString>,
        signature: &SiteSignature,
    ) -> Result<Option<Executor>, PolicyError> {
        let recipe = Recipe::compile(templated);
        let shape = signature.clone().with_return_type(ValueType::String);
        Ok(Some(Executor::new(shape, move |ctx: &mut ExecContext<'_>| {
            Ok(recipe.run(ctx.args())?)
        })))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Arg(usize),
}

/// A template compiled into literal runs and argument slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    parts: Vec<Part>,
    arity: usize,
    literal_len: usize,
}

impl Recipe {
    pub fn compile(templated: &TemplatedString) -> Self {
        let mut parts = Vec::new();
        let mut literal_len = 0;
        for segment in templated.segments() {
            match segment {
                Segment::Text(text) => {
                    literal_len += text.len();
                    parts.push(Part::Literal(text.to_owned()));
                }
                Segment::Parameter(parameter) => parts.push(Part::Arg(parameter.index())),
            }
        }
        Self {
            parts,
            arity: templated.parameter_count(),
            literal_len,
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn run(&self, args: &[Dynamic]) -> Result<Dynamic, ConcatError> {
        check_count(self.arity, args.len())?;
        let mut out = String::with_capacity(self.literal_len + 8 * self.arity);
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Arg(index) => push_value(&mut out, &args[*index]),
            }
        }
        Ok(Dynamic::String(out))
    }
}

fn push_value(out: &mut String, value: &Dynamic) {
    use std::fmt::Write;

    match value {
        Dynamic::String(s) => out.push_str(s),
        other => {
            let _ = write!(out, "{}", other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templated() -> TemplatedString {
        TemplatedString::parse(
            "name: \u{FFFC} age: \u{FFFC}",
            ValueType::String,
            None,
            &[ValueType::String, ValueType::Int],
        )
        .unwrap()
    }

    fn bob() -> [Dynamic; 2] {
        [Dynamic::String("Bob".into()), Dynamic::Int(24)]
    }

    #[test]
    fn concat_apply() {
        let result = StringConcat.apply(&templated(), &bob()).unwrap();
        assert_eq!(result, Dynamic::String("name: Bob age: 24".into()));
    }

    #[test]
    fn concat_rejects_wrong_argument_count() {
        let err = StringConcat.apply(&templated(), &[]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConcatError>(),
            Some(&ConcatError::ArgumentCount {
                expected: 2,
                actual: 0
            })
        );
        let three = [Dynamic::Null, Dynamic::Null, Dynamic::Null];
        assert!(StringConcat.apply(&templated(), &three).is_err());
    }

    #[test]
    fn recipe_matches_eager_concat() {
        let recipe = Recipe::compile(&templated());
        assert_eq!(recipe.arity(), 2);
        assert_eq!(
            recipe.run(&bob()).unwrap(),
            StringConcat.apply(&templated(), &bob()).unwrap()
        );
    }

    #[test]
    fn optimized_specialize_builds_string_executor() {
        let templated = Arc::new(templated());
        let sig = SiteSignature::new(ValueType::String, [ValueType::String, ValueType::Int]);
        let executor = StringConcatOptimized
            .specialize(&templated, &sig)
            .unwrap()
            .unwrap();
        assert_eq!(executor.shape(), &sig);

        let args = bob();
        let mut ctx = ExecContext::new(&StringConcatOptimized, &templated, &args);
        assert_eq!(
            executor.call(&mut ctx).unwrap(),
            Dynamic::String("name: Bob age: 24".into())
        );
    }

    #[test]
    fn non_string_arguments_use_display() {
        let templated = TemplatedString::parse(
            "\u{FFFC}/\u{FFFC}/\u{FFFC}",
            ValueType::String,
            None,
            &[ValueType::Bool, ValueType::Float, ValueType::Any],
        )
        .unwrap();
        let args = [Dynamic::Bool(true), Dynamic::Float(1.5), Dynamic::Null];
        assert_eq!(
            StringConcat.apply(&templated, &args).unwrap(),
            Dynamic::String("true/1.5/null".into())
        );
    }
}
