//! The parsed form of a templated string.
//!
//! A template is plain text where each parameter position is marked by the
//! sentinel character U+FFFC (OBJECT REPLACEMENT CHARACTER). Parsing pairs
//! every sentinel, left to right, with a declared parameter type:
//!
//! ```
//! use stencil_core::{Segment, TemplatedString, ValueType};
//!
//! let templated = TemplatedString::parse(
//!     "name: \u{FFFC} age: \u{FFFC}",
//!     ValueType::String,
//!     None,
//!     &[ValueType::String, ValueType::Int],
//! )
//! .unwrap();
//!
//! let segments: Vec<_> = templated.segments().collect();
//! assert_eq!(segments.len(), 4);
//! assert_eq!(segments[0], Segment::Text("name: "));
//! assert!(matches!(segments[1], Segment::Parameter(p) if p.index() == 0));
//! ```
//!
//! A `TemplatedString` is immutable and shared by every invocation of its
//! call site, so [`TemplatedString::segments`] builds a fresh iterator on
//! each call.

use std::fmt;
use std::iter::FusedIterator;

use crate::ValueType;
use crate::error::TemplateError;

/// The character marking a parameter position in a template.
pub const SENTINEL: char = '\u{FFFC}';

/// A parameter of a templated string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    ty: ValueType,
    index: usize,
}

impl Parameter {
    /// The declared type.
    pub fn ty(&self) -> &ValueType {
        &self.ty
    }

    /// Position among the parameters only, starting at 0.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\({} param{})", self.ty, self.index)
    }
}

/// One piece of a templated string: literal text or a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Parameter(&'a Parameter),
}

/// An immutable, parsed templated string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatedString {
    template: String,
    return_type: ValueType,
    varargs_type: Option<ValueType>,
    parameters: Vec<Parameter>,
}

impl TemplatedString {
    /// The sentinel character, see [`SENTINEL`].
    pub const SENTINEL: char = SENTINEL;

    /// Parse a template.
    ///
    /// # Errors
    ///
    /// - [`TemplateError::NullContract`] if the return type, the varargs type
    ///   or a parameter type is the absent type.
    /// - [`TemplateError::Arity`] if the number of sentinels differs from
    ///   `parameter_types.len()`.
    pub fn parse(
        template: impl Into<String>,
        return_type: ValueType,
        varargs_type: Option<ValueType>,
        parameter_types: &[ValueType],
    ) -> Result<Self, TemplateError> {
        let template = template.into();
        if return_type.is_absent() {
            return Err(TemplateError::NullContract {
                what: "return type",
            });
        }
        if varargs_type.as_ref().is_some_and(ValueType::is_absent) {
            return Err(TemplateError::NullContract {
                what: "varargs type",
            });
        }
        if parameter_types.iter().any(ValueType::is_absent) {
            return Err(TemplateError::NullContract {
                what: "parameter type",
            });
        }

        let placeholders = Self::count_sentinels(&template);
        if placeholders != parameter_types.len() {
            return Err(TemplateError::Arity {
                placeholders,
                declared: parameter_types.len(),
            });
        }

        let parameters = parameter_types
            .iter()
            .enumerate()
            .map(|(index, ty)| Parameter {
                ty: ty.clone(),
                index,
            })
            .collect();

        Ok(Self {
            template,
            return_type,
            varargs_type,
            parameters,
        })
    }

    /// Number of sentinel characters in `text`.
    pub fn count_sentinels(text: &str) -> usize {
        text.chars().filter(|&c| c == SENTINEL).count()
    }

    /// The raw template, sentinels included.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn return_type(&self) -> &ValueType {
        &self.return_type
    }

    /// Element type of the varargs pack, if one was declared.
    pub fn varargs_type(&self) -> Option<&ValueType> {
        self.varargs_type.as_ref()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Iterate the text and parameter segments in order.
    ///
    /// Consecutive sentinels produce consecutive parameters with no empty
    /// text between them; an empty template produces no segments.
    pub fn segments(&self) -> Segments<'_> {
        Segments {
            template: &self.template,
            offset: 0,
            parameters: self.parameters.iter(),
        }
    }
}

impl fmt::Display for TemplatedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for segment in self.segments() {
            match segment {
                Segment::Text(text) => f.write_str(text)?,
                Segment::Parameter(parameter) => write!(f, "{}", parameter)?,
            }
        }
        f.write_str("\"")
    }
}

/// Iterator over the segments of a [`TemplatedString`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    template: &'a str,
    offset: usize,
    parameters: std::slice::Iter<'a, Parameter>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let template = self.template;
        let rest = &template[self.offset..];
        if rest.is_empty() {
            return None;
        }
        if rest.starts_with(SENTINEL) {
            self.offset += SENTINEL.len_utf8();
            return self.parameters.next().map(Segment::Parameter);
        }
        let end = rest.find(SENTINEL).unwrap_or(rest.len());
        self.offset += end;
        Some(Segment::Text(&rest[..end]))
    }
}

impl FusedIterator for Segments<'_> {}
