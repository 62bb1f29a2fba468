//! Signature adaptation.
//!
//! Checks run when an executor is installed, never when it is invoked:
//!
//! - **varargs**: every site parameter must coerce to the varargs element
//! - **receiver**: an executor bound to a policy type only serves that type
//! - **arity**: same number of parameters
//! - **parameters**: each executor parameter accepts the site's (contravariant)
//! - **return**: the executor's result fits the site, or is broader and
//!   gets checked on every call
//!
//! With `exact_shapes`, non-generic executors must match the site exactly.

use stencil_core::{
    Executor, ExecutorFlags, PolicyType, Receiver, SiteSignature, TemplatedString, ValueType,
};

use crate::error::MismatchKind;

/// Check that every site parameter can be collected into the varargs pack
/// of `templated`.
pub fn check_varargs(templated: &TemplatedString, site: &SiteSignature) -> Result<(), MismatchKind> {
    let Some(element) = templated.varargs_type() else {
        return Ok(());
    };
    for (index, parameter) in site.parameters().iter().enumerate() {
        if !element.is_assignable_from(parameter) {
            return Err(MismatchKind::VarargsElement {
                index,
                element: element.clone(),
                parameter: parameter.clone(),
            });
        }
    }
    Ok(())
}

/// Adapt `executor` to `site` for receivers of type `policy`.
///
/// The returned executor shares the original function, carries the site's
/// shape, and has [`ExecutorFlags::RETURN_CHECKED`] set when its results
/// must be coerced to the site return type.
pub fn adapt(
    executor: &Executor,
    site: &SiteSignature,
    policy: PolicyType,
    exact: bool,
) -> Result<Executor, MismatchKind> {
    let shape = executor.shape();

    if !shape.receiver().accepts(&policy) {
        let actual = match shape.receiver() {
            Receiver::Sealed(bound) => bound.name(),
            Receiver::Open => "policy",
        };
        return Err(MismatchKind::Receiver {
            expected: policy.name(),
            actual,
        });
    }

    if exact && !executor.flags().contains(ExecutorFlags::GENERIC) {
        if shape.return_type() != site.return_type() || shape.parameters() != site.parameters() {
            return Err(MismatchKind::Exact {
                expected: site.clone(),
                actual: shape.clone(),
            });
        }
        return Ok(executor.reshaped(site.clone()));
    }

    if shape.arity() != site.arity() {
        return Err(MismatchKind::Arity {
            expected: site.arity(),
            actual: shape.arity(),
        });
    }

    for (index, (theirs, ours)) in shape.parameters().iter().zip(site.parameters()).enumerate() {
        if !theirs.is_assignable_from(ours) {
            return Err(MismatchKind::Parameter {
                index,
                expected: ours.clone(),
                actual: theirs.clone(),
            });
        }
    }

    let expected = site.return_type();
    let actual = shape.return_type();
    let fits = expected.is_assignable_from(actual);
    let broader = actual.is_assignable_from(expected);
    if !fits && !broader {
        return Err(MismatchKind::ReturnType {
            expected: expected.clone(),
            actual: actual.clone(),
        });
    }

    let adapted = executor.reshaped(site.clone());
    if *expected == ValueType::Any || expected == actual {
        Ok(adapted)
    } else {
        Ok(adapted.with_flags(ExecutorFlags::RETURN_CHECKED))
    }
}
