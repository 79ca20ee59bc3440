//! Error policies.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Expr, Ident, Type, parse_quote};
use tracing::{instrument, trace};

use crate::ctx::Ctx;

/// How generated wrappers react to a failed native call.
///
/// The policy is chosen per generation pass, so the same
/// descriptors can be rendered under any policy.
///
/// Policies parse from strings:
///
/// ```rust
/// use handlegen_codegen::ErrorPolicy;
///
/// assert_eq!("assert".parse(), Ok(ErrorPolicy::AssertOnly));
/// assert_eq!("true".parse(), Ok(ErrorPolicy::AlwaysFail));
/// assert_eq!("maybe".parse(), Ok(ErrorPolicy::Conditional));
/// assert!("sometimes".parse::<ErrorPolicy>().is_err());
/// ```
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, strum::Display, strum::EnumIter, strum::EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum ErrorPolicy {
    /// Failures are `debug_assert!`ions.
    ///
    /// Wrappers return their values directly. With debug
    /// assertions disabled, a failure goes unnoticed and the
    /// caller receives whatever the native call produced.
    #[strum(to_string = "assert", serialize = "false")]
    AssertOnly,
    /// Failures are always returned as `ResultError`s carrying
    /// the raw result code and the operation name.
    #[strum(to_string = "fail", serialize = "true")]
    AlwaysFail,
    /// Either of the above, selected when `handlegen-core` is
    /// built (see its `assert-only` feature).
    ///
    /// Wrappers always return `Result`s.
    #[default]
    #[strum(to_string = "conditional", serialize = "maybe")]
    Conditional,
}

impl ErrorPolicy {
    /// Reports whether wrappers generated under this policy
    /// return `Result`s.
    pub const fn is_fallible(self) -> bool {
        !matches!(self, Self::AssertOnly)
    }

    /// Generates the code that runs after the native call
    /// bound its status to `result`.
    ///
    /// `op` is the fully qualified operation name.
    #[instrument(skip_all, fields(policy = %self, %op))]
    pub(crate) fn expand(self, ctx: &Ctx, op: &str, result: &Ident) -> TokenStream {
        trace!("expanding error handling");

        match self {
            Self::AssertOnly => assert_success(ctx, op, result),
            Self::AlwaysFail => fail_unless_success(ctx, op, result),
            Self::Conditional => {
                let core = &ctx.core;
                let assert = assert_success(ctx, op, result);
                let fail = fail_unless_success(ctx, op, result);
                quote! {
                    match #core::FailureMode::ACTIVE {
                        #core::FailureMode::Assert => {
                            #assert
                        }
                        #core::FailureMode::Fail => {
                            #fail
                        }
                    }
                }
            }
        }
    }

    /// Returns the wrapper's return type for a wrapped value of
    /// type `ty`.
    pub(crate) fn return_type(self, ctx: &Ctx, ty: &Type) -> Type {
        if self.is_fallible() {
            let core = &ctx.core;
            let result_ty = &ctx.result_ty;
            parse_quote! {
                ::core::result::Result<#ty, #core::ResultError<#result_ty>>
            }
        } else {
            ty.clone()
        }
    }

    /// Returns the expression that returns `value` from the
    /// wrapper.
    pub(crate) fn return_value(self, value: &Expr) -> Expr {
        if self.is_fallible() {
            parse_quote!(::core::result::Result::Ok(#value))
        } else {
            value.clone()
        }
    }
}

/// The success predicate.
fn succeeded(ctx: &Ctx, result: &Ident) -> Expr {
    let core = &ctx.core;
    parse_quote!(#core::ResultCode::succeeded(#result))
}

fn assert_success(ctx: &Ctx, op: &str, result: &Ident) -> TokenStream {
    let succeeded = succeeded(ctx, result);
    quote! {
        ::core::debug_assert!(#succeeded, "{}: {}", #op, #result);
    }
}

fn fail_unless_success(ctx: &Ctx, op: &str, result: &Ident) -> TokenStream {
    let core = &ctx.core;
    let succeeded = succeeded(ctx, result);
    quote! {
        if !(#succeeded) {
            return ::core::result::Result::Err(#core::ResultError::new(#result, #op));
        }
    }
}
