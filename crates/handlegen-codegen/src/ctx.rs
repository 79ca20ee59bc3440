use std::{cell::RefCell, fmt::Display};

use quote::ToTokens;
use syn::{Error, Path, Result, Type};
use tracing::{error, instrument};

use crate::{policy::ErrorPolicy, syntax::DispatchRegistry};

/// Code generation context.
#[derive(Debug)]
pub(crate) struct Ctx {
    /// Path to `handlegen_core`.
    pub core: Path,
    /// Prefix for operation names in `ResultError`s.
    ///
    /// E.g., `xr` names `Session::enumerate_formats`
    /// `xr::Session::enumerate_formats`.
    pub namespace: String,
    /// The native result code type.
    pub result_ty: Type,
    /// The error policy for this pass.
    pub policy: ErrorPolicy,
    /// Types known to be dispatch objects.
    pub dispatch: DispatchRegistry,

    /// Collected errors.
    ///
    /// We collect errors instead of immediately failing so that
    /// every bad descriptor is reported at once.
    pub errs: RefCell<Errors>,
}

impl Ctx {
    /// Adds an error.
    pub fn error(&self, tokens: impl ToTokens, msg: impl Display) {
        self.errs.borrow_mut().error(tokens, msg);
    }

    /// Combines the errors, returning `Ok` if there are none or
    /// `Err` otherwise.
    pub fn propagate(&mut self) -> Result<()> {
        self.errs.borrow_mut().propagate()
    }

    /// Returns the fully qualified operation name for `name`.
    pub fn operation(&self, name: impl Display) -> String {
        if self.namespace.is_empty() {
            name.to_string()
        } else {
            format!("{}::{name}", self.namespace)
        }
    }
}

/// Taken from [`cxx`].
///
/// [`cxx`]: https://github.com/dtolnay/cxx/blob/afd4aa3f3d4e5d5e9a3a41d09df3408f5f86a469/syntax/report.rs
#[derive(Debug, Default)]
pub(crate) struct Errors(Vec<Error>);

impl Errors {
    #[instrument(skip_all)]
    fn push(&mut self, err: Error) {
        error!(%err);

        self.0.push(err);
    }

    fn error(&mut self, tokens: impl ToTokens, msg: impl Display) {
        // NB: We call `self.push` for logging purposes.
        self.push(Error::new_spanned(tokens, msg));
    }

    /// Combines the errors, returning `Ok` if there are none or
    /// `Err` otherwise.
    fn propagate(&mut self) -> Result<()> {
        let mut iter = self.0.drain(..);
        let mut all = match iter.next() {
            Some(err) => err,
            None => return Ok(()),
        };
        for err in iter {
            all.combine(err);
        }
        Err(all)
    }
}

#[cfg(test)]
impl Ctx {
    /// A context for unit tests.
    pub(crate) fn for_tests(policy: ErrorPolicy) -> Self {
        let mut dispatch = DispatchRegistry::new();
        dispatch.register(syn::parse_quote!(Runtime));
        dispatch.register(syn::parse_quote!(D));
        Self {
            core: syn::parse_quote!(::handlegen_core),
            namespace: "xr".to_owned(),
            result_ty: syn::parse_quote!(XrResult),
            policy,
            dispatch,
            errs: RefCell::default(),
        }
    }

    /// Returns the collected error messages and clears them.
    pub(crate) fn take_errors(&self) -> Vec<String> {
        self.errs
            .borrow_mut()
            .0
            .drain(..)
            .map(|err| err.to_string())
            .collect()
    }
}
