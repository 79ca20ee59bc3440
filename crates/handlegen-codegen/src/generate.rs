use std::{cell::RefCell, fs, path::Path};

use anyhow::Context as _;
use proc_macro2::TokenStream;
use quote::ToTokens as _;
use syn::{ItemFn, Type, parse_quote};
use tracing::{debug, info, instrument};

use crate::{
    ast::{self, Ast},
    ctx::Ctx,
    error::BuildError,
    policy::ErrorPolicy,
    syntax::{DispatchRegistry, MethodDescriptor, raw::RawFile},
};

/// Configures wrapper generation.
#[derive(Clone, Debug)]
pub struct Config {
    /// Path to `handlegen_core` as seen by the generated code.
    ///
    /// Defaults to `::handlegen_core`.
    pub core: syn::Path,
    /// Prefix for operation names in errors, e.g. `xr`.
    ///
    /// May be empty.
    pub namespace: String,
    /// The native result code type.
    ///
    /// It must implement `handlegen_core::ResultCode`.
    pub result_ty: Type,
    /// How wrappers react to failures.
    pub policy: ErrorPolicy,
    /// Types that are dispatch objects.
    pub dispatch: DispatchRegistry,
}

impl Config {
    /// Creates a `Config` with the default core path, policy and
    /// an empty dispatch registry.
    pub fn new(namespace: impl Into<String>, result_ty: Type) -> Self {
        Self {
            core: parse_quote!(::handlegen_core),
            namespace: namespace.into(),
            result_ty,
            policy: ErrorPolicy::default(),
            dispatch: DispatchRegistry::new(),
        }
    }

    fn ctx(&self) -> Ctx {
        Ctx {
            core: self.core.clone(),
            namespace: self.namespace.clone(),
            result_ty: self.result_ty.clone(),
            policy: self.policy,
            dispatch: self.dispatch.clone(),
            errs: RefCell::default(),
        }
    }

    /// Generates wrappers for `descs`.
    ///
    /// Every invalid descriptor is reported, not just the first.
    #[instrument(skip_all, fields(policy = %self.policy, descs = descs.len()))]
    pub fn generate(&self, descs: &[MethodDescriptor]) -> Result<TokenStream, BuildError> {
        info!("generating wrappers");

        let mut ctx = self.ctx();
        let ast = Ast::build(&ctx, descs);
        ctx.propagate()?;

        debug!(
            free = ast.free.len(),
            impls = ast.impls.len(),
            "generated wrappers"
        );
        Ok(ast.into_token_stream())
    }

    /// Generates wrappers from a JSON descriptor file's
    /// contents.
    pub fn generate_json(&self, json: &str) -> Result<TokenStream, BuildError> {
        let file = RawFile::from_json(json).context("unable to parse descriptors")?;
        let descs = file.into_descriptors()?;
        self.generate(&descs)
    }

    /// Generates wrappers from the JSON descriptor file at
    /// `path`.
    pub fn generate_file(&self, path: impl AsRef<Path>) -> Result<TokenStream, BuildError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("unable to read `{}`", path.display()))?;
        let file = RawFile::from_json(&json)
            .with_context(|| format!("unable to parse `{}`", path.display()))?;
        let descs = file.into_descriptors()?;
        self.generate(&descs)
    }

    /// Renders a single descriptor: one wrapper for single-call
    /// functions or the `name`/`name_with` pair for two-call
    /// functions.
    pub fn synthesize(&self, desc: &MethodDescriptor) -> Result<Vec<ItemFn>, BuildError> {
        let mut ctx = self.ctx();
        let fns = if ast::validate(&ctx, desc) {
            ast::synthesize(&ctx, desc)
        } else {
            Vec::new()
        };
        ctx.propagate()?;
        Ok(fns)
    }

    /// Returns the code that checks `desc`'s native result under
    /// the configured policy.
    pub fn expand_error_handling(&self, desc: &MethodDescriptor) -> TokenStream {
        let ctx = self.ctx();
        self.policy
            .expand(&ctx, &ctx.operation(&desc.name), &desc.result)
    }
}

/// Formats generated code.
///
/// Returns the unformatted code if `tokens` is not a valid file.
pub fn format(tokens: &TokenStream) -> String {
    match syn::parse2::<syn::File>(tokens.clone()) {
        Ok(file) => prettyplease::unparse(&file),
        Err(_) => tokens.to_string(),
    }
}

/// Writes formatted code to `path`, for debugging.
pub fn dump(tokens: &TokenStream, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    fs::write(path, format(tokens))
        .with_context(|| format!("unable to write `{}`", path.display()))
}
