//! Proc macros for the `handlegen-core` crate.

mod dispatch;

use syn::Error;

/// Marks the type as a `handlegen_core::Dispatch` object.
///
/// The path to `handlegen_core` can be overridden with
/// `#[handlegen(core = path::to::core)]`.
///
/// ```rust
/// use handlegen_core::Dispatch;
///
/// #[derive(Dispatch)]
/// struct Loader<'a> {
///     _name: &'a str,
/// }
///
/// fn takes_dispatch<D: Dispatch>(_: &D) {}
/// takes_dispatch(&Loader { _name: "runtime" });
/// ```
#[proc_macro_derive(Dispatch, attributes(handlegen))]
pub fn dispatch(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    dispatch::derive(item.into())
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
