use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Expr, FnArg, GenericParam, ItemFn, Type, parse_quote};
use tracing::{debug, instrument};

use super::{
    rewrite::rebind,
    sig::{self, BUF, Inputs},
};
use crate::{
    ctx::Ctx,
    syntax::{ItemKind, MethodDescriptor, TwoCall},
    util::{IdentExt as _, doc_attrs},
};

/// Renders a two-call descriptor as a pair of wrappers.
///
/// The first, `name`, allocates a fresh `Vec` and delegates to
/// the second, `name_with`, which fills a caller-provided
/// [`Buffer`] and holds the only copy of the retry loop.
///
/// The descriptor must have been validated.
///
/// [`Buffer`]: https://docs.rs/handlegen-core/latest/handlegen_core/trait.Buffer.html
#[instrument(skip_all, fields(name = %desc.name))]
pub(crate) fn synthesize_two_call(ctx: &Ctx, desc: &MethodDescriptor, tc: &TwoCall) -> [ItemFn; 2] {
    debug!(policy = %ctx.policy, item = ?tc.item, "synthesizing two-call wrappers");

    let inputs = Inputs::new(ctx, desc);
    [simple(ctx, desc, tc, &inputs), with_buffer(ctx, desc, tc, &inputs)]
}

/// The type the wrappers return, before the error policy is
/// applied.
fn value_ty(ctx: &Ctx, tc: &TwoCall, buf: &Type) -> Type {
    let core = &ctx.core;
    match tc.item {
        ItemKind::Value => buf.clone(),
        ItemKind::Text => parse_quote!(#core::internal::String),
    }
}

/// `name(...)`
fn simple(ctx: &Ctx, desc: &MethodDescriptor, tc: &TwoCall, inputs: &Inputs<'_>) -> ItemFn {
    let core = &ctx.core;
    let element = &tc.element;

    let ident = &desc.name.ident;
    let with = ident.with_suffix("_with");
    let callee: Expr = if desc.name.owner.is_some() {
        parse_quote!(Self::#with)
    } else {
        parse_quote!(#with)
    };

    let generics = sig::generics(ctx, desc, inputs);
    let (impl_generics, _, where_clause) = generics.split_for_impl();
    let args = inputs.args(desc, None);
    let forward = inputs.forward(desc, parse_quote!(#core::internal::Vec::new()));

    let vec: Type = parse_quote!(#core::internal::Vec<#element>);
    let ret = ctx.policy.return_type(ctx, &value_ty(ctx, tc, &vec));

    let mut docs = desc.docs.clone();
    if !docs.is_empty() {
        docs.push(String::new());
    }
    docs.push(format!("See [`{}`] to reuse an existing buffer.", link(desc, &with)));
    let docs = doc_attrs(&docs);

    parse_quote! {
        #docs
        pub fn #ident #impl_generics (#(#args),*) -> #ret #where_clause {
            #callee(#(#forward),*)
        }
    }
}

/// `name_with(..., buffer, ...)`
fn with_buffer(ctx: &Ctx, desc: &MethodDescriptor, tc: &TwoCall, inputs: &Inputs<'_>) -> ItemFn {
    let core = &ctx.core;
    let TwoCall {
        array,
        count,
        capacity,
        element,
        count_type,
        ..
    } = tc;

    let buf = format_ident!("{}", BUF);
    let mut generics = sig::generics(ctx, desc, inputs);
    generics
        .params
        .push(GenericParam::Type(parse_quote!(#buf: #core::Buffer<#element>)));
    let (impl_generics, _, where_clause) = generics.split_for_impl();

    let extra: FnArg = parse_quote!(mut #array: #buf);
    let args = inputs.args(desc, Some(extra));

    let buf_ty: Type = parse_quote!(#buf);
    let ret = ctx.policy.return_type(ctx, &value_ty(ctx, tc, &buf_ty));

    let op = ctx.operation(&desc.name);
    let result = &desc.result;
    let result_ty = &ctx.result_ty;
    let check = ctx.policy.expand(ctx, &op, result);

    let probe = sig::call(
        desc,
        &rebind(&desc.invoke, array, &parse_quote!(::core::ptr::null_mut())),
    );
    let fill = sig::call(
        desc,
        &rebind(
            &desc.invoke,
            array,
            &parse_quote!(#core::Buffer::as_mut_ptr(&mut #array)),
        ),
    );

    let (empty, filled): (Expr, Expr) = match tc.item {
        ItemKind::Value => (parse_quote!(#array), parse_quote!(#array)),
        ItemKind::Text => (
            parse_quote!(#core::internal::String::new()),
            parse_quote!(#core::text::from_c_chars(#core::Buffer::as_slice(&#array))),
        ),
    };
    let empty = ctx.policy.return_value(&empty);
    let filled = ctx.policy.return_value(&filled);

    let bindings = sig::bindings(desc);
    let pre = &desc.pre;
    let post = &desc.post;
    let retry = retry_log(ctx, &op, tc);

    let simple = &desc.name.ident;
    let mut docs = desc.docs.clone();
    if !docs.is_empty() {
        docs.push(String::new());
    }
    docs.push(format!(
        "Like [`{}`], but writes into `{array}`.",
        link(desc, simple)
    ));
    let docs = doc_attrs(&docs);

    let ident = simple.with_suffix("_with");
    parse_quote! {
        #docs
        pub fn #ident #impl_generics (#(#args),*) -> #ret #where_clause {
            #bindings
            let mut #count: #count_type = 0;
            let mut #capacity: #count_type = 0;
            #(#pre)*
            let mut #result: #result_ty = #probe;
            if !#core::ResultCode::unqualified_success(#result) || #count == 0 {
                #core::Buffer::clear(&mut #array);
                #check
                return #empty;
            }
            loop {
                #core::Buffer::resize(&mut #array, #count as usize);
                #capacity = #core::Buffer::len(&#array) as #count_type;
                #result = #fill;
                if !#core::ResultCode::is_size_insufficient(#result) {
                    break;
                }
                #retry
            }
            if #core::ResultCode::succeeded(#result) {
                ::core::debug_assert!(
                    (#count as usize) <= #core::Buffer::len(&#array),
                    "{}: native call wrote {} elements to a buffer of {}",
                    #op,
                    #count,
                    #core::Buffer::len(&#array),
                );
                #core::Buffer::truncate(&mut #array, #count as usize);
            } else {
                #core::Buffer::clear(&mut #array);
            }
            #(#post)*
            #check
            #filled
        }
    }
}

fn retry_log(ctx: &Ctx, op: &str, tc: &TwoCall) -> TokenStream {
    let core = &ctx.core;
    let count = &tc.count;
    let capacity = &tc.capacity;
    quote! {
        #core::internal::tracing::trace!(
            operation = #op,
            required = #count,
            capacity = #capacity,
            "buffer too small, retrying"
        );
    }
}

/// Returns an intra-doc link to `ident`.
fn link(desc: &MethodDescriptor, ident: &syn::Ident) -> String {
    match desc.name.owner {
        Some(_) => format!("Self::{ident}"),
        None => ident.to_string(),
    }
}
