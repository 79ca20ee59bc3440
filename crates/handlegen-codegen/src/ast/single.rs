use quote::quote;
use syn::{Expr, FnArg, ItemFn, Type, parse_quote};
use tracing::{debug, instrument};

use super::sig::{self, Inputs};
use crate::{
    ctx::Ctx,
    syntax::MethodDescriptor,
    util::doc_attrs,
};

/// Renders a descriptor that calls the native function once
/// and returns `returns`.
///
/// The descriptor must have been validated.
#[instrument(skip_all, fields(name = %desc.name))]
pub(crate) fn synthesize_single(
    ctx: &Ctx,
    desc: &MethodDescriptor,
    return_type: &Type,
    returns: &Expr,
) -> ItemFn {
    debug!(policy = %ctx.policy, "synthesizing single-call wrapper");

    let core = &ctx.core;
    let inputs = Inputs::new(ctx, desc);
    let mut generics = sig::generics(ctx, desc, &inputs);
    let mut args = inputs.args(desc, None);

    let (value_ty, value) = if desc.unique {
        // Validation guarantees a trailing dispatch reference.
        let dispatch = inputs.dispatch.map(|p| &p.name);
        let found = args
            .last_mut()
            .and_then(|arg| sig::dispatch_lifetime(&mut generics, arg));
        match (dispatch, found) {
            (Some(dispatch), Some((lt, referent))) => {
                let where_clause = generics.make_where_clause();
                where_clause
                    .predicates
                    .push(parse_quote!(#return_type: #core::Destroy<#referent>));
                let ty: Type = parse_quote! {
                    #core::UniqueHandle<#lt, #return_type, #referent>
                };
                let value: Expr = parse_quote! {
                    #core::Unique::new(#returns, #core::ObjectDestroy::new(#dispatch))
                };
                (ty, value)
            }
            _ => {
                ctx.error(&desc.name, "`unique` wrapper without a dispatch reference");
                (return_type.clone(), returns.clone())
            }
        }
    } else {
        (return_type.clone(), returns.clone())
    };

    let ident = &desc.name.ident;
    let docs = doc_attrs(&desc.docs);
    let ret = ctx.policy.return_type(ctx, &value_ty);
    let ret_value = ctx.policy.return_value(&value);
    let (impl_generics, _, where_clause) = generics.split_for_impl();
    let args = args.iter().collect::<Vec<&FnArg>>();

    let bindings = sig::bindings(desc);
    let pre = &desc.pre;
    let post = &desc.post;
    let result = &desc.result;
    let result_ty = &ctx.result_ty;
    let call = sig::call(desc, &desc.invoke);
    let check = ctx
        .policy
        .expand(ctx, &ctx.operation(&desc.name), result);

    parse_quote! {
        #docs
        pub fn #ident #impl_generics (#(#args),*) -> #ret #where_clause {
            #bindings
            #(#pre)*
            let #result: #result_ty = #call;
            #(#post)*
            #check
            #ret_value
        }
    }
}
