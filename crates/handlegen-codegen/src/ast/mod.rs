mod rewrite;
mod sig;
mod single;
mod two_call;

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{GenericParam, Ident, ImplItemFn, ItemFn, Type};
use tracing::{instrument, trace};

pub(crate) use self::{single::synthesize_single, two_call::synthesize_two_call};
use crate::{
    ctx::Ctx,
    syntax::{MethodDescriptor, Shape},
};

/// The generated wrappers.
#[derive(Debug, Default)]
pub(crate) struct Ast {
    /// Wrappers without an owner, in descriptor order.
    pub free: Vec<ItemFn>,
    /// `impl` blocks in order of first appearance.
    pub impls: Vec<(Ident, Vec<ItemFn>)>,
}

impl Ast {
    /// Synthesizes every descriptor.
    ///
    /// Invalid descriptors are reported through `ctx` and
    /// skipped.
    #[instrument(skip_all, fields(descs = descs.len()))]
    pub fn build(ctx: &Ctx, descs: &[MethodDescriptor]) -> Self {
        let mut ast = Self::default();
        for desc in descs {
            if !validate(ctx, desc) {
                trace!(name = %desc.name, "skipping invalid descriptor");
                continue;
            }
            let fns = synthesize(ctx, desc);
            ast.add(desc, fns);
        }
        ast
    }

    fn add(&mut self, desc: &MethodDescriptor, fns: Vec<ItemFn>) {
        let Some(owner) = &desc.name.owner else {
            self.free.extend(fns);
            return;
        };
        match self.impls.iter_mut().find(|(ident, _)| ident == owner) {
            Some((_, items)) => items.extend(fns),
            None => self.impls.push((owner.clone(), fns)),
        }
    }
}

impl ToTokens for Ast {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        for f in &self.free {
            f.to_tokens(tokens);
        }
        for (owner, fns) in &self.impls {
            let items = fns.iter().cloned().map(into_impl_item);
            tokens.extend(quote! {
                impl #owner {
                    #(#items)*
                }
            });
        }
    }
}

fn into_impl_item(f: ItemFn) -> ImplItemFn {
    ImplItemFn {
        attrs: f.attrs,
        vis: f.vis,
        defaultness: None,
        sig: f.sig,
        block: *f.block,
    }
}

/// Renders one validated descriptor.
pub(crate) fn synthesize(ctx: &Ctx, desc: &MethodDescriptor) -> Vec<ItemFn> {
    match &desc.shape {
        Shape::Single {
            return_type,
            returns,
        } => vec![synthesize_single(ctx, desc, return_type, returns)],
        Shape::TwoCall(tc) => synthesize_two_call(ctx, desc, tc).into(),
    }
}

/// Reports everything wrong with `desc` through `ctx`.
///
/// Returns `true` if the descriptor can be synthesized.
#[instrument(skip_all, fields(name = %desc.name))]
pub(crate) fn validate(ctx: &Ctx, desc: &MethodDescriptor) -> bool {
    let mut ok = true;
    let mut error = |tokens: &dyn ToTokens, msg: String| {
        ctx.error(tokens.to_token_stream(), format!("`{}`: {msg}", desc.name));
        ok = false;
    };

    if desc.receiver.is_some() && desc.name.owner.is_none() {
        error(&desc.name, "a receiver requires an owner".to_owned());
    }

    let inputs = desc.inputs().collect::<Vec<_>>();
    let dispatch = inputs
        .iter()
        .enumerate()
        .filter(|(_, p)| ctx.dispatch.is_dispatch(&p.ty))
        .collect::<Vec<_>>();
    match dispatch.as_slice() {
        [] | [_] => {}
        [_, rest @ ..] => {
            for (_, p) in rest {
                error(&p.name, format!("duplicate dispatch parameter `{}`", p.name));
            }
        }
    }
    if let Some((i, p)) = dispatch.first() {
        if i.saturating_add(1) != inputs.len() {
            error(
                &p.name,
                format!("dispatch parameter `{}` must be the last parameter", p.name),
            );
        }
    }
    for p in desc.outputs() {
        if ctx.dispatch.is_dispatch(&p.ty) {
            error(&p.name, format!("output parameter `{}` cannot be a dispatch object", p.name));
        }
    }

    if desc.unique {
        if desc.two_call().is_some() {
            error(&desc.name, "two-call wrappers cannot be `unique`".to_owned());
        }
        match dispatch.last() {
            None => error(
                &desc.name,
                "`unique` wrappers need a dispatch parameter to destroy the handle".to_owned(),
            ),
            Some((_, p)) if !matches!(p.ty, Type::Reference(_)) => error(
                &p.ty,
                format!("`unique` wrappers need `{}` by reference", p.name),
            ),
            Some(_) => {}
        }
    }

    if let Some(tc) = desc.two_call() {
        let mentioned = rewrite::mentions(&desc.invoke);
        for (field, ident) in [
            ("array", &tc.array),
            ("count", &tc.count),
            ("capacity", &tc.capacity),
        ] {
            if !mentioned.contains(ident) {
                error(
                    &desc.invoke,
                    format!("the native call does not use the {field} `{ident}`"),
                );
            }
            if desc.params.iter().any(|p| p.name == *ident) {
                error(ident, format!("the {field} `{ident}` shadows a parameter"));
            }
        }
        let collides = desc.generics.params.iter().any(|p| match p {
            GenericParam::Type(t) => t.ident == sig::BUF,
            _ => false,
        });
        if collides {
            error(
                &desc.generics,
                format!("the generic parameter `{}` is reserved", sig::BUF),
            );
        }
    }

    ok
}

#[cfg(test)]
mod tests {
    use quote::format_ident;
    use syn::parse_quote;
    use test_log::test;

    use super::*;
    use crate::{
        policy::ErrorPolicy,
        syntax::{Param, QualifiedName, TwoCall},
    };

    fn base() -> MethodDescriptor {
        MethodDescriptor {
            name: QualifiedName::free(format_ident!("enumerate_formats")),
            docs: Vec::new(),
            generics: Default::default(),
            receiver: None,
            params: vec![
                Param::required(format_ident!("session"), parse_quote!(u64)),
                Param::required(format_ident!("rt"), parse_quote!(&Runtime)),
            ],
            shape: Shape::TwoCall(TwoCall::values(
                format_ident!("formats"),
                format_ident!("count"),
                format_ident!("capacity"),
                parse_quote!(i64),
            )),
            pre: Vec::new(),
            post: Vec::new(),
            invoke: parse_quote!(rt.enumerate_formats(session, capacity, &mut count, formats)),
            unsafe_call: true,
            result: format_ident!("result"),
            unique: false,
        }
    }

    fn errors(desc: &MethodDescriptor) -> Vec<String> {
        let ctx = Ctx::for_tests(ErrorPolicy::AlwaysFail);
        let ok = validate(&ctx, desc);
        let errs = ctx.take_errors();
        assert_eq!(ok, errs.is_empty(), "{errs:?}");
        errs
    }

    #[test]
    fn test_valid() {
        assert_eq!(errors(&base()), Vec::<String>::new());
    }

    #[test]
    fn test_receiver_without_owner() {
        let desc = MethodDescriptor {
            receiver: Some(parse_quote!(&self)),
            ..base()
        };
        assert_eq!(
            errors(&desc),
            ["`enumerate_formats`: a receiver requires an owner"]
        );
    }

    #[test]
    fn test_dispatch_position() {
        let desc = MethodDescriptor {
            params: vec![
                Param::required(format_ident!("rt"), parse_quote!(&Runtime)),
                Param::required(format_ident!("session"), parse_quote!(u64)),
            ],
            ..base()
        };
        assert_eq!(
            errors(&desc),
            ["`enumerate_formats`: dispatch parameter `rt` must be the last parameter"]
        );

        let desc = MethodDescriptor {
            params: vec![
                Param::required(format_ident!("rt"), parse_quote!(&Runtime)),
                Param::required(format_ident!("other"), parse_quote!(std::sync::Arc<Runtime>)),
            ],
            ..base()
        };
        let errs = errors(&desc);
        assert!(
            errs.contains(&"`enumerate_formats`: duplicate dispatch parameter `other`".to_owned()),
            "{errs:?}"
        );
    }

    #[test]
    fn test_invoke_must_use_triple() {
        let desc = MethodDescriptor {
            invoke: parse_quote!(rt.enumerate_formats(session, 16, &mut count, formats)),
            ..base()
        };
        assert_eq!(
            errors(&desc),
            ["`enumerate_formats`: the native call does not use the capacity `capacity`"]
        );
    }

    #[test]
    fn test_unique() {
        let desc = MethodDescriptor {
            unique: true,
            ..base()
        };
        assert_eq!(
            errors(&desc),
            ["`enumerate_formats`: two-call wrappers cannot be `unique`"]
        );

        let desc = MethodDescriptor {
            unique: true,
            shape: Shape::default(),
            params: vec![Param::required(format_ident!("session"), parse_quote!(u64))],
            invoke: parse_quote!(ffi::destroy(session)),
            ..base()
        };
        assert_eq!(
            errors(&desc),
            ["`enumerate_formats`: `unique` wrappers need a dispatch parameter to destroy the handle"]
        );

        let desc = MethodDescriptor {
            unique: true,
            shape: Shape::default(),
            params: vec![Param::required(format_ident!("rt"), parse_quote!(Box<Runtime>))],
            ..base()
        };
        assert_eq!(
            errors(&desc),
            ["`enumerate_formats`: `unique` wrappers need `rt` by reference"]
        );
    }

    #[test]
    fn test_reserved_generic() {
        let desc = MethodDescriptor {
            generics: parse_quote!(<Buf: Copy>),
            ..base()
        };
        assert_eq!(
            errors(&desc),
            ["`enumerate_formats`: the generic parameter `Buf` is reserved"]
        );
    }

    #[test]
    fn test_build_groups_by_owner() {
        let ctx = Ctx::for_tests(ErrorPolicy::AssertOnly);
        let method = |owner: &str, name: &str| MethodDescriptor {
            name: QualifiedName::method(format_ident!("{}", owner), format_ident!("{}", name)),
            shape: Shape::default(),
            params: Vec::new(),
            invoke: parse_quote!(ffi::call()),
            ..base()
        };
        let descs = [
            method("Session", "begin"),
            base(),
            method("Instance", "poll"),
            method("Session", "end"),
        ];
        let ast = Ast::build(&ctx, &descs);
        assert!(ctx.take_errors().is_empty());

        let free = ast
            .free
            .iter()
            .map(|f| f.sig.ident.to_string())
            .collect::<Vec<_>>();
        assert_eq!(free, ["enumerate_formats", "enumerate_formats_with"]);

        let impls = ast
            .impls
            .iter()
            .map(|(owner, fns)| {
                let names = fns.iter().map(|f| f.sig.ident.to_string()).collect::<Vec<_>>();
                (owner.to_string(), names)
            })
            .collect::<Vec<_>>();
        assert_eq!(
            impls,
            [
                ("Session".to_owned(), vec!["begin".to_owned(), "end".to_owned()]),
                ("Instance".to_owned(), vec!["poll".to_owned()]),
            ]
        );
    }

    #[test]
    fn test_build_skips_invalid() {
        let ctx = Ctx::for_tests(ErrorPolicy::AssertOnly);
        let bad = MethodDescriptor {
            receiver: Some(parse_quote!(&self)),
            ..base()
        };
        let ast = Ast::build(&ctx, &[bad, base()]);
        assert_eq!(ast.free.len(), 2);
        assert_eq!(ctx.take_errors().len(), 1);
    }
}
