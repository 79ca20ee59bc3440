//! Pieces shared by both synthesizers.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    Expr, FnArg, GenericParam, Generics, Ident, Lifetime, Type, TypePath, TypeReference,
    WherePredicate, parse_quote,
};

use crate::{
    ctx::Ctx,
    syntax::{MethodDescriptor, Param, ParamKind},
    util::peel,
};

/// The name of the buffer type parameter added to `*_with`
/// wrappers.
pub(super) const BUF: &str = "Buf";

/// The lifetime given to the dispatch reference of `unique`
/// wrappers.
pub(super) const DISPATCH_LIFETIME: &str = "'dispatch";

/// A wrapper's inputs split around the dispatch parameter.
pub(super) struct Inputs<'a> {
    /// Every input except the dispatch parameter.
    pub leading: Vec<&'a Param>,
    /// The trailing dispatch parameter, if any.
    pub dispatch: Option<&'a Param>,
}

impl<'a> Inputs<'a> {
    pub fn new(ctx: &Ctx, desc: &'a MethodDescriptor) -> Self {
        let mut leading = desc.inputs().collect::<Vec<_>>();
        let dispatch = match leading.last() {
            Some(p) if ctx.dispatch.is_dispatch(&p.ty) => leading.pop(),
            _ => None,
        };
        Self { leading, dispatch }
    }

    /// Returns every input in signature order with `extra`
    /// inserted before the dispatch parameter.
    pub fn args(&self, desc: &MethodDescriptor, extra: Option<FnArg>) -> Vec<FnArg> {
        let mut args = Vec::new();
        if let Some(recv) = &desc.receiver {
            args.push(FnArg::Receiver(recv.clone()));
        }
        args.extend(self.leading.iter().map(|p| typed(p)));
        args.extend(extra);
        args.extend(self.dispatch.map(typed));
        args
    }

    /// Returns the expressions that forward every input in
    /// signature order with `extra` inserted before the dispatch
    /// parameter.
    pub fn forward(&self, desc: &MethodDescriptor, extra: Expr) -> Vec<Expr> {
        let mut args: Vec<Expr> = Vec::new();
        if desc.receiver.is_some() {
            args.push(parse_quote!(self));
        }
        args.extend(self.leading.iter().map(|p| name_expr(&p.name)));
        args.push(extra);
        args.extend(self.dispatch.map(|p| name_expr(&p.name)));
        args
    }
}

fn typed(p: &Param) -> FnArg {
    let name = &p.name;
    let ty = p.signature_ty();
    parse_quote!(#name: #ty)
}

fn name_expr(name: &Ident) -> Expr {
    parse_quote!(#name)
}

/// Returns the descriptor's generics with `D: Dispatch` bounds
/// added for generic dispatch parameters.
pub(super) fn generics(ctx: &Ctx, desc: &MethodDescriptor, inputs: &Inputs<'_>) -> Generics {
    let mut generics = desc.generics.clone();
    let Some(dispatch) = inputs.dispatch else {
        return generics;
    };
    let Type::Path(TypePath { qself: None, path }) = peel(&dispatch.ty) else {
        return generics;
    };
    let Some(ident) = path.get_ident() else {
        return generics;
    };
    let is_param = desc.generics.params.iter().any(|p| match p {
        GenericParam::Type(t) => t.ident == *ident,
        _ => false,
    });
    if is_param {
        let core = &ctx.core;
        let pred: WherePredicate = parse_quote!(#ident: #core::Dispatch);
        generics.make_where_clause().predicates.push(pred);
    }
    generics
}

/// Binds optional parameters to their values and declares
/// output parameters.
pub(super) fn bindings(desc: &MethodDescriptor) -> TokenStream {
    let mut tokens = TokenStream::new();
    for p in &desc.params {
        let name = &p.name;
        let ty = &p.ty;
        match &p.kind {
            ParamKind::Required => {}
            ParamKind::Optional(default) => tokens.extend(quote! {
                let #name: #ty = #name.unwrap_or_else(|| #default);
            }),
            ParamKind::Output => tokens.extend(quote! {
                let mut #name: #ty = ::core::default::Default::default();
            }),
        }
    }
    tokens
}

/// Returns the native call, wrapped in `unsafe` if necessary.
pub(super) fn call(desc: &MethodDescriptor, invoke: &Expr) -> TokenStream {
    if desc.unsafe_call {
        quote!(unsafe { #invoke })
    } else {
        quote!(#invoke)
    }
}

/// Gives the dispatch reference a lifetime so that it can be
/// named in the return type, returning the lifetime and the
/// referent.
///
/// Returns `None` if the dispatch parameter is not a reference.
pub(super) fn dispatch_lifetime(
    generics: &mut Generics,
    dispatch: &mut FnArg,
) -> Option<(Lifetime, Type)> {
    let FnArg::Typed(pat) = dispatch else {
        return None;
    };
    let Type::Reference(TypeReference { lifetime, elem, .. }) = pat.ty.as_mut() else {
        return None;
    };
    let lt = match lifetime {
        Some(lt) => lt.clone(),
        None => {
            let lt = Lifetime::new(DISPATCH_LIFETIME, proc_macro2::Span::call_site());
            generics.params.insert(0, parse_quote!(#lt));
            *lifetime = Some(lt.clone());
            lt
        }
    };
    Some((lt, (**elem).clone()))
}

#[cfg(test)]
mod tests {
    use quote::{ToTokens, format_ident};

    use super::*;
    use crate::{
        policy::ErrorPolicy,
        syntax::{QualifiedName, Shape},
    };

    fn desc(params: Vec<Param>, generics: Generics) -> MethodDescriptor {
        MethodDescriptor {
            name: QualifiedName::free(format_ident!("poll")),
            docs: Vec::new(),
            generics,
            receiver: None,
            params,
            shape: Shape::default(),
            pre: Vec::new(),
            post: Vec::new(),
            invoke: parse_quote!(rt.poll()),
            unsafe_call: true,
            result: format_ident!("result"),
            unique: false,
        }
    }

    #[test]
    fn test_inputs_split_dispatch() {
        let ctx = Ctx::for_tests(ErrorPolicy::AlwaysFail);
        let d = desc(
            vec![
                Param::required(format_ident!("session"), parse_quote!(u64)),
                Param::required(format_ident!("rt"), parse_quote!(&Runtime)),
            ],
            Generics::default(),
        );
        let inputs = Inputs::new(&ctx, &d);
        assert_eq!(inputs.leading.len(), 1);
        assert_eq!(inputs.dispatch.map(|p| p.name.to_string()).as_deref(), Some("rt"));

        let extra: FnArg = parse_quote!(mut buf: Buf);
        let got = inputs
            .args(&d, Some(extra))
            .iter()
            .map(|a| a.to_token_stream().to_string())
            .collect::<Vec<_>>();
        assert_eq!(got, ["session : u64", "mut buf : Buf", "rt : & Runtime"]);
    }

    #[test]
    fn test_generic_dispatch_bound() {
        let ctx = Ctx::for_tests(ErrorPolicy::AlwaysFail);
        let d = desc(
            vec![Param::required(format_ident!("rt"), parse_quote!(&D))],
            parse_quote!(<D>),
        );
        let inputs = Inputs::new(&ctx, &d);
        let got = generics(&ctx, &d, &inputs);
        let want: WherePredicate = parse_quote!(D: ::handlegen_core::Dispatch);
        let preds = got.where_clause.as_ref().map(|w| &w.predicates);
        assert_eq!(preds.map(|p| p.len()), Some(1));
        assert_eq!(preds.and_then(|p| p.first()), Some(&want));
    }

    #[test]
    fn test_bindings() {
        let d = desc(
            vec![
                Param {
                    name: format_ident!("timeout"),
                    ty: parse_quote!(u64),
                    kind: ParamKind::Optional(parse_quote!(1000)),
                },
                Param {
                    name: format_ident!("event"),
                    ty: parse_quote!(Event),
                    kind: ParamKind::Output,
                },
            ],
            Generics::default(),
        );
        let want = quote! {
            let timeout: u64 = timeout.unwrap_or_else(|| 1000);
            let mut event: Event = ::core::default::Default::default();
        };
        assert_eq!(bindings(&d).to_string(), want.to_string());
    }

    #[test]
    fn test_dispatch_lifetime() {
        let mut generics: Generics = parse_quote!(<T>);
        let mut arg: FnArg = parse_quote!(rt: &Runtime);
        let (lt, elem) = dispatch_lifetime(&mut generics, &mut arg).unwrap();
        assert_eq!(lt.to_string(), "'dispatch");
        let want: Type = parse_quote!(Runtime);
        assert_eq!(elem, want);
        assert_eq!(
            generics.to_token_stream().to_string(),
            quote!(<'dispatch, T>).to_string()
        );
        assert_eq!(
            arg.to_token_stream().to_string(),
            quote!(rt: &'dispatch Runtime).to_string()
        );

        let mut arg: FnArg = parse_quote!(rt: Box<Runtime>);
        assert!(dispatch_lifetime(&mut generics, &mut arg).is_none());
    }
}
