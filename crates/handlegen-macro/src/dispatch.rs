use handlegen_codegen::{
    KeyValPair,
    attr::{Attr, Symbol},
};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    DeriveInput, Error, Ident, Path,
    parse::{Parse, ParseStream, Result},
    parse_quote,
};
use tracing::info;

const HANDLEGEN: Symbol = Symbol("handlegen");
const CORE: Symbol = Symbol("core");

pub(super) fn derive(item: TokenStream) -> Result<TokenStream> {
    let item = syn::parse2::<DeriveInput>(item)?;
    info!(ident = %item.ident, "deriving `Dispatch`");

    let mut core = Attr::none(CORE);
    for attr in &item.attrs {
        if attr.path() != HANDLEGEN {
            continue;
        }
        let TypeAttr { core: path } = attr.parse_args()?;
        core.set(attr, path)?;
    }
    let core = core.get().unwrap_or_else(|| parse_quote!(::handlegen_core));

    let ident = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let code = quote! {
        #[automatically_derived]
        impl #impl_generics #core::Dispatch for #ident #ty_generics #where_clause {}
    };
    Ok(code)
}

/// `#[handlegen(core = path)]`
struct TypeAttr {
    core: Path,
}

impl Parse for TypeAttr {
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        let KeyValPair { key, val } = input.parse::<KeyValPair<Ident, Path>>()?;
        if key != CORE {
            return Err(Error::new_spanned(
                &key,
                format!("unknown argument `{key}`"),
            ));
        }
        if !input.is_empty() {
            return Err(input.error("unexpected trailing tokens"));
        }
        Ok(Self { core: val })
    }
}
