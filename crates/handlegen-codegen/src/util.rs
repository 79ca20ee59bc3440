use proc_macro2::TokenStream;
use quote::{IdentFragment, format_ident, quote};
use syn::{
    Ident, Path, Result, Token, Type,
    parse::{Parse, ParseStream},
};

/// Skips the next token if it's a comma.
pub fn skip_comma(input: ParseStream<'_>) -> Result<()> {
    let lookahead = input.lookahead1();
    if lookahead.peek(Token![,]) {
        let _: Token![,] = input.parse()?;
    }
    Ok(())
}

/// Renders doc lines as `#[doc = "..."]` attributes.
pub(crate) fn doc_attrs<S: AsRef<str>>(lines: &[S]) -> TokenStream {
    let mut tokens = TokenStream::new();
    for line in lines {
        let line = line.as_ref();
        let line = line.strip_prefix("///").unwrap_or(line);
        // Match rustdoc's `/// foo` lowering.
        let line = if line.is_empty() || line.starts_with(' ') {
            line.to_owned()
        } else {
            format!(" {line}")
        };
        tokens.extend(quote! {
            #[doc = #line]
        });
    }
    tokens
}

/// Extension trait for [`Path`].
pub(crate) trait PathExt {
    /// Reports whether `self` ends with every segment of
    /// `suffix`, ignoring generic arguments.
    fn ends_with(&self, suffix: &Path) -> bool;
}

impl PathExt for Path {
    fn ends_with(&self, suffix: &Path) -> bool {
        if suffix.segments.len() > self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .rev()
            .zip(suffix.segments.iter().rev())
            .all(|(a, b)| a.ident == b.ident)
    }
}

/// Strips references, parentheses and invisible groups from
/// `ty`.
pub(crate) fn peel(mut ty: &Type) -> &Type {
    loop {
        ty = match ty {
            Type::Reference(v) => &v.elem,
            Type::Paren(v) => &v.elem,
            Type::Group(v) => &v.elem,
            _ => return ty,
        };
    }
}

/// Extension trait for [`struct@Ident`].
pub trait IdentExt {
    /// Adds `suffix` to the identifier.
    #[must_use]
    fn with_suffix<I>(&self, suffix: I) -> Self
    where
        I: IdentFragment;
}

impl IdentExt for Ident {
    fn with_suffix<I>(&self, suffix: I) -> Self
    where
        I: IdentFragment,
    {
        format_ident!("{}{}", self, suffix, span = self.span())
    }
}

/// A key-value pair.
pub struct KeyValPair<K, V> {
    pub key: K,
    pub val: V,
}

impl<K, V> Parse for KeyValPair<K, V>
where
    K: Parse,
    V: Parse,
{
    fn parse(input: ParseStream<'_>) -> Result<Self> {
        let key = input.parse()?;
        let _: Token![=] = input.parse()?;
        let val = input.parse()?;
        skip_comma(input)?;
        Ok(Self { key, val })
    }
}
