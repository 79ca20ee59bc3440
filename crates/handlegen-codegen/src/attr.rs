//! Helpers for parsing `#[handlegen(...)]` attributes.

use std::fmt;

use proc_macro2::{Span, TokenStream};
use quote::ToTokens;
use syn::{Error, Ident, Path, spanned::Spanned as _};

/// An attribute or argument name.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Symbol(pub &'static str);

impl PartialEq<Symbol> for Ident {
    fn eq(&self, word: &Symbol) -> bool {
        self == word.0
    }
}

impl PartialEq<Symbol> for &Ident {
    fn eq(&self, word: &Symbol) -> bool {
        *self == word.0
    }
}

impl PartialEq<Symbol> for Path {
    fn eq(&self, word: &Symbol) -> bool {
        self.segments
            .iter()
            .map(|seg| &seg.ident)
            .eq(word.0.split("::"))
    }
}

impl PartialEq<Symbol> for &Path {
    fn eq(&self, word: &Symbol) -> bool {
        **self == *word
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// An argument that may be provided at most once.
pub struct Attr<T> {
    name: Symbol,
    tokens: TokenStream,
    value: Option<T>,
}

impl<T> Attr<T> {
    /// Creates an unset argument.
    pub fn none(name: Symbol) -> Self {
        Self {
            name,
            tokens: TokenStream::new(),
            value: None,
        }
    }

    /// Sets the argument's value.
    ///
    /// `obj` is the syntax the value came from. It is used to
    /// point at the repeated argument if the value has already
    /// been set.
    pub fn set<A: ToTokens>(&mut self, obj: A, value: T) -> syn::Result<()> {
        let tokens = obj.into_token_stream();
        if self.value.is_some() {
            let mut err = Error::new(tokens.span(), format!("duplicate value: {}", self.name));
            err.combine(Error::new(self.span(), "first set here"));
            return Err(err);
        }
        self.tokens = tokens;
        self.value = Some(value);
        Ok(())
    }

    /// Returns the span of the syntax that set the argument, or
    /// the call site if it is unset.
    pub fn span(&self) -> Span {
        if self.tokens.is_empty() {
            Span::call_site()
        } else {
            self.tokens.span()
        }
    }

    /// Returns the inner value.
    pub fn get(self) -> Option<T> {
        self.value
    }
}
