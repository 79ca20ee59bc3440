use std::fmt;

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident};
use syn::{Expr, Generics, Ident, Receiver, Stmt, Type, parse_quote};

/// Describes one native entry point to wrap.
///
/// Descriptors are produced by whatever extracts the native API
/// surface and never change afterwards. Which synthesizer
/// renders a descriptor is decided by its [`Shape`].
#[derive(Clone, Debug)]
pub struct MethodDescriptor {
    /// The wrapper's name.
    pub name: QualifiedName,
    /// Doc lines copied onto the wrapper.
    pub docs: Vec<String>,
    /// Generic parameters and where clause.
    pub generics: Generics,
    /// `&self`, `&mut self`, etc.
    ///
    /// Requires an owner.
    pub receiver: Option<Receiver>,
    /// The wrapper's parameters, in order.
    pub params: Vec<Param>,
    /// Single-call or two-call.
    pub shape: Shape,
    /// Statements that run before the native call.
    pub pre: Vec<Stmt>,
    /// Statements that run after the native call.
    pub post: Vec<Stmt>,
    /// The native call.
    ///
    /// For two-call descriptors, arguments that are exactly the
    /// array identifier are rebound for each call.
    pub invoke: Expr,
    /// Whether `invoke` must be wrapped in `unsafe { ... }`.
    pub unsafe_call: bool,
    /// The local the native call's result code is bound to.
    pub result: Ident,
    /// Return the output handle as a `UniqueHandle` destroyed
    /// through the dispatch parameter.
    pub unique: bool,
}

impl MethodDescriptor {
    /// Returns the two-call configuration, if any.
    pub fn two_call(&self) -> Option<&TwoCall> {
        match &self.shape {
            Shape::TwoCall(v) => Some(v),
            Shape::Single { .. } => None,
        }
    }

    /// Returns the parameters that are part of the wrapper's
    /// signature.
    pub fn inputs(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| !p.is_output())
    }

    /// Returns the output parameters.
    pub fn outputs(&self) -> impl Iterator<Item = &Param> {
        self.params.iter().filter(|p| p.is_output())
    }
}

/// `Owner::method` or `method`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QualifiedName {
    /// The type the wrapper is an associated function of.
    pub owner: Option<Ident>,
    /// The wrapper's identifier.
    pub ident: Ident,
}

impl QualifiedName {
    /// Creates a free function name.
    pub fn free(ident: Ident) -> Self {
        Self { owner: None, ident }
    }

    /// Creates an associated function name.
    pub fn method(owner: Ident, ident: Ident) -> Self {
        Self {
            owner: Some(owner),
            ident,
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.owner {
            Some(owner) => write!(f, "{owner}::{}", self.ident),
            None => write!(f, "{}", self.ident),
        }
    }
}

impl ToTokens for QualifiedName {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        if let Some(owner) = &self.owner {
            owner.to_tokens(tokens);
            <syn::Token![::]>::default().to_tokens(tokens);
        }
        self.ident.to_tokens(tokens);
    }
}

/// A wrapper parameter.
#[derive(Clone, Debug)]
pub struct Param {
    /// The parameter's name.
    pub name: Ident,
    /// The parameter's type.
    pub ty: Type,
    /// What kind of parameter this is.
    pub kind: ParamKind,
}

impl Param {
    /// Creates a required parameter.
    pub fn required(name: Ident, ty: Type) -> Self {
        Self {
            name,
            ty,
            kind: ParamKind::Required,
        }
    }

    /// Reports whether this is an output parameter.
    pub fn is_output(&self) -> bool {
        matches!(self.kind, ParamKind::Output)
    }

    /// Returns the type as written in the wrapper's signature.
    pub fn signature_ty(&self) -> Type {
        let ty = &self.ty;
        match self.kind {
            ParamKind::Optional(_) => parse_quote!(::core::option::Option<#ty>),
            ParamKind::Required | ParamKind::Output => ty.clone(),
        }
    }
}

/// The kind of a [`Param`].
#[derive(Clone, Debug)]
pub enum ParamKind {
    /// The caller must provide the argument.
    Required,
    /// The caller may pass `None`, in which case the expression
    /// is used.
    Optional(Expr),
    /// Not part of the signature; a `Default` local that the
    /// native call writes to.
    Output,
}

/// How the native function is called.
#[derive(Clone, Debug)]
pub enum Shape {
    /// Call once and return.
    Single {
        /// The type of `returns`.
        return_type: Type,
        /// The returned expression.
        returns: Expr,
    },
    /// Probe for the element count, then fill a buffer.
    TwoCall(TwoCall),
}

impl Default for Shape {
    fn default() -> Self {
        Self::Single {
            return_type: parse_quote!(()),
            returns: parse_quote!(()),
        }
    }
}

/// The array output of a two-call function.
#[derive(Clone, Debug)]
pub struct TwoCall {
    /// The output buffer.
    pub array: Ident,
    /// The count output: how many elements exist or were
    /// written.
    pub count: Ident,
    /// The capacity input: how many elements the buffer holds.
    pub capacity: Ident,
    /// The element type.
    pub element: Type,
    /// Plain values or text.
    pub item: ItemKind,
    /// The native type of `count` and `capacity`.
    pub count_type: Type,
}

impl TwoCall {
    /// Creates a two-call configuration for an array of
    /// `element`s with `u32` counts.
    pub fn values(array: Ident, count: Ident, capacity: Ident, element: Type) -> Self {
        Self {
            array,
            count,
            capacity,
            element,
            item: ItemKind::Value,
            count_type: parse_quote!(u32),
        }
    }

    /// Creates a two-call configuration for a string.
    pub fn text(array: Ident, count: Ident, capacity: Ident) -> Self {
        Self {
            item: ItemKind::Text,
            ..Self::values(array, count, capacity, parse_quote!(::core::ffi::c_char))
        }
    }
}

/// What a two-call function produces.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum ItemKind {
    /// A sequence of elements.
    #[default]
    Value,
    /// Characters, returned as a `String`.
    Text,
}

/// The default identifier for the result local.
pub(crate) fn default_result() -> Ident {
    format_ident!("result")
}
