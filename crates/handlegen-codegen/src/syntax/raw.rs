//! The JSON descriptor file format.
//!
//! ```json
//! {
//!     "methods": [{
//!         "name": "Session::get_name",
//!         "docs": ["Returns the session's name."],
//!         "receiver": "&self",
//!         "params": [{ "name": "rt", "type": "&Runtime" }],
//!         "array": "buf",
//!         "count": "len",
//!         "capacity": "cap",
//!         "item": "text",
//!         "invoke": "rt.get_name(self.raw, cap, &mut len, buf)"
//!     }]
//! }
//! ```
//!
//! Types, expressions and statements are written as Rust source
//! and parsed with `syn`.

use proc_macro2::Span;
use serde::Deserialize;
use syn::{
    Block, Error, Expr, Generics, Ident, Receiver, Result, Stmt, Type, WhereClause,
    parse::{Parse, Parser as _},
    parse_quote,
};
use tracing::{debug, instrument};

use super::descriptor::{
    ItemKind, MethodDescriptor, Param, ParamKind, QualifiedName, Shape, TwoCall,
    default_result,
};

/// A descriptor file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFile {
    /// The methods to wrap, in output order.
    #[serde(default)]
    pub methods: Vec<RawDescriptor>,
}

impl RawFile {
    /// Parses a descriptor file.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Converts every descriptor, reporting all invalid ones.
    pub fn into_descriptors(self) -> Result<Vec<MethodDescriptor>> {
        let mut descs = Vec::with_capacity(self.methods.len());
        let mut errs: Option<Error> = None;
        for raw in self.methods {
            match raw.into_descriptor() {
                Ok(desc) => descs.push(desc),
                Err(err) => match &mut errs {
                    Some(all) => all.combine(err),
                    None => errs = Some(err),
                },
            }
        }
        match errs {
            Some(err) => Err(err),
            None => Ok(descs),
        }
    }
}

/// One method, as written in a descriptor file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDescriptor {
    /// `Owner::method` or `method`.
    pub name: String,
    #[serde(default)]
    pub docs: Vec<String>,
    /// E.g., `<D: Loader>`.
    pub generics: Option<String>,
    /// E.g., `where D: Send`.
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
    /// E.g., `&self`.
    pub receiver: Option<String>,
    #[serde(default)]
    pub params: Vec<RawParam>,
    /// Single-call return type.
    pub return_type: Option<String>,
    /// Single-call return expression.
    pub returns: Option<String>,
    /// Two-call output buffer.
    pub array: Option<String>,
    /// Two-call count output.
    pub count: Option<String>,
    /// Two-call capacity input.
    pub capacity: Option<String>,
    /// Two-call element type.
    pub element: Option<String>,
    #[serde(default)]
    pub item: RawItem,
    /// Two-call count type, `u32` if unset.
    pub count_type: Option<String>,
    pub pre: Option<String>,
    pub post: Option<String>,
    pub invoke: String,
    pub result: Option<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(rename = "unsafe", default = "yes")]
    pub unsafe_call: bool,
}

fn yes() -> bool {
    true
}

/// A parameter, as written in a descriptor file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawParam {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub kind: RawParamKind,
    /// Required for optional parameters.
    pub default: Option<String>,
}

/// See [`ParamKind`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawParamKind {
    #[default]
    Required,
    Optional,
    Output,
}

/// See [`ItemKind`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawItem {
    #[default]
    Value,
    Text,
}

/// Collects conversion errors for one descriptor.
struct Report<'a> {
    method: &'a str,
    errs: Option<Error>,
}

impl<'a> Report<'a> {
    fn new(method: &'a str) -> Self {
        Self { method, errs: None }
    }

    fn error(&mut self, field: &str, msg: impl std::fmt::Display) {
        let err = Error::new(
            Span::call_site(),
            format!("`{}`: `{field}`: {msg}", self.method),
        );
        match &mut self.errs {
            Some(all) => all.combine(err),
            None => self.errs = Some(err),
        }
    }

    fn parse<T: Parse>(&mut self, field: &str, src: &str) -> Option<T> {
        match syn::parse_str(src) {
            Ok(v) => Some(v),
            Err(err) => {
                self.error(field, format_args!("{err}: `{src}`"));
                None
            }
        }
    }

    fn parse_opt<T: Parse>(&mut self, field: &str, src: Option<&str>) -> Option<Option<T>> {
        match src {
            Some(src) => self.parse(field, src).map(Some),
            None => Some(None),
        }
    }

    fn stmts(&mut self, field: &str, src: Option<&str>) -> Option<Vec<Stmt>> {
        let Some(src) = src else {
            return Some(Vec::new());
        };
        match Block::parse_within.parse_str(src) {
            Ok(v) => Some(v),
            Err(err) => {
                self.error(field, format_args!("{err}: `{src}`"));
                None
            }
        }
    }

    fn finish<T>(self, value: Option<T>) -> Result<T> {
        match (self.errs, value) {
            (None, Some(v)) => Ok(v),
            (Some(err), _) => Err(err),
            (None, None) => Err(Error::new(
                Span::call_site(),
                format!("`{}`: invalid descriptor", self.method),
            )),
        }
    }
}

impl RawDescriptor {
    /// Parses the descriptor's Rust fragments.
    #[instrument(skip_all, fields(name = %self.name))]
    pub fn into_descriptor(self) -> Result<MethodDescriptor> {
        debug!("converting descriptor");

        let mut r = Report::new(&self.name);

        let name = qualified_name(&mut r, &self.name);
        let generics = r.parse_opt::<Generics>("generics", self.generics.as_deref());
        let where_clause = r.parse_opt::<WhereClause>("where", self.where_clause.as_deref());
        let receiver = r.parse_opt::<Receiver>("receiver", self.receiver.as_deref());
        let params = self
            .params
            .iter()
            .map(|p| param(&mut r, p))
            .collect::<Vec<_>>()
            .into_iter()
            .collect::<Option<Vec<_>>>();
        let shape = shape(&mut r, &self);
        let pre = r.stmts("pre", self.pre.as_deref());
        let post = r.stmts("post", self.post.as_deref());
        let invoke = r.parse::<Expr>("invoke", &self.invoke);
        let result = r
            .parse_opt::<Ident>("result", self.result.as_deref())
            .map(|v| v.unwrap_or_else(default_result));

        let desc = (|| {
            let mut generics = generics?.unwrap_or_default();
            if let Some(clause) = where_clause? {
                generics.where_clause = Some(clause);
            }
            Some(MethodDescriptor {
                name: name?,
                docs: self.docs.clone(),
                generics,
                receiver: receiver?,
                params: params?,
                shape: shape?,
                pre: pre?,
                post: post?,
                invoke: invoke?,
                unsafe_call: self.unsafe_call,
                result: result?,
                unique: self.unique,
            })
        })();
        r.finish(desc)
    }
}

fn qualified_name(r: &mut Report<'_>, name: &str) -> Option<QualifiedName> {
    let mut parts = name.split("::");
    let (owner, ident) = match (parts.next(), parts.next(), parts.next()) {
        (Some(ident), None, _) => (None, ident),
        (Some(owner), Some(ident), None) => (Some(owner), ident),
        _ => {
            r.error("name", "expected `Owner::method` or `method`");
            return None;
        }
    };
    let owner = match owner {
        Some(owner) => Some(r.parse::<Ident>("name", owner)?),
        None => None,
    };
    let ident = r.parse::<Ident>("name", ident)?;
    Some(QualifiedName { owner, ident })
}

fn param(r: &mut Report<'_>, raw: &RawParam) -> Option<Param> {
    let name = r.parse::<Ident>("params", &raw.name);
    let ty = r.parse::<Type>("params", &raw.ty);
    let kind = match (raw.kind, raw.default.as_deref()) {
        (RawParamKind::Optional, Some(default)) => {
            r.parse::<Expr>("default", default).map(ParamKind::Optional)
        }
        (RawParamKind::Optional, None) => {
            r.error(
                "params",
                format_args!("optional parameter `{}` needs a `default`", raw.name),
            );
            None
        }
        (_, Some(_)) => {
            r.error(
                "params",
                format_args!("only optional parameters take a `default`: `{}`", raw.name),
            );
            None
        }
        (RawParamKind::Required, None) => Some(ParamKind::Required),
        (RawParamKind::Output, None) => Some(ParamKind::Output),
    };
    Some(Param {
        name: name?,
        ty: ty?,
        kind: kind?,
    })
}

fn shape(r: &mut Report<'_>, raw: &RawDescriptor) -> Option<Shape> {
    let triple = [
        ("array", raw.array.as_deref()),
        ("count", raw.count.as_deref()),
        ("capacity", raw.capacity.as_deref()),
    ];
    let present = triple.iter().filter(|(_, v)| v.is_some()).count();
    if present == 0 {
        for (field, set) in [
            ("element", raw.element.is_some()),
            ("count_type", raw.count_type.is_some()),
            ("item", raw.item != RawItem::Value),
        ] {
            if set {
                r.error(field, "only valid for two-call descriptors");
            }
        }
        let return_type = r
            .parse_opt::<Type>("return_type", raw.return_type.as_deref())?
            .unwrap_or_else(|| parse_quote!(()));
        let returns = r
            .parse_opt::<Expr>("returns", raw.returns.as_deref())?
            .unwrap_or_else(|| parse_quote!(()));
        return Some(Shape::Single {
            return_type,
            returns,
        });
    }
    if present != triple.len() {
        let missing = triple
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(field, _)| format!("`{field}`"))
            .collect::<Vec<_>>()
            .join(", ");
        r.error(
            "array",
            format_args!("two-call descriptors need `array`, `count` and `capacity`; missing {missing}"),
        );
        return None;
    }
    for (field, set) in [
        ("return_type", raw.return_type.is_some()),
        ("returns", raw.returns.is_some()),
    ] {
        if set {
            r.error(field, "two-call descriptors return their buffer");
        }
    }

    let [array, count, capacity] =
        triple.map(|(field, src)| r.parse::<Ident>(field, src.unwrap_or_default()));
    let element = match (raw.item, raw.element.as_deref()) {
        (RawItem::Value, Some(src)) => r.parse::<Type>("element", src),
        (RawItem::Value, None) => {
            r.error("element", "required for two-call descriptors");
            None
        }
        (RawItem::Text, Some(_)) => {
            r.error("element", "text descriptors always use `c_char`");
            None
        }
        (RawItem::Text, None) => Some(parse_quote!(::core::ffi::c_char)),
    };
    let count_type = r
        .parse_opt::<Type>("count_type", raw.count_type.as_deref())?
        .unwrap_or_else(|| parse_quote!(u32));
    let item = match raw.item {
        RawItem::Value => ItemKind::Value,
        RawItem::Text => ItemKind::Text,
    };
    Some(Shape::TwoCall(TwoCall {
        array: array?,
        count: count?,
        capacity: capacity?,
        element: element?,
        item,
        count_type,
    }))
}
