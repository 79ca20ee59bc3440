use std::collections::HashSet;

use syn::{
    Expr, ExprPath, Ident,
    visit::{self, Visit},
    visit_mut::{self, VisitMut},
};
use tracing::{instrument, trace};

/// Returns a copy of `invoke` with every use of `array` replaced
/// by `with`.
///
/// Only bare paths are rewritten, so `array.len()` becomes
/// `with.len()` while a field named `array` is left alone.
#[instrument(skip_all, fields(%array))]
pub(super) fn rebind(invoke: &Expr, array: &Ident, with: &Expr) -> Expr {
    struct Visitor<'a> {
        array: &'a Ident,
        with: &'a Expr,
        n: usize,
    }
    impl VisitMut for Visitor<'_> {
        fn visit_expr_mut(&mut self, expr: &mut Expr) {
            if let Expr::Path(ExprPath { qself: None, path, .. }) = expr {
                if path.is_ident(self.array) {
                    *expr = self.with.clone();
                    self.n = self.n.saturating_add(1);
                    return;
                }
            }
            visit_mut::visit_expr_mut(self, expr);
        }
    }

    let mut expr = invoke.clone();
    let mut visitor = Visitor { array, with, n: 0 };
    visitor.visit_expr_mut(&mut expr);
    trace!(rewritten = visitor.n, "rebound array argument");
    expr
}

/// Returns the bare identifiers `expr` refers to.
pub(super) fn mentions(expr: &Expr) -> HashSet<Ident> {
    struct Visitor(HashSet<Ident>);
    impl<'ast> Visit<'ast> for Visitor {
        fn visit_expr_path(&mut self, expr: &'ast ExprPath) {
            if expr.qself.is_none() {
                if let Some(ident) = expr.path.get_ident() {
                    self.0.insert(ident.clone());
                }
            }
            visit::visit_expr_path(self, expr);
        }
    }

    let mut visitor = Visitor(HashSet::new());
    visitor.visit_expr(expr);
    visitor.0
}
