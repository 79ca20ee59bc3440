use syn::{GenericArgument, Path, PathArguments, Type, TypePath};

use crate::util::{PathExt as _, peel};

/// The set of types that are dispatch objects.
///
/// A dispatch object carries the function table used to reach
/// the native API. Wrappers take it as their trailing parameter,
/// and `unique` wrappers destroy their handles through it.
///
/// Types are matched by path suffix, so registering `Runtime`
/// also matches `crate::rt::Runtime`. References and
/// `Box`/`Rc`/`Arc` are looked through.
#[derive(Clone, Debug, Default)]
pub struct DispatchRegistry {
    paths: Vec<Path>,
}

impl DispatchRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dispatch type.
    pub fn register(&mut self, path: Path) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }

    /// Returns the registered paths.
    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// Reports whether `ty` is (a reference to or smart pointer
    /// holding) a registered dispatch type.
    pub fn is_dispatch(&self, ty: &Type) -> bool {
        let Some(path) = self.dispatch_path(ty) else {
            return false;
        };
        self.paths.iter().any(|p| path.ends_with(p))
    }

    fn dispatch_path<'a>(&self, ty: &'a Type) -> Option<&'a Path> {
        let Type::Path(TypePath { qself: None, path }) = peel(ty) else {
            return None;
        };
        match pointee(path) {
            Some(inner) => self.dispatch_path(inner),
            None => Some(path),
        }
    }
}

/// Returns `T` if `path` is `Box<T>`, `Rc<T>` or `Arc<T>`.
fn pointee(path: &Path) -> Option<&Type> {
    let seg = path.segments.last()?;
    if !["Box", "Rc", "Arc"].iter().any(|name| seg.ident == name) {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &seg.arguments else {
        return None;
    };
    let mut types = args.args.iter().filter_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    });
    match (types.next(), types.next()) {
        (Some(ty), None) => Some(ty),
        _ => None,
    }
}
