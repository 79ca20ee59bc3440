/// Marks one or more types as [`Dispatch`][crate::Dispatch]
/// objects.
///
/// This is the declarative counterpart of `#[derive(Dispatch)]`
/// and is useful for types defined in other crates.
///
/// # Example
///
/// ```rust
/// use handlegen_core::{Dispatch, impl_dispatch};
///
/// struct StaticLoader;
/// struct DynamicLoader {
///     _lib: usize,
/// }
///
/// impl_dispatch!(StaticLoader, DynamicLoader);
///
/// fn takes_dispatch<D: Dispatch>(_: &D) {}
/// takes_dispatch(&StaticLoader);
/// ```
#[macro_export]
macro_rules! impl_dispatch {
    ($($ty:ty),+ $(,)?) => {
        $(
            #[automatically_derived]
            impl $crate::Dispatch for $ty {}
        )+
    };
}
