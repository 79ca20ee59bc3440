use alloc::{boxed::Box, rc::Rc, sync::Arc};

/// Marks a type as a dispatch object.
///
/// A dispatch object routes native calls (including the
/// destructors run by [`ObjectDestroy`][crate::ObjectDestroy]) to
/// the right backing implementation, e.g. a dynamically loaded
/// runtime. Generated wrappers and deleters only accept types
/// that opt in, so an ordinary trailing argument is never
/// mistaken for a dispatch object.
///
/// Nothing is a dispatch object by default. Opt in with
/// `#[derive(Dispatch)]` (requires the `derive` feature) or with
/// [`impl_dispatch!`][crate::impl_dispatch] for foreign types.
/// References and smart pointers to a dispatch object are
/// themselves dispatch objects.
pub trait Dispatch {}

impl<D: Dispatch + ?Sized> Dispatch for &D {}
impl<D: Dispatch + ?Sized> Dispatch for &mut D {}
impl<D: Dispatch + ?Sized> Dispatch for Box<D> {}
impl<D: Dispatch + ?Sized> Dispatch for Rc<D> {}
impl<D: Dispatch + ?Sized> Dispatch for Arc<D> {}
