//! Unique ownership of native handles.

use core::{fmt, mem, ops::Deref};

use tracing::trace;

use crate::Dispatch;

/// A native handle.
///
/// Handles are plain values (usually integers or pointers) with
/// a distinguished null value.
pub trait Handle: Copy + PartialEq + fmt::Debug {
    /// The null handle.
    const NULL: Self;

    /// Reports whether the handle is null.
    fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

/// Destroys native handles.
///
/// Deleters are infallible: destruction failures are not
/// observable through [`Unique`].
pub trait Deleter<T> {
    /// Destroys `handle`.
    ///
    /// `handle` is never null.
    fn destroy(&mut self, handle: T);
}

impl<T, F> Deleter<T> for F
where
    F: FnMut(T),
{
    fn destroy(&mut self, handle: T) {
        self(handle)
    }
}

/// A handle that is destroyed through a dispatch object `D`.
pub trait Destroy<D: ?Sized>: Handle {
    /// Destroys the handle using `dispatch`.
    fn destroy(self, dispatch: &D);
}

/// A [`Deleter`] that destroys handles through a borrowed
/// dispatch object.
pub struct ObjectDestroy<'d, D: ?Sized> {
    dispatch: &'d D,
}

impl<'d, D: Dispatch + ?Sized> ObjectDestroy<'d, D> {
    /// Creates an `ObjectDestroy`.
    pub const fn new(dispatch: &'d D) -> Self {
        Self { dispatch }
    }

    /// Returns the dispatch object.
    pub const fn dispatch(&self) -> &'d D {
        self.dispatch
    }
}

impl<D: ?Sized> Copy for ObjectDestroy<'_, D> {}
impl<D: ?Sized> Clone for ObjectDestroy<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: ?Sized> fmt::Debug for ObjectDestroy<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectDestroy")
            .field("dispatch", &(self.dispatch as *const D).cast::<()>())
            .finish()
    }
}

impl<T, D> Deleter<T> for ObjectDestroy<'_, D>
where
    T: Destroy<D>,
    D: Dispatch + ?Sized,
{
    fn destroy(&mut self, handle: T) {
        handle.destroy(self.dispatch)
    }
}

/// A [`Unique`] handle destroyed through the dispatch object
/// `D`.
pub type UniqueHandle<'d, T, D> = Unique<T, ObjectDestroy<'d, D>>;

/// Unique ownership of a native handle, much like
/// [`Box`][alloc::boxed::Box] for heap allocations.
///
/// When dropped, a non-null handle is passed to the deleter
/// exactly once. Moving a `Unique` moves ownership with it;
/// [`core::mem::take`] (or [`release`][Self::release]) leaves a
/// null handle behind that is never passed to the deleter.
///
/// `Unique` does not track parent/child relationships between
/// handles. If destroying a parent implicitly destroys its
/// children, order the declarations so that children are
/// dropped first.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
///
/// use handlegen_core::{Handle, Unique};
///
/// #[derive(Copy, Clone, Debug, PartialEq)]
/// struct Raw(u64);
///
/// impl Handle for Raw {
///     const NULL: Self = Raw(0);
/// }
///
/// let destroyed = Cell::new(0);
/// {
///     let first = Unique::new(Raw(7), |_: Raw| destroyed.set(destroyed.get() + 1));
///     let second = first;
///     assert_eq!(*second, Raw(7));
/// }
/// assert_eq!(destroyed.get(), 1);
/// ```
pub struct Unique<T: Handle, D: Deleter<T>> {
    value: T,
    deleter: D,
}

impl<T: Handle, D: Deleter<T>> Unique<T, D> {
    /// Takes ownership of `value`.
    pub const fn new(value: T, deleter: D) -> Self {
        Self { value, deleter }
    }

    /// Creates a `Unique` that does not own anything.
    pub const fn null(deleter: D) -> Self {
        Self::new(T::NULL, deleter)
    }

    /// Returns the handle.
    ///
    /// Ownership is retained.
    pub fn get(&self) -> T {
        self.value
    }

    /// Reports whether the handle is null.
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Returns the deleter.
    pub fn deleter(&self) -> &D {
        &self.deleter
    }

    /// Returns the deleter.
    pub fn deleter_mut(&mut self) -> &mut D {
        &mut self.deleter
    }

    /// Destroys the current handle (if any) and takes ownership
    /// of `value`.
    ///
    /// Does nothing if `value` is the current handle.
    pub fn reset(&mut self, value: T) {
        if self.value != value {
            let old = mem::replace(&mut self.value, value);
            self.destroy(old);
        }
    }

    /// Destroys the current handle (if any) and returns the null
    /// slot, for use as the out parameter of a native creation
    /// call.
    ///
    /// Whatever is written to the slot is owned by `self`.
    pub fn put(&mut self) -> &mut T {
        self.reset(T::NULL);
        &mut self.value
    }

    /// Relinquishes ownership of the handle without destroying
    /// it.
    #[must_use = "the handle is no longer owned"]
    pub fn release(&mut self) -> T {
        mem::replace(&mut self.value, T::NULL)
    }

    /// Relinquishes ownership of the handle and returns it with
    /// the deleter.
    #[must_use = "the handle is no longer owned"]
    pub fn into_parts(mut self) -> (T, D)
    where
        D: Default,
    {
        let value = self.release();
        let deleter = mem::take(&mut self.deleter);
        (value, deleter)
    }

    /// Swaps the handles and deleters of `self` and `other`.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.value, &mut other.value);
        mem::swap(&mut self.deleter, &mut other.deleter);
    }

    fn destroy(&mut self, value: T) {
        if !value.is_null() {
            trace!(handle = ?value, "destroying handle");
            self.deleter.destroy(value);
        }
    }
}

impl<T: Handle, D: Deleter<T>> Drop for Unique<T, D> {
    fn drop(&mut self) {
        let value = self.release();
        self.destroy(value);
    }
}

impl<T: Handle, D: Deleter<T> + Default> Default for Unique<T, D> {
    fn default() -> Self {
        Self::null(D::default())
    }
}

impl<T: Handle, D: Deleter<T>> Deref for Unique<T, D> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: Handle, D: Deleter<T>> fmt::Debug for Unique<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Unique").field(&self.value).finish()
    }
}

impl<T, D1, D2> PartialEq<Unique<T, D2>> for Unique<T, D1>
where
    T: Handle,
    D1: Deleter<T>,
    D2: Deleter<T>,
{
    fn eq(&self, other: &Unique<T, D2>) -> bool {
        self.value == other.value
    }
}

impl<T: Handle + Eq, D: Deleter<T>> Eq for Unique<T, D> {}

impl<T: Handle, D: Deleter<T>> PartialEq<T> for Unique<T, D> {
    fn eq(&self, other: &T) -> bool {
        self.value == *other
    }
}

#[cfg(test)]
mod tests {
    use alloc::{rc::Rc, vec::Vec};
    use core::cell::RefCell;

    use test_log::test;

    use super::*;

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    struct Raw(u64);

    impl Handle for Raw {
        const NULL: Self = Raw(0);
    }

    /// Records every destroyed handle.
    #[derive(Clone, Default)]
    struct Log(Rc<RefCell<Vec<Raw>>>);

    impl Log {
        fn destroyed(&self) -> Vec<Raw> {
            self.0.borrow().clone()
        }
    }

    impl Deleter<Raw> for Log {
        fn destroy(&mut self, handle: Raw) {
            assert!(!handle.is_null(), "deleter called with a null handle");
            self.0.borrow_mut().push(handle);
        }
    }

    #[test]
    fn test_drop_destroys_once() {
        let log = Log::default();
        drop(Unique::new(Raw(1), log.clone()));
        assert_eq!(log.destroyed(), [Raw(1)]);
    }

    #[test]
    fn test_drop_null_does_not_destroy() {
        let log = Log::default();
        drop(Unique::null(log.clone()));
        assert_eq!(log.destroyed(), []);
    }

    #[test]
    fn test_move_destroys_once() {
        let log = Log::default();
        let first = Unique::new(Raw(1), log.clone());
        let second = first;
        assert_eq!(log.destroyed(), []);
        drop(second);
        assert_eq!(log.destroyed(), [Raw(1)]);
    }

    #[test]
    fn test_take_leaves_null() {
        let log = Log::default();
        let mut first = Unique::new(Raw(1), log.clone());
        let second = mem::take(&mut first);
        assert!(first.is_null());
        drop(first);
        assert_eq!(log.destroyed(), []);
        drop(second);
        assert_eq!(log.destroyed(), [Raw(1)]);
    }

    #[test]
    fn test_move_assign_destroys_target_first() {
        let log = Log::default();
        let mut target = Unique::new(Raw(1), log.clone());
        let source = Unique::new(Raw(2), log.clone());
        assert_eq!(target, Raw(1));
        target = source;
        assert_eq!(log.destroyed(), [Raw(1)]);
        assert_eq!(target, Raw(2));
        drop(target);
        assert_eq!(log.destroyed(), [Raw(1), Raw(2)]);
    }

    #[test]
    fn test_release() {
        let log = Log::default();
        let mut h = Unique::new(Raw(1), log.clone());
        assert_eq!(h.release(), Raw(1));
        assert!(h.is_null());
        drop(h);
        assert_eq!(log.destroyed(), []);
    }

    #[test]
    fn test_into_parts() {
        let log = Log::default();
        let (raw, _) = Unique::new(Raw(3), log.clone()).into_parts();
        assert_eq!(raw, Raw(3));
        assert_eq!(log.destroyed(), []);
    }

    #[test]
    fn test_reset() {
        let log = Log::default();
        let mut h = Unique::new(Raw(1), log.clone());

        h.reset(Raw(2));
        assert_eq!(log.destroyed(), [Raw(1)]);

        // Resetting to the current value is a no-op.
        h.reset(Raw(2));
        h.reset(Raw(2));
        assert_eq!(log.destroyed(), [Raw(1)]);

        h.reset(Raw::NULL);
        assert_eq!(log.destroyed(), [Raw(1), Raw(2)]);
        assert!(h.is_null());

        drop(h);
        assert_eq!(log.destroyed(), [Raw(1), Raw(2)]);
    }

    #[test]
    fn test_put() {
        let log = Log::default();
        let mut h = Unique::new(Raw(1), log.clone());

        let slot = h.put();
        assert_eq!(*slot, Raw::NULL);
        *slot = Raw(9);
        assert_eq!(log.destroyed(), [Raw(1)]);
        assert_eq!(h.get(), Raw(9));

        drop(h);
        assert_eq!(log.destroyed(), [Raw(1), Raw(9)]);
    }

    #[test]
    fn test_swap() {
        let a_log = Log::default();
        let b_log = Log::default();
        let mut a = Unique::new(Raw(1), a_log.clone());
        let mut b = Unique::new(Raw(2), b_log.clone());

        a.swap(&mut b);
        assert_eq!(a, Raw(2));
        assert_eq!(b, Raw(1));

        // The deleters move with the handles.
        drop(a);
        assert_eq!(a_log.destroyed(), []);
        assert_eq!(b_log.destroyed(), [Raw(2)]);
        drop(b);
        assert_eq!(a_log.destroyed(), [Raw(1)]);
    }

    #[test]
    fn test_equality() {
        let a = Unique::new(Raw(1), |_: Raw| {});
        let b = Unique::new(Raw(1), Log::default());
        let mut c = Unique::new(Raw(2), Log::default());
        assert!(a == b);
        assert!(b != c);
        assert!(a == Raw(1));
        assert!(a != Raw::NULL);

        let _ = c.release();
        assert!(c == Raw::NULL);
        assert!(c.is_null());
    }

    #[test]
    fn test_closure_deleter() {
        let mut destroyed = Vec::<Raw>::new();
        {
            let _h = Unique::new(Raw(5), |raw: Raw| destroyed.push(raw));
        }
        assert_eq!(destroyed, [Raw(5)]);
    }

    struct Loader {
        log: RefCell<Vec<Raw>>,
    }
    crate::impl_dispatch!(Loader);

    impl Destroy<Loader> for Raw {
        fn destroy(self, dispatch: &Loader) {
            dispatch.log.borrow_mut().push(self);
        }
    }

    #[test]
    fn test_object_destroy_uses_dispatch() {
        let loader = Loader {
            log: RefCell::new(Vec::new()),
        };
        {
            let h: UniqueHandle<'_, Raw, Loader> = Unique::new(Raw(4), ObjectDestroy::new(&loader));
            assert!(core::ptr::eq(h.deleter().dispatch(), &loader));
        }
        assert_eq!(*loader.log.borrow(), [Raw(4)]);
    }
}
