use alloc::vec::Vec;

/// A growable output buffer for two-call wrappers.
///
/// Two-call wrappers resize the buffer to the count reported by
/// the native API, pass [`as_mut_ptr`][Buffer::as_mut_ptr] to the
/// native call, then truncate the buffer to the count that was
/// actually written.
///
/// Passing a buffer to a generated `*_with` wrapper lets the
/// caller decide how the elements are allocated. For example,
/// `&mut Vec<T>` reuses an existing allocation:
///
/// ```rust
/// use handlegen_core::Buffer;
///
/// fn fill<B: Buffer<u32>>(mut buf: B) -> B {
///     buf.resize(3);
///     // SAFETY: `buf` has room for three elements.
///     unsafe { buf.as_mut_ptr().write(42) };
///     buf.truncate(1);
///     buf
/// }
///
/// let mut scratch = Vec::with_capacity(16);
/// fill(&mut scratch);
/// assert_eq!(scratch, [42]);
/// ```
pub trait Buffer<T> {
    /// Returns the number of elements in the buffer.
    fn len(&self) -> usize;

    /// Reports whether the buffer is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resizes the buffer to exactly `len` elements.
    ///
    /// New elements are default initialized.
    fn resize(&mut self, len: usize);

    /// Shortens the buffer to `len` elements.
    ///
    /// Has no effect if `len` is greater than the buffer's
    /// current length.
    fn truncate(&mut self, len: usize);

    /// Removes every element.
    fn clear(&mut self);

    /// Returns a pointer to the first element.
    fn as_mut_ptr(&mut self) -> *mut T;

    /// Returns the buffer's elements.
    fn as_slice(&self) -> &[T];
}

impl<T: Default> Buffer<T> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn resize(&mut self, len: usize) {
        self.resize_with(len, T::default);
    }

    fn truncate(&mut self, len: usize) {
        Vec::truncate(self, len);
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        Vec::as_mut_ptr(self)
    }

    fn as_slice(&self) -> &[T] {
        Vec::as_slice(self)
    }
}

impl<T, B> Buffer<T> for &mut B
where
    B: Buffer<T> + ?Sized,
{
    fn len(&self) -> usize {
        (**self).len()
    }

    fn resize(&mut self, len: usize) {
        (**self).resize(len)
    }

    fn truncate(&mut self, len: usize) {
        (**self).truncate(len)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        (**self).as_mut_ptr()
    }

    fn as_slice(&self) -> &[T] {
        (**self).as_slice()
    }
}
