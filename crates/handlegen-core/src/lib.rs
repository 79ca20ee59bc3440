//! A `no-std` runtime library for wrappers generated by
//! `handlegen-codegen`.
//!
//! Generated wrappers lean on this crate for three things:
//!
//! - [`ResultCode`] and [`ResultError`] for turning native
//!   result codes into assertions or errors.
//! - [`Buffer`] for the growable output buffers used by two-call
//!   wrappers.
//! - [`Unique`] for owning native handles and destroying them
//!   exactly once.

#![cfg_attr(not(any(test, doctest, feature = "std")), no_std)]

extern crate alloc;

mod buffer;
mod dispatch;
#[doc(hidden)]
pub mod internal;
mod macros;
mod result;
pub mod text;
mod unique;

pub use buffer::Buffer;
pub use dispatch::Dispatch;
#[cfg(feature = "derive")]
pub use handlegen_macro::Dispatch;
pub use result::{FailureMode, ResultCode, ResultError};
pub use unique::{Deleter, Destroy, Handle, ObjectDestroy, Unique, UniqueHandle};

/// Common items.
pub mod prelude {
    pub use super::{Buffer, Dispatch, Handle, ResultCode, ResultError, Unique, UniqueHandle};
}
