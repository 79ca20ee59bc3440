use core::fmt;

/// A result code returned by a native API.
///
/// Native APIs that follow the two-call idiom report failures
/// through negative codes, qualified successes (timeouts,
/// "session not focused", etc.) through positive codes, and
/// exactly one unqualified success. They also need a
/// distinguished "buffer too small" failure so that two-call
/// wrappers know when to retry.
///
/// # Example
///
/// ```rust
/// use core::fmt;
///
/// use handlegen_core::ResultCode;
///
/// #[derive(Copy, Clone, Debug, Eq, PartialEq)]
/// #[repr(transparent)]
/// struct XrResult(i32);
///
/// impl XrResult {
///     const TIMEOUT_EXPIRED: Self = Self(1);
///     const ERROR_RUNTIME_FAILURE: Self = Self(-2);
/// }
///
/// impl fmt::Display for XrResult {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "XrResult({})", self.0)
///     }
/// }
///
/// impl ResultCode for XrResult {
///     const SUCCESS: Self = Self(0);
///     const ERROR_SIZE_INSUFFICIENT: Self = Self(-11);
///
///     fn succeeded(self) -> bool {
///         self.0 >= 0
///     }
/// }
///
/// assert!(XrResult::TIMEOUT_EXPIRED.succeeded());
/// assert!(!XrResult::TIMEOUT_EXPIRED.unqualified_success());
/// assert!(XrResult::ERROR_RUNTIME_FAILURE.failed());
/// assert!(XrResult::ERROR_SIZE_INSUFFICIENT.is_size_insufficient());
/// ```
pub trait ResultCode: Copy + Eq + fmt::Debug + fmt::Display {
    /// The unqualified success code.
    const SUCCESS: Self;

    /// The code returned when the caller's buffer is too small.
    const ERROR_SIZE_INSUFFICIENT: Self;

    /// Reports whether the code indicates success, qualified or
    /// not.
    fn succeeded(self) -> bool;

    /// Reports whether the code indicates failure.
    fn failed(self) -> bool {
        !self.succeeded()
    }

    /// Reports whether the code is exactly [`SUCCESS`][Self::SUCCESS].
    fn unqualified_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Reports whether the code is exactly
    /// [`ERROR_SIZE_INSUFFICIENT`][Self::ERROR_SIZE_INSUFFICIENT].
    fn is_size_insufficient(self) -> bool {
        self == Self::ERROR_SIZE_INSUFFICIENT
    }
}

/// A failed native call.
///
/// Carries the raw result code and the fully qualified name of
/// the wrapper that observed it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{operation}: {result}")]
pub struct ResultError<R> {
    result: R,
    operation: &'static str,
}

impl<R> ResultError<R> {
    /// Creates a `ResultError`.
    pub const fn new(result: R, operation: &'static str) -> Self {
        Self { result, operation }
    }

    /// Returns the fully qualified name of the failed operation.
    pub const fn operation(&self) -> &'static str {
        self.operation
    }
}

impl<R: Copy> ResultError<R> {
    /// Returns the raw result code.
    pub const fn result(&self) -> R {
        self.result
    }
}

/// How wrappers generated with the `conditional` error policy
/// handle failures.
///
/// The active mode is fixed when this crate is built: enabling
/// the `assert-only` feature selects [`FailureMode::Assert`].
/// Generated code matches on [`FailureMode::ACTIVE`], so only one
/// arm is ever taken and the other is removed by the optimizer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FailureMode {
    /// Failures are `debug_assert!`ions.
    Assert,
    /// Failures are returned as [`ResultError`]s.
    Fail,
}

cfg_if::cfg_if! {
    if #[cfg(feature = "assert-only")] {
        impl FailureMode {
            /// The mode selected for this build.
            pub const ACTIVE: Self = Self::Assert;
        }
    } else {
        impl FailureMode {
            /// The mode selected for this build.
            pub const ACTIVE: Self = Self::Fail;
        }
    }
}
