//! A scripted mock of a two-call native API.

use std::{cell::RefCell, collections::VecDeque, ffi::c_char, fmt};

use handlegen_core::{Destroy, Dispatch, Handle, ResultCode};

/// The timeout `poll` uses when none is given.
pub const DEFAULT_TIMEOUT: u64 = 100;

/// A native result code.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub struct XrResult(pub i32);

impl XrResult {
    pub const TIMEOUT_EXPIRED: Self = Self(1);
    pub const ERROR_RUNTIME_FAILURE: Self = Self(-2);
    pub const ERROR_HANDLE_INVALID: Self = Self(-12);
}

impl fmt::Display for XrResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XrResult({})", self.0)
    }
}

impl ResultCode for XrResult {
    const SUCCESS: Self = Self(0);
    const ERROR_SIZE_INSUFFICIENT: Self = Self(-11);

    fn succeeded(self) -> bool {
        self.0 >= 0
    }
}

/// A native session handle.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionRaw(pub u64);

impl Handle for SessionRaw {
    const NULL: Self = Self(0);
}

impl Destroy<MockRuntime> for SessionRaw {
    fn destroy(self, rt: &MockRuntime) {
        rt.destroy_session(self);
    }
}

/// A failure injected into a specific call.
#[derive(Copy, Clone, Debug)]
struct Failure {
    /// The zero-based call index.
    call: usize,
    code: XrResult,
}

#[derive(Debug, Default)]
struct State {
    /// How many elements exist, per call. The last entry
    /// sticks.
    sizes: VecDeque<usize>,
    failure: Option<Failure>,
    calls: usize,
    capacities: Vec<u32>,
    name: String,
    next_session: u64,
    destroyed: Vec<SessionRaw>,
    timeouts: Vec<u64>,
}

impl State {
    /// Starts a call, returning the injected failure (if any)
    /// and the number of available elements.
    fn begin(&mut self, capacity: u32) -> (Option<XrResult>, usize) {
        let call = self.calls;
        self.calls = self.calls.saturating_add(1);
        self.capacities.push(capacity);
        let available = if self.sizes.len() > 1 {
            self.sizes.pop_front().unwrap_or_default()
        } else {
            self.sizes.front().copied().unwrap_or_default()
        };
        let failure = self
            .failure
            .filter(|f| f.call == call)
            .map(|f| f.code);
        (failure, available)
    }
}

/// A mock runtime whose enumeration results change from call
/// to call.
#[derive(Debug, Default, Dispatch)]
pub struct MockRuntime {
    state: RefCell<State>,
}

impl MockRuntime {
    /// Creates a runtime that reports `sizes[i]` elements on the
    /// `i`th enumeration call.
    pub fn with_sizes(sizes: impl IntoIterator<Item = usize>) -> Self {
        let rt = Self::default();
        rt.state.borrow_mut().sizes = sizes.into_iter().collect();
        rt
    }

    /// Creates a runtime whose name is `name`.
    pub fn with_name(name: &str) -> Self {
        let rt = Self::default();
        rt.state.borrow_mut().name = name.to_owned();
        rt
    }

    /// Makes call number `call` (zero-based) fail with `code`.
    pub fn fail_at(self, call: usize, code: XrResult) -> Self {
        self.state.borrow_mut().failure = Some(Failure { call, code });
        self
    }

    /// Returns the number of native calls made.
    pub fn calls(&self) -> usize {
        self.state.borrow().calls
    }

    /// Returns the capacity passed to each enumeration call.
    pub fn capacities(&self) -> Vec<u32> {
        self.state.borrow().capacities.clone()
    }

    /// Returns every destroyed session, in order.
    pub fn destroyed(&self) -> Vec<SessionRaw> {
        self.state.borrow().destroyed.clone()
    }

    /// Returns the timeout passed to each `poll` call.
    pub fn timeouts(&self) -> Vec<u64> {
        self.state.borrow().timeouts.clone()
    }

    /// Writes up to `capacity` formats to `out`.
    ///
    /// # Safety
    ///
    /// `out` must be valid for `capacity` writes.
    pub unsafe fn enumerate_formats(
        &self,
        instance: u64,
        capacity: u32,
        count: &mut u32,
        out: *mut i64,
    ) -> XrResult {
        let mut state = self.state.borrow_mut();
        let (failure, available) = state.begin(capacity);
        if let Some(code) = failure {
            return code;
        }
        if instance == 0 {
            return XrResult::ERROR_HANDLE_INVALID;
        }
        *count = u32::try_from(available).unwrap_or(u32::MAX);
        if capacity == 0 {
            return XrResult::SUCCESS;
        }
        if (capacity as usize) < available {
            return XrResult::ERROR_SIZE_INSUFFICIENT;
        }
        for i in 0..available {
            let v = i64::try_from(i).unwrap_or(i64::MAX).saturating_mul(10);
            // SAFETY: `i < available <= capacity`, and the
            // caller guarantees `out` is valid for `capacity`
            // writes.
            unsafe { out.add(i).write(v) }
        }
        XrResult::SUCCESS
    }

    /// Writes the NUL terminated name to `out`.
    ///
    /// # Safety
    ///
    /// `out` must be valid for `capacity` writes.
    pub unsafe fn get_name(&self, capacity: u32, len: &mut u32, out: *mut c_char) -> XrResult {
        let mut state = self.state.borrow_mut();
        let (failure, _) = state.begin(capacity);
        if let Some(code) = failure {
            return code;
        }
        let bytes = state.name.as_bytes();
        let required = bytes.len().saturating_add(1);
        *len = u32::try_from(required).unwrap_or(u32::MAX);
        if capacity == 0 {
            return XrResult::SUCCESS;
        }
        if (capacity as usize) < required {
            return XrResult::ERROR_SIZE_INSUFFICIENT;
        }
        for (i, &b) in bytes.iter().chain(&[0]).enumerate() {
            #[allow(clippy::cast_possible_wrap)]
            let c = b as c_char;
            // SAFETY: `i < required <= capacity`, and the caller
            // guarantees `out` is valid for `capacity` writes.
            unsafe { out.add(i).write(c) }
        }
        XrResult::SUCCESS
    }

    /// Creates a session.
    pub fn create_session(&self, instance: u64, session: &mut SessionRaw) -> XrResult {
        let mut state = self.state.borrow_mut();
        let (failure, _) = state.begin(0);
        if let Some(code) = failure {
            return code;
        }
        if instance == 0 {
            return XrResult::ERROR_HANDLE_INVALID;
        }
        state.next_session = state.next_session.saturating_add(1);
        *session = SessionRaw(state.next_session);
        XrResult::SUCCESS
    }

    fn destroy_session(&self, session: SessionRaw) {
        self.state.borrow_mut().destroyed.push(session);
    }

    /// Waits for an event.
    ///
    /// A zero timeout expires immediately.
    pub fn poll(&self, timeout: u64, event: &mut u64) -> XrResult {
        let mut state = self.state.borrow_mut();
        let (failure, _) = state.begin(0);
        if let Some(code) = failure {
            return code;
        }
        state.timeouts.push(timeout);
        if timeout == 0 {
            return XrResult::TIMEOUT_EXPIRED;
        }
        *event = timeout.saturating_add(1);
        XrResult::SUCCESS
    }
}
