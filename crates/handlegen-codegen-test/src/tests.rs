use std::ffi::c_char;

use handlegen_core::{ResultCode as _, ResultError};
use test_log::test;

use crate::{
    always_fail, assert_only, conditional,
    defs::{DEFAULT_TIMEOUT, MockRuntime, SessionRaw, XrResult},
};

const ENUMERATE_FORMATS: &str = "mock::Instance::enumerate_formats";

fn formats(n: usize) -> Vec<i64> {
    (0..n).map(|i| i64::try_from(i).unwrap() * 10).collect()
}

#[test]
fn test_zero_count_skips_fill() {
    let rt = MockRuntime::with_sizes([0]);
    let inst = always_fail::Instance { raw: 1 };
    let got = inst.enumerate_formats(&rt).unwrap();
    assert!(got.is_empty());
    assert_eq!(rt.calls(), 1);
    assert_eq!(rt.capacities(), [0]);
}

#[test]
fn test_fill_at_probed_size() {
    let rt = MockRuntime::with_sizes([3]);
    let inst = always_fail::Instance { raw: 1 };
    let got = inst.enumerate_formats(&rt).unwrap();
    assert_eq!(got, formats(3));
    assert_eq!(rt.capacities(), [0, 3]);
}

#[test]
fn test_growth_between_calls() {
    let rt = MockRuntime::with_sizes([5, 8]);
    let inst = always_fail::Instance { raw: 1 };
    let got = inst.enumerate_formats(&rt).unwrap();
    assert_eq!(got, formats(8));
    assert_eq!(rt.capacities(), [0, 5, 8]);
}

#[test]
fn test_shrink_between_calls() {
    let rt = MockRuntime::with_sizes([5, 3]);
    let inst = always_fail::Instance { raw: 1 };
    let got = inst.enumerate_formats(&rt).unwrap();
    assert_eq!(got, formats(3));
    assert_eq!(rt.capacities(), [0, 5]);
}

#[test]
fn test_repeated_growth() {
    let rt = MockRuntime::with_sizes([1, 2, 3, 4, 4]);
    let inst = always_fail::Instance { raw: 1 };
    let got = inst.enumerate_formats(&rt).unwrap();
    assert_eq!(got, formats(4));
    assert_eq!(rt.capacities(), [0, 1, 2, 3, 4]);
}

#[test]
fn test_reuse_buffer() {
    let rt = MockRuntime::with_sizes([2]);
    let inst = always_fail::Instance { raw: 1 };
    let mut buf: Vec<i64> = vec![99; 16];
    let got = inst.enumerate_formats_with(&mut buf, &rt).unwrap();
    assert_eq!(*got, formats(2));
    assert_eq!(buf, formats(2));

    let buf = inst
        .enumerate_formats_with(Vec::<i64>::with_capacity(4), &rt)
        .unwrap();
    assert_eq!(buf, formats(2));
}

#[test]
fn test_failed_fill_empties_buffer() {
    let rt = MockRuntime::with_sizes([2]).fail_at(1, XrResult::ERROR_RUNTIME_FAILURE);
    let inst = always_fail::Instance { raw: 1 };
    let mut buf: Vec<i64> = vec![99; 3];
    let err = inst.enumerate_formats_with(&mut buf, &rt).unwrap_err();
    assert_eq!(
        err,
        ResultError::new(XrResult::ERROR_RUNTIME_FAILURE, ENUMERATE_FORMATS)
    );
    assert!(buf.is_empty());
    assert_eq!(rt.calls(), 2);
}

#[test]
fn test_failed_probe_empties_buffer() {
    let rt = MockRuntime::with_sizes([2]).fail_at(0, XrResult::ERROR_RUNTIME_FAILURE);
    let inst = always_fail::Instance { raw: 1 };
    let mut buf: Vec<i64> = vec![99; 3];
    let err = inst.enumerate_formats_with(&mut buf, &rt).unwrap_err();
    assert_eq!(err.result(), XrResult::ERROR_RUNTIME_FAILURE);
    assert!(buf.is_empty());
    assert_eq!(rt.calls(), 1);
}

#[test]
fn test_always_fail_error() {
    let rt = MockRuntime::with_sizes([2]);
    let inst = always_fail::Instance { raw: 0 };
    let err = inst.enumerate_formats(&rt).unwrap_err();
    assert_eq!(err.result(), XrResult::ERROR_HANDLE_INVALID);
    assert_eq!(err.operation(), ENUMERATE_FORMATS);
    assert_eq!(
        err.to_string(),
        "mock::Instance::enumerate_formats: XrResult(-12)"
    );
}

#[test]
fn test_assert_only_success() {
    let rt = MockRuntime::with_sizes([5, 8]);
    let inst = assert_only::Instance { raw: 1 };
    let got: Vec<i64> = inst.enumerate_formats(&rt);
    assert_eq!(got, formats(8));
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "mock::Instance::enumerate_formats")]
fn test_assert_only_failure_asserts() {
    let rt = MockRuntime::with_sizes([2]).fail_at(1, XrResult::ERROR_RUNTIME_FAILURE);
    let inst = assert_only::Instance { raw: 1 };
    let _ = inst.enumerate_formats(&rt);
}

#[cfg(not(debug_assertions))]
#[test]
fn test_assert_only_failure_is_empty() {
    let rt = MockRuntime::with_sizes([2]).fail_at(1, XrResult::ERROR_RUNTIME_FAILURE);
    let inst = assert_only::Instance { raw: 1 };
    assert!(inst.enumerate_formats(&rt).is_empty());
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "mock::Instance::enumerate_formats")]
fn test_assert_only_failed_query_asserts() {
    let rt = MockRuntime::with_sizes([2]).fail_at(0, XrResult::ERROR_RUNTIME_FAILURE);
    let inst = assert_only::Instance { raw: 1 };
    let _ = inst.enumerate_formats(&rt);
}

#[cfg(not(debug_assertions))]
#[test]
fn test_assert_only_failed_query_is_empty() {
    let rt = MockRuntime::with_sizes([2]).fail_at(0, XrResult::ERROR_RUNTIME_FAILURE);
    let inst = assert_only::Instance { raw: 1 };
    assert!(inst.enumerate_formats(&rt).is_empty());
    assert_eq!(rt.calls(), 1);
}

#[test]
fn test_size_insufficient_query_is_terminal() {
    let rt = MockRuntime::with_sizes([2]).fail_at(0, XrResult::ERROR_SIZE_INSUFFICIENT);
    let inst = always_fail::Instance { raw: 1 };
    let err = inst.enumerate_formats(&rt).unwrap_err();
    assert_eq!(err.result(), XrResult::ERROR_SIZE_INSUFFICIENT);
    assert_eq!(rt.calls(), 1);
}

#[test]
fn test_conditional_success() {
    let rt = MockRuntime::with_sizes([4]);
    let inst = conditional::Instance { raw: 1 };
    assert_eq!(inst.enumerate_formats(&rt).unwrap(), formats(4));
}

#[cfg(not(feature = "assert-only"))]
#[test]
fn test_conditional_failure_fails() {
    let rt = MockRuntime::with_sizes([4]).fail_at(1, XrResult::ERROR_RUNTIME_FAILURE);
    let inst = conditional::Instance { raw: 1 };
    let err = inst.enumerate_formats(&rt).unwrap_err();
    assert_eq!(
        err,
        ResultError::new(XrResult::ERROR_RUNTIME_FAILURE, ENUMERATE_FORMATS)
    );
}

#[cfg(all(feature = "assert-only", debug_assertions))]
#[test]
#[should_panic(expected = "mock::Instance::enumerate_formats")]
fn test_conditional_failure_asserts() {
    let rt = MockRuntime::with_sizes([4]).fail_at(1, XrResult::ERROR_RUNTIME_FAILURE);
    let inst = conditional::Instance { raw: 1 };
    let _ = inst.enumerate_formats(&rt);
}

#[test]
fn test_text() {
    let rt = MockRuntime::with_name("mock runtime");
    assert_eq!(always_fail::get_name(&rt).unwrap(), "mock runtime");
    assert_eq!(rt.capacities(), [0, 13]);

    let rt = MockRuntime::with_name("mock runtime");
    assert_eq!(assert_only::get_name(&rt), "mock runtime");
}

#[test]
fn test_text_with_buffer() {
    let rt = MockRuntime::with_name("xr");
    let mut buf: Vec<c_char> = Vec::new();
    let name = always_fail::get_name_with(&mut buf, &rt).unwrap();
    assert_eq!(name, "xr");
    // The terminator is kept in the raw buffer.
    assert_eq!(buf.len(), 3);
}

#[test]
fn test_text_failure() {
    let rt = MockRuntime::with_name("xr").fail_at(0, XrResult::ERROR_RUNTIME_FAILURE);
    let err = always_fail::get_name(&rt).unwrap_err();
    assert_eq!(err.operation(), "mock::get_name");
}

#[test]
fn test_optional_default() {
    let rt = MockRuntime::default();
    assert_eq!(always_fail::poll(None, &rt).unwrap(), DEFAULT_TIMEOUT + 1);
    assert_eq!(always_fail::poll(Some(5), &rt).unwrap(), 6);
    assert_eq!(assert_only::poll(None, &rt), DEFAULT_TIMEOUT + 1);
    assert_eq!(rt.timeouts(), [DEFAULT_TIMEOUT, 5, DEFAULT_TIMEOUT]);
}

#[test]
fn test_qualified_success_is_not_failure() {
    let rt = MockRuntime::default();
    // A zero timeout expires, which is not an error.
    assert_eq!(always_fail::poll(Some(0), &rt).unwrap(), 0);
    assert_eq!(conditional::poll(Some(0), &rt).unwrap(), 0);
}

#[test]
fn test_unique_destroyed_on_drop() {
    let rt = MockRuntime::default();
    let inst = always_fail::Instance { raw: 1 };
    {
        let session = inst.create_session(&rt).unwrap();
        assert_eq!(session.get(), SessionRaw(1));
        assert!(rt.destroyed().is_empty());
    }
    assert_eq!(rt.destroyed(), [SessionRaw(1)]);
}

#[test]
fn test_unique_destroyed_once_after_move() {
    let rt = MockRuntime::default();
    let inst = assert_only::Instance { raw: 1 };
    let first = inst.create_session(&rt);
    let second = inst.create_session(&rt);
    let moved = first;
    let sessions = vec![moved, second];
    assert!(rt.destroyed().is_empty());
    drop(sessions);
    assert_eq!(rt.destroyed(), [SessionRaw(1), SessionRaw(2)]);
}

#[test]
fn test_unique_release() {
    let rt = MockRuntime::default();
    let inst = always_fail::Instance { raw: 1 };
    let mut session = inst.create_session(&rt).unwrap();
    let raw = session.release();
    assert!(session.is_null());
    drop(session);
    assert_eq!(raw, SessionRaw(1));
    assert!(rt.destroyed().is_empty());
}

#[test]
fn test_unique_failure_owns_nothing() {
    let rt = MockRuntime::default();
    let inst = always_fail::Instance { raw: 0 };
    let err = inst.create_session(&rt).unwrap_err();
    assert_eq!(err.result(), XrResult::ERROR_HANDLE_INVALID);
    assert_eq!(err.operation(), "mock::Instance::create_session");
    assert!(rt.destroyed().is_empty());
}
