//! FFI bindings for BetterRest
//!
//! This module provides C-compatible functions for calling the estimator from
//! the mobile host. All functions use C strings (null-terminated) and return
//! allocated memory that must be freed by the caller using `rest_free_string`.
//!
//! Estimate functions return a report JSON document in both the success and
//! the prediction-failure case; the host reads `outcome.status` to decide what
//! to show. NULL is reserved for invalid arguments.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::config::EstimatorConfig;
use crate::estimator::BedtimeEstimator;
use crate::formatter::format_duration;
use crate::model::LinearSleepModel;
use crate::predictor::{SleepPredictor, UnavailablePredictor};
use crate::report::{EstimateRequest, ReportEncoder};
use crate::types::WakeTime;

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn wake_time(hour: i32, minute: i32) -> Option<WakeTime> {
    let hour = u32::try_from(hour).ok()?;
    let minute = u32::try_from(minute).ok()?;
    WakeTime::new(hour, minute)
}

/// Run one estimate and encode the report as a C string
fn estimate_to_cstr<P: SleepPredictor>(
    estimator: &BedtimeEstimator<P>,
    encoder: &ReportEncoder,
    wake: WakeTime,
    sleep_hours: f64,
    coffee_cups: i32,
) -> *mut c_char {
    let request = EstimateRequest {
        wake_time: wake,
        sleep_hours,
        coffee_cups: i64::from(coffee_cups),
    };
    let result = estimator.estimate_detailed(wake, sleep_hours, request.coffee_cups);

    match encoder.encode_to_json(request, &result) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Estimate a bedtime with the model artifact in `model_json`.
///
/// An artifact that cannot be parsed yields an error report, the same as any
/// other prediction failure.
///
/// # Safety
/// - `model_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `rest_free_string`.
/// - Returns NULL on invalid arguments; call `rest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn rest_estimate_bedtime(
    model_json: *const c_char,
    wake_hour: i32,
    wake_minute: i32,
    sleep_hours: f64,
    coffee_cups: i32,
) -> *mut c_char {
    clear_last_error();

    let model_str = match cstr_to_string(model_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model JSON string pointer");
            return ptr::null_mut();
        }
    };

    let wake = match wake_time(wake_hour, wake_minute) {
        Some(w) => w,
        None => {
            set_last_error(&format!("Invalid wake time {wake_hour}:{wake_minute}"));
            return ptr::null_mut();
        }
    };

    let predictor: Box<dyn SleepPredictor> = match LinearSleepModel::from_json(&model_str) {
        Ok(model) => Box::new(model),
        Err(e) => Box::new(UnavailablePredictor::new(e.to_string())),
    };

    let estimator = BedtimeEstimator::new(predictor);
    estimate_to_cstr(&estimator, &ReportEncoder::default(), wake, sleep_hours, coffee_cups)
}

/// Format fractional hours as a duration label, e.g. `7 hours 30 minutes`.
///
/// # Safety
/// - Returns a newly allocated string that must be freed with `rest_free_string`.
#[no_mangle]
pub unsafe extern "C" fn rest_format_duration(hours: f64) -> *mut c_char {
    clear_last_error();
    string_to_cstr(&format_duration(hours))
}

// ============================================================================
// Stateful Estimator API
// ============================================================================

/// Opaque handle to a configured estimator
pub struct RestEstimatorHandle {
    estimator: BedtimeEstimator<LinearSleepModel>,
    encoder: ReportEncoder,
}

/// Create an estimator from a model artifact and an optional config.
///
/// # Safety
/// - `model_json` must be a valid null-terminated C string.
/// - `config_json` must be a valid null-terminated C string, or NULL for defaults.
/// - Returns a pointer that must be freed with `rest_estimator_free`.
/// - Returns NULL on error; call `rest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn rest_estimator_new(
    model_json: *const c_char,
    config_json: *const c_char,
) -> *mut RestEstimatorHandle {
    clear_last_error();

    let model_str = match cstr_to_string(model_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid model JSON string pointer");
            return ptr::null_mut();
        }
    };

    let model = match LinearSleepModel::from_json(&model_str) {
        Ok(m) => m,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let config = if config_json.is_null() {
        EstimatorConfig::default()
    } else {
        let config_str = match cstr_to_string(config_json) {
            Some(s) => s,
            None => {
                set_last_error("Invalid config JSON string pointer");
                return ptr::null_mut();
            }
        };
        match EstimatorConfig::from_json(&config_str) {
            Ok(c) => c,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        }
    };

    let estimator = match BedtimeEstimator::with_config(model, config) {
        Ok(e) => e,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };
    let encoder = ReportEncoder::new(estimator.formatter());
    Box::into_raw(Box::new(RestEstimatorHandle { estimator, encoder }))
}

/// Free an estimator.
///
/// # Safety
/// - `estimator` must be a valid pointer returned by `rest_estimator_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn rest_estimator_free(estimator: *mut RestEstimatorHandle) {
    if !estimator.is_null() {
        drop(Box::from_raw(estimator));
    }
}

/// Estimate a bedtime with a configured estimator.
///
/// # Safety
/// - `estimator` must be a valid pointer returned by `rest_estimator_new`.
/// - Returns a newly allocated string that must be freed with `rest_free_string`.
/// - Returns NULL on invalid arguments; call `rest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn rest_estimator_estimate(
    estimator: *const RestEstimatorHandle,
    wake_hour: i32,
    wake_minute: i32,
    sleep_hours: f64,
    coffee_cups: i32,
) -> *mut c_char {
    clear_last_error();

    if estimator.is_null() {
        set_last_error("Null estimator pointer");
        return ptr::null_mut();
    }

    let handle = &*estimator;

    let wake = match wake_time(wake_hour, wake_minute) {
        Some(w) => w,
        None => {
            set_last_error(&format!("Invalid wake time {wake_hour}:{wake_minute}"));
            return ptr::null_mut();
        }
    };

    estimate_to_cstr(&handle.estimator, &handle.encoder, wake, sleep_hours, coffee_cups)
}

/// Format a duration label using the estimator's pluralization rule.
///
/// # Safety
/// - `estimator` must be a valid pointer returned by `rest_estimator_new`.
/// - Returns a newly allocated string that must be freed with `rest_free_string`.
/// - Returns NULL on error; call `rest_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn rest_estimator_format_duration(
    estimator: *const RestEstimatorHandle,
    hours: f64,
) -> *mut c_char {
    clear_last_error();

    if estimator.is_null() {
        set_last_error("Null estimator pointer");
        return ptr::null_mut();
    }

    let handle = &*estimator;
    string_to_cstr(&handle.estimator.formatter().format(hours))
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by BetterRest functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a BetterRest function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn rest_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next BetterRest call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn rest_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn rest_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn sample_model_json() -> CString {
        CString::new(
            r#"{
                "name": "sleep-hours",
                "format_version": 1,
                "intercept": 0.0,
                "coefficients": { "wake": 0.0, "estimated_sleep": 3600.0, "coffee": 1800.0 }
            }"#,
        )
        .unwrap()
    }

    unsafe fn take_json(ptr: *mut c_char) -> serde_json::Value {
        assert!(!ptr.is_null());
        let value = serde_json::from_str(CStr::from_ptr(ptr).to_str().unwrap()).unwrap();
        rest_free_string(ptr);
        value
    }

    #[test]
    fn test_ffi_estimate_bedtime() {
        let model = sample_model_json();

        unsafe {
            let result = rest_estimate_bedtime(model.as_ptr(), 7, 0, 7.5, 1);
            let report = take_json(result);

            assert_eq!(report["outcome"]["status"], "ok");
            assert_eq!(report["outcome"]["bedtime"], "23:00");
            assert_eq!(report["outcome"]["day_offset"], -1);
            assert_eq!(report["outcome"]["display"], "11:00 PM");
        }
    }

    #[test]
    fn test_ffi_bad_model_is_error_report() {
        let model = CString::new("not json").unwrap();

        unsafe {
            let result = rest_estimate_bedtime(model.as_ptr(), 7, 0, 8.0, 1);
            let report = take_json(result);

            assert_eq!(report["outcome"]["status"], "error");
            assert_eq!(report["outcome"]["title"], "Error");
            assert_eq!(report["outcome"]["message"], "Could not calculate the bedtime");
            assert!(rest_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_invalid_wake_time() {
        let model = sample_model_json();

        unsafe {
            let result = rest_estimate_bedtime(model.as_ptr(), 24, 0, 8.0, 1);
            assert!(result.is_null());

            let error = rest_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert!(error_str.contains("wake time"));
        }
    }

    #[test]
    fn test_ffi_estimator_lifecycle() {
        let model = sample_model_json();
        let config = CString::new(r#"{ "plural_rule": "english" }"#).unwrap();

        unsafe {
            let estimator = rest_estimator_new(model.as_ptr(), config.as_ptr());
            assert!(!estimator.is_null());

            let report = take_json(rest_estimator_estimate(estimator, 6, 30, 8.0, 0));
            assert_eq!(report["outcome"]["bedtime"], "22:30");
            assert_eq!(report["outcome"]["sleep_label"], "8 hours");

            let label = rest_estimator_format_duration(estimator, 1.0);
            assert_eq!(CStr::from_ptr(label).to_str().unwrap(), "1 hour");
            rest_free_string(label);

            rest_estimator_free(estimator);
        }
    }

    #[test]
    fn test_ffi_estimator_rejects_bad_config() {
        let model = sample_model_json();
        let config = CString::new(r#"{ "coffee_cups": { "min": 5, "max": 1 } }"#).unwrap();

        unsafe {
            let estimator = rest_estimator_new(model.as_ptr(), config.as_ptr());
            assert!(estimator.is_null());
            assert!(!rest_last_error().is_null());
        }
    }

    #[test]
    fn test_ffi_format_duration() {
        unsafe {
            let label = rest_format_duration(7.5);
            assert_eq!(CStr::from_ptr(label).to_str().unwrap(), "7 hours 30 minutes");
            rest_free_string(label);
        }
    }

    #[test]
    fn test_ffi_version() {
        unsafe {
            let version = rest_version();
            assert!(!version.is_null());

            let version_str = CStr::from_ptr(version).to_str().unwrap();
            assert!(!version_str.is_empty());
        }
    }
}
