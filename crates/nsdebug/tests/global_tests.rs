mod common;

use std::sync::Mutex;

use nsdebug::{DebugError, JsonFormatter, TextFormatter};

use common::Capture;

// The process-wide runtime is shared by every test in this binary.
static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

#[test]
fn test_global_enable_disable() {
    let _guard = GLOBAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let capture = Capture::default();
    nsdebug::set_writer(capture.clone());
    nsdebug::set_has_colors(false);
    nsdebug::set_formatter(TextFormatter::new());

    nsdebug::enable("global:*").unwrap();
    nsdebug::debugger("global:a").log("visible");
    nsdebug::debugger("other").log("hidden");

    nsdebug::disable();
    nsdebug::debugger("global:a").log("after disable");

    let out = capture.contents();
    assert!(out.contains("global:a - visible"));
    assert!(!out.contains("hidden"));
    assert!(!out.contains("after disable"));
}

#[test]
fn test_global_debugger_is_cached() {
    let _guard = GLOBAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    let first = nsdebug::debugger("global:cached");
    let second = nsdebug::debugger("global:cached");

    assert!(first.ptr_eq(&second));
    assert!(nsdebug::global().cache_len() >= 1);
}

#[test]
fn test_global_set_cache() {
    let _guard = GLOBAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());

    assert!(matches!(
        nsdebug::set_cache("sixty"),
        Err(DebugError::InvalidCacheMinutes { .. })
    ));
    nsdebug::set_cache("5").unwrap();
    assert_eq!(
        nsdebug::global().settings().cache_ttl(),
        Some(std::time::Duration::from_secs(300))
    );
}

#[test]
fn test_global_json_output() {
    let _guard = GLOBAL_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let capture = Capture::default();
    nsdebug::set_writer(capture.clone());
    nsdebug::set_has_time(false);
    nsdebug::set_formatter(JsonFormatter::new());
    nsdebug::set_cache_ttl(None);

    nsdebug::enable("json:*").unwrap();
    nsdebug::debugger("json:out").with_field("k", "v").log("structured");
    nsdebug::disable();
    nsdebug::set_has_time(true);
    nsdebug::set_formatter(TextFormatter::new());

    assert_eq!(
        capture.contents(),
        "{\"k\":\"v\",\"msg\":\"structured\",\"namespace\":\"json:out\"}\n"
    );
}
