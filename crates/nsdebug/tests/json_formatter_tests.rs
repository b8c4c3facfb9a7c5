mod common;

use std::io;

use nsdebug::{FieldValue, JsonFormatter};
use regex::Regex;
use serde_json::Value;

use common::capture_runtime;

fn wild_walrus() -> FieldValue {
    FieldValue::error(&io::Error::new(io::ErrorKind::Other, "wild walrus"))
}

fn parse(s: &str) -> Value {
    serde_json::from_str(s).expect("Unable to unmarshal formatted entry")
}

#[test]
fn test_error_not_lost() {
    let (runtime, _capture) = capture_runtime();
    runtime.set_formatter(JsonFormatter::new());

    let s = runtime
        .debugger("error_not_lost")
        .with_field("error", wild_walrus())
        .render("hi");
    let entry = parse(&s);

    assert_eq!(entry["error"], "wild walrus");
    assert_eq!(entry["msg"], "hi");
    assert_eq!(entry["namespace"], "error_not_lost");
    assert!(!entry["delta"].as_str().unwrap().is_empty());
    assert!(!entry["time"].as_str().unwrap().is_empty());
}

#[test]
fn test_error_not_lost_on_field_not_named_error() {
    let (runtime, _capture) = capture_runtime();
    runtime.set_formatter(JsonFormatter::new());

    let s = runtime
        .debugger("mapped_field_error")
        .with_field("omg", wild_walrus())
        .render("hi");
    let entry = parse(&s);

    assert_eq!(entry["omg"], "wild walrus");
    assert_eq!(entry["msg"], "hi");
}

#[test]
fn test_field_clash_with_time_keeps_computed_time() {
    let (runtime, _capture) = capture_runtime();
    runtime.set_formatter(JsonFormatter::new());

    let s = runtime
        .debugger("clash_time")
        .with_field("time", "right now!")
        .render("hi");
    let entry = parse(&s);

    let time = entry["time"].as_str().unwrap();
    assert_ne!(time, "right now!");
    assert!(Regex::new(r"^\d\d:\d\d:\d\d\.\d{3}$").unwrap().is_match(time));
}

#[test]
fn test_field_clash_with_delta_keeps_computed_delta() {
    let (runtime, _capture) = capture_runtime();
    runtime.set_formatter(JsonFormatter::new());

    let s = runtime
        .debugger("clash_delta")
        .with_field("delta", 0)
        .render("hi");
    let entry = parse(&s);

    assert!(Regex::new(r"^\d+(s|ms|us|ns)$")
        .unwrap()
        .is_match(entry["delta"].as_str().unwrap()));
}

#[test]
fn test_field_clash_with_namespace_keeps_namespace() {
    let (runtime, _capture) = capture_runtime();
    runtime.set_formatter(JsonFormatter::new());

    let s = runtime
        .debugger("clash_namespace")
        .with_field("namespace", wild_walrus())
        .render("hi");
    let entry = parse(&s);

    assert_eq!(entry["namespace"], "clash_namespace");
}

#[test]
fn test_field_clash_with_msg_prefers_supplied_value() {
    let (runtime, _capture) = capture_runtime();
    runtime.set_formatter(JsonFormatter::new());

    let debug = runtime.debugger("clash_msg");
    assert_eq!(parse(&debug.render("hi"))["msg"], "hi");

    debug.with_field("msg", wild_walrus());
    assert_eq!(parse(&debug.render("hi"))["msg"], "wild walrus");
}

#[test]
fn test_entry_ends_with_newline() {
    let (runtime, _capture) = capture_runtime();
    runtime.set_formatter(JsonFormatter::new());

    let s = runtime
        .debugger("newline")
        .with_field("dog", wild_walrus())
        .render("hi");

    parse(&s);
    assert!(s.ends_with('\n'), "Expected JSON log entry to end with a newline");
}

#[test]
fn test_pretty() {
    let (runtime, _capture) = capture_runtime();
    runtime.set_has_time(false);
    runtime.set_formatter(JsonFormatter::pretty());

    let s = runtime
        .debugger("pretty")
        .with_field("dog", "wild walrus")
        .render("hi");

    assert_eq!(
        s,
        "{\n  \"dog\": \"wild walrus\",\n  \"msg\": \"hi\",\n  \"namespace\": \"pretty\"\n}\n"
    );
}

#[test]
fn test_logged_lines_round_trip() {
    let (runtime, capture) = capture_runtime();
    runtime.set_formatter(JsonFormatter::new());
    runtime.enable("svc:*").unwrap();

    let debug = runtime
        .debugger("svc:api")
        .with_field("user", "tobi")
        .with_field("attempt", 2)
        .with_field("cached", false);
    debug.log("request served");
    debug.spawn("db").log("query done");

    let lines = capture.lines();
    assert_eq!(lines.len(), 2);

    let first = parse(&lines[0]);
    assert_eq!(first["msg"], "request served");
    assert_eq!(first["namespace"], "svc:api");
    assert_eq!(first["user"], "tobi");
    assert_eq!(first["attempt"], 2);
    assert_eq!(first["cached"], false);

    let second = parse(&lines[1]);
    assert_eq!(second["namespace"], "svc:api:db");
    assert!(second.get("user").is_none());
}

#[test]
fn test_without_time_omits_time_keys() {
    let (runtime, capture) = capture_runtime();
    runtime.set_has_time(false);
    runtime.set_formatter(JsonFormatter::new());
    runtime.enable("*").unwrap();

    runtime.debugger("plain").log("hi");

    let entry = parse(&capture.contents());
    let keys: Vec<&String> = entry.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["msg", "namespace"]);
}

#[test]
fn test_logged_html_is_escaped() {
    let (runtime, capture) = capture_runtime();
    runtime.set_has_time(false);
    runtime.set_formatter(JsonFormatter::new());
    runtime.enable("html").unwrap();

    runtime.debugger("html").log("<script>a && b</script>");

    assert_eq!(
        capture.contents(),
        "{\"msg\":\"\\u003cscript\\u003ea \\u0026\\u0026 b\\u003c/script\\u003e\",\"namespace\":\"html\"}\n"
    );
    assert_eq!(parse(&capture.contents())["msg"], "<script>a && b</script>");

    capture.clear();
    runtime.set_formatter(JsonFormatter::new().with_html_escape(false));
    runtime.debugger("html").log("<p>");
    assert_eq!(capture.contents(), "{\"msg\":\"<p>\",\"namespace\":\"html\"}\n");
}
