use std::sync::Arc;

use super::{RouteOutcome, Router};
use crate::dispatcher::Reply;
use crate::json::Value;
use crate::logging::Logger;
use crate::registry::Registry;
use crate::route::{Operation, ParamType, Parameter, RouteBinding};

fn op(name: &str, params: &[(&str, bool)], binding: RouteBinding) -> Operation {
    let mut o = Operation::new(name, |_| Ok(Reply::value(Value::Null)));
    for (p, required) in params {
        o = o.param(if *required {
            Parameter::required(*p, ParamType::Int32)
        } else {
            Parameter::optional(*p, ParamType::Int32, 0)
        });
    }
    o.bind(binding)
}

fn router(ops: Vec<Operation>) -> Router {
    Router::new(Arc::new(Registry::build(&ops, &Logger::new()).unwrap()))
}

fn selected(r: &Router, method: &str, path: &str, keys: &[&str]) -> Option<String> {
    r.select(method, path, keys)
        .matched()
        .map(|d| d.operation().to_string())
}

fn specificity_router() -> Router {
    router(vec![
        op("R1", &[("x", true)], RouteBinding::get("/op?a={x}")),
        op("R2", &[("x", true), ("y", true)], RouteBinding::get("/op?a={x}&b={y}")),
        op(
            "R3",
            &[("x", true), ("y", true), ("z", true)],
            RouteBinding::get("/op?a={x}&b={y}&c={z}"),
        ),
    ])
}

#[test]
fn test_most_specific_route_wins() {
    let r = specificity_router();
    assert_eq!(selected(&r, "GET", "/op", &["a"]).as_deref(), Some("R1"));
    assert_eq!(selected(&r, "GET", "/op", &["a", "b"]).as_deref(), Some("R2"));
    assert_eq!(selected(&r, "GET", "/op", &["a", "b", "c"]).as_deref(), Some("R3"));
}

#[test]
fn test_extra_keys_do_not_prevent_match() {
    let r = specificity_router();
    assert_eq!(selected(&r, "GET", "/op", &["a", "zzz"]).as_deref(), Some("R1"));
}

#[test]
fn test_missing_required_key_is_no_match() {
    let r = specificity_router();
    assert!(matches!(r.select("GET", "/op", &["b"]), RouteOutcome::NoMatch));
    assert!(matches!(r.select::<&str>("GET", "/op", &[]), RouteOutcome::NoMatch));
}

#[test]
fn test_optional_keys_count_toward_specificity() {
    let r = router(vec![
        op("Plain", &[("x", true)], RouteBinding::get("/t?a={x}")),
        op("Extended", &[("x", true), ("y", false)], RouteBinding::get("/t?a={x}&b={y}")),
    ]);
    // Both satisfied; the optional binding makes Extended more specific.
    assert_eq!(selected(&r, "GET", "/t", &["a"]).as_deref(), Some("Extended"));
}

#[test]
fn test_ties_go_to_registry_order() {
    let r = router(vec![
        op("First", &[("x", true)], RouteBinding::get("/t?a={x}")),
        op("Second", &[("x", false)], RouteBinding::get("/t?b={x}")),
    ]);
    assert_eq!(selected(&r, "GET", "/t", &["a", "b"]).as_deref(), Some("First"));
    assert_eq!(selected(&r, "GET", "/t", &["b"]).as_deref(), Some("Second"));
}

#[test]
fn test_case_insensitive_path_verb_and_keys() {
    let r = router(vec![op(
        "Add",
        &[("a", true), ("b", true)],
        RouteBinding::get("add?value1={a}&value2={b}"),
    )]);
    assert_eq!(
        selected(&r, "get", "/ADD", &["VALUE1", "Value2"]).as_deref(),
        Some("Add")
    );
}

#[test]
fn test_wrong_verb() {
    let r = router(vec![op("Save", &[("x", true)], RouteBinding::post("/save?id={x}"))]);
    assert!(matches!(r.select("GET", "/save", &["id"]), RouteOutcome::WrongVerb));
    assert!(matches!(r.select("GET", "/nowhere", &["id"]), RouteOutcome::NoMatch));
}

#[test]
fn test_right_verb_with_unsatisfied_keys_is_no_match() {
    let r = router(vec![
        op("Save", &[("x", true)], RouteBinding::post("/save?id={x}")),
        op("Load", &[("x", true)], RouteBinding::get("/save?id={x}")),
    ]);
    assert!(matches!(r.select("GET", "/save", &["other"]), RouteOutcome::NoMatch));
}

#[test]
fn test_root_route() {
    let r = router(vec![op("Status", &[], RouteBinding::get("/"))]);
    assert_eq!(selected(&r, "GET", "/", &["anything"]).as_deref(), Some("Status"));
}
