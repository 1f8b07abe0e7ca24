use jsonservice::dispatcher::Reply;
use jsonservice::logging::Logger;
use jsonservice::registry::{Registry, RegistryError};
use jsonservice::route::{Operation, ParamType, Parameter, RouteBinding};

mod common;
use common::log_capture::SharedBuf;

fn op(name: &str, params: &[&str], binding: RouteBinding) -> Operation {
    params
        .iter()
        .fold(Operation::new(name, |_| Reply::json(&0)), |o, p| {
            o.param(Parameter::required(*p, ParamType::Int32))
        })
        .bind(binding)
}

#[test]
fn test_collision_names_both_operations() {
    let buf = SharedBuf::default();
    let ops = vec![
        op("First", &["a", "b"], RouteBinding::get("sum?x={a}&y={b}")),
        op("Second", &["c", "d"], RouteBinding::get("/SUM?Y={c}&X={d}")),
    ];
    let err = Registry::build(&ops, &Logger::with_writer(buf.clone())).unwrap_err();

    match &err {
        RegistryError::TemplateCollision {
            path, operations, ..
        } => {
            assert_eq!(path, "/sum");
            assert_eq!(operations, &["First".to_string(), "Second".to_string()]);
        }
        other => panic!("expected collision, got {other:?}"),
    }
    let message = err.to_string();
    assert!(message.contains("First"));
    assert!(message.contains("Second"));
    assert!(buf.contents().contains("Template collision detected"));
}

#[test]
fn test_unknown_placeholder_is_rejected() {
    let buf = SharedBuf::default();
    let ops = vec![op("Add", &["a"], RouteBinding::get("add?value1={a}&value2={b}"))];
    let err = Registry::build(&ops, &Logger::with_writer(buf.clone())).unwrap_err();

    assert_eq!(
        err,
        RegistryError::InvalidPlaceholder {
            operation: "Add".to_string(),
            placeholders: vec!["b".to_string()],
        }
    );
    assert!(buf
        .contents()
        .contains("Invalid placeholder(s) on the Add operation: b"));
}

#[test]
fn test_unbound_operations_are_skipped_and_first_binding_wins() {
    let buf = SharedBuf::default();
    let unbound = Operation::new("Unbound", |_| Reply::json(&0));
    let twice = op("Twice", &[], RouteBinding::get("first"))
        .bind(RouteBinding::post("second"));
    let registry = Registry::build(&[unbound, twice], &Logger::with_writer(buf.clone())).unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.routes()[0].to_string(), "GET /first -> Twice");
    assert!(buf.contents().contains("defaulting to 'GET' method."));
}

#[test]
fn test_build_logs_progress() {
    let buf = SharedBuf::default();
    let ops = vec![op("Add", &["a"], RouteBinding::get("add?v={a}"))];
    Registry::build(&ops, &Logger::with_writer(buf.clone())).unwrap();

    let log = buf.contents();
    assert!(log.contains("Obtaining service operation information"));
    assert!(log.contains("Validating placeholder variables"));
    assert!(log.contains("No template collisions detected."));
}
