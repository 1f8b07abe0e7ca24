//! Calculator service run by `jsonservice serve`.

use anyhow::{ensure, Context};
use serde::Serialize;

use crate::dispatcher::Reply;
use crate::json::{Map, Value};
use crate::logging::LogLevel;
use crate::route::{Operation, ParamType, Parameter, RouteBinding};

#[derive(Serialize)]
struct Status<'a> {
    status: &'static str,
    message: &'static str,
    helpurl: Option<&'a str>,
}

/// All operations of the sample service.
#[must_use]
pub fn calculator() -> Vec<Operation> {
    vec![
        Operation::new("Calculator.Status", |call| {
            Reply::json(&Status {
                status: "ok",
                message: "service is up and running!",
                helpurl: call.description_uri().map(url::Url::as_str),
            })
        })
        .bind(
            RouteBinding::get("/")
                .description("Service status OK!")
                .example("/")
                .allow_unauthorized(),
        ),
        Operation::new("Calculator.Add", |call| {
            let args = call.args();
            let sum = i64::from(args.i32("a")?) + i64::from(args.i32("b")?);
            Reply::json(&sum)
        })
        .param(Parameter::required("a", ParamType::Int32))
        .param(Parameter::required("b", ParamType::Int32))
        .bind(
            RouteBinding::get("add?value1={a}&value2={b}")
                .description("Adds two integers")
                .example("add?value1=3&value2=5"),
        ),
        Operation::new("Calculator.Multiply", |call| {
            Reply::json(&(call.args().f64("a")? * call.args().f64("b")?))
        })
        .param(Parameter::required("a", ParamType::Double))
        .param(Parameter::required("b", ParamType::Double))
        .bind(
            RouteBinding::get("multiply?a={a}&b={b}")
                .description("Multiplies two numbers")
                .example("multiply?a=1.5&b=4"),
        ),
        Operation::new("Calculator.Divide", |call| {
            let (a, b) = (call.args().i64("a")?, call.args().i64("b")?);
            let quotient = a.checked_div(b).context("integer division failed")?;
            Reply::json(&quotient)
        })
        .param(Parameter::required("a", ParamType::Int64))
        .param(Parameter::required("b", ParamType::Int64))
        .bind(
            RouteBinding::get("divide?a={a}&b={b}")
                .description("Integer division; dividing by zero reports a failure")
                .example("divide?a=10&b=3"),
        ),
        Operation::new("Calculator.Echo", |call| {
            Reply::json(&call.args().i32("x")?)
        })
        .param(Parameter::required("x", ParamType::Int32))
        .bind(RouteBinding::get("/test?id={x}").example("test?id=5")),
        Operation::new("Calculator.Product", |call| {
            Reply::json(&(i64::from(call.args().i32("x")?) * i64::from(call.args().i32("y")?)))
        })
        .param(Parameter::required("x", ParamType::Int32))
        .param(Parameter::optional("y", ParamType::Int32, 0))
        .bind(RouteBinding::get("/test?a={x}&b={y}").example("test?a=5&b=10")),
        Operation::new("Calculator.MultiplyAdd", |call| {
            let args = call.args();
            let (x, y, z) = (args.i64("x")?, args.i64("y")?, args.i64("z")?);
            Reply::json(&(x * y + z))
        })
        .param(Parameter::required("x", ParamType::Int32))
        .param(Parameter::required("y", ParamType::Int32))
        .param(Parameter::required("z", ParamType::Int32))
        .bind(RouteBinding::get("/test?c={x}&d={y}&e={z}").example("test?c=5&d=7&e=3")),
        Operation::new("Calculator.Save", |call| {
            let id = call.args().i64("id")?;
            let document = call.args().document("document")?;
            ensure!(!document.is_null(), "a document body is required");
            call.log(LogLevel::Info, format_args!("Saving document {id}"));
            let mut saved = Map::new();
            saved.insert("id", Value::from(id));
            saved.insert("saved", document.clone());
            Ok(Reply::value(saved))
        })
        .param(Parameter::required("id", ParamType::Int64))
        .param(Parameter::required("document", ParamType::Document))
        .bind(
            RouteBinding::post("save?id={id}")
                .entity("document")
                .description("Echoes a posted document back with its id"),
        ),
        Operation::new("Calculator.Power", |_| {
            Ok(Reply::value("not implemented yet").with_status(501))
        })
        .bind(
            RouteBinding::get("power")
                .description("Reserved; answers 501")
                .describe(false),
        ),
    ]
}
