use jsonservice::json::{self, to_string, to_string_pretty, Format, Value};

const DOCUMENTS: &[&str] = &[
    r#"{"name":"Mike","wife":{"name":"Cheryl"}}"#,
    r#"[1,2.5,-3,true,false,null,"x"]"#,
    r#"{"nested":{"list":[{"a":[]},{"b":{}}],"flag":true},"n":-0.125}"#,
    r#""tab\tquote\"slash\\ unicode é pair 😀""#,
    r#"  { "spaced" :  [ 1 , 2 ] , "empty" : "" }  "#,
    r#"{"big":9007199254740991,"small":-42,"frac":0.1}"#,
];

#[test]
fn test_parse_agrees_with_serde_json() {
    for doc in DOCUMENTS {
        let ours: serde_json::Value = json::parse(doc).unwrap().into();
        let theirs: serde_json::Value = serde_json::from_str(doc).unwrap();
        assert_eq!(ours, theirs, "mismatch for {doc}");
    }
}

#[test]
fn test_compact_output_is_valid_for_serde_json() {
    for doc in DOCUMENTS {
        let text = to_string(&json::parse(doc).unwrap());
        let reparsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let original: serde_json::Value = serde_json::from_str(doc).unwrap();
        assert_eq!(reparsed, original, "serialized form of {doc}: {text}");
    }
}

#[test]
fn test_round_trip_is_stable_in_every_format() {
    for doc in DOCUMENTS {
        let value = json::parse(doc).unwrap();
        for format in [Format::None, Format::Tabs, Format::Spaces] {
            let once = to_string_pretty(&value, format, 2);
            let reparsed = json::parse(&once).unwrap();
            assert_eq!(reparsed, value, "{format} round trip of {doc}");
            assert_eq!(to_string_pretty(&reparsed, format, 2), once);
        }
    }
}

#[test]
fn test_mike_example() {
    let value = json::parse(r#"{"name":"Mike","wife":{"name":"Cheryl"}}"#).unwrap();
    assert_eq!(
        value.view().at("wife.name").unwrap().as_str().unwrap(),
        "Cheryl"
    );
    assert_eq!(
        to_string(&value),
        r#"{"name": "Mike","wife": {"name": "Cheryl"}}"#
    );
}

#[test]
fn test_host_values_render_through_serde() {
    #[derive(serde::Serialize)]
    struct Point {
        x: i32,
        y: Option<f64>,
        tags: Vec<&'static str>,
    }

    let value = json::to_value(&Point {
        x: 1,
        y: None,
        tags: vec!["a", "b"],
    })
    .unwrap();
    assert_eq!(
        to_string(&value),
        r#"{"x": 1,"y": null,"tags": ["a","b"]}"#
    );
}

#[test]
fn test_rejects_what_serde_json_rejects() {
    for bad in ["", "{", "[1,]", r#"{"a" 1}"#, "01", "tru", r#""\x""#, "1 2", "{}{}"] {
        assert!(json::parse(bad).is_err(), "accepted {bad:?}");
        assert!(serde_json::from_str::<serde_json::Value>(bad).is_err());
    }
}

#[test]
fn test_non_finite_numbers_are_null() {
    assert_eq!(to_string(&Value::from(f64::NAN)), "null");
    assert_eq!(to_string(&Value::from(f64::INFINITY)), "null");
}
