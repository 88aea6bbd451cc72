use std::collections::HashMap;

use serde_json::json;
use webui::event::{Event, decode_message, encode_get, encode_set};
use webui::value::{Color, ParamData, Vec2, Vec3};

fn round_trip<T: ParamData + PartialEq>(value: T) {
    let doc = encode_set("p", &value.to_wire());
    let decoded = decode_message(&doc).expect("encoded document must decode");
    assert!(decoded.issues.is_empty());
    assert_eq!(decoded.events.len(), 1);
    let Event::Set(entries) = &decoded.events[0] else {
        panic!("expected a set event, got {:?}", decoded.events[0]);
    };
    let restored = T::from_wire(&entries["p"]).expect("wire value must decode");
    assert_eq!(restored, value);
}

#[test]
fn set_round_trips_every_kind() {
    round_trip(true);
    round_trip(false);
    round_trip(-7_i32);
    round_trip(0.25_f32);
    round_trip(1.5_f64);
    round_trip("hello".to_string());
    round_trip(Vec2::new(1.0, -2.0));
    round_trip(Vec3::new(0.5, 0.25, -1.0));
    round_trip(Color::new(1.0, 0.0, 0.5));
    round_trip(vec!["a".to_string(), "b".to_string()]);
    round_trip(HashMap::from([("k".to_string(), "v".to_string())]));
}

#[test]
fn set_round_trips_boundary_values() {
    round_trip(String::new());
    round_trip(Vec::<String>::new());
    round_trip(HashMap::<String, String>::new());
    round_trip(Vec3::default());
    round_trip(0_i32);
    round_trip(i32::MAX);
    round_trip(i32::MIN);
}

#[test]
fn get_round_trips() {
    let decoded = decode_message(&encode_get("radius")).expect("valid");
    assert_eq!(decoded.events, vec![Event::Get("radius".to_string())]);
}

#[test]
fn encoded_set_has_the_wire_shape() {
    let doc = encode_set("tint", &Color::new(1.0, 0.0, 0.0).to_wire());
    let parsed: serde_json::Value = serde_json::from_str(&doc).expect("json");
    assert_eq!(parsed, json!({"set": {"tint": [1.0, 0.0, 0.0]}}));
}

#[test]
fn multi_command_document_yields_independent_events() {
    let decoded = decode_message(r#"{"set": {"a": 1}, "select": {"b": "x"}, "get": "c"}"#)
        .expect("valid");
    assert_eq!(decoded.events.len(), 3);
    assert!(decoded.issues.is_empty());
}

#[test]
fn unknown_command_is_reported_not_fatal() {
    let decoded = decode_message(r#"{"ping": 1, "set": {"a": 1}}"#).expect("valid");
    assert_eq!(decoded.events.len(), 1);
    assert_eq!(decoded.issues.len(), 1);
}

#[test]
fn syntactically_invalid_text_fails_decode() {
    assert!(decode_message("{not json").is_err());
    assert!(decode_message("").is_err());
    assert!(decode_message("null").is_err());
}
