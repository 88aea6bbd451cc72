//! The closed set of value kinds a parameter can hold, and their wire
//! shapes.
//!
//! Every operation that branches on the concrete kind is either an
//! exhaustive `match` over [`ParamKind`] / the registry's slot enum, or
//! a `ParamData` impl listed in this file. Adding a kind is a
//! compile-checked change: the impl here plus one variant at each match
//! site.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::UiError;

/// Kind tag for the closed set of supported value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ParamKind {
    Bool,
    Int,
    Float,
    Double,
    String,
    Vec2,
    Vec3,
    Color,
    List,
    Map,
}

/// 2D vector, encoded on the wire as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 3D vector, encoded on the wire as `[x, y, z]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// RGB color with components in `[0, 1]`, encoded as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

impl Serialize for Vec2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.x, self.y].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vec2 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Self { x, y })
    }
}

impl Serialize for Vec3 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.x, self.y, self.z].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vec3 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [x, y, z] = <[f32; 3]>::deserialize(deserializer)?;
        Ok(Self { x, y, z })
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.r, self.g, self.b].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [r, g, b] = <[f32; 3]>::deserialize(deserializer)?;
        Ok(Self { r, g, b })
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A value type a parameter can be bound over.
///
/// Sealed: the kind set is closed. `Selected` is the sub-value a
/// `select` command targets: the element type for collection kinds,
/// the value itself for scalar kinds.
pub trait ParamData:
    sealed::Sealed + Clone + std::fmt::Debug + Serialize + DeserializeOwned + 'static
{
    const KIND: ParamKind;
    type Selected: Clone + std::fmt::Debug + Serialize + DeserializeOwned + 'static;

    /// Strict decode of a wire value. Shape mismatch fails with
    /// `TypeMismatch` and leaves nothing half-applied.
    fn from_wire(value: &Value) -> Result<Self, UiError> {
        serde_json::from_value(value.clone()).map_err(|_| UiError::TypeMismatch {
            expected: Self::KIND,
            value: value.to_string(),
        })
    }

    fn selected_from_wire(value: &Value) -> Result<Self::Selected, UiError> {
        serde_json::from_value(value.clone()).map_err(|_| UiError::TypeMismatch {
            expected: Self::KIND,
            value: value.to_string(),
        })
    }

    fn to_wire(&self) -> Value {
        // The kind set above only holds JSON-representable values.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

macro_rules! impl_param_data {
    ($ty:ty, $kind:ident, $selected:ty) => {
        impl sealed::Sealed for $ty {}
        impl ParamData for $ty {
            const KIND: ParamKind = ParamKind::$kind;
            type Selected = $selected;
        }
    };
}

impl_param_data!(bool, Bool, bool);
impl_param_data!(i32, Int, i32);
impl_param_data!(f32, Float, f32);
impl_param_data!(f64, Double, f64);
impl_param_data!(String, String, String);
impl_param_data!(Vec2, Vec2, Vec2);
impl_param_data!(Vec3, Vec3, Vec3);
impl_param_data!(Color, Color, Color);
impl_param_data!(Vec<String>, List, String);
impl_param_data!(HashMap<String, String>, Map, String);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_display_matches_wire_names() {
        assert_eq!(ParamKind::Bool.to_string(), "bool");
        assert_eq!(ParamKind::Vec2.to_string(), "vec2");
        assert_eq!(ParamKind::List.to_string(), "list");
        assert_eq!(ParamKind::Map.to_string(), "map");
    }

    #[test]
    fn vec_wire_shape_is_flat_array() {
        assert_eq!(Vec2::new(1.0, 2.0).to_wire(), json!([1.0, 2.0]));
        assert_eq!(Vec3::new(1.0, 2.0, 3.0).to_wire(), json!([1.0, 2.0, 3.0]));
        assert_eq!(Color::new(0.0, 0.5, 1.0).to_wire(), json!([0.0, 0.5, 1.0]));
    }

    #[test]
    fn vec_decode_rejects_wrong_arity() {
        assert!(Vec3::from_wire(&json!([1.0, 2.0])).is_err());
        assert!(Vec2::from_wire(&json!([1.0, 2.0, 3.0])).is_err());
        assert!(Vec2::from_wire(&json!(1.0)).is_err());
    }

    #[test]
    fn int_decode_is_strict() {
        assert_eq!(i32::from_wire(&json!(42)).expect("integral"), 42);
        assert!(i32::from_wire(&json!(1.5)).is_err());
        assert!(i32::from_wire(&json!("42")).is_err());
        assert!(i32::from_wire(&json!(1_000_000_000_000_i64)).is_err());
    }

    #[test]
    fn float_accepts_integral_numbers() {
        assert_eq!(f32::from_wire(&json!(2)).expect("widening"), 2.0);
        assert_eq!(f64::from_wire(&json!(0.25)).expect("double"), 0.25);
    }

    #[test]
    fn mismatch_reports_expected_kind() {
        let err = bool::from_wire(&json!("true")).expect_err("not a bool");
        match err {
            UiError::TypeMismatch { expected, value } => {
                assert_eq!(expected, ParamKind::Bool);
                assert_eq!(value, "\"true\"");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn list_decode_is_all_or_nothing() {
        assert!(Vec::<String>::from_wire(&json!(["a", 1])).is_err());
        let decoded = Vec::<String>::from_wire(&json!(["a", "b"])).expect("strings");
        assert_eq!(decoded, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn map_wire_shape_is_object() {
        let mut map = HashMap::new();
        map.insert("k".to_string(), "v".to_string());
        assert_eq!(map.to_wire(), json!({"k": "v"}));
        assert!(HashMap::<String, String>::from_wire(&json!(["k", "v"])).is_err());
    }
}
