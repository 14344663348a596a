//! Repeated fields
//!
//! A repeated field is an ordered, possibly empty sequence of values of a
//! single protobuf type. Duplicates are allowed.
//!
//! Typed Rust input is converted with [`IntoRepeatedField`] and cannot fail.
//! Dynamic input (JSON values coming from init data or callers that only have
//! a `serde_json::Value`) goes through [`check_repeated_field`], which rejects
//! anything that is not an array of the expected element type.

use std::fmt;
use std::ops::Deref;

use prost_types::field_descriptor_proto::Type;
use serde_json::Value;

use crate::error::{JobsError, Result};

/// Protobuf field value types, numbered as in `FieldDescriptorProto.Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum FieldType {
    Double = 1,
    Float = 2,
    Int64 = 3,
    Uint64 = 4,
    Int32 = 5,
    Fixed64 = 6,
    Fixed32 = 7,
    Bool = 8,
    String = 9,
    Group = 10,
    Message = 11,
    Bytes = 12,
    Uint32 = 13,
    Enum = 14,
    Sfixed32 = 15,
    Sfixed64 = 16,
    Sint32 = 17,
    Sint64 = 18,
}

impl FieldType {
    /// Name of the type as written in a `.proto` file
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Double => "double",
            FieldType::Float => "float",
            FieldType::Int64 => "int64",
            FieldType::Uint64 => "uint64",
            FieldType::Int32 => "int32",
            FieldType::Fixed64 => "fixed64",
            FieldType::Fixed32 => "fixed32",
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Group => "group",
            FieldType::Message => "message",
            FieldType::Bytes => "bytes",
            FieldType::Uint32 => "uint32",
            FieldType::Enum => "enum",
            FieldType::Sfixed32 => "sfixed32",
            FieldType::Sfixed64 => "sfixed64",
            FieldType::Sint32 => "sint32",
            FieldType::Sint64 => "sint64",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Type> for FieldType {
    fn from(ty: Type) -> Self {
        match ty {
            Type::Double => FieldType::Double,
            Type::Float => FieldType::Float,
            Type::Int64 => FieldType::Int64,
            Type::Uint64 => FieldType::Uint64,
            Type::Int32 => FieldType::Int32,
            Type::Fixed64 => FieldType::Fixed64,
            Type::Fixed32 => FieldType::Fixed32,
            Type::Bool => FieldType::Bool,
            Type::String => FieldType::String,
            Type::Group => FieldType::Group,
            Type::Message => FieldType::Message,
            Type::Bytes => FieldType::Bytes,
            Type::Uint32 => FieldType::Uint32,
            Type::Enum => FieldType::Enum,
            Type::Sfixed32 => FieldType::Sfixed32,
            Type::Sfixed64 => FieldType::Sfixed64,
            Type::Sint32 => FieldType::Sint32,
            Type::Sint64 => FieldType::Sint64,
        }
    }
}

/// A Rust type that can be stored in a [`RepeatedField`]
pub trait FieldValue: Sized + Clone {
    /// Protobuf type of the elements
    const FIELD_TYPE: FieldType;

    /// Strict conversion from a JSON value; `None` if the value has another type
    fn from_json(value: &Value) -> Option<Self>;
}

impl FieldValue for String {
    const FIELD_TYPE: FieldType = FieldType::String;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FieldValue for bool {
    const FIELD_TYPE: FieldType = FieldType::Bool;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldValue for i32 {
    const FIELD_TYPE: FieldType = FieldType::Int32;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|n| i32::try_from(n).ok())
    }
}

impl FieldValue for i64 {
    const FIELD_TYPE: FieldType = FieldType::Int64;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FieldValue for u32 {
    const FIELD_TYPE: FieldType = FieldType::Uint32;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_u64().and_then(|n| u32::try_from(n).ok())
    }
}

impl FieldValue for u64 {
    const FIELD_TYPE: FieldType = FieldType::Uint64;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl FieldValue for f32 {
    const FIELD_TYPE: FieldType = FieldType::Float;

    fn from_json(value: &Value) -> Option<Self> {
        value
            .as_f64()
            .filter(|n| n.abs() <= f64::from(f32::MAX))
            .map(|n| n as f32)
    }
}

impl FieldValue for f64 {
    const FIELD_TYPE: FieldType = FieldType::Double;

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

/// Ordered sequence of values of one protobuf type
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatedField<T> {
    items: Vec<T>,
}

impl<T: FieldValue> RepeatedField<T> {
    /// Creates an empty repeated field
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Protobuf type of the elements
    pub fn field_type(&self) -> FieldType {
        T::FIELD_TYPE
    }

    /// Appends a value at the end
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Elements in order
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Consumes the field, returning its elements
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: FieldValue> Default for RepeatedField<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for RepeatedField<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> From<RepeatedField<T>> for Vec<T> {
    fn from(field: RepeatedField<T>) -> Self {
        field.items
    }
}

impl<T: FieldValue> FromIterator<T> for RepeatedField<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> IntoIterator for RepeatedField<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a RepeatedField<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: PartialEq> PartialEq<[T]> for RepeatedField<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.items.as_slice() == other
    }
}

/// Infallible conversion of typed input into a repeated field
pub trait IntoRepeatedField<T> {
    /// Converts `self`, keeping element order
    fn into_repeated_field(self) -> RepeatedField<T>;
}

impl<T: FieldValue> IntoRepeatedField<T> for RepeatedField<T> {
    fn into_repeated_field(self) -> RepeatedField<T> {
        self
    }
}

impl<S: Into<String>> IntoRepeatedField<String> for Vec<S> {
    fn into_repeated_field(self) -> RepeatedField<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String>, const N: usize> IntoRepeatedField<String> for [S; N] {
    fn into_repeated_field(self) -> RepeatedField<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Clone + Into<String>> IntoRepeatedField<String> for &[S] {
    fn into_repeated_field(self) -> RepeatedField<String> {
        self.iter().cloned().map(Into::into).collect()
    }
}

/// Validates a dynamic value as a repeated field of `T`
///
/// `value` must be a JSON array and every element must convert to `T`
/// without coercion. The error names `field`, the expected element type and
/// the first offending index.
pub fn check_repeated_field<T: FieldValue>(
    field: &str,
    value: &Value,
) -> Result<RepeatedField<T>> {
    let elements = value.as_array().ok_or_else(|| {
        JobsError::type_validation(
            field,
            T::FIELD_TYPE,
            format!("expected an array, got {}", json_kind(value)),
        )
    })?;

    elements
        .iter()
        .enumerate()
        .map(|(index, element)| {
            T::from_json(element).ok_or_else(|| {
                JobsError::type_validation(
                    field,
                    T::FIELD_TYPE,
                    format!("element {index} is {}", json_kind(element)),
                )
            })
        })
        .collect()
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_strings_keeps_order_and_duplicates() {
        let field: RepeatedField<String> =
            check_repeated_field("pipelines", &json!(["b", "a", "b"])).unwrap();
        assert_eq!(field.as_slice(), ["b", "a", "b"]);
        assert_eq!(field.field_type(), FieldType::String);
    }

    #[test]
    fn test_check_rejects_non_string_element() {
        let err = check_repeated_field::<String>("pipelines", &json!(["a", 1, "b"])).unwrap_err();
        match err {
            JobsError::TypeValidation {
                field,
                expected,
                reason,
            } => {
                assert_eq!(field, "pipelines");
                assert_eq!(expected, FieldType::String);
                assert_eq!(reason, "element 1 is a number");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_check_rejects_non_array() {
        for value in [json!("p1"), json!({"0": "p1"}), json!(null)] {
            let err = check_repeated_field::<String>("pipelines", &value).unwrap_err();
            assert!(err.is_type_validation());
        }
    }

    #[test]
    fn test_check_empty_array() {
        let field: RepeatedField<String> = check_repeated_field("pipelines", &json!([])).unwrap();
        assert!(field.is_empty());
    }

    #[test]
    fn test_check_integer_width() {
        assert!(check_repeated_field::<i32>("n", &json!([1, -2, 3])).is_ok());
        assert!(check_repeated_field::<i32>("n", &json!([4_294_967_296_i64])).is_err());
        assert!(check_repeated_field::<u32>("n", &json!([-1])).is_err());
        assert!(check_repeated_field::<i64>("n", &json!([1.5])).is_err());
        assert_eq!(
            check_repeated_field::<f64>("n", &json!([1, 2.5])).unwrap().as_slice(),
            [1.0, 2.5]
        );
    }

    #[test]
    fn test_check_float_range() {
        let field = check_repeated_field::<f32>("n", &json!([1.5, -2.0])).unwrap();
        assert_eq!(field.as_slice(), [1.5, -2.0]);

        let err = check_repeated_field::<f32>("n", &json!([1.0, 1e39])).unwrap_err();
        assert!(err.is_type_validation());
        assert!(check_repeated_field::<f32>("n", &json!([-1e39])).is_err());
        assert!(check_repeated_field::<f64>("n", &json!([1e39])).is_ok());
    }

    #[test]
    fn test_push_appends_in_order() {
        let mut field = RepeatedField::<String>::new();
        assert!(field.is_empty());

        field.push("a".to_string());
        field.push("a".to_string());
        field.push("b".to_string());

        assert_eq!(field.len(), 3);
        assert_eq!(field.as_slice(), ["a", "a", "b"]);
        assert_eq!(field.iter().last().map(String::as_str), Some("b"));
    }

    #[test]
    fn test_into_repeated_field_conversions() {
        let from_vec = vec!["a", "b"].into_repeated_field();
        let from_array = ["a".to_string(), "b".to_string()].into_repeated_field();
        let names = ["a", "b"];
        let from_slice = names.as_slice().into_repeated_field();

        assert_eq!(from_vec, from_array);
        assert_eq!(from_array, from_slice);
        assert_eq!(from_slice.into_vec(), vec!["a", "b"]);
    }

    #[test]
    fn test_field_type_from_descriptor_type() {
        assert_eq!(FieldType::from(Type::String), FieldType::String);
        assert_eq!(FieldType::from(Type::Sint64), FieldType::Sint64);
        assert_eq!(FieldType::String as i32, Type::String as i32);
        assert_eq!(FieldType::Uint32.to_string(), "uint32");
    }
}
