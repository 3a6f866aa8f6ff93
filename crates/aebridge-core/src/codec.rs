//! Value codec
//!
//! Converts native values into ExtendScript source fragments and decodes the
//! endpoint's response payloads back into [`Value`]s. Every value that ends up
//! in generated source goes through [`ToExtend`], which is the only place
//! string literals are quoted.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Deserializer};
use serde_json::Value as Json;

use crate::{
    config::REGISTRY_ACCESSOR,
    error::{BridgeError, Result},
};

/// Identifier under which the host registered an object.
///
/// Generated by the host and unique for the lifetime of one host session. The
/// client only ever copies it around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteId(pub String);

impl RemoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Source expression that looks the object up in the host registry
    pub fn registry_lookup(&self) -> String {
        format!("{}[{}]", REGISTRY_ACCESSOR, quote(&self.0))
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Wire-level result of an evaluation that produced a live object
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObjectDescriptor {
    #[serde(rename = "objectType")]
    pub object_type: String,
    #[serde(rename = "pydobeId", deserialize_with = "remote_id")]
    pub pydobe_id: RemoteId,
}

impl ObjectDescriptor {
    pub fn new(object_type: impl Into<String>, pydobe_id: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            pydobe_id: RemoteId::new(pydobe_id),
        }
    }
}

/// Ids are strings, but a host-side generator may hand out bare numbers
fn remote_id<'de, D>(deserializer: D) -> std::result::Result<RemoteId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Wire::deserialize(deserializer)? {
        Wire::Text(text) => RemoteId(text),
        Wire::Number(number) => RemoteId(number.to_string()),
    })
}

/// Decoded native value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Object(ObjectDescriptor),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "array",
            Value::Map(_) => "object literal",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&ObjectDescriptor> {
        match self {
            Value::Object(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}

/// Structural decoding. An object tagged `isObject: true` must be a complete
/// descriptor; a malformed one is an error rather than a plain map.
impl TryFrom<Json> for Value {
    type Error = BridgeError;

    fn try_from(json: Json) -> Result<Self> {
        Ok(match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<_>>()?,
            ),
            Json::Object(map) if map.get("isObject") == Some(&Json::Bool(true)) => {
                Value::Object(serde_json::from_value(Json::Object(map))?)
            }
            Json::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Value::try_from(v)?)))
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Object(d) => write!(f, "<{} {}>", d.object_type, d.pydobe_id),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            other => f.write_str(&other.to_extend()),
        }
    }
}

/// Error fields the host serializes from a caught exception
#[derive(Debug, Clone, PartialEq)]
pub struct HostError {
    pub message: String,
    pub name: Option<String>,
    pub line: Option<i64>,
}

impl From<HostError> for BridgeError {
    fn from(err: HostError) -> Self {
        BridgeError::HostEvaluation {
            message: err.message,
            name: err.name,
            line: err.line,
        }
    }
}

/// Decoded endpoint response
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Value(Value),
    Error(HostError),
}

impl Response {
    pub fn into_result(self) -> Result<Value> {
        match self {
            Response::Value(value) => Ok(value),
            Response::Error(err) => Err(err.into()),
        }
    }
}

/// Decode a raw response body.
///
/// JSON documents are decoded structurally (tagged objects become
/// descriptors, `error: true` becomes a host error); anything else is an
/// opaque string. An empty body or a bare `undefined` means "no value".
pub fn decode(payload: &str) -> Result<Response> {
    let trimmed = payload.trim();
    if trimmed.is_empty() || trimmed == "undefined" {
        return Ok(Response::Value(Value::Null));
    }

    match serde_json::from_str::<Json>(trimmed) {
        Ok(Json::Object(map)) if map.get("error") == Some(&Json::Bool(true)) => {
            let message = map
                .get("message")
                .and_then(Json::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Json::Object(map.clone()).to_string());
            Ok(Response::Error(HostError {
                message,
                name: map.get("name").and_then(Json::as_str).map(str::to_string),
                line: map.get("line").and_then(Json::as_i64),
            }))
        }
        Ok(json) => Value::try_from(json).map(Response::Value),
        Err(_) => Ok(Response::Value(Value::String(payload.to_string()))),
    }
}

/// Conversion of a native value into an ExtendScript source fragment
pub trait ToExtend {
    fn to_extend(&self) -> String;
}

/// Source text spliced in verbatim, e.g. `CloseOptions.SAVE_CHANGES`
#[derive(Debug, Clone, Copy)]
pub struct Raw<'a>(pub &'a str);

impl ToExtend for Raw<'_> {
    fn to_extend(&self) -> String {
        self.0.to_string()
    }
}

impl ToExtend for bool {
    fn to_extend(&self) -> String {
        let literal = if *self { "true" } else { "false" };
        literal.to_string()
    }
}

macro_rules! integer_to_extend {
    ($($t:ty),*) => {
        $(impl ToExtend for $t {
            fn to_extend(&self) -> String {
                self.to_string()
            }
        })*
    };
}

integer_to_extend!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ToExtend for f64 {
    fn to_extend(&self) -> String {
        format_number(*self)
    }
}

impl ToExtend for f32 {
    fn to_extend(&self) -> String {
        format_number(f64::from(*self))
    }
}

impl ToExtend for str {
    fn to_extend(&self) -> String {
        quote(self)
    }
}

impl ToExtend for String {
    fn to_extend(&self) -> String {
        quote(self)
    }
}

impl<T: ToExtend + ?Sized> ToExtend for &T {
    fn to_extend(&self) -> String {
        (**self).to_extend()
    }
}

impl<T: ToExtend> ToExtend for [T] {
    fn to_extend(&self) -> String {
        array_literal(self.iter().map(ToExtend::to_extend))
    }
}

impl<T: ToExtend> ToExtend for Vec<T> {
    fn to_extend(&self) -> String {
        self.as_slice().to_extend()
    }
}

impl<T: ToExtend, const N: usize> ToExtend for [T; N] {
    fn to_extend(&self) -> String {
        self.as_slice().to_extend()
    }
}

impl<T: ToExtend> ToExtend for Option<T> {
    fn to_extend(&self) -> String {
        match self {
            Some(value) => value.to_extend(),
            None => "null".to_string(),
        }
    }
}

impl ToExtend for ObjectDescriptor {
    fn to_extend(&self) -> String {
        self.pydobe_id.registry_lookup()
    }
}

impl ToExtend for Value {
    fn to_extend(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_extend(),
            Value::Int(i) => i.to_extend(),
            Value::Float(f) => f.to_extend(),
            Value::String(s) => quote(s),
            Value::List(items) => array_literal(items.iter().map(ToExtend::to_extend)),
            Value::Map(map) => {
                let members = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", quote(k), v.to_extend()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{members}}}")
            }
            Value::Object(descriptor) => descriptor.to_extend(),
        }
    }
}

fn array_literal(items: impl Iterator<Item = String>) -> String {
    format!("[{}]", items.collect::<Vec<_>>().join(", "))
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let literal = if n > 0.0 { "Infinity" } else { "-Infinity" };
        literal.to_string()
    } else {
        n.to_string()
    }
}

/// Quote a string as an ExtendScript double-quoted literal
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str(r#"\""#),
            '\\' => out.push_str(r"\\"),
            '\n' => out.push_str(r"\n"),
            '\r' => out.push_str(r"\r"),
            '\t' => out.push_str(r"\t"),
            '\u{2028}' | '\u{2029}' => out.push_str(&format!("\\u{:04x}", c as u32)),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Method call fragment, e.g. `addFolder("Renders")`
pub fn call(name: &str, args: &[&dyn ToExtend]) -> String {
    let args = args
        .iter()
        .map(|arg| arg.to_extend())
        .collect::<Vec<_>>()
        .join(", ");
    format!("{name}({args})")
}

/// Assignment fragment, e.g. `name = "Main"`
pub fn assign(name: &str, value: &dyn ToExtend) -> String {
    format!("{name} = {}", value.to_extend())
}

/// Conversion from a decoded [`Value`] into a native type
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            Value::String(ref s) if s.trim() == "true" => Ok(true),
            Value::String(ref s) if s.trim() == "false" => Ok(false),
            other => Err(BridgeError::unexpected_value("a boolean", other.type_name())),
        }
    }
}

/// A whole float that fits in `i64`. `as` would saturate out-of-range values.
fn exact_integer(f: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f)).then_some(f as i64)
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            Value::Float(f) => {
                exact_integer(f).ok_or_else(|| BridgeError::unexpected_value("an integer", f))
            }
            Value::String(ref s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(exact_integer))
                    .ok_or_else(|| BridgeError::unexpected_value("an integer", format!("{s:?}")))
            }
            other => Err(BridgeError::unexpected_value("an integer", other.type_name())),
        }
    }
}

macro_rules! narrow_integer_from_value {
    ($($t:ty),*) => {
        $(impl FromValue for $t {
            fn from_value(value: Value) -> Result<Self> {
                let wide = i64::from_value(value)?;
                <$t>::try_from(wide).map_err(|_| {
                    BridgeError::unexpected_value(stringify!($t), wide)
                })
            }
        })*
    };
}

narrow_integer_from_value!(i32, u8, u16, u32, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i as f64),
            Value::Float(f) => Ok(f),
            Value::String(ref s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| BridgeError::unexpected_value("a number", format!("{s:?}"))),
            other => Err(BridgeError::unexpected_value("a number", other.type_name())),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(BridgeError::unexpected_value("a string", other.type_name())),
        }
    }
}

impl FromValue for ObjectDescriptor {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(descriptor) => Ok(descriptor),
            other => Err(BridgeError::unexpected_value("an object", other.type_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(BridgeError::unexpected_value("an array", other.type_name())),
        }
    }
}

/// Parse `#rrggbb` into the 0..1 channel values the host uses for colours
pub fn hex_to_rgb(hex: &str) -> Result<[f64; 3]> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BridgeError::validation(format!(
            "'{hex}' is not a #rrggbb colour"
        )));
    }
    let mut rgb = [0.0; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|e| BridgeError::validation(e.to_string()))?;
        *channel = f64::from(byte) / 255.0;
    }
    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_boolean_round_trip() {
        for b in [true, false] {
            let encoded = b.to_extend();
            assert_eq!(encoded, b.to_string());
            let decoded = decode(&encoded).unwrap().into_result().unwrap();
            assert_eq!(bool::from_value(decoded).unwrap(), b);
        }
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!("plain".to_extend(), r#""plain""#);
        assert_eq!(r#"say "hi""#.to_extend(), r#""say \"hi\"""#);
        assert_eq!(r"C:\renders".to_extend(), r#""C:\\renders""#);
        assert_eq!("a\nb\tc\r".to_extend(), r#""a\nb\tc\r""#);
        assert_eq!("\u{1}".to_extend(), r#""\u0001""#);
        assert_eq!("x\u{2028}y".to_extend(), r#""x\u2028y""#);
        assert_eq!("l'ombre".to_extend(), r#""l'ombre""#);
    }

    #[test]
    fn test_numbers_and_arrays() {
        assert_eq!(42.to_extend(), "42");
        assert_eq!(2.2f64.to_extend(), "2.2");
        assert_eq!(30.0f64.to_extend(), "30");
        assert_eq!(f64::NAN.to_extend(), "NaN");
        assert_eq!(f64::NEG_INFINITY.to_extend(), "-Infinity");
        assert_eq!([1920, 1080].to_extend(), "[1920, 1080]");
        assert_eq!(vec!["a", "b"].to_extend(), r#"["a", "b"]"#);
        assert_eq!(None::<i32>.to_extend(), "null");
    }

    #[test]
    fn test_descriptor_encodes_as_registry_lookup() {
        let descriptor = ObjectDescriptor::new("Project", "p1");
        assert_eq!(descriptor.to_extend(), r#"$._pydobe["p1"]"#);
        let tricky = RemoteId::new(r#"a"b"#);
        assert_eq!(tricky.registry_lookup(), r#"$._pydobe["a\"b"]"#);
    }

    #[test]
    fn test_fragment_builders() {
        assert_eq!(
            call("addComp", &[&"Main", &1920, &1080, &1.0, &10.5, &25.0]),
            r#"addComp("Main", 1920, 1080, 1, 10.5, 25)"#
        );
        assert_eq!(call("remove", &[]), "remove()");
        assert_eq!(assign("name", &"Hero"), r#"name = "Hero""#);
        assert_eq!(assign("locked", &true), "locked = true");
        assert_eq!(
            call("close", &[&Raw("CloseOptions.SAVE_CHANGES")]),
            "close(CloseOptions.SAVE_CHANGES)"
        );
    }

    #[test]
    fn test_decode_object_descriptor() {
        let response =
            decode(r#"{"isObject": true, "objectType": "Project", "pydobeId": "p1"}"#).unwrap();
        assert_eq!(
            response,
            Response::Value(Value::Object(ObjectDescriptor::new("Project", "p1")))
        );
    }

    #[test]
    fn test_decode_nested_descriptors() {
        let payload = r#"[{"isObject": true, "objectType": "CompItem", "pydobeId": "p2"},
                          {"isObject": true, "objectType": "FootageItem", "pydobeId": "p3"}]"#;
        let value = decode(payload).unwrap().into_result().unwrap();
        let descriptors = Vec::<ObjectDescriptor>::from_value(value).unwrap();
        assert_eq!(
            descriptors,
            vec![
                ObjectDescriptor::new("CompItem", "p2"),
                ObjectDescriptor::new("FootageItem", "p3"),
            ]
        );
    }

    #[test]
    fn test_decode_host_error() {
        let response = decode(
            r#"{"error": true, "message": "undefined is not an object", "name": "TypeError", "line": 3}"#,
        )
        .unwrap();
        match response.into_result() {
            Err(BridgeError::HostEvaluation { message, name, line }) => {
                assert_eq!(message, "undefined is not an object");
                assert_eq!(name.as_deref(), Some("TypeError"));
                assert_eq!(line, Some(3));
            }
            other => panic!("expected host error, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_numeric_id_and_malformed_descriptor() {
        let value = decode(r#"{"isObject": true, "objectType": "Layer", "pydobeId": 12}"#)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(value, Value::Object(ObjectDescriptor::new("Layer", "12")));

        let err = decode(r#"[{"isObject": true, "pydobeId": "p4"}]"#).unwrap_err();
        assert!(matches!(err, BridgeError::Serialization(_)), "{err}");
    }

    #[test]
    fn test_decode_scalars_and_text() {
        assert_eq!(decode("12").unwrap(), Response::Value(Value::Int(12)));
        assert_eq!(decode("2.5").unwrap(), Response::Value(Value::Float(2.5)));
        assert_eq!(decode(r#""12""#).unwrap(), Response::Value(Value::String("12".into())));
        assert_eq!(
            decode("Project saved").unwrap(),
            Response::Value(Value::String("Project saved".into()))
        );
        assert_eq!(decode("").unwrap(), Response::Value(Value::Null));
        assert_eq!(decode("undefined").unwrap(), Response::Value(Value::Null));
        let map = decode(r#"{"width": 4}"#).unwrap().into_result().unwrap();
        assert!(matches!(map, Value::Map(ref m) if m.get("width") == Some(&Value::Int(4))));
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(i64::from_value(Value::Float(25.0)).unwrap(), 25);
        assert_eq!(usize::from_value(Value::String("7".into())).unwrap(), 7);
        assert!(i64::from_value(Value::Float(2.5)).is_err());
        assert_eq!(i64::from_value(Value::Float(-9.223372036854775808e18)).unwrap(), i64::MIN);
        assert!(matches!(
            i64::from_value(Value::Float(1e20)),
            Err(BridgeError::UnexpectedValue { .. })
        ));
        assert!(i64::from_value(Value::Float(9.223372036854775808e18)).is_err());
        assert!(usize::from_value(Value::String("1e300".into())).is_err());
        assert!(i64::from_value(Value::Float(f64::INFINITY)).is_err());
        assert!(u32::from_value(Value::Int(-1)).is_err());
        assert!(String::from_value(Value::Int(1)).is_err());
        assert_eq!(Option::<String>::from_value(Value::Null).unwrap(), None);
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#ff0000").unwrap(), [1.0, 0.0, 0.0]);
        assert_eq!(hex_to_rgb("000000").unwrap(), [0.0, 0.0, 0.0]);
        assert!(matches!(
            hex_to_rgb("#fff"),
            Err(BridgeError::DomainValidation(_))
        ));
    }
}
