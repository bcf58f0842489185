//! Dynamically typed parameter values.

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

use crate::bof::BofArgument;

/// A parameter value as found in a workflow document.
///
/// Deserialization is untagged: `[{ "type": "z", "value": "..." }, ...]`
/// becomes [`ParamValue::Args`], any other array becomes [`ParamValue::List`].
/// [`ParamValue::Bytes`] only appears after BOF packing and serializes as
/// base64 text.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Args(Vec<BofArgument>),
    List(Vec<ParamValue>),
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ParamValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn is_args(&self) -> bool {
        matches!(self, ParamValue::Args(_))
    }

    /// Short name of the variant, used in coercion error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "bool",
            ParamValue::Int(_) => "int",
            ParamValue::Float(_) => "float",
            ParamValue::Str(_) => "string",
            ParamValue::Args(_) => "argument list",
            ParamValue::List(_) => "list",
            ParamValue::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ParamValue::Null => write!(f, "null"),
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Str(s) => write!(f, "{}", s),
            ParamValue::Args(args) => write!(f, "<{} bof args>", args.len()),
            ParamValue::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            ParamValue::Bytes(b) => write!(f, "{}", STANDARD.encode(b)),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<Vec<u8>> for ParamValue {
    fn from(value: Vec<u8>) -> Self {
        ParamValue::Bytes(value)
    }
}

impl From<Vec<BofArgument>> for ParamValue {
    fn from(value: Vec<BofArgument>) -> Self {
        ParamValue::Args(value)
    }
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S>(
        bytes: &[u8],
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_scalars() {
        let v: ParamValue = serde_json::from_str("42").unwrap();
        assert_eq!(v, ParamValue::Int(42));

        let v: ParamValue = serde_json::from_str("4.5").unwrap();
        assert_eq!(v, ParamValue::Float(4.5));

        let v: ParamValue = serde_json::from_str("\"whoami\"").unwrap();
        assert_eq!(v, ParamValue::Str("whoami".to_string()));

        let v: ParamValue = serde_json::from_str("null").unwrap();
        assert_eq!(v, ParamValue::Null);
    }

    #[test]
    fn test_deserialize_bof_args_before_list() {
        let v: ParamValue = serde_json::from_str(r#"[{"type": "z", "value": "C:\\Windows"}, {"type": "s", "value": 0}]"#).unwrap();
        match v {
            ParamValue::Args(args) => {
                assert_eq!(args.len(), 2);
                assert_eq!(args[0].arg_type, "z");
                assert_eq!(args[1].value, ParamValue::Int(0));
            }
            other => panic!("expected args, got {:?}", other),
        }

        let v: ParamValue = serde_json::from_str(r#"["a", 1]"#).unwrap();
        assert_eq!(v, ParamValue::List(vec![ParamValue::from("a"), ParamValue::Int(1)]));
    }

    #[test]
    fn test_bytes_serialize_as_base64() {
        let v = ParamValue::Bytes(vec![0, 0, 0, 1]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"AAAAAQ==\"");
        assert_eq!(v.to_string(), "AAAAAQ==");
    }
}
