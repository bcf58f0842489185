use serde::{Deserialize, Serialize};

use crate::common::ParamValue;

/// Wire type of a single BOF argument.
///
/// Both the long names and the single-letter format characters are accepted.
/// The letters are case sensitive: `z` is a narrow string, `Z` a wide one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString, strum::Display)]
pub enum BofArgType {
    #[strum(to_string = "int", serialize = "i")]
    Int,
    #[strum(to_string = "short", serialize = "s")]
    Short,
    #[strum(to_string = "string", serialize = "z")]
    Str,
    #[strum(to_string = "wstring", serialize = "Z")]
    WStr,
    #[strum(to_string = "binary", serialize = "b")]
    Binary,
}

/// A typed BOF argument as written in a workflow document.
///
/// The type tag stays a plain string until packing so that an unknown tag is
/// reported by the packer rather than rejected while loading the document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BofArgument {
    #[serde(rename = "type")]
    pub arg_type: String,
    pub value: ParamValue,
}

impl BofArgument {
    pub fn new(
        arg_type: impl Into<String>,
        value: impl Into<ParamValue>,
    ) -> Self {
        Self {
            arg_type: arg_type.into(),
            value: value.into(),
        }
    }

    pub fn int(value: i64) -> Self {
        Self::new("int", value)
    }

    pub fn short(value: i64) -> Self {
        Self::new("short", value)
    }

    pub fn string(value: &str) -> Self {
        Self::new("string", value)
    }

    pub fn wstring(value: &str) -> Self {
        Self::new("wstring", value)
    }

    pub fn binary(value: impl Into<ParamValue>) -> Self {
        Self::new("binary", value)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_arg_type_aliases() {
        assert_eq!(BofArgType::from_str("int").unwrap(), BofArgType::Int);
        assert_eq!(BofArgType::from_str("i").unwrap(), BofArgType::Int);
        assert_eq!(BofArgType::from_str("s").unwrap(), BofArgType::Short);
        assert_eq!(BofArgType::from_str("z").unwrap(), BofArgType::Str);
        assert_eq!(BofArgType::from_str("Z").unwrap(), BofArgType::WStr);
        assert_eq!(BofArgType::from_str("wstring").unwrap(), BofArgType::WStr);
        assert_eq!(BofArgType::from_str("b").unwrap(), BofArgType::Binary);
        assert!(BofArgType::from_str("float").is_err());
        assert!(BofArgType::from_str("I").is_err());
    }
}
