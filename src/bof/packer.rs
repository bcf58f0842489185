use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{BeaconflowError, Result, common::ParamValue};

use super::{BofArgType, BofArgument};

/// Packs typed arguments into a single BOF argument buffer.
///
/// The output is the concatenation of every argument's encoding, in order.
/// An empty slice packs to an empty buffer. On error nothing is returned, so
/// a caller never sees a partially packed buffer.
pub fn pack(args: &[BofArgument]) -> Result<Vec<u8>> {
    let mut buff = Vec::new();

    for arg in args {
        let arg_type = BofArgType::from_str(&arg.arg_type).map_err(|_| BeaconflowError::UnsupportedType(arg.arg_type.clone()))?;

        match arg_type {
            BofArgType::Int => {
                let value = coerce_integer(arg_type, &arg.value)? as u32;
                buff.extend_from_slice(&value.to_be_bytes());
            }
            BofArgType::Short => {
                let value = coerce_integer(arg_type, &arg.value)? as u16;
                buff.extend_from_slice(&value.to_be_bytes());
            }
            BofArgType::Str => {
                let text = coerce_string(arg_type, &arg.value)?;
                put_length(&mut buff, arg_type, text.len() + 1)?;
                buff.extend_from_slice(text.as_bytes());
                buff.push(0);
            }
            BofArgType::WStr => {
                let text = coerce_string(arg_type, &arg.value)?;
                let units: Vec<u16> = text.encode_utf16().collect();
                put_length(&mut buff, arg_type, (units.len() + 1) * 2)?;
                for unit in units {
                    buff.extend_from_slice(&unit.to_le_bytes());
                }
                buff.extend_from_slice(&[0, 0]);
            }
            BofArgType::Binary => {
                let data = coerce_binary(arg_type, &arg.value)?;
                put_length(&mut buff, arg_type, data.len())?;
                buff.extend_from_slice(&data);
            }
        }
    }

    Ok(buff)
}

/// Packs the arguments and encodes the buffer as standard base64.
pub fn pack_to_base64(args: &[BofArgument]) -> Result<String> {
    Ok(STANDARD.encode(pack(args)?))
}

fn put_length(
    buff: &mut Vec<u8>,
    arg_type: BofArgType,
    len: usize,
) -> Result<()> {
    let len = u32::try_from(len).map_err(|_| mismatch(arg_type, format!("payload of {} bytes exceeds the 32-bit length prefix", len)))?;
    buff.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

/// Reads a numeric value as a wide integer; the caller narrows it with `as`,
/// which wraps to the target width.
fn coerce_integer(
    arg_type: BofArgType,
    value: &ParamValue,
) -> Result<i128> {
    match value {
        ParamValue::Int(i) => Ok(*i as i128),
        ParamValue::Float(f) if f.is_finite() => Ok(f.trunc() as i128),
        ParamValue::Str(s) => s.trim().parse::<i128>().map_err(|e| mismatch(arg_type, format!("'{}' is not a decimal integer: {}", s, e))),
        other => Err(mismatch(arg_type, format!("invalid value for {}: {}", arg_type, other.kind()))),
    }
}

fn coerce_string(
    arg_type: BofArgType,
    value: &ParamValue,
) -> Result<&str> {
    value.as_str().ok_or_else(|| mismatch(arg_type, format!("invalid value for {}: {}", arg_type, value.kind())))
}

fn coerce_binary(
    arg_type: BofArgType,
    value: &ParamValue,
) -> Result<Vec<u8>> {
    match value {
        ParamValue::Str(s) => hex::decode(s).map_err(|e| mismatch(arg_type, e.to_string())),
        ParamValue::Bytes(b) => Ok(b.clone()),
        other => Err(mismatch(arg_type, format!("invalid value for {}: {}", arg_type, other.kind()))),
    }
}

fn mismatch(
    arg_type: BofArgType,
    message: String,
) -> BeaconflowError {
    BeaconflowError::TypeMismatch {
        arg_type: arg_type.to_string(),
        message,
    }
}
