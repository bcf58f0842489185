//! BOF argument packing.
//!
//! Native extension modules run by the beacon read their arguments from a
//! single buffer produced here. The layout is fixed by the consumer and must
//! be reproduced byte for byte:
//!
//! - `int` (`i`): 4 bytes big-endian, no prefix
//! - `short` (`s`): 2 bytes big-endian, no prefix
//! - `string` (`z`): 4-byte big-endian length, bytes, NUL; length counts the NUL
//! - `wstring` (`Z`): 4-byte big-endian length, UTF-16LE units, 2-byte NUL; length in bytes
//! - `binary` (`b`): 4-byte big-endian length, raw bytes

mod argument;
mod packer;

pub use argument::{BofArgType, BofArgument};
pub use packer::{pack, pack_to_base64};
