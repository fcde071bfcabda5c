//! Script chunks and the pushdata encoding rules.
//!
//! A chunk is either a bare opcode or a data push. Pushes are written with
//! the shortest length prefix (`<len>` up to 0x4b, then `OP_PUSHDATA1/2/4`);
//! minimal mode additionally replaces empty and small-number pushes with
//! their dedicated opcodes.

use bsv_primitives::util::BsvReader;

use crate::opcodes::*;
use crate::ScriptError;

/// A single parsed element of a script.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptChunk {
    /// The opcode byte. For direct pushes (1-75 bytes) this is the length.
    pub op: u8,
    /// The pushed bytes, for push operations and a top-level `OP_RETURN`.
    pub data: Option<Vec<u8>>,
}

impl ScriptChunk {
    /// ASM token: pushed data as hex, otherwise the opcode name.
    pub fn to_asm_string(&self) -> String {
        match &self.data {
            Some(data) if self.op > OP_0 && self.op <= OP_PUSHDATA4 => hex::encode(data),
            _ => opcode_to_string(self.op),
        }
    }
}

/// Decode raw script bytes into chunks.
///
/// An `OP_RETURN` outside any conditional block ends parsing; the bytes after
/// it are attached to that chunk as data.
pub fn decode_script(bytes: &[u8]) -> Result<Vec<ScriptChunk>, ScriptError> {
    let mut reader = BsvReader::new(bytes);
    let mut chunks = Vec::new();
    let mut conditional_depth = 0usize;
    let truncated = |_| ScriptError::DataTooSmall;

    while reader.remaining() > 0 {
        let op = reader.read_u8().map_err(truncated)?;
        let len = match op {
            OP_DATA_1..=OP_DATA_75 => Some(op as usize),
            OP_PUSHDATA1 => Some(reader.read_u8().map_err(truncated)? as usize),
            OP_PUSHDATA2 => Some(reader.read_u16_le().map_err(truncated)? as usize),
            OP_PUSHDATA4 => Some(reader.read_u32_le().map_err(truncated)? as usize),
            _ => None,
        };
        let data = match (op, len) {
            (_, Some(n)) => Some(reader.read_bytes(n).map_err(truncated)?.to_vec()),
            (OP_RETURN, None) if conditional_depth == 0 => {
                let rest = reader.read_bytes(reader.remaining()).map_err(truncated)?;
                Some(rest.to_vec())
            }
            (OP_IF | OP_NOTIF | OP_VERIF | OP_VERNOTIF, None) => {
                conditional_depth += 1;
                None
            }
            (OP_ENDIF, None) => {
                conditional_depth = conditional_depth.saturating_sub(1);
                None
            }
            _ => None,
        };
        chunks.push(ScriptChunk { op, data });
    }

    Ok(chunks)
}

/// Length prefix for a push of `data_len` bytes.
///
/// # Errors
/// `EncodingError` when the length does not fit in 32 bits.
pub fn push_data_prefix(data_len: usize) -> Result<Vec<u8>, ScriptError> {
    let prefix = if data_len <= OP_DATA_75 as usize {
        vec![data_len as u8]
    } else if data_len <= 0xff {
        vec![OP_PUSHDATA1, data_len as u8]
    } else if data_len <= 0xffff {
        let mut buf = vec![OP_PUSHDATA2];
        buf.extend_from_slice(&(data_len as u16).to_le_bytes());
        buf
    } else {
        let len = u32::try_from(data_len).map_err(|_| {
            ScriptError::EncodingError(format!(
                "{} bytes is too long for a pushdata opcode",
                data_len
            ))
        })?;
        let mut buf = vec![OP_PUSHDATA4];
        buf.extend_from_slice(&len.to_le_bytes());
        buf
    };
    Ok(prefix)
}

/// Encode `data` as a single push.
///
/// With `minimal` set: empty data is `OP_0`, a single byte 1..=16 is
/// `OP_1`..`OP_16`, and a single `0x81` is `OP_1NEGATE`. Otherwise, and in
/// non-minimal mode, the data is length-prefixed. Non-minimal mode rejects
/// empty data.
pub fn encode_pushdata(data: &[u8], minimal: bool) -> Result<Vec<u8>, ScriptError> {
    if minimal {
        match data {
            [] => return Ok(vec![OP_0]),
            [n @ 1..=16] => return Ok(vec![OP_1 + n - 1]),
            [0x81] => return Ok(vec![OP_1NEGATE]),
            _ => {}
        }
    } else if data.is_empty() {
        return Err(ScriptError::EncodingError(
            "empty pushdata in non-minimal mode".to_string(),
        ));
    }
    let mut out = push_data_prefix(data.len())?;
    out.extend_from_slice(data);
    Ok(out)
}

/// Encode an integer as a minimal script number push.
///
/// The magnitude is written little-endian with the sign in the top bit of
/// the last byte, adding a `0x00` byte first when that bit is already used.
pub fn encode_int(num: i64) -> Vec<u8> {
    if num == 0 {
        return vec![OP_0];
    }
    let mut magnitude = num.unsigned_abs();
    let mut octets = Vec::with_capacity(9);
    while magnitude > 0 {
        octets.push(magnitude as u8);
        magnitude >>= 8;
    }
    if octets[octets.len() - 1] & 0x80 != 0 {
        octets.push(0x00);
    }
    if num < 0 {
        let last = octets.len() - 1;
        octets[last] |= 0x80;
    }
    // at most 9 bytes, a direct push
    match octets.as_slice() {
        [n @ 1..=16] => vec![OP_1 + n - 1],
        [0x81] => vec![OP_1NEGATE],
        _ => {
            let mut out = Vec::with_capacity(octets.len() + 1);
            out.push(octets.len() as u8);
            out.extend_from_slice(&octets);
            out
        }
    }
}

/// Concatenate one push per part, each with the shortest length prefix.
pub fn encode_push_datas(parts: &[&[u8]]) -> Result<Vec<u8>, ScriptError> {
    let mut result = Vec::new();
    for part in parts {
        result.extend_from_slice(&push_data_prefix(part.len())?);
        result.extend_from_slice(part);
    }
    Ok(result)
}
