//! Data-carrier (`OP_FALSE OP_RETURN`) script template.

use bsv_script::opcodes::{OP_FALSE, OP_RETURN};
use bsv_script::Script;

use crate::TransactionError;

/// `OP_FALSE OP_RETURN` followed by one length-prefixed push per chunk.
pub fn lock(chunks: &[&[u8]]) -> Result<Script, TransactionError> {
    let mut script = Script::new();
    script.append_opcodes(&[OP_FALSE, OP_RETURN])?;
    for chunk in chunks {
        script.append_push_data(chunk)?;
    }
    Ok(script)
}
