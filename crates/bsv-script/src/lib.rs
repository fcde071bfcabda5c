//! BSV Blockchain SDK - Script encoding and P2PKH addresses.
//!
//! Provides the `Script` byte type, opcode definitions, chunk parsing, the
//! pushdata and script-number encoders, and Base58Check P2PKH addresses.

pub mod address;
pub mod chunk;
pub mod opcodes;
pub mod script;

mod error;
pub use address::{Address, Network};
pub use chunk::{encode_int, encode_push_datas, encode_pushdata, ScriptChunk};
pub use error::ScriptError;
pub use script::Script;
