//! Script opcode values and their ASM names.

pub const OP_0: u8 = 0x00;
pub const OP_FALSE: u8 = 0x00;
pub const OP_DATA_1: u8 = 0x01;
pub const OP_DATA_20: u8 = 0x14;
pub const OP_DATA_33: u8 = 0x21;
pub const OP_DATA_65: u8 = 0x41;
pub const OP_DATA_75: u8 = 0x4b;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_RESERVED: u8 = 0x50;
pub const OP_1: u8 = 0x51;
pub const OP_TRUE: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_NOP: u8 = 0x61;
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;
pub const OP_VERIF: u8 = 0x65;
pub const OP_VERNOTIF: u8 = 0x66;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_VERIFY: u8 = 0x69;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DROP: u8 = 0x75;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;

/// Names of every non-push opcode, indexed from `OP_1NEGATE` (0x4f) up.
const NAMED: [(u8, &str); 126] = [
    (0x4f, "OP_1NEGATE"),
    (0x50, "OP_RESERVED"),
    (0x51, "OP_1"),
    (0x52, "OP_2"),
    (0x53, "OP_3"),
    (0x54, "OP_4"),
    (0x55, "OP_5"),
    (0x56, "OP_6"),
    (0x57, "OP_7"),
    (0x58, "OP_8"),
    (0x59, "OP_9"),
    (0x5a, "OP_10"),
    (0x5b, "OP_11"),
    (0x5c, "OP_12"),
    (0x5d, "OP_13"),
    (0x5e, "OP_14"),
    (0x5f, "OP_15"),
    (0x60, "OP_16"),
    (0x61, "OP_NOP"),
    (0x62, "OP_VER"),
    (0x63, "OP_IF"),
    (0x64, "OP_NOTIF"),
    (0x65, "OP_VERIF"),
    (0x66, "OP_VERNOTIF"),
    (0x67, "OP_ELSE"),
    (0x68, "OP_ENDIF"),
    (0x69, "OP_VERIFY"),
    (0x6a, "OP_RETURN"),
    (0x6b, "OP_TOALTSTACK"),
    (0x6c, "OP_FROMALTSTACK"),
    (0x6d, "OP_2DROP"),
    (0x6e, "OP_2DUP"),
    (0x6f, "OP_3DUP"),
    (0x70, "OP_2OVER"),
    (0x71, "OP_2ROT"),
    (0x72, "OP_2SWAP"),
    (0x73, "OP_IFDUP"),
    (0x74, "OP_DEPTH"),
    (0x75, "OP_DROP"),
    (0x76, "OP_DUP"),
    (0x77, "OP_NIP"),
    (0x78, "OP_OVER"),
    (0x79, "OP_PICK"),
    (0x7a, "OP_ROLL"),
    (0x7b, "OP_ROT"),
    (0x7c, "OP_SWAP"),
    (0x7d, "OP_TUCK"),
    (0x7e, "OP_CAT"),
    (0x7f, "OP_SPLIT"),
    (0x80, "OP_NUM2BIN"),
    (0x81, "OP_BIN2NUM"),
    (0x82, "OP_SIZE"),
    (0x83, "OP_INVERT"),
    (0x84, "OP_AND"),
    (0x85, "OP_OR"),
    (0x86, "OP_XOR"),
    (0x87, "OP_EQUAL"),
    (0x88, "OP_EQUALVERIFY"),
    (0x89, "OP_RESERVED1"),
    (0x8a, "OP_RESERVED2"),
    (0x8b, "OP_1ADD"),
    (0x8c, "OP_1SUB"),
    (0x8d, "OP_2MUL"),
    (0x8e, "OP_2DIV"),
    (0x8f, "OP_NEGATE"),
    (0x90, "OP_ABS"),
    (0x91, "OP_NOT"),
    (0x92, "OP_0NOTEQUAL"),
    (0x93, "OP_ADD"),
    (0x94, "OP_SUB"),
    (0x95, "OP_MUL"),
    (0x96, "OP_DIV"),
    (0x97, "OP_MOD"),
    (0x98, "OP_LSHIFT"),
    (0x99, "OP_RSHIFT"),
    (0x9a, "OP_BOOLAND"),
    (0x9b, "OP_BOOLOR"),
    (0x9c, "OP_NUMEQUAL"),
    (0x9d, "OP_NUMEQUALVERIFY"),
    (0x9e, "OP_NUMNOTEQUAL"),
    (0x9f, "OP_LESSTHAN"),
    (0xa0, "OP_GREATERTHAN"),
    (0xa1, "OP_LESSTHANOREQUAL"),
    (0xa2, "OP_GREATERTHANOREQUAL"),
    (0xa3, "OP_MIN"),
    (0xa4, "OP_MAX"),
    (0xa5, "OP_WITHIN"),
    (0xa6, "OP_RIPEMD160"),
    (0xa7, "OP_SHA1"),
    (0xa8, "OP_SHA256"),
    (0xa9, "OP_HASH160"),
    (0xaa, "OP_HASH256"),
    (0xab, "OP_CODESEPARATOR"),
    (0xac, "OP_CHECKSIG"),
    (0xad, "OP_CHECKSIGVERIFY"),
    (0xae, "OP_CHECKMULTISIG"),
    (0xaf, "OP_CHECKMULTISIGVERIFY"),
    (0xb0, "OP_NOP1"),
    (0xb1, "OP_NOP2"),
    (0xb2, "OP_NOP3"),
    (0xb3, "OP_NOP4"),
    (0xb4, "OP_NOP5"),
    (0xb5, "OP_NOP6"),
    (0xb6, "OP_NOP7"),
    (0xb7, "OP_NOP8"),
    (0xb8, "OP_NOP9"),
    (0xb9, "OP_NOP10"),
    (0xba, "OP_NOP11"),
    (0xbb, "OP_NOP12"),
    (0xbc, "OP_NOP13"),
    (0xbd, "OP_NOP14"),
    (0xbe, "OP_NOP15"),
    (0xbf, "OP_NOP16"),
    (0xc0, "OP_NOP17"),
    (0xc1, "OP_NOP18"),
    (0xc2, "OP_NOP19"),
    (0xc3, "OP_NOP20"),
    (0xc4, "OP_NOP21"),
    (0xc5, "OP_NOP22"),
    (0xc6, "OP_NOP23"),
    (0xc7, "OP_NOP24"),
    (0xc8, "OP_NOP25"),
    (0xc9, "OP_NOP26"),
    (0xca, "OP_NOP27"),
    (0xcb, "OP_NOP28"),
    (0xcc, "OP_NOP29"),
];

/// ASM name of an opcode. Direct pushes render as `OP_DATA_<n>`.
pub fn opcode_to_string(op: u8) -> String {
    match op {
        OP_0 => "OP_0".to_string(),
        OP_DATA_1..=OP_DATA_75 => format!("OP_DATA_{}", op),
        OP_PUSHDATA1 => "OP_PUSHDATA1".to_string(),
        OP_PUSHDATA2 => "OP_PUSHDATA2".to_string(),
        OP_PUSHDATA4 => "OP_PUSHDATA4".to_string(),
        _ => NAMED
            .iter()
            .find(|(code, _)| *code == op)
            .map(|(_, name)| name.to_string())
            .unwrap_or_else(|| "OP_INVALIDOPCODE".to_string()),
    }
}

/// Opcode for an ASM name of a non-push opcode. `OP_FALSE`/`OP_TRUE`
/// are accepted as aliases.
pub fn string_to_opcode(name: &str) -> Option<u8> {
    match name {
        "OP_0" | "OP_FALSE" => Some(OP_0),
        "OP_TRUE" => Some(OP_TRUE),
        _ => NAMED
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(code, _)| *code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for (code, name) in NAMED {
            assert_eq!(opcode_to_string(code), name);
            assert_eq!(string_to_opcode(name), Some(code));
        }
    }

    #[test]
    fn test_push_and_unknown_names() {
        assert_eq!(opcode_to_string(OP_DATA_20), "OP_DATA_20");
        assert_eq!(opcode_to_string(0xff), "OP_INVALIDOPCODE");
        assert_eq!(string_to_opcode("OP_FALSE"), Some(OP_0));
        assert_eq!(string_to_opcode("deadbeef"), None);
    }
}
