//! Tests for the bsv-transaction crate.
//!
//! Covers parsing and serialization round trips, txid computation, the
//! sighash flag matrix, P2PKH signing against a known signed transaction,
//! fee estimation, change insertion and the pre-broadcast fee check.

use std::cell::RefCell;

use bsv_primitives::ec::{PrivateKey, PublicKey, Signature};
use bsv_primitives::hash::sha256d;
use bsv_script::{Address, Network, Script};

use crate::broadcaster::{AsyncBroadcaster, BroadcastFailure, BroadcastSuccess, Broadcaster};
use crate::config::TransactionConfig;
use crate::input::{Outpoint, TxInput, DEFAULT_SEQUENCE_NUMBER};
use crate::output::TxOutput;
use crate::sighash::*;
use crate::template::ScriptType;
use crate::transaction::Transaction;
use crate::unspent::Unspent;
use crate::TransactionError;

// -----------------------------------------------------------------------
// Raw transaction hex test vectors
// -----------------------------------------------------------------------

/// A standard transaction: one input, a P2PKH-plus-data output and a P2PKH output.
const SOURCE_RAW_TX: &str = "010000000138c7c61c14ffb063c3bb2664041a3e29ea6ea0412a0c18ff725ba4e9e12afae2030000006a47304402203e9ab8e4c14addf3b4741540b556cfb0e0efb67dc1a7b5ce84c3ac56b3fd447802203c9f49f7bd893ebd7060176dfc36bcaff9d2c443d9a0dd6cd2d59b372c024d20412102798913bc057b344de675dac34faafe3dc2f312c758cd9068209f810877306d66ffffffff02dc050000000000002076a914eb0bd5edba389198e73f8efabddfc61666969ff788ac6a0568656c6c6faa0d0000000000001976a914eb0bd5edba389198e73f8efabddfc61666969ff788ac00000000";

/// A multi-input transaction.
const MULTI_INPUT_TX_HEX: &str = "0200000003a9bc457fdc6a54d99300fb137b23714d860c350a9d19ff0f571e694a419ff3a0010000006b48304502210086c83beb2b2663e4709a583d261d75be538aedcafa7766bd983e5c8db2f8b2fc02201a88b178624ab0ad1748b37c875f885930166237c88f5af78ee4e61d337f935f412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff0092bb9a47e27bf64fc98f557c530c04d9ac25e2f2a8b600e92a0b1ae7c89c20010000006b483045022100f06b3db1c0a11af348401f9cebe10ae2659d6e766a9dcd9e3a04690ba10a160f02203f7fbd7dfcfc70863aface1a306fcc91bbadf6bc884c21a55ef0d32bd6b088c8412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff9d0d4554fa692420a0830ca614b6c60f1bf8eaaa21afca4aa8c99fb052d9f398000000006b483045022100d920f2290548e92a6235f8b2513b7f693a64a0d3fa699f81a034f4b4608ff82f0220767d7d98025aff3c7bd5f2a66aab6a824f5990392e6489aae1e1ae3472d8dffb412103e8be830d98bb3b007a0343ee5c36daa48796ae8bb57946b1e87378ad6e8a090dfeffffff02807c814a000000001976a9143a6bf34ebfcf30e8541bbb33a7882845e5a29cb488ac76b0e60e000000001976a914bd492b67f90cb85918494767ebb23102c4f06b7088ac67000000";

/// Unsigned spend of output 0 of 5126...a393, and the same spend signed.
const UNSIGNED_TX_HEX: &str = "010000000193a35408b6068499e0d5abd799d3e827d9bfe70c9b75ebe209c91d25072326510000000000ffffffff02404b4c00000000001976a91404ff367be719efa79d76e4416ffb072cd53b208888acde94a905000000001976a91404d03f746652cfcb6cb55119ab473a045137d26588ac00000000";
const SIGNED_TX_HEX: &str = "010000000193a35408b6068499e0d5abd799d3e827d9bfe70c9b75ebe209c91d2507232651000000006b483045022100c1d77036dc6cd1f3fa1214b0688391ab7f7a16cd31ea4e5a1f7a415ef167df820220751aced6d24649fa235132f1e6969e163b9400f80043a72879237dab4a1190ad412103b8b40a84123121d260f5c109bc5a46ec819c2e4002e5ba08638783bfb4e01435ffffffff02404b4c00000000001976a91404ff367be719efa79d76e4416ffb072cd53b208888acde94a905000000001976a91404d03f746652cfcb6cb55119ab473a045137d26588ac00000000";
const SPENT_LOCKING_SCRIPT: &str = "76a914c0a3c167a28cabb9fbb495affa0761e6e74ac60d88ac";

/// Testnet WIF for a compressed key.
const TEST_WIF: &str = "cNGwGSc7KRrTmdLUZ54fiSXWbhLNDc2Eg5zNucgQxyQCzuQ5YRDq";

const PREV_TXID: &str = "45be95d2f2c64e99518ffbbce03fb15a7758f20ee5eecf0df07938d977add71d";

fn test_key() -> PrivateKey {
    PrivateKey::from_wif(TEST_WIF).expect("should parse WIF")
}

fn p2pkh_script_for(key: &PrivateKey) -> Script {
    Script::p2pkh(&key.pub_key().hash160(key.is_compressed()))
}

fn p2pkh_input(key: &PrivateKey, vout: u32, value: u64) -> TxInput {
    TxInput::new(
        Outpoint::from_hex(PREV_TXID, vout).unwrap(),
        value,
        p2pkh_script_for(key),
    )
    .with_private_key(key.clone())
}

/// Two P2PKH inputs and two P2PKH outputs.
fn two_by_two(sighash: u32) -> Transaction {
    let key = test_key();
    let mut tx = Transaction::new();
    tx.add_input(p2pkh_input(&key, 0, 10_000).with_sighash(sighash))
        .add_input(p2pkh_input(&key, 1, 20_000).with_sighash(sighash))
        .add_output(TxOutput::to_address(
            &Address::from_public_key(&key.pub_key(), true, Network::Mainnet),
            12_000,
        ))
        .add_output(TxOutput::new(p2pkh_script_for(&key), 17_000));
    tx
}

// -----------------------------------------------------------------------
// Transaction parsing and serialization
// -----------------------------------------------------------------------

/// Test that a transaction can be parsed from hex and re-serialized to
/// produce the exact same hex string (round-trip).
#[test]
fn test_from_hex_roundtrip() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).expect("should parse source tx hex");

    assert_eq!(tx.version, 1, "version should be 1");
    assert_eq!(tx.input_count(), 1, "should have 1 input");
    assert_eq!(tx.output_count(), 2, "should have 2 outputs");
    assert_eq!(tx.lock_time, 0, "lock time should be 0");
    assert_eq!(tx.outputs[0].value, 1500);
    assert_eq!(tx.outputs[1].value, 3498);
    assert_eq!(tx.total_value_out(), 1500 + 3498);
    assert_eq!(tx.inputs[0].sequence, DEFAULT_SEQUENCE_NUMBER);
    assert_eq!(tx.inputs[0].outpoint.vout, 3);

    assert_eq!(tx.to_hex(), SOURCE_RAW_TX, "hex roundtrip should produce identical output");
}

/// The txid bytes on the wire are stored as-is; display order is reversed.
#[test]
fn test_input_outpoint_byte_order() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).expect("should parse source tx");
    let wire_hex = "38c7c61c14ffb063c3bb2664041a3e29ea6ea0412a0c18ff725ba4e9e12afae2";
    assert_eq!(hex::encode(tx.inputs[0].outpoint.txid.as_bytes()), wire_hex);
    assert_eq!(
        tx.inputs[0].outpoint.txid.to_string(),
        "e2fa2ae1e9a45b72ff180c2a41a06eea293e1a046426bbc363b0ff141cc6c738"
    );
}

/// Deserialized outputs classify their scripts.
#[test]
fn test_parsed_output_script_types() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).expect("should parse source tx");
    // P2PKH followed by OP_RETURN data is neither shape
    assert_eq!(tx.outputs[0].script_type, ScriptType::Unknown);
    assert_eq!(tx.outputs[1].script_type, ScriptType::P2PKH);
    // the spent output is unknown after parsing
    assert_eq!(tx.inputs[0].value, 0);
    assert_eq!(tx.inputs[0].script_type, ScriptType::Unknown);
    assert!(tx.inputs[0].is_signed());
}

/// Test parsing and roundtrip of a multi-input (3 inputs, 2 outputs) transaction.
#[test]
fn test_multi_input_roundtrip() {
    let tx = Transaction::from_hex(MULTI_INPUT_TX_HEX).expect("should parse multi-input tx");

    assert_eq!(tx.version, 2, "version should be 2");
    assert_eq!(tx.input_count(), 3, "should have 3 inputs");
    assert_eq!(tx.output_count(), 2, "should have 2 outputs");
    assert_eq!(tx.lock_time, 103, "lock time should be 103 (0x67)");
    assert_eq!(tx.inputs[0].sequence, 0xfffffffe);
    assert_eq!(tx.to_hex(), MULTI_INPUT_TX_HEX);

    let bytes = hex::decode(MULTI_INPUT_TX_HEX).unwrap();
    assert_eq!(Transaction::from_bytes(&bytes).unwrap().to_bytes(), bytes);
    assert_eq!(tx.byte_length(), bytes.len());
}

/// Unsigned inputs serialize a zero-length script and read back unsigned.
#[test]
fn test_unsigned_roundtrip() {
    let tx = Transaction::from_hex(UNSIGNED_TX_HEX).expect("should parse unsigned tx");
    assert!(!tx.inputs[0].is_signed());
    assert_eq!(tx.to_hex(), UNSIGNED_TX_HEX);
}

/// Test serialization of an empty (no inputs, no outputs) transaction.
#[test]
fn test_empty_transaction_serialization() {
    let tx = Transaction::new();
    let bytes = tx.to_bytes();
    // version(4) + varint(0 inputs)(1) + varint(0 outputs)(1) + locktime(4) = 10 bytes
    assert_eq!(hex::encode(&bytes), "01000000000000000000");

    let roundtrip = Transaction::from_bytes(&bytes).expect("should parse empty tx");
    assert_eq!(roundtrip, tx);
}

#[test]
fn test_malformed_bytes_are_errors() {
    let cases = [
        String::new(),
        "0100".to_string(),
        SOURCE_RAW_TX[..100].to_string(),
        SOURCE_RAW_TX[..SOURCE_RAW_TX.len() - 2].to_string(),
        format!("{}deadbeef", SOURCE_RAW_TX),
        // input count of 2^64 - 1 with nothing behind it
        "01000000ffffffffffffffffff".to_string(),
    ];
    for case in cases {
        assert!(
            matches!(
                Transaction::from_hex(&case),
                Err(TransactionError::DeserializationError(_))
            ),
            "{} should fail to parse",
            case
        );
    }
    assert!(matches!(
        Transaction::from_hex("not_valid_hex"),
        Err(TransactionError::DeserializationError(_))
    ));
}

// -----------------------------------------------------------------------
// Transaction ID
// -----------------------------------------------------------------------

/// The txid is sha256d of the serialization, displayed byte-reversed.
#[test]
fn test_tx_id() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).expect("should parse tx");

    let mut reversed = sha256d(&tx.to_bytes());
    reversed.reverse();
    assert_eq!(tx.tx_id_hex(), hex::encode(reversed));
    assert_eq!(tx.tx_id().as_bytes(), &sha256d(&tx.to_bytes()));
    assert_eq!(tx.tx_id_hex(), tx.tx_id_hex(), "txid is stable across calls");
}

/// An input spending `OP_TRUE` with an empty unlocking script reads back
/// unsigned, and estimation works again once the empty script is restored.
#[test]
fn test_empty_unlocking_script_reads_back_unsigned() {
    let op_true = Script::from_bytes(&[0x51]);
    let mut tx = Transaction::new();
    tx.add_input(
        TxInput::new(Outpoint::from_hex(PREV_TXID, 0).unwrap(), 1_000, op_true.clone())
            .with_unlocking_script(Script::new()),
    )
    .add_output(TxOutput::new(op_true, 900));
    assert_eq!(tx.inputs[0].script_type, ScriptType::Unknown);
    assert!(tx.inputs[0].is_signed());
    assert_eq!(tx.estimated_byte_length().unwrap(), tx.byte_length());

    let mut parsed = Transaction::from_bytes(&tx.to_bytes()).unwrap();
    assert_eq!(parsed.to_bytes(), tx.to_bytes());
    assert!(!parsed.inputs[0].is_signed());
    assert!(matches!(
        parsed.estimated_byte_length(),
        Err(TransactionError::UnsupportedOutputType(_))
    ));
    assert!(matches!(
        parsed.check_fee(),
        Err(TransactionError::UnsupportedOutputType(_))
    ));

    parsed.inputs[0].unlocking_script = Some(Script::new());
    assert_eq!(parsed.estimated_byte_length().unwrap(), tx.byte_length());
}

/// The signed vector spends an outpoint whose display txid round trips.
#[test]
fn test_tx_id_matches_spending_outpoint() {
    let spent_txid = "51262307251dc909e2eb759b0ce7bfd927e8d399d7abd5e0998406b60854a393";
    let tx = Transaction::from_hex(SIGNED_TX_HEX).unwrap();
    assert_eq!(tx.inputs[0].outpoint.txid.to_string(), spent_txid);
}

// -----------------------------------------------------------------------
// Sighash
// -----------------------------------------------------------------------

/// Test the sighash preimage structure for a standard SIGHASH_ALL | FORKID.
#[test]
fn test_preimage_structure() {
    let mut tx = Transaction::from_hex(SOURCE_RAW_TX).expect("should parse source tx");
    tx.inputs[0].value = 1500;
    tx.inputs[0].locking_script =
        Script::from_hex("76a914eb0bd5edba389198e73f8efabddfc61666969ff788ac").unwrap();

    let preimages = tx.preimages();
    assert_eq!(preimages.len(), 1);
    let preimage = &preimages[0];

    // version(4) + hashPrevouts(32) + hashSequence(32) + outpoint(36) +
    // scriptCode(1 + 25) + value(8) + nSequence(4) + hashOutputs(32) +
    // locktime(4) + sighashType(4)
    assert_eq!(preimage.len(), 182);
    assert_eq!(&preimage[..4], &1u32.to_le_bytes());
    assert_eq!(&preimage[104..105], &[25]);
    assert_eq!(&preimage[130..138], &1500u64.to_le_bytes());
    assert_eq!(&preimage[preimage.len() - 4..], &SIGHASH_ALL_FORKID.to_le_bytes());
    assert_eq!(tx.digest(0).unwrap(), sha256d(preimage));
    assert_eq!(tx.digests(), vec![sha256d(preimage)]);
}

#[test]
fn test_digest_out_of_range() {
    let tx = Transaction::from_hex(SOURCE_RAW_TX).expect("should parse source tx");
    assert!(matches!(
        tx.digest(99),
        Err(TransactionError::InvalidTransaction(_))
    ));
}

/// With ANYONECANPAY | SINGLE, input 0 commits only to itself and output 0.
#[test]
fn test_sighash_anyonecanpay_single_independence() {
    let flags = SIGHASH_ANYONECANPAY | SIGHASH_SINGLE | SIGHASH_FORKID;
    let tx = two_by_two(flags);
    let base = tx.digest(0).unwrap();

    let mut other_input = tx.clone();
    other_input.inputs[1].sequence = 7;
    other_input.inputs[1].outpoint.vout = 9;
    other_input.inputs[1].value = 1;
    assert_eq!(other_input.digest(0).unwrap(), base);

    let mut other_output = tx.clone();
    other_output.outputs[1].value = 1;
    assert_eq!(other_output.digest(0).unwrap(), base);

    let mut own_output = tx.clone();
    own_output.outputs[0].value = 1;
    assert_ne!(own_output.digest(0).unwrap(), base);

    let mut own_input = tx.clone();
    own_input.inputs[0].sequence = 7;
    assert_ne!(own_input.digest(0).unwrap(), base);
}

/// With ALL, any change to any input or output moves every digest.
#[test]
fn test_sighash_all_commits_to_everything() {
    let tx = two_by_two(SIGHASH_ALL_FORKID);
    let base = tx.digests();

    let mut mutations: Vec<Transaction> = Vec::new();
    let mut m = tx.clone();
    m.inputs[1].sequence = 7;
    mutations.push(m);
    let mut m = tx.clone();
    m.inputs[0].outpoint.vout = 5;
    mutations.push(m);
    let mut m = tx.clone();
    m.outputs[1].value = 1;
    mutations.push(m);
    let mut m = tx.clone();
    m.outputs[0].locking_script = Script::from_bytes(&[0x51]);
    mutations.push(m);
    let mut m = tx.clone();
    m.lock_time = 1;
    mutations.push(m);

    for mutated in mutations {
        let digests = mutated.digests();
        assert_ne!(digests[0], base[0]);
        assert_ne!(digests[1], base[1]);
    }
}

/// NONE signs inputs but no outputs.
#[test]
fn test_sighash_none_ignores_outputs() {
    let tx = two_by_two(SIGHASH_NONE | SIGHASH_FORKID);
    let base = tx.digests();
    let mut m = tx.clone();
    m.outputs[0].value = 1;
    m.outputs.pop();
    assert_eq!(m.digests(), base);

    let mut m = tx.clone();
    m.inputs[1].outpoint.vout = 3;
    assert_ne!(m.digest(0).unwrap(), base[0]);
}

/// SINGLE with no matching output hashes outputs as zero instead of failing.
#[test]
fn test_sighash_single_out_of_range() {
    let key = test_key();
    let mut tx = Transaction::new();
    tx.add_input(p2pkh_input(&key, 0, 1000).with_sighash(SIGHASH_SINGLE | SIGHASH_FORKID));

    let preimage = &tx.preimages()[0];
    let len = preimage.len();
    assert_eq!(&preimage[len - 40..len - 8], &[0u8; 32]);
    // hashSequence is zero for SINGLE too
    assert_eq!(&preimage[36..68], &[0u8; 32]);
    assert!(tx.digest(0).is_ok());

    tx.sign(false).expect("signing should succeed");
    assert!(tx.inputs[0].is_signed());
}

/// Per-flag zeroing of hashPrevouts and hashSequence.
#[test]
fn test_sighash_hash_selection() {
    let zero = [0u8; 32];
    let cases = [
        (SIGHASH_ALL_FORKID, false, false),
        (SIGHASH_ALL_FORKID | SIGHASH_ANYONECANPAY, true, true),
        (SIGHASH_NONE | SIGHASH_FORKID, false, true),
        (SIGHASH_SINGLE | SIGHASH_FORKID, false, true),
    ];
    for (flags, prevouts_zero, sequence_zero) in cases {
        let tx = two_by_two(flags);
        let preimage = &tx.preimages()[0];
        assert_eq!(&preimage[4..36] == zero.as_slice(), prevouts_zero, "flags {:#x}", flags);
        assert_eq!(&preimage[36..68] == zero.as_slice(), sequence_zero, "flags {:#x}", flags);
    }
}

// -----------------------------------------------------------------------
// P2PKH signing
// -----------------------------------------------------------------------

/// Signing the known unsigned transaction reproduces the known signed bytes.
#[test]
fn test_p2pkh_sign_exact_match() {
    let mut tx = Transaction::from_hex(UNSIGNED_TX_HEX).expect("should parse unsigned tx");
    let input = &mut tx.inputs[0];
    input.value = 100_000_000;
    input.locking_script = Script::from_hex(SPENT_LOCKING_SCRIPT).unwrap();
    input.script_type = ScriptType::P2PKH;
    input.private_keys = vec![test_key()];

    tx.sign(false).expect("signing should succeed");
    assert_eq!(tx.to_hex(), SIGNED_TX_HEX);
    assert_eq!(tx.estimated_byte_length().unwrap(), tx.byte_length());
}

/// The same spend built from an `Unspent` signs identically.
#[test]
fn test_p2pkh_sign_from_unspent() {
    let parsed = Transaction::from_hex(UNSIGNED_TX_HEX).unwrap();
    let unspent = Unspent::new(
        parsed.inputs[0].outpoint.txid,
        0,
        100_000_000,
        Script::from_hex(SPENT_LOCKING_SCRIPT).unwrap(),
    )
    .with_private_keys(vec![test_key()]);
    assert_eq!(unspent.script_type, ScriptType::P2PKH);

    let mut tx = Transaction::new();
    tx.add_input(unspent).add_outputs(parsed.outputs.clone());
    tx.sign(false).unwrap();
    assert_eq!(tx.to_hex(), SIGNED_TX_HEX);
}

/// Test P2PKH signing produces a valid, verifiable signature.
#[test]
fn test_p2pkh_valid_signature() {
    let key = test_key();
    let mut tx = Transaction::new();
    tx.add_input(
        TxInput::new(
            Outpoint::from_hex(PREV_TXID, 0).unwrap(),
            15564838601,
            Script::from_hex("76a914c7c6987b6e2345a6b138e3384141520a0fbc18c588ac").unwrap(),
        )
        .with_private_key(key.clone()),
    )
    .add_output(TxOutput::new(
        Script::from_hex("76a91442f9682260509ac80722b1963aec8a896593d16688ac").unwrap(),
        375041432,
    ))
    .add_output(TxOutput::new(
        Script::from_hex("76a914c36538e91213a8100dcb2aed456ade363de8483f88ac").unwrap(),
        15189796941,
    ));

    tx.sign(false).expect("signing should succeed");

    let chunks = tx.inputs[0]
        .unlocking_script
        .as_ref()
        .unwrap()
        .chunks()
        .expect("should decode chunks");
    let sig_bytes = chunks[0].data.as_ref().expect("sig chunk should have data");
    let pubkey_bytes = chunks[1].data.as_ref().expect("pubkey chunk should have data");

    let public_key = PublicKey::from_bytes(pubkey_bytes).expect("should parse public key");
    assert_eq!(public_key, key.pub_key());
    assert_eq!(*sig_bytes.last().unwrap() as u32, SIGHASH_ALL_FORKID);
    let sig = Signature::from_der(&sig_bytes[..sig_bytes.len() - 1])
        .expect("should parse DER signature");
    assert!(sig.is_low_s());
    assert!(public_key.verify(&tx.digest(0).unwrap(), &sig));
}

/// Signed inputs are skipped unless re-signing is forced.
#[test]
fn test_sign_skips_signed_inputs() {
    let key = test_key();
    let placeholder = Script::from_bytes(&[0x51]);
    let mut tx = Transaction::new();
    tx.add_input(p2pkh_input(&key, 0, 1000).with_unlocking_script(placeholder.clone()))
        .add_input(p2pkh_input(&key, 1, 1000))
        .add_output(TxOutput::new(p2pkh_script_for(&key), 1500));

    tx.sign(false).unwrap();
    assert_eq!(tx.inputs[0].unlocking_script.as_ref(), Some(&placeholder));
    assert!(tx.inputs[1].is_signed());
    let once = tx.to_hex();
    tx.sign(false).unwrap();
    assert_eq!(tx.to_hex(), once);

    tx.sign(true).unwrap();
    assert_ne!(tx.inputs[0].unlocking_script.as_ref(), Some(&placeholder));
    // RFC6979 signing is deterministic
    let before = Transaction::from_hex(&once).unwrap();
    assert_eq!(tx.inputs[1].unlocking_script, before.inputs[1].unlocking_script);
}

#[test]
fn test_sign_errors() {
    let mut no_key = Transaction::new();
    no_key.add_input(TxInput::new(
        Outpoint::default(),
        1000,
        p2pkh_script_for(&test_key()),
    ));
    assert!(matches!(
        no_key.sign(false),
        Err(TransactionError::SigningError(_))
    ));

    let mut opaque = Transaction::new();
    opaque.add_input(
        TxInput::new(Outpoint::default(), 1000, Script::from_bytes(&[0x51]))
            .with_private_key(test_key()),
    );
    assert!(matches!(
        opaque.sign(false),
        Err(TransactionError::UnsupportedOutputType(_))
    ));
}

// -----------------------------------------------------------------------
// Fees and change
// -----------------------------------------------------------------------

/// 1000 sats in, 500 out at 1 sat/byte: change covers the rest minus the fee.
#[test]
fn test_add_change_to_input_script() {
    let key = test_key();
    let mut tx = Transaction::with_config(TransactionConfig::default().with_fee_rate(1.0));
    tx.add_input(p2pkh_input(&key, 0, 1000))
        .add_output(TxOutput::new(p2pkh_script_for(&key), 500));

    // 10 envelope + 148 input + 34 output
    assert_eq!(tx.estimated_byte_length().unwrap(), 192);
    assert_eq!(tx.estimated_fee().unwrap(), 192);
    assert_eq!(tx.fee(), 500);

    tx.add_change(None).unwrap();
    assert_eq!(tx.output_count(), 2);
    let change = &tx.outputs[1];
    assert_eq!(change.value, 274);
    assert_eq!(change.script_type, ScriptType::P2PKH);
    assert_eq!(change.locking_script, tx.inputs[0].locking_script);
    assert_eq!(tx.fee(), 226);
    assert_eq!(tx.estimated_fee().unwrap(), 226);

    tx.sign(false).unwrap();
    assert!(tx.byte_length() <= 226);
    assert!(tx.check_fee().is_ok());
}

#[test]
fn test_add_change_to_address() {
    let key = test_key();
    let change_address =
        Address::from_public_key(&key.pub_key(), true, Network::Testnet).to_string();
    let change_address = change_address.as_str();
    let mut tx = Transaction::with_config(TransactionConfig::testnet());
    tx.add_input(p2pkh_input(&key, 0, 10_000))
        .add_output(TxOutput::new(p2pkh_script_for(&key), 5_000));
    tx.add_change(Some(change_address)).unwrap();

    // 226 bytes at 0.5 sat/byte
    assert_eq!(tx.outputs[1].value, 10_000 - 5_000 - 113);
    assert_eq!(
        tx.outputs[1].locking_script,
        Address::from_string(change_address).unwrap().locking_script()
    );

    let mut mainnet = Transaction::new();
    mainnet
        .add_input(p2pkh_input(&key, 0, 10_000))
        .add_output(TxOutput::new(p2pkh_script_for(&key), 5_000));
    assert!(matches!(
        mainnet.add_change(Some(change_address)),
        Err(TransactionError::UnsupportedOutputType(_))
    ));
}

#[test]
fn test_add_change_without_surplus_or_destination() {
    let key = test_key();
    let mut exact = Transaction::with_config(TransactionConfig::default().with_fee_rate(1.0));
    exact
        .add_input(p2pkh_input(&key, 0, 726))
        .add_output(TxOutput::new(p2pkh_script_for(&key), 500));
    // surplus is exactly the fee with change: nothing is added
    exact.add_change(None).unwrap();
    assert_eq!(exact.output_count(), 1);

    let mut opaque = Transaction::new();
    opaque
        .add_input(
            TxInput::new(Outpoint::default(), 10_000, Script::from_bytes(&[0x51]))
                .with_unlocking_script(Script::from_bytes(&[0x51])),
        )
        .add_output(TxOutput::new(p2pkh_script_for(&key), 500));
    assert!(matches!(
        opaque.add_change(None),
        Err(TransactionError::NoChangeDestination)
    ));
}

/// The change output can push the output count varint to three bytes.
#[test]
fn test_add_change_accounts_for_varint_growth() {
    let key = test_key();
    let mut tx = Transaction::with_config(TransactionConfig::default().with_fee_rate(1.0));
    tx.add_input(p2pkh_input(&key, 0, 1_000_000));
    for _ in 0..0xfc {
        tx.add_output(TxOutput::new(p2pkh_script_for(&key), 1));
    }
    let before = tx.estimated_byte_length().unwrap();
    tx.add_change(None).unwrap();
    assert_eq!(tx.output_count(), 0xfd);
    assert_eq!(tx.estimated_byte_length().unwrap(), before + 34 + 2);
    assert_eq!(tx.fee() as u64, tx.estimated_fee().unwrap());
}

#[test]
fn test_data_output_fee() {
    let chunks: [&[u8]; 1] = [b"hello"];
    let mut tx = Transaction::new();
    tx.add_output(TxOutput::data(&chunks).unwrap());
    // 10 + 8 + 1 + 8
    assert_eq!(tx.estimated_byte_length().unwrap(), 27);
    assert_eq!(tx.fee(), 0);
    assert!(matches!(
        tx.check_fee(),
        Err(TransactionError::InsufficientFunds { required: 14, available: 0 })
    ));
}

// -----------------------------------------------------------------------
// Unspents
// -----------------------------------------------------------------------

#[test]
fn test_to_unspents_skip_data_outputs() {
    let key = test_key();
    let chunks: [&[u8]; 1] = [b"hello"];
    let mut tx = Transaction::new();
    tx.add_input(p2pkh_input(&key, 0, 10_000))
        .add_output(TxOutput::data(&chunks).unwrap())
        .add_output(TxOutput::new(p2pkh_script_for(&key), 5_000));
    tx.sign(false).unwrap();

    assert_eq!(tx.to_unspent(0).unwrap(), None);
    let unspent = tx.to_unspent(1).unwrap().expect("P2PKH output is spendable");
    assert_eq!(unspent.txid, tx.tx_id());
    assert_eq!(unspent.vout, 1);
    assert_eq!(unspent.value, 5_000);
    assert_eq!(unspent.script_type, ScriptType::P2PKH);

    assert_eq!(tx.to_unspents(None).unwrap(), vec![unspent.clone()]);
    assert_eq!(tx.to_unspents(Some(&[1, 0])).unwrap(), vec![unspent.clone()]);
    // an empty selection means every output
    assert_eq!(tx.to_unspents(Some(&[])).unwrap(), vec![unspent]);
    assert!(matches!(
        tx.to_unspent(2),
        Err(TransactionError::InvalidTransaction(_))
    ));
}

// -----------------------------------------------------------------------
// Broadcast
// -----------------------------------------------------------------------

#[derive(Default)]
struct RecordingBroadcaster {
    seen: RefCell<Vec<Vec<u8>>>,
}

impl Broadcaster for RecordingBroadcaster {
    fn broadcast(&self, raw_tx: &[u8]) -> Result<BroadcastSuccess, BroadcastFailure> {
        self.seen.borrow_mut().push(raw_tx.to_vec());
        let mut txid = sha256d(raw_tx);
        txid.reverse();
        Ok(BroadcastSuccess {
            txid: hex::encode(txid),
            message: "SEEN_ON_NETWORK".to_string(),
        })
    }
}

struct UnavailableBroadcaster;

impl AsyncBroadcaster for UnavailableBroadcaster {
    async fn broadcast_async(&self, _raw_tx: &[u8]) -> Result<BroadcastSuccess, BroadcastFailure> {
        Err(BroadcastFailure::new("503", "Failed to connect to ARC service"))
    }
}

fn funded_tx() -> Transaction {
    let key = test_key();
    let mut tx = Transaction::new();
    tx.add_input(p2pkh_input(&key, 0, 10_000))
        .add_output(TxOutput::new(p2pkh_script_for(&key), 9_000));
    tx.sign(false).unwrap();
    tx
}

#[test]
fn test_broadcast_passes_serialized_bytes() {
    let tx = funded_tx();
    let broadcaster = RecordingBroadcaster::default();
    let success = tx.broadcast(&broadcaster, true).expect("fee is sufficient");
    assert_eq!(success.txid, tx.tx_id_hex());
    assert_eq!(broadcaster.seen.borrow().as_slice(), &[tx.to_bytes()]);
}

#[test]
fn test_broadcast_fee_check() {
    let key = test_key();
    let mut tx = Transaction::new();
    tx.add_input(p2pkh_input(&key, 0, 1_000))
        .add_output(TxOutput::new(p2pkh_script_for(&key), 1_000));
    tx.sign(false).unwrap();
    let estimated = tx.estimated_fee().unwrap();

    let broadcaster = RecordingBroadcaster::default();
    match tx.broadcast(&broadcaster, true) {
        Err(TransactionError::InsufficientFunds { required, available }) => {
            assert_eq!(required, 1_000 + estimated);
            assert_eq!(available, 1_000);
        }
        other => panic!("expected InsufficientFunds, got {:?}", other),
    }
    assert!(broadcaster.seen.borrow().is_empty());

    assert!(tx.broadcast(&broadcaster, false).is_ok());
    assert_eq!(broadcaster.seen.borrow().len(), 1);
}

#[tokio::test]
async fn test_broadcast_async_failure_is_forwarded() {
    let tx = funded_tx();
    match tx.broadcast_async(&UnavailableBroadcaster, true).await {
        Err(TransactionError::Broadcast(failure)) => {
            assert_eq!(failure.code, "503");
            assert_eq!(failure.description, "Failed to connect to ARC service");
        }
        other => panic!("expected a broadcast failure, got {:?}", other),
    }
}
