//! ECDSA signature with strict DER serialization.
//!
//! Encoding always emits the canonical low-S form: when `s > n/2` the value
//! `n - s` is written instead, which verifies identically and removes the
//! malleability of the second form. Decoding checks the DER framing only;
//! scalar range is enforced when verifying.

use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa;

use crate::ec::public_key::PublicKey;
use crate::PrimitivesError;

/// The secp256k1 group order n, big-endian.
pub const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// `floor(n / 2)`, the largest canonical `s`.
pub const HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

const DER_SEQUENCE: u8 = 0x30;
const DER_INTEGER: u8 = 0x02;

/// An ECDSA `(r, s)` pair, each held as 32 big-endian bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    /// Build a signature from raw components. No normalization is applied.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// The R component.
    pub fn r(&self) -> &[u8; 32] {
        &self.r
    }

    /// The S component as stored (possibly high).
    pub fn s(&self) -> &[u8; 32] {
        &self.s
    }

    /// `true` when `s <= n/2`.
    pub fn is_low_s(&self) -> bool {
        self.s <= HALF_ORDER
    }

    /// Return the signature with `s` replaced by `n - s` when it is high.
    pub fn to_low_s(&self) -> Signature {
        if self.is_low_s() {
            self.clone()
        } else {
            Signature {
                r: self.r,
                s: subtract_from_order(&self.s),
            }
        }
    }

    /// Parse a strict DER signature.
    ///
    /// Layout: `30 <len> 02 <rlen> <r> 02 <slen> <s>` where `len` must cover
    /// the remaining bytes exactly and `s` must end at the last byte.
    pub fn from_der(bytes: &[u8]) -> Result<Self, PrimitivesError> {
        let bad = |msg: &str| PrimitivesError::InvalidSignatureEncoding(msg.to_string());

        if bytes.len() < 8 {
            return Err(bad("too short"));
        }
        if bytes[0] != DER_SEQUENCE {
            return Err(bad("missing sequence tag"));
        }
        if bytes[1] as usize != bytes.len() - 2 {
            return Err(PrimitivesError::InvalidSignatureEncoding(format!(
                "declared length {} does not match {} remaining bytes",
                bytes[1],
                bytes.len() - 2
            )));
        }

        let (r_bytes, rest) = read_der_integer(&bytes[2..], "r")?;
        let (s_bytes, rest) = read_der_integer(rest, "s")?;
        if !rest.is_empty() {
            return Err(bad("trailing bytes after s"));
        }

        Ok(Signature {
            r: to_32_bytes(r_bytes)?,
            s: to_32_bytes(s_bytes)?,
        })
    }

    /// Serialize as DER with canonical low-S.
    pub fn to_der(&self) -> Vec<u8> {
        let s = self.to_low_s().s;
        let rb = canonicalize_int(&self.r);
        let sb = canonicalize_int(&s);

        let body_len = 4 + rb.len() + sb.len();
        let mut out = Vec::with_capacity(2 + body_len);
        out.push(DER_SEQUENCE);
        out.push(body_len as u8);
        out.push(DER_INTEGER);
        out.push(rb.len() as u8);
        out.extend_from_slice(&rb);
        out.push(DER_INTEGER);
        out.push(sb.len() as u8);
        out.extend_from_slice(&sb);
        out
    }

    /// Verify against a 32-byte digest.
    ///
    /// A high `s` is normalized first; zero or out-of-range scalars fail.
    pub fn verify(&self, digest: &[u8; 32], pub_key: &PublicKey) -> bool {
        match self.to_k256() {
            Ok(sig) => pub_key.verifying_key().verify_prehash(digest, &sig).is_ok(),
            Err(_) => false,
        }
    }

    pub(crate) fn to_k256(&self) -> Result<ecdsa::Signature, PrimitivesError> {
        let low = self.to_low_s();
        ecdsa::Signature::from_scalars(k256::FieldBytes::from(low.r), k256::FieldBytes::from(low.s))
            .map_err(|e| PrimitivesError::InvalidSignature(e.to_string()))
    }

    pub(crate) fn from_k256(sig: &ecdsa::Signature) -> Self {
        let (r_bytes, s_bytes) = sig.split_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&r_bytes);
        s.copy_from_slice(&s_bytes);
        Signature { r, s }
    }
}

/// Split one `02 <len> <bytes>` INTEGER off the front of `data`.
fn read_der_integer<'a>(
    data: &'a [u8],
    name: &str,
) -> Result<(&'a [u8], &'a [u8]), PrimitivesError> {
    if data.len() < 2 {
        return Err(PrimitivesError::InvalidSignatureEncoding(format!(
            "truncated before {}",
            name
        )));
    }
    if data[0] != DER_INTEGER {
        return Err(PrimitivesError::InvalidSignatureEncoding(format!(
            "missing integer tag for {}",
            name
        )));
    }
    let len = data[1] as usize;
    if len == 0 || 2 + len > data.len() {
        return Err(PrimitivesError::InvalidSignatureEncoding(format!(
            "bad length {} for {}",
            len, name
        )));
    }
    Ok((&data[2..2 + len], &data[2 + len..]))
}

/// Minimal big-endian INTEGER body: leading zeros stripped, then one zero
/// byte prepended if the high bit is set.
fn canonicalize_int(val: &[u8; 32]) -> Vec<u8> {
    let start = val.iter().position(|&b| b != 0).unwrap_or(31);
    let trimmed = &val[start..];
    let mut out = Vec::with_capacity(trimmed.len() + 1);
    if trimmed[0] & 0x80 != 0 {
        out.push(0x00);
    }
    out.extend_from_slice(trimmed);
    out
}

/// Left-pad an INTEGER body to 32 bytes, dropping sign padding.
fn to_32_bytes(bytes: &[u8]) -> Result<[u8; 32], PrimitivesError> {
    let start = bytes
        .iter()
        .position(|&b| b != 0)
        .unwrap_or(bytes.len());
    let trimmed = &bytes[start..];
    if trimmed.len() > 32 {
        return Err(PrimitivesError::InvalidSignatureEncoding(format!(
            "integer of {} bytes exceeds 32",
            trimmed.len()
        )));
    }
    let mut out = [0u8; 32];
    out[32 - trimmed.len()..].copy_from_slice(trimmed);
    Ok(out)
}

/// `n - val` over 32-byte big-endian integers.
fn subtract_from_order(val: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = CURVE_ORDER[i] as i16 - val[i] as i16 - borrow;
        borrow = 0;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        }
        result[i] = diff as u8;
    }
    result
}
