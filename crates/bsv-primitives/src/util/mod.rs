//! Binary codec for the wire format.
//!
//! Canonical variable-length integers plus a cursor reader and an append-only
//! writer for the little-endian fixed-width fields used by transactions.
//! Reads are permissive (any of the four varint widths is accepted for any
//! value); writes always pick the shortest form.

use crate::PrimitivesError;

/// Marker byte for a 2-byte varint payload.
const VARINT_U16: u8 = 0xfd;
/// Marker byte for a 4-byte varint payload.
const VARINT_U32: u8 = 0xfe;
/// Marker byte for an 8-byte varint payload.
const VARINT_U64: u8 = 0xff;

// ---------------------------------------------------------------------------
// VarInt
// ---------------------------------------------------------------------------

/// A variable-length unsigned integer as used for counts and script lengths.
///
/// Encoded as 1, 3, 5 or 9 bytes depending on magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Decode a varint from the front of `data`.
    ///
    /// Non-minimal encodings are accepted, so `fd 00 00` decodes to zero.
    ///
    /// # Returns
    /// The value and the number of bytes consumed, or `UnexpectedEof` if the
    /// payload announced by the marker byte is truncated.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), PrimitivesError> {
        let mut reader = BsvReader::new(data);
        let value = reader.read_varint()?;
        Ok((value, reader.position()))
    }

    /// Wire length of the canonical encoding.
    pub fn length(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    /// Encode canonically into a new vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.length());
        self.append_to(&mut buf);
        buf
    }

    /// Append the canonical encoding to `buf`.
    pub fn append_to(&self, buf: &mut Vec<u8>) {
        let v = self.0;
        match self.length() {
            1 => buf.push(v as u8),
            3 => {
                buf.push(VARINT_U16);
                buf.extend_from_slice(&(v as u16).to_le_bytes());
            }
            5 => {
                buf.push(VARINT_U32);
                buf.extend_from_slice(&(v as u32).to_le_bytes());
            }
            _ => {
                buf.push(VARINT_U64);
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
    }

    /// The underlying integer.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VarInt {
    fn from(v: u64) -> Self {
        VarInt(v)
    }
}

impl From<usize> for VarInt {
    fn from(v: usize) -> Self {
        VarInt(v as u64)
    }
}

/// Canonically encode `n` as a varint.
pub fn write_varint(n: u64) -> Vec<u8> {
    VarInt(n).to_bytes()
}

/// Decode a varint from the front of `data`, returning the value and the
/// number of bytes consumed.
pub fn read_varint(data: &[u8]) -> Result<(u64, usize), PrimitivesError> {
    VarInt::from_bytes(data).map(|(v, n)| (v.0, n))
}

/// Byte length of the canonical varint encoding of `n`.
pub fn varint_len(n: u64) -> usize {
    VarInt(n).length()
}

// ---------------------------------------------------------------------------
// BsvReader
// ---------------------------------------------------------------------------

/// Cursor over a borrowed byte slice.
///
/// Every read is bounds-checked and fails with `UnexpectedEof` instead of
/// panicking, so malformed input surfaces as an error.
pub struct BsvReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BsvReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        BsvReader { data, pos: 0 }
    }

    /// Read exactly `n` bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(PrimitivesError::UnexpectedEof)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PrimitivesError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Read a little-endian u64.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Read a varint in any of its four widths.
    pub fn read_varint(&mut self) -> Result<VarInt, PrimitivesError> {
        let value = match self.read_u8()? {
            VARINT_U64 => self.read_u64_le()?,
            VARINT_U32 => self.read_u32_le()? as u64,
            VARINT_U16 => self.read_u16_le()? as u64,
            b => b as u64,
        };
        Ok(VarInt(value))
    }

    /// Read a varint length followed by that many bytes.
    pub fn read_var_bytes(&mut self) -> Result<&'a [u8], PrimitivesError> {
        let len = self.read_varint()?.0;
        let len = usize::try_from(len).map_err(|_| PrimitivesError::UnexpectedEof)?;
        self.read_bytes(len)
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

// ---------------------------------------------------------------------------
// BsvWriter
// ---------------------------------------------------------------------------

/// Append-only little-endian writer.
#[derive(Debug, Default)]
pub struct BsvWriter {
    buf: Vec<u8>,
}

impl BsvWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        BsvWriter { buf: Vec::new() }
    }

    /// Create an empty writer with preallocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        BsvWriter {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append one byte.
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    /// Append a little-endian u16.
    pub fn write_u16_le(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u32.
    pub fn write_u32_le(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a little-endian u64.
    pub fn write_u64_le(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Append a canonical varint.
    pub fn write_varint(&mut self, varint: VarInt) {
        varint.append_to(&mut self.buf);
    }

    /// Append a varint length prefix followed by `bytes`.
    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_varint(VarInt::from(bytes.len()));
        self.write_bytes(bytes);
    }

    /// Consume the writer and return its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Borrow the bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_varint_boundaries() {
        let cases: Vec<(u64, Vec<u8>)> = vec![
            (0, vec![0x00]),
            (0xfc, vec![0xfc]),
            (0xfd, vec![0xfd, 0xfd, 0x00]),
            (0xffff, vec![0xfd, 0xff, 0xff]),
            (0x1_0000, vec![0xfe, 0x00, 0x00, 0x01, 0x00]),
            (0xffff_ffff, vec![0xfe, 0xff, 0xff, 0xff, 0xff]),
            (0x1_0000_0000, vec![0xff, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00]),
            (u64::MAX, vec![0xff; 9]),
        ];
        for (value, expected) in cases {
            assert_eq!(write_varint(value), expected, "encoding of {:#x}", value);
            assert_eq!(varint_len(value), expected.len(), "length of {:#x}", value);
        }
    }

    #[test]
    fn test_varint_canonical_after_reread() {
        for n in [0u64, 0xfc, 0xfd, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000] {
            let encoded = write_varint(n);
            let (decoded, used) = read_varint(&encoded).unwrap();
            assert_eq!(used, encoded.len());
            assert_eq!(write_varint(decoded), encoded);
        }
    }

    /// Over-long encodings are accepted on read.
    #[test]
    fn test_read_varint_non_minimal() {
        assert_eq!(read_varint(&[0xfd, 0x00, 0x00]).unwrap(), (0, 3));
        assert_eq!(read_varint(&[0xfe, 0x05, 0x00, 0x00, 0x00]).unwrap(), (5, 5));
        assert_eq!(read_varint(&[0xff, 1, 0, 0, 0, 0, 0, 0, 0]).unwrap(), (1, 9));
    }

    #[test]
    fn test_read_varint_truncated() {
        assert!(matches!(read_varint(&[]), Err(PrimitivesError::UnexpectedEof)));
        assert!(matches!(read_varint(&[0xfd, 0x01]), Err(PrimitivesError::UnexpectedEof)));
        assert!(matches!(read_varint(&[0xff, 0, 0, 0]), Err(PrimitivesError::UnexpectedEof)));
    }

    #[test]
    fn test_reader_writer_roundtrip() {
        let mut writer = BsvWriter::new();
        writer.write_u8(0x42);
        writer.write_u16_le(0x1234);
        writer.write_u32_le(0xDEADBEEF);
        writer.write_u64_le(0x0102030405060708);
        writer.write_varint(VarInt(300));
        writer.write_var_bytes(b"hello");

        let data = writer.into_bytes();
        let mut reader = BsvReader::new(&data);

        assert_eq!(reader.read_u8().unwrap(), 0x42);
        assert_eq!(reader.read_u16_le().unwrap(), 0x1234);
        assert_eq!(reader.read_u32_le().unwrap(), 0xDEADBEEF);
        assert_eq!(reader.read_u64_le().unwrap(), 0x0102030405060708);
        assert_eq!(reader.read_varint().unwrap(), VarInt(300));
        assert_eq!(reader.read_var_bytes().unwrap(), b"hello");
        assert_eq!(reader.remaining(), 0);
        assert_eq!(reader.position(), data.len());
    }

    #[test]
    fn test_read_var_bytes_length_past_end() {
        let mut reader = BsvReader::new(&[0x05, 0x01, 0x02]);
        assert!(reader.read_var_bytes().is_err());
    }

    #[test]
    fn test_read_bytes_overflowing_length() {
        let mut reader = BsvReader::new(&[0x01]);
        reader.read_u8().unwrap();
        assert!(reader.read_bytes(usize::MAX).is_err());
    }
}
