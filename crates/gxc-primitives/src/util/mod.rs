//! Graphene unsigned variable-length integers and a cursor over wire data.
//!
//! Graphene packs counts, lengths, object instances and operation tags as
//! unsigned LEB128: seven payload bits per byte, least significant group
//! first, with the high bit set on every byte except the last. This is a
//! different layout from the Bitcoin-style `CompactSize` prefix encoding.

use crate::PrimitivesError;

/// Maximum encoded length of a `u64` (ceil(64 / 7)).
pub const MAX_VARUINT_LEN: usize = 10;

/// A Graphene unsigned varint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarUint(pub u64);

impl VarUint {
    /// Decode a varint from the start of a byte slice.
    ///
    /// # Arguments
    /// * `data` - Byte slice starting with a varint encoding.
    ///
    /// # Returns
    /// A tuple of `(VarUint, bytes_consumed)`, `UnexpectedEof` if the slice
    /// ends before the final byte, or `VarIntTooLarge` if the value
    /// overflows 64 bits.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize), PrimitivesError> {
        let mut value: u64 = 0;
        for (i, byte) in data.iter().enumerate() {
            if i >= MAX_VARUINT_LEN {
                return Err(PrimitivesError::VarIntTooLarge);
            }
            let bits = u64::from(byte & 0x7f);
            let shift = 7 * i as u32;
            if shift == 63 && bits > 1 {
                return Err(PrimitivesError::VarIntTooLarge);
            }
            value |= bits << shift;
            if byte & 0x80 == 0 {
                return Ok((VarUint(value), i + 1));
            }
        }
        Err(PrimitivesError::UnexpectedEof)
    }

    /// Return the wire-format byte length of this varint.
    ///
    /// # Returns
    /// A value between 1 and 10.
    pub fn length(&self) -> usize {
        let bits = 64 - self.0.leading_zeros() as usize;
        bits.max(1).div_ceil(7)
    }

    /// Encode the varint into a new byte vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = [0u8; MAX_VARUINT_LEN];
        let n = self.put_bytes(&mut buf);
        buf[..n].to_vec()
    }

    /// Write the varint into a destination buffer.
    ///
    /// The buffer must be at least `self.length()` bytes long.
    ///
    /// # Returns
    /// The number of bytes written.
    pub fn put_bytes(&self, dst: &mut [u8]) -> usize {
        let mut v = self.0;
        let mut i = 0;
        loop {
            let group = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                dst[i] = group;
                return i + 1;
            }
            dst[i] = group | 0x80;
            i += 1;
        }
    }

    /// Return the underlying u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for VarUint {
    fn from(v: u64) -> Self {
        VarUint(v)
    }
}

impl From<usize> for VarUint {
    fn from(v: usize) -> Self {
        VarUint(v as u64)
    }
}

/// A cursor over Graphene wire data.
///
/// Reads fixed-width little-endian integers, varints and raw byte runs,
/// failing with `UnexpectedEof` instead of reading past the end.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    /// Read `n` bytes and advance the position.
    ///
    /// # Returns
    /// A byte slice of length `n`, or `UnexpectedEof` if fewer remain.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], PrimitivesError> {
        if n > self.remaining() {
            return Err(PrimitivesError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, PrimitivesError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Read a little-endian u16.
    pub fn read_u16_le(&mut self) -> Result<u16, PrimitivesError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32, PrimitivesError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian u64.
    pub fn read_u64_le(&mut self) -> Result<u64, PrimitivesError> {
        let bytes = self.read_bytes(8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(arr))
    }

    /// Read an unsigned varint.
    pub fn read_uvarint(&mut self) -> Result<VarUint, PrimitivesError> {
        let (value, used) = VarUint::from_bytes(&self.data[self.pos..])?;
        self.pos += used;
        Ok(value)
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}
