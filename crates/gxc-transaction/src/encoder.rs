//! Sticky-error byte encoder for Graphene's canonical binary format.
//!
//! Composite values append their fields in protocol order without checking
//! each write. The first writer failure is recorded; every later call on
//! the same encoder is a no-op and [`Encoder::finish`] reports the failure,
//! so a truncated stream is never returned as a success.
//!
//! # Primitive rules
//!
//! | Value             | Encoding                          |
//! |-------------------|-----------------------------------|
//! | integers          | fixed width, little-endian        |
//! | counts / lengths  | unsigned varint (LEB128)          |
//! | `bool`            | 1 byte                            |
//! | `str` / `String`  | varint length + UTF-8 bytes       |
//! | `[T]` / `Vec<T>`  | varint count + items              |
//! | `Option<T>`       | presence byte, then the value     |

use std::io::Write;

use gxc_primitives::util::{VarUint, MAX_VARUINT_LEN};

use crate::TransactionError;

/// A value that can append its canonical bytes to an [`Encoder`].
///
/// Field order inside composite implementations is fixed by the chain and
/// documented on each type.
pub trait Encodable {
    /// Append this value's canonical bytes.
    fn encode<W: Write>(&self, enc: &mut Encoder<W>);
}

/// Canonical byte encoder over any `io::Write` destination.
pub struct Encoder<W: Write> {
    writer: W,
    offset: usize,
    error: Option<TransactionError>,
}

impl<W: Write> Encoder<W> {
    /// Create an encoder writing to `writer`.
    pub fn new(writer: W) -> Self {
        Encoder {
            writer,
            offset: 0,
            error: None,
        }
    }

    /// Append raw bytes with no length prefix.
    pub fn write_raw(&mut self, bytes: &[u8]) -> &mut Self {
        if self.error.is_some() {
            return self;
        }
        match self.writer.write_all(bytes) {
            Ok(()) => self.offset += bytes.len(),
            Err(source) => {
                self.error = Some(TransactionError::Encoding {
                    offset: self.offset,
                    source,
                })
            }
        }
        self
    }

    /// Append a single byte.
    pub fn write_u8(&mut self, val: u8) -> &mut Self {
        self.write_raw(&[val])
    }

    /// Append a little-endian u16.
    pub fn write_u16(&mut self, val: u16) -> &mut Self {
        self.write_raw(&val.to_le_bytes())
    }

    /// Append a little-endian u32.
    pub fn write_u32(&mut self, val: u32) -> &mut Self {
        self.write_raw(&val.to_le_bytes())
    }

    /// Append a little-endian u64.
    pub fn write_u64(&mut self, val: u64) -> &mut Self {
        self.write_raw(&val.to_le_bytes())
    }

    /// Append a little-endian i64.
    pub fn write_i64(&mut self, val: i64) -> &mut Self {
        self.write_raw(&val.to_le_bytes())
    }

    /// Append an unsigned varint.
    pub fn write_uvarint(&mut self, val: u64) -> &mut Self {
        let mut buf = [0u8; MAX_VARUINT_LEN];
        let n = VarUint(val).put_bytes(&mut buf);
        self.write_raw(&buf[..n])
    }

    /// Append a boolean as one byte.
    pub fn write_bool(&mut self, val: bool) -> &mut Self {
        self.write_u8(u8::from(val))
    }

    /// Append a varint length followed by the bytes.
    pub fn write_buffer(&mut self, bytes: &[u8]) -> &mut Self {
        self.write_uvarint(bytes.len() as u64).write_raw(bytes)
    }

    /// Append a varint length followed by the UTF-8 bytes of `s`.
    pub fn write_str(&mut self, s: &str) -> &mut Self {
        self.write_buffer(s.as_bytes())
    }

    /// Append a value through its own canonical encoding.
    pub fn encode<T: Encodable + ?Sized>(&mut self, value: &T) -> &mut Self {
        if self.error.is_none() {
            value.encode(self);
        }
        self
    }

    /// Record a non-I/O failure. Only the first failure is kept.
    pub fn fail(&mut self, err: TransactionError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Whether a failure has been recorded.
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Number of bytes written so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Consume the encoder, returning the writer or the first failure.
    pub fn finish(self) -> Result<W, TransactionError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.writer),
        }
    }
}

/// Encode a value into a fresh byte vector.
pub fn to_bytes<T: Encodable + ?Sized>(value: &T) -> Result<Vec<u8>, TransactionError> {
    let mut enc = Encoder::new(Vec::new());
    enc.encode(value);
    enc.finish()
}

impl Encodable for bool {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_bool(*self);
    }
}

impl Encodable for u8 {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_u8(*self);
    }
}

impl Encodable for u16 {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_u16(*self);
    }
}

impl Encodable for u32 {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_u32(*self);
    }
}

impl Encodable for u64 {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_u64(*self);
    }
}

impl Encodable for i64 {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_i64(*self);
    }
}

impl Encodable for str {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_str(self);
    }
}

impl Encodable for String {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_str(self);
    }
}

impl<T: Encodable> Encodable for [T] {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.write_uvarint(self.len() as u64);
        for item in self {
            enc.encode(item);
        }
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        enc.encode(self.as_slice());
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        match self {
            Some(value) => {
                enc.write_u8(1).encode(value);
            }
            None => {
                enc.write_u8(0);
            }
        }
    }
}

impl<T: Encodable + ?Sized> Encodable for &T {
    fn encode<W: Write>(&self, enc: &mut Encoder<W>) {
        (**self).encode(enc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Writer that accepts `limit` bytes, then fails every write.
    struct LimitedWriter {
        buf: Vec<u8>,
        limit: usize,
        calls_after_failure: usize,
    }

    impl Write for LimitedWriter {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            if self.buf.len() + data.len() > self.limit {
                self.calls_after_failure += 1;
                return Err(io::Error::new(io::ErrorKind::WriteZero, "full"));
            }
            self.buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fixed_width_little_endian() {
        let mut enc = Encoder::new(Vec::new());
        enc.write_u16(0x0102).write_u32(0x03040506).write_i64(-2);
        let bytes = enc.finish().unwrap();
        assert_eq!(hex::encode(bytes), "020106050403feffffffffffffff");
    }

    #[test]
    fn test_strings_and_bools() {
        let mut enc = Encoder::new(Vec::new());
        enc.encode("gxc").encode(&true).encode(&false);
        assert_eq!(hex::encode(enc.finish().unwrap()), "036778630100");
    }

    #[test]
    fn test_sequences_and_options() {
        let values: Vec<u16> = vec![1, 2];
        assert_eq!(hex::encode(to_bytes(&values).unwrap()), "0201000200");
        assert_eq!(hex::encode(to_bytes(&Some(7u8)).unwrap()), "0107");
        assert_eq!(hex::encode(to_bytes(&None::<u8>).unwrap()), "00");
    }

    #[test]
    fn test_error_is_sticky() {
        let writer = LimitedWriter {
            buf: Vec::new(),
            limit: 3,
            calls_after_failure: 0,
        };
        let mut enc = Encoder::new(writer);
        enc.write_u16(1).write_u32(2).write_u8(3).write_str("later");
        assert!(enc.is_failed());
        assert_eq!(enc.offset(), 2);
        match enc.finish() {
            Err(TransactionError::Encoding { offset, .. }) => assert_eq!(offset, 2),
            other => panic!("expected encoding error, got {:?}", other.map(|w| w.buf)),
        }
    }

    #[test]
    fn test_writes_after_failure_do_not_reach_writer() {
        let writer = LimitedWriter {
            buf: Vec::new(),
            limit: 0,
            calls_after_failure: 0,
        };
        let mut enc = Encoder::new(writer);
        enc.write_u8(1);
        enc.write_u8(2).write_u64(3);
        // Only the first failing write touched the writer.
        let Encoder { writer, .. } = enc;
        assert_eq!(writer.calls_after_failure, 1);
    }

    #[test]
    fn test_fail_keeps_first_error() {
        let mut enc = Encoder::new(Vec::new());
        enc.fail(TransactionError::UnsupportedOperation { tag: 9 });
        enc.fail(TransactionError::MemoChecksumMismatch);
        enc.write_u8(1);
        assert_eq!(enc.offset(), 0);
        assert!(matches!(
            enc.finish(),
            Err(TransactionError::UnsupportedOperation { tag: 9 })
        ));
    }
}
