//! Fixed-width little-endian record encoding shared by the token and
//! index file formats.

use std::io::{self, Read, Write};

/// Size of the staging buffer used when streaming records to disk
const WRITE_CHUNK: usize = 64 * 1024;

/// An unsigned integer stored as a fixed-width little-endian record.
///
/// Only `u16` (tokens) and `u64` (suffix array offsets) are records.
pub trait Record: Copy + Send + Sync + 'static + private::Sealed {
    /// Bytes per record
    const WIDTH: usize;

    fn write_le(self, buf: &mut Vec<u8>);

    fn read_le(bytes: &[u8]) -> Self;
}

mod private {
    pub trait Sealed {}
    impl Sealed for u16 {}
    impl Sealed for u64 {}
}

impl Record for u16 {
    const WIDTH: usize = 2;

    #[inline]
    fn write_le(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        u16::from_le_bytes([bytes[0], bytes[1]])
    }
}

impl Record for u64 {
    const WIDTH: usize = 8;

    #[inline]
    fn write_le(self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[..8]);
        u64::from_le_bytes(raw)
    }
}

/// Write records in little-endian format, batching to reduce syscalls
pub fn write_records<W, R, I>(writer: &mut W, records: I) -> io::Result<u64>
where
    W: Write,
    R: Record,
    I: IntoIterator<Item = R>,
{
    let mut buffer = Vec::with_capacity(WRITE_CHUNK);
    let mut written = 0u64;
    for record in records {
        record.write_le(&mut buffer);
        written += 1;
        if buffer.len() >= WRITE_CHUNK {
            writer.write_all(&buffer)?;
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        writer.write_all(&buffer)?;
    }
    Ok(written)
}

/// Read up to `limit` little-endian records from `reader`.
///
/// Stops cleanly at end of input. A trailing partial record is an
/// `InvalidData` error.
pub fn read_records<Rd, R>(reader: &mut Rd, limit: Option<usize>) -> io::Result<Vec<R>>
where
    Rd: Read,
    R: Record,
{
    let mut out = Vec::new();
    let mut chunk = vec![0u8; WRITE_CHUNK - WRITE_CHUNK % R::WIDTH];
    let mut carry = 0usize;
    let wanted = limit.unwrap_or(usize::MAX);

    while out.len() < wanted {
        let read = reader.read(&mut chunk[carry..])?;
        if read == 0 {
            break;
        }
        let filled = carry + read;
        let whole = filled - filled % R::WIDTH;
        for record in chunk[..whole].chunks_exact(R::WIDTH) {
            if out.len() == wanted {
                break;
            }
            out.push(R::read_le(record));
        }
        carry = filled - whole;
        chunk.copy_within(whole..filled, 0);
    }

    if out.len() < wanted && carry != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("trailing {} bytes do not form a {}-byte record", carry, R::WIDTH),
        ));
    }
    Ok(out)
}
