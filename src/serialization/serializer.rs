use super::{V1_COOKIE, V1_HEADER_SIZE};
use crate::{Counter, Histogram};
use byteorder::{BigEndian, WriteBytesExt};
use std::io::{self, Write};
use std::{error, fmt};

/// Errors that occur during serialization.
#[derive(Debug)]
pub enum SerializeError {
    /// A count above `i64::max_value()` cannot be zig-zag encoded, and
    /// therefore cannot be serialized.
    CountNotSerializable,
    /// Internal size calculations cannot be represented in `usize`.
    UsizeTypeTooSmall,
    /// An i/o operation failed.
    IoError(io::Error),
}

impl From<io::Error> for SerializeError {
    fn from(e: io::Error) -> Self {
        SerializeError::IoError(e)
    }
}

impl fmt::Display for SerializeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SerializeError::CountNotSerializable => write!(
                f,
                "A count above i64::max_value() cannot be zig-zag encoded"
            ),
            SerializeError::UsizeTypeTooSmall => {
                write!(f, "Internal calculations cannot be represented in `usize`")
            }
            SerializeError::IoError(e) => write!(f, "An i/o operation failed: {}", e),
        }
    }
}

impl error::Error for SerializeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            SerializeError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// Serializer for the V1 binary format.
pub struct Serializer {
    buf: Vec<u8>,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    /// Create a new serializer.
    pub fn new() -> Serializer {
        Serializer { buf: Vec::new() }
    }

    /// Serialize the histogram into the provided writer. Returns the number
    /// of bytes written, or an error.
    pub fn serialize<T: Counter, W: Write>(
        &mut self,
        h: &Histogram<T>,
        writer: &mut W,
    ) -> Result<usize, SerializeError> {
        self.buf.clear();
        let max_size = max_encoded_size(h).ok_or(SerializeError::UsizeTypeTooSmall)?;
        self.buf.reserve(max_size);

        self.buf.write_u32::<BigEndian>(V1_COOKIE)?;
        // placeholder for payload length
        self.buf.write_u32::<BigEndian>(0)?;
        self.buf
            .write_u32::<BigEndian>(u32::from(h.significant_value_digits))?;
        self.buf
            .write_u64::<BigEndian>(h.lowest_discernible_value)?;
        self.buf.write_u64::<BigEndian>(h.highest_trackable_value)?;
        self.buf.write_u64::<BigEndian>(h.observed_min)?;
        self.buf.write_u64::<BigEndian>(h.observed_max)?;

        debug_assert_eq!(V1_HEADER_SIZE, self.buf.len());

        self.buf.resize(max_size, 0);
        let counts_len = encode_counts(h, &mut self.buf[V1_HEADER_SIZE..])?;
        // can't overflow: max_size is already a usize of at least this sum
        let total_len = V1_HEADER_SIZE + counts_len;

        // counts payload is always under 2^32 bytes
        (&mut self.buf[4..8]).write_u32::<BigEndian>(counts_len as u32)?;

        writer
            .write_all(&self.buf[0..total_len])
            .map(|_| total_len)
            .map_err(SerializeError::IoError)
    }
}

fn max_encoded_size<T: Counter>(h: &Histogram<T>) -> Option<usize> {
    h.index_for(h.max())
        .and_then(|i| counts_max_encoded_size(i + 1))
        .and_then(|x| x.checked_add(V1_HEADER_SIZE))
}

// Only public within the crate for testing.
pub(crate) fn counts_max_encoded_size(length: usize) -> Option<usize> {
    // LEB128-64b9B uses at most 9 bytes per count
    length.checked_mul(9)
}

// Only public within the crate for testing.
/// Encode the counts array into `buf`, which must hold at least 9 bytes per
/// encoded count. Returns the number of bytes used.
pub(crate) fn encode_counts<T: Counter>(
    h: &Histogram<T>,
    buf: &mut [u8],
) -> Result<usize, SerializeError> {
    let index_limit = h
        .index_for(h.max())
        .expect("max value must map into the bucket array");
    let mut index = 0;
    let mut bytes_written = 0;

    debug_assert!(index_limit < h.counts.len());

    while index <= index_limit {
        let count = h.counts[index];
        index += 1;

        // Non-negative values carry the count of the next bucket; negative
        // values skip that many (absolute value) zero-count buckets.
        let mut zero_count = 0_i64;
        if count == T::zero() {
            zero_count = 1;
            while index <= index_limit && h.counts[index] == T::zero() {
                zero_count += 1;
                index += 1;
            }
        }

        let count_or_zeros: i64 = if zero_count > 1 {
            // a zero run can span at most the counts array, which is far
            // below i64 range
            -zero_count
        } else {
            count
                .to_i64()
                .ok_or(SerializeError::CountNotSerializable)?
        };

        bytes_written += varint_write(zig_zag_encode(count_or_zeros), &mut buf[bytes_written..]);
    }

    Ok(bytes_written)
}

// Only public within the crate for testing.
/// Write `input` to `buf` as an LEB128-64b9B little endian base 128 varint.
/// Unlike plain LEB128, a 64-bit value takes at most 9 bytes, not 10: the
/// first 8 bytes hold 7 bits each, and when more than 56 bits are in play the
/// ninth byte holds the top 8 bits verbatim. Returns the number of bytes
/// written (in `[1, 9]`).
#[inline]
pub(crate) fn varint_write(input: u64, buf: &mut [u8]) -> usize {
    let mut value = input;
    let mut i = 0;
    while i < 8 {
        if value >> 7 == 0 {
            buf[i] = value as u8;
            return i + 1;
        }
        // high bit set: more bytes follow this 7-bit chunk
        buf[i] = 0x80 | (value & 0x7F) as u8;
        value >>= 7;
        i += 1;
    }
    // 56 bits consumed; the last byte is the remaining 8 bits as-is
    buf[8] = value as u8;
    9
}

// Only public within the crate for testing.
/// Map signed numbers to unsigned: 0 to 0, -1 to 1, 1 to 2, -2 to 3, etc.
#[inline]
pub(crate) fn zig_zag_encode(num: i64) -> u64 {
    // num >> 63 is all ones exactly when num < 0
    ((num << 1) ^ (num >> 63)) as u64
}
