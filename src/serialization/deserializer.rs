use super::V1_COOKIE;
use crate::{Counter, Histogram};
use byteorder::{BigEndian, ReadBytesExt};
use num_traits::ToPrimitive;
use std::io::{self, Cursor, Read};
use std::{error, fmt};

/// Errors that can happen during deserialization.
#[derive(Debug)]
pub enum DeserializeError {
    /// An i/o operation failed, including hitting the end of a truncated
    /// blob.
    IoError(io::Error),
    /// The cookie (first 4 bytes) did not match the V1 format.
    InvalidCookie,
    /// The blob's embedded histogram parameters were invalid (e.g. lowest
    /// value, highest value, significant digits).
    InvalidParameters,
    /// A count exceeded what can be represented in the chosen counter type.
    UnsuitableCounterType,
    /// The current system's pointer width cannot represent the encoded
    /// histogram.
    UsizeTypeTooSmall,
    /// The encoded counts cover more buckets than the histogram's value
    /// range allows.
    EncodedArrayTooLong,
    /// The blob's embedded configuration does not match the histogram being
    /// decoded into.
    ConfigMismatch,
}

impl From<io::Error> for DeserializeError {
    fn from(e: io::Error) -> Self {
        DeserializeError::IoError(e)
    }
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeserializeError::IoError(e) => write!(f, "An i/o operation failed: {}", e),
            DeserializeError::InvalidCookie => {
                write!(f, "The cookie (first 4 bytes) did not match the V1 format")
            }
            DeserializeError::InvalidParameters => {
                write!(f, "The serialized histogram parameters were invalid")
            }
            DeserializeError::UnsuitableCounterType => write!(
                f,
                "A count exceeded what can be represented in the chosen counter type"
            ),
            DeserializeError::UsizeTypeTooSmall => write!(
                f,
                "The current system's pointer width cannot represent the encoded histogram"
            ),
            DeserializeError::EncodedArrayTooLong => write!(
                f,
                "The encoded counts cover more buckets than the value range allows"
            ),
            DeserializeError::ConfigMismatch => write!(
                f,
                "The blob's configuration does not match the target histogram"
            ),
        }
    }
}

impl error::Error for DeserializeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            DeserializeError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

/// Deserializer for the V1 binary format.
pub struct Deserializer {
    payload_buf: Vec<u8>,
}

impl Default for Deserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deserializer {
    /// Create a new deserializer.
    pub fn new() -> Deserializer {
        Deserializer {
            payload_buf: Vec::new(),
        }
    }

    /// Deserialize an encoded histogram from the provided reader.
    ///
    /// The returned histogram carries the configuration embedded in the
    /// blob; use [`Histogram::decode`](crate::Histogram::decode) to decode
    /// into an existing histogram with a configuration check.
    ///
    /// Note that `&[u8]` and `Cursor` are convenient implementations of
    /// `Read` if you have bytes in slice or `Vec` form.
    pub fn deserialize<T: Counter, R: Read>(
        &mut self,
        reader: &mut R,
    ) -> Result<Histogram<T>, DeserializeError> {
        let cookie = reader.read_u32::<BigEndian>()?;
        if cookie != V1_COOKIE {
            return Err(DeserializeError::InvalidCookie);
        }

        let payload_len = reader
            .read_u32::<BigEndian>()?
            .to_usize()
            .ok_or(DeserializeError::UsizeTypeTooSmall)?;
        let sigfig = reader
            .read_u32::<BigEndian>()?
            .to_u8()
            .ok_or(DeserializeError::InvalidParameters)?;
        let low = reader.read_u64::<BigEndian>()?;
        let high = reader.read_u64::<BigEndian>()?;
        let observed_min = reader.read_u64::<BigEndian>()?;
        let observed_max = reader.read_u64::<BigEndian>()?;

        let mut h = Histogram::new_with_bounds(low, high, sigfig)
            .map_err(|_| DeserializeError::InvalidParameters)?;

        if payload_len > self.payload_buf.len() {
            self.payload_buf.resize(payload_len, 0);
        }
        let payload_slice = &mut self.payload_buf[0..payload_len];
        reader.read_exact(payload_slice)?;

        let mut cursor = Cursor::new(&payload_slice[..]);
        let mut dest_index = 0_usize;
        let mut total_count = 0_u64;
        while (cursor.position() as usize) < payload_len {
            let count_or_zeros = zig_zag_decode(varint_read(&mut cursor)?);

            if count_or_zeros < 0 {
                let zero_count = count_or_zeros
                    .checked_neg()
                    .and_then(|z| z.to_usize())
                    .ok_or(DeserializeError::UsizeTypeTooSmall)?;
                // skip the zeros
                dest_index = dest_index
                    .checked_add(zero_count)
                    .ok_or(DeserializeError::UsizeTypeTooSmall)?;
            } else {
                let count: T = T::from_i64(count_or_zeros)
                    .ok_or(DeserializeError::UnsuitableCounterType)?;

                if count > T::zero() {
                    match h.counts.get_mut(dest_index) {
                        Some(c) => *c = count,
                        None => return Err(DeserializeError::EncodedArrayTooLong),
                    }
                    total_count = total_count.saturating_add(count.as_u64());
                }

                dest_index = dest_index
                    .checked_add(1)
                    .ok_or(DeserializeError::UsizeTypeTooSmall)?;
            }
        }

        h.total_count = total_count;
        h.observed_min = observed_min;
        h.observed_max = observed_max;
        Ok(h)
    }
}

// Only public within the crate for testing.
/// Read an LEB128-64b9B varint from the reader.
pub(crate) fn varint_read<R: Read>(reader: &mut R) -> io::Result<u64> {
    let mut value = 0_u64;
    for shift in 0..8 {
        let b = reader.read_u8()?;
        value |= low_7_bits(b) << (7 * shift);
        if !is_high_bit_set(b) {
            return Ok(value);
        }
    }
    // the ninth byte carries the top 8 bits verbatim
    let b = reader.read_u8()?;
    Ok(value | u64::from(b) << 56)
}

/// truncate byte to low 7 bits, cast to u64
#[inline]
fn low_7_bits(b: u8) -> u64 {
    u64::from(b & 0x7F)
}

#[inline]
fn is_high_bit_set(b: u8) -> bool {
    (b & 0x80) != 0
}

// Only public within the crate for testing.
#[inline]
pub(crate) fn zig_zag_decode(encoded: u64) -> i64 {
    ((encoded >> 1) as i64) ^ -((encoded & 1) as i64)
}
