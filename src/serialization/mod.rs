//! Serialization/deserialization support.
//!
//! Histograms encode to a compact, self-describing binary blob intended for
//! archival or transmission: record on one system, periodically serialize
//! and reset, then deserialize elsewhere for analysis with every observable
//! statistic intact (a stored percentile can't be re-aggregated later; a
//! stored histogram can be re-queried at any percentile).
//!
//! # Format
//!
//! A blob is a fixed big-endian header followed by a varint counts payload:
//!
//! ```text
//! u32 cookie            format magic, 0x73746831
//! u32 payload length    bytes of counts payload after the header
//! u32 significant value digits
//! u64 lowest discernible value
//! u64 highest trackable value
//! u64 observed minimum  raw as recorded; u64::MAX when empty
//! u64 observed maximum  raw as recorded; 0 when empty
//! ...                   counts payload
//! ```
//!
//! The payload covers bucket indexes from 0 through the index of the maximum
//! recorded value, as zig-zag LEB128-64b9B varints: a non-negative number is
//! the count for the next bucket, a negative number skips that many
//! zero-count buckets. Trailing buckets and interior runs of zeros therefore
//! cost almost nothing. The total count is not stored; decoding recomputes
//! it from the bucket counts.
//!
//! The observed extremes ride in the header so a decoded histogram reports
//! the true recorded min/max, not values re-derived from bucket boundaries.
//!
//! # API
//!
//! [`Serializer`] and [`Deserializer`] hold reusable internal buffers; keep
//! one around when serializing many histograms. Both work against any
//! `io::Write`/`io::Read` (a `Vec<u8>` and a `&[u8]` slice are the simplest
//! choices). [`Histogram::encode`](crate::Histogram::encode) and
//! [`Histogram::decode`](crate::Histogram::decode) wrap them for one-shot
//! use, with `decode` additionally enforcing that the blob's embedded
//! configuration matches the target histogram.

mod serializer;
pub use self::serializer::{SerializeError, Serializer};

mod deserializer;
pub use self::deserializer::{DeserializeError, Deserializer};

#[cfg(test)]
mod tests;

pub(crate) const V1_COOKIE: u32 = 0x7374_6831;
pub(crate) const V1_HEADER_SIZE: usize = 44;
