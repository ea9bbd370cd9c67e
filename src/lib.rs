//! A high-dynamic-range histogram of positive integer values paired with
//! Student's t confidence statistics, intended for latency/benchmark-style
//! sampling where memory footprint and a compact serialized form matter more
//! than exact ranks.
//!
//! # Histogram
//!
//! [`Histogram`] records values between a configurable lowest and highest
//! trackable value while maintaining a fixed number of significant decimal
//! digits of precision. Buckets follow a log-linear layout: absolute bucket
//! width grows in proportion to value magnitude, so the *relative*
//! quantization error of any recorded value is bounded by a constant
//! determined by the configured precision, no matter where in the tracked
//! range the value falls. This is what lets a small, allocation-once bucket
//! array cover many orders of magnitude; a linear histogram would need one
//! bucket per unit.
//!
//! For example, a histogram configured to track `[1, 3_600_000_000]` with 3
//! significant digits quantizes no value by more than 1/1,000th of its
//! magnitude: 1 unit resolution up to 2,000, 2 units up to 4,000, and so on.
//! The memory footprint is fixed at construction and no recording or query
//! allocates.
//!
//! Values outside the tracked range are rejected, not clamped: `record`
//! returns `false` and leaves the histogram untouched. Out-of-range samples
//! are expected in normal operation (e.g. outlier filtering by the caller),
//! so this is a soft failure, as opposed to the hard error conditions raised
//! by malformed percentile or decode requests.
//!
//! # Sampling statistics
//!
//! [`StudentHistogram`] wraps a histogram together with an exact 64-bit
//! observation counter and a default confidence level, and derives standard
//! error, margin of error, relative margin of error and minimum required
//! sample size from the recorded data using precomputed two-tailed Student's
//! t critical values:
//!
//! ```
//! use student_histogram::StudentHistogram;
//!
//! let mut h = StudentHistogram::<u64>::new();
//! h.record(10);
//! h.record(30);
//!
//! assert_eq!(h.size(), 2);
//! assert_eq!(h.mean(), 20.0);
//! assert_eq!(h.df(), 1);
//!
//! // sample until the 95% relative margin of error drops below 10%
//! let needed = h.minimum_size(0.1, None).unwrap();
//! assert!(h.size() < needed as u64);
//! ```
//!
//! # Serialization
//!
//! Histograms encode to a self-describing binary blob (configuration plus a
//! varint-compressed counts payload) and decode back with all observable
//! state intact; see the [`serialization`] module. `StudentHistogram`
//! prefixes the blob with its observation counter as a big-endian `u64`, so
//! counts beyond 2^53 survive the round trip verbatim.
//!
//! # Concurrency
//!
//! Every operation runs to completion synchronously and the types carry no
//! internal synchronization. Callers sharing one instance across threads
//! must serialize access themselves (one mutex or one exclusive owner per
//! instance).

mod core;
pub mod errors;
pub mod serialization;
pub mod student;

pub use crate::core::counter::Counter;
pub use crate::errors::{CreationError, PercentileError, TCriticalError};
pub use crate::student::StudentHistogram;

use crate::serialization::{DeserializeError, Deserializer, SerializeError, Serializer};

/// A histogram of positive `u64` values with log-linear buckets, generic over
/// the per-bucket counter type.
///
/// Use a narrow counter type (`u8`, `u16`, `u32`) to shrink the bucket array
/// when per-bucket counts stay small; buckets saturate instead of wrapping if
/// that assumption turns out wrong. `total_count` and the observed extremes
/// are tracked in full width regardless of `T`.
#[derive(Clone, Debug)]
pub struct Histogram<T: Counter> {
    lowest_discernible_value: u64,
    highest_trackable_value: u64,
    significant_value_digits: u8,

    bucket_count: u8,
    sub_bucket_count: u32,
    sub_bucket_half_count: u32,
    sub_bucket_half_count_magnitude: u8,
    // 2^unit_magnitude is the smallest power of two not above the lowest
    // discernible value
    unit_magnitude: u8,
    // mask of the sub-bucket range, pre-shifted by unit_magnitude
    sub_bucket_mask: u64,
    leading_zero_count_base: u8,

    total_count: u64,
    // raw extremes as recorded; u64::MAX / 0 until the first record
    observed_min: u64,
    observed_max: u64,
    counts: Vec<T>,
}

// construction

impl<T: Counter> Histogram<T> {
    /// Construct a histogram covering `[1, high]` with `sigfig` significant
    /// decimal digits of precision.
    ///
    /// `high` must be at least 2 and `sigfig` at most 5.
    pub fn new_with_max(high: u64, sigfig: u8) -> Result<Histogram<T>, CreationError> {
        Self::new_with_bounds(1, high, sigfig)
    }

    /// Construct a histogram covering `[low, high]` with `sigfig` significant
    /// decimal digits of precision.
    ///
    /// A `low` above 1 is useful when the value units are much finer than the
    /// precision actually needed (e.g. nanosecond values with microsecond
    /// accuracy, `low` = 1000): it shrinks the bucket array by not spending
    /// buckets below the discernible range. `low` must be at least 1, `high`
    /// at least `2 * low`, and `sigfig` at most 5. The range and precision
    /// are fixed for the life of the histogram.
    pub fn new_with_bounds(low: u64, high: u64, sigfig: u8) -> Result<Histogram<T>, CreationError> {
        if low < 1 {
            return Err(CreationError::LowIsZero);
        }
        if low > u64::max_value() / 2 {
            return Err(CreationError::LowExceedsMax);
        }
        if high < 2 * low {
            return Err(CreationError::HighLessThanTwiceLow);
        }
        if sigfig > 5 {
            return Err(CreationError::SigFigExceedsMax);
        }

        // Precision of 10^digits requires single-unit resolution up to
        // 2 * 10^digits: +/- 1 unit at 1000 means +/- 2 units only from 2000
        // on, so the linear sub-bucket span must reach 2000 before bucket
        // widths double.
        let largest_single_unit = 2 * 10_u64.pow(u32::from(sigfig));
        let sub_bucket_count_magnitude = (largest_single_unit as f64).log2().ceil() as u8;
        let sub_bucket_half_count_magnitude = sub_bucket_count_magnitude.max(1) - 1;

        let unit_magnitude = (low as f64).log2().floor() as u8;
        if u32::from(unit_magnitude) + u32::from(sub_bucket_half_count_magnitude) + 1 > 63 {
            return Err(CreationError::CannotRepresentSigFigBeyondLow);
        }

        let sub_bucket_count = 1_u32 << (sub_bucket_half_count_magnitude + 1);
        let sub_bucket_half_count = sub_bucket_count / 2;
        let sub_bucket_mask = (u64::from(sub_bucket_count) - 1) << unit_magnitude;

        let mut h = Histogram {
            lowest_discernible_value: low,
            highest_trackable_value: high,
            significant_value_digits: sigfig,

            bucket_count: 0, // set below
            sub_bucket_count,
            sub_bucket_half_count,
            sub_bucket_half_count_magnitude,
            unit_magnitude,
            sub_bucket_mask,
            leading_zero_count_base: 64 - unit_magnitude - sub_bucket_half_count_magnitude - 1,

            total_count: 0,
            observed_min: u64::max_value(),
            observed_max: 0,
            counts: Vec::new(),
        };

        h.bucket_count = h.buckets_to_cover(high);
        let len = (usize::from(h.bucket_count) + 1)
            .checked_mul(sub_bucket_half_count as usize)
            .ok_or(CreationError::UsizeTypeTooSmall)?;
        h.counts = vec![T::zero(); len];
        Ok(h)
    }

    /// Number of buckets needed so the last one covers `value`.
    ///
    /// The k'th bucket spans `[0, sub_bucket_count) << k` in units of `2^k`
    /// (shifted by the unit magnitude), so each additional bucket doubles the
    /// covered range.
    fn buckets_to_cover(&self, value: u64) -> u8 {
        let mut smallest_untrackable = u64::from(self.sub_bucket_count) << self.unit_magnitude;
        let mut buckets_needed = 1;
        while smallest_untrackable <= value {
            if smallest_untrackable > u64::max_value() / 2 {
                // doubling again would cover values past u64::MAX, so this is
                // the last bucket
                return buckets_needed + 1;
            }
            smallest_untrackable <<= 1;
            buckets_needed += 1;
        }
        buckets_needed
    }
}

// accessors

impl<T: Counter> Histogram<T> {
    /// The configured lowest discernible value.
    pub fn low(&self) -> u64 {
        self.lowest_discernible_value
    }

    /// The configured highest trackable value.
    pub fn high(&self) -> u64 {
        self.highest_trackable_value
    }

    /// The configured number of significant decimal digits.
    pub fn sigfig(&self) -> u8 {
        self.significant_value_digits
    }

    /// Total number of values recorded (via `record_n`, a single call may
    /// contribute more than one).
    pub fn count(&self) -> u64 {
        self.total_count
    }

    /// The number of bins in the bucket array.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// `true` if no values have been recorded since creation or the last
    /// `reset`.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

// recording

impl<T: Counter> Histogram<T> {
    /// Record a single occurrence of `value`.
    ///
    /// Returns `false` without touching any state when `value` lies outside
    /// `[low, high]`; out-of-range samples are a soft failure, not an error.
    pub fn record(&mut self, value: u64) -> bool {
        self.record_n(value, T::one())
    }

    /// Record `count` occurrences of `value` in one call.
    ///
    /// Same range rule as [`record`](Self::record). The bucket counter
    /// saturates at the counter type's maximum rather than wrapping;
    /// `count()` keeps the full total in 64 bits either way.
    pub fn record_n(&mut self, value: u64, count: T) -> bool {
        if value < self.lowest_discernible_value || value > self.highest_trackable_value {
            return false;
        }
        let index = match self.index_for(value) {
            Some(index) => index,
            None => return false,
        };

        self.counts[index] = self.counts[index].saturating_add(count);
        self.total_count = self.total_count.saturating_add(count.as_u64());
        if value < self.observed_min {
            self.observed_min = value;
        }
        if value > self.observed_max {
            self.observed_max = value;
        }
        true
    }

    /// Zero all bucket counters and clear the observed extremes, keeping the
    /// bucket storage allocated for reuse.
    pub fn reset(&mut self) {
        for c in self.counts.iter_mut() {
            *c = T::zero();
        }
        self.total_count = 0;
        self.observed_min = u64::max_value();
        self.observed_max = 0;
    }
}

// data statistics

impl<T: Counter> Histogram<T> {
    /// The lowest value recorded, exactly as passed to `record` (not a bucket
    /// boundary). 0 if nothing has been recorded.
    pub fn min(&self) -> u64 {
        if self.total_count == 0 {
            0
        } else {
            self.observed_min
        }
    }

    /// The highest value recorded, exactly as passed to `record`. 0 if
    /// nothing has been recorded.
    pub fn max(&self) -> u64 {
        self.observed_max
    }

    /// The mean of all recorded values, weighting each bucket's midpoint by
    /// its count. 0.0 if nothing has been recorded. O(number of buckets).
    pub fn mean(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }

        let total = self.total_count as f64;
        self.iter_recorded().fold(0.0, |sum, (value, count)| {
            sum + self.median_equivalent(value) as f64 * count.as_f64() / total
        })
    }

    /// The population standard deviation of all recorded values, computed
    /// from bucket midpoints and counts.
    ///
    /// 0.0 when fewer than two values have been recorded; the degenerate case
    /// keeps downstream ratios defined instead of failing.
    pub fn stdev(&self) -> f64 {
        if self.total_count <= 1 {
            return 0.0;
        }

        let mean = self.mean();
        let sq_dev_total = self.iter_recorded().fold(0.0, |sum, (value, count)| {
            let dev = self.median_equivalent(value) as f64 - mean;
            sum + dev * dev * count.as_f64()
        });
        (sq_dev_total / self.total_count as f64).sqrt()
    }

    /// The value at the given percentile, which must be > 0 and <= 100.
    ///
    /// Walks buckets in ascending value order accumulating counts until the
    /// cumulative count reaches `ceil(percentile/100 * count())`, then
    /// returns that bucket's representative (highest equivalent) value: ties
    /// resolve to the first bucket meeting the rank. 0 if nothing has been
    /// recorded.
    pub fn percentile(&self, percentile: f64) -> Result<u64, PercentileError> {
        if !(percentile > 0.0 && percentile <= 100.0) {
            return Err(PercentileError::OutOfRange);
        }
        if self.total_count == 0 {
            return Ok(0);
        }

        let rank = ((percentile / 100.0) * self.total_count as f64).ceil() as u64;
        let rank = rank.max(1);

        let mut cumulative = 0_u64;
        for (index, count) in self.counts.iter().enumerate() {
            cumulative = cumulative.saturating_add(count.as_u64());
            if cumulative >= rank {
                return Ok(self.highest_equivalent(self.value_for(index)));
            }
        }
        Ok(self.max())
    }

    /// The count recorded at values equivalent to `value` (within the
    /// histogram's resolution at that magnitude). 0 for values outside the
    /// bucket array.
    pub fn count_at(&self, value: u64) -> T {
        self.index_for(value)
            .map(|index| self.counts[index])
            .unwrap_or_else(T::zero)
    }

    /// Iterate over all non-empty buckets in ascending value order, yielding
    /// each bucket's lowest equivalent value and its count.
    pub fn iter_recorded(&self) -> impl Iterator<Item = (u64, T)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, count)| **count != T::zero())
            .map(move |(index, count)| (self.value_for(index), *count))
    }
}

// equivalence within the histogram's resolution

impl<T: Counter> Histogram<T> {
    /// The lowest value that is equivalent to `value`, where "equivalent"
    /// means recorded into the same bucket and counted in a common total.
    pub fn lowest_equivalent(&self, value: u64) -> u64 {
        let bucket = self.bucket_for(value);
        let sub_bucket = self.sub_bucket_for(value, bucket);
        u64::from(sub_bucket) << (bucket + self.unit_magnitude)
    }

    /// The highest value that is equivalent to `value`.
    pub fn highest_equivalent(&self, value: u64) -> u64 {
        if value == u64::max_value() {
            u64::max_value()
        } else {
            self.next_non_equivalent(value) - 1
        }
    }

    /// A value in the middle (rounded up) of the range of values equivalent
    /// to `value`. Used as the bucket's representative in `mean` and
    /// `stdev`.
    pub fn median_equivalent(&self, value: u64) -> u64 {
        self.lowest_equivalent(value)
            .saturating_add(self.equivalent_range(value) >> 1)
    }

    /// The smallest value that is not equivalent to `value`.
    pub fn next_non_equivalent(&self, value: u64) -> u64 {
        self.lowest_equivalent(value)
            .saturating_add(self.equivalent_range(value))
    }

    /// The size, in value units, of the range of values equivalent to
    /// `value`.
    pub fn equivalent_range(&self, value: u64) -> u64 {
        let bucket = self.bucket_for(value);
        1_u64 << (bucket + self.unit_magnitude)
    }

    /// Whether `a` and `b` land in the same bucket.
    pub fn equivalent(&self, a: u64, b: u64) -> bool {
        self.lowest_equivalent(a) == self.lowest_equivalent(b)
    }
}

// serialization surface; the wire format lives in `serialization`

impl<T: Counter> Histogram<T> {
    /// Encode this histogram into a self-describing binary blob: its
    /// configuration, observed extremes, and all non-zero bucket counts.
    pub fn encode(&self) -> Result<Vec<u8>, SerializeError> {
        let mut buf = Vec::new();
        Serializer::new().serialize(self, &mut buf)?;
        Ok(buf)
    }

    /// Replace this histogram's recorded state with the contents of `bytes`,
    /// previously produced by [`encode`](Self::encode).
    ///
    /// Fails if the blob is truncated or corrupt, or if its embedded
    /// configuration does not match this histogram's. On failure the
    /// histogram is left unmodified; the swap happens only after the whole
    /// blob has decoded cleanly.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<(), DeserializeError> {
        let decoded = Deserializer::new().deserialize(&mut &bytes[..])?;
        if !self.config_matches(&decoded) {
            return Err(DeserializeError::ConfigMismatch);
        }
        *self = decoded;
        Ok(())
    }

    pub(crate) fn config_matches(&self, other: &Histogram<T>) -> bool {
        self.lowest_discernible_value == other.lowest_discernible_value
            && self.highest_trackable_value == other.highest_trackable_value
            && self.significant_value_digits == other.significant_value_digits
    }
}

impl<T: Counter> PartialEq for Histogram<T> {
    fn eq(&self, other: &Histogram<T>) -> bool {
        self.config_matches(other)
            && self.total_count == other.total_count
            && self.observed_min == other.observed_min
            && self.observed_max == other.observed_max
            && self.counts == other.counts
    }
}

// index math

impl<T: Counter> Histogram<T> {
    /// The lowest (and therefore highest precision) bucket that can represent
    /// `value`.
    fn bucket_for(&self, value: u64) -> u8 {
        // Number of powers of two by which the value exceeds the largest
        // value fitting in bucket 0; the mask maps small values to bucket 0.
        self.leading_zero_count_base - (value | self.sub_bucket_mask).leading_zeros() as u8
    }

    /// Position within `bucket`. For bucket 0 this may be anywhere in
    /// `[0, sub_bucket_count)`; for every later bucket it lands in the top
    /// half, since the bottom half of bucket k is covered (at finer
    /// resolution) by the buckets before it.
    fn sub_bucket_for(&self, value: u64, bucket: u8) -> u32 {
        (value >> (bucket + self.unit_magnitude)) as u32
    }

    /// Index of `value`'s counter in the flat counts array, or `None` when
    /// the value lies past the array.
    ///
    /// Each bucket stores only `sub_bucket_half_count` slots (bucket 0 keeps
    /// the full count, using the slot range of a "bucket -1" for its bottom
    /// half), so bucket k starts at `(k + 1) * sub_bucket_half_count`.
    fn index_for(&self, value: u64) -> Option<usize> {
        let bucket = self.bucket_for(value);
        let sub_bucket = self.sub_bucket_for(value, bucket);

        debug_assert!(sub_bucket < self.sub_bucket_count);
        debug_assert!(bucket == 0 || sub_bucket >= self.sub_bucket_half_count);

        let base = (usize::from(bucket) + 1) << self.sub_bucket_half_count_magnitude;
        let offset = sub_bucket as isize - self.sub_bucket_half_count as isize;
        let index = base as isize + offset;
        if index < 0 || index as usize >= self.counts.len() {
            None
        } else {
            Some(index as usize)
        }
    }

    /// The lowest value mapping to the counter at `index`; inverse of
    /// `index_for` up to bucket resolution.
    fn value_for(&self, index: usize) -> u64 {
        let mut bucket = (index >> self.sub_bucket_half_count_magnitude) as isize - 1;
        let mut sub_bucket =
            (index & (self.sub_bucket_half_count as usize - 1)) + self.sub_bucket_half_count as usize;
        if bucket < 0 {
            // bottom half of bucket 0
            sub_bucket -= self.sub_bucket_half_count as usize;
            bucket = 0;
        }
        (sub_bucket as u64) << (bucket as u8 + self.unit_magnitude)
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
