//! Sampling statistics on top of a histogram: standard error, Student's t
//! confidence intervals, and minimum-sample-size estimation.

pub(crate) mod tcritical;

pub use self::tcritical::t_critical;

use crate::errors::{CreationError, PercentileError, TCriticalError};
use crate::serialization::{DeserializeError, Deserializer, SerializeError, Serializer};
use crate::{Counter, Histogram};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::cmp;
use std::convert::TryFrom;

const DEFAULT_LOW: u64 = 1;
const DEFAULT_HIGH: u64 = 100;
const DEFAULT_SIGFIG: u8 = 3;
const DEFAULT_CONFIDENCE: f64 = 0.95;

/// A histogram of sampled observations plus the confidence-aware statistics
/// derived from it.
///
/// Wraps exactly one [`Histogram`] together with an observation counter and
/// a default confidence level. The counter is an explicit `u64` kept apart
/// from the histogram's own totals: the histogram may use a narrow,
/// saturating counter type internally, while the observation count must
/// survive a binary round trip verbatim across the full 64-bit range.
///
/// The confidence-interval arithmetic treats the recorded values as a sample
/// from a larger population: [`sem`](Self::sem) is the standard error of the
/// mean, [`moe`](Self::moe) the half-width of the two-tailed confidence
/// interval around it, [`rme`](Self::rme) that half-width relative to the
/// mean, and [`minimum_size`](Self::minimum_size) the sample count needed to
/// shrink the relative margin of error below a target. A typical benchmark
/// loop records a fixed batch (say 50 samples), then keeps sampling until
/// `size() >= minimum_size(desired_rme, None)`.
#[derive(Clone, Debug, PartialEq)]
pub struct StudentHistogram<T: Counter> {
    histogram: Histogram<T>,
    observation_count: u64,
    confidence: f64,
}

// construction

impl<T: Counter> StudentHistogram<T> {
    /// Construct with the default configuration: values tracked in
    /// `[1, 100]` at 3 significant digits, 95% default confidence.
    pub fn new() -> StudentHistogram<T> {
        Self::new_with_bounds(DEFAULT_LOW, DEFAULT_HIGH, DEFAULT_SIGFIG)
            .expect("default configuration is valid")
    }

    /// Construct over the value range `[low, high]` with `sigfig` significant
    /// digits and the default 95% confidence level.
    pub fn new_with_bounds(
        low: u64,
        high: u64,
        sigfig: u8,
    ) -> Result<StudentHistogram<T>, CreationError> {
        Self::new_with_confidence(low, high, sigfig, DEFAULT_CONFIDENCE)
    }

    /// Construct over the value range `[low, high]` with `sigfig` significant
    /// digits, using `confidence` whenever a per-call confidence is omitted.
    ///
    /// `confidence` must lie strictly between 0 and 1.
    pub fn new_with_confidence(
        low: u64,
        high: u64,
        sigfig: u8,
        confidence: f64,
    ) -> Result<StudentHistogram<T>, CreationError> {
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(CreationError::ConfidenceOutOfRange);
        }
        Ok(StudentHistogram {
            histogram: Histogram::new_with_bounds(low, high, sigfig)?,
            observation_count: 0,
            confidence,
        })
    }
}

impl<T: Counter> Default for StudentHistogram<T> {
    fn default() -> Self {
        Self::new()
    }
}

// recording

impl<T: Counter> StudentHistogram<T> {
    /// Record one observation.
    ///
    /// Returns `false` (and counts nothing) when `value` lies outside the
    /// tracked range; the observation counter only advances on success.
    pub fn record(&mut self, value: u64) -> bool {
        if self.histogram.record(value) {
            self.observation_count = self.observation_count.saturating_add(1);
            true
        } else {
            false
        }
    }

    /// The number of successfully recorded observations.
    pub fn size(&self) -> u64 {
        self.observation_count
    }

    /// Clear all recorded state, keeping the configuration and bucket
    /// storage.
    pub fn reset(&mut self) {
        self.histogram.reset();
        self.observation_count = 0;
    }
}

// pass-through queries

impl<T: Counter> StudentHistogram<T> {
    /// Arithmetic mean of the recorded observations; 0.0 when empty.
    pub fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    /// Standard deviation of the recorded observations, normalized to 0.0
    /// for degenerate samples.
    pub fn stddev(&self) -> f64 {
        let stddev = self.histogram.stdev();
        if stddev.is_finite() {
            stddev
        } else {
            0.0
        }
    }

    /// Lowest recorded observation; 0 when empty.
    pub fn min(&self) -> u64 {
        self.histogram.min()
    }

    /// Highest recorded observation; 0 when empty.
    pub fn max(&self) -> u64 {
        self.histogram.max()
    }

    /// The value at the given percentile, which must be > 0 and <= 100.
    pub fn percentile(&self, percentile: f64) -> Result<u64, PercentileError> {
        self.histogram.percentile(percentile)
    }

    /// The wrapped histogram.
    pub fn histogram(&self) -> &Histogram<T> {
        &self.histogram
    }

    /// The default confidence level used when a per-call confidence is
    /// omitted.
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

// confidence statistics

impl<T: Counter> StudentHistogram<T> {
    /// Standard error of the mean: `stddev / sqrt(size)`.
    ///
    /// NaN when nothing has been recorded; metrics derived from it inherit
    /// and normalize that as documented.
    pub fn sem(&self) -> f64 {
        self.stddev() / (self.observation_count as f64).sqrt()
    }

    /// Degrees of freedom: `size - 1`. Deliberately -1 when nothing has been
    /// recorded; lookups clamp, callers see the raw value.
    pub fn df(&self) -> i64 {
        i64::try_from(self.observation_count).unwrap_or(i64::max_value()) - 1
    }

    /// The two-tailed Student's t critical value for this sample's degrees
    /// of freedom (clamped to at least 1) at `confidence`, defaulting to the
    /// constructed confidence level.
    pub fn t_critical(&self, confidence: Option<f64>) -> Result<f64, TCriticalError> {
        let df = cmp::max(self.df(), 1);
        tcritical::t_critical(df as f64, confidence.unwrap_or(self.confidence))
    }

    /// Margin of error of the mean estimate: `sem() * t_critical()`, in the
    /// observations' units.
    pub fn moe(&self, confidence: Option<f64>) -> Result<f64, TCriticalError> {
        Ok(self.sem() * self.t_critical(confidence)?)
    }

    /// Relative margin of error: `moe() / mean()`, dimensionless in
    /// `[0, ..)`. Normalized to 0.0 when the ratio is not finite (no data
    /// yet), so callers can poll it before sampling has produced anything.
    pub fn rme(&self, confidence: Option<f64>) -> Result<f64, TCriticalError> {
        let rme = self.moe(confidence)? / self.mean();
        Ok(if rme.is_finite() { rme } else { 0.0 })
    }

    /// Estimate the minimum number of observations needed to bring the
    /// relative margin of error at the given confidence down to `rme`.
    ///
    /// Computes `ceil((t² * s²) / e²)` where `t` is the critical value, `s`
    /// the current standard deviation, and `e = rme * mean()` the tolerated
    /// absolute error. NaN when fewer than two observations have been
    /// recorded, since the variance estimate needs at least two.
    pub fn minimum_size(&self, rme: f64, confidence: Option<f64>) -> Result<f64, TCriticalError> {
        if self.observation_count < 2 {
            return Ok(f64::NAN);
        }

        let t = self.t_critical(confidence)?;
        let s = self.stddev();
        let e = rme * self.mean();
        Ok(((t * t * s * s) / (e * e)).ceil())
    }
}

// serialization

impl<T: Counter> StudentHistogram<T> {
    /// Encode the observation count and the histogram into one blob.
    ///
    /// The count is a plain big-endian `u64` ahead of the histogram payload,
    /// so its full 64-bit range round-trips exactly; it is never
    /// reconstructed from the histogram's internal totals, which may
    /// saturate for narrow counter types.
    pub fn encode(&self) -> Result<Vec<u8>, SerializeError> {
        let mut buf = Vec::new();
        buf.write_u64::<BigEndian>(self.observation_count)?;
        Serializer::new().serialize(&self.histogram, &mut buf)?;
        Ok(buf)
    }

    /// Replace all recorded state with the contents of `bytes`, previously
    /// produced by [`encode`](Self::encode).
    ///
    /// Fails without modifying anything if the blob is truncated or corrupt,
    /// or if its embedded configuration does not match this instance's.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<(), DeserializeError> {
        let mut reader = bytes;
        let observation_count = reader.read_u64::<BigEndian>()?;
        let decoded = Deserializer::new().deserialize(&mut reader)?;
        if !self.histogram.config_matches(&decoded) {
            return Err(DeserializeError::ConfigMismatch);
        }

        self.histogram = decoded;
        self.observation_count = observation_count;
        Ok(())
    }
}
