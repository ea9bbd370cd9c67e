//! Error types for histogram construction, queries, and the Student's t
//! critical value table.

use std::{error, fmt};

/// Errors that can occur when creating a histogram or a
/// [`StudentHistogram`](crate::StudentHistogram).
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CreationError {
    /// Lowest discernible value must be >= 1.
    LowIsZero,
    /// Lowest discernible value must be <= `u64::max_value() / 2` because the
    /// highest trackable value is a `u64` and must be at least twice the
    /// lowest.
    LowExceedsMax,
    /// Highest trackable value must be >= 2 * lowest discernible value for
    /// the bucket layout to work out. In practice, high is typically much
    /// higher than 2 * low.
    HighLessThanTwiceLow,
    /// Number of significant digits must be in the range `[0, 5]`. Five
    /// digits is already more precision than sampling use cases need, and
    /// memory usage grows exponentially past it.
    SigFigExceedsMax,
    /// Cannot represent sigfig worth of values beyond the lowest discernible
    /// value. Decrease the significant figures, the lowest discernible value,
    /// or both.
    CannotRepresentSigFigBeyondLow,
    /// The `usize` type is too small to represent the bucket array for the
    /// desired configuration. Use fewer significant figures or a lower max.
    UsizeTypeTooSmall,
    /// The default confidence level must be strictly between 0 and 1.
    ConfidenceOutOfRange,
}

impl fmt::Display for CreationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CreationError::LowIsZero => write!(f, "lowest discernible value must be >= 1"),
            CreationError::LowExceedsMax => {
                write!(f, "lowest discernible value must be <= u64::max_value() / 2")
            }
            CreationError::HighLessThanTwiceLow => write!(
                f,
                "highest trackable value must be >= 2 * lowest discernible value"
            ),
            CreationError::SigFigExceedsMax => {
                write!(f, "number of significant digits must be in [0, 5]")
            }
            CreationError::CannotRepresentSigFigBeyondLow => write!(
                f,
                "cannot represent sigfig worth of values beyond the lowest discernible value"
            ),
            CreationError::UsizeTypeTooSmall => {
                write!(f, "usize cannot represent the bucket array length")
            }
            CreationError::ConfidenceOutOfRange => {
                write!(f, "confidence must be strictly between 0 and 1")
            }
        }
    }
}

impl error::Error for CreationError {}

/// Errors from percentile queries.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum PercentileError {
    /// The requested percentile was NaN, <= 0, or > 100.
    OutOfRange,
}

impl fmt::Display for PercentileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PercentileError::OutOfRange => write!(f, "percentile must be > 0 and <= 100"),
        }
    }
}

impl error::Error for PercentileError {}

/// Errors from Student's t critical value lookups.
///
/// The first three variants reject malformed arguments; the two
/// `NoPrecomputed*` variants report that an otherwise well-formed lookup has
/// no entry in the precomputed table.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TCriticalError {
    /// Degrees of freedom was NaN.
    DfNotANumber,
    /// Confidence was NaN.
    ConfidenceNotANumber,
    /// The confidence level is not one of the seven levels the table is
    /// precomputed for.
    UnsupportedConfidence {
        /// The rejected confidence level.
        confidence: f64,
    },
    /// The table has no row for these degrees of freedom (negative or
    /// fractional df).
    NoPrecomputedValues {
        /// The degrees of freedom with no precomputed row.
        df: f64,
    },
    /// The resolved table row has no entry at the resolved significance
    /// level. Only reachable for infinite degrees of freedom at the three
    /// tightest confidence levels.
    NoPrecomputedValue {
        /// The degrees of freedom of the incomplete row.
        df: f64,
        /// The confidence level with no precomputed entry.
        confidence: f64,
    },
}

/// Degrees of freedom beyond the precomputed range display as infinity, as
/// the table collapses them to its limiting row.
fn fmt_df(df: f64, f: &mut fmt::Formatter) -> fmt::Result {
    if df > crate::student::tcritical::MAX_PRECOMPUTED_DF {
        write!(f, "\u{221e}")
    } else {
        write!(f, "{}", df)
    }
}

impl fmt::Display for TCriticalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TCriticalError::DfNotANumber => {
                write!(f, "df (degrees of freedom) must be a number and not NaN")
            }
            TCriticalError::ConfidenceNotANumber => {
                write!(f, "confidence must be a number and not NaN")
            }
            TCriticalError::UnsupportedConfidence { confidence } => write!(
                f,
                "confidence must be one of .90, .95, .98, .99, .995, .998 or .999, got {}",
                confidence
            ),
            TCriticalError::NoPrecomputedValues { df } => {
                write!(f, "did not pre-compute critical values for df = ")?;
                fmt_df(*df, f)
            }
            TCriticalError::NoPrecomputedValue { df, confidence } => {
                write!(f, "did not pre-compute critical value for df = ")?;
                fmt_df(*df, f)?;
                write!(f, " and confidence = {}", confidence)
            }
        }
    }
}

impl error::Error for TCriticalError {}
