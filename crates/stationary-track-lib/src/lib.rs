//! Stationary Track Library - Core Data Structures for Timestamped GPS Tracks
//!
//! This library stores a chronologically ordered sequence of geolocated samples
//! and answers two queries over it: where the subject was at an arbitrary time,
//! and where it stayed put for at least a given duration.
//!
//! # Architecture
//!
//! - **[`Track`]**: Owning, strictly time-ordered sequence of [`Trackpoint`]s
//! - **[`TrackAnalyzer`]**: Read-only point lookup and stationary detection over a track
//! - **[`StationarySegment`]**: An accepted near-stationary point and the run it covers
//! - **[`DistanceMetric`]**: The distance primitive the stationary scan is built on
//! - **[`input`]**: Whitespace-triple and GPX feeds that build tracks
//!
//! # Performance Characteristics
//!
//! - **Insertion**: amortized O(1), storage doubles when exhausted
//! - **Point lookup**: O(log N) binary search plus O(1) interpolation
//! - **Stationary scan**: O(N × W) where W = points inside one time window

mod analyzer;
pub mod input;
mod metric;
mod stationary;
mod track;

// Public API exports
pub use analyzer::TrackAnalyzer;
pub use metric::{DistanceMetric, Haversine, Planar};
pub use stationary::{StationaryBounds, StationarySegment};
pub use track::{Location, Track, Trackpoint};

/// Error types for the track library
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Storage allocation failed: {0}")]
    Allocation(#[from] std::collections::TryReserveError),

    #[error("Empty track")]
    EmptyTrack,

    #[error("Time {time} is outside the track span [{start}, {end}]")]
    TimeOutOfRange { time: f64, start: f64, end: f64 },

    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Record {record}: cannot parse {token:?} as a number")]
    Parse { record: usize, token: String },

    #[error("Record {record}: expected 3 fields, found {fields}")]
    TruncatedRecord { record: usize, fields: usize },

    #[error("Record {record}: time {time} does not follow {last}")]
    OutOfOrder { record: usize, time: f64, last: f64 },

    #[error("GPX parsing error: {0}")]
    GpxParse(#[from] gpx::errors::GpxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_exports() {
        // Verify that all public types are accessible
        let _: fn() -> Track = Track::new;
        let _: fn(f64, f64) -> Result<StationaryBounds> = StationaryBounds::new;
        let track = Track::new();
        let _: TrackAnalyzer<'_, Haversine> = TrackAnalyzer::new(&track);
        let _: TrackAnalyzer<'_, Planar> = TrackAnalyzer::with_metric(&track, Planar);
    }

    #[test]
    fn test_error_messages() {
        let err = DataError::TimeOutOfRange {
            time: 42.0,
            start: 0.0,
            end: 10.0,
        };
        assert_eq!(
            err.to_string(),
            "Time 42 is outside the track span [0, 10]"
        );

        let err = DataError::TruncatedRecord {
            record: 3,
            fields: 2,
        };
        assert_eq!(err.to_string(), "Record 3: expected 3 fields, found 2");
    }
}
