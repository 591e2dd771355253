//! Stationary segment detection
//!
//! A point P is near-stationary when
//! 1. the track still lasts at least `time_bound` after P,
//! 2. every point less than `time_bound` after P lies within `dist_bound` of P,
//! 3. it is not part of the co-located run that started at the previously
//!    accepted point.
//!
//! The scan is a single forward pass. Once a point is accepted, scanning resumes
//! after the maximal run of points that stay within `dist_bound` of it, which is
//! what enforces (3).

use crate::{DataError, DistanceMetric, Result, Trackpoint};
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Thresholds for stationary detection
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationaryBounds {
    /// Minimum dwell time, strictly positive
    time_bound: f64,
    /// Maximum displacement from the segment start, non-negative
    dist_bound: f64,
}

impl StationaryBounds {
    /// Validate and build the bounds
    ///
    /// # Errors
    /// `DataError::InvalidBounds` unless `time_bound > 0` and `dist_bound >= 0`,
    /// both finite.
    pub fn new(time_bound: f64, dist_bound: f64) -> Result<Self> {
        if !time_bound.is_finite() || time_bound <= 0.0 {
            return Err(DataError::InvalidBounds(format!(
                "time bound must be positive and finite, got {time_bound}"
            )));
        }
        if !dist_bound.is_finite() || dist_bound < 0.0 {
            return Err(DataError::InvalidBounds(format!(
                "distance bound must be non-negative and finite, got {dist_bound}"
            )));
        }
        Ok(Self {
            time_bound,
            dist_bound,
        })
    }

    #[inline]
    pub fn time_bound(&self) -> f64 {
        self.time_bound
    }

    #[inline]
    pub fn dist_bound(&self) -> f64 {
        self.dist_bound
    }
}

/// An accepted near-stationary point and the co-located run it starts
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationarySegment {
    /// The near-stationary point itself
    pub anchor: Trackpoint,
    /// Last point of the run within the distance bound of the anchor
    pub last: Trackpoint,
    /// Range of track indices covered by the run (starts at the anchor)
    pub point_range: Range<usize>,
}

impl StationarySegment {
    /// Time covered by the run
    #[inline]
    pub fn duration(&self) -> f64 {
        self.last.time - self.anchor.time
    }

    /// Number of points in the run
    #[inline]
    pub fn len(&self) -> usize {
        self.point_range.len()
    }

    /// A run always holds at least its anchor
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.point_range.is_empty()
    }
}

/// Run the stationary scan over time-ordered `points`
pub(crate) fn scan<M>(
    points: &[Trackpoint],
    bounds: &StationaryBounds,
    metric: &M,
) -> Result<Vec<StationarySegment>>
where
    M: DistanceMetric + ?Sized,
{
    #[cfg(feature = "profiling")]
    profiling::scope!("stationary::scan");

    let mut segments = Vec::new();
    let Some(end) = points.last() else {
        return Ok(segments);
    };

    let mut i = 0;
    while i < points.len() {
        let anchor = &points[i];

        // Durations only shrink from here on, so no later point can qualify
        if end.time - anchor.time < bounds.time_bound {
            break;
        }

        let within = |q: &Trackpoint| {
            metric.distance(&q.location, &anchor.location) <= bounds.dist_bound
        };

        // The window never reaches past the last point since the check above holds
        let stable = points[i..]
            .iter()
            .take_while(|q| q.time - anchor.time < bounds.time_bound)
            .all(|q| within(q));

        if !stable {
            i += 1;
            continue;
        }

        // Always counts the anchor, unless the metric is not zero on equal locations
        let run = points[i..].iter().take_while(|q| within(*q)).count().max(1);

        segments.try_reserve(1)?;
        segments.push(StationarySegment {
            anchor: *anchor,
            last: points[i + run - 1],
            point_range: i..i + run,
        });
        i += run;
    }

    Ok(segments)
}
