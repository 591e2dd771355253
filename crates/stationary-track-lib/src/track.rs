//! Track storage module
//!
//! This module provides the `Track` container, an owning sequence of trackpoints
//! whose timestamps strictly increase, together with the `Location` and
//! `Trackpoint` value types stored in it.

use crate::{DataError, Result};
use geo::Point;
use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<Location> for Point<f64> {
    #[inline]
    fn from(location: Location) -> Self {
        Point::new(location.lon, location.lat)
    }
}

impl From<Point<f64>> for Location {
    #[inline]
    fn from(point: Point<f64>) -> Self {
        Location::new(point.y(), point.x())
    }
}

/// A single timestamped sample
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trackpoint {
    pub location: Location,
    /// Seconds on any monotonic scale (the feeds use the Unix epoch)
    pub time: f64,
}

impl Trackpoint {
    #[inline]
    pub const fn new(lat: f64, lon: f64, time: f64) -> Self {
        Self {
            location: Location::new(lat, lon),
            time,
        }
    }

    /// Linear interpolation between `self` and `next` at `time`
    ///
    /// Latitude and longitude are interpolated independently. The caller
    /// guarantees `self.time < time < next.time`.
    #[inline]
    fn lerp(&self, next: &Trackpoint, time: f64) -> Trackpoint {
        let fraction = (time - self.time) / (next.time - self.time);
        let lat = self.location.lat + fraction * (next.location.lat - self.location.lat);
        let lon = self.location.lon + fraction * (next.location.lon - self.location.lon);
        Trackpoint::new(lat, lon, time)
    }
}

/// An ordered, growable sequence of trackpoints with strictly increasing times
///
/// The track only grows through [`Track::add_point`], which refuses any point
/// that does not come strictly after the current last one. Lookups hand out
/// copies, never references that could outlive a later insertion.
#[derive(Clone, Debug, Default)]
pub struct Track {
    /// Owned samples, `points[i].time < points[i + 1].time`
    points: Vec<Trackpoint>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Track {
    /// Create an empty track
    ///
    /// No storage is obtained until the first point arrives.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create an empty track with room for `capacity` points
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut points = Vec::new();
        points.try_reserve_exact(capacity)?;
        Ok(Self { points })
    }

    /// Append a copy of `point` if it comes strictly after the last point
    ///
    /// # Returns
    /// * `Ok(true)` - the point was appended
    /// * `Ok(false)` - the point was rejected (its time is not strictly greater
    ///   than the last time, or it is not finite); the track is unchanged
    /// * `Err(DataError::Allocation)` - storage could not grow; the track is unchanged
    pub fn add_point(&mut self, point: Trackpoint) -> Result<bool> {
        if !point.time.is_finite() {
            return Ok(false);
        }
        if let Some(last) = self.points.last() {
            if point.time <= last.time {
                return Ok(false);
            }
        }

        // Vec doubles its capacity when full, keeping insertion amortized O(1)
        self.points.try_reserve(1)?;
        self.points.push(point);
        Ok(true)
    }

    /// Number of points in the track
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the track has no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points the track can hold before its storage must grow
    #[inline]
    pub fn capacity(&self) -> usize {
        self.points.capacity()
    }

    /// Time between the first and the last point, zero for an empty track
    #[inline]
    pub fn duration(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn first(&self) -> Option<&Trackpoint> {
        self.points.first()
    }

    #[inline]
    pub fn last(&self) -> Option<&Trackpoint> {
        self.points.last()
    }

    /// All points in ascending time order
    #[inline]
    pub fn points(&self) -> &[Trackpoint] {
        &self.points
    }

    /// Iterate over the points in ascending time order
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Trackpoint> {
        self.points.iter()
    }

    /// Get the point at `time`, interpolating between its neighbours if needed
    ///
    /// An exact match is returned as a copy. Otherwise the latitude and longitude
    /// of the closest points before and after `time` are interpolated linearly.
    ///
    /// # Errors
    /// * `DataError::EmptyTrack` if there are no points
    /// * `DataError::TimeOutOfRange` if `time` is before the first point, after
    ///   the last one, or NaN
    pub fn get_point(&self, time: f64) -> Result<Trackpoint> {
        #[cfg(feature = "profiling")]
        profiling::scope!("track::get_point");

        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(DataError::EmptyTrack),
        };

        // Also rejects NaN, so the bracket below always exists
        if !(time >= first.time && time <= last.time) {
            return Err(DataError::TimeOutOfRange {
                time,
                start: first.time,
                end: last.time,
            });
        }

        // First index whose time is not before the requested one
        let after = self
            .points
            .partition_point(|p| p.time.partial_cmp(&time) == Some(Ordering::Less));
        let upper = &self.points[after];
        if upper.time == time {
            return Ok(*upper);
        }

        // after > 0: time >= first.time and points[0] is not an exact match
        let lower = &self.points[after - 1];
        Ok(lower.lerp(upper, time))
    }
}

impl<'a> IntoIterator for &'a Track {
    type Item = &'a Trackpoint;
    type IntoIter = std::slice::Iter<'a, Trackpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
