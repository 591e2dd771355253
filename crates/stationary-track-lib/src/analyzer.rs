//! TrackAnalyzer - Read-only queries over a fully built track
//!
//! The analyzer borrows a [`Track`] immutably, so any number of analyzers can
//! read the same track at once while no further points can be added to it.

use crate::stationary::{self, StationaryBounds, StationarySegment};
use crate::{DistanceMetric, Haversine, Result, Track, Trackpoint};

/// Point lookup and stationary detection over a track
#[derive(Clone, Copy, Debug)]
pub struct TrackAnalyzer<'a, M = Haversine> {
    track: &'a Track,
    metric: M,
}

impl<'a> TrackAnalyzer<'a, Haversine> {
    /// Analyze `track` using great-circle distances in meters
    pub fn new(track: &'a Track) -> Self {
        Self::with_metric(track, Haversine)
    }
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl<'a, M: DistanceMetric> TrackAnalyzer<'a, M> {
    /// Analyze `track` with a caller-supplied distance primitive
    pub fn with_metric(track: &'a Track, metric: M) -> Self {
        Self { track, metric }
    }

    #[inline]
    pub fn track(&self) -> &'a Track {
        self.track
    }

    #[inline]
    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Location at `time`, exact or linearly interpolated
    ///
    /// See [`Track::get_point`].
    #[inline]
    pub fn get_point(&self, time: f64) -> Result<Trackpoint> {
        self.track.get_point(time)
    }

    /// Near-stationary points in ascending time order
    ///
    /// An empty track, or one where nothing qualifies, yields `Ok` with an empty
    /// vector. `Err` is only returned when the result storage cannot grow.
    pub fn find_stationary(&self, bounds: &StationaryBounds) -> Result<Vec<Trackpoint>> {
        let segments = self.find_stationary_segments(bounds)?;
        let mut anchors = Vec::new();
        anchors.try_reserve_exact(segments.len())?;
        anchors.extend(segments.iter().map(|segment| segment.anchor));
        Ok(anchors)
    }

    /// Near-stationary points together with the co-located run each one starts
    pub fn find_stationary_segments(
        &self,
        bounds: &StationaryBounds,
    ) -> Result<Vec<StationarySegment>> {
        stationary::scan(self.track.points(), bounds, &self.metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Location, Planar};

    /// Three co-located samples, then one far away
    fn create_test_track() -> Track {
        let mut track = Track::new();
        for time in [0.0, 10.0, 20.0] {
            track
                .add_point(Trackpoint::new(51.5074, -0.1278, time))
                .unwrap();
        }
        track
            .add_point(Trackpoint::new(48.8566, 2.3522, 200.0))
            .unwrap();
        track
    }

    #[test]
    fn test_find_stationary_single_stop() {
        let track = create_test_track();
        let analyzer = TrackAnalyzer::new(&track);
        let bounds = StationaryBounds::new(15.0, 1.0).unwrap();

        let result = analyzer.find_stationary(&bounds).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0], Trackpoint::new(51.5074, -0.1278, 0.0));
    }

    #[test]
    fn test_find_stationary_empty_track() {
        let track = Track::new();
        let analyzer = TrackAnalyzer::new(&track);
        let bounds = StationaryBounds::new(15.0, 1.0).unwrap();

        let result = analyzer.find_stationary(&bounds).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_find_stationary_is_idempotent() {
        let track = create_test_track();
        let analyzer = TrackAnalyzer::new(&track);
        let bounds = StationaryBounds::new(15.0, 1.0).unwrap();

        let first = analyzer.find_stationary(&bounds).unwrap();
        let second = analyzer.find_stationary(&bounds).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_segments_and_points_agree() {
        let track = create_test_track();
        let analyzer = TrackAnalyzer::new(&track);
        let bounds = StationaryBounds::new(15.0, 1.0).unwrap();

        let points = analyzer.find_stationary(&bounds).unwrap();
        let segments = analyzer.find_stationary_segments(&bounds).unwrap();
        let anchors: Vec<Trackpoint> = segments.iter().map(|s| s.anchor).collect();
        assert_eq!(points, anchors);
        assert_eq!(segments[0].point_range, 0..3);
    }

    #[test]
    fn test_custom_metric() {
        let mut track = Track::new();
        for (i, lon) in [0.0, 0.4, 0.8, 5.0, 5.0].into_iter().enumerate() {
            track
                .add_point(Trackpoint::new(0.0, lon, i as f64 * 10.0))
                .unwrap();
        }
        let bounds = StationaryBounds::new(25.0, 1.0).unwrap();

        // In degrees the first three points stay within 1.0 of each other
        let planar = TrackAnalyzer::with_metric(&track, Planar);
        assert_eq!(planar.find_stationary(&bounds).unwrap().len(), 1);

        // In meters they are tens of kilometers apart
        let meters = TrackAnalyzer::new(&track);
        assert!(meters.find_stationary(&bounds).unwrap().is_empty());

        // A closure works as the distance primitive too
        let lon_only = |a: &Location, b: &Location| (a.lon - b.lon).abs();
        let closure = TrackAnalyzer::with_metric(&track, lon_only);
        assert_eq!(closure.find_stationary(&bounds).unwrap().len(), 1);
    }

    #[test]
    fn test_get_point_delegates_to_track() {
        let track = create_test_track();
        let analyzer = TrackAnalyzer::new(&track);
        assert_eq!(
            analyzer.get_point(10.0).unwrap(),
            Trackpoint::new(51.5074, -0.1278, 10.0)
        );
        assert!(analyzer.get_point(500.0).is_err());
    }

    #[test]
    fn test_concurrent_readers() {
        let track = create_test_track();
        let bounds = StationaryBounds::new(15.0, 1.0).unwrap();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        TrackAnalyzer::new(&track)
                            .find_stationary(&bounds)
                            .map_or(0, |points| points.len())
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), 1);
            }
        });
    }
}
