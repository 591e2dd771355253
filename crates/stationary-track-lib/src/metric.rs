//! Distance primitives used by the stationary scan

use crate::Location;
use geo::{Distance, Point};

/// A distance function between two locations
///
/// Implementations are expected to be symmetric, non-negative and zero for equal
/// locations. None of this is verified by the algorithms that consume it.
pub trait DistanceMetric {
    fn distance(&self, a: &Location, b: &Location) -> f64;
}

/// Great-circle distance in meters on a spherical Earth
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Haversine;

impl DistanceMetric for Haversine {
    #[inline]
    fn distance(&self, a: &Location, b: &Location) -> f64 {
        geo::Haversine.distance(Point::from(*a), Point::from(*b))
    }
}

/// Euclidean distance treating (lat, lon) as plane coordinates
///
/// Useful for already-projected data and synthetic tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Planar;

impl DistanceMetric for Planar {
    #[inline]
    fn distance(&self, a: &Location, b: &Location) -> f64 {
        (a.lat - b.lat).hypot(a.lon - b.lon)
    }
}

impl<F> DistanceMetric for F
where
    F: Fn(&Location, &Location) -> f64,
{
    #[inline]
    fn distance(&self, a: &Location, b: &Location) -> f64 {
        self(a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_zero_for_equal_locations() {
        let london = Location::new(51.5074, -0.1278);
        assert_eq!(Haversine.distance(&london, &london), 0.0);
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        // One degree of latitude is roughly 111.2 km
        let a = Location::new(0.0, 0.0);
        let b = Location::new(1.0, 0.0);
        let dist = Haversine.distance(&a, &b);
        assert!((dist - 111_195.0).abs() < 100.0, "got {dist}");
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = Location::new(51.5074, -0.1278);
        let b = Location::new(48.8566, 2.3522);
        let ab = Haversine.distance(&a, &b);
        let ba = Haversine.distance(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
        // London to Paris is a bit over 340 km
        assert!(ab > 330_000.0 && ab < 350_000.0);
    }

    #[test]
    fn test_planar_distance() {
        let a = Location::new(0.0, 0.0);
        let b = Location::new(3.0, 4.0);
        assert!((Planar.distance(&a, &b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_closure_metric() {
        let lat_only = |a: &Location, b: &Location| (a.lat - b.lat).abs();
        let a = Location::new(1.0, 100.0);
        let b = Location::new(4.0, -100.0);
        assert_eq!(lat_only.distance(&a, &b), 3.0);
    }
}
