//! Circular safe-zone check.

use smartcollar_core::{AlertType, Coordinates, Geofence};

use crate::decision::{AlertDecision, GEOFENCE_TYPES};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in metres (haversine).
pub fn haversine_distance(from: Coordinates, to: Coordinates) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Decide whether `position` is outside the pet's safe zone.
///
/// A pet exactly on the boundary is inside.
pub fn evaluate_geofence(geofence: Option<&Geofence>, position: Coordinates) -> AlertDecision {
    let Some(fence) = geofence else {
        return AlertDecision::NoAlert;
    };

    let distance = haversine_distance(position, fence.center());
    if distance > fence.radius {
        AlertDecision::alert(
            AlertType::Geofence,
            format!(
                "Your pet has left the safe zone! Distance: {}m",
                distance.round() as i64
            ),
        )
    } else {
        AlertDecision::Clear { reset: GEOFENCE_TYPES }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(latitude: f64, longitude: f64) -> Coordinates {
        Coordinates { latitude, longitude }
    }

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let d = haversine_distance(at(0.0, 0.0), at(0.0, 1.0));
        assert!((d - 111_195.0).abs() < 50.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let berlin = at(52.520008, 13.404954);
        let paris = at(48.856613, 2.352222);
        let there = haversine_distance(berlin, paris);
        let back = haversine_distance(paris, berlin);
        assert!((there - back).abs() < 1e-6);
        assert!((there - 877_000.0).abs() < 5_000.0, "got {there}");
        assert_eq!(haversine_distance(berlin, berlin), 0.0);
    }

    #[test]
    fn no_geofence_means_no_alert() {
        assert_eq!(evaluate_geofence(None, at(10.0, 10.0)), AlertDecision::NoAlert);
    }

    #[test]
    fn outside_radius_alerts_with_rounded_distance() {
        let fence = Geofence { latitude: 0.0, longitude: 0.0, radius: 100_000.0 };
        match evaluate_geofence(Some(&fence), at(0.0, 1.0)) {
            AlertDecision::Alert(a) => {
                assert_eq!(a.alert_type, AlertType::Geofence);
                let expected = haversine_distance(at(0.0, 1.0), fence.center()).round() as i64;
                assert_eq!(
                    a.message,
                    format!("Your pet has left the safe zone! Distance: {expected}m")
                );
            }
            other => panic!("expected alert, got {other:?}"),
        }
    }

    #[test]
    fn inside_radius_clears() {
        let fence = Geofence { latitude: 0.0, longitude: 0.0, radius: 200_000.0 };
        assert_eq!(
            evaluate_geofence(Some(&fence), at(0.0, 1.0)),
            AlertDecision::Clear { reset: GEOFENCE_TYPES }
        );
    }

    #[test]
    fn distance_equal_to_radius_is_inside() {
        let position = at(0.001, 0.002);
        let mut fence = Geofence { latitude: 0.0, longitude: 0.0, radius: 0.0 };
        fence.radius = haversine_distance(position, fence.center());
        assert_eq!(
            evaluate_geofence(Some(&fence), position),
            AlertDecision::Clear { reset: GEOFENCE_TYPES }
        );
    }

    #[test]
    fn zero_radius_at_center_is_inside() {
        let fence = Geofence { latitude: 45.0, longitude: 7.0, radius: 0.0 };
        assert!(!evaluate_geofence(Some(&fence), fence.center()).is_alert());
    }
}
