//! # Task declaration
//!
//! Pilot, aircraft and task data uploaded to flight recorders before take-off. The wire encoding is
//! up to each logger driver; this module only validates the bounds every recorder shares.

use crate::consts::{
    AIRCRAFT_FIELD_CAPACITY, DEVICE_NAME_CAPACITY, MAX_TASK_POINTS, PILOT_NAME_CAPACITY,
};
use crate::core::nav::GeoPoint;
use crate::core::utils::BoundedText;

use crate::prelude::*;

/// Task turn point.
#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    name: BoundedText<DEVICE_NAME_CAPACITY>,
    location: GeoPoint,
    altitude: f64,
}

impl Waypoint {
    /// Creates a waypoint. Fails if `name` is longer than
    /// [`DEVICE_NAME_CAPACITY`](crate::consts::DEVICE_NAME_CAPACITY) characters.
    pub fn new(name: &str, location: GeoPoint, altitude: f64) -> Result<Self> {
        Ok(Self {
            name: BoundedText::new(name)?,
            location,
            altitude,
        })
    }

    /// Waypoint name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Waypoint position.
    pub fn location(&self) -> GeoPoint {
        self.location
    }

    /// Elevation above mean sea level, metres.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }
}

/// Pilot, aircraft and an ordered list of task waypoints.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pilot_name: BoundedText<PILOT_NAME_CAPACITY>,
    aircraft_type: BoundedText<AIRCRAFT_FIELD_CAPACITY>,
    aircraft_registration: BoundedText<AIRCRAFT_FIELD_CAPACITY>,
    waypoints: Vec<Waypoint>,
}

impl Declaration {
    /// Creates a declaration.
    ///
    /// Fails if any text field exceeds its capacity or if there are more than
    /// [`MAX_TASK_POINTS`](crate::consts::MAX_TASK_POINTS) waypoints.
    pub fn new(
        pilot_name: &str,
        aircraft_type: &str,
        aircraft_registration: &str,
        waypoints: Vec<Waypoint>,
    ) -> Result<Self> {
        if waypoints.len() > MAX_TASK_POINTS {
            return Err(Error::TooManyWaypoints {
                count: waypoints.len(),
                max: MAX_TASK_POINTS,
            });
        }

        Ok(Self {
            pilot_name: BoundedText::new(pilot_name)?,
            aircraft_type: BoundedText::new(aircraft_type)?,
            aircraft_registration: BoundedText::new(aircraft_registration)?,
            waypoints,
        })
    }

    /// Pilot name.
    pub fn pilot_name(&self) -> &str {
        self.pilot_name.as_str()
    }

    /// Aircraft type.
    pub fn aircraft_type(&self) -> &str {
        self.aircraft_type.as_str()
    }

    /// Aircraft registration.
    pub fn aircraft_registration(&self) -> &str {
        self.aircraft_registration.as_str()
    }

    /// Task waypoints in flight order.
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }
}

#[cfg(test)]
mod declaration_tests {
    use super::*;

    fn waypoint(name: &str) -> Waypoint {
        Waypoint::new(name, GeoPoint::default(), 0.0).unwrap()
    }

    #[test]
    fn declaration_bounds_are_enforced() {
        let waypoints = (0..MAX_TASK_POINTS).map(|i| waypoint(&format!("TP{i}"))).collect();
        assert!(Declaration::new("Jane Doe", "LS8", "D-1234", waypoints).is_ok());

        let waypoints = (0..=MAX_TASK_POINTS).map(|i| waypoint(&format!("TP{i}"))).collect();
        assert!(matches!(
            Declaration::new("Jane Doe", "LS8", "D-1234", waypoints),
            Err(Error::TooManyWaypoints { .. })
        ));

        let long_type = "X".repeat(AIRCRAFT_FIELD_CAPACITY + 1);
        assert!(matches!(
            Declaration::new("Jane Doe", &long_type, "D-1234", Vec::new()),
            Err(Error::TextTooLong { .. })
        ));
    }
}
