use nalgebra as na;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::*;

/// Euler angles in degrees, normalized into `[0, 360)`
///
/// Angles are stored the way an engine reads them back from a rotation, so
/// two orientations compare equal exactly when their stored angles do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    degrees: na::Vector3<f64>,
}

impl Orientation {
    pub fn from_degrees(x: f64, y: f64, z: f64) -> Self {
        Self {
            degrees: na::Vector3::new(
                normalize_degrees(x),
                normalize_degrees(y),
                normalize_degrees(z),
            ),
        }
    }

    pub fn identity() -> Self {
        Self::from_degrees(0.0, 0.0, 0.0)
    }

    pub fn degrees(&self) -> &na::Vector3<f64> {
        &self.degrees
    }

    /// Add `delta` (degrees), truncate every angle toward zero and normalize again
    pub fn offset_truncated(&self, delta: &na::Vector3<f64>) -> Self {
        let sum = self.degrees + delta;
        Self::from_degrees(sum.x.trunc(), sum.y.trunc(), sum.z.trunc())
    }

    pub fn to_unit_quaternion(&self) -> na::UnitQuaternion<f64> {
        na::UnitQuaternion::from_euler_angles(
            self.degrees.x.to_radians(),
            self.degrees.y.to_radians(),
            self.degrees.z.to_radians(),
        )
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

fn normalize_degrees(angle: f64) -> f64 {
    angle.rem_euclid(360.0)
}

/// Position and orientation of the moving body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: na::Point3<f64>,
    pub orientation: Orientation,
}

impl Pose {
    pub fn new(position: na::Point3<f64>, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose from a position and Euler angles in degrees
    ///
    /// ```
    /// let pose = transmission_planner::Pose::from_parts([1.0, 2.0, 0.0], [0.0, 0.0, -90.0]);
    /// assert_eq!(pose.orientation.degrees().z, 270.0);
    /// ```
    pub fn from_parts(position: [f64; 3], degrees: [f64; 3]) -> Self {
        Self::new(
            na::Point3::from(position),
            Orientation::from_degrees(degrees[0], degrees[1], degrees[2]),
        )
    }

    pub fn to_isometry(&self) -> na::Isometry3<f64> {
        na::Isometry3::from_parts(
            na::Translation3::from(self.position.coords),
            self.orientation.to_unit_quaternion(),
        )
    }
}

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl Default for Axis {
    fn default() -> Self {
        Axis::Y
    }
}

/// Closed integer interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

impl AxisRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        f64::from(self.min) <= value && value <= f64::from(self.max)
    }
}

/// Sampling domain of the planner
///
/// The default is the planar transmission scene: the shaft moves in the
/// X/Y plane and rotates only around Z.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ConfigurationSpace {
    #[serde(default = "default_x_position")]
    pub x_position: AxisRange,
    #[serde(default = "default_y_position")]
    pub y_position: AxisRange,
    #[serde(default = "default_z_position")]
    pub z_position: AxisRange,
    #[serde(default = "default_locked_rotation")]
    pub x_rotation: AxisRange,
    #[serde(default = "default_locked_rotation")]
    pub y_rotation: AxisRange,
    #[serde(default = "default_z_rotation")]
    pub z_rotation: AxisRange,
}

fn default_x_position() -> AxisRange {
    AxisRange::new(-881, 276)
}

fn default_y_position() -> AxisRange {
    AxisRange::new(100, 820)
}

fn default_z_position() -> AxisRange {
    AxisRange::new(0, 0)
}

fn default_locked_rotation() -> AxisRange {
    AxisRange::new(0, 0)
}

fn default_z_rotation() -> AxisRange {
    AxisRange::new(-90, 90)
}

impl Default for ConfigurationSpace {
    fn default() -> Self {
        Self {
            x_position: default_x_position(),
            y_position: default_y_position(),
            z_position: default_z_position(),
            x_rotation: default_locked_rotation(),
            y_rotation: default_locked_rotation(),
            z_rotation: default_z_rotation(),
        }
    }
}

impl ConfigurationSpace {
    /// Space with the given position ranges and all rotations locked at zero
    pub fn planar(x: AxisRange, y: AxisRange) -> Self {
        Self {
            x_position: x,
            y_position: y,
            z_position: AxisRange::new(0, 0),
            x_rotation: AxisRange::new(0, 0),
            y_rotation: AxisRange::new(0, 0),
            z_rotation: AxisRange::new(0, 0),
        }
    }

    pub fn position_ranges(&self) -> [AxisRange; 3] {
        [self.x_position, self.y_position, self.z_position]
    }

    pub fn rotation_ranges(&self) -> [AxisRange; 3] {
        [self.x_rotation, self.y_rotation, self.z_rotation]
    }

    pub fn contains_position(&self, position: &na::Point3<f64>) -> bool {
        self.position_ranges()
            .iter()
            .zip(position.iter())
            .all(|(range, value)| range.contains(*value))
    }

    /// Reject ranges whose minimum is larger than the maximum
    pub fn validate(&self) -> Result<()> {
        let names = ["x_position", "y_position", "z_position"]
            .iter()
            .zip(self.position_ranges())
            .chain(
                ["x_rotation", "y_rotation", "z_rotation"]
                    .iter()
                    .zip(self.rotation_ranges()),
            );
        for (name, range) in names {
            if range.min > range.max {
                return Err(Error::Configuration(format!(
                    "{name}: min {} is larger than max {}",
                    range.min, range.max
                )));
            }
        }
        Ok(())
    }
}

/// Truncate every coordinate toward zero
pub fn truncate_position(position: &na::Point3<f64>) -> na::Point3<f64> {
    position.map(f64::trunc)
}
