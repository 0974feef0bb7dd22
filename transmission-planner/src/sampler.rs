use nalgebra as na;
use rand::Rng;

use crate::{
    funcs::generate_random_values_from_ranges,
    pose::{truncate_position, ConfigurationSpace, Pose},
    tree::{NodeId, RrtTree},
};

/// Why a growth attempt did not add a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRejection {
    /// The random position coincides with its nearest node
    Degenerate,
    /// The steered position left the configuration space
    OutOfBounds,
    /// A node with the same position and orientation exists
    Duplicate,
    /// The body collides at the candidate pose
    PoseCollision,
    /// The body collides on the way from the nearest node
    SegmentCollision,
}

/// Candidate pose steered from an existing node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledConfiguration {
    pub nearest: NodeId,
    pub pose: Pose,
}

/// Draws random poses and steers them toward the tree
#[derive(Debug)]
pub struct ConfigurationSampler<R> {
    rng: R,
    /// Length of a single tree edge
    pub step_length: f64,
    /// Random rotations are divided by this before they are added to the
    /// rotation of the nearest node
    pub rotation_divisor: f64,
}

impl<R> ConfigurationSampler<R>
where
    R: Rng,
{
    pub fn new(rng: R, step_length: f64, rotation_divisor: f64) -> Self {
        Self {
            rng,
            step_length,
            rotation_divisor,
        }
    }

    /// Draw a random pose in `space` and steer it from the nearest node
    pub fn sample(
        &mut self,
        tree: &RrtTree,
        space: &ConfigurationSpace,
    ) -> Result<SampledConfiguration, SampleRejection> {
        let position = generate_random_values_from_ranges(&mut self.rng, &space.position_ranges());
        let rotation = generate_random_values_from_ranges(&mut self.rng, &space.rotation_ranges());
        self.steer(
            tree,
            &na::Point3::new(position[0], position[1], position[2]),
            &na::Vector3::new(rotation[0], rotation[1], rotation[2]),
        )
    }

    /// Move `step_length` from the node nearest to `random_position` toward it
    ///
    /// The rotation is not resampled: `random_rotation / rotation_divisor`
    /// (degrees) is added to the rotation of the nearest node. Both results
    /// are truncated to integers.
    pub fn steer(
        &self,
        tree: &RrtTree,
        random_position: &na::Point3<f64>,
        random_rotation: &na::Vector3<f64>,
    ) -> Result<SampledConfiguration, SampleRejection> {
        let (nearest, anchor) = tree.nearest(random_position);
        let direction = (random_position - anchor.position())
            .try_normalize(0.0)
            .ok_or(SampleRejection::Degenerate)?;
        let position = truncate_position(&(anchor.position() + direction * self.step_length));
        let orientation = anchor
            .pose()
            .orientation
            .offset_truncated(&(random_rotation / self.rotation_divisor));
        Ok(SampledConfiguration {
            nearest,
            pose: Pose::new(position, orientation),
        })
    }
}
