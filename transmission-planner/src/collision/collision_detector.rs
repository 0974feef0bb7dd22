/*
Copyright 2017 Takashi Ogura

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/
use std::fmt;

use nalgebra as na;
use ncollide3d::{
    bounding_volume::BoundingVolume,
    query,
    shape::{Shape, ShapeHandle},
};
use tracing::debug;

use crate::{errors::*, funcs::interpolate_isometry, pose::Pose};

/// Interpolation fractions checked between two poses
///
/// The end pose itself (1.0) is not included, it has to be checked on its own.
pub const SEGMENT_FRACTIONS: [f64; 5] = [0.0, 0.2, 0.4, 0.6, 0.8];

/// Rigid shapes with their poses relative to a common frame
#[derive(Clone, Default)]
pub struct ShapeSet {
    shapes: Vec<(na::Isometry3<f64>, ShapeHandle<f64>)>,
}

impl ShapeSet {
    pub fn new(shapes: Vec<(na::Isometry3<f64>, ShapeHandle<f64>)>) -> Self {
        Self { shapes }
    }

    /// Add `shape` placed at `pose`
    pub fn with_shape<S>(mut self, pose: na::Isometry3<f64>, shape: S) -> Self
    where
        S: Shape<f64>,
    {
        self.shapes.push((pose, ShapeHandle::new(shape)));
        self
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn shapes(&self) -> &[(na::Isometry3<f64>, ShapeHandle<f64>)] {
        &self.shapes
    }
}

impl fmt::Debug for ShapeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShapeSet")
            .field("poses", &self.shapes.iter().map(|s| s.0).collect::<Vec<_>>())
            .finish()
    }
}

/// Lists colliding (body shape index, obstacle shape index) pairs
pub struct CollidingPairs<'a> {
    detector: &'a BodyCollisionDetector,
    body_pose: na::Isometry3<f64>,
    index: usize,
}

impl<'a> CollidingPairs<'a> {
    pub fn new(detector: &'a BodyCollisionDetector, body_pose: na::Isometry3<f64>) -> Self {
        Self {
            detector,
            body_pose,
            index: 0,
        }
    }
}

impl fmt::Debug for CollidingPairs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollidingPairs")
            .field("body_pose", &self.body_pose)
            .field("index", &self.index)
            .finish()
    }
}

impl Iterator for CollidingPairs<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        let body = self.detector.body.shapes();
        let obstacles = self.detector.obstacles.shapes();
        while self.index < body.len() * obstacles.len() {
            let body_index = self.index / obstacles.len();
            let obstacle_index = self.index % obstacles.len();
            self.index += 1;

            let (local_pose, body_shape) = &body[body_index];
            let (obstacle_pose, obstacle_shape) = &obstacles[obstacle_index];
            let body_shape_pose = self.body_pose * local_pose;

            // Skip pairs whose bounding boxes are apart
            let aabb1 = body_shape
                .aabb(&body_shape_pose)
                .loosened(self.detector.margin);
            let aabb2 = obstacle_shape.aabb(obstacle_pose);
            if !aabb1.intersects(&aabb2) {
                continue;
            }

            // Check conflicts precisely
            let dist = query::distance(
                &body_shape_pose,
                &**body_shape,
                obstacle_pose,
                &**obstacle_shape,
            );
            if dist <= self.detector.margin {
                debug!(body_index, obstacle_index, dist, "colliding");
                return Some((body_index, obstacle_index));
            }
        }
        None
    }
}

/// Collision detector between a moving body and static obstacles
///
/// The body shapes are given in the body frame and placed at the queried
/// pose, the obstacle shapes are given in the world frame.
#[derive(Clone, Debug)]
pub struct BodyCollisionDetector {
    body: ShapeSet,
    obstacles: ShapeSet,
    /// Shapes closer than this are regarded as colliding
    pub margin: f64,
}

impl BodyCollisionDetector {
    /// Create the detector, rejecting empty shape sets and negative margins
    pub fn new(body: ShapeSet, obstacles: ShapeSet, margin: f64) -> Result<Self> {
        if body.is_empty() {
            return Err(Error::Configuration("body has no collision shape".to_owned()));
        }
        if obstacles.is_empty() {
            return Err(Error::Configuration(
                "obstacle set has no collision shape".to_owned(),
            ));
        }
        if !(margin >= 0.0) {
            return Err(Error::Configuration(format!(
                "margin must not be negative: {margin}"
            )));
        }
        Ok(Self {
            body,
            obstacles,
            margin,
        })
    }

    /// Detects collisions of the body placed at `body_pose`
    pub fn detect(&self, body_pose: &na::Isometry3<f64>) -> CollidingPairs<'_> {
        CollidingPairs::new(self, *body_pose)
    }

    /// Returns all colliding (body shape index, obstacle shape index) pairs at `pose`
    pub fn colliding_pairs(&self, pose: &Pose) -> Vec<(usize, usize)> {
        self.detect(&pose.to_isometry()).collect()
    }

    /// Returns true if any body shape collides with any obstacle at `pose`
    pub fn is_pose_colliding(&self, pose: &Pose) -> bool {
        self.detect(&pose.to_isometry()).next().is_some()
    }

    /// Returns true if the body collides on the way from `from` to `to`
    ///
    /// Only the poses at [`SEGMENT_FRACTIONS`] are checked, so `to` must be
    /// checked with [`Self::is_pose_colliding`] separately.
    pub fn is_segment_colliding(&self, from: &Pose, to: &Pose) -> bool {
        let from = from.to_isometry();
        let to = to.to_isometry();
        SEGMENT_FRACTIONS.iter().any(|&t| {
            let colliding = self
                .detect(&interpolate_isometry(&from, &to, t))
                .next()
                .is_some();
            if colliding {
                debug!(t, "segment is colliding");
            }
            colliding
        })
    }
}

#[cfg(test)]
mod tests {
    use na::{Isometry3, Vector3};
    use ncollide3d::shape::{Ball, Cuboid};

    use super::*;

    fn ball_detector(body_radius: f64, obstacle_center: [f64; 3], obstacle_radius: f64) -> BodyCollisionDetector {
        let body = ShapeSet::default().with_shape(Isometry3::identity(), Ball::new(body_radius));
        let obstacles = ShapeSet::default().with_shape(
            Isometry3::translation(obstacle_center[0], obstacle_center[1], obstacle_center[2]),
            Ball::new(obstacle_radius),
        );
        BodyCollisionDetector::new(body, obstacles, 0.0).unwrap()
    }

    #[test]
    fn sphere_obstacle_rejects_overlapping_pose() {
        let detector = ball_detector(5.0, [50.0, 0.0, 0.0], 10.0);
        assert!(!detector.is_pose_colliding(&Pose::from_parts([0.0, 0.0, 0.0], [0.0; 3])));
        assert!(!detector.is_pose_colliding(&Pose::from_parts([34.0, 0.0, 0.0], [0.0; 3])));
        assert!(detector.is_pose_colliding(&Pose::from_parts([40.0, 0.0, 0.0], [0.0; 3])));
        assert!(detector.is_pose_colliding(&Pose::from_parts([50.0, 3.0, 0.0], [0.0; 3])));
        assert_eq!(
            detector.colliding_pairs(&Pose::from_parts([40.0, 0.0, 0.0], [0.0; 3])),
            vec![(0, 0)]
        );
    }

    #[test]
    fn rotation_is_applied_to_the_body() {
        let body = ShapeSet::default().with_shape(
            Isometry3::identity(),
            Cuboid::new(Vector3::new(20.0, 2.0, 2.0)),
        );
        let obstacles =
            ShapeSet::default().with_shape(Isometry3::translation(0.0, 15.0, 0.0), Ball::new(5.0));
        let detector = BodyCollisionDetector::new(body, obstacles, 0.0).unwrap();
        assert!(!detector.is_pose_colliding(&Pose::from_parts([0.0, 0.0, 0.0], [0.0; 3])));
        assert!(detector.is_pose_colliding(&Pose::from_parts([0.0, 0.0, 0.0], [0.0, 0.0, 90.0])));
    }

    #[test]
    fn local_body_pose_is_applied() {
        let body = ShapeSet::default()
            .with_shape(Isometry3::identity(), Ball::new(1.0))
            .with_shape(Isometry3::translation(10.0, 0.0, 0.0), Ball::new(1.0));
        let obstacles =
            ShapeSet::default().with_shape(Isometry3::translation(10.0, 0.0, 0.0), Ball::new(1.0));
        let detector = BodyCollisionDetector::new(body, obstacles, 0.0).unwrap();
        let pose = Pose::from_parts([0.0, 0.0, 0.0], [0.0; 3]);
        assert_eq!(detector.colliding_pairs(&pose), vec![(1, 0)]);
        let pose = Pose::from_parts([0.0, 5.0, 0.0], [0.0; 3]);
        assert!(detector.colliding_pairs(&pose).is_empty());
    }

    #[test]
    fn margin_widens_collisions() {
        let body = ShapeSet::default().with_shape(Isometry3::identity(), Ball::new(1.0));
        let obstacles =
            ShapeSet::default().with_shape(Isometry3::translation(5.0, 0.0, 0.0), Ball::new(1.0));
        let pose = Pose::from_parts([0.0, 0.0, 0.0], [0.0; 3]);
        let detector = BodyCollisionDetector::new(body.clone(), obstacles.clone(), 0.0).unwrap();
        assert!(!detector.is_pose_colliding(&pose));
        let detector = BodyCollisionDetector::new(body, obstacles, 4.0).unwrap();
        assert!(detector.is_pose_colliding(&pose));
    }

    #[test]
    fn segment_detects_obstacle_between_free_ends() {
        let detector = ball_detector(1.0, [50.0, 0.0, 0.0], 15.0);
        let from = Pose::from_parts([0.0, 0.0, 0.0], [0.0; 3]);
        let to = Pose::from_parts([100.0, 0.0, 0.0], [0.0; 3]);
        assert!(!detector.is_pose_colliding(&from));
        assert!(!detector.is_pose_colliding(&to));
        assert!(detector.is_segment_colliding(&from, &to));
        let short = Pose::from_parts([10.0, 0.0, 0.0], [0.0; 3]);
        assert!(!detector.is_segment_colliding(&from, &short));
    }

    #[test]
    fn segment_check_excludes_end_pose() {
        let detector = ball_detector(1.0, [40.0, 0.0, 0.0], 5.0);
        let from = Pose::from_parts([0.0, 0.0, 0.0], [0.0; 3]);
        let to = Pose::from_parts([40.0, 0.0, 0.0], [0.0; 3]);
        // the last sample is at x = 32
        assert!(!detector.is_segment_colliding(&from, &to));
        assert!(detector.is_pose_colliding(&to));
    }

    #[test]
    fn empty_sets_are_rejected() {
        let ball = ShapeSet::default().with_shape(Isometry3::identity(), Ball::new(1.0));
        assert!(matches!(
            BodyCollisionDetector::new(ShapeSet::default(), ball.clone(), 0.0),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            BodyCollisionDetector::new(ball.clone(), ShapeSet::default(), 0.0),
            Err(Error::Configuration(_))
        ));
        assert!(BodyCollisionDetector::new(ball.clone(), ball, -1.0).is_err());
    }
}
