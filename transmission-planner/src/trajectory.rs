use nalgebra as na;
use tracing::debug;

use crate::{errors::*, funcs::interpolate_isometry, pose::Pose};

/// Output of a single [`TrajectoryPlayer::advance`] call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub pose: na::Isometry3<f64>,
    pub is_complete: bool,
}

/// Plays a path back by interpolating between consecutive poses
///
/// Every segment takes `ceil(squared distance / speed)` ticks, so long segments are
/// traveled slower than a constant speed would. A segment of zero length is
/// passed through within the same tick.
#[derive(Debug, Clone)]
pub struct TrajectoryPlayer {
    waypoints: Vec<na::Isometry3<f64>>,
    speed: f64,
    segment: usize,
    /// Ticks spent in the current segment
    ticks: u32,
    progress: f64,
    current: na::Isometry3<f64>,
    is_complete: bool,
}

impl TrajectoryPlayer {
    /// Create a player for `path`, which must contain at least two poses
    pub fn new(path: &[Pose], speed: f64) -> Result<Self> {
        if path.len() < 2 {
            return Err(Error::InvalidTreeState(format!(
                "trajectory needs at least 2 poses, got {}",
                path.len()
            )));
        }
        if !(speed > 0.0 && speed.is_finite()) {
            return Err(Error::Configuration(format!(
                "speed must be positive: {speed}"
            )));
        }
        let waypoints: Vec<_> = path.iter().map(Pose::to_isometry).collect();
        let current = waypoints[0];
        Ok(Self {
            waypoints,
            speed,
            segment: 0,
            ticks: 0,
            progress: 0.0,
            current,
            is_complete: false,
        })
    }

    pub fn num_segments(&self) -> usize {
        self.waypoints.len() - 1
    }

    /// Index of the segment being traveled
    pub fn segment(&self) -> usize {
        self.segment
    }

    /// Progress in the current segment, in `[0, 1)`
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Latest pose
    pub fn pose(&self) -> &na::Isometry3<f64> {
        &self.current
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    /// Rewind to the first pose
    pub fn reset(&mut self) {
        self.segment = 0;
        self.ticks = 0;
        self.progress = 0.0;
        self.current = self.waypoints[0];
        self.is_complete = false;
    }

    /// Ticks the current segment lasts, `None` for zero length
    fn duration(&self) -> Option<f64> {
        let from = &self.waypoints[self.segment].translation.vector;
        let to = &self.waypoints[self.segment + 1].translation.vector;
        let duration = (to - from).norm_squared() / self.speed;
        (duration > 0.0).then_some(duration)
    }

    /// Snap to the end of the current segment and move to the next one
    fn finish_segment(&mut self) {
        self.current = self.waypoints[self.segment + 1];
        self.segment += 1;
        self.ticks = 0;
        self.progress = 0.0;
        if self.segment >= self.num_segments() {
            debug!("trajectory complete");
            self.is_complete = true;
        }
    }

    fn point(&self) -> TrajectoryPoint {
        TrajectoryPoint {
            pose: self.current,
            is_complete: self.is_complete,
        }
    }

    /// Pass through zero length segments without spending a tick on them
    fn skip_zero_length_segments(&mut self) {
        while !self.is_complete && self.duration().is_none() {
            self.finish_segment();
        }
    }

    /// Move one tick along the trajectory
    pub fn advance(&mut self) -> TrajectoryPoint {
        self.skip_zero_length_segments();
        if self.is_complete {
            return self.point();
        }
        let Some(duration) = self.duration() else {
            return self.point();
        };
        self.ticks += 1;
        // a segment lasts exactly ceil(duration) ticks
        if f64::from(self.ticks) >= duration {
            self.finish_segment();
            self.skip_zero_length_segments();
        } else {
            self.progress = f64::from(self.ticks) / duration;
            self.current = interpolate_isometry(
                &self.waypoints[self.segment],
                &self.waypoints[self.segment + 1],
                self.progress,
            );
        }
        self.point()
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    fn pose(x: f64, y: f64) -> Pose {
        Pose::from_parts([x, y, 0.0], [0.0; 3])
    }

    fn ticks_to_complete(player: &mut TrajectoryPlayer) -> usize {
        let mut ticks = 0;
        while !player.advance().is_complete {
            ticks += 1;
            assert!(ticks < 100_000);
        }
        ticks + 1
    }

    #[test]
    fn single_segment_takes_squared_distance_over_speed() {
        for (distance, speed, expected) in [
            (10.0, 25.0, 4),
            (10.0, 50.0, 2),
            (4.0, 2.0, 8),
            (3.0, 2.0, 5),
            (1.0, 5.0, 1),
            (10.0, 10.0, 10),
            (20.0, 1.0, 400),
            (7.0, 7.0, 7),
            (10.0, 3.0, 34),
        ] {
            let mut player = TrajectoryPlayer::new(&[pose(0.0, 0.0), pose(distance, 0.0)], speed)
                .unwrap();
            assert_eq!(ticks_to_complete(&mut player), expected);
            assert_eq!(player.pose().translation.vector.x, distance);
        }
    }

    #[test]
    fn passes_through_every_node() {
        let path = [pose(0.0, 0.0), pose(10.0, 0.0), pose(10.0, 10.0)];
        let mut player = TrajectoryPlayer::new(&path, 50.0).unwrap();
        assert_eq!(player.num_segments(), 2);

        let p = player.advance();
        assert_approx_eq!(p.pose.translation.vector.x, 5.0);
        assert!(!p.is_complete);

        let p = player.advance();
        assert_eq!(p.pose.translation.vector, na::Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(player.segment(), 1);
        assert_eq!(player.progress(), 0.0);

        let p = player.advance();
        assert_approx_eq!(p.pose.translation.vector.y, 5.0);
        assert_approx_eq!(p.pose.translation.vector.x, 10.0);

        let p = player.advance();
        assert!(p.is_complete);
        assert_eq!(p.pose.translation.vector, na::Vector3::new(10.0, 10.0, 0.0));

        // no more motion after completion
        assert_eq!(player.advance(), p);
    }

    #[test]
    fn zero_length_segments_pass_through() {
        let path = [pose(0.0, 0.0), pose(0.0, 0.0), pose(2.0, 0.0), pose(2.0, 0.0)];
        let mut player = TrajectoryPlayer::new(&path, 4.0).unwrap();
        let p = player.advance();
        assert!(p.is_complete);
        assert_eq!(p.pose.translation.vector.x, 2.0);

        let mut player = TrajectoryPlayer::new(&[pose(1.0, 1.0), pose(1.0, 1.0)], 4.0).unwrap();
        assert!(player.advance().is_complete);
    }

    #[test]
    fn rotation_is_interpolated() {
        let path = [
            Pose::from_parts([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
            Pose::from_parts([2.0, 0.0, 0.0], [0.0, 0.0, 90.0]),
        ];
        let mut player = TrajectoryPlayer::new(&path, 1.0).unwrap();
        player.advance();
        let p = player.advance();
        assert_approx_eq!(p.pose.rotation.angle().to_degrees(), 45.0, 1e-9);
        player.advance();
        let p = player.advance();
        assert!(p.is_complete);
        assert_approx_eq!(p.pose.rotation.angle().to_degrees(), 90.0, 1e-9);
    }

    #[test]
    fn reset_rewinds() {
        let path = [pose(0.0, 0.0), pose(1.0, 0.0)];
        let mut player = TrajectoryPlayer::new(&path, 1.0).unwrap();
        assert!(player.advance().is_complete);
        player.reset();
        assert!(!player.is_complete());
        assert_eq!(player.pose().translation.vector.x, 0.0);
        assert!(player.advance().is_complete);
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            TrajectoryPlayer::new(&[pose(0.0, 0.0)], 1.0),
            Err(Error::InvalidTreeState(_))
        ));
        assert!(matches!(
            TrajectoryPlayer::new(&[pose(0.0, 0.0), pose(1.0, 0.0)], 0.0),
            Err(Error::Configuration(_))
        ));
    }
}
