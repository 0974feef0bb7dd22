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
use rand::{rngs::StdRng, SeedableRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::*;

use crate::{
    collision::{BodyCollisionDetector, ShapeSet},
    errors::*,
    pose::{Axis, ConfigurationSpace, Pose},
    sampler::{ConfigurationSampler, SampleRejection, SampledConfiguration},
    sink::ResultSink,
    trajectory::{TrajectoryPlayer, TrajectoryPoint},
    tree::{extract_path, NodeId, RrtTree},
};

/// State of [`RrtPlanner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerPhase {
    /// The tree grows by one attempt per tick
    Growth,
    /// A node reached the height of the goal, the goal is appended next
    GoalHeight,
    /// The tree is complete
    Orient,
    /// The path is extracted next
    PathReady,
    /// The trajectory is played back
    Traveling,
    Done,
}

/// What happened during a single [`RrtPlanner::tick`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlannerEvent {
    NodeAdded(NodeId),
    Rejected(SampleRejection),
    GoalAppended(NodeId),
    GrowthFinished,
    PathExtracted { len: usize },
    Moved(TrajectoryPoint),
    Finished,
}

#[derive(Clone, Serialize, Deserialize, Debug, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RrtPlannerConfig {
    /// Length of a single tree edge
    #[serde(default = "default_step_length")]
    pub step_length: f64,
    /// Playback speed, in squared length per tick
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Max num of growth attempts
    #[serde(default = "default_max_try")]
    pub max_try: usize,
    /// A node closer than this to the goal height ends the growth
    #[serde(default = "default_goal_tolerance")]
    pub goal_tolerance: f64,
    #[serde(default)]
    pub height_axis: Axis,
    #[serde(default = "default_rotation_divisor")]
    pub rotation_divisor: f64,
    /// Check the collision of the goal pose before it is appended
    #[serde(default = "default_validate_goal")]
    pub validate_goal: bool,
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Seed of the random generator, drawn from the OS if missing
    #[serde(default)]
    pub seed: Option<u64>,
    // tables have to follow plain values in TOML
    #[serde(default)]
    pub space: ConfigurationSpace,
}

fn default_step_length() -> f64 {
    10.0
}

fn default_speed() -> f64 {
    100.0
}

fn default_max_try() -> usize {
    10000
}

fn default_goal_tolerance() -> f64 {
    10.0
}

fn default_rotation_divisor() -> f64 {
    20.0
}

fn default_validate_goal() -> bool {
    true
}

fn default_margin() -> f64 {
    0.0
}

impl Default for RrtPlannerConfig {
    fn default() -> Self {
        Self {
            step_length: default_step_length(),
            speed: default_speed(),
            max_try: default_max_try(),
            goal_tolerance: default_goal_tolerance(),
            height_axis: Axis::default(),
            rotation_divisor: default_rotation_divisor(),
            validate_goal: default_validate_goal(),
            margin: default_margin(),
            seed: None,
            space: ConfigurationSpace::default(),
        }
    }
}

impl RrtPlannerConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("step_length", self.step_length),
            ("speed", self.speed),
            ("goal_tolerance", self.goal_tolerance),
        ];
        for (name, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(Error::Configuration(format!(
                    "{name} must be positive: {value}"
                )));
            }
        }
        if self.rotation_divisor == 0.0 || !self.rotation_divisor.is_finite() {
            return Err(Error::Configuration(format!(
                "invalid rotation_divisor: {}",
                self.rotation_divisor
            )));
        }
        self.space.validate()
    }
}

/// Incremental RRT planner driven by [`RrtPlanner::tick`]
///
/// The tree grows from the start pose until a node is within
/// `goal_tolerance` of the goal along `height_axis`. The goal is then
/// connected to that node, the path from the start is extracted and finally
/// played back one tick at a time.
#[derive(Debug)]
pub struct RrtPlanner {
    config: RrtPlannerConfig,
    goal: Pose,
    sampler: ConfigurationSampler<StdRng>,
    /// Released when the growth is complete
    detector: Option<BodyCollisionDetector>,
    tree: RrtTree,
    phase: PlannerPhase,
    num_tries: usize,
    path: Option<Vec<Pose>>,
    player: Option<TrajectoryPlayer>,
}

impl RrtPlanner {
    pub fn phase(&self) -> PlannerPhase {
        self.phase
    }

    pub fn config(&self) -> &RrtPlannerConfig {
        &self.config
    }

    pub fn tree(&self) -> &RrtTree {
        &self.tree
    }

    pub fn start(&self) -> &Pose {
        self.tree.root().pose()
    }

    pub fn goal(&self) -> &Pose {
        &self.goal
    }

    /// Number of growth attempts so far
    pub fn num_tries(&self) -> usize {
        self.num_tries
    }

    /// Path from the start to the goal, available once it is extracted
    pub fn path(&self) -> Option<&[Pose]> {
        self.path.as_deref()
    }

    pub fn player(&self) -> Option<&TrajectoryPlayer> {
        self.player.as_ref()
    }

    /// Run one step of the current phase
    pub fn tick(&mut self) -> Result<PlannerEvent> {
        match self.phase {
            PlannerPhase::Growth => self.grow(),
            PlannerPhase::GoalHeight => self.append_goal(),
            PlannerPhase::Orient => {
                self.detector = None;
                self.phase = PlannerPhase::PathReady;
                info!(
                    nodes = self.tree.len(),
                    tries = self.num_tries,
                    "growth finished"
                );
                Ok(PlannerEvent::GrowthFinished)
            }
            PlannerPhase::PathReady => {
                let path = extract_path(&self.tree)?;
                self.player = Some(TrajectoryPlayer::new(&path, self.config.speed)?);
                let len = path.len();
                self.path = Some(path);
                self.phase = PlannerPhase::Traveling;
                info!(len, "path extracted");
                Ok(PlannerEvent::PathExtracted { len })
            }
            PlannerPhase::Traveling => {
                let player = self.player.as_mut().ok_or_else(|| {
                    Error::InvalidTreeState("traveling without a trajectory".to_owned())
                })?;
                let point = player.advance();
                if point.is_complete {
                    info!("goal reached");
                    self.phase = PlannerPhase::Done;
                }
                Ok(PlannerEvent::Moved(point))
            }
            PlannerPhase::Done => Ok(PlannerEvent::Finished),
        }
    }

    /// Tick until the path is extracted and return it
    pub fn plan(&mut self) -> Result<Vec<Pose>> {
        loop {
            if let Some(path) = &self.path {
                return Ok(path.clone());
            }
            self.tick()?;
        }
    }

    /// Write the path and all the explored positions to `sink`
    pub fn export<S>(&self, sink: &mut S) -> Result<()>
    where
        S: ResultSink + ?Sized,
    {
        let path = self.path.as_ref().ok_or_else(|| {
            Error::InvalidTreeState("path is not extracted yet".to_owned())
        })?;
        let positions: Vec<_> = path.iter().map(|pose| pose.position).collect();
        sink.write_path(&positions)?;
        sink.write_tree(&self.tree.positions())
    }

    fn detector(&self) -> Result<&BodyCollisionDetector> {
        self.detector.as_ref().ok_or_else(|| {
            Error::InvalidTreeState("collision detector was already released".to_owned())
        })
    }

    fn grow(&mut self) -> Result<PlannerEvent> {
        if self.num_tries >= self.config.max_try {
            return Err(Error::PlanningFailed {
                max_try: self.config.max_try,
            });
        }
        self.num_tries += 1;
        match self.try_extend() {
            Ok(id) => {
                let axis = self.config.height_axis.index();
                let height = self.tree.last_pose().position[axis];
                if (height - self.goal.position[axis]).abs() < self.config.goal_tolerance {
                    info!(id, height, "goal height reached");
                    self.phase = PlannerPhase::GoalHeight;
                }
                Ok(PlannerEvent::NodeAdded(id))
            }
            Err(Extension::Rejected(rejection)) => {
                trace!(?rejection, "sample rejected");
                Ok(PlannerEvent::Rejected(rejection))
            }
            Err(Extension::Failed(e)) => Err(e),
        }
    }

    fn try_extend(&mut self) -> std::result::Result<NodeId, Extension> {
        let SampledConfiguration { nearest, pose } =
            self.sampler.sample(&self.tree, &self.config.space)?;
        if !self.config.space.contains_position(&pose.position) {
            return Err(SampleRejection::OutOfBounds.into());
        }
        if self.tree.contains_pose(&pose) {
            return Err(SampleRejection::Duplicate.into());
        }
        let detector = self.detector()?;
        if detector.is_pose_colliding(&pose) {
            return Err(SampleRejection::PoseCollision.into());
        }
        let anchor = self
            .tree
            .node(nearest)
            .ok_or_else(|| Error::InvalidTreeState(format!("node {nearest} does not exist")))?;
        if detector.is_segment_colliding(anchor.pose(), &pose) {
            return Err(SampleRejection::SegmentCollision.into());
        }
        Ok(self.tree.insert(pose, nearest)?)
    }

    fn append_goal(&mut self) -> Result<PlannerEvent> {
        let last = self.tree.last_id();
        // the goal pose itself is checked by the builder
        if self.config.validate_goal {
            if self.detector()?.is_segment_colliding(self.tree.last_pose(), &self.goal) {
                return Err(Error::GoalUnreachable(format!(
                    "segment from node {last} to the goal is colliding"
                )));
            }
        } else {
            warn!("appending the goal without collision check");
        }
        let id = self.tree.insert(self.goal, last)?;
        self.phase = PlannerPhase::Orient;
        info!(id, parent = last, "goal appended");
        Ok(PlannerEvent::GoalAppended(id))
    }
}

/// Failure of a single growth attempt
enum Extension {
    Rejected(SampleRejection),
    Failed(Error),
}

impl From<SampleRejection> for Extension {
    fn from(rejection: SampleRejection) -> Self {
        Extension::Rejected(rejection)
    }
}

impl From<Error> for Extension {
    fn from(error: Error) -> Self {
        Extension::Failed(error)
    }
}

/// Builder pattern to create `RrtPlanner`
#[derive(Debug)]
pub struct RrtPlannerBuilder {
    body: ShapeSet,
    obstacles: ShapeSet,
    start: Pose,
    goal: Pose,
    config: RrtPlannerConfig,
}

impl RrtPlannerBuilder {
    /// Create from the body shapes (in the body frame), the obstacle shapes
    /// (in the world frame) and the two ends of the plan
    pub fn new(body: ShapeSet, obstacles: ShapeSet, start: Pose, goal: Pose) -> Self {
        Self {
            body,
            obstacles,
            start,
            goal,
            config: RrtPlannerConfig::default(),
        }
    }

    pub fn config(mut self, config: RrtPlannerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn step_length(mut self, step_length: f64) -> Self {
        self.config.step_length = step_length;
        self
    }

    pub fn speed(mut self, speed: f64) -> Self {
        self.config.speed = speed;
        self
    }

    pub fn space(mut self, space: ConfigurationSpace) -> Self {
        self.config.space = space;
        self
    }

    pub fn max_try(mut self, max_try: usize) -> Self {
        self.config.max_try = max_try;
        self
    }

    pub fn goal_tolerance(mut self, goal_tolerance: f64) -> Self {
        self.config.goal_tolerance = goal_tolerance;
        self
    }

    pub fn validate_goal(mut self, validate_goal: bool) -> Self {
        self.config.validate_goal = validate_goal;
        self
    }

    pub fn margin(mut self, margin: f64) -> Self {
        self.config.margin = margin;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Validate the configuration and both ends of the plan, then create the planner
    ///
    /// The goal pose is checked only if `validate_goal` is set.
    pub fn finalize(self) -> Result<RrtPlanner> {
        self.config.validate()?;
        if !self.config.space.contains_position(&self.start.position) {
            return Err(Error::Configuration(format!(
                "start position {:?} is out of the configuration space",
                self.start.position
            )));
        }
        let detector = BodyCollisionDetector::new(self.body, self.obstacles, self.config.margin)?;
        let pairs = detector.colliding_pairs(&self.start);
        if !pairs.is_empty() {
            return Err(Error::Collision {
                part: CollisionPart::Start,
                pairs,
            });
        }
        if self.config.validate_goal {
            let pairs = detector.colliding_pairs(&self.goal);
            if !pairs.is_empty() {
                return Err(Error::Collision {
                    part: CollisionPart::Goal,
                    pairs,
                });
            }
        }
        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        debug!(config = ?self.config, "create planner");
        Ok(RrtPlanner {
            sampler: ConfigurationSampler::new(
                rng,
                self.config.step_length,
                self.config.rotation_divisor,
            ),
            config: self.config,
            goal: self.goal,
            detector: Some(detector),
            tree: RrtTree::new(self.start),
            phase: PlannerPhase::Growth,
            num_tries: 0,
            path: None,
            player: None,
        })
    }
}
