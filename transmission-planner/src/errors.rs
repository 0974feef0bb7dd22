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

use std::io;

use thiserror::Error;

/// Which end of a plan was found to be colliding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPart {
    Start,
    Goal,
}

/// Error for `transmission_planner`
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration error: {}", .0)]
    Configuration(String),
    #[error("Collision error: body/obstacle pairs {pairs:?} are colliding ({part:?})")]
    Collision {
        part: CollisionPart,
        pairs: Vec<(usize, usize)>,
    },
    #[error("Planning failed: goal height was not reached within {max_try} tries")]
    PlanningFailed { max_try: usize },
    #[error("Goal unreachable: {}", .0)]
    GoalUnreachable(String),
    #[error("Invalid tree state: {}", .0)]
    InvalidTreeState(String),
    #[error("IO error {:?}", source)]
    Io {
        #[from]
        source: io::Error,
    },
    #[error("URDF error: {:?}", source)]
    Urdf {
        #[from]
        source: urdf_rs::UrdfError,
    },
    #[error("Mesh error {}", .0)]
    MeshError(String),
}

/// Result for `transmission_planner`
pub type Result<T> = ::std::result::Result<T, Error>;
