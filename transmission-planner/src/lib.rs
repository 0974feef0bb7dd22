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
//! # Rigid Body Motion Planning Library
//!
//! Grow a Rapidly-exploring Random Tree from a start pose until it reaches the
//! height of a goal pose, then play the resulting path back as a continuous
//! trajectory. `ncollide3d` is used to check the collision between the moving
//! body and the static obstacles.
//!
//! The planner is driven one step at a time by [`RrtPlanner::tick`], so it can
//! be embedded into any frame loop.

#![warn(rust_2018_idioms)]

mod errors;

pub mod collision;

mod funcs;

mod planner;

mod pose;

mod sampler;

mod sink;

mod trajectory;

mod tree;

pub use crate::{
    collision::{BodyCollisionDetector, FromUrdf, ShapeSet},
    errors::{CollisionPart, Error, Result},
    funcs::*,
    planner::*,
    pose::*,
    sampler::*,
    sink::*,
    trajectory::*,
    tree::*,
};
