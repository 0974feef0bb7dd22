mod collision_detector;
mod mesh;
mod urdf;

pub use self::{collision_detector::*, urdf::FromUrdf};
