mod rrt_planner;

pub use self::rrt_planner::*;
