use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;
use transmission_planner::{
    CsvResultSink, FromUrdf, Pose, RrtPlanner, RrtPlannerBuilder, RrtPlannerConfig, ShapeSet,
    DEFAULT_PATH_FILE_NAME, DEFAULT_TREE_FILE_NAME,
};

use crate::Error;

/// Position and Euler angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PoseConfig {
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
}

impl PoseConfig {
    pub fn to_pose(&self) -> Pose {
        Pose::from_parts(self.position, self.rotation)
    }
}

/// Everything needed to plan the motion of a body through a scene
///
/// Relative paths are resolved from the directory of the scene file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    /// URDF whose `<collision>` elements make up the moving body
    pub body_urdf_path: PathBuf,
    /// URDF whose `<collision>` elements make up the obstacles
    pub obstacle_urdf_path: PathBuf,
    #[serde(default = "default_path_output")]
    pub path_output: PathBuf,
    #[serde(default = "default_tree_output")]
    pub tree_output: PathBuf,
    pub start: PoseConfig,
    pub goal: PoseConfig,
    #[serde(default)]
    pub planner: RrtPlannerConfig,
}

fn default_path_output() -> PathBuf {
    DEFAULT_PATH_FILE_NAME.into()
}

fn default_tree_output() -> PathBuf {
    DEFAULT_TREE_FILE_NAME.into()
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            body_urdf_path: "shaft.urdf".into(),
            obstacle_urdf_path: "gearbox.urdf".into(),
            path_output: default_path_output(),
            tree_output: default_tree_output(),
            start: PoseConfig {
                position: [-300.0, 150.0, 0.0],
                rotation: [0.0; 3],
            },
            goal: PoseConfig {
                position: [-300.0, 780.0, 0.0],
                rotation: [0.0; 3],
            },
            planner: RrtPlannerConfig::default(),
        }
    }
}

fn resolve_relative_path<P: AsRef<Path>>(base_path: P, path: &Path) -> Result<PathBuf, Error> {
    Ok(base_path
        .as_ref()
        .parent()
        .ok_or_else(|| Error::NoParentDirectory(base_path.as_ref().to_owned()))?
        .join(path))
}

impl SceneConfig {
    pub fn try_new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        Self::from_str(
            &fs_err::read_to_string(&path)
                .map_err(|e| Error::NoFile(path.as_ref().to_owned(), e))?,
            &path,
        )
    }

    pub fn from_str<P: AsRef<Path>>(s: &str, path: P) -> Result<Self, Error> {
        let mut config: SceneConfig =
            toml::from_str(s).map_err(|e| Error::TomlParseFailure(path.as_ref().to_owned(), e))?;
        let path = path.as_ref();
        config.body_urdf_path = resolve_relative_path(path, &config.body_urdf_path)?;
        config.obstacle_urdf_path = resolve_relative_path(path, &config.obstacle_urdf_path)?;
        config.path_output = resolve_relative_path(path, &config.path_output)?;
        config.tree_output = resolve_relative_path(path, &config.tree_output)?;
        debug!("{config:?}");
        Ok(config)
    }

    fn load_shapes(path: &Path) -> Result<ShapeSet, Error> {
        ShapeSet::from_urdf_file(path)
            .map_err(|e| Error::ShapeLoadFailure(path.to_owned(), e.into()))
    }

    /// Load both shape sets and build the planner
    pub fn create_planner(&self) -> Result<RrtPlanner, Error> {
        let body = Self::load_shapes(&self.body_urdf_path)?;
        let obstacles = Self::load_shapes(&self.obstacle_urdf_path)?;
        debug!(body = body.len(), obstacles = obstacles.len(), "shapes loaded");
        Ok(RrtPlannerBuilder::new(
            body,
            obstacles,
            self.start.to_pose(),
            self.goal.to_pose(),
        )
        .config(self.planner.clone())
        .finalize()?)
    }

    pub fn create_sink(&self) -> CsvResultSink {
        CsvResultSink::new(&self.path_output, &self.tree_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_resolved_from_the_config_dir() {
        let config = SceneConfig::from_str(
            r#"
body_urdf_path = "shaft.urdf"
obstacle_urdf_path = "/abs/gearbox.urdf"
[start]
position = [0, 0, 0]
[goal]
position = [0, 100, 0]
rotation = [0, 0, 90]
"#,
            "/scenes/a/scene.toml",
        )
        .unwrap();
        assert_eq!(config.body_urdf_path, Path::new("/scenes/a/shaft.urdf"));
        assert_eq!(config.obstacle_urdf_path, Path::new("/abs/gearbox.urdf"));
        assert_eq!(config.path_output, Path::new("/scenes/a/rrtPath.csv"));
        assert_eq!(config.tree_output, Path::new("/scenes/a/rrtGraph.csv"));
        assert_eq!(config.goal.to_pose().orientation.degrees().z, 90.0);
        assert_eq!(config.planner.max_try, 10000);
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = SceneConfig::from_str(
            r#"
body_urdf_path = "shaft.urdf"
obstacle_urdf_path = "gearbox.urdf"
[start]
position = [0, 0, 0]
[goal]
position = [0, 100, 0]
[planner]
step = 3
"#,
            "scene.toml",
        )
        .unwrap_err();
        assert!(matches!(err, Error::TomlParseFailure(..)));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let s = toml::to_string(&SceneConfig::default()).unwrap();
        let config = SceneConfig::from_str(&s, "dir/scene.toml").unwrap();
        assert_eq!(config.body_urdf_path, Path::new("dir/shaft.urdf"));
        assert_eq!(config.start, SceneConfig::default().start);
        assert_eq!(config.planner.space, SceneConfig::default().planner.space);
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            SceneConfig::try_new("does/not/exist.toml"),
            Err(Error::NoFile(..))
        ));
    }
}
