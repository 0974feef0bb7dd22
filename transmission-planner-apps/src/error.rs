use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("transmission-planner-apps: No ConfigPath is specified.")]
    NoConfigPath,
    #[error("transmission-planner-apps: Failed to parse {:?} as toml ({}).", .0, .1)]
    TomlParseFailure(PathBuf, #[source] toml::de::Error),
    #[error("transmission-planner-apps: No File {:?} is found ({}).", .0, .1)]
    NoFile(PathBuf, #[source] std::io::Error),
    #[error("transmission-planner-apps: No ParentDirectory {:?} is found.", .0)]
    NoParentDirectory(PathBuf),
    #[error("transmission-planner-apps: Failed to load shapes from {:?} ({}).", .0, .1)]
    ShapeLoadFailure(PathBuf, #[source] transmission_planner::Error),
    #[error("transmission-planner-apps: transmission-planner: {:?}", .0)]
    Planner(#[from] transmission_planner::Error),
}
