use std::{
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use nalgebra as na;
use tracing::debug;

use crate::errors::*;

pub const DEFAULT_PATH_FILE_NAME: &str = "rrtPath.csv";
pub const DEFAULT_TREE_FILE_NAME: &str = "rrtGraph.csv";

/// Receiver of the planning result
pub trait ResultSink {
    /// Positions of the path from the start to the goal
    fn write_path(&mut self, path: &[na::Point3<f64>]) -> Result<()>;
    /// Positions of every node of the tree in insertion order
    fn write_tree(&mut self, positions: &[na::Point3<f64>]) -> Result<()>;
}

/// Writes the result as two CSV files with a `x,y,z` header
///
/// Existing files are truncated.
#[derive(Debug, Clone)]
pub struct CsvResultSink {
    path_file: PathBuf,
    tree_file: PathBuf,
}

impl CsvResultSink {
    pub fn new(path_file: impl Into<PathBuf>, tree_file: impl Into<PathBuf>) -> Self {
        Self {
            path_file: path_file.into(),
            tree_file: tree_file.into(),
        }
    }

    /// Sink writing the default file names into `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join(DEFAULT_PATH_FILE_NAME),
            dir.join(DEFAULT_TREE_FILE_NAME),
        )
    }

    pub fn path_file(&self) -> &Path {
        &self.path_file
    }

    pub fn tree_file(&self) -> &Path {
        &self.tree_file
    }
}

fn write_positions(file: &Path, positions: &[na::Point3<f64>]) -> Result<()> {
    let mut writer = BufWriter::new(fs_err::File::create(file)?);
    writeln!(writer, "x,y,z")?;
    for p in positions {
        writeln!(writer, "{},{},{}", p.x, p.y, p.z)?;
    }
    writer.flush()?;
    debug!(file = %file.display(), rows = positions.len(), "wrote csv");
    Ok(())
}

impl ResultSink for CsvResultSink {
    fn write_path(&mut self, path: &[na::Point3<f64>]) -> Result<()> {
        write_positions(&self.path_file, path)
    }

    fn write_tree(&mut self, positions: &[na::Point3<f64>]) -> Result<()> {
        write_positions(&self.tree_file, positions)
    }
}
