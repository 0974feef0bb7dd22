use std::{ffi::OsStr, path::Path};

use fs_err as fs;
use nalgebra as na;
use ncollide3d::shape::TriMesh;

use crate::errors::*;

/// Load an STL or COLLADA file as a triangle mesh scaled by `scale`
pub(crate) fn load_mesh<P>(filename: P, scale: &[f64; 3]) -> Result<TriMesh<f64>>
where
    P: AsRef<Path>,
{
    let filename = filename.as_ref();
    match filename.extension().and_then(OsStr::to_str) {
        Some("stl" | "STL") => load_stl(filename, scale),
        Some("dae" | "DAE") => load_collada(filename, scale),
        _ => Err(Error::MeshError(format!(
            "unsupported mesh format: {filename:?}"
        ))),
    }
}

fn scaled_point(v: &[f32; 3], scale: &[f64; 3]) -> na::Point3<f64> {
    na::Point3::new(
        f64::from(v[0]) * scale[0],
        f64::from(v[1]) * scale[1],
        f64::from(v[2]) * scale[2],
    )
}

fn load_stl(filename: &Path, scale: &[f64; 3]) -> Result<TriMesh<f64>> {
    let mesh = mesh_loader::stl::from_slice(&fs::read(filename)?)?;

    let vertices = mesh
        .vertices
        .iter()
        .map(|v| scaled_point(v, scale))
        .collect();

    let indices = mesh
        .faces
        .iter()
        .map(|face| na::Point3::new(face[0] as usize, face[1] as usize, face[2] as usize))
        .collect();

    Ok(TriMesh::new(vertices, indices, None))
}

fn load_collada(filename: &Path, scale: &[f64; 3]) -> Result<TriMesh<f64>> {
    let scene = mesh_loader::collada::from_str(&fs::read_to_string(filename)?)?;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut last_index: usize = 0;
    for mesh in scene.meshes {
        vertices.extend(mesh.vertices.iter().map(|v| scaled_point(v, scale)));
        indices.extend(mesh.faces.iter().map(|f| {
            na::Point3::new(
                f[0] as usize + last_index,
                f[1] as usize + last_index,
                f[2] as usize + last_index,
            )
        }));
        last_index = vertices.len();
    }
    if vertices.is_empty() {
        return Err(Error::MeshError(format!("{filename:?} has no mesh")));
    }

    Ok(TriMesh::new(vertices, indices, None))
}
