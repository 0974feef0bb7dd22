use std::path::Path;

use nalgebra as na;
use ncollide3d::{
    procedural::IndexBuffer::{Split, Unified},
    procedural::TriMesh as ProceduralTriMesh,
    shape::{Ball, Capsule, Cuboid, Cylinder, ShapeHandle, TriMesh},
    transformation::ToTriMesh,
};
use tracing::*;

use super::{collision_detector::ShapeSet, mesh::load_mesh};

// https://github.com/openrr/urdf-rs/pull/3/files#diff-0fb2eeea3273a4c9b3de69ee949567f546dc8c06b1e190336870d00b54ea0979L36-L38
const DEFAULT_MESH_SCALE: urdf_rs::Vec3 = urdf_rs::Vec3([1.0f64; 3]);

const CYLINDER_SUBDIVISION: u32 = 30;

/// URDF cylinders and capsules are Z-aligned, ncollide3d ones are Y-aligned
fn z_aligned_convex_hull(y_aligned: ProceduralTriMesh<f64>) -> Option<ShapeHandle<f64>> {
    let tri_mesh = ncollide3d::transformation::convex_hull(
        &y_aligned
            .coords
            .iter()
            .map(|point| point.xzy())
            .collect::<Vec<_>>(),
    );
    let ind = match tri_mesh.indices {
        Unified(ind) => ind
            .into_iter()
            .map(|p| na::Point3::new(p[0] as usize, p[1] as usize, p[2] as usize))
            .collect(),
        Split(_) => {
            error!("convex hull with split index buffer is not supported");
            return None;
        }
    };
    Some(ShapeHandle::new(TriMesh::new(
        tri_mesh.coords,
        ind,
        tri_mesh.uvs,
    )))
}

pub(crate) fn urdf_geometry_to_shape_handle(
    collision_geometry: &urdf_rs::Geometry,
    base_dir: Option<&Path>,
) -> Option<ShapeHandle<f64>> {
    match *collision_geometry {
        urdf_rs::Geometry::Box { ref size } => {
            let cube = Cuboid::new(na::Vector3::new(
                size[0] * 0.5,
                size[1] * 0.5,
                size[2] * 0.5,
            ));
            Some(ShapeHandle::new(cube))
        }
        urdf_rs::Geometry::Cylinder { radius, length } => {
            let y_cylinder = Cylinder::new(length * 0.5, radius);
            z_aligned_convex_hull(y_cylinder.to_trimesh(CYLINDER_SUBDIVISION))
        }
        urdf_rs::Geometry::Capsule { radius, length } => {
            let y_capsule = Capsule::new(length * 0.5, radius);
            z_aligned_convex_hull(
                y_capsule.to_trimesh((CYLINDER_SUBDIVISION, CYLINDER_SUBDIVISION)),
            )
        }
        urdf_rs::Geometry::Sphere { radius } => Some(ShapeHandle::new(Ball::new(radius))),
        urdf_rs::Geometry::Mesh {
            ref filename,
            scale,
        } => {
            let scale = scale.unwrap_or(DEFAULT_MESH_SCALE);
            let replaced_filename = match urdf_rs::utils::expand_package_path(filename, base_dir) {
                Ok(replaced_filename) => replaced_filename,
                Err(e) => {
                    error!("{e}");
                    return None;
                }
            };
            let path = Path::new(&*replaced_filename);
            if !path.exists() {
                error!("{replaced_filename} not found");
                return None;
            }
            match load_mesh(path, &scale) {
                Ok(mesh) => Some(ShapeHandle::new(mesh)),
                Err(err) => {
                    error!("load_mesh {path:?} failed: {err}");
                    None
                }
            }
        }
    }
}

fn isometry_from(origin: &urdf_rs::Pose) -> na::Isometry3<f64> {
    na::Isometry3::from_parts(
        na::Translation3::new(origin.xyz[0], origin.xyz[1], origin.xyz[2]),
        na::UnitQuaternion::from_euler_angles(origin.rpy[0], origin.rpy[1], origin.rpy[2]),
    )
}

/// Convert urdf object into a transmission_planner/ncollide3d object
pub trait FromUrdf: Sized {
    /// base_dir: mesh files are loaded from this dir if the path does not start with "package://"
    fn from_urdf_robot_with_base_dir(robot: &urdf_rs::Robot, base_dir: Option<&Path>) -> Self;

    fn from_urdf_robot(robot: &urdf_rs::Robot) -> Self {
        Self::from_urdf_robot_with_base_dir(robot, None)
    }

    fn from_urdf_file<P>(path: P) -> ::std::result::Result<Self, urdf_rs::UrdfError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let robot = urdf_rs::utils::read_urdf_or_xacro(path)?;
        Ok(Self::from_urdf_robot_with_base_dir(&robot, path.parent()))
    }
}

/// Create `ShapeSet` from URDF
///
/// The `<collision>` elements of every `<link>` are used. Their origins are
/// taken as they are, joints are not followed, so all links are expected to
/// share one frame. You can skip `<visual>` and `<inertial>`.
impl FromUrdf for ShapeSet {
    fn from_urdf_robot_with_base_dir(robot: &urdf_rs::Robot, base_dir: Option<&Path>) -> Self {
        let shapes = robot
            .links
            .iter()
            .flat_map(|l| {
                debug!("name={}, ln={}", l.name, l.collision.len());
                l.collision.iter().map(|collision| {
                    urdf_geometry_to_shape_handle(&collision.geometry, base_dir)
                        .map(|col| (isometry_from(&collision.origin), col))
                })
            })
            .flatten()
            .collect::<Vec<_>>();
        ShapeSet::new(shapes)
    }
}
