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

use nalgebra as na;
use rand::Rng;

use crate::pose::AxisRange;

/// Smallest rotation angle difference handled by `slerp`
const SLERP_EPSILON: f64 = 1.0e-9;

/// Generate a random integer value in every closed range
///
/// ```
/// use transmission_planner::AxisRange;
/// let mut rng = rand::thread_rng();
/// let values = transmission_planner::generate_random_values_from_ranges(
///     &mut rng,
///     &[AxisRange::new(-1, 1), AxisRange::new(5, 5)],
/// );
/// assert!(values[0] >= -1.0 && values[0] <= 1.0);
/// assert_eq!(values[1], 5.0);
/// ```
pub fn generate_random_values_from_ranges<R>(rng: &mut R, ranges: &[AxisRange]) -> Vec<f64>
where
    R: Rng,
{
    ranges
        .iter()
        .map(|range| f64::from(rng.gen_range(range.min..=range.max)))
        .collect()
}

/// Interpolate two rotations along the shortest arc
pub fn interpolate_rotation(
    from: &na::UnitQuaternion<f64>,
    to: &na::UnitQuaternion<f64>,
    t: f64,
) -> na::UnitQuaternion<f64> {
    // slerp is undefined for opposite rotations, fall back to nlerp there
    from.try_slerp(to, t, SLERP_EPSILON)
        .unwrap_or_else(|| from.nlerp(to, t))
}

/// Interpolate the translation linearly and the rotation spherically
///
/// ```
/// use nalgebra as na;
/// let from = na::Isometry3::translation(0.0, 0.0, 0.0);
/// let to = na::Isometry3::translation(10.0, 0.0, 0.0);
/// let mid = transmission_planner::interpolate_isometry(&from, &to, 0.5);
/// assert_eq!(mid.translation.vector.x, 5.0);
/// ```
pub fn interpolate_isometry(
    from: &na::Isometry3<f64>,
    to: &na::Isometry3<f64>,
    t: f64,
) -> na::Isometry3<f64> {
    let translation = from
        .translation
        .vector
        .lerp(&to.translation.vector, t);
    na::Isometry3::from_parts(
        na::Translation3::from(translation),
        interpolate_rotation(&from.rotation, &to.rotation, t),
    )
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn rotation_takes_the_shortest_arc() {
        let from = na::UnitQuaternion::from_euler_angles(0.0, 0.0, 350f64.to_radians());
        let to = na::UnitQuaternion::from_euler_angles(0.0, 0.0, 10f64.to_radians());
        let mid = interpolate_rotation(&from, &to, 0.5);
        assert_approx_eq!(mid.angle(), 0.0, 1e-9);
    }

    #[test]
    fn isometry_interpolation_hits_both_ends() {
        let from = na::Isometry3::new(na::Vector3::new(1.0, 2.0, 3.0), na::zero());
        let to = na::Isometry3::new(
            na::Vector3::new(3.0, 2.0, 1.0),
            na::Vector3::new(0.0, 0.0, FRAC_PI_2),
        );
        let start = interpolate_isometry(&from, &to, 0.0);
        let end = interpolate_isometry(&from, &to, 1.0);
        assert_approx_eq!(start.translation.vector.x, 1.0);
        assert_approx_eq!(end.translation.vector.x, 3.0);
        assert_approx_eq!(end.rotation.angle(), FRAC_PI_2, 1e-9);
        let mid = interpolate_isometry(&from, &to, 0.5);
        assert_approx_eq!(mid.translation.vector.z, 2.0);
        assert_approx_eq!(mid.rotation.angle(), FRAC_PI_2 / 2.0, 1e-9);
    }

    #[test]
    fn random_values_stay_in_closed_ranges() {
        let mut rng = rand::thread_rng();
        let ranges = [AxisRange::new(-2, 2), AxisRange::new(0, 0)];
        for _ in 0..1000 {
            let values = generate_random_values_from_ranges(&mut rng, &ranges);
            assert_eq!(values.len(), 2);
            assert!((-2.0..=2.0).contains(&values[0]));
            assert_eq!(values[0].fract(), 0.0);
            assert_eq!(values[1], 0.0);
        }
    }
}
