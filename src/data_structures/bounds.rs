//! Axis-aligned bounding boxes.
//!
//! Loaded models are recentered so the middle of their bounding box sits at
//! the origin. Boxes are accumulated from mesh positions at load time and
//! transformed through the node hierarchy by their corners.

use cgmath::Vector3;

use crate::data_structures::instance::Instance;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Aabb {
    /// An empty box that any point or union will replace.
    pub fn empty() -> Self {
        Self {
            min: Vector3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn expand(&mut self, point: Vector3<f32>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Aabb {
            min: Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    pub fn from_points<I: IntoIterator<Item = [f32; 3]>>(points: I) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.expand(p.into());
        }
        aabb
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.min + self.max) * 0.5
    }

    /// The box enclosing this box after applying `transform`. Conservative:
    /// transforms all eight corners and re-wraps them.
    pub fn transformed(&self, transform: &Instance) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        let matrix = transform.to_matrix();
        let mut out = Aabb::empty();
        for &x in &[self.min.x, self.max.x] {
            for &y in &[self.min.y, self.max.y] {
                for &z in &[self.min.z, self.max.z] {
                    let corner = matrix * cgmath::Vector4::new(x, y, z, 1.0);
                    out.expand(Vector3::new(corner.x, corner.y, corner.z));
                }
            }
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Quaternion, Rotation3};

    #[test]
    fn center_offset_recenters_box_at_origin() {
        let aabb = Aabb::from_points([[1.0, 2.0, 3.0], [3.0, 6.0, 5.0]]);
        let center = aabb.center();
        assert_eq!(center, Vector3::new(2.0, 4.0, 4.0));

        // Subtracting the center from the node position must bring the box
        // center to the origin.
        let recentred = aabb.transformed(&Instance::from(-center));
        assert!(recentred.center().x.abs() < 1e-6);
        assert!(recentred.center().y.abs() < 1e-6);
        assert!(recentred.center().z.abs() < 1e-6);
    }

    #[test]
    fn union_with_empty_is_identity() {
        let aabb = Aabb::from_points([[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        assert_eq!(aabb.union(&Aabb::empty()), aabb);
        assert_eq!(Aabb::empty().union(&aabb), aabb);
    }

    #[test]
    fn transform_wraps_rotated_corners() {
        let aabb = Aabb::from_points([[-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]]);
        let rotated = aabb.transformed(&Instance {
            rotation: Quaternion::from_angle_y(Deg(45.0)),
            ..Default::default()
        });
        // The unit cube's diagonal swings into X/Z under a 45 degree turn.
        assert!(rotated.max.x > 1.0 + 1e-3);
        assert!((rotated.max.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn from_no_points_is_empty() {
        assert!(Aabb::from_points(std::iter::empty()).is_empty());
    }
}
