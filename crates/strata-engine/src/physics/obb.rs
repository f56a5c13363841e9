use glam::Vec2;

use crate::physics::aabb::Aabb;

/// Separating-axis test result: the axis of minimum positive overlap and
/// the overlap depth along it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SatHit {
    /// Contact normal, unit length, pointing from `a` toward `b`.
    pub normal: Vec2,
    /// Penetration depth along the normal.
    pub penetration: f32,
}

/// Oriented bounding box: center, half-extents and a rotation angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec2,
    pub half_extents: Vec2,
    /// Rotation in radians, counter-clockwise.
    pub rotation: f32,
}

impl Obb {
    pub fn new(center: Vec2, half_extents: Vec2, rotation: f32) -> Self {
        Self {
            center,
            half_extents,
            rotation,
        }
    }

    /// The box's local X and Y axes in world space.
    #[inline]
    pub fn axes(&self) -> [Vec2; 2] {
        let (sin, cos) = self.rotation.sin_cos();
        [Vec2::new(cos, sin), Vec2::new(-sin, cos)]
    }

    /// The four corners in world space.
    pub fn corners(&self) -> [Vec2; 4] {
        let [x, y] = self.axes();
        let ex = x * self.half_extents.x;
        let ey = y * self.half_extents.y;
        [
            self.center - ex - ey,
            self.center + ex - ey,
            self.center + ex + ey,
            self.center - ex + ey,
        ]
    }

    /// Tight axis-aligned wrap of the rotated box.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_points(&self.corners())
    }

    /// Radius of the box's projection onto a unit axis.
    #[inline]
    fn projected_radius(&self, axis: Vec2) -> f32 {
        let [x, y] = self.axes();
        self.half_extents.x * x.dot(axis).abs() + self.half_extents.y * y.dot(axis).abs()
    }

    /// Whether a world-space point lies inside the box (boundary inclusive,
    /// with a small tolerance for contact-point harvesting).
    pub fn contains_point(&self, point: Vec2) -> bool {
        const TOLERANCE: f32 = 1e-4;
        let [x, y] = self.axes();
        let d = point - self.center;
        d.dot(x).abs() <= self.half_extents.x + TOLERANCE
            && d.dot(y).abs() <= self.half_extents.y + TOLERANCE
    }

    /// Separating Axis Theorem over the two edge normals of each box.
    ///
    /// Returns `None` as soon as a separating axis is found; otherwise the
    /// axis of minimum positive overlap becomes the contact normal, oriented
    /// from `a` toward `b`.
    pub fn intersect(a: &Obb, b: &Obb) -> Option<SatHit> {
        let delta = b.center - a.center;
        let mut best_penetration = f32::MAX;
        let mut best_axis = Vec2::ZERO;

        let [ax, ay] = a.axes();
        let [bx, by] = b.axes();
        for axis in [ax, ay, bx, by] {
            let overlap =
                a.projected_radius(axis) + b.projected_radius(axis) - delta.dot(axis).abs();
            if overlap <= 0.0 {
                return None;
            }
            if overlap < best_penetration {
                best_penetration = overlap;
                // Orient the axis from a toward b.
                best_axis = if delta.dot(axis) < 0.0 { -axis } else { axis };
            }
        }

        Some(SatHit {
            normal: best_axis,
            penetration: best_penetration,
        })
    }
}
