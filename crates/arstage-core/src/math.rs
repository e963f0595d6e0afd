//! Spatial primitives: placements relative to the anchor frame, the
//! tracking camera and pointer rays.

use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Position, rotation and scale of an object in its parent frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Vec3,
    #[serde(default = "identity_rotation")]
    pub rotation: Quat,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

fn identity_rotation() -> Quat {
    Quat::IDENTITY
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl Placement {
    /// Identity placement: origin, no rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Placement at a position with no rotation and unit scale.
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::identity()
        }
    }

    pub fn from_array(p: [f32; 3]) -> Self {
        Self::at(p[0], p[1], p[2])
    }

    /// Builder: uniform scale.
    pub fn with_uniform_scale(mut self, s: f32) -> Self {
        self.scale = Vec3::splat(s);
        self
    }

    /// Builder: rotation about the x axis, in radians.
    pub fn with_rotation_x(mut self, radians: f32) -> Self {
        self.rotation = Quat::from_rotation_x(radians);
        self
    }

    /// Local-to-parent matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::identity()
    }
}

/// Output surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0.0 {
            return 1.0;
        }
        self.width / self.height
    }

    /// Convert a screen pixel coordinate to normalized device coordinates.
    /// Screen y grows downward, NDC y grows upward.
    pub fn to_ndc(&self, screen_x: f32, screen_y: f32) -> Vec2 {
        if self.width == 0.0 || self.height == 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            (screen_x / self.width) * 2.0 - 1.0,
            -(screen_y / self.height) * 2.0 + 1.0,
        )
    }

    /// Inverse of [`Viewport::to_ndc`].
    pub fn to_screen(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        )
    }
}

/// A half-line in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

/// A ray intersection with some target.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<T> {
    pub target: T,
    /// Distance from the ray origin to the hit point, in world units.
    pub distance: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Intersect with a flat rectangle of `size` centered on the local
    /// origin of `world`, lying in its local z = 0 plane. Both faces count.
    pub fn intersect_rect(&self, world: &Mat4, size: Vec2) -> Option<f32> {
        if world.determinant().abs() < f32::EPSILON {
            return None;
        }
        let inv = world.inverse();
        let o = inv.transform_point3(self.origin);
        let d = inv.transform_vector3(self.direction);
        if d.z.abs() < f32::EPSILON {
            return None;
        }
        let t = -o.z / d.z;
        if t < 0.0 {
            return None;
        }
        let p = o + d * t;
        if p.x.abs() > size.x * 0.5 || p.y.abs() > size.y * 0.5 {
            return None;
        }
        Some(world.transform_point3(p).distance(self.origin))
    }
}

/// Perspective camera supplied by the tracking engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub rotation: Quat,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn perspective(fov_y_degrees: f32, aspect: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y_degrees,
            aspect,
            near: 0.01,
            far: 1000.0,
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        )
    }

    /// World-to-camera matrix.
    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Ray from the camera through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = (self.projection() * self.view()).inverse();
        let target = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.position, target - self.position)
    }

    /// Project a world point to NDC. `None` when the point lies behind the
    /// camera.
    pub fn project_to_ndc(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.projection() * self.view() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        Some(Vec2::new(clip.x / clip.w, clip.y / clip.w))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::perspective(45.0, 1.0)
    }
}
