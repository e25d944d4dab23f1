//! Virtual camera pose and world-to-viewport projection.

use nalgebra::Unit;

use crate::math::{Pt3, Real, Rect, UnitQuat, Vec3};

/// A virtual pinhole camera.
///
/// The camera looks along its local `-Z` axis with `+Y` up (right-handed).
/// `vfov_deg` is the full vertical field of view; `clip` is the rectangle
/// silhouettes are clipped against and defaults to the whole viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewCamera {
    pub position: Pt3,
    pub rotation: UnitQuat,
    pub vfov_deg: Real,
    pub aspect: Real,
    pub clip: Rect,
}

impl ViewCamera {
    pub fn new(position: Pt3, vfov_deg: Real, aspect: Real) -> Self {
        Self {
            position,
            rotation: UnitQuat::identity(),
            vfov_deg,
            aspect,
            clip: Rect::unit(),
        }
    }

    /// Camera at `position` aimed at `look_at`, rolled about the view axis.
    pub fn looking_at(
        position: Pt3,
        look_at: Pt3,
        roll_deg: Real,
        vfov_deg: Real,
        aspect: Real,
    ) -> Self {
        let mut cam = Self::new(position, vfov_deg, aspect);
        cam.aim(look_at, roll_deg);
        cam
    }

    /// Re-orient toward `look_at` with the given roll.
    ///
    /// A view direction parallel to world up falls back to the world `+Z`
    /// up reference so the orientation stays defined.
    pub fn aim(&mut self, look_at: Pt3, roll_deg: Real) {
        let dir = look_at - self.position;
        let dir = if dir.norm() < 1e-12 { -Vec3::z() } else { dir };
        let up = if dir.normalize().y.abs() > 1.0 - 1e-9 {
            Vec3::z()
        } else {
            Vec3::y()
        };
        // Local +Z ends up opposite the view direction (-Z forward).
        self.rotation = UnitQuat::face_towards(&-dir, &up);
        if roll_deg != 0.0 {
            let forward = Unit::new_normalize(dir);
            self.rotation = UnitQuat::from_axis_angle(&forward, roll_deg.to_radians()) * self.rotation;
        }
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::z()
    }

    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::x()
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }

    fn tan_half_vfov(&self) -> Real {
        (self.vfov_deg.to_radians() / 2.0).tan()
    }

    /// Project a world point into viewport coordinates.
    ///
    /// `x` and `y` are in `[0, 1]` when the point is on screen; `z` is the
    /// signed distance along the view direction and is negative behind the
    /// camera (the `x`/`y` of such points are not meaningful).
    pub fn world_to_viewport(&self, p: &Pt3) -> Vec3 {
        let rel = p - self.position;
        let pc = self.rotation.inverse_transform_vector(&rel);
        let depth = -pc.z;
        let mut d = depth;
        if d.abs() < 1e-12 {
            d = 1e-12;
        }
        let tan_v = self.tan_half_vfov();
        let tan_h = tan_v * self.aspect;
        Vec3::new(
            0.5 + pc.x / (2.0 * d * tan_h),
            0.5 + pc.y / (2.0 * d * tan_v),
            depth,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Pt2;

    fn cam_at_origin_looking_pos_z() -> ViewCamera {
        ViewCamera::looking_at(Pt3::origin(), Pt3::new(0.0, 0.0, 10.0), 0.0, 60.0, 1.0)
    }

    #[test]
    fn look_at_point_projects_to_viewport_center() {
        let cam = cam_at_origin_looking_pos_z();
        let p = cam.world_to_viewport(&Pt3::new(0.0, 0.0, 5.0));
        assert!((p.x - 0.5).abs() < 1e-9);
        assert!((p.y - 0.5).abs() < 1e-9);
        assert!((p.z - 5.0).abs() < 1e-9);
    }

    #[test]
    fn point_behind_camera_has_negative_depth() {
        let cam = cam_at_origin_looking_pos_z();
        let p = cam.world_to_viewport(&Pt3::new(0.0, 0.0, -5.0));
        assert!(p.z < 0.0);
    }

    #[test]
    fn point_above_view_axis_projects_to_upper_half() {
        let cam = cam_at_origin_looking_pos_z();
        let p = cam.world_to_viewport(&Pt3::new(0.0, 1.0, 5.0));
        assert!(p.y > 0.5);
        assert!((p.x - 0.5).abs() < 1e-9);
    }

    #[test]
    fn fov_edge_lands_on_viewport_edge() {
        let cam = cam_at_origin_looking_pos_z();
        // Half vfov of 60 degrees is 30 degrees: at depth d the frustum
        // spans d*tan(30) above the axis.
        let y = 5.0 * (30.0_f64.to_radians()).tan();
        let p = cam.world_to_viewport(&Pt3::new(0.0, y, 5.0));
        assert!((p.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn roll_rotates_the_image() {
        let mut cam = cam_at_origin_looking_pos_z();
        cam.aim(Pt3::new(0.0, 0.0, 10.0), 90.0);
        // With a quarter roll a point above the axis moves onto the
        // horizontal viewport axis.
        let p = cam.world_to_viewport(&Pt3::new(0.0, 1.0, 5.0));
        assert!((p.y - 0.5).abs() < 1e-9);
        assert!((p.x - 0.5).abs() > 1e-3);
    }

    #[test]
    fn forward_right_up_are_orthonormal() {
        let cam = ViewCamera::looking_at(
            Pt3::new(1.0, 2.0, 3.0),
            Pt3::new(-4.0, 0.5, 7.0),
            15.0,
            45.0,
            16.0 / 9.0,
        );
        let f = cam.forward();
        let r = cam.right();
        let u = cam.up();
        assert!((f.norm() - 1.0).abs() < 1e-9);
        assert!(f.dot(&r).abs() < 1e-9);
        assert!(f.dot(&u).abs() < 1e-9);
        assert!(r.dot(&u).abs() < 1e-9);
        // Forward actually points at the target.
        let dir = (Pt3::new(-4.0, 0.5, 7.0) - Pt3::new(1.0, 2.0, 3.0)).normalize();
        assert!((f - dir).norm() < 1e-9);
    }

    #[test]
    fn default_clip_is_full_viewport() {
        let cam = cam_at_origin_looking_pos_z();
        assert_eq!(cam.clip, Rect::unit());
        assert!(cam.clip.contains(&Pt2::new(0.5, 0.5)));
    }
}
