//! # Camera Implementation
//!
//! A free-flying quaternion camera shared by both render strategies.
//!
//! ## Key Components
//! - `Camera`: position, orientation, zoom and viewport, with a change latch
//! - `Projection`: perspective projection for the mesh path
//! - `CameraController`: per-frame input accumulation
//! - `CameraUniform`: packed view-projection for shaders

use cgmath::*;
use web_time::Duration;

use crate::{config::CameraConfig, engine_state::PlayerAction};

/// Transformation matrix to convert from OpenGL's clip space depth range to WGPU's.
///
/// Scales Z from [-1, 1] to [-0.5, 0.5], then translates it to [0, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Spherical interpolation that returns `b` when any component of the result is NaN.
pub fn safe_slerp(a: Quaternion<f32>, b: Quaternion<f32>, t: f32) -> Quaternion<f32> {
    let result = a.slerp(b, t);
    let components = [result.s, result.v.x, result.v.y, result.v.z];
    if components.iter().any(|component| component.is_nan()) {
        b
    } else {
        result
    }
}

/// A camera in 3D space.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Position in world space
    pub position: Point3<f32>,
    /// Orientation; the identity looks along +Z with +Y up
    pub rotation: Quaternion<f32>,
    /// Zoom factor, larger shows more
    pub zoom: f32,
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    changed: bool,
}

impl Camera {
    /// Creates a camera. It starts out changed so the first frame renders.
    pub fn new<V: Into<Point3<f32>>>(
        position: V,
        rotation: Quaternion<f32>,
        zoom: f32,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            position: position.into(),
            rotation: rotation.normalize(),
            zoom,
            width,
            height,
            changed: true,
        }
    }

    /// A camera backed off from a cube of edge `size`, looking at its centre along +Z.
    pub fn framing_volume(size: u32, zoom: f32, width: u32, height: u32) -> Self {
        let half = size as f32 / 2.0;
        Self::new(
            Point3::new(half, half, -(size as f32) * 1.5),
            Quaternion::one(),
            zoom,
            width,
            height,
        )
    }

    /// Unit vector to the camera's right.
    pub fn right(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_x())
    }

    /// Unit vector to the camera's up.
    pub fn up(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_y())
    }

    /// Unit vector the camera looks along.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation.rotate_vector(Vector3::unit_z())
    }

    /// Reads and clears the change latch.
    pub fn check_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Whether the camera changed since the latch was last read.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Moves the camera by `delta` in world space.
    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
        self.changed = true;
    }

    /// Slerps the orientation towards `target` by `t`.
    pub fn rotate_towards(&mut self, target: Quaternion<f32>, t: f32) {
        self.rotation = safe_slerp(self.rotation, target, t).normalize();
        self.changed = true;
    }

    /// Adds `delta` to the zoom, clamped to `[min_zoom, max_zoom]`.
    ///
    /// Zoom only scales the mesh projection. The raycast header carries no zoom, so this does
    /// not raise the change latch.
    pub fn zoom_by(&mut self, delta: f32, min_zoom: f32, max_zoom: f32) {
        self.zoom = (self.zoom + delta).clamp(min_zoom, max_zoom);
    }

    /// Records a new viewport size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.changed = true;
    }

    /// Calculates the view matrix for this camera.
    ///
    /// The camera frame satisfies `right x up = forward`, which is left-handed, so the view
    /// maps forward onto +Z. [`Projection::calc_matrix`] flips it back for the right-handed
    /// perspective.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_to_lh(self.position, self.forward(), self.up())
    }
}

/// Represents a camera's projection matrix and related parameters.
#[derive(Debug)]
pub struct Projection {
    /// Aspect ratio (width / height)
    aspect: f32,
    /// Vertical field of view in radians
    fovy: Rad<f32>,
    /// Near clipping plane distance
    znear: f32,
    /// Far clipping plane distance
    zfar: f32,
}

impl Projection {
    /// Creates a new projection with the given parameters.
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Updates the projection's aspect ratio for viewport resizing.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Calculates the projection matrix, widening the field of view with `zoom`.
    ///
    /// Expects a left-handed view, see [`Camera::calc_matrix`].
    pub fn calc_matrix(&self, zoom: f32) -> Matrix4<f32> {
        let fovy = Rad((self.fovy.0 * zoom).clamp(0.01, std::f32::consts::PI - 0.01));
        OPENGL_TO_WGPU_MATRIX
            * perspective(fovy, self.aspect, self.znear, self.zfar)
            * Matrix4::from_nonuniform_scale(1.0, 1.0, -1.0)
    }
}

/// Accumulates one frame of movement input and applies it to a [`Camera`].
#[derive(Debug)]
pub struct CameraController {
    /// Movement along right, up and forward, each in [-1, 1]
    movement: Vector3<f32>,
    /// Yaw and pitch direction, each in [-1, 1]
    rotation: Vector2<f32>,
    /// Zoom direction in [-1, 1]
    zoom: f32,

    movement_speed: f32,
    turn_speed: f32,
    zoom_speed: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl CameraController {
    /// Creates a controller tuned by `config`.
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            movement: Vector3::zero(),
            rotation: Vector2::zero(),
            zoom: 0.0,
            movement_speed: config.movement_speed,
            turn_speed: config.turn_speed,
            zoom_speed: config.zoom_speed,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }

    /// Records this frame's movement keys. When both keys of a pair are held the positive one
    /// wins.
    pub fn intake_actions(&mut self, actions: &PlayerAction) {
        fn axis(positive: bool, negative: bool) -> f32 {
            if positive {
                1.0
            } else if negative {
                -1.0
            } else {
                0.0
            }
        }

        self.movement = Vector3::new(
            axis(actions.move_right, actions.move_left),
            axis(actions.move_up, actions.move_down),
            axis(actions.move_in, actions.move_out),
        );
        self.rotation = Vector2::new(
            axis(actions.look_right, actions.look_left),
            axis(actions.look_down, actions.look_up),
        );
        self.zoom = axis(actions.zoom_out, actions.zoom_in);
    }

    /// Whether the recorded input would move the camera.
    pub fn has_updates(&self) -> bool {
        self.movement != Vector3::zero() || self.rotation != Vector2::zero() || self.zoom != 0.0
    }

    /// Applies the recorded input over `dt` and resets it.
    pub fn update_camera(&mut self, camera: &mut Camera, dt: Duration) {
        if !self.has_updates() {
            return;
        }
        let dt = dt.as_secs_f32();

        if self.movement != Vector3::zero() {
            let delta = camera.right() * self.movement.x
                + camera.up() * self.movement.y
                + camera.forward() * self.movement.z;
            camera.translate(delta * self.movement_speed * dt);
        }

        // Aim one full turn step ahead and slerp a dt-sized fraction of the way there.
        let step = dt.min(1.0);
        if self.rotation.x != 0.0 {
            let target = camera.rotation
                * Quaternion::from_axis_angle(
                    Vector3::unit_y(),
                    Rad(self.turn_speed * self.rotation.x),
                );
            camera.rotate_towards(target, step);
        }
        if self.rotation.y != 0.0 {
            let target = camera.rotation
                * Quaternion::from_axis_angle(
                    Vector3::unit_x(),
                    Rad(self.turn_speed * self.rotation.y),
                );
            camera.rotate_towards(target, step);
        }

        if self.zoom != 0.0 {
            camera.zoom_by(
                self.zoom * self.zoom_speed * dt,
                self.min_zoom,
                self.max_zoom,
            );
        }

        self.movement = Vector3::zero();
        self.rotation = Vector2::zero();
        self.zoom = 0.0;
    }
}

/// GPU-friendly representation of camera data for shaders.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    // cgmath types are not Pod, so matrices travel as nested arrays
    view_proj: [[f32; 4]; 4],
    position: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraUniform {
    /// Creates a new camera uniform with an identity matrix and zero position.
    pub fn new() -> Self {
        Self {
            view_proj: cgmath::Matrix4::identity().into(),
            position: [0.0; 4],
        }
    }

    /// Updates the view-projection matrix and position from the camera.
    pub fn update_view_proj_and_pos(&mut self, camera: &Camera, projection: &Projection) {
        let view_proj = projection.calc_matrix(camera.zoom) * camera.calc_matrix();
        self.view_proj = view_proj.into();
        let position: [f32; 3] = camera.position.into();
        self.position = [position[0], position[1], position[2], 1.0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn identity_camera_axes() {
        let camera = Camera::new(Point3::origin(), Quaternion::one(), 1.0, 800, 600);
        assert!(approx(camera.right(), Vector3::unit_x()));
        assert!(approx(camera.up(), Vector3::unit_y()));
        assert!(approx(camera.forward(), Vector3::unit_z()));
    }

    #[test]
    fn slerp_between_opposites_falls_back_to_target() {
        let a = Quaternion::new(f32::NAN, 0.0, 0.0, 0.0);
        let b = Quaternion::one();
        assert_eq!(safe_slerp(a, b, 0.5), b);

        let turned = Quaternion::from_axis_angle(Vector3::unit_y(), Rad(0.5));
        let halfway = safe_slerp(Quaternion::one(), turned, 0.5);
        assert!(halfway.s.is_finite());
    }

    #[test]
    fn mutators_raise_the_latch() {
        let mut camera = Camera::framing_volume(64, 1.0, 800, 600);
        assert!(camera.check_changed());
        assert!(!camera.check_changed());

        camera.translate(Vector3::unit_x());
        assert!(camera.check_changed());

        camera.set_viewport(1024, 768);
        assert!(camera.check_changed());
    }

    #[test]
    fn zoom_leaves_the_latch_alone() {
        let mut camera = Camera::framing_volume(64, 1.0, 800, 600);
        camera.check_changed();

        camera.zoom_by(10.0, 0.1, 3.0);
        assert_eq!(camera.zoom, 3.0);
        assert!(!camera.is_changed());
    }

    #[test]
    fn controller_zoom_refreshes_without_latching() {
        let config = CameraConfig::default();
        let mut controller = CameraController::new(&config);
        let mut camera = Camera::new(Point3::origin(), Quaternion::one(), 1.0, 800, 600);
        camera.check_changed();

        controller.intake_actions(&PlayerAction {
            zoom_out: true,
            ..Default::default()
        });
        assert!(controller.has_updates());
        controller.update_camera(&mut camera, Duration::from_millis(500));

        assert!(camera.zoom > 1.0);
        assert!(!camera.check_changed());
    }

    #[test]
    fn controller_moves_along_camera_axes() {
        let config = CameraConfig::default();
        let mut controller = CameraController::new(&config);
        let mut camera = Camera::new(Point3::origin(), Quaternion::one(), 1.0, 800, 600);
        camera.check_changed();

        controller.intake_actions(&PlayerAction {
            move_in: true,
            ..Default::default()
        });
        controller.update_camera(&mut camera, Duration::from_secs(1));

        assert!(camera.check_changed());
        assert!((camera.position.z - config.movement_speed).abs() < 1e-3);
        assert!(!controller.has_updates());
    }
}
