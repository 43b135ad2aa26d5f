//! # Camera Implementation
//!
//! This module contains the camera model of the player:
//! - Look angles and their update from mouse deltas
//! - View and projection matrices for chunk culling
//! - The motion vector derived from strafe input
//!
//! ## Key Components
//! - `Camera`: Yaw and pitch of the player's view
//! - `Projection`: Perspective projection settings
//! - `motion_vector`: Converts strafe axes into a world-space direction
//!
//! ## Angle conventions
//! Yaw `0` looks down `-Z` and grows toward `+X`; it is kept in `[0, 2π)`.
//! Pitch is kept in `[-π/2, π/2]`, `π/2` looking straight up.

use cgmath::*;
use std::f32::consts::{FRAC_PI_2, TAU};

use crate::engine_state::voxels::query;

/// Radians of rotation per unit of mouse movement.
pub const LOOK_SENSITIVITY: f32 = 0.0025;

/// Pitch limit used when building the view matrix; looking exactly straight
/// up or down would make the view direction parallel to the up vector.
const SAFE_FRAC_PI_2: f32 = FRAC_PI_2 - 0.0001;

/// The player's view direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Horizontal rotation (around Y axis) in radians
    pub yaw: Rad<f32>,
    /// Vertical rotation (around X axis) in radians
    pub pitch: Rad<f32>,
}

impl Camera {
    /// Creates a camera with the given orientation.
    ///
    /// # Arguments
    /// * `yaw` - Initial yaw. Can be any type that converts to `Rad<f32>`.
    /// * `pitch` - Initial pitch. Can be any type that converts to `Rad<f32>`.
    ///
    /// # Example
    /// ```rust
    /// use cgmath::Deg;
    /// use voxel_world::engine_state::camera_state::camera::Camera;
    ///
    /// let camera = Camera::new(Deg(0.0), Deg(-30.0));
    /// assert!(camera.sight_vector().y < 0.0);
    /// ```
    pub fn new<Y: Into<Rad<f32>>, P: Into<Rad<f32>>>(yaw: Y, pitch: P) -> Self {
        let mut camera = Self {
            yaw: yaw.into(),
            pitch: pitch.into(),
        };
        camera.normalize();
        camera
    }

    /// Applies a mouse movement delta.
    ///
    /// Moving right turns right; moving down looks down.
    pub fn rotate(&mut self, delta_x: f64, delta_y: f64) {
        self.yaw += Rad(delta_x as f32 * LOOK_SENSITIVITY);
        self.pitch -= Rad(delta_y as f32 * LOOK_SENSITIVITY);
        self.normalize();
    }

    /// Wraps yaw into `[0, 2π)` and clamps pitch to `[-π/2, π/2]`.
    fn normalize(&mut self) {
        self.yaw = Rad(self.yaw.0.rem_euclid(TAU));
        // rem_euclid can round up to exactly TAU for tiny negative inputs.
        if self.yaw.0 >= TAU {
            self.yaw = Rad(0.0);
        }
        self.pitch = Rad(self.pitch.0.clamp(-FRAC_PI_2, FRAC_PI_2));
    }

    /// Unit vector the camera is looking along.
    pub fn sight_vector(&self) -> Vector3<f32> {
        query::sight_vector(self.yaw, self.pitch)
    }

    /// Calculates the view matrix for an eye at `eye`.
    ///
    /// # Returns
    /// A 4x4 matrix transforming world coordinates to view space
    pub fn calc_matrix(&self, eye: Point3<f32>) -> Matrix4<f32> {
        let pitch = Rad(self.pitch.0.clamp(-SAFE_FRAC_PI_2, SAFE_FRAC_PI_2));
        Matrix4::look_to_rh(eye, query::sight_vector(self.yaw, pitch), Vector3::unit_y())
    }
}

/// Represents a camera's projection matrix and related parameters.
///
/// It manages the aspect ratio, field of view, and near/far clipping planes.
#[derive(Debug, Clone, Copy)]
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
    ///
    /// # Arguments
    /// * `width` - Viewport width in pixels
    /// * `height` - Viewport height in pixels
    /// * `fovy` - Vertical field of view (can be any type convertible to `Rad<f32>`)
    /// * `znear` - Near clipping plane distance
    /// * `zfar` - Far clipping plane distance
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let aspect = width as f32 / height.max(1) as f32;
        Self {
            aspect,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    /// Calculates the projection matrix.
    pub fn calc_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::new(1024, 768, Deg(65.0), 0.125, 512.0)
    }
}

/// Converts strafe input into a movement direction.
///
/// # Arguments
/// * `flying` - Whether vertical look contributes to forward movement
/// * `move_z` - `-1` forward, `+1` backward
/// * `move_x` - `-1` left, `+1` right
/// * `yaw`, `pitch` - The current view
///
/// # Returns
/// A unit vector, or zero when there is no strafe input. Walking movement is
/// always horizontal. Flying forward/backward follows the pitch, while any
/// sideways component keeps the movement level.
pub fn motion_vector(
    flying: bool,
    move_z: i32,
    move_x: i32,
    yaw: Rad<f32>,
    pitch: Rad<f32>,
) -> Vector3<f32> {
    if move_z == 0 && move_x == 0 {
        return Vector3::zero();
    }
    let strafe = Rad((move_z as f32).atan2(move_x as f32));
    let heading = yaw + strafe;
    if !flying {
        return Vector3::new(heading.cos(), 0.0, heading.sin());
    }
    let (mut m, mut y) = (pitch.cos(), pitch.sin());
    if move_x != 0 {
        y = 0.0;
        m = 1.0;
    }
    if move_z > 0 {
        y = -y;
    }
    Vector3::new(heading.cos() * m, y, heading.sin() * m)
}
