// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewport - camera, damped orbit controls, lights and helper geometry
//!
//! The orbit controls follow the usual spherical-coordinates scheme around a
//! target point: input accumulates rotation and pan deltas, and each
//! [`OrbitControls::update`] applies a `damping_factor` share of them and
//! decays the rest, which gives the eased motion between frames.

use std::f32::consts::PI;

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

use crate::config::ViewportSettings;

/// Keeps the polar angle off the poles
const POLAR_EPSILON: f32 = 1e-6;
/// Wheel zoom factor per notch
const ZOOM_SCALE: f32 = 0.95;

/// Perspective camera looking at a target, Y up
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl PerspectiveCamera {
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Perspective3::new(self.aspect, self.fov.to_radians(), self.near, self.far).to_homogeneous()
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &Vector3::y())
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Camera right and up axes in world space
    fn screen_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vector3::z());
        let right = forward
            .cross(&Vector3::y())
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::x);
        let up = right.cross(&forward);
        (right, up)
    }
}

/// Damped orbit / pan / dolly around `target`
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Pending (theta, phi) rotation
    spherical_delta: (f32, f32),
    pan_offset: Vector3<f32>,
    scale: f32,
}

impl OrbitControls {
    pub fn new(target: Point3<f32>, damping_factor: f32) -> Self {
        Self {
            target,
            enable_damping: true,
            damping_factor,
            rotate_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            spherical_delta: (0.0, 0.0),
            pan_offset: Vector3::zeros(),
            scale: 1.0,
        }
    }

    /// Pointer drag with the rotate button, in CSS pixels
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.spherical_delta.0 -= 2.0 * PI * dx / height * self.rotate_speed;
        self.spherical_delta.1 -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Pointer drag with the pan button, in CSS pixels
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32, camera: &PerspectiveCamera) {
        let height = viewport_height.max(1.0);
        let distance = (camera.position - self.target).norm() * (camera.fov.to_radians() / 2.0).tan();
        let (right, up) = camera.screen_axes();
        self.pan_offset -= right * (2.0 * dx * distance / height);
        self.pan_offset += up * (2.0 * dy * distance / height);
    }

    /// Wheel input; negative `delta_y` zooms in
    pub fn dolly(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.scale *= ZOOM_SCALE;
        } else if delta_y > 0.0 {
            self.scale /= ZOOM_SCALE;
        }
    }

    /// Apply pending input to the camera; returns whether it moved
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let offset = camera.position - self.target;
        let mut radius = offset.norm();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        let share = if self.enable_damping { self.damping_factor } else { 1.0 };
        theta += self.spherical_delta.0 * share;
        phi += self.spherical_delta.1 * share;
        phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * share;

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        let previous = camera.position;
        camera.position = self.target + offset;
        camera.target = self.target;

        if self.enable_damping {
            self.spherical_delta.0 *= 1.0 - self.damping_factor;
            self.spherical_delta.1 *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
        } else {
            self.spherical_delta = (0.0, 0.0);
            self.pan_offset = Vector3::zeros();
        }
        self.scale = 1.0;

        (camera.position - previous).norm_squared() > 1e-12
    }
}

/// Ambient plus one directional light
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    /// Unit vector pointing from the lit surface towards the light
    pub direction: Vector3<f32>,
}

impl Lighting {
    pub fn from_settings(settings: &ViewportSettings) -> Self {
        let position = Vector3::from(settings.directional_position);
        let target = Vector3::from(settings.directional_target);
        Self {
            ambient_intensity: settings.ambient_intensity,
            directional_intensity: settings.directional_intensity,
            direction: (position - target)
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::y),
        }
    }
}

/// Line segments with per-vertex colours
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineGeometry {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl LineGeometry {
    fn push(&mut self, from: [f32; 3], to: [f32; 3], from_color: [f32; 3], to_color: [f32; 3]) {
        self.positions.extend_from_slice(&from);
        self.positions.extend_from_slice(&to);
        self.colors.extend_from_slice(&from_color);
        self.colors.extend_from_slice(&to_color);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Ground grid in the XZ plane; the centre lines are darker
pub fn grid_helper(size: f32, divisions: u32) -> LineGeometry {
    const CENTER: [f32; 3] = [0.267, 0.267, 0.267];
    const LINE: [f32; 3] = [0.533, 0.533, 0.533];

    let divisions = divisions.max(1);
    let step = size / divisions as f32;
    let half = size / 2.0;
    let mut grid = LineGeometry::default();
    for i in 0..=divisions {
        let k = -half + i as f32 * step;
        let color = if i == divisions / 2 { CENTER } else { LINE };
        grid.push([-half, 0.0, k], [half, 0.0, k], color, color);
        grid.push([k, 0.0, -half], [k, 0.0, half], color, color);
    }
    grid
}

/// X (red), Y (green) and Z (blue) axes from the origin
pub fn axes_helper(length: f32) -> LineGeometry {
    let mut axes = LineGeometry::default();
    axes.push([0.0; 3], [length, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.6, 0.0]);
    axes.push([0.0; 3], [0.0, length, 0.0], [0.0, 1.0, 0.0], [0.6, 1.0, 0.0]);
    axes.push([0.0; 3], [0.0, 0.0, length], [0.0, 0.0, 1.0], [0.0, 0.6, 1.0]);
    axes
}

/// Camera, controls and canvas sizing
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub lighting: Lighting,
    /// CSS size of the canvas
    pub width: f32,
    pub height: f32,
    pub pixel_ratio: f64,
    max_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(settings: &ViewportSettings, width: f32, height: f32, device_pixel_ratio: f64) -> Self {
        let camera = PerspectiveCamera {
            fov: settings.fov,
            aspect: aspect(width, height),
            near: settings.near,
            far: settings.far,
            position: Point3::from(settings.camera_position),
            target: Point3::from(settings.controls_target),
        };
        Self {
            camera,
            controls: OrbitControls::new(Point3::from(settings.controls_target), settings.damping_factor),
            lighting: Lighting::from_settings(settings),
            width,
            height,
            pixel_ratio: device_pixel_ratio.min(settings.max_pixel_ratio),
            max_pixel_ratio: settings.max_pixel_ratio,
        }
    }

    /// Window resize: new aspect and canvas size
    pub fn resize(&mut self, width: f32, height: f32, device_pixel_ratio: f64) {
        self.width = width;
        self.height = height;
        self.pixel_ratio = device_pixel_ratio.min(self.max_pixel_ratio);
        self.camera.aspect = aspect(width, height);
    }

    /// Size of the drawing buffer in device pixels
    pub fn drawing_buffer_size(&self) -> (u32, u32) {
        (
            (self.width as f64 * self.pixel_ratio).floor().max(1.0) as u32,
            (self.height as f64 * self.pixel_ratio).floor().max(1.0) as u32,
        )
    }

    /// Per-frame controls update
    pub fn tick(&mut self) -> bool {
        self.controls.update(&mut self.camera)
    }
}

fn aspect(width: f32, height: f32) -> f32 {
    if height > 0.0 {
        width / height
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn viewport() -> Viewport {
        Viewport::new(&ViewportSettings::default(), 1600.0, 900.0, 3.0)
    }

    #[test]
    fn test_defaults() {
        let viewport = viewport();
        assert_relative_eq!(viewport.camera.aspect, 1600.0 / 900.0);
        assert_eq!(viewport.pixel_ratio, 2.0);
        assert_eq!(viewport.drawing_buffer_size(), (3200, 1800));
        assert_eq!(viewport.camera.position, Point3::new(8.0, 13.0, 15.0));
        assert_eq!(viewport.controls.target, Point3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_resize() {
        let mut viewport = viewport();
        viewport.resize(800.0, 800.0, 1.0);
        assert_relative_eq!(viewport.camera.aspect, 1.0);
        assert_eq!(viewport.drawing_buffer_size(), (800, 800));
    }

    #[test]
    fn test_first_update_keeps_distance_and_looks_at_target() {
        let mut viewport = viewport();
        let distance = (viewport.camera.position - viewport.controls.target).norm();
        viewport.tick();
        assert_relative_eq!(
            (viewport.camera.position - viewport.controls.target).norm(),
            distance,
            epsilon = 1e-4
        );
        assert_eq!(viewport.camera.target, Point3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_damped_rotation_eases_out() {
        let mut viewport = viewport();
        viewport.tick();
        let start = viewport.camera.position;
        viewport.controls.rotate(100.0, 0.0, 900.0);

        viewport.tick();
        let first_step = (viewport.camera.position - start).norm();
        let after_first = viewport.camera.position;
        viewport.tick();
        let second_step = (viewport.camera.position - after_first).norm();

        assert!(first_step > 0.0);
        assert!(second_step < first_step);
        // Height is unchanged by a horizontal drag
        assert_relative_eq!(viewport.camera.position.y, start.y, epsilon = 1e-4);
    }

    #[test]
    fn test_dolly() {
        let mut viewport = viewport();
        viewport.tick();
        let distance = (viewport.camera.position - viewport.controls.target).norm();
        viewport.controls.dolly(-1.0);
        viewport.tick();
        let closer = (viewport.camera.position - viewport.controls.target).norm();
        assert_relative_eq!(closer, distance * ZOOM_SCALE, epsilon = 1e-3);
    }

    #[test]
    fn test_pan_moves_target() {
        let mut viewport = viewport();
        let camera = viewport.camera.clone();
        viewport.controls.pan(50.0, 0.0, 900.0, &camera);
        viewport.tick();
        assert_ne!(viewport.controls.target, Point3::new(-2.0, 0.0, 0.0));
        assert_relative_eq!(viewport.controls.target.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_helpers() {
        let grid = grid_helper(100.0, 60);
        assert_eq!(grid.vertex_count(), 61 * 4);
        assert_eq!(grid.colors.len(), grid.positions.len());
        assert_relative_eq!(grid.positions[0], -50.0);

        let axes = axes_helper(1.0);
        assert_eq!(axes.vertex_count(), 6);
    }

    #[test]
    fn test_light_direction() {
        let lighting = Lighting::from_settings(&ViewportSettings::default());
        let expected = Vector3::new(5.0f32, 10.0, 0.0).normalize();
        assert_relative_eq!(lighting.direction, expected);
    }
}
