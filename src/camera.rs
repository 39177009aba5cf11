use crate::math::{add, cross, dot, normalize, scale, sub, Vec3};
use std::f64::consts::FRAC_PI_2;

/// Width of a terminal cell relative to its height
pub const CELL_ASPECT: f64 = 0.5;
/// Fraction of the pending orbit motion applied per update
pub const DAMPING_FACTOR: f64 = 0.05;

const FIELD_OF_VIEW: f64 = 75.0;
const NEAR: f64 = 0.1;
const FAR: f64 = 1000.0;
const INITIAL_POSITION: Vec3 = [0.0, 40.0, 120.0];
const MIN_DISTANCE: f64 = 15.0;
const MAX_DISTANCE: f64 = 900.0;
const MAX_ELEVATION: f64 = FRAC_PI_2 - 0.01;

/// Output surface size in terminal cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

/// A point mapped onto the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Column, in cells
    pub x: f64,
    /// Row, in cells
    pub y: f64,
    /// Distance along the view direction
    pub depth: f64,
    /// Rows covered by one world unit at this depth
    pub scale: f64,
}

/// Perspective camera orbiting the origin
#[derive(Clone, Debug)]
pub struct Camera {
    viewport: Viewport,
    aspect: f64,
    target: Vec3,
    azimuth: f64,
    elevation: f64,
    distance: f64,
    pending_azimuth: f64,
    pending_elevation: f64,
}

impl Camera {
    pub fn new(viewport: Viewport) -> Self {
        let mut camera = Camera {
            viewport,
            aspect: 1.0,
            target: [0.0; 3],
            azimuth: 0.0,
            elevation: 0.0,
            distance: 1.0,
            pending_azimuth: 0.0,
            pending_elevation: 0.0,
        };
        camera.reset();
        camera.resize(viewport.width, viewport.height);
        camera
    }

    /// Returns to the initial viewpoint
    pub fn reset(&mut self) {
        let [x, y, z] = INITIAL_POSITION;
        let horizontal = (x * x + z * z).sqrt();
        self.azimuth = x.atan2(z);
        self.elevation = y.atan2(horizontal);
        self.distance = (horizontal * horizontal + y * y).sqrt();
        self.pending_azimuth = 0.0;
        self.pending_elevation = 0.0;
    }

    /// Updates the viewport and the projection's aspect ratio
    pub fn resize(&mut self, width: u16, height: u16) {
        self.viewport = Viewport { width, height };
        self.aspect = (width.max(1) as f64 * CELL_ASPECT) / height.max(1) as f64;
        log::debug!("camera resized to {}x{} (aspect {:.3})", width, height, self.aspect);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    /// Queues an orbit around the target; applied gradually by `update`
    pub fn rotate(&mut self, azimuth: f64, elevation: f64) {
        self.pending_azimuth += azimuth;
        self.pending_elevation += elevation;
    }

    /// Scales the distance to the target
    pub fn zoom(&mut self, factor: f64) {
        self.distance = (self.distance * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Applies one step of the damped orbit motion
    pub fn update(&mut self) {
        self.azimuth += self.pending_azimuth * DAMPING_FACTOR;
        self.elevation = (self.elevation + self.pending_elevation * DAMPING_FACTOR)
            .clamp(-MAX_ELEVATION, MAX_ELEVATION);
        self.pending_azimuth *= 1.0 - DAMPING_FACTOR;
        self.pending_elevation *= 1.0 - DAMPING_FACTOR;
    }

    pub fn position(&self) -> Vec3 {
        let (sin_az, cos_az) = self.azimuth.sin_cos();
        let (sin_el, cos_el) = self.elevation.sin_cos();
        let offset = [
            self.distance * sin_az * cos_el,
            self.distance * sin_el,
            self.distance * cos_az * cos_el,
        ];
        add(&self.target, &offset)
    }

    /// Right, up and forward unit vectors of the view
    pub fn basis(&self) -> [Vec3; 3] {
        let forward = normalize(&sub(&self.target, &self.position()));
        let right = normalize(&cross(&forward, &[0.0, 1.0, 0.0]));
        let up = cross(&right, &forward);
        [right, up, forward]
    }

    /// Maps a world-space point onto the viewport, or `None` if it is outside the depth range
    pub fn project(&self, point: &Vec3) -> Option<Projection> {
        let [right, up, forward] = self.basis();
        self.project_with(point, &self.position(), &[right, up, forward])
    }

    /// Like `project`, reusing a precomputed position and basis
    pub fn project_with(&self, point: &Vec3, eye: &Vec3, basis: &[Vec3; 3]) -> Option<Projection> {
        let relative = sub(point, eye);
        let depth = dot(&relative, &basis[2]);
        if !(NEAR..=FAR).contains(&depth) {
            return None;
        }

        let half_height = (FIELD_OF_VIEW.to_radians() / 2.0).tan() * depth;
        let ndc_x = dot(&relative, &basis[0]) / (half_height * self.aspect);
        let ndc_y = dot(&relative, &basis[1]) / half_height;
        let width = self.viewport.width as f64;
        let height = self.viewport.height as f64;

        Some(Projection {
            x: (ndc_x + 1.0) / 2.0 * width,
            y: (1.0 - ndc_y) / 2.0 * height,
            depth,
            scale: height / (2.0 * half_height),
        })
    }

    /// Point on the view ray through the given cell offset, used to shade spheres
    pub fn view_offset(&self, basis: &[Vec3; 3], dx: f64, dy: f64, dz: f64) -> Vec3 {
        add(
            &add(&scale(&basis[0], dx), &scale(&basis[1], dy)),
            &scale(&basis[2], dz),
        )
    }
}
