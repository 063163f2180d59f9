//! Orbit camera for 3D visualization
//!
//! The camera is Z-up: yaw turns the eye around the vertical axis and pitch
//! raises it above (or lowers it below) the XY plane through the target.

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};

/// Maps OpenGL clip-space depth (-1..1) onto wgpu's (0..1)
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Input sensitivities and limits for the orbit camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSettings {
    /// Radians of yaw/pitch per pixel of drag
    pub orbit_sensitivity: f32,
    /// Target displacement per pixel of drag, as a fraction of the distance
    pub pan_scale: f32,
    /// Fractional distance change per scroll step
    pub zoom_sensitivity: f32,
    pub min_distance: f32,
    /// Pitch is kept within `[-pitch_limit, pitch_limit]`, below a right angle
    pub pitch_limit: f32,
}

impl OrbitSettings {
    /// Largest accepted pitch limit, just short of a right angle
    pub const MAX_PITCH_LIMIT: f32 = 1.57;
    /// Smallest accepted minimum distance
    pub const MIN_DISTANCE_FLOOR: f32 = 1e-3;

    /// Copy with the limits forced into their usable ranges.
    ///
    /// `min_distance` is raised to at least [`Self::MIN_DISTANCE_FLOOR`] and
    /// `pitch_limit` is kept within `[0, MAX_PITCH_LIMIT]`; non-finite values
    /// fall back to the defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let min_distance = if self.min_distance.is_finite() {
            self.min_distance.max(Self::MIN_DISTANCE_FLOOR)
        } else {
            defaults.min_distance
        };
        let pitch_limit = if self.pitch_limit.is_finite() {
            self.pitch_limit.clamp(0.0, Self::MAX_PITCH_LIMIT)
        } else {
            defaults.pitch_limit
        };

        let sanitized = Self {
            min_distance,
            pitch_limit,
            ..self
        };
        if sanitized != self {
            log::warn!("Orbit settings adjusted from {:?} to {:?}", self, sanitized);
        }
        sanitized
    }
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            orbit_sensitivity: 0.005,
            pan_scale: 0.001,
            zoom_sensitivity: 0.1,
            min_distance: 0.1,
            pitch_limit: 1.57,
        }
    }
}

/// A camera orbiting a target point
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    target: Point3<f32>,
    up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    distance: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    settings: OrbitSettings,
}

impl OrbitCamera {
    pub const DEFAULT_YAW: f32 = std::f32::consts::FRAC_PI_4;
    pub const DEFAULT_PITCH: f32 = std::f32::consts::FRAC_PI_4;
    pub const DEFAULT_DISTANCE: f32 = 5.0;

    /// Create a camera at the default orbit around the origin.
    ///
    /// Out-of-range limits in `settings` are corrected, see
    /// [`OrbitSettings::sanitized`].
    pub fn new(settings: OrbitSettings) -> Self {
        let mut camera = Self {
            target: Point3::origin(),
            up: Vector3::z(),
            yaw: 0.0,
            pitch: 0.0,
            distance: 0.0,
            fov_y: 45.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
            settings: settings.sanitized(),
        };
        camera.reset();
        camera
    }

    /// Return to the default orbit around the origin
    pub fn reset(&mut self) {
        self.target = Point3::origin();
        self.yaw = Self::DEFAULT_YAW;
        self.pitch = Self::DEFAULT_PITCH.clamp(-self.settings.pitch_limit, self.settings.pitch_limit);
        self.distance = Self::DEFAULT_DISTANCE.max(self.settings.min_distance);
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    pub fn set_target(&mut self, target: Point3<f32>) {
        self.target = target;
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Eye position: `distance` away from the target along `(yaw, pitch)`
    pub fn eye(&self) -> Point3<f32> {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let offset = Vector3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, sin_pitch);
        self.target + offset * self.distance
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye(), &self.target, &self.up)
    }

    /// Get the projection matrix, already mapped to wgpu's depth range
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Matrix4<f32> {
        let perspective = Perspective3::new(aspect_ratio, self.fov_y, self.near, self.far);
        OPENGL_TO_WGPU_MATRIX * perspective.into_inner()
    }

    /// Rotate around the target by a drag of `(dx, dy)` pixels
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let limit = self.settings.pitch_limit;
        self.yaw -= dx * self.settings.orbit_sensitivity;
        self.pitch = (self.pitch + dy * self.settings.orbit_sensitivity).clamp(-limit, limit);
    }

    /// Slide the target in the view plane by a drag of `(dx, dy)` pixels.
    ///
    /// The step grows with the distance so panning feels the same at any zoom.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let view = self.view_matrix();
        // Rows of the view rotation are the camera axes in world space
        let right = Vector3::new(view[(0, 0)], view[(0, 1)], view[(0, 2)]);
        let up = Vector3::new(view[(1, 0)], view[(1, 1)], view[(1, 2)]);
        let scale = self.distance * self.settings.pan_scale;

        self.target += -right * dx * scale + up * dy * scale;
    }

    /// Move toward (positive `amount`) or away from the target
    pub fn zoom(&mut self, amount: f32) {
        let distance = self.distance * (1.0 - amount * self.settings.zoom_sensitivity);
        self.distance = distance.max(self.settings.min_distance);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}
