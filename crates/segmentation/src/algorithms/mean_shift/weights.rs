//! Weighting kernels for mean-shift.

/// Weight of a neighbor by its offset from the window center.
pub trait SpatialWeight: Send + Sync {
    /// Half-width of the square search window in pixels.
    fn radius(&self) -> usize;

    fn weight(&self, dx: i64, dy: i64) -> f32;
}

/// Weight of a neighbor by its squared color distance to the current mean.
pub trait ColorWeight: Send + Sync {
    fn weight(&self, distance_sq: f32) -> f32;
}

/// Every pixel inside the square window counts equally.
#[derive(Debug, Clone, Copy)]
pub struct UniformSpatial {
    pub radius: usize,
}

impl SpatialWeight for UniformSpatial {
    fn radius(&self) -> usize {
        self.radius
    }

    fn weight(&self, dx: i64, dy: i64) -> f32 {
        let r = self.radius as i64;
        if dx.abs() <= r && dy.abs() <= r { 1.0 } else { 0.0 }
    }
}

/// Gaussian falloff with the window truncated at `radius`.
#[derive(Debug, Clone, Copy)]
pub struct GaussianSpatial {
    pub radius: usize,
    pub sigma: f32,
}

impl GaussianSpatial {
    /// Sigma of a third of the radius, so the window covers three sigmas.
    pub fn from_radius(radius: usize) -> Self {
        Self {
            radius,
            sigma: (radius as f32 / 3.0).max(0.5),
        }
    }
}

impl SpatialWeight for GaussianSpatial {
    fn radius(&self) -> usize {
        self.radius
    }

    fn weight(&self, dx: i64, dy: i64) -> f32 {
        let r = self.radius as i64;
        if dx.abs() > r || dy.abs() > r {
            return 0.0;
        }
        let d2 = (dx * dx + dy * dy) as f32;
        (-d2 / (2.0 * self.sigma * self.sigma)).exp()
    }
}

/// Full weight inside the color radius, zero outside.
#[derive(Debug, Clone, Copy)]
pub struct UniformColor {
    pub radius_sq: f32,
}

impl UniformColor {
    pub fn new(radius: f32) -> Self {
        Self {
            radius_sq: radius * radius,
        }
    }
}

impl ColorWeight for UniformColor {
    fn weight(&self, distance_sq: f32) -> f32 {
        if distance_sq <= self.radius_sq { 1.0 } else { 0.0 }
    }
}

/// Gaussian falloff in color distance.
#[derive(Debug, Clone, Copy)]
pub struct GaussianColor {
    pub sigma: f32,
}

impl ColorWeight for GaussianColor {
    fn weight(&self, distance_sq: f32) -> f32 {
        (-distance_sq / (2.0 * self.sigma * self.sigma)).exp()
    }
}
