use imageproc::definitions::Image;
use tracing::debug;

use super::weights::{ColorWeight, SpatialWeight, UniformColor, UniformSpatial};
use crate::pixel::{distance_sq, read_bands, BandPixel};

const UNASSIGNED: u32 = u32::MAX;

/// Modes found by [`MeanShiftSearch`] and the mode every pixel converged to.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanShiftModes {
    bands: usize,
    /// Mode id of every pixel
    pub pixel_to_mode: Vec<u32>,
    /// Converged `[x, y]` of each mode
    pub locations: Vec<[f32; 2]>,
    /// Converged color of each mode, mode-major
    pub colors: Vec<f32>,
    /// Number of pixels assigned to each mode
    pub member_counts: Vec<usize>,
    /// Start pixels a search was run from; below the pixel count in fast mode
    pub searches: usize,
}

impl MeanShiftModes {
    fn new(bands: usize, pixel_count: usize) -> Self {
        Self {
            bands,
            pixel_to_mode: vec![UNASSIGNED; pixel_count],
            locations: Vec::new(),
            colors: Vec::new(),
            member_counts: Vec::new(),
            searches: 0,
        }
    }

    fn push(&mut self, x: f32, y: f32, color: &[f32]) -> u32 {
        let id = self.locations.len() as u32;
        self.locations.push([x, y]);
        self.colors.extend_from_slice(color);
        self.member_counts.push(0);
        id
    }

    fn assign(&mut self, pixel: usize, mode: u32) {
        self.pixel_to_mode[pixel] = mode;
        self.member_counts[mode as usize] += 1;
    }

    pub fn num_modes(&self) -> usize {
        self.locations.len()
    }

    pub fn color(&self, mode: usize) -> &[f32] {
        &self.colors[mode * self.bands..(mode + 1) * self.bands]
    }

    /// Combine modes: old mode `m` becomes new mode `map[m]`.
    ///
    /// Locations and colors of combined modes are averaged weighted by their
    /// member counts.
    pub(crate) fn remap(&self, map: &[u32], new_count: usize) -> Self {
        let bands = self.bands;
        let mut weights = vec![0.0f64; new_count];
        let mut locations = vec![[0.0f64; 2]; new_count];
        let mut colors = vec![0.0f64; new_count * bands];
        let mut member_counts = vec![0usize; new_count];

        for (old, &new) in map.iter().enumerate() {
            let new = new as usize;
            let count = self.member_counts[old];
            // Empty modes still need a location if nothing else lands there.
            let w = count.max(1) as f64;
            weights[new] += w;
            member_counts[new] += count;
            locations[new][0] += w * self.locations[old][0] as f64;
            locations[new][1] += w * self.locations[old][1] as f64;
            for (acc, &v) in colors[new * bands..(new + 1) * bands].iter_mut().zip(self.color(old)) {
                *acc += w * v as f64;
            }
        }

        Self {
            bands,
            pixel_to_mode: self.pixel_to_mode.iter().map(|&m| map[m as usize]).collect(),
            locations: locations
                .iter()
                .zip(&weights)
                .map(|([x, y], &w)| [(x / w) as f32, (y / w) as f32])
                .collect(),
            colors: colors
                .chunks_exact(bands.max(1))
                .zip(&weights)
                .flat_map(|(c, &w)| c.iter().map(move |v| (v / w) as f32))
                .collect(),
            member_counts,
            searches: self.searches,
        }
    }

    /// Converged `(x, y, color)` of the pixel at flat `index`.
    pub fn mode_of(&self, index: usize) -> ([f32; 2], &[f32]) {
        let mode = self.pixel_to_mode[index] as usize;
        (self.locations[mode], self.color(mode))
    }
}

/// Per-pixel mode seeking in joint position/color space.
#[derive(Debug, Clone)]
pub struct MeanShiftSearch<S = UniformSpatial, C = UniformColor> {
    pub spatial: S,
    pub color: C,
    pub max_iterations: usize,
    /// Search stops once the joint displacement drops below this
    pub convergence_tol: f32,
    /// Reuse modes of already-visited pixels instead of searching from them
    pub fast: bool,
}

impl MeanShiftSearch {
    /// Uniform kernels, 20 iterations and a tolerance of 0.1.
    pub fn uniform(spatial_radius: usize, color_radius: f32, fast: bool) -> Self {
        Self {
            spatial: UniformSpatial {
                radius: spatial_radius,
            },
            color: UniformColor::new(color_radius),
            max_iterations: 20,
            convergence_tol: 0.1,
            fast,
        }
    }
}

/// Scratch for one search step.
struct Step {
    color: Vec<f32>,
    next_color: Vec<f32>,
    sample: Vec<f32>,
}

impl<S: SpatialWeight, C: ColorWeight> MeanShiftSearch<S, C> {
    pub fn search<P: BandPixel>(&self, image: &Image<P>) -> MeanShiftModes {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let pixel_count = width * height;
        let bands = P::bands();

        let mut modes = MeanShiftModes::new(bands, pixel_count);
        // Mode ids keyed by the pixel a search converged on.
        let mut mode_at = vec![UNASSIGNED; pixel_count];
        let mut path: Vec<usize> = Vec::new();
        let mut step = Step {
            color: vec![0.0; bands],
            next_color: vec![0.0; bands],
            sample: vec![0.0; bands],
        };
        let tol_sq = self.convergence_tol * self.convergence_tol;
        let mut iterations_total = 0usize;

        for start in 0..pixel_count {
            if self.fast && modes.pixel_to_mode[start] != UNASSIGNED {
                continue;
            }

            modes.searches += 1;
            path.clear();
            path.push(start);
            read_bands(image, start, &mut step.color);
            let mut cx = (start % width) as f32;
            let mut cy = (start / width) as f32;
            let mut adopted = None;

            for _ in 0..self.max_iterations {
                iterations_total += 1;
                let Some((nx, ny)) = self.shift(image, cx, cy, &mut step) else {
                    break;
                };
                let displacement_sq = (nx - cx) * (nx - cx)
                    + (ny - cy) * (ny - cy)
                    + distance_sq(&step.next_color, &step.color);
                cx = nx;
                cy = ny;
                step.color.copy_from_slice(&step.next_color);

                if self.fast {
                    let index = pixel_index(cx, cy, width);
                    let assigned = modes.pixel_to_mode[index];
                    if assigned != UNASSIGNED {
                        adopted = Some(assigned);
                        break;
                    }
                    if path.last() != Some(&index) {
                        path.push(index);
                    }
                }

                if displacement_sq < tol_sq {
                    break;
                }
            }

            let mode = match adopted {
                Some(mode) => mode,
                None => {
                    let key = pixel_index(cx, cy, width);
                    if mode_at[key] == UNASSIGNED {
                        mode_at[key] = modes.push(cx, cy, &step.color);
                    }
                    mode_at[key]
                }
            };

            if self.fast {
                for &pixel in &path {
                    if modes.pixel_to_mode[pixel] == UNASSIGNED {
                        modes.assign(pixel, mode);
                    }
                }
            } else {
                modes.assign(start, mode);
            }
        }

        debug!(
            modes = modes.num_modes(),
            searches = modes.searches,
            iterations = iterations_total,
            fast = self.fast,
            "mean-shift search done"
        );
        modes
    }

    /// One mean-shift update from `(cx, cy, step.color)`.
    ///
    /// Writes the new color to `step.next_color` and returns the new position
    /// clamped to the image, or `None` when no neighbor carries weight.
    ///
    /// The window is centred on the estimate rounded to the nearest pixel and
    /// samples whole pixels, so a sub-pixel estimate is approximated by that
    /// pixel's window rather than by an interpolated one.
    fn shift<P: BandPixel>(&self, image: &Image<P>, cx: f32, cy: f32, step: &mut Step) -> Option<(f32, f32)> {
        let width = image.width() as i64;
        let height = image.height() as i64;
        let radius = self.spatial.radius() as i64;
        let rx = (cx.round() as i64).clamp(0, width - 1);
        let ry = (cy.round() as i64).clamp(0, height - 1);

        let mut total = 0.0f32;
        let mut sum_x = 0.0f32;
        let mut sum_y = 0.0f32;
        step.next_color.fill(0.0);

        for y in (ry - radius).max(0)..=(ry + radius).min(height - 1) {
            for x in (rx - radius).max(0)..=(rx + radius).min(width - 1) {
                let ws = self.spatial.weight(x - rx, y - ry);
                if ws <= 0.0 {
                    continue;
                }
                read_bands(image, (y * width + x) as usize, &mut step.sample);
                let w = ws * self.color.weight(distance_sq(&step.sample, &step.color));
                if w <= 0.0 {
                    continue;
                }
                total += w;
                sum_x += w * x as f32;
                sum_y += w * y as f32;
                for (acc, &v) in step.next_color.iter_mut().zip(&step.sample) {
                    *acc += w * v;
                }
            }
        }

        if total <= 0.0 {
            return None;
        }
        for acc in step.next_color.iter_mut() {
            *acc /= total;
        }
        let nx = (sum_x / total).clamp(0.0, (width - 1) as f32);
        let ny = (sum_y / total).clamp(0.0, (height - 1) as f32);
        Some((nx, ny))
    }
}

#[inline]
fn pixel_index(x: f32, y: f32, width: usize) -> usize {
    y.round() as usize * width + x.round() as usize
}
