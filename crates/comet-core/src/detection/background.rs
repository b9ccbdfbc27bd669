use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::{HISTOGRAM_BINS, PARALLEL_ROW_THRESHOLD};
use crate::plane::GrayPlane;

/// Circular-kernel median filter. Pixels beyond the border repeat the
/// nearest edge pixel.
pub fn median_filter(plane: &GrayPlane, radius: f64) -> GrayPlane {
    let data = &plane.data;
    let (h, w) = data.dim();
    if h == 0 || w == 0 || radius <= 0.0 {
        return plane.clone();
    }

    // Half-width of the kernel in each row offset.
    let r2 = radius * radius + 1.0;
    let kr = (r2 + 1e-10).sqrt() as i32;
    let spans: Vec<(i32, i32)> = (-kr..=kr)
        .map(|dy| (dy, (r2 - (dy * dy) as f64).sqrt() as i32))
        .collect();
    let taps: u64 = spans.iter().map(|&(_, dx)| 2 * dx as u64 + 1).sum();

    let clamp_row = |r: i32| r.clamp(0, h as i32 - 1) as usize;
    let clamp_col = |c: i32| c.clamp(0, w as i32 - 1) as usize;

    let filter_row = |row: usize| -> Vec<u8> {
        let mut hist = [0u64; HISTOGRAM_BINS];
        for &(dy, dx) in &spans {
            let r = clamp_row(row as i32 + dy);
            for c in -dx..=dx {
                hist[data[[r, clamp_col(c)]] as usize] += 1;
            }
        }

        let mut out = Vec::with_capacity(w);
        out.push(histogram_median(&hist, taps));
        for col in 1..w as i32 {
            for &(dy, dx) in &spans {
                let r = clamp_row(row as i32 + dy);
                hist[data[[r, clamp_col(col - 1 - dx)]] as usize] -= 1;
                hist[data[[r, clamp_col(col + dx)]] as usize] += 1;
            }
            out.push(histogram_median(&hist, taps));
        }
        out
    };

    let filtered = build_rows(h, w, filter_row);
    GrayPlane::with_source(filtered, plane.source)
}

fn histogram_median(hist: &[u64; HISTOGRAM_BINS], count: u64) -> u8 {
    let half = count / 2;
    let mut cumulative = 0;
    for (v, &n) in hist.iter().enumerate() {
        cumulative += n;
        if cumulative > half {
            return v as u8;
        }
    }
    255
}

/// Rolling-ball background subtraction for a dark background.
///
/// The image is shrunk by block minimum for large balls, the ball is rolled
/// under the intensity surface, and the interpolated background is
/// subtracted with rounding, clamped at 0.
pub fn rolling_ball_subtract(plane: &GrayPlane, radius: f64) -> GrayPlane {
    let (h, w) = plane.data.dim();
    if h == 0 || w == 0 || radius <= 0.0 {
        return plane.clone();
    }

    let ball = RollingBall::new(radius);
    let source = plane.data.mapv(|v| v as f32);
    let small = shrink(&source, ball.shrink_factor);
    let rolled = roll_ball(&ball, &small);
    let background = if ball.shrink_factor > 1 {
        enlarge(&rolled, w, h, ball.shrink_factor)
    } else {
        rolled
    };

    let mut out = plane.data.clone();
    out.zip_mut_with(&background, |px, &bg| {
        let value = *px as f32 - bg + 0.5;
        *px = value.clamp(0.0, 255.0) as u8;
    });
    GrayPlane::with_source(out, plane.source)
}

struct RollingBall {
    /// Ball heights over a `(2 * half_width + 1)^2` patch; 0 outside the ball.
    z: Array2<f32>,
    half_width: i32,
    shrink_factor: usize,
}

impl RollingBall {
    fn new(radius: f64) -> Self {
        let (shrink_factor, arc_trim_percent) = if radius <= 10.0 {
            (1, 24.0)
        } else if radius <= 30.0 {
            (2, 24.0)
        } else if radius <= 100.0 {
            (4, 32.0)
        } else {
            (8, 40.0)
        };

        let small_radius = (radius / shrink_factor as f64).max(1.0);
        let r_square = small_radius * small_radius;
        let x_trim = ((arc_trim_percent * small_radius) as i32 / 100) as f64;
        let half_width = (small_radius - x_trim).round() as i32;
        let size = (2 * half_width + 1) as usize;

        let z = Array2::from_shape_fn((size, size), |(row, col)| {
            let dx = col as f64 - half_width as f64;
            let dy = row as f64 - half_width as f64;
            let t = r_square - dx * dx - dy * dy;
            if t > 0.0 {
                t.sqrt() as f32
            } else {
                0.0
            }
        });

        Self {
            z,
            half_width,
            shrink_factor,
        }
    }
}

/// Block-minimum downsampling.
fn shrink(data: &Array2<f32>, factor: usize) -> Array2<f32> {
    if factor <= 1 {
        return data.clone();
    }
    let (h, w) = data.dim();
    let (sh, sw) = (h.div_ceil(factor), w.div_ceil(factor));
    Array2::from_shape_fn((sh, sw), |(sy, sx)| {
        let mut min = f32::MAX;
        for y in sy * factor..((sy + 1) * factor).min(h) {
            for x in sx * factor..((sx + 1) * factor).min(w) {
                min = min.min(data[[y, x]]);
            }
        }
        min
    })
}

/// Background surface traced by the top of the ball rolled under `data`.
fn roll_ball(ball: &RollingBall, data: &Array2<f32>) -> Array2<f32> {
    let (h, w) = data.dim();
    let hw = ball.half_width;
    let (ph, pw) = (h + 2 * hw as usize, w + 2 * hw as usize);

    // Lowest ball height touching the surface, per ball position. Position
    // (py, px) centers the ball at image (py - hw, px - hw).
    let lowest_row = |py: usize| -> Vec<f32> {
        let cy = py as i32 - hw;
        (0..pw)
            .map(|px| {
                let cx = px as i32 - hw;
                let mut z = f32::MAX;
                for y in (cy - hw).max(0)..=(cy + hw).min(h as i32 - 1) {
                    for x in (cx - hw).max(0)..=(cx + hw).min(w as i32 - 1) {
                        let zb = ball.z[[(y - cy + hw) as usize, (x - cx + hw) as usize]];
                        z = z.min(data[[y as usize, x as usize]] - zb);
                    }
                }
                z
            })
            .collect()
    };
    let lowest = build_rows(ph, pw, lowest_row);

    let background_row = |y: usize| -> Vec<f32> {
        (0..w)
            .map(|x| {
                let mut top = f32::MIN;
                for by in 0..=2 * hw as usize {
                    for bx in 0..=2 * hw as usize {
                        // Ball position whose patch covers (x, y) at (bx, by).
                        let py = y + 2 * hw as usize - by;
                        let px = x + 2 * hw as usize - bx;
                        top = top.max(lowest[[py, px]] + ball.z[[by, bx]]);
                    }
                }
                top
            })
            .collect()
    };
    build_rows(h, w, background_row)
}

/// Bilinear enlargement of a shrunken background back to `(height, width)`.
fn enlarge(small: &Array2<f32>, width: usize, height: usize, factor: usize) -> Array2<f32> {
    let (sh, sw) = small.dim();
    let xs = interpolation_table(width, sw, factor);
    let ys = interpolation_table(height, sh, factor);

    Array2::from_shape_fn((height, width), |(y, x)| {
        let (yi, yw) = ys[y];
        let (xi, xw) = xs[x];
        let sample = |r: usize| -> f32 {
            if sw < 2 {
                small[[r, 0]]
            } else {
                xw * small[[r, xi]] + (1.0 - xw) * small[[r, xi + 1]]
            }
        };
        if sh < 2 {
            sample(0)
        } else {
            yw * sample(yi) + (1.0 - yw) * sample(yi + 1)
        }
    })
}

/// Per full-size index: lower small-image index and its interpolation weight.
fn interpolation_table(length: usize, small_length: usize, factor: usize) -> Vec<(usize, f32)> {
    (0..length)
        .map(|i| {
            let mut index = (i as i64 - factor as i64 / 2) / factor as i64;
            if index >= small_length as i64 - 1 {
                index = small_length as i64 - 2;
            }
            let index = index.max(0) as usize;
            let distance = (i as f64 + 0.5) / factor as f64 - (index as f64 + 0.5);
            (index, (1.0 - distance) as f32)
        })
        .collect()
}

/// Build a `(h, w)` array row by row, in parallel for tall images.
fn build_rows<T, F>(h: usize, w: usize, row_fn: F) -> Array2<T>
where
    T: Copy + Default + Send,
    F: Fn(usize) -> Vec<T> + Sync,
{
    let rows: Vec<Vec<T>> = if h >= PARALLEL_ROW_THRESHOLD {
        (0..h).into_par_iter().map(&row_fn).collect()
    } else {
        (0..h).map(&row_fn).collect()
    };

    let mut result = Array2::<T>::default((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}
