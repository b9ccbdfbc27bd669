use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::consts::HISTOGRAM_BINS;

/// A single 8-bit grayscale image plane.
///
/// Pixel data is row-major with shape `(height, width)`; `(x, y)` accessors
/// take the column first, matching image coordinates.
#[derive(Clone, Debug)]
pub struct GrayPlane {
    pub data: Array2<u8>,
    /// Pixel encoding of the file the plane was derived from.
    pub source: SourceEncoding,
}

impl GrayPlane {
    pub fn new(data: Array2<u8>) -> Self {
        Self {
            data,
            source: SourceEncoding::Gray8,
        }
    }

    pub fn with_source(data: Array2<u8>, source: SourceEncoding) -> Self {
        Self { data, source }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// Pixel value at `(x, y)`. Coordinates outside the plane read as 0.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 {
            return 0;
        }
        self.data
            .get((y as usize, x as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Overwrite the pixel at `(x, y)`; out-of-range writes are ignored.
    pub fn put(&mut self, x: i32, y: i32, value: u8) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(px) = self.data.get_mut((y as usize, x as usize)) {
            *px = value;
        }
    }

    /// Intensity histogram of the whole plane.
    pub fn histogram(&self) -> [u64; HISTOGRAM_BINS] {
        let mut hist = [0u64; HISTOGRAM_BINS];
        for &v in self.data.iter() {
            hist[v as usize] += 1;
        }
        hist
    }
}

/// Pixel encoding of the source image and, for color sources, the channel
/// kept as the grayscale plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceEncoding {
    Gray8,
    /// 16-bit gray, scaled linearly from its min..max range to 0..255.
    Gray16,
    Color(ColorChannel),
}

impl std::fmt::Display for SourceEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gray8 => write!(f, "8-bit gray"),
            Self::Gray16 => write!(f, "16-bit gray (scaled)"),
            Self::Color(channel) => write!(f, "color ({} channel)", channel),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl std::fmt::Display for ColorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Red => write!(f, "red"),
            Self::Green => write!(f, "green"),
            Self::Blue => write!(f, "blue"),
        }
    }
}
