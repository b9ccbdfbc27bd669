use std::path::Path;

use image::{ColorType, DynamicImage, GrayImage, ImageFormat, Luma};
use ndarray::Array2;

use crate::error::{CometError, Result};
use crate::plane::{ColorChannel, GrayPlane, SourceEncoding};

/// Load an image file into an 8-bit grayscale plane.
pub fn load_plane(path: &Path) -> Result<GrayPlane> {
    let img = image::open(path)?;
    to_gray_plane(&img)
}

/// Convert a decoded image into the grayscale plane the analyzer works on.
///
/// 8-bit gray is used as-is, 16-bit gray is scaled from its own min..max
/// range to 0..255, and color images keep their most informative channel
/// (the one with the highest mean intensity).
pub fn to_gray_plane(img: &DynamicImage) -> Result<GrayPlane> {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return Err(CometError::InvalidDimensions {
            width: w,
            height: h,
        });
    }

    match img.color() {
        ColorType::L8 | ColorType::La8 => {
            let gray = img.to_luma8();
            let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
                gray.get_pixel(col as u32, row as u32).0[0]
            });
            Ok(GrayPlane::with_source(data, SourceEncoding::Gray8))
        }
        ColorType::L16 | ColorType::La16 => {
            let gray = img.to_luma16();
            let data = scale_to_u8(gray.as_raw(), w as usize, h as usize);
            Ok(GrayPlane::with_source(data, SourceEncoding::Gray16))
        }
        ColorType::Rgb8
        | ColorType::Rgba8
        | ColorType::Rgb16
        | ColorType::Rgba16
        | ColorType::Rgb32F
        | ColorType::Rgba32F => {
            let rgb = img.to_rgb8();
            let (channel, data) = brightest_channel(&rgb);
            Ok(GrayPlane::with_source(data, SourceEncoding::Color(channel)))
        }
        other => Err(CometError::UnsupportedPixelFormat(format!("{:?}", other))),
    }
}

/// Linear min..max scaling of 16-bit samples to 8 bits.
fn scale_to_u8(samples: &[u16], w: usize, h: usize) -> Array2<u8> {
    let min = samples.iter().copied().min().unwrap_or(0) as f64;
    let max = samples.iter().copied().max().unwrap_or(0) as f64;
    let scale = 256.0 / (max - min + 1.0);

    Array2::from_shape_fn((h, w), |(row, col)| {
        let value = (samples[row * w + col] as f64 - min).max(0.0);
        ((value * scale + 0.5) as u32).min(255) as u8
    })
}

/// Pick the color channel with the highest mean. Red wins only when it beats
/// both others, green when it beats blue, otherwise blue.
fn brightest_channel(rgb: &image::RgbImage) -> (ColorChannel, Array2<u8>) {
    let mut sums = [0u64; 3];
    for px in rgb.pixels() {
        for (sum, &v) in sums.iter_mut().zip(px.0.iter()) {
            *sum += v as u64;
        }
    }

    let (r, g, b) = (sums[0], sums[1], sums[2]);
    let (channel, index) = if r > g && r > b {
        (ColorChannel::Red, 0)
    } else if g >= r && g > b {
        (ColorChannel::Green, 1)
    } else {
        (ColorChannel::Blue, 2)
    };

    let (w, h) = rgb.dimensions();
    let data = Array2::from_shape_fn((h as usize, w as usize), |(row, col)| {
        rgb.get_pixel(col as u32, row as u32).0[index]
    });
    (channel, data)
}

/// Save a plane as 8-bit grayscale PNG.
pub fn save_png(plane: &GrayPlane, path: &Path) -> Result<()> {
    let mut img = GrayImage::new(plane.width() as u32, plane.height() as u32);
    for ((row, col), &v) in plane.data.indexed_iter() {
        img.put_pixel(col as u32, row as u32, Luma([v]));
    }
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
