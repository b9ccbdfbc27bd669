use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect as DrawRect;

use crate::analysis::local_background::Profiles;
use crate::analysis::ImageAnalysis;
use crate::comet::{Comet, CometStatus};
use crate::error::Result;
use crate::geometry::{Rect, Region};
use crate::plane::GrayPlane;

const VALID_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const INVALID_COLOR: Rgb<u8> = Rgb([128, 128, 128]);
const OUTLIER_COLOR: Rgb<u8> = Rgb([255, 200, 0]);

pub const COMET_PROFILE_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
pub const HEAD_PROFILE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const TAIL_PROFILE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Gap between a comet's right edge and its id label.
const LABEL_GAP: i32 = 5;
/// Size of one glyph cell in label pixels.
const LABEL_SCALE: i32 = 3;
const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: usize = 5;

/// 3x5 digit glyphs, one bit per cell, most significant bit on the left.
const DIGITS: [[u8; GLYPH_HEIGHT]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Outline color of a comet, or `None` when it is not drawn.
pub fn status_color(status: CometStatus) -> Option<Rgb<u8>> {
    match status {
        CometStatus::Valid => Some(VALID_COLOR),
        CometStatus::InvalidSize => Some(INVALID_COLOR),
        CometStatus::Outlier => Some(OUTLIER_COLOR),
        CometStatus::InvalidNoHead | CometStatus::Deleted => None,
    }
}

/// Render the plane as RGB with the annotations of every drawn comet.
///
/// Valid and outlier comets get their column profiles plotted inside their
/// bounding box. Comet and head outlines go on top, and each comet's id is
/// written to the right of its box, all in the status color.
pub fn render_overlay(plane: &GrayPlane, analysis: &ImageAnalysis) -> RgbImage {
    let mut img = RgbImage::new(plane.width() as u32, plane.height() as u32);
    for ((row, col), &v) in plane.data.indexed_iter() {
        img.put_pixel(col as u32, row as u32, Rgb([v, v, v]));
    }

    for comet in &analysis.comets {
        let Some(color) = status_color(comet.status) else {
            continue;
        };
        if matches!(comet.status, CometStatus::Valid | CometStatus::Outlier) {
            if let Some(profiles) = &comet.profiles {
                draw_profile_plot(&mut img, comet.bounds(), profiles);
            }
        }
        draw_outline(&mut img, comet.boundary(), color);
        if let Some(head) = &comet.head {
            draw_outline(&mut img, head, color);
        }
        draw_id_label(&mut img, comet, color);
    }
    img
}

/// Plot the comet, head and tail profiles over `bounds`, scaled so the
/// profile maximum spans the box height. Nothing is drawn for a flat
/// profile.
pub fn draw_profile_plot(img: &mut RgbImage, bounds: Rect, profiles: &Profiles) {
    if profiles.max <= 0.0 || bounds.width < 2 || bounds.height <= 0 {
        return;
    }
    let step = bounds.height as f64 / profiles.max;
    let bottom = (bounds.height - 1) as f64;

    for (profile, color) in [
        (&profiles.comet, COMET_PROFILE_COLOR),
        (&profiles.head, HEAD_PROFILE_COLOR),
        (&profiles.tail, TAIL_PROFILE_COLOR),
    ] {
        for (col, pair) in profile.windows(2).enumerate() {
            let x = (bounds.x + col as i32) as f32;
            let y1 = bounds.y as f32 + (bottom - pair[0] * step) as i32 as f32;
            let y2 = bounds.y as f32 + (bottom - pair[1] * step) as i32 as f32;
            draw_line_segment_mut(img, (x, y1), (x + 1.0, y2), color);
        }
    }
}

/// Write the comet id right of its bounding box, at mid height.
fn draw_id_label(img: &mut RgbImage, comet: &Comet, color: Rgb<u8>) {
    let Some(id) = comet.id else {
        return;
    };
    let bounds = comet.bounds();
    let mut x = bounds.right() + LABEL_GAP;
    let y = bounds.y + bounds.height / 2;

    for digit in id.to_string().bytes().map(|b| (b - b'0') as usize) {
        for (row, bits) in DIGITS[digit].iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let cell = DrawRect::at(x + col * LABEL_SCALE, y + row as i32 * LABEL_SCALE)
                    .of_size(LABEL_SCALE as u32, LABEL_SCALE as u32);
                draw_filled_rect_mut(img, cell, color);
            }
        }
        x += (GLYPH_WIDTH + 1) * LABEL_SCALE;
    }
}

/// Color every region pixel with a 4-neighbor outside the region.
fn draw_outline(img: &mut RgbImage, region: &Region, color: Rgb<u8>) {
    let (w, h) = (img.width() as i32, img.height() as i32);
    for (x, y) in region.pixels() {
        let edge = [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .iter()
            .any(|&(dx, dy)| !region.contains(x + dx, y + dy));
        if edge && x >= 0 && y >= 0 && x < w && y < h {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

/// Save the annotated image as PNG.
pub fn save_overlay(plane: &GrayPlane, analysis: &ImageAnalysis, path: &Path) -> Result<()> {
    render_overlay(plane, analysis).save_with_format(path, ImageFormat::Png)?;
    Ok(())
}
