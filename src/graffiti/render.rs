use crate::graffiti::buffer::blend_pixel;
use crate::graffiti::model::{Color, Point};

/// Halo alpha at the edge of the stroke core, relative to the stroke color.
const SHADOW_STRENGTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    /// Bounding box of the segment `a`..`b` grown by `pad`, clipped to the
    /// canvas. `None` when nothing of it lands on the canvas.
    pub fn around_segment(
        a: Point,
        b: Point,
        pad: i32,
        width: u32,
        height: u32,
    ) -> Option<Self> {
        let pad = i64::from(pad.max(0));
        let x0 = (i64::from(a.x.min(b.x)) - pad).clamp(0, i64::from(width));
        let y0 = (i64::from(a.y.min(b.y)) - pad).clamp(0, i64::from(height));
        let x1 = (i64::from(a.x.max(b.x)) + pad + 1).clamp(0, i64::from(width));
        let y1 = (i64::from(a.y.max(b.y)) + pad + 1).clamp(0, i64::from(height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(DirtyRect {
            x: i32::try_from(x0).ok()?,
            y: i32::try_from(y0).ok()?,
            width: i32::try_from(x1 - x0).ok()?,
            height: i32::try_from(y1 - y0).ok()?,
        })
    }
}

/// Everything a segment needs from the brush, resolved once per stroke call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentStyle {
    pub color: Color,
    pub width_px: u32,
    pub shadow_blur_px: u32,
}

impl SegmentStyle {
    fn core_radius(self) -> f32 {
        self.width_px.max(1) as f32 / 2.0
    }
}

/// Rasterizes a round-capped segment, shadow halo first, then the opaque core.
///
/// A zero-length segment paints a dot. Returns the number of pixels written.
pub fn draw_segment(
    pixels: &mut [u8],
    width: u32,
    height: u32,
    start: Point,
    end: Point,
    style: SegmentStyle,
) -> u64 {
    let radius = style.core_radius();
    let blur = style.shadow_blur_px as f32;
    // Float-to-int casts saturate, so a huge blur clips to the whole canvas.
    let pad = ((radius + blur).ceil() as i32).saturating_add(1);
    let Some(clip) = DirtyRect::around_segment(start, end, pad, width, height) else {
        return 0;
    };

    let radius_sq = radius * radius;
    let outer_sq = (radius + blur) * (radius + blur);
    let mut writes: u64 = 0;
    for y in clip.y..(clip.y + clip.height) {
        for x in clip.x..(clip.x + clip.width) {
            let dist_sq = point_segment_distance_sq(Point::new(x, y), start, end);
            if dist_sq <= radius_sq {
                set_pixel(pixels, width, x, y, style.color);
                writes = writes.saturating_add(1);
            } else if blur > 0.0 && dist_sq <= outer_sq {
                let falloff = 1.0 - (dist_sq.sqrt() - radius) / blur;
                let alpha = (style.color.a as f32 * falloff * SHADOW_STRENGTH)
                    .round()
                    .clamp(0.0, 255.0) as u8;
                if alpha > 0 {
                    blend_into(pixels, width, x, y, style.color.with_alpha(alpha));
                    writes = writes.saturating_add(1);
                }
            }
        }
    }
    writes
}

pub fn fill(pixels: &mut [u8], color: Color) {
    let rgba = color.to_rgba_array();
    for px in pixels.chunks_exact_mut(4) {
        px.copy_from_slice(&rgba);
    }
}

fn point_segment_distance_sq(point: Point, start: Point, end: Point) -> f32 {
    let px = point.x as f32;
    let py = point.y as f32;
    let x0 = start.x as f32;
    let y0 = start.y as f32;
    let vx = end.x as f32 - x0;
    let vy = end.y as f32 - y0;
    let wx = px - x0;
    let wy = py - y0;
    let len_sq = vx * vx + vy * vy;
    if len_sq <= f32::EPSILON {
        return wx * wx + wy * wy;
    }
    let t = ((wx * vx + wy * vy) / len_sq).clamp(0.0, 1.0);
    let dx = px - (x0 + vx * t);
    let dy = py - (y0 + vy * t);
    dx * dx + dy * dy
}

fn pixel_index(width: u32, x: i32, y: i32) -> usize {
    ((y as usize * width as usize) + x as usize) * 4
}

fn set_pixel(pixels: &mut [u8], width: u32, x: i32, y: i32, color: Color) {
    let idx = pixel_index(width, x, y);
    if idx + 3 >= pixels.len() {
        return;
    }
    pixels[idx..idx + 4].copy_from_slice(&color.to_rgba_array());
}

fn blend_into(pixels: &mut [u8], width: u32, x: i32, y: i32, color: Color) {
    let idx = pixel_index(width, x, y);
    if idx + 3 >= pixels.len() {
        return;
    }
    let bottom = Color::rgba(
        pixels[idx],
        pixels[idx + 1],
        pixels[idx + 2],
        pixels[idx + 3],
    );
    pixels[idx..idx + 4].copy_from_slice(&blend_pixel(bottom, color).to_rgba_array());
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgba(255, 0, 0, 255);

    fn style(width_px: u32, shadow_blur_px: u32) -> SegmentStyle {
        SegmentStyle {
            color: RED,
            width_px,
            shadow_blur_px,
        }
    }

    fn alpha_at(pixels: &[u8], width: u32, x: i32, y: i32) -> u8 {
        pixels[pixel_index(width, x, y) + 3]
    }

    #[test]
    fn horizontal_segment_covers_its_path() {
        let mut pixels = vec![0u8; 10 * 5 * 4];
        let writes = draw_segment(
            &mut pixels,
            10,
            5,
            Point::new(1, 2),
            Point::new(8, 2),
            style(2, 0),
        );
        assert!(writes > 0);
        for x in 1..=8 {
            assert_eq!(alpha_at(&pixels, 10, x, 2), 255, "x={x}");
        }
        assert_eq!(alpha_at(&pixels, 10, 5, 4), 0);
    }

    #[test]
    fn zero_length_segment_paints_a_dot() {
        let mut pixels = vec![0u8; 5 * 5 * 4];
        draw_segment(
            &mut pixels,
            5,
            5,
            Point::new(2, 2),
            Point::new(2, 2),
            style(1, 0),
        );
        assert_eq!(alpha_at(&pixels, 5, 2, 2), 255);
        assert_eq!(alpha_at(&pixels, 5, 0, 0), 0);
    }

    #[test]
    fn off_canvas_segment_is_clipped() {
        let mut pixels = vec![0u8; 4 * 4 * 4];
        let writes = draw_segment(
            &mut pixels,
            4,
            4,
            Point::new(-50, -50),
            Point::new(-40, -40),
            style(2, 0),
        );
        assert_eq!(writes, 0);
        assert!(pixels.iter().all(|b| *b == 0));
    }

    #[test]
    fn shadow_halo_fades_outside_core() {
        let mut pixels = vec![0u8; 20 * 20 * 4];
        draw_segment(
            &mut pixels,
            20,
            20,
            Point::new(10, 10),
            Point::new(10, 10),
            style(2, 4),
        );
        assert_eq!(alpha_at(&pixels, 20, 10, 10), 255);
        let near = alpha_at(&pixels, 20, 12, 10);
        let far = alpha_at(&pixels, 20, 14, 10);
        assert!(near > 0 && near < 255);
        assert!(far < near);
        assert_eq!(alpha_at(&pixels, 20, 17, 10), 0);
    }

    #[test]
    fn dirty_rect_clamps_to_canvas() {
        let rect = DirtyRect::around_segment(Point::new(-3, 1), Point::new(2, 2), 1, 10, 10);
        assert_eq!(
            rect,
            Some(DirtyRect {
                x: 0,
                y: 0,
                width: 4,
                height: 4
            })
        );
        assert_eq!(
            DirtyRect::around_segment(Point::new(-3, 1), Point::new(2, 2), 1, 0, 0),
            None
        );
    }

    #[test]
    fn huge_shadow_blur_covers_canvas_without_overflow() {
        let mut pixels = vec![0u8; 6 * 6 * 4];
        let writes = draw_segment(
            &mut pixels,
            6,
            6,
            Point::new(1, 1),
            Point::new(4, 4),
            style(2, u32::MAX),
        );
        assert_eq!(writes, 36);
        assert_eq!(alpha_at(&pixels, 6, 2, 2), 255);
        assert!(alpha_at(&pixels, 6, 5, 0) > 0);
    }

    #[test]
    fn extreme_coordinates_are_clipped_without_overflow() {
        let mut pixels = vec![0u8; 8 * 8 * 4];
        draw_segment(
            &mut pixels,
            8,
            8,
            Point::new(i32::MIN, i32::MIN),
            Point::new(i32::MAX, i32::MAX),
            style(4, 3),
        );
        let writes = draw_segment(
            &mut pixels,
            8,
            8,
            Point::new(i32::MAX - 1, i32::MAX),
            Point::new(i32::MAX, i32::MAX),
            style(2, 0),
        );
        assert_eq!(writes, 0);
    }

    #[test]
    fn dirty_rect_spans_full_integer_range() {
        let rect = DirtyRect::around_segment(
            Point::new(i32::MIN, 0),
            Point::new(i32::MAX, 0),
            i32::MAX,
            3,
            2,
        );
        assert_eq!(
            rect,
            Some(DirtyRect {
                x: 0,
                y: 0,
                width: 3,
                height: 2
            })
        );
    }
}
