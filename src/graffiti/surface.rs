use crate::graffiti::buffer::{byte_len, PixelBuffer};
use crate::graffiti::model::{BrushConfig, Color, Point};
use crate::graffiti::render::{draw_segment, fill, SegmentStyle};

/// One continuous pointer gesture, alive between begin and end of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeSession {
    last_point: Point,
    segments: usize,
}

impl StrokeSession {
    pub fn last_point(&self) -> Point {
        self.last_point
    }

    /// Number of segments drawn since the stroke began.
    pub fn segments(&self) -> usize {
        self.segments
    }
}

/// Fixed-size RGBA canvas owned by a single pad.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    session: Option<StrokeSession>,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; byte_len(width, height)],
            session: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_stroking(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&StrokeSession> {
        self.session.as_ref()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 4;
        Some(Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }

    /// Starts a stroke at `point`. Returns `false` if a stroke is already active.
    pub fn begin_stroke(&mut self, point: Point) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.session = Some(StrokeSession {
            last_point: point,
            segments: 0,
        });
        true
    }

    /// Draws from the session's last point to `point`. No-op without an active stroke.
    pub fn extend_stroke(&mut self, point: Point, brush: &BrushConfig) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let style = SegmentStyle {
            color: brush.color(),
            width_px: brush.width_px(),
            shadow_blur_px: brush.shadow_blur_px(),
        };
        draw_segment(
            &mut self.pixels,
            self.width,
            self.height,
            session.last_point,
            point,
            style,
        );
        session.last_point = point;
        session.segments += 1;
    }

    pub fn end_stroke(&mut self) -> Option<StrokeSession> {
        self.session.take()
    }

    pub fn snapshot(&self) -> PixelBuffer {
        PixelBuffer::from_pixels(self.width, self.height, self.pixels.clone())
    }

    pub fn restore(&mut self, buffer: &PixelBuffer) {
        if !buffer.same_size(self.width, self.height) {
            tracing::warn!(
                surface_width = self.width,
                surface_height = self.height,
                buffer_width = buffer.width(),
                buffer_height = buffer.height(),
                "ignoring restore of mismatched snapshot"
            );
            return;
        }
        self.pixels.copy_from_slice(buffer.pixels());
    }

    pub fn clear(&mut self) {
        fill(&mut self.pixels, Color::TRANSPARENT);
    }
}
