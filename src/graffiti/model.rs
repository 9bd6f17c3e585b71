use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_rgba_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// The fixed set of brush widths offered by the toolbar.
///
/// Always non-empty and sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrushSizes {
    sizes: Vec<u32>,
}

impl BrushSizes {
    pub const DEFAULT: [u32; 4] = [2, 5, 10, 20];

    pub fn new(sizes: impl IntoIterator<Item = u32>) -> Self {
        let mut sizes: Vec<u32> = sizes.into_iter().filter(|size| *size > 0).collect();
        sizes.sort_unstable();
        sizes.dedup();
        if sizes.is_empty() {
            sizes = Self::DEFAULT.to_vec();
        }
        Self { sizes }
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.sizes
    }

    /// Snaps `width` to the nearest preset. Ties go to the smaller preset.
    pub fn clamp(&self, width: u32) -> u32 {
        let mut best = self.sizes[0];
        for &size in &self.sizes {
            if size.abs_diff(width) < best.abs_diff(width) {
                best = size;
            }
        }
        best
    }
}

impl Default for BrushSizes {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrushConfig {
    color: Color,
    width_px: u32,
    shadow_blur_px: u32,
    sizes: BrushSizes,
}

impl BrushConfig {
    pub fn new(color: Color, width_px: u32, shadow_blur_px: u32, sizes: BrushSizes) -> Self {
        let width_px = sizes.clamp(width_px);
        Self {
            color,
            width_px,
            shadow_blur_px,
            sizes,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width_px(&self) -> u32 {
        self.width_px
    }

    pub fn shadow_blur_px(&self) -> u32 {
        self.shadow_blur_px
    }

    pub fn sizes(&self) -> &BrushSizes {
        &self.sizes
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Returns the width actually applied after snapping to a preset.
    pub fn set_width(&mut self, width_px: u32) -> u32 {
        self.width_px = self.sizes.clamp(width_px);
        self.width_px
    }

    pub fn set_shadow_blur(&mut self, shadow_blur_px: u32) {
        self.shadow_blur_px = shadow_blur_px;
    }
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self::new(Color::BLACK, 5, 0, BrushSizes::default())
    }
}
