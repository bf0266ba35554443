//! Geometry APIs
//!
//! DOMRect for getBoundingClientRect and the viewport size.

/// DOMRect - rectangle geometry in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create empty rect
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Check if point is inside
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Layout viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}
