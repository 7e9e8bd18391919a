//! Window input translated into engine samples.
//!
//! [`Input`] tracks the viewport rectangle and turns cursor positions into
//! normalized device coordinates. It never touches particles; the engine
//! reads the resulting [`PointerSample`] once per frame.
//!
//! ```ignore
//! let mut input = Input::new();
//! input.set_viewport(1280, 720);
//! if let Some(ndc) = input.cursor_moved(Vec2::new(640.0, 360.0)) {
//!     assert_eq!(ndc, Vec2::ZERO);
//! }
//! ```

use crate::pointer::PointerSample;
use glam::Vec2;

/// Viewport size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// A viewport with zero area is treated as unavailable.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Convert a pixel position to NDC. X increases to the right, Y upward.
    pub fn to_ndc(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            (position.x / self.width as f32) * 2.0 - 1.0,
            1.0 - (position.y / self.height as f32) * 2.0,
        )
    }
}

/// Cursor and viewport tracking.
#[derive(Debug, Default)]
pub struct Input {
    viewport: Option<Viewport>,
    cursor: Option<Vec2>,
    pointer: PointerSample,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current viewport, `None` while the window has no area.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Cursor position in physical pixels.
    pub fn cursor(&self) -> Option<Vec2> {
        self.cursor
    }

    /// Latest pointer sample in NDC.
    pub fn pointer(&self) -> PointerSample {
        self.pointer
    }

    /// Update the viewport used for NDC conversion.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
    }

    /// Record a cursor position. Returns its NDC, or `None` when the
    /// viewport is unavailable.
    pub fn cursor_moved(&mut self, position: Vec2) -> Option<Vec2> {
        self.cursor = Some(position);
        let ndc = self.viewport?.to_ndc(position);
        self.pointer.record(ndc);
        self.pointer.get()
    }
}
