//! The draw surface the engine renders into.

use crate::buffer::ParticleBuffer;

/// A mountable presentation target.
///
/// The engine is the only writer of the particle buffer; a surface only
/// reads it in [`present`](Surface::present). Implementations decide how a
/// frame request is delivered: a window surface asks the windowing system
/// for a redraw, a test double just counts.
pub trait Surface {
    /// Consume the buffer for presentation. Called once per processed frame,
    /// after positions changed.
    fn present(&mut self, buffer: &ParticleBuffer);

    /// Ask for the next frame callback.
    fn request_frame(&mut self);

    /// The viewport changed size, in physical pixels.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Free every resource held for presentation. Called once on teardown.
    fn release(&mut self);
}
