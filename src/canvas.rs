// Persistent ink layer that lives on top of the constantly replaced camera feed.
// Visual: strokes stay where you drew them while the video keeps moving underneath.

use crate::draw::{draw_thick_line, fill_disk};
use crate::error::Error;
use crate::types::FrameBuffer;

/// Empty canvas colour. Anything else on the layer counts as ink.
pub const BACKGROUND: u32 = 0x00_00_00_00;
/// Stroke colour (a warm salmon, 0xRRGGBB).
pub const STROKE_COLOR: u32 = 0x00_ED_95_64;
/// Pen width in pixels.
pub const STROKE_WIDTH: i32 = 5;
/// Radius of the palm eraser in pixels.
pub const ERASER_RADIUS: i32 = 50;

pub struct Canvas {
    layer: FrameBuffer,
}

impl Canvas {
    /// Fully transparent (background) layer of the camera's size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { layer: FrameBuffer::new(width, height) }
    }

    pub fn width(&self) -> usize {
        self.layer.width
    }

    pub fn height(&self) -> usize {
        self.layer.height
    }

    pub fn layer(&self) -> &FrameBuffer {
        &self.layer
    }

    /// Ink a segment between two pixel positions.
    pub fn stroke(&mut self, from: (i32, i32), to: (i32, i32)) {
        draw_thick_line(&mut self.layer, from.0, from.1, to.0, to.1, STROKE_WIDTH, STROKE_COLOR);
    }

    /// Wipe a disk around (cx, cy), whatever was drawn there.
    pub fn erase_disk(&mut self, cx: i32, cy: i32) {
        fill_disk(&mut self.layer, cx, cy, ERASER_RADIUS, BACKGROUND);
    }

    pub fn clear(&mut self) {
        self.layer.pixels.fill(BACKGROUND);
    }

    pub fn has_ink(&self) -> bool {
        self.layer.pixels.iter().any(|&p| p != BACKGROUND)
    }

    /// Binary mask blend: ink pixels replace the frame, background keeps the live image.
    pub fn composite_onto(&self, frame: &mut FrameBuffer) -> Result<(), Error> {
        if !self.layer.same_size(frame) {
            return Err(Error::Composite(format!(
                "canvas is {}x{}, frame is {}x{}",
                self.layer.width, self.layer.height, frame.width, frame.height
            )));
        }
        for (dst, &ink) in frame.pixels.iter_mut().zip(self.layer.pixels.iter()) {
            if ink != BACKGROUND {
                *dst = ink;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    #[test]
    fn stroke_to_an_off_frame_landmark_stays_bounded() {
        let mut canvas = Canvas::new(64, 64);
        let far = Landmark::new(1e30, 0.5, 0.0).to_pixel(64, 64);
        canvas.stroke((-10, 10), far);
        assert!(canvas.has_ink());
    }

    #[test]
    fn new_canvas_is_empty() {
        let canvas = Canvas::new(64, 48);
        assert!(!canvas.has_ink());
        assert_eq!((canvas.width(), canvas.height()), (64, 48));
    }

    #[test]
    fn stroke_inks_the_segment() {
        let mut canvas = Canvas::new(64, 64);
        canvas.stroke((10, 10), (20, 20));
        for i in 10..=20 {
            assert_eq!(canvas.layer().get(i, i), Some(STROKE_COLOR), "at ({i},{i})");
        }
        assert_eq!(canvas.layer().get(40, 40), Some(BACKGROUND));
    }

    #[test]
    fn erase_clears_disk_regardless_of_ink() {
        let mut canvas = Canvas::new(200, 200);
        for y in (0..200).step_by(4) {
            canvas.stroke((0, y), (199, y));
        }
        canvas.erase_disk(50, 50);
        let layer = canvas.layer();
        assert_eq!(layer.get(50, 50), Some(BACKGROUND));
        assert_eq!(layer.get(50, 52), Some(BACKGROUND));
        assert_eq!(layer.get(99, 52), Some(BACKGROUND)); // 49px right, 2 down
        assert_eq!(layer.get(50, 101), Some(STROKE_COLOR)); // 51px below, still inked
        assert_eq!(layer.get(110, 52), Some(STROKE_COLOR));
    }

    #[test]
    fn composite_is_a_binary_mask() {
        let mut canvas = Canvas::new(4, 1);
        canvas.layer.pixels[1] = STROKE_COLOR;
        canvas.layer.pixels[2] = 0x00_00_00_01; // barely not background: still opaque ink
        let mut frame = FrameBuffer { width: 4, height: 1, pixels: vec![0x11, 0x22, 0x33, 0x44] };
        canvas.composite_onto(&mut frame).unwrap();
        assert_eq!(frame.pixels, vec![0x11, STROKE_COLOR, 0x01, 0x44]);
    }

    #[test]
    fn composite_rejects_size_mismatch() {
        let canvas = Canvas::new(4, 4);
        let mut frame = FrameBuffer::new(5, 4);
        assert!(matches!(canvas.composite_onto(&mut frame), Err(Error::Composite(_))));
    }

    #[test]
    fn clear_wipes_everything() {
        let mut canvas = Canvas::new(32, 32);
        canvas.stroke((0, 0), (31, 31));
        assert!(canvas.has_ink());
        canvas.clear();
        assert!(!canvas.has_ink());
    }
}
