// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the mirrored camera image with your ink on top.
// 2) Raster primitives (lines, thick strokes, filled disks) used by the canvas.
// 3) The hand skeleton overlay and a tiny 5x7 bitmap font for the HUD.

use crate::error::Error;
use crate::landmarks::{HAND_CONNECTIONS, HandSkeleton};
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window sized to the camera feed.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Process window events without a new image (used when a camera read is skipped).
    pub fn pump(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Visual: when pressed, every stroke on the canvas disappears.
    pub fn c_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::C, KeyRepeat::No)
    }
}

/* ---------- Software drawing: pixels, lines, disks ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Walk the Bresenham path from (x0,y0) to (x1,y1), endpoints included.
fn for_each_line_point(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        plot(x0, y0);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Draw a thin 1-pixel line between (x0,y0) and (x1,y1).
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    for_each_line_point(x0, y0, x1, y1, |x, y| put_pixel(fb, x, y, color));
}

/// Fill every pixel within `radius` of (cx,cy). Clipped to the frame.
pub fn fill_disk(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32) {
    if radius < 0 {
        return;
    }
    let r2 = radius * radius;
    let y_lo = (cy - radius).max(0);
    let y_hi = (cy + radius).min(fb.height as i32 - 1);
    let x_lo = (cx - radius).max(0);
    let x_hi = (cx + radius).min(fb.width as i32 - 1);
    for y in y_lo..=y_hi {
        let dy = y - cy;
        for x in x_lo..=x_hi {
            let dx = x - cx;
            if dx * dx + dy * dy <= r2 {
                fb.pixels[y as usize * fb.width + x as usize] = color;
            }
        }
    }
}

/// A line `width` pixels wide with round ends (a disk stamped along the path).
pub fn draw_thick_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, width: i32, color: u32) {
    let radius = (width / 2).max(0);
    if radius == 0 {
        draw_line(fb, x0, y0, x1, y1, color);
        return;
    }
    for_each_line_point(x0, y0, x1, y1, |x, y| fill_disk(fb, x, y, radius, color));
}

/* ---------- Hand overlay ---------- */

const BONE_COLOR: u32 = 0x00_E0_E0_E0;
const JOINT_COLOR: u32 = 0x00_FF_30_30;

/// Draw the 21 landmarks and their connections on top of the frame.
/// Visual: a light-grey wireframe hand with red joints follows your hand.
pub fn draw_hand_skeleton(fb: &mut FrameBuffer, hand: &HandSkeleton) {
    let (w, h) = (fb.width, fb.height);
    for &(a, b) in HAND_CONNECTIONS.iter() {
        let (x0, y0) = hand.get(a).to_pixel(w, h);
        let (x1, y1) = hand.get(b).to_pixel(w, h);
        draw_thick_line(fb, x0, y0, x1, y1, 2, BONE_COLOR);
    }
    for lm in hand.landmarks.iter() {
        let (x, y) = lm.to_pixel(w, h);
        fill_disk(fb, x, y, 3, JOINT_COLOR);
    }
}

/* ---------- 5x7 bitmap font (uppercase subset for the HUD) ---------- */

/// Return a 5x7 glyph bitmap for a limited character set.
/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        // Digits 0..9
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        // Letters used by the mode banners and key hints
        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),

        // Punctuation: space, vertical bar, colon, dot
        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),

        _ => None,
    }
}

/// Draw a single 5x7 character at (x,y) with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    if let Some(rows) = glyph5x7(ch) {
        // Shadow pass first, then the glyph itself
        for (offset, c) in [(1, 0x00000000), (0, color)] {
            for (ry, rowbits) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (rowbits & (1 << (4 - rx))) != 0 {
                        put_pixel(fb, x + rx as i32 + offset, y + ry as i32 + offset, c);
                    }
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs; each glyph is 5x7 with 1-pixel spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6; // 5 pixels glyph width + 1 pixel spacing
    }
}
