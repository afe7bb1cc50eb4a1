// Core raster type shared by the camera, the canvas, the window and the encoder.

#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// A black frame of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Pack tightly interleaved RGB bytes (as produced by the camera decoder).
    /// Returns `None` if `rgb` is not exactly `width * height * 3` long.
    pub fn from_rgb(width: usize, height: usize, rgb: &[u8]) -> Option<Self> {
        if rgb.len() != width * height * 3 {
            return None;
        }
        let pixels = rgb
            .chunks_exact(3)
            .map(|p| pack_rgb(p[0], p[1], p[2]))
            .collect();
        Some(Self { width, height, pixels })
    }

    /// Unpack to interleaved RGB bytes (for JPEG encoding / the landmark helper).
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for &px in &self.pixels {
            let (r, g, b) = unpack_rgb(px);
            out.extend_from_slice(&[r, g, b]);
        }
        out
    }

    /// Flip left/right in place so the view behaves like a mirror.
    pub fn mirror_horizontal(&mut self) {
        if self.width == 0 {
            return;
        }
        for row in self.pixels.chunks_exact_mut(self.width) {
            row.reverse();
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }

    #[inline]
    pub fn same_size(&self, other: &FrameBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }
}

#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline]
pub fn unpack_rgb(px: u32) -> (u8, u8, u8) {
    (((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
}
