// The 21-point hand skeleton produced by the landmark estimator.
// Indices follow the MediaPipe hand model: 0 is the wrist, then four joints per
// finger from thumb to pinky (MCP, PIP, DIP, TIP; the thumb uses CMC, MCP, IP, TIP).

use serde::Deserialize;

/// How far outside the frame (in frame sizes) a landmark may sit.
const OFF_FRAME_LIMIT: f32 = 1.0;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_FINGER_MCP: usize = 5;
pub const INDEX_FINGER_PIP: usize = 6;
pub const INDEX_FINGER_DIP: usize = 7;
pub const INDEX_FINGER_TIP: usize = 8;
pub const MIDDLE_FINGER_MCP: usize = 9;
pub const MIDDLE_FINGER_PIP: usize = 10;
pub const MIDDLE_FINGER_DIP: usize = 11;
pub const MIDDLE_FINGER_TIP: usize = 12;
pub const RING_FINGER_MCP: usize = 13;
pub const RING_FINGER_PIP: usize = 14;
pub const RING_FINGER_DIP: usize = 15;
pub const RING_FINGER_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

pub const LANDMARK_COUNT: usize = 21;

/// (tip, base joint) for the four fingers the classifier looks at. No thumb.
pub const TRACKED_FINGERS: [(usize, usize); 4] = [
    (INDEX_FINGER_TIP, INDEX_FINGER_MCP),
    (MIDDLE_FINGER_TIP, MIDDLE_FINGER_MCP),
    (RING_FINGER_TIP, RING_FINGER_MCP),
    (PINKY_TIP, PINKY_MCP),
];

/// Bones drawn over the live view in the local window.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (WRIST, THUMB_CMC),
    (THUMB_CMC, THUMB_MCP),
    (THUMB_MCP, THUMB_IP),
    (THUMB_IP, THUMB_TIP),
    (WRIST, INDEX_FINGER_MCP),
    (INDEX_FINGER_MCP, INDEX_FINGER_PIP),
    (INDEX_FINGER_PIP, INDEX_FINGER_DIP),
    (INDEX_FINGER_DIP, INDEX_FINGER_TIP),
    (INDEX_FINGER_MCP, MIDDLE_FINGER_MCP),
    (MIDDLE_FINGER_MCP, MIDDLE_FINGER_PIP),
    (MIDDLE_FINGER_PIP, MIDDLE_FINGER_DIP),
    (MIDDLE_FINGER_DIP, MIDDLE_FINGER_TIP),
    (MIDDLE_FINGER_MCP, RING_FINGER_MCP),
    (RING_FINGER_MCP, RING_FINGER_PIP),
    (RING_FINGER_PIP, RING_FINGER_DIP),
    (RING_FINGER_DIP, RING_FINGER_TIP),
    (RING_FINGER_MCP, PINKY_MCP),
    (WRIST, PINKY_MCP),
    (PINKY_MCP, PINKY_PIP),
    (PINKY_PIP, PINKY_DIP),
    (PINKY_DIP, PINKY_TIP),
];

/// One keypoint. `x`/`y` are fractions of frame width/height, y grows downward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Depth relative to the wrist; carried along, never used for gestures.
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Pixel position, truncated toward zero like an `int()` cast.
    /// Coordinates are clamped to one frame beyond each edge first.
    pub fn to_pixel(&self, width: usize, height: usize) -> (i32, i32) {
        let x = self.x.clamp(-OFF_FRAME_LIMIT, 1.0 + OFF_FRAME_LIMIT);
        let y = self.y.clamp(-OFF_FRAME_LIMIT, 1.0 + OFF_FRAME_LIMIT);
        ((x * width as f32) as i32, (y * height as f32) as i32)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HandSkeleton {
    pub landmarks: [Landmark; LANDMARK_COUNT],
}

impl HandSkeleton {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks }
    }

    /// Build from an estimator's list; anything but exactly 21 points is rejected.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let landmarks: [Landmark; LANDMARK_COUNT] = points.try_into().ok()?;
        Some(Self { landmarks })
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Landmark {
        &self.landmarks[index]
    }

    pub fn wrist(&self) -> &Landmark {
        self.get(WRIST)
    }

    pub fn index_tip(&self) -> &Landmark {
        self.get(INDEX_FINGER_TIP)
    }
}
