// What the networked mode sends to viewers, and how it fans out.
// Two message kinds go out once per capture iteration, both as JSON text:
//   {"event":"hand_data","data":{"x":0.42,"y":0.31,"gesture":"draw"}}
//   {"event":"video_feed","data":"/9j/4AAQSkZJRg..."}
// Delivery is best-effort: no acks, no replay for late joiners, and a viewer
// that falls behind simply misses messages.

use crate::error::Error;
use crate::gesture::{self, Gesture};
use crate::landmarks::HandSkeleton;
use crate::types::FrameBuffer;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use serde::Serialize;
use tokio::sync::broadcast;

/// Messages buffered per viewer before the slowest one starts skipping.
pub const CHANNEL_CAPACITY: usize = 16;

/// Fingertip position as a fraction of the frame, plus the wire gesture label.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PointerUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub gesture: String,
}

impl PointerUpdate {
    /// Nothing detected this frame.
    pub fn none() -> Self {
        Self { x: None, y: None, gesture: Gesture::None.wire_label().to_string() }
    }

    /// Build from every hand in a frame; when there are several, the last one wins.
    pub fn from_hands(hands: &[HandSkeleton], width: usize, height: usize) -> Self {
        let mut update = Self::none();
        if width == 0 || height == 0 {
            return update;
        }
        for hand in hands {
            let (px, py) = hand.index_tip().to_pixel(width, height);
            update = Self {
                x: Some(px as f64 / width as f64),
                y: Some(py as f64 / height as f64),
                gesture: gesture::classify(hand).wire_label().to_string(),
            };
        }
        update
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ViewerMessage {
    HandData(PointerUpdate),
    /// Base64 of a JPEG of the mirrored camera frame.
    VideoFeed(String),
}

impl ViewerMessage {
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Lossy-compress a frame.
pub fn encode_jpeg(frame: &FrameBuffer, quality: u8) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode(
        &frame.to_rgb_bytes(),
        frame.width as u32,
        frame.height as u32,
        ExtendedColorType::Rgb8,
    )?;
    Ok(out)
}

/// JPEG, then base64 text, ready to drop into a `video_feed` message.
pub fn encode_frame_base64(frame: &FrameBuffer, quality: u8) -> Result<String, Error> {
    Ok(STANDARD.encode(encode_jpeg(frame, quality)?))
}

/// Producer side of the viewer fan-out. Cheap to clone.
#[derive(Clone)]
pub struct Publisher {
    tx: broadcast::Sender<ViewerMessage>,
}

impl Publisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Fire-and-forget. Returns how many viewers were connected.
    pub fn publish(&self, msg: ViewerMessage) -> usize {
        // Err only means nobody is listening right now.
        self.tx.send(msg).unwrap_or(0)
    }

    /// A new viewer sees only what is published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ViewerMessage> {
        self.tx.subscribe()
    }

    pub fn viewer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::fixtures::{fist_hand, open_hand, pointing_hand};

    #[test]
    fn no_hand_payload_is_null_none() {
        let json = ViewerMessage::HandData(PointerUpdate::from_hands(&[], 640, 480))
            .to_json()
            .unwrap();
        assert_eq!(json, r#"{"event":"hand_data","data":{"x":null,"y":null,"gesture":"none"}}"#);
    }

    #[test]
    fn pointing_hand_reports_draw_and_fingertip() {
        let update = PointerUpdate::from_hands(&[pointing_hand()], 640, 480);
        assert_eq!(update.gesture, "draw");
        // index tip of the fixture is at (0.35, 0.3)
        let (px, py) = pointing_hand().index_tip().to_pixel(640, 480);
        assert_eq!(update.x, Some(px as f64 / 640.0));
        assert_eq!(update.y, Some(py as f64 / 480.0));
    }

    #[test]
    fn normalised_coordinates_round_trip_to_pixels() {
        for (w, h) in [(640usize, 480usize), (1280, 720), (333, 251)] {
            let hand = pointing_hand();
            let (px, py) = hand.index_tip().to_pixel(w, h);
            let update = PointerUpdate::from_hands(&[hand], w, h);
            let back_x = (update.x.unwrap() * w as f64).round() as i32;
            let back_y = (update.y.unwrap() * h as f64).round() as i32;
            assert_eq!((back_x, back_y), (px, py));
        }
    }

    #[test]
    fn fist_is_not_distinguished_on_the_wire() {
        let update = PointerUpdate::from_hands(&[fist_hand()], 100, 100);
        assert_eq!(update.gesture, "none");
        assert!(update.x.is_some());
    }

    #[test]
    fn last_hand_wins() {
        let update = PointerUpdate::from_hands(&[pointing_hand(), open_hand()], 100, 100);
        assert_eq!(update.gesture, "erase");
    }

    #[test]
    fn video_feed_serialises_as_string_payload() {
        let json = ViewerMessage::VideoFeed("abc=".into()).to_json().unwrap();
        assert_eq!(json, r#"{"event":"video_feed","data":"abc="}"#);
    }

    #[test]
    fn jpeg_has_soi_marker_and_base64_decodes() {
        let mut frame = FrameBuffer::new(16, 8);
        frame.pixels.fill(0x00_ED_95_64);
        let jpeg = encode_jpeg(&frame, 80).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let text = encode_frame_base64(&frame, 80).unwrap();
        let decoded = STANDARD.decode(text).unwrap();
        let img = image::load_from_memory(&decoded).unwrap();
        assert_eq!((img.width(), img.height()), (16, 8));
    }

    #[test]
    fn publish_without_viewers_is_fine() {
        let publisher = Publisher::new();
        assert_eq!(publisher.publish(ViewerMessage::HandData(PointerUpdate::none())), 0);
    }

    #[test]
    fn late_subscriber_sees_only_new_messages() {
        let publisher = Publisher::new();
        let mut early = publisher.subscribe();
        publisher.publish(ViewerMessage::VideoFeed("first".into()));
        let mut late = publisher.subscribe();
        publisher.publish(ViewerMessage::VideoFeed("second".into()));

        assert_eq!(early.try_recv().unwrap(), ViewerMessage::VideoFeed("first".into()));
        assert_eq!(early.try_recv().unwrap(), ViewerMessage::VideoFeed("second".into()));
        assert_eq!(late.try_recv().unwrap(), ViewerMessage::VideoFeed("second".into()));
        assert!(late.try_recv().is_err());
        assert_eq!(publisher.viewer_count(), 2);
    }
}
