// The per-frame pipeline shared by both run modes:
// grab → mirror → estimate hands → classify → (draw | publish).
// `DrawSession` owns everything the local window needs across frames (the
// ink layer and the pen state). `Tracker` owns the camera and estimator for
// the networked mode and pushes `ViewerMessage`s to a `Publisher`.

use crate::camera::FrameSource;
use crate::canvas::Canvas;
use crate::draw::draw_hand_skeleton;
use crate::error::Error;
use crate::estimator::HandEstimator;
use crate::gesture::{self, Gesture};
use crate::landmarks::HandSkeleton;
use crate::transport::{self, PointerUpdate, Publisher, ViewerMessage};
use crate::types::FrameBuffer;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Grab one frame and mirror it. `Ok(None)` is a failed read the caller skips.
fn grab_mirrored<S: FrameSource + ?Sized>(source: &mut S) -> Result<Option<FrameBuffer>, Error> {
    match source.next_frame() {
        Ok(mut frame) => {
            frame.mirror_horizontal();
            Ok(Some(frame))
        }
        Err(e) if e.is_skippable_frame() => {
            log::trace!("Skipping frame: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Pen state carried from one frame to the next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerState {
    /// Set by pointing, cleared by a fist. Any other pose leaves it alone.
    pub drawing: bool,
    /// Fingertip pixel from the previous processed hand, only while drawing.
    pub last_position: Option<(i32, i32)>,
}

/// Local-display state: the ink layer plus the pen.
#[derive(Default)]
pub struct DrawSession {
    canvas: Option<Canvas>,
    pointer: PointerState,
    last_gesture: Gesture,
}

impl DrawSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    /// Label of the last processed hand (for the HUD).
    pub fn last_gesture(&self) -> Gesture {
        self.last_gesture
    }

    /// `None` until the first frame arrives.
    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    /// Wipe every stroke (C key).
    pub fn clear_canvas(&mut self) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.clear();
        }
        self.pointer.last_position = None;
    }

    /// Apply one hand's gesture to the pen and the canvas.
    ///
    /// Palm erases around the wrist, fist lifts the pen, pointing puts it down.
    /// While the pen is down a segment joins the previous fingertip to this one.
    pub fn apply(&mut self, gesture: Gesture, fingertip: (i32, i32), wrist: (i32, i32)) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };

        match gesture {
            Gesture::OpenPalm => canvas.erase_disk(wrist.0, wrist.1),
            Gesture::Fist => self.pointer.drawing = false,
            Gesture::Point => self.pointer.drawing = true,
            Gesture::None => {}
        }

        if self.pointer.drawing {
            if let Some(prev) = self.pointer.last_position {
                canvas.stroke(prev, fingertip);
            }
        }

        self.pointer.last_position = if self.pointer.drawing { Some(fingertip) } else { None };
        self.last_gesture = gesture;
    }

    /// Everything that happens to one (already mirrored) frame in local mode.
    /// The frame comes back with the skeleton drawn and the ink composited on top.
    pub fn process_frame(&mut self, frame: &mut FrameBuffer, hands: &[HandSkeleton]) -> Result<(), Error> {
        if self.canvas.is_none() {
            self.canvas = Some(Canvas::new(frame.width, frame.height));
        }

        if hands.is_empty() {
            self.last_gesture = Gesture::None;
        }

        for hand in hands {
            let fingertip = hand.index_tip().to_pixel(frame.width, frame.height);
            let wrist = hand.wrist().to_pixel(frame.width, frame.height);
            self.apply(gesture::classify(hand), fingertip, wrist);
            draw_hand_skeleton(frame, hand);
        }

        match &self.canvas {
            Some(canvas) => canvas.composite_onto(frame),
            None => Ok(()),
        }
    }

    /// One full local cycle. `Ok(None)` means the camera had nothing this time.
    pub fn step<S, E>(&mut self, source: &mut S, estimator: &mut E) -> Result<Option<FrameBuffer>, Error>
    where
        S: FrameSource + ?Sized,
        E: HandEstimator + ?Sized,
    {
        let Some(mut frame) = grab_mirrored(source)? else {
            return Ok(None);
        };
        let hands = estimator.estimate(&frame)?;
        self.process_frame(&mut frame, &hands)?;
        Ok(Some(frame))
    }
}

/// Networked capture loop: owns the camera and estimator, publishes to viewers.
pub struct Tracker<S, E> {
    source: S,
    estimator: E,
    publisher: Publisher,
    jpeg_quality: u8,
}

impl<S: FrameSource, E: HandEstimator> Tracker<S, E> {
    pub fn new(source: S, estimator: E, publisher: Publisher, jpeg_quality: u8) -> Self {
        Self { source, estimator, publisher, jpeg_quality }
    }

    /// One iteration. Returns `false` when the frame read failed and nothing was sent.
    pub fn step(&mut self) -> Result<bool, Error> {
        let Some(frame) = grab_mirrored(&mut self.source)? else {
            return Ok(false);
        };

        let hands = self.estimator.estimate(&frame)?;
        let update = PointerUpdate::from_hands(&hands, frame.width, frame.height);
        self.publisher.publish(ViewerMessage::HandData(update));

        let jpeg = transport::encode_frame_base64(&frame, self.jpeg_quality)?;
        self.publisher.publish(ViewerMessage::VideoFeed(jpeg));
        Ok(true)
    }

    /// Loop until `stop` is cancelled, pausing `interval` after every sent frame.
    pub fn run(mut self, stop: CancellationToken, interval: Duration) -> Result<(), Error> {
        log::info!("Capture loop started");
        while !stop.is_cancelled() {
            if self.step()? {
                std::thread::sleep(interval);
            }
        }
        log::info!("Capture loop stopped");
        Ok(())
    }
}
