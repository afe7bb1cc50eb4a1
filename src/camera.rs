// Opens the webcam and converts frames into 0x00RRGGBB buffers.
// The capture loops only see the `FrameSource` trait, so tests can feed them
// scripted frames instead of a real device.

use crate::error::Error;
use crate::types::FrameBuffer;

use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

/// Anything that hands out one frame per call.
pub trait FrameSource {
    /// Next frame. `Error::CameraFrame` means "nothing this time, try again".
    fn next_frame(&mut self) -> Result<FrameBuffer, Error>;

    /// Width and height of the frames this source produces.
    fn resolution(&self) -> (u32, u32);
}

// A small wrapper around nokhwa::Camera so the loops stay clean.
pub struct CameraCapture {
    cam: Camera,
    width: u32,
    height: u32,
}

impl CameraCapture {
    /// Open camera `index` at a target resolution (falls back to the closest one).
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        let idx = CameraIndex::Index(index);

        let fmt = CameraFormat::new(
            Resolution::new(width, height),
            FrameFormat::YUYV, // uncompressed; cheap to convert to RGB
            30,                // target FPS
        );

        // Ask for RGB frames at the format closest to our request.
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        // This fails if no device exists at `index`.
        let mut cam = Camera::new(idx, req)
            .map_err(|e| Error::CameraInit(format!("Create camera {index}: {e}")))?;

        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        // The actual stream might choose a slightly different resolution.
        let actual = cam.resolution();
        log::info!("Camera {index} streaming at {}x{}", actual.width(), actual.height());

        Ok(Self {
            cam,
            width: actual.width(),
            height: actual.height(),
        })
    }
}

impl FrameSource for CameraCapture {
    /// Grab one frame (blocks until the camera has one) and pack it as 0x00RRGGBB.
    fn next_frame(&mut self) -> Result<FrameBuffer, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;

        // ImageBuffer<Rgb<u8>, Vec<u8>>, whatever the raw format was
        let rgb_img = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let (w, h) = rgb_img.dimensions();
        FrameBuffer::from_rgb(w as usize, h as usize, rgb_img.as_raw())
            .ok_or_else(|| Error::CameraFrame(format!("Short frame for {w}x{h}")))
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            log::debug!("Stopping camera stream: {e}");
        }
    }
}
