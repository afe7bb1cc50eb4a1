// One error type for the whole crate.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("Window update error: {0}")]
    WindowUpdate(String),

    /// Opening/starting the camera failed
    #[error("Camera init error: {0}")]
    CameraInit(String),

    /// Grabbing/decoding a frame failed (the capture loops skip these)
    #[error("Camera frame error: {0}")]
    CameraFrame(String),

    /// The hand landmark helper could not be started or talked to
    #[error("Landmark estimator error: {0}")]
    Estimator(String),

    /// JPEG / JSON encoding of an outgoing message failed
    #[error("Encoding error: {0}")]
    Encode(String),

    /// The networked capture thread died or could not be joined
    #[error("Capture thread error: {0}")]
    CaptureThread(String),

    /// Canvas and frame disagree on size
    #[error("Composite error: {0}")]
    Composite(String),

    /// gesture_canvas.toml exists but could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Encode(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Encode(err.to_string())
    }
}

impl Error {
    /// Per-frame failures the capture loops retry on the next iteration.
    pub fn is_skippable_frame(&self) -> bool {
        matches!(self, Error::CameraFrame(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
