// Hand-gesture drawing from a webcam.
// Pointing draws, an open palm erases, a fist rests. The same classifier backs
// two front ends: a local window that keeps a persistent ink layer on top of the
// live video, and a small server that streams the pointer and video to browsers.

pub mod camera;
pub mod canvas;
pub mod capture;
pub mod config;
pub mod draw;
pub mod error;
pub mod estimator;
pub mod gesture;
pub mod landmarks;
pub mod logging;
pub mod server;
pub mod transport;
pub mod types;

pub use error::{Error, Result};
pub use gesture::Gesture;
pub use landmarks::{HandSkeleton, Landmark};
pub use types::FrameBuffer;
