// Networked mode: capture + classify on a background thread, stream the pointer
// and the video to every browser that opens the viewer page.
// The capture thread owns the camera and the landmark helper. It talks to the
// async side only through the broadcast publisher and a cancellation token.

use gesture_canvas::camera::{CameraCapture, FrameSource};
use gesture_canvas::capture::Tracker;
use gesture_canvas::config::{CAMERA_INDEX, Config};
use gesture_canvas::estimator::SubprocessEstimator;
use gesture_canvas::transport::Publisher;
use gesture_canvas::{Error, logging, server};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() {
    logging::init();
    if let Err(e) = run().await {
        log::error!("{e}");
        if matches!(e, Error::CameraInit(_)) {
            eprintln!("ERROR: Cannot open webcam (device {CAMERA_INDEX}).");
        }
        std::process::exit(1);
    }
}

/// Open the camera and helper on a dedicated thread, report back once they are
/// up (or failed), then run the tracker there until `stop` is cancelled.
fn spawn_capture(
    config: &Config,
    publisher: Publisher,
    stop: CancellationToken,
) -> (oneshot::Receiver<Result<(u32, u32), Error>>, JoinHandle<Result<(), Error>>) {
    let (ready_tx, ready_rx) = oneshot::channel();
    let config = config.clone();

    let handle = std::thread::spawn(move || {
        let opened = CameraCapture::new(CAMERA_INDEX, config.capture_width, config.capture_height)
            .and_then(|cam| {
                let estimator = SubprocessEstimator::spawn(&config.estimator_command)?;
                Ok((cam, estimator))
            });

        let (cam, estimator) = match opened {
            Ok(parts) => parts,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return Ok(());
            }
        };
        let _ = ready_tx.send(Ok(cam.resolution()));

        let tracker = Tracker::new(cam, estimator, publisher, config.jpeg_quality);
        let result = tracker.run(stop.clone(), Duration::from_millis(config.frame_interval_ms));
        // A dead capture loop takes the server down with it.
        stop.cancel();
        result
    });

    (ready_rx, handle)
}

async fn run() -> Result<(), Error> {
    let config = Config::load_or_default()?;
    let publisher = Publisher::new();
    let stop = CancellationToken::new();

    let (ready, capture) = spawn_capture(&config, publisher.clone(), stop.clone());
    let (w, h) = ready
        .await
        .map_err(|_| Error::CaptureThread("exited during startup".into()))??;
    log::info!("Capturing {w}x{h}, publishing every {} ms", config.frame_interval_ms);

    {
        let stop = stop.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("Ctrl-C received");
                    stop.cancel();
                }
                Err(e) => log::warn!("No Ctrl-C handler: {e}"),
            }
        });
    }

    let (listener, _) = server::bind(&config.bind_addr).await?;
    let served = server::serve(listener, publisher, stop.clone()).await;

    // Whatever ended the server also ends capture.
    stop.cancel();
    let captured = tokio::task::spawn_blocking(move || capture.join())
        .await
        .map_err(|e| Error::CaptureThread(format!("join: {e}")))?
        .unwrap_or_else(|_| Err(Error::CaptureThread("panicked".into())));

    served?;
    captured
}
