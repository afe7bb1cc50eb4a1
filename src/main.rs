// Local-display mode.
// What you SEE:
// • The mirrored camera feed with a wireframe of your hand on top.
// • Point with your index finger (other fingers curled) to draw.
// • Make a fist to lift the pen; strokes stay where they are.
// • Open your palm to erase a big disk around your wrist.
// • C clears everything. ESC quits.

use gesture_canvas::camera::{CameraCapture, FrameSource};
use gesture_canvas::capture::DrawSession;
use gesture_canvas::config::{CAMERA_INDEX, Config};
use gesture_canvas::draw::{Drawer, draw_text_5x7};
use gesture_canvas::estimator::SubprocessEstimator;
use gesture_canvas::{Error, logging};
use std::time::{Duration, Instant};

const HUD_COLOR: u32 = 0x00_FF_FF_FF;
const MODE_COLOR: u32 = 0x00_FF_CC_33;

fn main() {
    logging::init();
    if let Err(e) = run() {
        log::error!("{e}");
        if matches!(e, Error::CameraInit(_)) {
            eprintln!("ERROR: Cannot open webcam (device {CAMERA_INDEX}).");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let config = Config::load_or_default()?;

    /* --- Camera + window setup --- */
    let mut cam = CameraCapture::new(CAMERA_INDEX, config.capture_width, config.capture_height)?;
    let (w, h) = cam.resolution();
    let mut drawer = Drawer::new(&config.window_title, w as usize, h as usize)?;
    let mut estimator = SubprocessEstimator::spawn(&config.estimator_command)?;

    /* --- Ink layer + pen state, created empty, live for the whole run --- */
    let mut session = DrawSession::new();

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        if drawer.c_pressed_once() {
            session.clear_canvas();
            log::info!("Canvas cleared");
        }

        // 1) grab + mirror + estimate + classify + ink + composite
        let Some(mut screen) = session.step(&mut cam, &mut estimator)? else {
            drawer.pump(); // camera had nothing; keep the window responsive
            continue;
        };

        // 2) mode banner and key hints
        if let Some(mode) = session.last_gesture().hud_text() {
            draw_text_5x7(&mut screen, 50, 40, mode, MODE_COLOR);
        }
        let hud = format!("C: CLEAR | ESC: QUIT | {hud_fps_text}");
        draw_text_5x7(&mut screen, 8, 8, &hud, HUD_COLOR);

        // 3) present
        drawer.present(&screen)?;

        // 4) FPS counter, once per second
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            log::info!("FPS: {fps:.1}");
            hud_fps_text = format!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    Ok(())
}
