// Hand landmark estimation through an external helper process.
// The pose model itself is not part of this crate. `SubprocessEstimator`
// launches a helper (by default `tools/hand_landmarks.py`, which wraps
// MediaPipe Hands) and talks to it over stdin/stdout:
// 1. the helper prints `READY` once its model is loaded;
// 2. per frame we write a 12-byte header (`width`, `height`, `channels` as
//    little-endian `u32`) followed by packed RGB bytes;
// 3. the helper answers with one JSON line:
//    `{"hands": [{"landmarks": [{"x":…,"y":…,"z":…}, …21]}], "error": null}`.

use crate::error::Error;
use crate::landmarks::{HandSkeleton, LANDMARK_COUNT, Landmark};
use crate::types::FrameBuffer;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Maps one image to every hand visible in it. An empty list is "no hand".
pub trait HandEstimator {
    fn estimate(&mut self, frame: &FrameBuffer) -> Result<Vec<HandSkeleton>, Error>;
}

#[derive(Deserialize, Debug)]
struct HandJson {
    landmarks: Vec<Landmark>,
}

#[derive(Deserialize, Debug)]
struct DetectionResult {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Turn one helper reply into skeletons, dropping malformed hands.
fn parse_reply(line: &str) -> Result<Vec<HandSkeleton>, Error> {
    let result: DetectionResult = serde_json::from_str(line.trim())
        .map_err(|e| Error::Estimator(format!("bad reply {:?}: {e}", line.trim())))?;

    if let Some(error) = result.error {
        log::warn!("Landmark helper reported: {error}");
        return Ok(Vec::new());
    }

    let mut hands = Vec::with_capacity(result.hands.len());
    for hand in result.hands {
        match HandSkeleton::from_slice(&hand.landmarks) {
            Some(skeleton) => hands.push(skeleton),
            None => log::warn!(
                "Expected {LANDMARK_COUNT} landmarks, got {}",
                hand.landmarks.len()
            ),
        }
    }
    Ok(hands)
}

pub struct SubprocessEstimator {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl SubprocessEstimator {
    /// Start `command[0]` with the remaining args and wait for its `READY` line.
    pub fn spawn(command: &[String]) -> Result<Self, Error> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Estimator("empty estimator command".into()))?;

        log::info!("Starting landmark helper: {}", command.join(" "));

        let mut process = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::Estimator(format!("spawn {program}: {e}")))?;

        let (stdin, stdout) = match (process.stdin.take(), process.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, BufReader::new(stdout)),
            _ => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(Error::Estimator("helper pipes unavailable".into()));
            }
        };

        // From here on `Drop` reaps the helper on any early return.
        let mut estimator = Self { process, stdin, stdout };
        estimator.wait_ready()?;

        log::info!("Landmark helper ready");
        Ok(estimator)
    }

    fn wait_ready(&mut self) -> Result<(), Error> {
        let mut ready = String::new();
        self.stdout.read_line(&mut ready)?;
        if ready.trim() != "READY" {
            return Err(Error::Estimator(format!(
                "helper did not signal ready, got {:?}",
                ready.trim()
            )));
        }
        Ok(())
    }
}

impl HandEstimator for SubprocessEstimator {
    fn estimate(&mut self, frame: &FrameBuffer) -> Result<Vec<HandSkeleton>, Error> {
        self.stdin.write_all(&(frame.width as u32).to_le_bytes())?;
        self.stdin.write_all(&(frame.height as u32).to_le_bytes())?;
        self.stdin.write_all(&3u32.to_le_bytes())?;
        self.stdin.write_all(&frame.to_rgb_bytes())?;
        self.stdin.flush()?;

        let mut reply = String::new();
        if self.stdout.read_line(&mut reply)? == 0 {
            return Err(Error::Estimator("helper closed its output".into()));
        }
        parse_reply(&reply)
    }
}

impl Drop for SubprocessEstimator {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}
