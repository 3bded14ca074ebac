//! WebM recording sessions for camera streams
//!
//! A session installs a tap on the live [`CameraStream`] and pipes raw
//! RGBA frames into an ffmpeg child process that encodes VP8 WebM to its
//! stdout. The stdout reads are the session fragments; like MP3 frames,
//! streamed WebM chunks concatenate into a playable file. ffmpeg is only
//! spawned once the first frame's dimensions are known.

use super::{RecorderEngine, RecordingSession, SessionEvent};
use crate::capture::{CameraFrame, MediaStream};
use crate::config::VideoCaptureConfig;
use crate::{RecitalError, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

/// Engine producing WebM sessions from camera streams
pub struct WebmRecorderEngine {
    config: VideoCaptureConfig,
    // Probed once at construction; absence disables the engine for good.
    encoder_available: bool,
}

impl WebmRecorderEngine {
    pub fn new(config: VideoCaptureConfig) -> Self {
        let encoder_available = Command::new("ffmpeg")
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !encoder_available {
            warn!("ffmpeg not found, video recording will be unavailable");
        }
        Self {
            config,
            encoder_available,
        }
    }
}

impl RecorderEngine for WebmRecorderEngine {
    fn open_session(&self, stream: &MediaStream) -> Result<Box<dyn RecordingSession>> {
        let cam = stream
            .as_camera()
            .ok_or_else(|| RecitalError::Session("video recorder needs a camera stream".into()))?;

        if !self.encoder_available {
            return Err(RecitalError::Unsupported(
                "Video encoding (ffmpeg not found)".into(),
            ));
        }

        let framerate = if cam.framerate() > 0 {
            cam.framerate()
        } else {
            self.config.framerate
        };

        let (event_tx, event_rx) = unbounded();
        Ok(Box::new(WebmSession {
            tap: cam.tap(),
            framerate,
            bitrate_kbps: self.config.bitrate_kbps,
            event_tx,
            event_rx,
            worker: None,
            started: false,
        }))
    }
}

struct WebmSession {
    tap: crate::capture::FrameTap,
    framerate: u32,
    bitrate_kbps: u32,
    event_tx: Sender<SessionEvent>,
    event_rx: Receiver<SessionEvent>,
    worker: Option<JoinHandle<()>>,
    started: bool,
}

impl WebmSession {
    fn release_tap(&mut self) {
        self.tap.lock().take();
    }
}

impl RecordingSession for WebmSession {
    fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(RecitalError::Session("session already started".into()));
        }
        self.started = true;

        let (frame_tx, frame_rx) = bounded::<CameraFrame>(8);
        *self.tap.lock() = Some(frame_tx);

        let event_tx = self.event_tx.clone();
        let framerate = self.framerate;
        let bitrate_kbps = self.bitrate_kbps;
        self.worker = Some(std::thread::spawn(move || {
            encode_loop(frame_rx, event_tx, framerate, bitrate_kbps);
        }));

        info!("WebM session started at {}fps", self.framerate);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if !self.started {
            return Err(RecitalError::Session("session never started".into()));
        }
        self.release_tap();
        Ok(())
    }

    fn events(&self) -> Receiver<SessionEvent> {
        self.event_rx.clone()
    }
}

impl Drop for WebmSession {
    fn drop(&mut self) {
        self.release_tap();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("WebM encoder worker panicked");
            }
        }
    }
}

/// Worker body: spawn ffmpeg on the first frame, feed it until the tap
/// closes, then wait for the encoder to drain
fn encode_loop(
    frame_rx: Receiver<CameraFrame>,
    event_tx: Sender<SessionEvent>,
    framerate: u32,
    bitrate_kbps: u32,
) {
    let mut child: Option<Child> = None;
    let mut reader: Option<JoinHandle<()>> = None;
    let mut dims: (u32, u32) = (0, 0);
    let mut frames: u64 = 0;

    while let Ok(frame) = frame_rx.recv() {
        if child.is_none() {
            dims = (frame.width, frame.height);
            match spawn_encoder(frame.width, frame.height, framerate, bitrate_kbps) {
                Ok((spawned, spawned_reader)) => {
                    child = Some(spawned);
                    reader = Some(spawn_reader(spawned_reader, event_tx.clone()));
                }
                Err(e) => {
                    error!("Failed to start video encoder: {}", e);
                    break;
                }
            }
        }

        if (frame.width, frame.height) != dims {
            warn!(
                "Camera changed resolution mid-session ({}x{} -> {}x{}), dropping frame",
                dims.0, dims.1, frame.width, frame.height
            );
            continue;
        }

        if let Some(child) = child.as_mut() {
            if let Some(stdin) = child.stdin.as_mut() {
                if let Err(e) = stdin.write_all(&frame.rgba) {
                    error!("Video encoder rejected frame: {}", e);
                    break;
                }
                frames += 1;
            }
        }
    }

    if let Some(mut child) = child {
        // EOF on stdin tells ffmpeg to finalize the container.
        drop(child.stdin.take());
        match child.wait() {
            Ok(status) if !status.success() => warn!("Video encoder exited with {}", status),
            Err(e) => warn!("Failed to wait for video encoder: {}", e),
            _ => {}
        }
    }
    if let Some(reader) = reader {
        let _ = reader.join();
    }

    debug!("WebM worker done: {} frames encoded", frames);
    let _ = event_tx.send(SessionEvent::Stopped);
}

fn spawn_encoder(
    width: u32,
    height: u32,
    framerate: u32,
    bitrate_kbps: u32,
) -> std::io::Result<(Child, std::process::ChildStdout)> {
    let mut child = Command::new("ffmpeg")
        .args([
            "-f",
            "rawvideo",
            "-pixel_format",
            "rgba",
            "-video_size",
            &format!("{}x{}", width, height),
            "-framerate",
            &framerate.to_string(),
            "-i",
            "-",
            "-c:v",
            "libvpx",
            "-b:v",
            &format!("{}k", bitrate_kbps),
            "-deadline",
            "realtime",
            "-cpu-used",
            "8",
            "-f",
            "webm",
            "pipe:1",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    info!(
        "Started ffmpeg WebM encoder: {}x{} @ {}fps, {}kbps",
        width, height, framerate, bitrate_kbps
    );

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| std::io::Error::other("encoder stdout missing"))?;
    Ok((child, stdout))
}

/// Forward encoder output to the session's event channel in chunks
fn spawn_reader(mut stdout: impl Read + Send + 'static, event_tx: Sender<SessionEvent>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            match stdout.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    let _ = event_tx.send(SessionEvent::Data(buf[..n].to_vec()));
                }
                Err(e) => {
                    error!("Failed to read encoder output: {}", e);
                    break;
                }
            }
        }
    })
}
