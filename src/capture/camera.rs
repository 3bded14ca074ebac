//! Webcam capture stream
//!
//! A dedicated thread owns the nokhwa camera and decodes every frame to
//! RGBA. Frames are fanned out to a bounded preview channel (rendered as an
//! egui texture) and to an optional recording tap installed by an active
//! session, mirroring the microphone path.

use crate::{RecitalError, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use nokhwa::pixel_format::RgbAFormat;
use nokhwa::utils::{ApiBackend, CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// One decoded camera frame, RGBA8, tightly packed
#[derive(Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

pub(crate) type FrameTap = Arc<Mutex<Option<Sender<CameraFrame>>>>;

/// Format details reported by the camera thread after negotiation
#[derive(Debug, Clone)]
struct NegotiatedFormat {
    device_name: String,
    width: u32,
    height: u32,
    framerate: u32,
}

/// Live webcam stream
pub struct CameraStream {
    run: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
    preview_rx: Receiver<CameraFrame>,
    tap: FrameTap,
    format: NegotiatedFormat,
}

impl CameraStream {
    /// Open the first camera and start the capture thread
    ///
    /// Blocks until the camera has negotiated a format, so a missing or
    /// busy camera fails here, at grant time, not mid-recording.
    pub(crate) fn open() -> Result<Self> {
        if nokhwa::query(ApiBackend::Auto)
            .map(|cams| cams.is_empty())
            .unwrap_or(true)
        {
            return Err(RecitalError::DeviceAccess("No camera found".into()));
        }

        let run = Arc::new(AtomicBool::new(true));
        let tap: FrameTap = Arc::new(Mutex::new(None));
        let (preview_tx, preview_rx) = bounded::<CameraFrame>(2);
        let (format_tx, format_rx) = bounded::<Result<NegotiatedFormat>>(1);

        let run_flag = Arc::clone(&run);
        let tap_in_thread = Arc::clone(&tap);

        let thread = std::thread::spawn(move || {
            capture_loop(run_flag, tap_in_thread, preview_tx, format_tx);
        });

        let format = match format_rx.recv_timeout(Duration::from_secs(10)) {
            Ok(Ok(format)) => format,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                run.store(false, Ordering::SeqCst);
                let _ = thread.join();
                return Err(RecitalError::DeviceAccess(
                    "Camera did not start in time".into(),
                ));
            }
        };

        info!(
            "Camera '{}' opened: {}x{} @ {}fps",
            format.device_name, format.width, format.height, format.framerate
        );

        Ok(Self {
            run,
            thread: Some(thread),
            preview_rx,
            tap,
            format,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.format.device_name
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.format.width, self.format.height)
    }

    pub fn framerate(&self) -> u32 {
        self.format.framerate
    }

    /// Most recent preview frame, if a new one arrived since the last call
    pub fn latest_preview(&self) -> Option<CameraFrame> {
        let mut latest = None;
        while let Ok(frame) = self.preview_rx.try_recv() {
            latest = Some(frame);
        }
        latest
    }

    pub(crate) fn tap(&self) -> FrameTap {
        Arc::clone(&self.tap)
    }
}

impl Drop for CameraStream {
    fn drop(&mut self) {
        self.run.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("Camera capture thread panicked");
            }
        }
    }
}

/// Thread body: owns the camera, decodes frames, feeds preview and tap
fn capture_loop(
    run: Arc<AtomicBool>,
    tap: FrameTap,
    preview_tx: Sender<CameraFrame>,
    format_tx: Sender<Result<NegotiatedFormat>>,
) {
    let requested = RequestedFormat::new::<RgbAFormat>(RequestedFormatType::AbsoluteHighestFrameRate);

    let mut camera = match Camera::new(CameraIndex::Index(0), requested) {
        Ok(c) => c,
        Err(e) => {
            let _ = format_tx.send(Err(RecitalError::DeviceAccess(format!(
                "Failed to open camera: {}",
                e
            ))));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = format_tx.send(Err(RecitalError::DeviceAccess(format!(
            "Failed to open camera stream: {}",
            e
        ))));
        return;
    }

    let camera_format = camera.camera_format();
    let negotiated = NegotiatedFormat {
        device_name: camera.info().human_name().to_string(),
        width: camera_format.resolution().width(),
        height: camera_format.resolution().height(),
        framerate: camera_format.frame_rate(),
    };
    let _ = format_tx.send(Ok(negotiated));

    let mut frames: u64 = 0;
    while run.load(Ordering::SeqCst) {
        // frame() blocks until the camera delivers; the camera paces the loop
        let buffer = match camera.frame() {
            Ok(b) => b,
            Err(e) => {
                error!("Camera frame error: {}", e);
                break;
            }
        };

        let image = match buffer.decode_image::<RgbAFormat>() {
            Ok(img) => img,
            Err(e) => {
                warn!("Failed to decode camera frame: {}", e);
                continue;
            }
        };

        let frame = CameraFrame {
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        };
        frames += 1;
        if frames == 1 {
            debug!(
                "First camera frame: {}x{}, {} bytes",
                frame.width,
                frame.height,
                frame.rgba.len()
            );
        }

        if let Some(session_tx) = tap.lock().as_ref() {
            if let Err(e) = session_tx.try_send(frame.clone()) {
                debug!("Recording tap not keeping up: {}", e);
            }
        }

        let _ = preview_tx.try_send(frame);
    }

    if let Err(e) = camera.stop_stream() {
        warn!("Failed to stop camera stream: {}", e);
    }
    debug!("Camera capture thread exiting after {} frames", frames);
}
