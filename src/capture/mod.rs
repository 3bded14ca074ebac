//! Device access and live capture streams
//!
//! Capture devices are reached through the [`DeviceAccess`] trait so the
//! rest of the application never touches platform APIs directly. The
//! [`CaptureGate`] wraps a provider and tracks the permission flag and the
//! live stream handle for one recorder panel.

mod camera;
mod mic;
mod synthetic;

pub use camera::{CameraFrame, CameraStream};
pub(crate) use camera::FrameTap;
pub use mic::MicStream;
pub(crate) use mic::PcmTap;
pub use synthetic::{SyntheticDeviceAccess, SyntheticStream};

use crate::Result;
use std::sync::Arc;
use tracing::{debug, info};

/// The medium a stream, session, or clip carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// MIME type used to tag finished clips
    pub fn mime(&self) -> &'static str {
        match self {
            MediaKind::Audio => "audio/mp3",
            MediaKind::Video => "video/webm",
        }
    }

    /// File extension for clips of this kind
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Audio => "mp3",
            MediaKind::Video => "webm",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Audio => write!(f, "audio"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// Which tracks a stream request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl MediaConstraints {
    /// Microphone only
    pub fn audio_only() -> Self {
        Self {
            audio: true,
            video: false,
        }
    }

    /// Camera only
    pub fn video_only() -> Self {
        Self {
            audio: false,
            video: true,
        }
    }

    /// The kind of stream these constraints resolve to
    pub fn kind(&self) -> MediaKind {
        if self.video {
            MediaKind::Video
        } else {
            MediaKind::Audio
        }
    }
}

/// Provider of live capture streams
///
/// Implemented by [`NativeDeviceAccess`] for real hardware and by
/// [`SyntheticDeviceAccess`] for tests and hardware-free runs. Opening the
/// device is the permission grant; failures surface as
/// [`RecitalError::DeviceAccess`].
pub trait DeviceAccess {
    fn request_stream(&self, constraints: MediaConstraints) -> Result<MediaStream>;
}

/// A live input stream, exclusively owned by the panel that requested it
///
/// The underlying capture (cpal stream or camera thread) stays active for
/// the lifetime of this handle and is torn down on drop.
pub struct MediaStream {
    source: StreamSource,
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("kind", &self.kind())
            .field("device_label", &self.device_label())
            .finish()
    }
}

pub(crate) enum StreamSource {
    Microphone(MicStream),
    Camera(CameraStream),
    Synthetic(SyntheticStream),
}

impl MediaStream {
    pub(crate) fn new(source: StreamSource) -> Self {
        Self { source }
    }

    pub fn kind(&self) -> MediaKind {
        match &self.source {
            StreamSource::Microphone(_) => MediaKind::Audio,
            StreamSource::Camera(_) => MediaKind::Video,
            StreamSource::Synthetic(s) => s.kind(),
        }
    }

    /// Human-readable device label for the UI
    pub fn device_label(&self) -> &str {
        match &self.source {
            StreamSource::Microphone(mic) => mic.device_name(),
            StreamSource::Camera(cam) => cam.device_name(),
            StreamSource::Synthetic(_) => "synthetic device",
        }
    }

    pub fn as_microphone(&self) -> Option<&MicStream> {
        match &self.source {
            StreamSource::Microphone(mic) => Some(mic),
            _ => None,
        }
    }

    pub fn as_camera(&self) -> Option<&CameraStream> {
        match &self.source {
            StreamSource::Camera(cam) => Some(cam),
            _ => None,
        }
    }
}

/// Real hardware provider: cpal for microphones, nokhwa for cameras
pub struct NativeDeviceAccess;

impl NativeDeviceAccess {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NativeDeviceAccess {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceAccess for NativeDeviceAccess {
    fn request_stream(&self, constraints: MediaConstraints) -> Result<MediaStream> {
        match constraints.kind() {
            MediaKind::Audio => {
                let mic = MicStream::open()?;
                Ok(MediaStream::new(StreamSource::Microphone(mic)))
            }
            MediaKind::Video => {
                let cam = CameraStream::open()?;
                Ok(MediaStream::new(StreamSource::Camera(cam)))
            }
        }
    }
}

/// Permission and stream holder for one recorder panel
///
/// The permission flag starts false, turns true on the first successful
/// grant, and is never reset for the lifetime of the gate.
pub struct CaptureGate {
    provider: Arc<dyn DeviceAccess>,
    constraints: MediaConstraints,
    permission: bool,
    stream: Option<MediaStream>,
}

impl CaptureGate {
    pub fn new(provider: Arc<dyn DeviceAccess>, constraints: MediaConstraints) -> Self {
        Self {
            provider,
            constraints,
            permission: false,
            stream: None,
        }
    }

    /// Request device access and store the resulting live stream
    ///
    /// A repeat call while already granted re-requests and replaces the
    /// stream, mirroring an unguarded grant button.
    ///
    /// # Errors
    /// Returns the provider's error; the permission flag is left untouched,
    /// so a previously granted gate stays granted.
    pub fn request_access(&mut self) -> Result<()> {
        if self.permission {
            debug!("Access already granted, re-requesting {} stream", self.constraints.kind());
        }

        let stream = self.provider.request_stream(self.constraints)?;
        info!(
            "Capture access granted: {} ({})",
            self.constraints.kind(),
            stream.device_label()
        );
        self.permission = true;
        self.stream = Some(stream);
        Ok(())
    }

    pub fn permission(&self) -> bool {
        self.permission
    }

    pub fn stream(&self) -> Option<&MediaStream> {
        self.stream.as_ref()
    }

    pub fn kind(&self) -> MediaKind {
        self.constraints.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecitalError;

    #[test]
    fn test_constraints_resolve_kind() {
        assert_eq!(MediaConstraints::audio_only().kind(), MediaKind::Audio);
        assert_eq!(MediaConstraints::video_only().kind(), MediaKind::Video);
    }

    #[test]
    fn test_mime_tags() {
        assert_eq!(MediaKind::Audio.mime(), "audio/mp3");
        assert_eq!(MediaKind::Video.mime(), "video/webm");
        assert_eq!(MediaKind::Audio.extension(), "mp3");
        assert_eq!(MediaKind::Video.extension(), "webm");
    }

    #[test]
    fn test_gate_starts_without_permission() {
        let provider = Arc::new(SyntheticDeviceAccess::granting());
        let gate = CaptureGate::new(provider, MediaConstraints::audio_only());
        assert!(!gate.permission());
        assert!(gate.stream().is_none());
    }

    #[test]
    fn test_gate_grant_sets_permission_and_stream() {
        let provider = Arc::new(SyntheticDeviceAccess::granting());
        let mut gate = CaptureGate::new(provider, MediaConstraints::audio_only());

        gate.request_access().expect("grant should succeed");
        assert!(gate.permission());
        assert_eq!(gate.stream().unwrap().kind(), MediaKind::Audio);
    }

    #[test]
    fn test_gate_denial_leaves_permission_false() {
        let provider = Arc::new(SyntheticDeviceAccess::denying("no device"));
        let mut gate = CaptureGate::new(provider, MediaConstraints::video_only());

        let err = gate.request_access().unwrap_err();
        assert!(matches!(err, RecitalError::DeviceAccess(_)));
        assert!(!gate.permission());
        assert!(gate.stream().is_none());
    }

    #[test]
    fn test_gate_regrant_replaces_stream() {
        let provider = Arc::new(SyntheticDeviceAccess::granting());
        let mut gate = CaptureGate::new(provider.clone(), MediaConstraints::audio_only());

        gate.request_access().unwrap();
        gate.request_access().unwrap();
        assert_eq!(provider.request_count(), 2);
        assert!(gate.permission());
    }
}
