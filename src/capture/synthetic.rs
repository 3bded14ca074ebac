//! Synthetic capture provider for tests and hardware-free runs

use super::{MediaConstraints, MediaKind, MediaStream, StreamSource};
use crate::{DeviceAccess, RecitalError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted device provider: grants or denies every request
///
/// Counts requests so tests can observe re-grant behavior.
pub struct SyntheticDeviceAccess {
    deny_with: Option<String>,
    requests: AtomicUsize,
}

impl SyntheticDeviceAccess {
    /// Provider that grants every request with a synthetic stream
    pub fn granting() -> Self {
        Self {
            deny_with: None,
            requests: AtomicUsize::new(0),
        }
    }

    /// Provider that denies every request with the given message
    pub fn denying(message: &str) -> Self {
        Self {
            deny_with: Some(message.to_string()),
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of requests seen so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl DeviceAccess for SyntheticDeviceAccess {
    fn request_stream(&self, constraints: MediaConstraints) -> Result<MediaStream> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        match &self.deny_with {
            Some(message) => Err(RecitalError::DeviceAccess(message.clone())),
            None => Ok(MediaStream::new(StreamSource::Synthetic(SyntheticStream {
                kind: constraints.kind(),
            }))),
        }
    }
}

/// A stream handle with no device behind it
pub struct SyntheticStream {
    kind: MediaKind,
}

impl SyntheticStream {
    pub(crate) fn kind(&self) -> MediaKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granting_provider_counts_requests() {
        let provider = SyntheticDeviceAccess::granting();
        assert_eq!(provider.request_count(), 0);

        let stream = provider
            .request_stream(MediaConstraints::video_only())
            .unwrap();
        assert_eq!(stream.kind(), MediaKind::Video);
        assert_eq!(provider.request_count(), 1);
    }

    #[test]
    fn test_denying_provider_reports_message() {
        let provider = SyntheticDeviceAccess::denying("camera unplugged");
        let err = provider
            .request_stream(MediaConstraints::video_only())
            .unwrap_err();
        assert!(err.to_string().contains("camera unplugged"));
    }
}
