//! Media capture collaborator
//!
//! The session only needs to know whether a live camera/microphone stream
//! was granted and to hand it back on reset.

use crate::types::MediaError;

/// Opaque handle to a live audio/video stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamHandle(pub u64);

/// Provider of a live audio/video stream
pub trait MediaCapture: Send + Sync + std::fmt::Debug {
    fn acquire(&mut self) -> Result<StreamHandle, MediaError>;
    fn release(&mut self, handle: StreamHandle);
    /// Streams acquired and not yet released
    fn active_streams(&self) -> usize;
}

/// In-process capture that grants or denies on demand
#[derive(Debug, Default)]
pub struct SimulatedCapture {
    deny: Option<MediaError>,
    next_id: u64,
    active: Vec<StreamHandle>,
}

impl SimulatedCapture {
    /// Capture that always grants access
    pub fn granted() -> Self {
        Self::default()
    }

    /// Capture that always fails with `error`
    pub fn denied(error: MediaError) -> Self {
        Self { deny: Some(error), ..Self::default() }
    }
}

impl MediaCapture for SimulatedCapture {
    fn acquire(&mut self) -> Result<StreamHandle, MediaError> {
        if let Some(err) = &self.deny {
            return Err(err.clone());
        }
        self.next_id += 1;
        let handle = StreamHandle(self.next_id);
        self.active.push(handle);
        Ok(handle)
    }

    fn release(&mut self, handle: StreamHandle) {
        self.active.retain(|h| *h != handle);
    }

    fn active_streams(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_granted_tracks_streams() {
        let mut capture = SimulatedCapture::granted();
        let a = capture.acquire().unwrap();
        let b = capture.acquire().unwrap();
        assert_ne!(a, b);
        assert_eq!(capture.active_streams(), 2);
        capture.release(a);
        assert_eq!(capture.active_streams(), 1);
    }

    #[test]
    fn test_denied_never_grants() {
        let mut capture = SimulatedCapture::denied(MediaError::Denied("NotAllowedError".into()));
        assert_eq!(
            capture.acquire(),
            Err(MediaError::Denied("NotAllowedError".into()))
        );
        assert_eq!(capture.active_streams(), 0);
    }
}
