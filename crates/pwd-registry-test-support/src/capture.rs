//! Scripted camera for exercising grant, denial and release paths.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pwd_registry_core::capture::{CaptureDevice, CaptureError, Frame, VideoStream};

#[derive(Debug, Default)]
struct Counters {
    opened: AtomicUsize,
    stopped: AtomicUsize,
    frames: AtomicUsize,
}

#[derive(Debug)]
struct Inner {
    script: Mutex<VecDeque<Result<(), CaptureError>>>,
    fallback: Result<(), CaptureError>,
    width: u32,
    height: u32,
    counters: Counters,
}

/// A capture device that answers `open` from a script, then from a fallback
/// outcome once the script runs out. Streams paint a solid frame whose colour
/// changes per snapshot.
///
/// Clones share state, so a test can keep one handle for assertions and hand
/// another to the code under test.
#[derive(Debug, Clone)]
pub struct ScriptedCaptureDevice {
    inner: Arc<Inner>,
}

impl ScriptedCaptureDevice {
    fn with_script(
        script: Vec<Result<(), CaptureError>>,
        fallback: Result<(), CaptureError>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                script: Mutex::new(script.into()),
                fallback,
                width,
                height,
                counters: Counters::default(),
            }),
        }
    }

    /// A camera that always grants access and streams `width`x`height`
    /// frames.
    #[must_use]
    pub fn granting(width: u32, height: u32) -> Self {
        Self::with_script(Vec::new(), Ok(()), width, height)
    }

    /// A camera whose permission prompt is always refused.
    #[must_use]
    pub fn denying(reason: &str) -> Self {
        Self::with_script(
            Vec::new(),
            Err(CaptureError::DeviceDenied(reason.to_owned())),
            1,
            1,
        )
    }

    /// A camera that refuses the first request and grants every later one.
    #[must_use]
    pub fn denying_then_granting(width: u32, height: u32) -> Self {
        Self::with_script(
            vec![Err(CaptureError::DeviceDenied(
                "Permission denied".to_owned(),
            ))],
            Ok(()),
            width,
            height,
        )
    }

    /// Number of successful `open` calls.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.inner.counters.opened.load(Ordering::SeqCst)
    }

    /// Number of streams stopped.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.inner.counters.stopped.load(Ordering::SeqCst)
    }

    /// Streams opened and not yet stopped.
    #[must_use]
    pub fn live_streams(&self) -> usize {
        self.open_count() - self.stop_count()
    }
}

#[async_trait]
impl CaptureDevice for ScriptedCaptureDevice {
    async fn open(&self) -> Result<Box<dyn VideoStream>, CaptureError> {
        let outcome = self
            .inner
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.inner.fallback.clone());
        outcome?;
        self.inner.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream {
            device: Arc::clone(&self.inner),
            stopped: false,
        }))
    }
}

struct ScriptedStream {
    device: Arc<Inner>,
    stopped: bool,
}

impl VideoStream for ScriptedStream {
    fn current_frame(&mut self) -> Result<Frame, CaptureError> {
        if self.stopped {
            return Err(CaptureError::DeviceUnavailable("stream stopped".to_owned()));
        }
        let shot = self.device.counters.frames.fetch_add(1, Ordering::SeqCst);
        #[allow(clippy::cast_possible_truncation)]
        let shade = (shot % 256) as u8;
        let pixels = (self.device.width * self.device.height) as usize;
        Frame::new(
            self.device.width,
            self.device.height,
            [shade, 128, 255 - shade, 255].repeat(pixels),
        )
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.device.counters.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }
}
