//! Read-only sample tap between the decoder and the output mixer.
//!
//! The audio thread pushes a mono down-mix into a bounded ring buffer; the
//! analyzer reads the newest window from the event loop. Samples pass through
//! unchanged.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rodio::Source;
use rodio::source::SeekError;

pub const TAP_CAPACITY: usize = 8192;

#[derive(Debug)]
struct TapShared {
    samples: Mutex<VecDeque<f32>>,
    active: AtomicBool,
}

/// Shared handle to a tap's ring buffer. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SampleTap {
    shared: Arc<TapShared>,
}

impl Default for SampleTap {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleTap {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(TapShared {
                samples: Mutex::new(VecDeque::with_capacity(TAP_CAPACITY)),
                active: AtomicBool::new(false),
            }),
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::Relaxed)
    }

    /// Start collecting samples. Collection stops when the guard is dropped.
    pub fn activate(&self) -> TapGuard {
        self.shared.active.store(true, Ordering::Relaxed);
        TapGuard { tap: self.clone() }
    }

    /// Audio-thread side. Never blocks: a contended buffer drops the sample.
    pub fn push(&self, mono: f32) {
        if !self.is_active() {
            return;
        }
        if let Ok(mut buf) = self.shared.samples.try_lock() {
            if buf.len() >= TAP_CAPACITY {
                buf.pop_front();
            }
            buf.push_back(mono);
        }
    }

    /// The newest `n` samples, oldest first, zero-padded at the front when
    /// fewer have been captured.
    pub fn latest(&self, n: usize) -> Vec<f32> {
        let buf = self
            .shared
            .samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let have = buf.len().min(n);
        let mut out = vec![0.0; n - have];
        out.extend(buf.iter().skip(buf.len() - have).copied());
        out
    }

    fn deactivate(&self) {
        self.shared.active.store(false, Ordering::Relaxed);
        let mut buf = self
            .shared
            .samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        buf.clear();
        buf.shrink_to_fit();
    }
}

/// Keeps a tap collecting; dropping it deactivates the tap and frees its buffer.
#[derive(Debug)]
pub struct TapGuard {
    tap: SampleTap,
}

impl TapGuard {
    pub fn tap(&self) -> &SampleTap {
        &self.tap
    }
}

impl Drop for TapGuard {
    fn drop(&mut self) {
        self.tap.deactivate();
    }
}

/// `Source` wrapper feeding a [`SampleTap`].
pub struct TappedSource<S> {
    inner: S,
    tap: SampleTap,
    frame_sum: f32,
    frame_pos: u16,
}

impl<S> TappedSource<S>
where
    S: Source,
{
    pub fn new(source: S) -> (Self, SampleTap) {
        let tap = SampleTap::new();
        (Self::with_tap(source, tap.clone()), tap)
    }

    /// Feed an existing tap, e.g. when a sink is rebuilt after a seek.
    pub fn with_tap(source: S, tap: SampleTap) -> Self {
        TappedSource {
            inner: source,
            tap,
            frame_sum: 0.0,
            frame_pos: 0,
        }
    }
}

impl<S> Iterator for TappedSource<S>
where
    S: Source,
{
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        let sample = self.inner.next()?;

        let channels = self.inner.channels().max(1);
        self.frame_sum += sample;
        self.frame_pos += 1;
        if self.frame_pos >= channels {
            self.tap.push(self.frame_sum / channels as f32);
            self.frame_sum = 0.0;
            self.frame_pos = 0;
        }

        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S> Source for TappedSource<S>
where
    S: Source,
{
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.frame_sum = 0.0;
        self.frame_pos = 0;
        self.inner.try_seek(pos)
    }
}
