//! Spectrum analyzer over a [`SampleTap`](crate::audio::SampleTap).
//!
//! Mirrors the browser `AnalyserNode` byte spectrum: Blackman window, FFT,
//! per-bin magnitude smoothing over time, then decibels mapped linearly
//! from `[min_decibels, max_decibels]` onto `0..=255`.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::audio::{PlaybackError, SampleTap, TapGuard};
use crate::config::AnalyzerSettings;

#[cfg(test)]
mod tests;

pub struct FrequencyAnalyzer {
    settings: AnalyzerSettings,
    fft: Option<Arc<dyn Fft<f32>>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    attached: Option<TapGuard>,
}

impl FrequencyAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        let n = settings.fft_size;
        let fft = if n >= 2 && n.is_power_of_two() {
            Some(FftPlanner::new().plan_fft_forward(n))
        } else {
            log::warn!("analyzer disabled: fft_size {n} is not a power of two");
            None
        };
        Self {
            window: blackman(n),
            buffer: vec![Complex::new(0.0, 0.0); n],
            smoothed: vec![0.0; n / 2],
            fft,
            settings,
            attached: None,
        }
    }

    /// Number of values in each snapshot.
    #[cfg(test)]
    pub fn bin_count(&self) -> usize {
        self.settings.fft_size / 2
    }

    #[cfg(test)]
    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    /// Start reading from `tap`, replacing any previous attachment.
    ///
    /// A disabled analyzer accepts the call and stays detached.
    pub fn attach(&mut self, tap: Option<SampleTap>) -> Result<(), PlaybackError> {
        self.detach();
        if !self.settings.enabled {
            return Ok(());
        }
        if self.fft.is_none() {
            return Err(PlaybackError::AnalyzerAttach(format!(
                "unsupported fft size {}",
                self.settings.fft_size
            )));
        }
        let Some(tap) = tap else {
            return Err(PlaybackError::AnalyzerAttach(
                "resource exposes no sample feed".into(),
            ));
        };
        self.attached = Some(tap.activate());
        Ok(())
    }

    /// Drop the tap guard and forget smoothing history.
    pub fn detach(&mut self) {
        self.attached = None;
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }

    /// Current byte spectrum, `fft_size / 2` values in `0..=255`.
    ///
    /// `None` while detached.
    pub fn snapshot(&mut self) -> Option<Vec<u8>> {
        let guard = self.attached.as_ref()?;
        let fft = self.fft.as_ref()?;
        let n = self.settings.fft_size;

        let samples = guard.tap().latest(n);
        for ((slot, s), w) in self.buffer.iter_mut().zip(&samples).zip(&self.window) {
            *slot = Complex::new(s * w, 0.0);
        }
        fft.process(&mut self.buffer);

        let tau = self.settings.smoothing.clamp(0.0, 1.0);
        let min_db = self.settings.min_decibels;
        let range = self.settings.max_decibels - min_db;
        let scale = 1.0 / n as f32;

        let bytes = self
            .smoothed
            .iter_mut()
            .zip(&self.buffer)
            .map(|(prev, bin)| {
                let magnitude = bin.norm() * scale;
                *prev = tau * *prev + (1.0 - tau) * magnitude;
                to_byte(20.0 * prev.log10(), min_db, range)
            })
            .collect();
        Some(bytes)
    }
}

fn to_byte(db: f32, min_db: f32, range: f32) -> u8 {
    if !db.is_finite() || range <= 0.0 {
        return 0;
    }
    let scaled = (db - min_db) * 255.0 / range;
    scaled.clamp(0.0, 255.0).floor() as u8
}

// Periodic form, as used by the browser analyser.
fn blackman(n: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            A0 - A1 * (2.0 * PI * x).cos() + A2 * (4.0 * PI * x).cos()
        })
        .collect()
}
