use super::*;
use crate::audio::SampleTap;

fn sine(cycles: f32, n: usize, amplitude: f32) -> Vec<f32> {
    (0..n)
        .map(|i| amplitude * (2.0 * PI * cycles * i as f32 / n as f32).sin())
        .collect()
}

fn argmax(bins: &[u8]) -> usize {
    bins.iter()
        .enumerate()
        .max_by_key(|(_, v)| **v)
        .map(|(i, _)| i)
        .unwrap()
}

fn attached(settings: AnalyzerSettings) -> (FrequencyAnalyzer, SampleTap) {
    let mut analyzer = FrequencyAnalyzer::new(settings);
    let tap = SampleTap::new();
    analyzer.attach(Some(tap.clone())).unwrap();
    (analyzer, tap)
}

#[test]
fn default_settings_give_128_bins() {
    let analyzer = FrequencyAnalyzer::new(AnalyzerSettings::default());
    assert_eq!(analyzer.bin_count(), 128);
}

#[test]
fn sine_peaks_at_its_bin() {
    let (mut analyzer, tap) = attached(AnalyzerSettings::default());
    for s in sine(8.0, 256, 0.5) {
        tap.push(s);
    }

    let bins = analyzer.snapshot().unwrap();
    assert_eq!(bins.len(), 128);
    assert_eq!(argmax(&bins), 8);
    assert!(bins[8] > bins[7]);
    assert!(bins[60] < 10);
}

#[test]
fn smoothing_accumulates_across_snapshots() {
    let (mut analyzer, tap) = attached(AnalyzerSettings::default());
    for s in sine(8.0, 256, 0.05) {
        tap.push(s);
    }
    let first = analyzer.snapshot().unwrap()[8];
    let second = analyzer.snapshot().unwrap()[8];
    assert!(second > first);
}

#[test]
fn silence_is_all_zero() {
    let (mut analyzer, tap) = attached(AnalyzerSettings::default());
    for _ in 0..256 {
        tap.push(0.0);
    }
    assert!(analyzer.snapshot().unwrap().iter().all(|&b| b == 0));
}

#[test]
fn detach_releases_tap() {
    let (mut analyzer, tap) = attached(AnalyzerSettings::default());
    assert!(tap.is_active());
    analyzer.detach();
    assert!(!tap.is_active());
    assert!(analyzer.snapshot().is_none());
}

#[test]
fn reattach_moves_to_new_tap() {
    let (mut analyzer, old) = attached(AnalyzerSettings::default());
    let new = SampleTap::new();
    analyzer.attach(Some(new.clone())).unwrap();
    assert!(!old.is_active());
    assert!(new.is_active());
}

#[test]
fn attach_without_tap_is_an_error() {
    let mut analyzer = FrequencyAnalyzer::new(AnalyzerSettings::default());
    let err = analyzer.attach(None).unwrap_err();
    assert!(matches!(err, PlaybackError::AnalyzerAttach(_)));
    assert!(analyzer.snapshot().is_none());
}

#[test]
fn disabled_analyzer_never_attaches() {
    let settings = AnalyzerSettings {
        enabled: false,
        ..AnalyzerSettings::default()
    };
    let mut analyzer = FrequencyAnalyzer::new(settings);
    let tap = SampleTap::new();
    assert!(analyzer.attach(Some(tap.clone())).is_ok());
    assert!(!analyzer.is_attached());
    assert!(!tap.is_active());
    assert!(analyzer.snapshot().is_none());
}

#[test]
fn invalid_fft_size_fails_to_attach() {
    let settings = AnalyzerSettings {
        fft_size: 300,
        ..AnalyzerSettings::default()
    };
    let mut analyzer = FrequencyAnalyzer::new(settings);
    assert!(analyzer.attach(Some(SampleTap::new())).is_err());
    assert!(!analyzer.is_attached());
}

#[test]
fn decibels_map_linearly_onto_bytes() {
    assert_eq!(to_byte(-100.0, -100.0, 70.0), 0);
    assert_eq!(to_byte(-30.0, -100.0, 70.0), 255);
    assert_eq!(to_byte(-65.0, -100.0, 70.0), 127);
    assert_eq!(to_byte(-10.0, -100.0, 70.0), 255);
    assert_eq!(to_byte(f32::NEG_INFINITY, -100.0, 70.0), 0);
}
