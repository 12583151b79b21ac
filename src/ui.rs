//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph, Sparkline, Wrap},
};

use crate::app::App;
use crate::audio::{PlaybackSession, PlaybackState};
use crate::catalog::{format_play_count, format_time};
use crate::config::{ControlsSettings, UiSettings};

/// Bar heights (fraction of full scale) shown while nothing is playing.
const PLACEHOLDER_BARS: [f32; 8] = [0.3, 0.6, 0.4, 0.8, 0.5, 0.7, 0.4, 0.6];

const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

/// Render the controls help text, incorporating seek seconds.
fn controls_text(controls: &ControlsSettings, search_mode: bool) -> String {
    if search_mode {
        return "[type] search | [backspace] delete | [enter] done | [esc] clear".to_string();
    }
    let step = (controls.volume_step * 100.0).round() as u32;
    [
        "[j/k] up/down".to_string(),
        "[enter] play/open".to_string(),
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next track".to_string(),
        format!("[H/L] seek -/+{}s", controls.seek_seconds),
        format!("[+/-] volume {step}%"),
        "[m] mute".to_string(),
        "[tab] tracks/albums".to_string(),
        "[/] search".to_string(),
        "[esc] back".to_string(),
        "[x] dismiss error".to_string(),
        "[s] stop".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// One line describing the session: state, track, time and volume.
pub fn status_text(session: &PlaybackSession) -> String {
    let mut parts: Vec<String> = vec![session.state.label().to_string()];

    if let Some(track) = &session.current_track {
        parts.push(format!("{} - {}", track.artist, track.title));
        parts.push(format!(
            "{} / {}",
            format_time(session.position_secs),
            format_time(session.total_secs)
        ));
    }

    let volume = (session.volume * 100.0).round() as u32;
    if session.muted {
        parts.push(format!("Vol: muted ({volume}%)"));
    } else {
        parts.push(format!("Vol: {volume}%"));
    }

    parts.join(" • ")
}

/// Heights for the spectrum panel, `width` columns, on a 0..=255 scale.
///
/// A live snapshot is averaged down to the panel width. Without one (not
/// playing, or no analyzer) a static placeholder pattern is repeated.
pub fn spectrum_bars(snapshot: Option<&[u8]>, width: usize) -> Vec<u64> {
    if width == 0 {
        return Vec::new();
    }
    let Some(bins) = snapshot.filter(|b| !b.is_empty()) else {
        return (0..width)
            .map(|i| (PLACEHOLDER_BARS[i % PLACEHOLDER_BARS.len()] * 255.0) as u64)
            .collect();
    };
    if bins.len() <= width {
        return bins.iter().map(|&b| u64::from(b)).collect();
    }
    (0..width)
        .map(|col| {
            let start = col * bins.len() / width;
            let end = ((col + 1) * bins.len() / width).max(start + 1);
            let group = &bins[start..end];
            group.iter().map(|&b| u64::from(b)).sum::<u64>() / group.len() as u64
        })
        .collect()
}

/// Window of `height` rows around `selected` out of `total`; returns
/// `(start, end, selected_in_window)`.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

fn list_rows(app: &App, session: &PlaybackSession) -> Vec<String> {
    if app.showing_albums() {
        return app
            .albums
            .iter()
            .map(|a| match a.release_year {
                Some(year) => format!("{} • {} ({year})", a.title, a.artist),
                None => format!("{} • {}", a.title, a.artist),
            })
            .collect();
    }

    let current = session.current_track.as_ref().map(|t| t.id);
    app.visible_tracks()
        .iter()
        .map(|t| {
            let marker = if Some(t.id) == current { "♪ " } else { "  " };
            format!(
                "{marker}{} • {} [{}] {} plays",
                t.title,
                t.artist,
                format_time(t.duration),
                format_play_count(t.play_count)
            )
        })
        .collect()
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    session: &PlaybackSession,
    spectrum: Option<&[u8]>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let banner = app.error_banner(session);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(if banner.is_some() { 3 } else { 0 }),
            Constraint::Min(1),
            Constraint::Length(if ui_settings.show_visualizer { 8 } else { 0 }),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" nebula ")
                .title_alignment(Alignment::Center)
                .title_bottom(format!(" source: {} ", app.source_label)),
        );
    frame.render_widget(header, chunks[0]);

    // Status
    let mut status = Paragraph::new(status_text(session))
        .block(Block::bordered().padding(LEFT_PAD).title(" status "))
        .wrap(Wrap { trim: true });
    if session.state == PlaybackState::Loading {
        status = status.slow_blink();
    }
    frame.render_widget(status, chunks[1]);

    // Error banner
    if let Some(message) = banner {
        let err = Paragraph::new(message)
            .style(Style::default().fg(Color::Red))
            .block(
                Block::bordered()
                    .padding(LEFT_PAD)
                    .title(" error (x dismisses) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(err, chunks[2]);
    }

    draw_list(frame, app, session, chunks[3]);

    if ui_settings.show_visualizer {
        let area = chunks[4];
        let width = area.width.saturating_sub(2) as usize;
        let bars = spectrum_bars(spectrum, width);
        let title = if spectrum.is_some() {
            " spectrum "
        } else {
            " spectrum (idle) "
        };
        let sparkline = Sparkline::default()
            .block(Block::bordered().title(title))
            .data(bars)
            .max(255)
            .style(Style::default().fg(Color::Cyan));
        frame.render_widget(sparkline, area);
    }

    // Footer
    let mut footer_text = controls_text(controls_settings, app.search_mode);
    if app.search_mode {
        footer_text = format!("/{}▏  {footer_text}", app.search.query());
    }
    let footer = Paragraph::new(footer_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}

fn draw_list(frame: &mut Frame, app: &App, session: &PlaybackSession, area: Rect) {
    let rows = list_rows(app, session);
    let total = rows.len();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, selected) = visible_window(total, height, app.selected.min(total));

    let items: Vec<ListItem> = rows[start..end]
        .iter()
        .map(|r| ListItem::new(r.as_str()))
        .collect();

    let title = if total == 0 && !app.search.is_loading() {
        format!("{}(empty) ", app.list_title())
    } else {
        app.list_title()
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Track;

    #[test]
    fn placeholder_bars_repeat_when_idle() {
        let bars = spectrum_bars(None, 10);
        assert_eq!(bars.len(), 10);
        assert_eq!(bars[0], 76);
        assert_eq!(bars[3], 204);
        assert_eq!(bars[8], bars[0]);
    }

    #[test]
    fn snapshot_is_averaged_to_width() {
        let bins: Vec<u8> = vec![0, 100, 200, 50];
        assert_eq!(spectrum_bars(Some(&bins), 2), vec![50, 125]);
        assert_eq!(spectrum_bars(Some(&bins), 8), vec![0, 100, 200, 50]);
        assert!(spectrum_bars(Some(&bins), 0).is_empty());
    }

    #[test]
    fn empty_snapshot_falls_back_to_placeholder() {
        assert_eq!(spectrum_bars(Some(&[]), 3), spectrum_bars(None, 3));
    }

    #[test]
    fn visible_window_centers_selection() {
        assert_eq!(visible_window(5, 10, 3), (0, 5, 3));
        assert_eq!(visible_window(100, 10, 50), (45, 55, 5));
        assert_eq!(visible_window(100, 10, 98), (90, 100, 8));
    }

    #[test]
    fn status_text_shows_track_time_and_mute() {
        let mut session = PlaybackSession::new(0.5);
        assert_eq!(status_text(&session), "Idle • Vol: 50%");

        session.state = PlaybackState::Playing;
        session.current_track = Some(Track {
            id: 1,
            title: "Blue Eyes".into(),
            artist: "Yo Yo Honey Singh".into(),
            album_id: Some(1),
            duration: 225.0,
            audio_url: String::new(),
            cover_url: String::new(),
            play_count: 0,
        });
        session.position_secs = 65.0;
        session.total_secs = 225.0;
        session.muted = true;

        let text = status_text(&session);
        assert!(text.contains("Yo Yo Honey Singh - Blue Eyes"));
        assert!(text.contains("1:05 / 3:45"));
        assert!(text.contains("muted"));
    }
}
