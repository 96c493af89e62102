pub mod reflection;
pub mod theme;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::particles::ParticleField;
use crate::session::Session;
use crate::ui::reflection::ReflectionPanel;
use crate::ui::theme::{palette, Palette};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const LEAF: &str = "🌿";

/// How a passage character is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Untyped,
    Cursor,
}

pub fn char_state(session: &Session, idx: usize) -> CharState {
    if idx < session.cursor() {
        if session.typed().get(idx) == session.text().get(idx) {
            CharState::Correct
        } else {
            CharState::Incorrect
        }
    } else if idx == session.cursor() {
        CharState::Cursor
    } else {
        CharState::Untyped
    }
}

fn passage_spans(session: &Session, palette: Palette) -> Vec<Span<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    session
        .text()
        .iter()
        .enumerate()
        .map(|(idx, &c)| match char_state(session, idx) {
            CharState::Correct => Span::styled(c.to_string(), bold.fg(palette.text)),
            CharState::Incorrect => Span::styled(
                match c {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                bold.fg(palette.error),
            ),
            CharState::Untyped => Span::styled(c.to_string(), Style::default().fg(palette.muted)),
            CharState::Cursor => Span::styled(
                c.to_string(),
                bold.fg(palette.accent)
                    .bg(palette.cursor_bg)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        })
        .collect()
}

fn toggle_label(name: &str, on: bool) -> String {
    format!("{} {}", name, if on { "on" } else { "off" })
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let session = &self.session;
        let palette = palette(self.config.theme);
        let focus = self.config.focus_mode;

        buf.set_style(area, Style::default().bg(palette.background));
        render_particles(&self.particles, palette, area, buf);

        let text: String = session.text().iter().collect();
        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let prompt_occupied_lines = if text.width() <= max_chars_per_line as usize {
            1
        } else {
            ((text.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Min(1),
                Constraint::Length(1), // stats
                Constraint::Length(1), // stat labels
                Constraint::Length(1), // padding
                Constraint::Length(1), // leaf
                Constraint::Length(prompt_occupied_lines),
                Constraint::Min(1),
                Constraint::Length(1), // hints
                Constraint::Length(1), // footer
            ])
            .split(area);

        if !focus {
            let header = Line::from(vec![
                Span::styled("Typing", Style::default().fg(palette.muted)),
                Span::styled(
                    "Zen",
                    Style::default()
                        .fg(palette.accent)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("Garden", Style::default().fg(palette.muted)),
                Span::raw("   "),
                Span::styled(
                    format!(
                        "{} · {} · {} · {}",
                        toggle_label("sound", self.config.sound_enabled),
                        toggle_label("focus", focus),
                        toggle_label("reflect", self.config.reflection_enabled),
                        self.config.theme
                    ),
                    Style::default()
                        .fg(palette.muted)
                        .add_modifier(Modifier::ITALIC),
                ),
            ]);
            Paragraph::new(header)
                .alignment(Alignment::Center)
                .render(chunks[0], buf);

            let stat_columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                    Constraint::Ratio(1, 3),
                ]);
            let values = stat_columns.split(chunks[2]);
            let labels = stat_columns.split(chunks[3]);

            let value_style = Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD);
            let label_style = Style::default().fg(palette.muted);

            let stats = [
                ("WPM", session.wpm().to_string()),
                ("ACCURACY", format!("{}%", session.accuracy())),
                ("STREAK", session.streak().to_string()),
            ];
            for (i, (label, value)) in stats.into_iter().enumerate() {
                Paragraph::new(Span::styled(value, value_style))
                    .alignment(Alignment::Center)
                    .render(values[i], buf);
                Paragraph::new(Span::styled(label, label_style))
                    .alignment(Alignment::Center)
                    .render(labels[i], buf);
            }
        }

        if self.show_word_cue() {
            Paragraph::new(LEAF)
                .alignment(Alignment::Center)
                .render(chunks[5], buf);
        }

        let passage = Paragraph::new(Line::from(passage_spans(session, palette)))
            .alignment(if prompt_occupied_lines == 1 {
                // when the prompt is small enough to fit on one line
                // centering the text gives a nice zen feeling
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true });
        passage.render(chunks[6], buf);

        let italic_muted = Style::default()
            .fg(palette.muted)
            .add_modifier(Modifier::ITALIC);

        if !focus || session.is_finished() {
            let hints = if session.is_finished() {
                "finished · (esc) again · (ctrl+c) quit"
            } else {
                "(esc) reset · (ctrl+s) sound · (ctrl+f) focus · (ctrl+g) reflect · (ctrl+t) theme"
            };
            Paragraph::new(Span::styled(hints, italic_muted))
                .alignment(Alignment::Center)
                .render(chunks[8], buf);
        }

        if !focus {
            Paragraph::new(Span::styled(
                "Typing Zen Garden - Find your flow.",
                italic_muted,
            ))
            .alignment(Alignment::Center)
            .render(chunks[9], buf);
        }

        ReflectionPanel {
            reflection: &self.reflection,
            palette,
        }
        .render(area, buf);
    }
}

/// Draw the ambient particles underneath everything else
fn render_particles(field: &ParticleField, palette: Palette, area: Rect, buf: &mut Buffer) {
    for particle in &field.particles {
        if particle.x < 0.0 || particle.y < 0.0 {
            continue;
        }
        let x = particle.x as u16;
        let y = particle.y as u16;

        if x < area.width && y < area.height {
            let style = if particle.opacity > 0.5 {
                Style::default().fg(palette.particle)
            } else {
                Style::default()
                    .fg(palette.particle)
                    .add_modifier(Modifier::DIM)
            };

            if let Some(cell) = buf.cell_mut((area.x + x, area.y + y)) {
                cell.set_symbol(&particle.symbol().to_string());
                cell.set_style(style);
            }
        }
    }
}
