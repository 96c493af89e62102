use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use crate::app::Reflection;
use crate::ui::theme::Palette;

const PANEL_WIDTH_PCT: u16 = 70;
const PANEL_HEIGHT: u16 = 14;

/// Modal overlay with the reflection on a finished passage
pub struct ReflectionPanel<'a> {
    pub reflection: &'a Reflection,
    pub palette: Palette,
}

/// Renders a reply as styled lines. Bold runs and headings take the accent,
/// emphasis is italic, list items get a bullet. Each source line stays its
/// own line and paragraphs are separated by a blank one.
pub fn markdown_lines(text: &str, palette: Palette) -> Vec<Line<'static>> {
    let body = Style::default().fg(palette.text);
    let strong = Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut styles: Vec<Style> = Vec::new();
    let mut list_depth = 0usize;

    let flush = |lines: &mut Vec<Line<'static>>, current: &mut Vec<Span<'static>>| {
        if !current.is_empty() {
            lines.push(Line::from(std::mem::take(current)));
        }
    };

    for event in Parser::new(text) {
        let style = styles.iter().fold(body, |acc, s| acc.patch(*s));
        match event {
            Event::Start(Tag::Paragraph) => {
                if list_depth == 0 && !lines.is_empty() && current.is_empty() {
                    lines.push(Line::default());
                }
            }
            Event::Start(Tag::Heading { .. }) => {
                if !lines.is_empty() {
                    lines.push(Line::default());
                }
                styles.push(strong);
            }
            Event::Start(Tag::Strong) => styles.push(strong),
            Event::Start(Tag::Emphasis) => {
                styles.push(Style::default().add_modifier(Modifier::ITALIC));
            }
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::Start(Tag::Item) => {
                flush(&mut lines, &mut current);
                current.push(Span::styled(
                    format!("{}• ", "  ".repeat(list_depth.saturating_sub(1))),
                    Style::default().fg(palette.muted),
                ));
            }
            Event::End(TagEnd::Strong) | Event::End(TagEnd::Emphasis) => {
                styles.pop();
            }
            Event::End(TagEnd::Heading(_)) => {
                styles.pop();
                flush(&mut lines, &mut current);
            }
            Event::End(TagEnd::List(_)) => list_depth = list_depth.saturating_sub(1),
            Event::End(TagEnd::Paragraph) | Event::End(TagEnd::Item) => {
                flush(&mut lines, &mut current);
            }
            Event::Text(t) | Event::Code(t) => {
                current.push(Span::styled(t.into_string(), style));
            }
            Event::SoftBreak | Event::HardBreak => flush(&mut lines, &mut current),
            _ => {}
        }
    }
    flush(&mut lines, &mut current);

    lines
}

/// Rectangle centered in `area`, `percent_x` wide and `height` rows tall
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height - height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

impl Widget for ReflectionPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = match self.reflection {
            Reflection::Hidden => return,
            Reflection::Loading => vec![Line::from(Span::styled(
                "Listening to your words...",
                Style::default()
                    .fg(self.palette.muted)
                    .add_modifier(Modifier::ITALIC),
            ))],
            Reflection::Ready(text) => markdown_lines(text, self.palette),
        };

        let panel = centered_rect(PANEL_WIDTH_PCT, PANEL_HEIGHT, area);
        Clear.render(panel, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Reflection ")
            .title_alignment(Alignment::Center)
            .border_style(Style::default().fg(self.palette.accent))
            .style(Style::default().bg(self.palette.background))
            .title_bottom(Line::from(Span::styled(
                " (esc) close ",
                Style::default().fg(self.palette.muted),
            )));

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(panel, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::ui::theme::palette;

    fn rendered(reflection: &Reflection) -> String {
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        ReflectionPanel {
            reflection,
            palette: palette(Theme::Dark),
        }
        .render(area, &mut buffer);
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn is_bold(span: &Span) -> bool {
        span.style.add_modifier.contains(Modifier::BOLD)
    }

    #[test]
    fn markdown_heading_and_paragraph() {
        let lines = markdown_lines(
            "**Tone: Reflective Calm**\nA gentle thought.",
            palette(Theme::Dark),
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].spans[0].content, "Tone: Reflective Calm");
        assert!(is_bold(&lines[0].spans[0]));
        assert_eq!(line_text(&lines[1]), "A gentle thought.");
        assert!(!is_bold(&lines[1].spans[0]));
    }

    #[test]
    fn markdown_bold_label_inside_line() {
        let lines = markdown_lines(
            "**Tone: Calm**\n**A Gentle Suggestion:** breathe slowly.",
            palette(Theme::Dark),
        );
        assert_eq!(lines.len(), 2);

        let second = &lines[1];
        assert_eq!(line_text(second), "A Gentle Suggestion: breathe slowly.");
        assert!(!line_text(second).contains("**"));
        assert_eq!(second.spans[0].content, "A Gentle Suggestion:");
        assert!(is_bold(&second.spans[0]));
        assert_eq!(second.spans[1].content, " breathe slowly.");
        assert!(!is_bold(&second.spans[1]));
    }

    #[test]
    fn markdown_paragraphs_are_spaced() {
        let lines = markdown_lines(
            "## Tone: Serene\n\nSlow down.\n\nBreathe.",
            palette(Theme::Dark),
        );
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, ["Tone: Serene", "", "Slow down.", "", "Breathe."]);
        assert!(is_bold(&lines[0].spans[0]));
    }

    #[test]
    fn markdown_emphasis_and_list() {
        let lines = markdown_lines("- one *soft* step\n- two", palette(Theme::Dark));
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, ["• one soft step", "• two"]);
        assert!(lines[0]
            .spans
            .iter()
            .any(|s| s.content == "soft" && s.style.add_modifier.contains(Modifier::ITALIC)));
    }

    #[test]
    fn hidden_panel_draws_nothing() {
        assert!(rendered(&Reflection::Hidden).trim().is_empty());
    }

    #[test]
    fn loading_panel() {
        let out = rendered(&Reflection::Loading);
        assert!(out.contains("Reflection"));
        assert!(out.contains("Listening"));
    }

    #[test]
    fn ready_panel_shows_text() {
        let out = rendered(&Reflection::Ready("**Tone: Serene**\nBreathe.".into()));
        assert!(out.contains("Tone: Serene"));
        assert!(out.contains("Breathe."));
        assert!(!out.contains("**"));
    }

    #[test]
    fn centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 20, 5);
        let rect = centered_rect(70, 14, area);
        assert!(rect.height <= 5);
        assert!(rect.width <= 20);
    }
}
