use crate::app::{App, Mode};
use docsmith_engine::render::{Escaped, Token, tokenize};
use docsmith_engine::{Document, SaveStatus, Template};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2)].as_ref())
        .split(f.area());

    match app.mode {
        Mode::Picker => draw_picker(f, app, rows[0]),
        _ => draw_editor(f, app, rows[0]),
    }
    draw_status(f, app, rows[1]);

    match app.mode.clone() {
        Mode::Versions => draw_versions(f, app),
        Mode::ConfirmRestore(version_id) => draw_confirm(f, app, &version_id),
        Mode::ImagePath(path) => draw_prompt(f, "Insert image (path)", &path),
        _ => {}
    }
}

fn draw_picker(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
        .split(area);

    let items: Vec<ListItem> = app
        .templates
        .iter()
        .map(|t| ListItem::new(Line::from(t.name.clone())))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Templates"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_stateful_widget(list, chunks[0], &mut app.picker_state);

    let details = app
        .picker_state
        .selected()
        .and_then(|i| app.templates.get(i))
        .map(template_details)
        .unwrap_or_default();
    let details = Paragraph::new(details)
        .block(Block::default().borders(Borders::ALL).title("Sections"))
        .wrap(Wrap { trim: true });
    f.render_widget(details, chunks[1]);
}

fn template_details(template: &Template) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(template.description.clone()), Line::default()];
    lines.extend(template.sections.iter().map(|s| {
        let marker = if s.required { " *" } else { "" };
        Line::from(format!("• {}{marker}", s.label))
    }));
    lines
}

fn draw_editor(f: &mut Frame, app: &App, area: Rect) {
    let (Some(template), Some(document)) = (app.editor.template(), app.editor.document()) else {
        return;
    };
    let active_id = app.editor.active_section().map(|s| s.id.as_str());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)].as_ref())
        .split(area);

    let items: Vec<ListItem> = template
        .sections
        .iter()
        .map(|s| {
            let mut spans = vec![Span::raw(s.label.clone())];
            if s.required && document.value(&s.id).trim().is_empty() {
                spans.push(Span::styled(" *", Style::default().fg(Color::Red)));
            }
            if app.editor.is_generating(&s.id) {
                spans.push(Span::styled(" …", Style::default().fg(Color::Cyan)));
            }
            let style = if Some(s.id.as_str()) == active_id {
                Style::default().bg(Color::Yellow).fg(Color::Black)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();
    let sections = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(template.name.clone()),
    );
    f.render_widget(sections, columns[0]);

    let panes = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(columns[1]);

    let Some(section) = app.editor.active_section() else {
        return;
    };
    let text = document.value(&section.id);

    let mut source: Vec<Line> = text.split('\n').map(|l| Line::from(l.to_string())).collect();
    if let Some(failure) = app
        .editor
        .generation_failure()
        .filter(|f| f.section_id == section.id)
    {
        source.push(Line::default());
        source.push(Line::styled(
            format!("{}", failure.error),
            Style::default().fg(Color::Red),
        ));
    }
    let editor = Paragraph::new(source)
        .block(Block::default().borders(Borders::ALL).title(section.label.clone()))
        .wrap(Wrap { trim: false });
    f.render_widget(editor, panes[0]);

    let preview = Paragraph::new(preview_lines(text, document))
        .block(Block::default().borders(Borders::ALL).title("Preview"))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, panes[1]);
}

fn plain(escaped: &Escaped) -> String {
    html_escape::decode_html_entities(escaped.as_str()).into_owned()
}

/// Style the rendering tokens of `text` for the terminal.
fn preview_lines(text: &str, document: &Document) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let math = Style::default().fg(Color::Magenta);

    for token in tokenize(text, document.attachments()) {
        match token {
            Token::Text(escaped) => {
                let plain = plain(&escaped);
                let mut parts = plain.split('\n');
                if let Some(first) = parts.next() {
                    current.push(Span::raw(first.to_string()));
                }
                for part in parts {
                    lines.push(Line::from(std::mem::take(&mut current)));
                    current.push(Span::raw(part.to_string()));
                }
            }
            Token::Image { alt, .. } => current.push(Span::styled(
                format!("[image: {}]", plain(&alt)),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Token::BrokenImage { alt, .. } => current.push(Span::styled(
                format!("[image not found: {}]", plain(&alt)),
                Style::default().fg(Color::Red),
            )),
            Token::MathInline(source) => {
                current.push(Span::styled(format!("${}$", plain(&source)), math))
            }
            Token::MathBlock(source) => {
                lines.push(Line::from(std::mem::take(&mut current)));
                lines.push(Line::from(Span::styled(
                    format!("$${}$$", plain(&source)),
                    math.add_modifier(Modifier::ITALIC),
                )));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

fn draw_status(f: &mut Frame, app: &App, area: Rect) {
    let status = match app.editor.status() {
        None => Span::raw(""),
        Some(SaveStatus::Clean) => Span::styled("Saved", Style::default().fg(Color::Green)),
        Some(SaveStatus::Dirty) => Span::styled("Unsaved", Style::default().fg(Color::Red)),
        Some(SaveStatus::Pending) => Span::styled("Saving…", Style::default().fg(Color::Yellow)),
    };
    let help = match app.mode {
        Mode::Picker => "↑/↓: Select | Enter: Open | q: Quit",
        _ => {
            "Tab: Section | ^S: Version | ^V: Versions | ^O: Image | ^G: Generate | \
             ^E: Export | ^P: Preview | Esc: Close | ^Q: Quit"
        }
    };

    let mut first = vec![status];
    if let Some(message) = &app.message {
        first.push(Span::raw(format!("  {message}")));
    }
    let status = Paragraph::new(vec![Line::from(first), Line::from(help)]);
    f.render_widget(status, area);
}

fn centered(area: Rect, width_percent: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_percent) / 100) as u16;
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height: height.min(area.height),
    }
}

fn draw_versions(f: &mut Frame, app: &mut App) {
    let area = centered(f.area(), 60, 16);
    let items: Vec<ListItem> = app
        .editor
        .versions()
        .map(|v| ListItem::new(Line::from(v.display_name())))
        .collect();
    let title = if items.is_empty() {
        "Versions (none saved)"
    } else {
        "Versions (Enter: restore, Esc: back)"
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_widget(Clear, area);
    f.render_stateful_widget(list, area, &mut app.version_state);
}

fn draw_confirm(f: &mut Frame, app: &App, version_id: &str) {
    let name = app
        .editor
        .versions()
        .find(|v| v.id == version_id)
        .map(|v| v.display_name())
        .unwrap_or_default();
    draw_prompt(
        f,
        "Restore version",
        &format!("Replace current content with \"{name}\"? (y/n)"),
    );
}

fn draw_prompt(f: &mut Frame, title: &str, text: &str) {
    let area = centered(f.area(), 60, 3);
    let prompt = Paragraph::new(text.to_string())
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(Clear, area);
    f.render_widget(prompt, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_of(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn preview_shows_plain_text_and_markers() {
        let mut doc = Document::new("t", 0);
        let id = doc.insert_attachment("data:x", 1);
        let text = format!("a < b\n![fig](attachment:{id}) $x$\n$$y$$ tail");

        let lines = preview_lines(&text, &doc);
        assert_eq!(
            text_of(&lines),
            vec!["a < b", "[image: fig] $x$", "", "$$y$$", " tail"]
        );
    }

    #[test]
    fn preview_marks_missing_images() {
        let doc = Document::new("t", 0);
        let lines = preview_lines("![gone](attachment:img_0)", &doc);
        assert_eq!(text_of(&lines), vec!["[image not found: gone]"]);
    }
}
