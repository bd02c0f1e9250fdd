pub mod components;
pub mod view;
pub mod views;

use crate::app::{App, Mode};
use crate::auth::SessionState;
use ratatui::prelude::*;
use ratatui::widgets::{ListState, Paragraph};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  draw_header(frame, chunks[0], app);

  // Storage not read yet: neutral splash, never the login form.
  let session_unknown = matches!(app.session().state(), SessionState::Unknown);
  if session_unknown {
    draw_splash(frame, chunks[1]);
  } else if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  if *app.mode() == Mode::Command {
    components::draw_command_overlay(
      frame,
      chunks[1],
      app.command_input(),
      &app.autocomplete_suggestions(),
      app.selected_suggestion(),
    );
  }

  draw_status_bar(frame, chunks[2], app);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
  let mut spans = vec![
    Span::styled(
      format!(" c9s \u{00b7} {} ", app.title()),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ),
    Span::styled(
      app.breadcrumb().join(" > "),
      Style::default().fg(Color::White),
    ),
  ];

  if let Some(username) = app.session().username() {
    let tail = format!("{username} ");
    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let pad = (area.width as usize).saturating_sub(used + tail.chars().count());
    spans.push(Span::raw(" ".repeat(pad)));
    spans.push(Span::styled(tail, Style::default().fg(Color::Green)));
  }

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_splash(frame: &mut Frame, area: Rect) {
  let paragraph = Paragraph::new("restoring session\u{2026}")
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::DarkGray));
  let centered = Rect::new(
    area.x,
    area.y + area.height / 2,
    area.width,
    1.min(area.height),
  );
  frame.render_widget(paragraph, centered);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.mode() {
    Mode::Normal => {
      let hint = " :command  /search  j/k:nav  r:refresh  q:back  Ctrl-C:quit";
      (hint.to_string(), Style::default().fg(Color::DarkGray))
    }
    Mode::Command => {
      let cmd = format!(":{}", app.command_input());
      (cmd, Style::default().fg(Color::Yellow))
    }
  };

  frame.render_widget(Paragraph::new(content).style(style), area);
}

/// Keep a list selection inside the current bounds.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(i) if i < len => {}
    _ => state.select(Some(len - 1)),
  }
}

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{cut}...")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn selection_clamps_to_bounds() {
    let mut state = ListState::default();
    state.select(Some(9));
    ensure_valid_selection(&mut state, 4);
    assert_eq!(state.selected(), Some(3));

    ensure_valid_selection(&mut state, 0);
    assert_eq!(state.selected(), None);
  }
}
