//! Login form.
//!
//! Collects a username/password pair and verifies it against the server with
//! a cheap authenticated request before handing it to the session gate -
//! storing a credential is local-only, so the check has to happen here.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::auth::encode_basic;
use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::query::{Query, QueryState};
use crate::ui::components::{InputResult, TextInput};
use crate::ui::view::{View, ViewAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
  Username,
  Password,
}

pub struct LoginView {
  config: Config,
  username: TextInput,
  password: TextInput,
  focus: Field,
  /// Credential verification in flight
  verify: Option<Query<()>>,
  /// The pair being verified, promoted into the session on success
  pending: Option<(String, String)>,
  error: Option<String>,
  notice: Option<String>,
}

impl LoginView {
  pub fn new(config: Config, notice: Option<String>) -> Self {
    Self {
      config,
      username: TextInput::new(),
      password: TextInput::masked(),
      focus: Field::Username,
      verify: None,
      pending: None,
      error: None,
      notice,
    }
  }

  fn submit(&mut self) {
    if self.verify.is_some() {
      return;
    }

    let username = self.username.value().trim().to_string();
    let password = self.password.value().to_string();
    if username.is_empty() || password.is_empty() {
      self.error = Some("Enter a username and password".to_string());
      return;
    }

    let client = match CatalogClient::new(
      &self.config,
      Some(encode_basic(&username, &password)),
    ) {
      Ok(client) => client,
      Err(e) => {
        self.error = Some(e.to_string());
        return;
      }
    };

    // Any admin-gated endpoint works as a probe; stats is the cheapest.
    let mut verify = Query::new(move || {
      let client = client.clone();
      async move { client.user_stats().await.map(|_| ()) }
    });
    verify.fetch();

    self.error = None;
    self.pending = Some((username, password));
    self.verify = Some(verify);
  }

  fn verifying(&self) -> bool {
    self.verify.is_some()
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if self.verifying() {
      // Only allow bailing out while the probe runs
      if key.code == KeyCode::Esc {
        self.verify = None;
        self.pending = None;
      }
      return ViewAction::None;
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.focus = match self.focus {
          Field::Username => Field::Password,
          Field::Password => Field::Username,
        };
        return ViewAction::None;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus = match self.focus {
          Field::Username => Field::Password,
          Field::Password => Field::Username,
        };
        return ViewAction::None;
      }
      _ => {}
    }

    let input = match self.focus {
      Field::Username => &mut self.username,
      Field::Password => &mut self.password,
    };

    match input.handle_key(key) {
      InputResult::Submitted(_) => {
        match self.focus {
          // Enter on the username row just moves on
          Field::Username => self.focus = Field::Password,
          Field::Password => self.submit(),
        }
        ViewAction::None
      }
      InputResult::Cancelled => ViewAction::Quit,
      _ => ViewAction::None,
    }
  }

  fn tick(&mut self) -> ViewAction {
    if let Some(mut verify) = self.verify.take() {
      if verify.poll() {
        match verify.state() {
          QueryState::Success(()) => {
            if let Some((username, password)) = self.pending.take() {
              return ViewAction::SignedIn { username, password };
            }
          }
          QueryState::Error(e) => {
            self.error = Some(if e.unauthorized {
              "Invalid username or password".to_string()
            } else {
              e.message.clone()
            });
            self.pending = None;
          }
          _ => {}
        }
      } else {
        self.verify = Some(verify);
      }
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let width = 44.min(area.width);
    let height = 9.min(area.height);
    let form = Rect::new(
      area.x + (area.width.saturating_sub(width)) / 2,
      area.y + (area.height.saturating_sub(height)) / 2,
      width,
      height,
    );

    let block = Block::default()
      .title(" Sign in ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(form);
    frame.render_widget(block, form);

    let field_style = |focused: bool| {
      if focused {
        Style::default().fg(Color::Yellow)
      } else {
        Style::default().fg(Color::White)
      }
    };

    let mut lines = vec![
      Line::from(vec![
        Span::styled("Username: ", field_style(self.focus == Field::Username)),
        Span::raw(self.username.display_value()),
        Span::raw(if self.focus == Field::Username { "_" } else { "" }),
      ]),
      Line::from(""),
      Line::from(vec![
        Span::styled("Password: ", field_style(self.focus == Field::Password)),
        Span::raw(self.password.display_value()),
        Span::raw(if self.focus == Field::Password { "_" } else { "" }),
      ]),
      Line::from(""),
    ];

    if self.verifying() {
      lines.push(Line::styled(
        "verifying\u{2026}",
        Style::default().fg(Color::DarkGray),
      ));
    } else if let Some(error) = &self.error {
      lines.push(Line::styled(
        error.clone(),
        Style::default().fg(Color::Red),
      ));
    } else if let Some(notice) = &self.notice {
      lines.push(Line::styled(
        notice.clone(),
        Style::default().fg(Color::Yellow),
      ));
    } else {
      lines.push(Line::styled(
        "Enter to sign in, Esc to quit",
        Style::default().fg(Color::DarkGray),
      ));
    }

    frame.render_widget(Paragraph::new(lines), inner);
  }

  fn title(&self) -> String {
    "Sign in".to_string()
  }

  fn capturing_input(&self) -> bool {
    true
  }
}
