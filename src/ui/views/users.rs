//! User management view.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::sync::Arc;

use crate::cache::{CacheResult, ResourceKey};
use crate::catalog::types::User;
use crate::catalog::{ApiError, CachedCatalogClient, ListParams};
use crate::query::{Query, QueryState};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::view::{View, ViewAction};
use crate::ui::{ensure_valid_selection, truncate};

type UserCollection = CacheResult<Arc<Vec<User>>>;

pub struct UserListView {
  client: CachedCatalogClient,
  query: Query<UserCollection>,
  /// Mutation in flight; resolves to a status line
  action: Option<Query<String>>,
  status: Option<String>,
  list_state: ListState,
  search: SearchInput,
  filter: Option<String>,
}

impl UserListView {
  pub fn new(client: CachedCatalogClient) -> Self {
    let mut query = Self::collection_query(&client, None, false);
    query.fetch();
    Self {
      client,
      query,
      action: None,
      status: None,
      list_state: ListState::default(),
      search: SearchInput::new(),
      filter: None,
    }
  }

  fn collection_query(
    client: &CachedCatalogClient,
    filter: Option<String>,
    force_refresh: bool,
  ) -> Query<UserCollection> {
    let client = client.clone();
    Query::new(move || {
      let client = client.clone();
      let params = match &filter {
        Some(term) => ListParams::search(term.clone()),
        None => ListParams::default(),
      };
      async move { client.fetch_users(&params, force_refresh).await }
    })
  }

  fn reload(&mut self, force_refresh: bool) {
    self.query = Self::collection_query(&self.client, self.filter.clone(), force_refresh);
    self.query.fetch();
  }

  fn users(&self) -> &[User] {
    self
      .query
      .data()
      .map(|result| result.data.as_slice())
      .unwrap_or(&[])
  }

  fn selected_user(&self) -> Option<&User> {
    self.list_state.selected().and_then(|i| self.users().get(i))
  }

  fn start_action<F, Fut>(&mut self, run: F)
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<String, ApiError>> + Send + 'static,
  {
    if self.action.is_some() {
      return;
    }
    let mut action = Query::new(run);
    action.fetch();
    self.action = Some(action);
  }

  fn activate_selected(&mut self, active: bool) {
    let Some(user) = self.selected_user() else { return };
    let id = user.id;
    let username = user.username.clone();
    let client = self.client.clone();
    self.start_action(move || {
      let client = client.clone();
      let username = username.clone();
      async move {
        if active {
          client.inner().activate_user(id).await?;
        } else {
          client.inner().deactivate_user(id).await?;
        }
        // The cache cannot see writes; clear the entry so the next read
        // refetches.
        client.invalidate(&[ResourceKey::Users]);
        Ok(format!(
          "{} {}",
          if active { "activated" } else { "deactivated" },
          username
        ))
      }
    });
  }

  fn delete_selected(&mut self) {
    let Some(user) = self.selected_user() else { return };
    let id = user.id;
    let username = user.username.clone();
    let client = self.client.clone();
    self.start_action(move || {
      let client = client.clone();
      let username = username.clone();
      async move {
        client.inner().delete_user(id).await?;
        client.invalidate(&[ResourceKey::Users]);
        Ok(format!("deleted {username}"))
      }
    });
  }
}

impl View for UserListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Handled => return ViewAction::None,
      KeyResult::Event(SearchEvent::Submitted) => {
        let term = self.search.query().trim().to_string();
        self.filter = (!term.is_empty()).then_some(term);
        // One cache slot per resource: a changed search term has to force a
        // network fetch or it would be answered by the unfiltered entry.
        self.reload(true);
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Cancelled) => {
        if self.filter.take().is_some() {
          self.reload(true);
        }
        return ViewAction::None;
      }
      KeyResult::Event(SearchEvent::Changed(_)) => return ViewAction::None,
      KeyResult::NotHandled => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.reload(true),
      KeyCode::Char('a') => self.activate_selected(true),
      KeyCode::Char('x') => self.activate_selected(false),
      KeyCode::Char('D') => self.delete_selected(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn tick(&mut self) -> ViewAction {
    self.query.poll();
    if self.query.is_unauthorized() {
      return ViewAction::SessionExpired;
    }

    if let Some(mut action) = self.action.take() {
      if action.poll() {
        match action.state() {
          QueryState::Success(message) => {
            self.status = Some(message.clone());
            // Entry was invalidated by the action; a plain fetch refetches.
            self.reload(false);
          }
          QueryState::Error(e) => {
            if e.unauthorized {
              return ViewAction::SessionExpired;
            }
            self.status = Some(e.message.clone());
          }
          _ => {}
        }
      } else {
        self.action = Some(action);
      }
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.users().len();
    ensure_valid_selection(&mut self.list_state, len);

    let loading = self.query.is_loading() || self.client.is_loading(ResourceKey::Users);
    let mut title = match &self.filter {
      Some(term) => format!(" Users /{term} ({len})"),
      None => format!(" Users ({len})"),
    };
    if loading {
      title.push_str(" loading\u{2026}");
    } else if self.query.data().map(|r| r.source.is_cache()).unwrap_or(false) {
      title.push_str(" cached");
    }
    title.push(' ');

    let mut block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if let Some(status) = &self.status {
      block = block.title_bottom(
        Line::styled(format!(" {status} "), Style::default().fg(Color::Yellow))
          .right_aligned(),
      );
    }

    if len == 0 {
      let content = match self.query.error() {
        Some(e) => format!("Failed to load users: {}. Press 'r' to retry.", e.message),
        None if loading => "Loading\u{2026}".to_string(),
        None => "No users found.".to_string(),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      self.search.render_overlay(frame, area);
      return;
    }

    let items: Vec<ListItem> = self
      .users()
      .iter()
      .map(|user| {
        let verified = if user.is_verified { "\u{2713}" } else { " " };
        let role = user
          .role
          .as_ref()
          .map(|r| r.name.as_str())
          .unwrap_or("-");
        let line = Line::from(vec![
          Span::styled(
            format!("{:<18}", truncate(&user.username, 18)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::raw(format!("{:<28}", truncate(&user.email, 28))),
          Span::raw(" "),
          Span::styled(
            format!("{:<10}", truncate(role, 10)),
            Style::default().fg(Color::Magenta),
          ),
          Span::raw(" "),
          Span::styled(verified, Style::default().fg(Color::Green)),
          Span::raw(" "),
          Span::raw(truncate(&user.company_name, 24)),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
    self.search.render_overlay(frame, area);
  }

  fn title(&self) -> String {
    match &self.filter {
      Some(term) => format!("Users /{term}"),
      None => "Users".to_string(),
    }
  }

  fn capturing_input(&self) -> bool {
    self.search.is_active()
  }
}
