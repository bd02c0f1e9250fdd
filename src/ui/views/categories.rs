//! Category management view.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::sync::Arc;

use crate::cache::{CacheResult, ResourceKey};
use crate::catalog::types::Category;
use crate::catalog::{ApiError, CachedCatalogClient, ListParams};
use crate::query::{Query, QueryState};
use crate::ui::components::{KeyResult, SearchEvent, SearchInput};
use crate::ui::view::{View, ViewAction};
use crate::ui::{ensure_valid_selection, truncate};

type CategoryCollection = CacheResult<Arc<Vec<Category>>>;

pub struct CategoryListView {
  client: CachedCatalogClient,
  query: Query<CategoryCollection>,
  action: Option<Query<String>>,
  status: Option<String>,
  list_state: ListState,
  search: SearchInput,
  filter: Option<String>,
}

impl CategoryListView {
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
  ) -> Query<CategoryCollection> {
    let client = client.clone();
    Query::new(move || {
      let client = client.clone();
      let params = match &filter {
        Some(term) => ListParams::search(term.clone()),
        None => ListParams::default(),
      };
      async move { client.fetch_categories(&params, force_refresh).await }
    })
  }

  fn reload(&mut self, force_refresh: bool) {
    self.query = Self::collection_query(&self.client, self.filter.clone(), force_refresh);
    self.query.fetch();
  }

  fn categories(&self) -> &[Category] {
    self
      .query
      .data()
      .map(|result| result.data.as_slice())
      .unwrap_or(&[])
  }

  fn delete_selected(&mut self) {
    if self.action.is_some() {
      return;
    }
    let Some(category) = self
      .list_state
      .selected()
      .and_then(|i| self.categories().get(i))
    else {
      return;
    };

    let id = category.id;
    let name = category.name.clone();
    let client = self.client.clone();
    let mut action: Query<String> = Query::new(move || {
      let client = client.clone();
      let name = name.clone();
      async move {
        client.inner().delete_category(id).await?;
        // Deleting a category cascades into its subcategories server-side,
        // so both collections are stale now.
        client.invalidate(&[ResourceKey::Categories, ResourceKey::Subcategories]);
        Ok::<_, ApiError>(format!("deleted {name}"))
      }
    });
    action.fetch();
    self.action = Some(action);
  }
}

impl View for CategoryListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      KeyResult::Handled => return ViewAction::None,
      KeyResult::Event(SearchEvent::Submitted) => {
        let term = self.search.query().trim().to_string();
        self.filter = (!term.is_empty()).then_some(term);
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
    let len = self.categories().len();
    ensure_valid_selection(&mut self.list_state, len);

    let loading = self.query.is_loading() || self.client.is_loading(ResourceKey::Categories);
    let mut title = match &self.filter {
      Some(term) => format!(" Categories /{term} ({len})"),
      None => format!(" Categories ({len})"),
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
        Some(e) => format!(
          "Failed to load categories: {}. Press 'r' to retry.",
          e.message
        ),
        None if loading => "Loading\u{2026}".to_string(),
        None => "No categories found.".to_string(),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      self.search.render_overlay(frame, area);
      return;
    }

    let items: Vec<ListItem> = self
      .categories()
      .iter()
      .map(|category| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<24}", truncate(&category.name, 24)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::raw(format!("{:<24}", truncate(&category.slug, 24))),
          Span::raw(" "),
          Span::styled(
            format!("{:>3} subcats", category.subcategories.len()),
            Style::default().fg(Color::Magenta),
          ),
          Span::raw(" "),
          Span::styled(
            truncate(&category.description, 32),
            Style::default().fg(Color::DarkGray),
          ),
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
      Some(term) => format!("Categories /{term}"),
      None => "Categories".to_string(),
    }
  }

  fn capturing_input(&self) -> bool {
    self.search.is_active()
  }
}
