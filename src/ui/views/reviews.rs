//! Review moderation view.
//!
//! Reviews are not part of the cached collection set; this view fetches
//! straight from the API and refetches after every action.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::catalog::types::ProductReview;
use crate::catalog::{ApiError, CachedCatalogClient, ListParams};
use crate::query::{Query, QueryState};
use crate::ui::view::{View, ViewAction};
use crate::ui::{ensure_valid_selection, truncate};

pub struct ReviewListView {
  client: CachedCatalogClient,
  query: Query<Vec<ProductReview>>,
  action: Option<Query<String>>,
  status: Option<String>,
  list_state: ListState,
}

impl ReviewListView {
  pub fn new(client: CachedCatalogClient) -> Self {
    let fetch_client = client.clone();
    let mut query = Query::new(move || {
      let client = fetch_client.clone();
      async move {
        client
          .inner()
          .list_product_reviews(&ListParams::default())
          .await
      }
    });
    query.fetch();
    Self {
      client,
      query,
      action: None,
      status: None,
      list_state: ListState::default(),
    }
  }

  fn reviews(&self) -> &[ProductReview] {
    self.query.data().map(Vec::as_slice).unwrap_or(&[])
  }

  fn selected_review(&self) -> Option<&ProductReview> {
    self
      .list_state
      .selected()
      .and_then(|i| self.reviews().get(i))
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

  fn mark_selected_helpful(&mut self) {
    let Some(review) = self.selected_review() else {
      return;
    };
    let id = review.id;
    let client = self.client.clone();
    self.start_action(move || {
      let client = client.clone();
      async move {
        let count = client.inner().mark_review_helpful(id).await?;
        Ok(format!("review #{id} helpful count: {count}"))
      }
    });
  }

  fn delete_selected(&mut self) {
    let Some(review) = self.selected_review() else {
      return;
    };
    let id = review.id;
    let client = self.client.clone();
    self.start_action(move || {
      let client = client.clone();
      async move {
        client.inner().delete_product_review(id).await?;
        Ok(format!("deleted review #{id}"))
      }
    });
  }
}

impl View for ReviewListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.query.refetch(),
      KeyCode::Char('h') => self.mark_selected_helpful(),
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
            // No cache entry to invalidate for reviews; just refetch.
            self.query.refetch();
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
    let len = self.reviews().len();
    ensure_valid_selection(&mut self.list_state, len);

    let mut title = format!(" Reviews ({len})");
    if self.query.is_loading() {
      title.push_str(" loading\u{2026}");
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
        Some(e) => format!("Failed to load reviews: {}. Press 'r' to retry.", e.message),
        None if self.query.is_loading() => "Loading\u{2026}".to_string(),
        None => "No reviews found.".to_string(),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .reviews()
      .iter()
      .map(|review| {
        let stars = "\u{2605}".repeat(review.rating.clamp(0, 5) as usize);
        let verified = if review.is_verified_purchase {
          "verified"
        } else {
          ""
        };
        let line = Line::from(vec![
          Span::styled(format!("{:<5}", stars), Style::default().fg(Color::Yellow)),
          Span::raw(" "),
          Span::raw(format!("{:<30}", truncate(&review.title, 30))),
          Span::raw(" "),
          Span::styled(
            format!("{:<44}", truncate(&review.comment, 44)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::raw(" "),
          Span::styled(
            format!("+{:<4}", review.helpful_count),
            Style::default().fg(Color::Green),
          ),
          Span::raw(" "),
          Span::styled(verified, Style::default().fg(Color::Cyan)),
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
  }

  fn title(&self) -> String {
    "Reviews".to_string()
  }
}
