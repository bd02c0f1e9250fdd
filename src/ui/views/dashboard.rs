//! Store statistics overview - the signed-in landing view.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::catalog::types::{CategoryStats, ProductStats, UserStats};
use crate::catalog::CachedCatalogClient;
use crate::query::Query;
use crate::ui::view::{View, ViewAction};

pub struct DashboardView {
  users: Query<UserStats>,
  products: Query<ProductStats>,
  categories: Query<CategoryStats>,
}

impl DashboardView {
  pub fn new(client: CachedCatalogClient) -> Self {
    // Stats are cheap aggregates outside the cached key set; fetch directly.
    let c = client.clone();
    let mut users = Query::new(move || {
      let client = c.clone();
      async move { client.inner().user_stats().await }
    });
    let c = client.clone();
    let mut products = Query::new(move || {
      let client = c.clone();
      async move { client.inner().product_stats().await }
    });
    let c = client;
    let mut categories = Query::new(move || {
      let client = c.clone();
      async move { client.inner().category_stats().await }
    });

    users.fetch();
    products.fetch();
    categories.fetch();

    Self {
      users,
      products,
      categories,
    }
  }

  fn refresh(&mut self) {
    self.users.refetch();
    self.products.refetch();
    self.categories.refetch();
  }
}

fn stat_lines<'a>(rows: Vec<(&'a str, String)>) -> Vec<Line<'a>> {
  rows
    .into_iter()
    .map(|(label, value)| {
      Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
      ])
    })
    .collect()
}

fn draw_panel<T>(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  query: &Query<T>,
  rows: impl FnOnce(&T) -> Vec<Line<'static>>,
) where
  T: Send + 'static,
{
  let block = Block::default()
    .title(format!(" {title} "))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let content: Vec<Line> = if let Some(data) = query.data() {
    rows(data)
  } else if let Some(error) = query.error() {
    vec![Line::styled(
      error.message.clone(),
      Style::default().fg(Color::Red),
    )]
  } else {
    vec![Line::styled(
      "loading\u{2026}",
      Style::default().fg(Color::DarkGray),
    )]
  };

  frame.render_widget(Paragraph::new(content).block(block), area);
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn tick(&mut self) -> ViewAction {
    self.users.poll();
    self.products.poll();
    self.categories.poll();

    if self.users.is_unauthorized()
      || self.products.is_unauthorized()
      || self.categories.is_unauthorized()
    {
      return ViewAction::SessionExpired;
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([
        Constraint::Percentage(34),
        Constraint::Percentage(33),
        Constraint::Percentage(33),
      ])
      .split(area);

    draw_panel(frame, columns[0], "Users", &self.users, |stats| {
      stat_lines(vec![
        ("total", stats.total.to_string()),
        ("active", stats.active.to_string()),
        ("today", stats.today.to_string()),
        ("this week", stats.this_week.to_string()),
      ])
    });

    draw_panel(frame, columns[1], "Products", &self.products, |stats| {
      stat_lines(vec![
        ("total", stats.total.to_string()),
        ("active", stats.active.to_string()),
        ("inactive", stats.inactive.to_string()),
        ("low stock", stats.low_stock.to_string()),
      ])
    });

    draw_panel(frame, columns[2], "Categories", &self.categories, |stats| {
      stat_lines(vec![
        ("total", stats.total.to_string()),
        ("active", stats.active.to_string()),
        ("inactive", stats.inactive.to_string()),
      ])
    });
  }

  fn title(&self) -> String {
    "Dashboard".to_string()
  }
}
