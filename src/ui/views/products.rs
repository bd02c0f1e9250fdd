//! Product catalog view.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};
use std::sync::Arc;

use crate::cache::{CacheResult, ResourceKey};
use crate::catalog::types::{Product, StockUpdate};
use crate::catalog::{ApiError, CachedCatalogClient, ListParams};
use crate::query::{Query, QueryState};
use crate::ui::components::{InputResult, KeyResult, SearchEvent, SearchInput, TextInput};
use crate::ui::view::{View, ViewAction};
use crate::ui::{ensure_valid_selection, truncate};

type ProductCollection = CacheResult<Arc<Vec<Product>>>;

/// Inline prompt for a new stock quantity.
struct StockPrompt {
  product_id: i64,
  sku: String,
  input: TextInput,
}

pub struct ProductListView {
  client: CachedCatalogClient,
  query: Query<ProductCollection>,
  action: Option<Query<String>>,
  status: Option<String>,
  list_state: ListState,
  search: SearchInput,
  filter: Option<String>,
  stock_prompt: Option<StockPrompt>,
}

impl ProductListView {
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
      stock_prompt: None,
    }
  }

  fn collection_query(
    client: &CachedCatalogClient,
    filter: Option<String>,
    force_refresh: bool,
  ) -> Query<ProductCollection> {
    let client = client.clone();
    Query::new(move || {
      let client = client.clone();
      let params = match &filter {
        Some(term) => ListParams::search(term.clone()),
        None => ListParams::default(),
      };
      async move { client.fetch_products(&params, force_refresh).await }
    })
  }

  fn reload(&mut self, force_refresh: bool) {
    self.query = Self::collection_query(&self.client, self.filter.clone(), force_refresh);
    self.query.fetch();
  }

  fn products(&self) -> &[Product] {
    self
      .query
      .data()
      .map(|result| result.data.as_slice())
      .unwrap_or(&[])
  }

  fn selected_product(&self) -> Option<&Product> {
    self
      .list_state
      .selected()
      .and_then(|i| self.products().get(i))
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

  fn delete_selected(&mut self) {
    let Some(product) = self.selected_product() else {
      return;
    };
    let id = product.id;
    let sku = product.sku.clone();
    let client = self.client.clone();
    self.start_action(move || {
      let client = client.clone();
      let sku = sku.clone();
      async move {
        client.inner().delete_product(id).await?;
        client.invalidate(&[ResourceKey::Products]);
        Ok(format!("deleted {sku}"))
      }
    });
  }

  fn submit_stock(&mut self, prompt: StockPrompt) {
    let value = prompt.input.value().trim().to_string();
    let quantity: i64 = match value.parse() {
      Ok(q) => q,
      Err(_) => {
        self.status = Some(format!("not a quantity: {value}"));
        return;
      }
    };

    let client = self.client.clone();
    let id = prompt.product_id;
    let sku = prompt.sku;
    self.start_action(move || {
      let client = client.clone();
      let sku = sku.clone();
      async move {
        let updates = [StockUpdate {
          id,
          stock_quantity: quantity,
        }];
        client.inner().bulk_update_stock(&updates).await?;
        client.invalidate(&[ResourceKey::Products]);
        Ok(format!("stock of {sku} set to {quantity}"))
      }
    });
  }
}

impl View for ProductListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if let Some(mut prompt) = self.stock_prompt.take() {
      match prompt.input.handle_key(key) {
        InputResult::Submitted(_) => self.submit_stock(prompt),
        InputResult::Cancelled => {}
        _ => self.stock_prompt = Some(prompt),
      }
      return ViewAction::None;
    }

    match self.search.handle_key(key) {
      KeyResult::Handled => return ViewAction::None,
      KeyResult::Event(SearchEvent::Submitted) => {
        let term = self.search.query().trim().to_string();
        self.filter = (!term.is_empty()).then_some(term);
        // Forced: the cache keeps one entry per resource, not per search.
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
      KeyCode::Char('e') => {
        if let Some(product) = self.selected_product() {
          self.stock_prompt = Some(StockPrompt {
            product_id: product.id,
            sku: product.sku.clone(),
            input: TextInput::new(),
          });
        }
      }
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
    let len = self.products().len();
    ensure_valid_selection(&mut self.list_state, len);

    let loading = self.query.is_loading() || self.client.is_loading(ResourceKey::Products);
    let mut title = match &self.filter {
      Some(term) => format!(" Products /{term} ({len})"),
      None => format!(" Products ({len})"),
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
        Some(e) => format!("Failed to load products: {}. Press 'r' to retry.", e.message),
        None if loading => "Loading\u{2026}".to_string(),
        None => "No products found.".to_string(),
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      self.search.render_overlay(frame, area);
      return;
    }

    let items: Vec<ListItem> = self
      .products()
      .iter()
      .map(|product| {
        let stock = if product.stock_quantity < 10 {
          Span::styled(
            format!("{:>6}", product.stock_quantity),
            Style::default().fg(Color::Red),
          )
        } else {
          Span::raw(format!("{:>6}", product.stock_quantity))
        };
        let line = Line::from(vec![
          Span::styled(
            format!("{:<12}", truncate(&product.sku, 12)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::raw(format!("{:<32}", truncate(&product.name, 32))),
          Span::raw(" "),
          Span::styled(
            format!("{:>10}", product.base_price),
            Style::default().fg(Color::Green),
          ),
          Span::raw(" "),
          stock,
          Span::raw(" "),
          Span::styled(
            truncate(&product.subcategory_name, 20),
            Style::default().fg(Color::Magenta),
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

    if let Some(prompt) = &self.stock_prompt {
      let width = 40.min(area.width);
      let overlay = Rect::new(area.x + 1, area.y + 1, width, 3);
      frame.render_widget(Clear, overlay);
      let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" Stock for {} ", prompt.sku));
      let inner = block.inner(overlay);
      frame.render_widget(block, overlay);
      let line = Line::from(vec![
        Span::raw(prompt.input.display_value()),
        Span::styled("_", Style::default().fg(Color::Yellow)),
      ]);
      frame.render_widget(Paragraph::new(line), inner);
    }

    self.search.render_overlay(frame, area);
  }

  fn title(&self) -> String {
    match &self.filter {
      Some(term) => format!("Products /{term}"),
      None => "Products".to_string(),
    }
  }

  fn capturing_input(&self) -> bool {
    self.search.is_active() || self.stock_prompt.is_some()
  }
}
