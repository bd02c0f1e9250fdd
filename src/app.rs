use crate::auth::{CredentialStore, SessionGate};
use crate::cache::{ResourceCache, SystemClock};
use crate::catalog::{CachedCatalogClient, CatalogClient};
use crate::commands::{self, Command};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{
  CategoryListView, DashboardView, LoginView, ProductListView, ReviewListView,
  SubcategoryListView, UserListView,
};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
}

/// Main application state: the session gate, the shared resource cache, and
/// a stack of views over them.
pub struct App {
  /// Application configuration
  config: Config,

  /// Session gate: unknown until the startup restore completes
  session: SessionGate,

  /// The one cache instance, shared by every client clone
  cache: Arc<ResourceCache>,

  /// API client; present only while signed in
  client: Option<CachedCatalogClient>,

  /// Navigation stack - root is always at index 0
  views: Vec<Box<dyn View>>,

  /// Current input mode
  mode: Mode,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let store = CredentialStore::open()?;
    let session = SessionGate::new(store);
    let cache = Arc::new(ResourceCache::new(Arc::new(SystemClock)));
    let (tx, _rx) = mpsc::unbounded_channel();

    Ok(Self {
      config,
      session,
      cache,
      client: None,
      views: Vec::new(),
      mode: Mode::Normal,
      command_input: String::new(),
      selected_suggestion: 0,
      event_tx: tx,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    // Read the persisted session off the render path; until the result
    // arrives the gate stays Unknown and the UI shows a splash.
    self.restore_session();

    // Main loop
    while !self.should_quit {
      // Draw UI
      terminal.draw(|frame| ui::draw(frame, self))?;

      // Handle events
      if let Some(event) = events.next().await {
        self.handle_event(event)?;
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn restore_session(&self) {
    let store = self.session.store().clone();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      let restored = store.load().unwrap_or_else(|e| {
        tracing::warn!("failed to read persisted session: {e}");
        None
      });
      let _ = tx.send(Event::SessionRestored(restored));
    });
  }

  fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Key(key) => self.handle_key(key)?,
      Event::Tick => {
        let action = match self.views.last_mut() {
          Some(view) => view.tick(),
          None => ViewAction::None,
        };
        self.apply_action(action)?;
      }
      Event::SessionRestored(restored) => {
        self.session.apply_restored(restored);
        match self.session.credential().map(String::from) {
          Some(credential) => self.enter_authenticated(&credential)?,
          None => self.enter_login(None),
        }
      }
    }
    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
    // Ctrl-C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return Ok(());
    }

    match self.mode {
      Mode::Command => self.handle_command_mode_key(key)?,
      Mode::Normal => {
        let capturing = self
          .views
          .last()
          .map(|view| view.capturing_input())
          .unwrap_or(false);

        if key.code == KeyCode::Char(':') && self.session.is_authenticated() && !capturing {
          self.mode = Mode::Command;
          self.command_input.clear();
          self.selected_suggestion = 0;
          return Ok(());
        }

        let action = match self.views.last_mut() {
          Some(view) => view.handle_key(key),
          None => ViewAction::None,
        };
        self.apply_action(action)?;
      }
    }
    Ok(())
  }

  fn handle_command_mode_key(&mut self, key: KeyEvent) -> Result<()> {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command()?;
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0;
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0;
      }
      _ => {}
    }
    Ok(())
  }

  fn execute_command(&mut self) -> Result<()> {
    // Either the selected suggestion or the raw input
    let suggestions = commands::get_suggestions(&self.command_input);
    let cmd = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      suggestions[self.selected_suggestion].name.to_string()
    } else {
      self.command_input.trim().to_lowercase()
    };

    match cmd.as_str() {
      "dashboard" => self.switch_root(|client| Box::new(DashboardView::new(client))),
      "users" => self.switch_root(|client| Box::new(UserListView::new(client))),
      "products" => self.switch_root(|client| Box::new(ProductListView::new(client))),
      "categories" => self.switch_root(|client| Box::new(CategoryListView::new(client))),
      "subcategories" => self.switch_root(|client| Box::new(SubcategoryListView::new(client))),
      "reviews" => self.switch_root(|client| Box::new(ReviewListView::new(client))),
      "logout" => self.logout(None)?,
      "quit" => self.should_quit = true,
      _ => {
        // Unknown command
      }
    }
    self.command_input.clear();
    Ok(())
  }

  fn switch_root<F>(&mut self, make: F)
  where
    F: FnOnce(CachedCatalogClient) -> Box<dyn View>,
  {
    if let Some(client) = &self.client {
      self.views = vec![make(client.clone())];
    }
  }

  fn apply_action(&mut self, action: ViewAction) -> Result<()> {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.views.push(view),
      ViewAction::Pop => {
        if self.views.len() > 1 {
          self.views.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::SignedIn { username, password } => {
        // The login view already verified the pair against the server;
        // persisting it is local-only and can still fail.
        match self.session.login(&username, &password) {
          Ok(credential) => self.enter_authenticated(&credential)?,
          Err(e) => {
            tracing::error!("failed to persist credential: {e}");
            self.enter_login(Some(format!("Login failed: {e}")));
          }
        }
      }
      ViewAction::SessionExpired => {
        self.logout(Some("Session expired - sign in again".to_string()))?;
      }
      ViewAction::Quit => self.should_quit = true,
    }
    Ok(())
  }

  fn enter_authenticated(&mut self, credential: &str) -> Result<()> {
    let inner = CatalogClient::new(&self.config, Some(credential.to_string()))?;
    let client = CachedCatalogClient::new(inner, Arc::clone(&self.cache));
    self.client = Some(client.clone());
    self.views = vec![Box::new(DashboardView::new(client))];
    self.mode = Mode::Normal;
    Ok(())
  }

  fn enter_login(&mut self, notice: Option<String>) {
    self.client = None;
    self.mode = Mode::Normal;
    self.views = vec![Box::new(LoginView::new(self.config.clone(), notice))];
  }

  fn logout(&mut self, notice: Option<String>) -> Result<()> {
    self.session.logout()?;
    // The memo must not hand the next account this one's listings.
    self.cache.invalidate(&[]);
    self.enter_login(notice);
    Ok(())
  }

  // Accessors for UI rendering

  pub fn session(&self) -> &SessionGate {
    &self.session
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn title(&self) -> String {
    self.config.display_title()
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.views.last_mut()
  }

  pub fn breadcrumb(&self) -> Vec<String> {
    self.views.iter().map(|view| view.title()).collect()
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }
}
