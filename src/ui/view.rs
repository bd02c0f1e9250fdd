use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// Actions that a view can request in response to user input or a completed
/// async call.
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back); popping the root quits
  Pop,
  /// The login form verified a credential pair against the server; the app
  /// persists it through the session gate and swaps to the signed-in root
  SignedIn { username: String, password: String },
  /// A request came back authorization-denied: the stored credential is
  /// stale. The app signs out and drops back to the login screen.
  SessionExpired,
  /// Exit the application
  Quit,
}

/// Trait for view behavior
///
/// Views handle their own input (including search overlays and edit prompts)
/// and return actions for the App to execute. Views that load data
/// asynchronously own a `Query<T>` and poll it in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Label for this view in the header breadcrumb
  fn title(&self) -> String;

  /// Called on each tick so the view can poll async queries
  fn tick(&mut self) -> ViewAction {
    ViewAction::None
  }

  /// Whether the view is currently capturing free text (search overlay, edit
  /// prompt). While true the app must not intercept keys like `:`.
  fn capturing_input(&self) -> bool {
    false
  }
}
