/// Generic result type for component key handling.
///
/// Standardizes how components report key handling back to their parent
/// view: consumed silently, consumed with an event, or not handled at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, no event for parent to handle
  Handled,
  /// Key was consumed, here's an event for parent to process
  Event(T),
  /// Key was not consumed, parent should try next handler
  NotHandled,
}
