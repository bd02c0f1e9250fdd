//! Poll-based async query primitive for the view layer.
//!
//! A `Query<T>` owns one fetch operation: the fetching closure, the
//! loading/success/error state, and the channel the spawned task reports
//! back on. Views poll it from their tick handler and read the state during
//! render. Staleness is not tracked here - the resource cache behind the
//! catalog client owns the TTL; a query only represents the call in flight.
//!
//! # Example
//!
//! ```ignore
//! let client = client.clone();
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     async move { client.fetch_products(&ListParams::default(), false).await }
//! });
//!
//! query.fetch();
//!
//! // In the tick handler
//! if query.poll() {
//!     // State changed, the next render shows it
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

use crate::catalog::ApiError;

/// A query failure, reduced to what a view needs: the display message and
/// whether the server rejected the credential (which the app escalates to a
/// re-login instead of rendering in place).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
  pub unauthorized: bool,
  pub message: String,
}

impl From<ApiError> for QueryError {
  fn from(e: ApiError) -> Self {
    Self {
      unauthorized: e.is_unauthorized(),
      message: e.to_string(),
    }
  }
}

impl From<String> for QueryError {
  fn from(message: String) -> Self {
    Self {
      unauthorized: false,
      message,
    }
  }
}

impl std::fmt::Display for QueryError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.message)
  }
}

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed
  Error(QueryError),
}

impl<T> QueryState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn is_success(&self) -> bool {
    matches!(self, QueryState::Success(_))
  }

  pub fn is_error(&self) -> bool {
    matches!(self, QueryState::Error(_))
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&QueryError> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A boxed future that returns a Result<T, QueryError>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, QueryError>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn() -> BoxFuture<T> + Send + Sync>;

/// Async query with state management, polled from the event loop.
pub struct Query<T> {
  state: QueryState<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, QueryError>>>,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is a closure returning a future; it runs once per
  /// `fetch()`/`refetch()` call. Any error convertible into [`QueryError`]
  /// works, so fetchers can return `ApiError` directly.
  pub fn new<F, Fut, E>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Into<QueryError>,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || {
        let fut = fetcher();
        Box::pin(async move { fut.await.map_err(Into::into) })
      }),
      receiver: None,
    }
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T> {
    &self.state
  }

  /// Get the data if the query succeeded.
  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  /// Check if the query is currently loading.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Check if the query failed.
  pub fn is_error(&self) -> bool {
    self.state.is_error()
  }

  /// Get the error if the query failed.
  pub fn error(&self) -> Option<&QueryError> {
    self.state.error()
  }

  /// Whether the last failure was an authorization denial.
  pub fn is_unauthorized(&self) -> bool {
    self.error().map(|e| e.unauthorized).unwrap_or(false)
  }

  /// Start fetching data if not already loading.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch, even if already loading or data exists.
  pub fn refetch(&mut self) {
    // Drop the receiver so a result from the superseded fetch is discarded
    self.receiver = None;
    self.start_fetch();
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  /// Call this from the tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending - treat as error
        self.state = QueryState::Error(QueryError {
          unauthorized: false,
          message: "request was cancelled".to_string(),
        });
        self.receiver = None;
        true
      }
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    let future = (self.fetcher)();
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[tokio::test]
  async fn query_success() {
    let mut query = Query::new(|| async { Ok::<_, String>(vec![1, 2, 3]) });

    assert!(matches!(query.state(), QueryState::Idle));

    query.fetch();
    assert!(query.is_loading());

    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert_eq!(query.data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn query_error() {
    let mut query: Query<i32> = Query::new(|| async { Err("something went wrong".to_string()) });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(query.poll());
    assert!(query.is_error());
    assert_eq!(query.error().unwrap().message, "something went wrong");
    assert!(!query.is_unauthorized());
  }

  #[tokio::test]
  async fn unauthorized_errors_are_flagged() {
    let mut query: Query<i32> = Query::new(|| async {
      Err(QueryError {
        unauthorized: true,
        message: "not authorized".to_string(),
      })
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    query.poll();
    assert!(query.is_unauthorized());
  }

  #[tokio::test]
  async fn fetch_while_loading_is_noop() {
    let mut query = Query::new(|| async {
      tokio::time::sleep(Duration::from_millis(100)).await;
      Ok::<_, String>(42)
    });

    query.fetch();
    assert!(query.is_loading());

    // Second fetch should be no-op
    query.fetch();
    assert!(query.is_loading());
  }

  #[tokio::test]
  async fn refetch_discards_pending_result() {
    let counter = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
    let counter_clone = counter.clone();

    let mut query = Query::new(move || {
      let counter = counter_clone.clone();
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, String>(counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst))
      }
    });

    query.fetch();
    tokio::time::sleep(Duration::from_millis(10)).await;

    // Refetch supersedes the first call; only the second result is received
    query.refetch();
    tokio::time::sleep(Duration::from_millis(100)).await;

    query.poll();
    assert_eq!(query.data(), Some(&1));
  }
}
