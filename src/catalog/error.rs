//! Error taxonomy for catalog API calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Failures surfaced by the catalog API client.
///
/// Every failure is terminal for the call that produced it - there is no
/// retry or backoff anywhere in the client, the user re-issues the action.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Network or protocol failure before a well-formed response arrived,
  /// or a response body that did not decode.
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The server rejected the credential (401/403). This is the only way a
  /// stale or revoked credential is ever discovered, and the signal for the
  /// app to drop back to the login screen.
  #[error("not authorized - the stored credential was rejected")]
  Unauthorized,

  /// The server rejected the submitted data (400). The body is carried
  /// verbatim so forms can show it next to the offending input.
  #[error("validation failed: {message}")]
  Validation { message: String },

  /// Any other non-success status.
  #[error("server returned {status}: {message}")]
  Status { status: StatusCode, message: String },

  /// The configured base URL, or a path joined onto it, is not a valid URL.
  #[error("invalid API url: {0}")]
  Url(#[from] url::ParseError),
}

impl ApiError {
  pub fn is_unauthorized(&self) -> bool {
    matches!(self, ApiError::Unauthorized)
  }

  /// Classify a non-success response.
  pub(crate) fn from_response(status: StatusCode, body: String) -> Self {
    match status {
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
      StatusCode::BAD_REQUEST => ApiError::Validation { message: body },
      _ => ApiError::Status {
        status,
        message: body,
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn auth_statuses_map_to_unauthorized() {
    assert!(ApiError::from_response(StatusCode::UNAUTHORIZED, String::new()).is_unauthorized());
    assert!(ApiError::from_response(StatusCode::FORBIDDEN, String::new()).is_unauthorized());
  }

  #[test]
  fn bad_request_carries_body_verbatim() {
    let err = ApiError::from_response(
      StatusCode::BAD_REQUEST,
      r#"{"slug":["This field must be unique."]}"#.to_string(),
    );
    match err {
      ApiError::Validation { message } => assert!(message.contains("must be unique")),
      other => panic!("expected Validation, got {other:?}"),
    }
  }

  #[test]
  fn other_statuses_keep_their_code() {
    let err = ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "oops".to_string());
    match err {
      ApiError::Status { status, message } => {
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "oops");
      }
      other => panic!("expected Status, got {other:?}"),
    }
  }
}
