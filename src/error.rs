use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("network error: {0}")]
  Network(#[from] reqwest::Error),
  #[error("http error: status {status}")]
  Http { status: u16 },
  #[error("malformed response body: {0}")]
  Parse(#[source] serde_json::Error),
  #[error("unexpected response shape: {0}")]
  Schema(String),
}

impl ApiError {
  pub fn is_unauthorized(&self) -> bool {
    matches!(self, ApiError::Http { status: 401 })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unauthorized_only_for_401() {
    assert!(ApiError::Http { status: 401 }.is_unauthorized());
    assert!(!ApiError::Http { status: 403 }.is_unauthorized());
    assert!(!ApiError::Schema("bad".to_string()).is_unauthorized());
  }
}
