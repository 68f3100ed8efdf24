use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde_json::Value;

use crate::error::ApiError;
use crate::session::Session;

// Default headers for every call, with caller-supplied entries winning on
// conflict. The bearer header is attached only when a credential exists.
pub fn build_headers(token: Option<&str>, extra: &HeaderMap) -> HeaderMap {
  let mut headers = HeaderMap::new();
  headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
  if let Some(token) = token {
    if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
      headers.insert(AUTHORIZATION, value);
    }
  }
  for (name, value) in extra {
    headers.insert(name.clone(), value.clone());
  }
  headers
}

pub struct Executor {
  http: reqwest::Client,
  session: Arc<Session>,
}

impl Executor {
  pub fn new(session: Arc<Session>) -> Self {
    Self {
      http: reqwest::Client::new(),
      session,
    }
  }

  pub fn session(&self) -> &Arc<Session> {
    &self.session
  }

  // Sends one request with the current credential attached. A 401 expires
  // the session as a side effect but the response is still handed back to
  // the caller; nothing here short-circuits or retries.
  pub async fn execute(
    &self,
    method: Method,
    url: &str,
    body: Option<&Value>,
    extra_headers: HeaderMap,
  ) -> Result<reqwest::Response, ApiError> {
    let token = self.session.token();
    let headers = build_headers(token.as_deref(), &extra_headers);

    let mut request = self.http.request(method, url).headers(headers);
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = request.send().await?;
    if response.status() == StatusCode::UNAUTHORIZED {
      self.session.expire();
    }
    Ok(response)
  }
}

#[cfg(test)]
mod tests {
  use super::build_headers;
  use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

  #[test]
  fn defaults_include_json_content_type() {
    let headers = build_headers(None, &HeaderMap::new());
    assert_eq!(
      headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
      Some("application/json")
    );
    assert!(headers.get(AUTHORIZATION).is_none());
  }

  #[test]
  fn bearer_attached_when_token_present() {
    let headers = build_headers(Some("tok123"), &HeaderMap::new());
    assert_eq!(
      headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
      Some("Bearer tok123")
    );
  }

  #[test]
  fn caller_headers_win_on_conflict() {
    let mut extra = HeaderMap::new();
    extra.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    let headers = build_headers(Some("tok"), &extra);
    assert_eq!(
      headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
      Some("text/plain")
    );
    assert!(headers.get(AUTHORIZATION).is_some());
  }
}
