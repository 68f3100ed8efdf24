use std::sync::Arc;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::Executor;
use crate::models::{
  ChatReply, ChatSend, LoginRequest, LoginResponse, MeResponse, SignupRequest, Task, TaskCreate,
  TaskUpdate,
};
use crate::session::Session;

// Endpoint paths are accepted with or without a leading slash and joined
// against a base that never carries a trailing one.
fn join(base: &str, endpoint: &str) -> String {
  format!(
    "{}/{}",
    base.trim_end_matches('/'),
    endpoint.trim_start_matches('/')
  )
}

fn decode<T: DeserializeOwned>(value: Option<Value>, what: &str) -> Result<T, ApiError> {
  let value = value.ok_or_else(|| ApiError::Schema(format!("{what}: empty response body")))?;
  serde_json::from_value(value).map_err(|err| ApiError::Schema(format!("{what}: {err}")))
}

fn payload<T: serde::Serialize>(body: &T) -> Result<Value, ApiError> {
  serde_json::to_value(body).map_err(|err| ApiError::Schema(format!("request payload: {err}")))
}

pub struct ApiClient {
  base: String,
  exec: Executor,
}

impl ApiClient {
  pub fn new(base: impl Into<String>, session: Arc<Session>) -> Self {
    Self {
      base: base.into(),
      exec: Executor::new(session),
    }
  }

  pub fn session(&self) -> &Arc<Session> {
    self.exec.session()
  }

  // Uniform normalization: non-2xx fails, 204 and empty bodies resolve to
  // None (a valid success), declared-JSON bodies parse, anything else comes
  // back as raw text.
  async fn request(
    &self,
    method: Method,
    endpoint: &str,
    body: Option<Value>,
  ) -> Result<Option<Value>, ApiError> {
    let url = join(&self.base, endpoint);
    let response = self
      .exec
      .execute(method, &url, body.as_ref(), HeaderMap::new())
      .await?;

    let status = response.status();
    if !status.is_success() {
      return Err(ApiError::Http {
        status: status.as_u16(),
      });
    }

    if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
      return Ok(None);
    }

    let is_json = response
      .headers()
      .get(CONTENT_TYPE)
      .and_then(|v| v.to_str().ok())
      .map(|v| v.contains("application/json"))
      .unwrap_or(false);

    let text = response.text().await?;
    if is_json {
      if text.is_empty() {
        return Ok(None);
      }
      let parsed = serde_json::from_str(&text).map_err(ApiError::Parse)?;
      return Ok(Some(parsed));
    }

    Ok(Some(Value::String(text)))
  }

  pub async fn get(&self, endpoint: &str) -> Result<Option<Value>, ApiError> {
    self.request(Method::GET, endpoint, None).await
  }

  pub async fn post(&self, endpoint: &str, body: Option<Value>) -> Result<Option<Value>, ApiError> {
    self.request(Method::POST, endpoint, body).await
  }

  pub async fn put(&self, endpoint: &str, body: Option<Value>) -> Result<Option<Value>, ApiError> {
    self.request(Method::PUT, endpoint, body).await
  }

  pub async fn patch(&self, endpoint: &str, body: Option<Value>) -> Result<Option<Value>, ApiError> {
    self.request(Method::PATCH, endpoint, body).await
  }

  pub async fn delete(&self, endpoint: &str) -> Result<Option<Value>, ApiError> {
    self.request(Method::DELETE, endpoint, None).await
  }

  pub async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
    let body = payload(&LoginRequest {
      username: username.to_string(),
      password: password.to_string(),
    })?;
    let value = self.post("/auth/login", Some(body)).await?;
    let parsed: LoginResponse = decode(value, "login")?;
    Ok(parsed.access_token)
  }

  pub async fn signup(
    &self,
    email: &str,
    username: &str,
    password: &str,
  ) -> Result<(), ApiError> {
    let body = payload(&SignupRequest {
      email: email.to_string(),
      username: username.to_string(),
      password: password.to_string(),
    })?;
    // Response body is ignored; success is the status alone.
    self.post("/auth/signup", Some(body)).await?;
    Ok(())
  }

  pub async fn me(&self) -> Result<i64, ApiError> {
    let value = self.get("/auth/me").await?;
    let parsed: MeResponse = decode(value, "me")?;
    Ok(parsed.user_id)
  }

  pub async fn tasks(&self) -> Result<Vec<Task>, ApiError> {
    let value = self.get("/api/tasks").await?;
    decode(value, "task list")
  }

  pub async fn create_task(
    &self,
    title: &str,
    description: Option<&str>,
  ) -> Result<Task, ApiError> {
    let body = payload(&TaskCreate {
      title: title.to_string(),
      description: description.map(|d| d.to_string()),
    })?;
    let value = self.post("/api/tasks", Some(body)).await?;
    decode(value, "created task")
  }

  pub async fn update_task(&self, id: i64, update: &TaskUpdate) -> Result<Option<Task>, ApiError> {
    let body = payload(update)?;
    let value = self.put(&format!("/api/tasks/{id}"), Some(body)).await?;
    match value {
      None => Ok(None),
      some => Ok(Some(decode(some, "updated task")?)),
    }
  }

  pub async fn toggle_complete(&self, id: i64) -> Result<Option<Task>, ApiError> {
    let value = self.patch(&format!("/api/tasks/{id}/complete"), None).await?;
    match value {
      None => Ok(None),
      some => Ok(Some(decode(some, "toggled task")?)),
    }
  }

  pub async fn delete_task(&self, id: i64) -> Result<(), ApiError> {
    self.delete(&format!("/api/tasks/{id}")).await?;
    Ok(())
  }

  pub async fn chat(&self, user_id: i64, message: &str) -> Result<ChatReply, ApiError> {
    let body = payload(&ChatSend {
      message: message.to_string(),
    })?;
    let value = self.post(&format!("/api/{user_id}/chat"), Some(body)).await?;
    decode(value, "chat reply")
  }
}
