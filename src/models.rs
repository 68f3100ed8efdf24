use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

// The backend is inconsistent about numeric identity: some responses carry
// ids as JSON numbers, others as numeric strings. Normalize once, here.
fn lenient_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  let value = serde_json::Value::deserialize(deserializer)?;
  match value {
    serde_json::Value::Number(n) => n
      .as_i64()
      .ok_or_else(|| serde::de::Error::custom(format!("id out of range: {n}"))),
    serde_json::Value::String(s) => s
      .trim()
      .parse::<i64>()
      .map_err(|_| serde::de::Error::custom(format!("id is not numeric: {s:?}"))),
    other => Err(serde::de::Error::custom(format!(
      "id must be a number or numeric string, got {other}"
    ))),
  }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Task {
  #[serde(deserialize_with = "lenient_id")]
  pub id: i64,
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  pub completed: bool,
  #[serde(deserialize_with = "lenient_id")]
  pub user_id: i64,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

#[derive(Serialize)]
pub struct LoginRequest {
  pub username: String,
  pub password: String,
}

#[derive(Deserialize)]
pub struct LoginResponse {
  pub access_token: String,
}

#[derive(Serialize)]
pub struct SignupRequest {
  pub email: String,
  pub username: String,
  pub password: String,
}

#[derive(Deserialize)]
pub struct MeResponse {
  #[serde(deserialize_with = "lenient_id")]
  pub user_id: i64,
}

#[derive(Serialize)]
pub struct TaskCreate {
  pub title: String,
  pub description: Option<String>,
}

#[derive(Serialize)]
pub struct TaskUpdate {
  pub title: String,
  pub description: Option<String>,
  pub completed: bool,
}

#[derive(Serialize)]
pub struct ChatSend {
  pub message: String,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ChatTurn {
  #[serde(default)]
  pub role: String,
  #[serde(default)]
  pub content: String,
  #[serde(default)]
  pub tool_calls: Vec<serde_json::Value>,
  #[serde(default)]
  pub tool_responses: Vec<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
pub struct ChatReply {
  pub response: String,
  #[serde(default)]
  pub messages: Vec<ChatTurn>,
}

// Local transcript entry; never persisted past the panel's lifetime.
#[derive(Clone, Debug)]
pub struct ChatMessage {
  pub id: u64,
  pub role: String,
  pub content: String,
  pub timestamp: String,
  pub tool_calls: Vec<serde_json::Value>,
  pub tool_responses: Vec<serde_json::Value>,
}

impl ChatMessage {
  pub fn new(id: u64, role: &str, content: impl Into<String>) -> Self {
    Self {
      id,
      role: role.to_string(),
      content: content.into(),
      timestamp: Utc::now().to_rfc3339(),
      tool_calls: Vec::new(),
      tool_responses: Vec::new(),
    }
  }
}
