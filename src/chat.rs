use crate::api::ApiClient;
use crate::models::ChatMessage;
use crate::session::SessionState;

pub const GREETING: &str =
  "Hello! I'm your AI assistant for managing your todo list. How can I help you today?";
pub const AUTH_REQUIRED: &str = "Unable to send message. User authentication required.";
pub const SEND_FAILED: &str =
  "Sorry, I encountered an error processing your request. Please try again.";

// Identity resolution ahead of the chat panel. Terminal on every failure:
// no retry, no backoff. A 401 has already expired the session inside the
// executor, so only the non-401 failures route to login from here.
pub async fn resolve_user(api: &ApiClient) -> Option<i64> {
  let session = api.session();
  if session.guard() != SessionState::Authenticated {
    return None;
  }
  match api.me().await {
    Ok(user_id) => Some(user_id),
    Err(err) => {
      if !err.is_unauthorized() {
        session.redirect_to_login();
      }
      None
    }
  }
}

pub struct ChatPanel {
  user_id: Option<i64>,
  messages: Vec<ChatMessage>,
  next_id: u64,
  busy: bool,
}

impl ChatPanel {
  pub fn new(user_id: Option<i64>) -> Self {
    let mut panel = Self {
      user_id,
      messages: Vec::new(),
      next_id: 1,
      busy: false,
    };
    panel.append("assistant", GREETING);
    panel
  }

  pub fn user_id(&self) -> Option<i64> {
    self.user_id
  }

  pub fn messages(&self) -> &[ChatMessage] {
    &self.messages
  }

  pub fn is_busy(&self) -> bool {
    self.busy
  }

  fn append(&mut self, role: &str, content: impl Into<String>) {
    let message = ChatMessage::new(self.next_id, role, content);
    self.next_id += 1;
    self.messages.push(message);
  }

  // One send at a time per panel; this is an advisory latch, not a queue.
  pub async fn send(&mut self, api: &ApiClient, text: &str) {
    let text = text.trim();
    if text.is_empty() || self.busy {
      return;
    }

    // Guarded defensively: identity should be bound after resolve_user,
    // but a missing one must never produce a network call.
    let Some(user_id) = self.user_id else {
      self.append("assistant", AUTH_REQUIRED);
      return;
    };

    self.append("user", text);
    self.busy = true;

    match api.chat(user_id, text).await {
      Ok(reply) => {
        self.append("assistant", reply.response);
        if let Some(last) = reply.messages.last() {
          if let Some(appended) = self.messages.last_mut() {
            appended.tool_calls = last.tool_calls.clone();
            appended.tool_responses = last.tool_responses.clone();
          }
        }
      }
      Err(_) => {
        // Non-fatal: the transcript stays usable for the next attempt.
        self.append("assistant", SEND_FAILED);
      }
    }

    self.busy = false;
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::session::Session;
  use crate::token::TokenStore;
  use std::path::PathBuf;
  use std::sync::Arc;
  use std::time::{SystemTime, UNIX_EPOCH};

  fn offline_api(prefix: &str) -> ApiClient {
    let nanos = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .expect("time should be monotonic")
      .as_nanos();
    let path: PathBuf = std::env::temp_dir().join(format!(
      "taskdesk_chat_{prefix}_{}_{}",
      std::process::id(),
      nanos
    ));
    // Points at a base no test may reach; paths below must not issue calls.
    ApiClient::new("http://127.0.0.1:1", Arc::new(Session::new(TokenStore::new(path))))
  }

  #[test]
  fn panel_opens_with_greeting() {
    let panel = ChatPanel::new(Some(1));
    assert_eq!(panel.messages().len(), 1);
    assert_eq!(panel.messages()[0].role, "assistant");
    assert_eq!(
      panel.messages()[0].content,
      "Hello! I'm your AI assistant for managing your todo list. How can I help you today?"
    );
  }

  #[tokio::test]
  async fn send_without_identity_appends_auth_required_locally() {
    let api = offline_api("no_identity");
    let mut panel = ChatPanel::new(None);
    panel.send(&api, "add a task").await;

    let last = panel.messages().last().expect("transcript should not be empty");
    assert_eq!(last.role, "assistant");
    assert_eq!(last.content, AUTH_REQUIRED);
    // Only greeting + local error turn; no user turn was recorded either.
    assert_eq!(panel.messages().len(), 2);
  }

  #[tokio::test]
  async fn blank_input_is_ignored() {
    let api = offline_api("blank");
    let mut panel = ChatPanel::new(Some(1));
    panel.send(&api, "   ").await;
    assert_eq!(panel.messages().len(), 1);
  }

  #[tokio::test]
  async fn busy_panel_refuses_a_second_send() {
    let api = offline_api("busy");
    let mut panel = ChatPanel::new(Some(1));
    panel.busy = true;
    panel.send(&api, "hello").await;
    assert_eq!(panel.messages().len(), 1);
  }

  #[tokio::test]
  async fn transport_failure_appends_error_turn_and_stays_usable() {
    let api = offline_api("transport");
    let mut panel = ChatPanel::new(Some(1));
    panel.send(&api, "hello").await;

    assert_eq!(panel.messages().len(), 3);
    assert_eq!(panel.messages()[1].role, "user");
    let last = panel.messages().last().expect("transcript should not be empty");
    assert_eq!(last.content, SEND_FAILED);
    assert!(!panel.is_busy());
  }

  #[test]
  fn transcript_ids_are_monotonic() {
    let mut panel = ChatPanel::new(Some(1));
    panel.append("user", "a");
    panel.append("assistant", "b");
    let ids: Vec<u64> = panel.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
  }
}
