use anyhow::bail;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

// API base resolution: primary env var, then the legacy fallback var.
// Production deployments must configure one of them; anything else falls
// back to the local loopback backend.
pub fn api_base_from_env() -> anyhow::Result<Resolved> {
  resolve_api_base(
    std::env::var("TASKDESK_API_BASE_URL").ok(),
    std::env::var("TASKDESK_API_URL").ok(),
    std::env::var("TASKDESK_ENV").ok().as_deref(),
  )
}

pub struct Resolved {
  pub base: String,
  pub defaulted: bool,
}

pub fn resolve_api_base(
  primary: Option<String>,
  fallback: Option<String>,
  env: Option<&str>,
) -> anyhow::Result<Resolved> {
  let configured = primary
    .filter(|v| !v.trim().is_empty())
    .or_else(|| fallback.filter(|v| !v.trim().is_empty()));

  if let Some(url) = configured {
    return Ok(Resolved {
      base: strip_trailing_slash(url.trim()),
      defaulted: false,
    });
  }

  if env == Some("production") {
    bail!(
      "API base URL not configured for production. \
       Set TASKDESK_API_BASE_URL or TASKDESK_API_URL."
    );
  }

  Ok(Resolved {
    base: DEFAULT_API_BASE.to_string(),
    defaulted: true,
  })
}

fn strip_trailing_slash(url: &str) -> String {
  url.trim_end_matches('/').to_string()
}
