use std::fs;
use std::io;
use std::path::{Path, PathBuf};

// Single persisted credential slot. Last write wins; no expiry tracking -
// a stale token is discovered through the 401 path, not locally.
pub struct TokenStore {
  path: PathBuf,
}

impl TokenStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn get(&self) -> Option<String> {
    let data = fs::read_to_string(&self.path).ok()?;
    let token = data.trim();
    if token.is_empty() {
      None
    } else {
      Some(token.to_string())
    }
  }

  pub fn set(&self, token: &str) -> io::Result<()> {
    if let Some(dir) = self.path.parent() {
      fs::create_dir_all(dir)?;
    }
    let tmp = self.path.with_extension("tmp");
    fs::write(&tmp, token)?;
    match fs::rename(&tmp, &self.path) {
      Ok(()) => Ok(()),
      Err(rename_err) => {
        if self.path.exists() {
          fs::remove_file(&self.path)?;
          fs::rename(&tmp, &self.path)
        } else {
          Err(rename_err)
        }
      }
    }
  }

  pub fn clear(&self) -> io::Result<()> {
    match fs::remove_file(&self.path) {
      Ok(()) => Ok(()),
      Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(err) => Err(err),
    }
  }
}
