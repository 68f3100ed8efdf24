use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;

pub struct Logger {
  file: Mutex<std::fs::File>,
}

impl Logger {
  pub fn new(path: &Path) -> anyhow::Result<Self> {
    if let Some(dir) = path.parent() {
      std::fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(Self {
      file: Mutex::new(file),
    })
  }

  pub fn log(&self, level: &str, message: &str) {
    let ts = Utc::now().to_rfc3339();
    let line = format!("[{ts}] {level}: {message}\n");
    if let Ok(mut file) = self.file.lock() {
      let _ = file.write_all(line.as_bytes());
    }
  }

  pub fn info(&self, message: &str) {
    self.log("INFO", message);
  }

  pub fn warn(&self, message: &str) {
    self.log("WARN", message);
  }

  pub fn error(&self, message: &str) {
    self.log("ERROR", message);
  }
}

#[cfg(test)]
mod tests {
  use super::Logger;
  use std::time::{SystemTime, UNIX_EPOCH};

  #[test]
  fn log_lines_append_with_level() {
    let nanos = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .expect("time should be monotonic")
      .as_nanos();
    let path = std::env::temp_dir().join(format!(
      "taskdesk_logger_{}_{}.log",
      std::process::id(),
      nanos
    ));

    let logger = Logger::new(&path).expect("logger should open");
    logger.info("starting");
    logger.error("request failed");

    let contents = std::fs::read_to_string(&path).expect("log file should read");
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("INFO: starting"));
    assert!(lines[1].contains("ERROR: request failed"));

    let _ = std::fs::remove_file(path);
  }
}
