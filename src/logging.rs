use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Append-only transcript log, toggled at runtime via `/log`.
pub struct TranscriptLog {
    path: Option<PathBuf>,
    active: bool,
}

impl TranscriptLog {
    pub fn new(log_file: Option<String>) -> Self {
        let active = log_file.is_some();
        TranscriptLog {
            path: log_file.map(PathBuf::from),
            active,
        }
    }

    pub fn set_log_file(&mut self, path: String) -> io::Result<String> {
        // Open for append once up front so permission problems surface now.
        OpenOptions::new().create(true).append(true).open(&path)?;

        self.path = Some(PathBuf::from(&path));
        self.active = true;
        Ok(format!("Logging enabled to: {}", path))
    }

    pub fn toggle(&mut self) -> Result<String, String> {
        match &self.path {
            Some(path) => {
                self.active = !self.active;
                if self.active {
                    Ok(format!("Logging resumed to: {}", path.display()))
                } else {
                    Ok(format!("Logging paused (file: {})", path.display()))
                }
            }
            None => {
                Err("No log file specified. Use /log <filename> to enable logging first.".into())
            }
        }
    }

    /// Append one message to the log, one blank line after it for spacing.
    /// A no-op while logging is disabled or paused.
    pub fn log_message(&self, content: &str) -> io::Result<()> {
        let Some(path) = self.path.as_ref().filter(|_| self.active) else {
            return Ok(());
        };

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        for line in content.lines() {
            writeln!(file, "{}", line)?;
        }
        writeln!(file)?;
        file.flush()
    }

    pub fn status(&self) -> String {
        match (&self.path, self.active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!("active ({})", file_name(path)),
            (Some(path), false) => format!("paused ({})", file_name(path)),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap_or_default().to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn toggle_without_file_is_an_error() {
        let mut log = TranscriptLog::new(None);
        assert!(log.toggle().is_err());
        assert_eq!(log.status(), "disabled");
    }

    #[test]
    fn messages_are_appended_with_spacing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log");
        let mut log = TranscriptLog::new(None);
        log.set_log_file(path.to_string_lossy().into_owned()).unwrap();

        log.log_message("You: hello").unwrap();
        log.log_message("Hi there").unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "You: hello\n\nHi there\n\n");
    }

    #[test]
    fn paused_logging_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log");
        let mut log = TranscriptLog::new(Some(path.to_string_lossy().into_owned()));

        log.toggle().unwrap();
        log.log_message("dropped").unwrap();
        assert!(!path.exists());
        assert!(log.status().starts_with("paused"));
    }
}
