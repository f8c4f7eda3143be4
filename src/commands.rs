use crate::logging::TranscriptLog;

pub enum CommandResult {
    /// Input was a slash command; the string is feedback for the transcript.
    Handled(String),
    /// Not a command; forward to the model as a chat message.
    Submit(String),
}

pub fn process_input(log: &mut TranscriptLog, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if trimmed == "/log" || trimmed.starts_with("/log ") {
        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        match parts.len() {
            // Bare "/log" toggles pause/resume on the configured file.
            1 => match log.toggle() {
                Ok(message) => CommandResult::Handled(message),
                Err(e) => CommandResult::Handled(format!("Error: {}", e)),
            },
            2 => match log.set_log_file(parts[1].to_string()) {
                Ok(message) => CommandResult::Handled(message),
                Err(e) => CommandResult::Handled(format!("Error setting log file: {}", e)),
            },
            _ => CommandResult::Handled(
                "Usage: /log [filename] - Enable logging to file, or /log to toggle pause/resume"
                    .to_string(),
            ),
        }
    } else {
        CommandResult::Submit(input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn plain_text_is_submitted() {
        let mut log = TranscriptLog::new(None);
        match process_input(&mut log, "hello there") {
            CommandResult::Submit(text) => assert_eq!(text, "hello there"),
            CommandResult::Handled(_) => panic!("expected submit"),
        }
    }

    #[test]
    fn bare_log_without_file_reports_error() {
        let mut log = TranscriptLog::new(None);
        match process_input(&mut log, "/log") {
            CommandResult::Handled(message) => assert!(message.starts_with("Error:")),
            CommandResult::Submit(_) => panic!("expected handled"),
        }
    }

    #[test]
    fn log_with_filename_enables_logging() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chat.log");
        let mut log = TranscriptLog::new(None);

        match process_input(&mut log, &format!("/log {}", path.display())) {
            CommandResult::Handled(message) => {
                assert!(message.starts_with("Logging enabled"))
            }
            CommandResult::Submit(_) => panic!("expected handled"),
        }
        assert!(log.status().starts_with("active"));
    }

    #[test]
    fn extra_arguments_show_usage() {
        let mut log = TranscriptLog::new(None);
        match process_input(&mut log, "/log a b") {
            CommandResult::Handled(message) => assert!(message.starts_with("Usage:")),
            CommandResult::Submit(_) => panic!("expected handled"),
        }
    }
}
