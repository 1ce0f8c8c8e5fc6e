//! Output formatting module
//!
//! Terminal presentation of session events: progress lines as they arrive,
//! the selection prompt, and the finished itinerary.

use console::Style;

use crate::config::Config;
use crate::session::SessionEvent;

/// Output formatter for CLI results
pub struct OutputFormatter {
    blue: Style,
    green: Style,
    yellow: Style,
    red: Style,
    bold: Style,
    dim: Style,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self {
            blue: Style::new().blue(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
            bold: Style::new().bold(),
            dim: Style::new().dim(),
        }
    }
}

impl OutputFormatter {
    /// Create a new formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// One display line per event, or `None` for events the log already shows
    pub fn format_event(&self, event: &SessionEvent) -> Option<String> {
        match event {
            SessionEvent::Started {
                destination,
                date,
                output_format,
                ..
            } => Some(format!(
                "{} {} on {} ({})",
                self.bold.apply_to("Planning"),
                self.green.apply_to(destination),
                self.green.apply_to(date),
                output_format
            )),
            SessionEvent::Progress(line) => Some(line.clone()),
            SessionEvent::SelectionRequested(_) => None,
            SessionEvent::SelectionSent(text) => {
                Some(format!("{}", self.dim.apply_to(format!("> {}", text))))
            }
            SessionEvent::Completed(_) => None,
            SessionEvent::Closed { reason } => Some(format!(
                "{}",
                self.yellow.apply_to(match reason {
                    Some(reason) => format!("Connection closed before the itinerary was ready: {}", reason),
                    None => "Connection closed before the itinerary was ready.".to_string(),
                })
            )),
            SessionEvent::Failed(error) => Some(format!(
                "{}",
                self.red.apply_to(format!("Connection error: {}", error))
            )),
        }
    }

    /// Print a session event
    pub fn print_event(&self, event: &SessionEvent) {
        if let Some(line) = self.format_event(event) {
            println!("{}", line);
        }
    }

    /// Terminal rendering of the itinerary's markup source
    pub fn render_itinerary(&self, content: &str) -> String {
        let mut out = Vec::new();
        for line in content.lines() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                let level = trimmed.chars().take_while(|c| *c == '#').count();
                let text = trimmed.trim_start_matches('#').trim().replace("**", "");
                if level <= 1 {
                    out.push(format!("{}", self.bold.apply_to(text.to_uppercase())));
                } else {
                    out.push(format!("{}", self.bold.apply_to(text)));
                }
            } else if let Some(item) = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
            {
                let indent = line.len() - trimmed.len();
                out.push(format!("{}  • {}", " ".repeat(indent), item));
            } else {
                out.push(line.to_string());
            }
        }
        out.join("\n")
    }

    /// Print the finished itinerary
    pub fn print_itinerary(&self, content: &str) {
        println!();
        println!("{}", self.bold.apply_to("Your itinerary:"));
        println!();
        println!("{}", self.render_itinerary(content));
        println!();
    }

    /// Print a short status line
    pub fn print_status(&self, message: &str) {
        println!("{}", self.blue.apply_to(message));
    }

    /// Log tail in reading order; `entries` arrive newest first
    pub fn format_recent_logs(&self, entries: &[String]) -> String {
        let mut out = vec![self.dim.apply_to("Recent log entries:").to_string()];
        out.extend(entries.iter().rev().map(|e| format!("  {}", e)));
        out.join("\n")
    }

    pub fn print_recent_logs(&self, entries: &[String]) {
        if entries.is_empty() {
            return;
        }
        eprintln!("{}", self.format_recent_logs(entries));
    }

    /// Print the effective configuration
    pub fn print_config(&self, config: &Config, source: Option<&std::path::Path>) {
        println!();
        println!("{}", self.bold.apply_to("Current Configuration:"));
        match source {
            Some(path) => println!("- File: {}", self.green.apply_to(path.display())),
            None => println!("- File: {}", self.dim.apply_to("(defaults)")),
        }
        println!("- Server: {}", self.green.apply_to(&config.server.url));
        println!("- Output format: {}", config.session.output_format);
        println!("- Classifier: {}", config.session.classifier);
        println!("- Log level: {}", config.logging.level);
        if let Some(file) = config.logging.resolved_file() {
            println!("- Log file: {}", file.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> OutputFormatter {
        console::set_colors_enabled(false);
        OutputFormatter::new()
    }

    #[test]
    fn test_progress_lines_are_verbatim() {
        let f = plain();
        let event = SessionEvent::Progress("  🔍 Searching flights...".to_string());
        assert_eq!(f.format_event(&event).unwrap(), "  🔍 Searching flights...");
        assert!(f
            .format_event(&SessionEvent::SelectionRequested("x".to_string()))
            .is_none());
        assert!(f.format_event(&SessionEvent::Completed("x".to_string())).is_none());
    }

    #[test]
    fn test_render_itinerary() {
        let f = plain();
        let rendered = f.render_itinerary("# Paris Trip\n## **Day 1**\n- Louvre\n  * Lunch\nFree evening");
        assert_eq!(
            rendered,
            "PARIS TRIP\nDay 1\n  • Louvre\n    • Lunch\nFree evening"
        );
    }

    #[test]
    fn test_recent_logs_read_oldest_first() {
        let f = plain();
        let entries = vec!["[WARN] reset".to_string(), "[INFO] connecting".to_string()];
        assert_eq!(
            f.format_recent_logs(&entries),
            "Recent log entries:\n  [INFO] connecting\n  [WARN] reset"
        );
    }

    #[test]
    fn test_closed_message_mentions_reason() {
        let f = plain();
        let line = f
            .format_event(&SessionEvent::Closed {
                reason: Some("server restarting".to_string()),
            })
            .unwrap();
        assert!(line.ends_with("server restarting"));
    }
}
