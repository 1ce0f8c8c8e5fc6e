//! Wire vocabulary shared by the itinerary server and this client.
//!
//! The server narrates in plain text; two literal markers embedded in that
//! text carry all the control information. An optional JSON frame format
//! carries the same three kinds explicitly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix that marks the terminal itinerary payload.
pub const TERMINAL_SENTINEL: &str = "Itinerary generated successfully!";

/// Substring that marks a line asking the user to pick an option.
pub const SELECTION_PROMPT_MARKER: &str = "Please review the options and select the correct option";

/// Courtesy line the server sends after the terminal payload, right before closing.
pub const COMPLETION_NOTICE: &str = "✔️ Itinerary planning completed.";

/// Requested output format, forwarded to the server untouched.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Pdf => write!(f, "pdf"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format '{}' (expected pdf or markdown)", other)),
        }
    }
}

/// First frame on every connection. The server reads it before it starts
/// pushing progress.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub destination: String,
    pub travel_date: String,
    pub output_format: OutputFormat,
}

impl StartRequest {
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Structured inbound frame: `{"kind": "...", "payload": "..."}`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum ServerFrame {
    Progress(String),
    Prompt(String),
    Terminal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_request_uses_server_field_names() {
        let req = StartRequest {
            destination: "Paris".to_string(),
            travel_date: "2024-06-01".to_string(),
            output_format: OutputFormat::Markdown,
        };
        let value: serde_json::Value = serde_json::from_str(&req.to_frame().unwrap()).unwrap();
        assert_eq!(value["destination"], "Paris");
        assert_eq!(value["travelDate"], "2024-06-01");
        assert_eq!(value["outputFormat"], "markdown");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("PDF".parse::<OutputFormat>().unwrap(), OutputFormat::Pdf);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert!("docx".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Pdf);
    }

    #[test]
    fn test_server_frame_shape() {
        let frame: ServerFrame =
            serde_json::from_str(r##"{"kind":"terminal","payload":"# Trip"}"##).unwrap();
        assert_eq!(frame, ServerFrame::Terminal("# Trip".to_string()));
        assert!(serde_json::from_str::<ServerFrame>(r#"{"kind":"other","payload":"x"}"#).is_err());
    }
}
