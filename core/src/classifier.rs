//! Inbound message classification
//!
//! Every server message is tagged as a selection prompt, the terminal
//! itinerary payload, or plain progress narration. Classification is pure;
//! applying the tag to a session is the controller's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::protocol::{ServerFrame, SELECTION_PROMPT_MARKER, TERMINAL_SENTINEL};

/// Tag assigned to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The server is waiting for one line of user input. Carries the text to
    /// show in the log, since a prompt is informational as well.
    Prompt(String),
    /// Final itinerary source with the sentinel removed and whitespace trimmed.
    Terminal(String),
    /// Ordinary narration, displayed verbatim.
    Progress(String),
}

/// Seam for swapping the wire format without touching the controller.
pub trait MessageClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    fn classify(&self, line: &str) -> Classification;
}

/// Classify a plain-text line by its embedded markers.
///
/// Terminal wins over Prompt: a line that starts with the sentinel is the
/// payload even if the payload mentions the prompt marker.
pub fn classify(line: &str) -> Classification {
    if let Some(rest) = line.strip_prefix(TERMINAL_SENTINEL) {
        return Classification::Terminal(rest.trim().to_string());
    }
    if line.contains(SELECTION_PROMPT_MARKER) {
        return Classification::Prompt(line.to_string());
    }
    Classification::Progress(line.to_string())
}

/// Marker-sniffing classifier matching historical server output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SentinelClassifier;

impl MessageClassifier for SentinelClassifier {
    fn name(&self) -> &'static str {
        "sentinel"
    }

    fn classify(&self, line: &str) -> Classification {
        classify(line)
    }
}

/// Reads `{"kind", "payload"}` frames. Anything that does not parse as a
/// frame is handed to the marker rules, so plain-text servers keep working.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvelopeClassifier;

impl MessageClassifier for EnvelopeClassifier {
    fn name(&self) -> &'static str {
        "envelope"
    }

    fn classify(&self, line: &str) -> Classification {
        match serde_json::from_str::<ServerFrame>(line) {
            Ok(ServerFrame::Terminal(payload)) => Classification::Terminal(payload.trim().to_string()),
            Ok(ServerFrame::Prompt(text)) => Classification::Prompt(text),
            Ok(ServerFrame::Progress(text)) => Classification::Progress(text),
            Err(_) => classify(line),
        }
    }
}

/// Which classifier a session uses; set in config.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    #[default]
    Sentinel,
    Envelope,
}

impl ClassifierMode {
    pub fn build(self) -> Box<dyn MessageClassifier> {
        match self {
            ClassifierMode::Sentinel => Box::new(SentinelClassifier),
            ClassifierMode::Envelope => Box::new(EnvelopeClassifier),
        }
    }
}

impl fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierMode::Sentinel => write!(f, "sentinel"),
            ClassifierMode::Envelope => write!(f, "envelope"),
        }
    }
}

impl FromStr for ClassifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentinel" => Ok(ClassifierMode::Sentinel),
            "envelope" => Ok(ClassifierMode::Envelope),
            other => Err(format!("unknown classifier '{}' (expected sentinel or envelope)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_is_prefix_anchored() {
        assert_eq!(
            classify("Itinerary generated successfully!ABC"),
            Classification::Terminal("ABC".to_string())
        );
        assert_eq!(
            classify("xItinerary generated successfully!ABC"),
            Classification::Progress("xItinerary generated successfully!ABC".to_string())
        );
    }

    #[test]
    fn test_terminal_payload_is_trimmed() {
        assert_eq!(
            classify("Itinerary generated successfully!\n# Paris Trip\n- Day 1: ...\n"),
            Classification::Terminal("# Paris Trip\n- Day 1: ...".to_string())
        );
        assert_eq!(
            classify("Itinerary generated successfully!"),
            Classification::Terminal(String::new())
        );
    }

    #[test]
    fn test_prompt_is_substring_match() {
        let line = "note: Please review the options and select the correct option now";
        assert_eq!(classify(line), Classification::Prompt(line.to_string()));

        // The original server phrases it "...correct cluster for ..." which
        // does not carry the marker.
        let cluster = "Please review the options and select the correct cluster for the target company.";
        assert_eq!(classify(cluster), Classification::Progress(cluster.to_string()));
    }

    #[test]
    fn test_terminal_takes_precedence_over_prompt() {
        let line = "Itinerary generated successfully! Please review the options and select the correct option";
        assert_eq!(
            classify(line),
            Classification::Terminal(
                "Please review the options and select the correct option".to_string()
            )
        );
    }

    #[test]
    fn test_progress_is_verbatim() {
        let line = "  🔍 Searching flights...  ";
        assert_eq!(classify(line), Classification::Progress(line.to_string()));
        assert_eq!(classify(""), Classification::Progress(String::new()));
    }

    #[test]
    fn test_classify_is_pure() {
        let lines = [
            "Searching flights...",
            "Please review the options and select the correct option: 1) A 2) B",
            "Itinerary generated successfully! # Trip",
        ];
        for line in lines {
            assert_eq!(classify(line), classify(line));
            assert_eq!(SentinelClassifier.classify(line), classify(line));
        }
    }

    #[test]
    fn test_envelope_frames() {
        let c = EnvelopeClassifier;
        assert_eq!(
            c.classify(r#"{"kind":"terminal","payload":"  # Trip  "}"#),
            Classification::Terminal("# Trip".to_string())
        );
        assert_eq!(
            c.classify(r#"{"kind":"prompt","payload":"1) A 2) B"}"#),
            Classification::Prompt("1) A 2) B".to_string())
        );
        assert_eq!(
            c.classify(r#"{"kind":"progress","payload":"Itinerary generated successfully! no"}"#),
            Classification::Progress("Itinerary generated successfully! no".to_string())
        );
    }

    #[test]
    fn test_envelope_falls_back_to_markers() {
        let c = EnvelopeClassifier;
        assert_eq!(
            c.classify("Itinerary generated successfully! # Trip"),
            Classification::Terminal("# Trip".to_string())
        );
        assert_eq!(
            c.classify(r#"{"kind":"unknown"}"#),
            Classification::Progress(r#"{"kind":"unknown"}"#.to_string())
        );
    }

    #[test]
    fn test_mode_builds_matching_classifier() {
        assert_eq!(ClassifierMode::default().build().name(), "sentinel");
        assert_eq!("Envelope".parse::<ClassifierMode>().unwrap().build().name(), "envelope");
        assert!("json".parse::<ClassifierMode>().is_err());
    }
}
