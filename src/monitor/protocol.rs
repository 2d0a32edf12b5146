//! Decoder for scrape-job progress messages.
//!
//! Two message shapes are in circulation. Current backends tag messages with
//! `type` (`progress`, `done`, `error`); older ones only send a `status`
//! string (`done`/`completed` or `error`/`failed`). [`decode`] folds both into
//! one [`Decoded`] value, so a message carrying both markers still yields a
//! single terminal outcome.

use serde_json::Value;

/// Non-terminal update carried by a `progress` message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    /// Raw percent as sent; clamp with [`clamp_percent`] before display.
    pub percent: Option<f64>,
    pub log: Option<String>,
    /// `job.current_step`
    pub step: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    Completed {
        /// Signalled through the untagged `status` field.
        legacy: bool,
    },
    Failed {
        reason: String,
        legacy: bool,
    },
}

impl Terminal {
    pub fn is_success(&self) -> bool {
        matches!(self, Terminal::Completed { .. })
    }
}

/// One inbound message, normalised.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub progress: Option<Progress>,
    pub terminal: Option<Terminal>,
}

pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Decode one text frame.
///
/// Fails only on malformed JSON. Valid JSON that matches neither schema
/// decodes to an empty [`Decoded`].
pub fn decode(text: &str) -> Result<Decoded, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    let kind = value.get("type").and_then(Value::as_str);

    let progress = (kind == Some("progress")).then(|| Progress {
        percent: value.get("percent").and_then(Value::as_f64),
        log: non_empty_str(value.get("log")),
        step: non_empty_str(value.get("job").and_then(|j| j.get("current_step"))),
    });

    let typed = match kind {
        Some("done") => Some(Terminal::Completed { legacy: false }),
        Some("error") => {
            let reason = non_empty_str(value.get("job").and_then(|j| j.get("error")))
                .or_else(|| non_empty_str(value.get("message")))
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            Some(Terminal::Failed {
                reason,
                legacy: false,
            })
        }
        _ => None,
    };

    let terminal = typed.or_else(|| {
        match value.get("status").and_then(Value::as_str) {
            Some("done") | Some("completed") => Some(Terminal::Completed { legacy: true }),
            Some(status @ ("error" | "failed")) => Some(Terminal::Failed {
                reason: status.to_string(),
                legacy: true,
            }),
            _ => None,
        }
    });

    Ok(Decoded { progress, terminal })
}

/// Clamp a progress percentage into `0..=100`.
pub fn clamp_percent(percent: f64) -> f64 {
    percent.clamp(0.0, 100.0)
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
