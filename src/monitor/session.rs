//! Lifecycle of one scrape-job socket as a pure state machine.
//!
//! `Idle → Connecting → Streaming → Closed(..)`. A session never goes back to
//! `Connecting`; retrying a job means submitting a new scrape. Every input
//! returns the [`Effect`]s the driver must perform, which keeps the protocol
//! rules testable without a socket.

use std::time::Duration;

use tracing::warn;

use super::protocol::{self, Decoded, Terminal};
use crate::models::JobId;
use crate::ui::ToastLevel;

#[derive(Debug, Clone, PartialEq)]
pub enum Closure {
    Success,
    Failure(String),
    ConnectionError(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    Connecting,
    Streaming,
    Closed(Closure),
}

/// Side effect requested by the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Log(String),
    /// Clamped progress percentage.
    Progress(f64),
    Toast(ToastLevel, String),
    CloseSocket,
    /// Remove the job from the active-connections registry.
    Unregister,
    /// Refresh seasons, listings and stats once after `delay`.
    ScheduleRefresh(Duration),
}

#[derive(Debug, Clone)]
pub struct JobSession {
    job_id: JobId,
    phase: Phase,
    percent: Option<f64>,
    refresh_delay: Duration,
}

impl JobSession {
    pub fn new(job_id: JobId, refresh_delay: Duration) -> Self {
        Self {
            job_id,
            phase: Phase::Idle,
            percent: None,
            refresh_delay,
        }
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Last progress value applied, if any.
    pub fn percent(&self) -> Option<f64> {
        self.percent
    }

    pub fn closure(&self) -> Option<&Closure> {
        match &self.phase {
            Phase::Closed(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed(_))
    }

    pub fn connect(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Idle {
            return Vec::new();
        }
        self.phase = Phase::Connecting;
        vec![Effect::Log(format!("Connecting to job {}...", self.job_id))]
    }

    pub fn opened(&mut self) -> Vec<Effect> {
        if self.is_closed() {
            return Vec::new();
        }
        self.phase = Phase::Streaming;
        vec![Effect::Log("✓ Connected".to_string())]
    }

    /// Handle one text frame. Malformed JSON is logged and dropped; frames
    /// arriving after a terminal outcome are ignored.
    pub fn receive(&mut self, text: &str) -> Vec<Effect> {
        if self.is_closed() {
            return Vec::new();
        }
        match protocol::decode(text) {
            Ok(decoded) => self.apply(decoded),
            Err(e) => {
                warn!(job_id = %self.job_id, error = %e, "discarding malformed job message");
                Vec::new()
            }
        }
    }

    /// The socket could not be opened, or errored mid-stream.
    pub fn connection_failed(&mut self, reason: &str) -> Vec<Effect> {
        if self.is_closed() {
            return Vec::new();
        }
        self.phase = Phase::Closed(Closure::ConnectionError(reason.to_string()));
        vec![
            Effect::Log(format!("⚠️ Connection error: {reason}")),
            Effect::Unregister,
        ]
    }

    /// The socket is gone. Ends the session if no terminal message arrived.
    pub fn disconnected(&mut self) -> Vec<Effect> {
        let mut effects = vec![Effect::Log("Disconnected".to_string())];
        if !self.is_closed() {
            self.phase = Phase::Closed(Closure::ConnectionError(
                "connection closed before the job finished".to_string(),
            ));
            effects.push(Effect::Unregister);
        }
        effects
    }

    fn apply(&mut self, decoded: Decoded) -> Vec<Effect> {
        if self.phase == Phase::Idle || self.phase == Phase::Connecting {
            self.phase = Phase::Streaming;
        }

        let mut effects = Vec::new();

        if let Some(progress) = decoded.progress {
            if let Some(raw) = progress.percent {
                let clamped = protocol::clamp_percent(raw);
                self.percent = Some(clamped);
                effects.push(Effect::Progress(clamped));
            }
            if let Some(log) = progress.log {
                effects.push(Effect::Log(log));
            }
            if let Some(step) = progress.step {
                effects.push(Effect::Log(format!("⚙️ {step}")));
            }
        }

        if let Some(terminal) = decoded.terminal {
            effects.extend(self.finish(terminal));
        }

        effects
    }

    fn finish(&mut self, terminal: Terminal) -> Vec<Effect> {
        let job = &self.job_id;
        match terminal {
            Terminal::Completed { legacy } => {
                let line = if legacy {
                    "✓ Job finished".to_string()
                } else {
                    "✅ Job completed successfully".to_string()
                };
                let effects = vec![
                    Effect::Log(line),
                    Effect::Toast(ToastLevel::Success, format!("Job {job} completed")),
                    Effect::CloseSocket,
                    Effect::Unregister,
                    Effect::ScheduleRefresh(self.refresh_delay),
                ];
                self.phase = Phase::Closed(Closure::Success);
                effects
            }
            Terminal::Failed { reason, legacy } => {
                let line = if legacy {
                    format!("✗ Job failed: {reason}")
                } else {
                    format!("❌ Error: {reason}")
                };
                let effects = vec![
                    Effect::Log(line),
                    Effect::Toast(ToastLevel::Danger, format!("Job {job} failed")),
                    Effect::CloseSocket,
                    Effect::Unregister,
                ];
                self.phase = Phase::Closed(Closure::Failure(reason));
                effects
            }
        }
    }
}
