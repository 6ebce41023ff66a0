//! Narrative text from an external text-generation service.
//!
//! Narrative is supplementary: it never feeds back into the numeric
//! scores, and its absence leaves the dashboard fully usable.
//!
//! Each subject (team gaps, per-staff recommendations, ...) can have
//! several requests in flight. Tickets carry a per-desk sequence number
//! and only the latest-issued ticket for a subject may write its state,
//! so a slow old response can never overwrite a newer one.

mod coordinator;
pub mod prompts;

pub use coordinator::{NarrativeCoordinator, OfflineGenerator, TextGenerator};

use crate::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// The response shape a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedShape {
    Text,
    List,
    Map,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeRequest {
    pub prompt: String,
    pub shape:  ExpectedShape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum NarrativePayload {
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl NarrativePayload {
    /// Interpret raw service output as `shape`.
    /// Structured shapes must be JSON, optionally inside a ``` fence.
    pub fn parse(raw: &str, shape: ExpectedShape) -> DeskResult<Self> {
        let body = strip_code_fence(raw);
        match shape {
            ExpectedShape::Text => {
                if body.is_empty() {
                    Err(DeskError::NarrativeUnavailable { reason: "empty response".into() })
                } else {
                    Ok(Self::Text(body.to_string()))
                }
            }
            ExpectedShape::List => Ok(Self::List(serde_json::from_str(body)?)),
            ExpectedShape::Map  => Ok(Self::Map(serde_json::from_str(body)?)),
        }
    }

    /// The entry for `key` in a map payload.
    pub fn lookup(&self, key: &str) -> Option<&str> {
        match self {
            Self::Map(map) => map.get(key).map(String::as_str),
            _ => None,
        }
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence line.
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// What a piece of narrative is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "subject", content = "key", rename_all = "snake_case")]
pub enum Subject {
    TeamGaps,
    TeamStrengths,
    StaffRecommendations,
    GapInsights,
    WorkloadReasoning,
    /// Distractors for one assessment question, by question id.
    Question(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NarrativeState {
    /// Never requested.
    Idle,
    Pending,
    Ready { payload: NarrativePayload },
    Unavailable { reason: String },
}

impl NarrativeState {
    pub fn payload(&self) -> Option<&NarrativePayload> {
        match self {
            Self::Ready { payload } => Some(payload),
            _ => None,
        }
    }

    /// Text to show in place of missing narrative.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Self::Idle | Self::Pending => "Analysis pending...",
            Self::Unavailable { .. }   => "Narrative unavailable",
            Self::Ready { .. }         => "",
        }
    }
}

/// Proof of issuance for one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub subject:  Subject,
    pub sequence: u64,
}

/// Narrative state per subject, with last-issued-wins ordering.
#[derive(Debug, Default)]
pub struct NarrativeBoard {
    next_sequence: u64,
    latest:        HashMap<Subject, u64>,
    states:        HashMap<Subject, NarrativeState>,
}

impl NarrativeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new request and mark the subject pending.
    pub fn begin(&mut self, subject: Subject) -> Ticket {
        self.next_sequence += 1;
        let sequence = self.next_sequence;
        self.latest.insert(subject.clone(), sequence);
        self.states.insert(subject.clone(), NarrativeState::Pending);
        Ticket { subject, sequence }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        self.latest.get(&ticket.subject) == Some(&ticket.sequence)
    }

    /// Apply a finished request. Returns false, and changes nothing, if a
    /// newer ticket for the same subject has been issued since.
    pub fn complete(&mut self, ticket: &Ticket, outcome: DeskResult<NarrativePayload>) -> bool {
        if !self.is_current(ticket) {
            log::debug!(
                "discarding stale narrative for {:?} (seq {})",
                ticket.subject,
                ticket.sequence
            );
            return false;
        }
        let state = match outcome {
            Ok(payload) => NarrativeState::Ready { payload },
            Err(e) => NarrativeState::Unavailable { reason: e.to_string() },
        };
        self.states.insert(ticket.subject.clone(), state);
        true
    }

    pub fn state(&self, subject: &Subject) -> NarrativeState {
        self.states.get(subject).cloned().unwrap_or(NarrativeState::Idle)
    }
}
