//! Merge reports.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use mfm_log::{LogSnapshot, ProvenanceLog};
use mfm_model::Document;
use mfm_types::{Severity, SourceLocation};

/// Overall outcome of a merge: the worst severity among the messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportResult {
    Success,
    Warning,
    Error,
}

impl ReportResult {
    pub fn is_success(&self) -> bool {
        *self == Self::Success
    }

    pub fn is_error(&self) -> bool {
        *self == Self::Error
    }
}

impl fmt::Display for ReportResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        })
    }
}

/// A diagnostic produced while merging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub severity: Severity,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Message {
    pub fn new(severity: Severity, text: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self {
            severity,
            text: text.into(),
            location,
        }
    }

    /// `location: text`, or just the text.
    pub fn print(&self, simple_filenames: bool) -> String {
        match &self.location {
            Some(location) => format!("{}: {}", location.print(simple_filenames), self.text),
            None => self.text.clone(),
        }
    }
}

/// Outcome of a merge: the merged document (unless the merge was aborted),
/// the provenance log, and every message in the order it was raised.
#[derive(Debug)]
pub struct MergeReport {
    result: ReportResult,
    document: Option<Document>,
    log: ProvenanceLog,
    messages: Vec<Message>,
    intermediary_stages: Vec<String>,
}

impl MergeReport {
    pub fn result(&self) -> ReportResult {
        self.result
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    /// The merged document; `None` when the merge was aborted.
    pub fn merged_document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn into_document(self) -> Option<Document> {
        self.document
    }

    pub fn log(&self) -> &ProvenanceLog {
        &self.log
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages of exactly `severity`.
    pub fn messages_of(&self, severity: Severity) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.severity == severity)
    }

    /// XML of the accumulated document after each merge step, when kept.
    pub fn intermediary_stages(&self) -> &[String] {
        &self.intermediary_stages
    }

    /// Replay every message at its severity, then the provenance log.
    pub fn log_messages(&self, simple_filenames: bool) {
        for message in &self.messages {
            let text = message.print(simple_filenames);
            match message.severity {
                Severity::Info => info!("{text}"),
                Severity::Warning => warn!("{text}"),
                Severity::Error => error!("{text}"),
            }
        }
        info!("{}", self.log.render(simple_filenames));
    }

    /// Serializable summary, with the merged document as XML.
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            result: self.result,
            messages: self.messages.clone(),
            merged: self.document.as_ref().map(Document::to_xml),
            log: self.log.snapshot(),
        }
    }
}

/// JSON-friendly view of a [`MergeReport`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub result: ReportResult,
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<String>,
    pub log: LogSnapshot,
}

/// Accumulates messages and log records while a merge runs.
#[derive(Debug, Default)]
pub struct MergeReportBuilder {
    log: ProvenanceLog,
    messages: Vec<Message>,
    intermediary_stages: Vec<String>,
}

impl MergeReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The log decisions are recorded into.
    pub fn log(&self) -> &ProvenanceLog {
        &self.log
    }

    pub fn add_info(&mut self, text: impl Into<String>, location: Option<SourceLocation>) {
        self.messages.push(Message::new(Severity::Info, text, location));
    }

    pub fn add_warning(&mut self, text: impl Into<String>, location: Option<SourceLocation>) {
        self.messages.push(Message::new(Severity::Warning, text, location));
    }

    pub fn add_error(&mut self, text: impl Into<String>, location: Option<SourceLocation>) {
        self.messages.push(Message::new(Severity::Error, text, location));
    }

    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn add_intermediary_stage(&mut self, xml: String) {
        self.intermediary_stages.push(xml);
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|m| m.severity == Severity::Warning)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Finish the report. The result is error if any error was raised,
    /// else warning if any warning was, else success.
    pub fn build(self, document: Option<Document>) -> MergeReport {
        let result = if self.has_errors() {
            ReportResult::Error
        } else if self.has_warnings() {
            ReportResult::Warning
        } else {
            ReportResult::Success
        };
        MergeReport {
            result,
            document,
            log: self.log,
            messages: self.messages,
            intermediary_stages: self.intermediary_stages,
        }
    }
}
