use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Important,
    Minor,
}

/// A problem surfaced during a wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Where the issue came from (wave name, agent name, ...).
    pub source: String,
}

impl Issue {
    pub fn new(severity: Severity, message: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: None,
            line: None,
            source: source.into(),
        }
    }

    pub fn with_location(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.file = Some(file.into());
        self.line = line;
        self
    }
}

/// A recorded choice, stamped with the wave it was made in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub description: String,
    pub rationale: String,
    pub wave_number: u32,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// State accumulated across waves.
///
/// A context is exclusively owned by the orchestration run building it.
/// `advance()` produces an independent deep copy for the next wave — the
/// prior value stays valid as a frozen snapshot, which makes "advancing never
/// loses history" a structural property rather than a convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveContext {
    wave_number: u32,
    files_created: BTreeSet<String>,
    files_modified: BTreeSet<String>,
    patterns_used: BTreeSet<String>,
    test_status: BTreeMap<String, TestStatus>,
    issues: Vec<Issue>,
    decisions: Vec<Decision>,
}

impl WaveContext {
    /// Fresh context at wave 0, before any wave has run.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    pub fn files_created(&self) -> &BTreeSet<String> {
        &self.files_created
    }

    pub fn files_modified(&self) -> &BTreeSet<String> {
        &self.files_modified
    }

    pub fn patterns_used(&self) -> &BTreeSet<String> {
        &self.patterns_used
    }

    pub fn test_status(&self) -> &BTreeMap<String, TestStatus> {
        &self.test_status
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Idempotent: recording the same file twice is a no-op.
    pub fn record_file_created(&mut self, path: impl Into<String>) {
        self.files_created.insert(path.into());
    }

    pub fn record_file_modified(&mut self, path: impl Into<String>) {
        self.files_modified.insert(path.into());
    }

    pub fn record_pattern(&mut self, pattern: impl Into<String>) {
        self.patterns_used.insert(pattern.into());
    }

    pub fn update_test_status(&mut self, name: impl Into<String>, status: TestStatus) {
        self.test_status.insert(name.into(), status);
    }

    pub fn add_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Records a decision stamped with the current wave number.
    pub fn record_decision(&mut self, description: impl Into<String>, rationale: impl Into<String>) {
        self.decisions.push(Decision {
            description: description.into(),
            rationale: rationale.into(),
            wave_number: self.wave_number,
            recorded_at: Utc::now(),
        });
    }

    /// New context for the next wave: wave number incremented, every
    /// collection independently copied. The value this was called on keeps
    /// its state untouched.
    #[must_use]
    pub fn advance(&self) -> WaveContext {
        let mut next = self.clone();
        next.wave_number += 1;
        next
    }

    pub fn critical_issues(&self) -> Vec<&Issue> {
        self.issues_with(Severity::Critical)
    }

    pub fn important_issues(&self) -> Vec<&Issue> {
        self.issues_with(Severity::Important)
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == Severity::Critical)
    }

    fn issues_with(&self, severity: Severity) -> Vec<&Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_increments_and_copies_independently() {
        let mut ctx = WaveContext::new();
        ctx.record_file_created("src/api.rs");
        ctx.record_pattern("repository");
        ctx.add_issue(Issue::new(Severity::Minor, "nit", "wave 0"));

        let mut next = ctx.advance();
        assert_eq!(next.wave_number(), 1);
        assert_eq!(ctx.wave_number(), 0);

        next.record_file_created("src/db.rs");
        next.add_issue(Issue::new(Severity::Critical, "broken", "wave 1"));

        // the snapshot never sees additions made to the advanced copy
        assert_eq!(ctx.files_created().len(), 1);
        assert_eq!(ctx.issues().len(), 1);
        assert_eq!(next.files_created().len(), 2);
        assert_eq!(next.issues().len(), 2);

        // nothing previously recorded was lost
        assert!(next.files_created().contains("src/api.rs"));
        assert!(next.patterns_used().contains("repository"));
    }

    #[test]
    fn set_like_fields_are_idempotent() {
        let mut ctx = WaveContext::new();
        ctx.record_file_created("a.rs");
        ctx.record_file_created("a.rs");
        ctx.record_file_modified("b.rs");
        ctx.record_file_modified("b.rs");
        assert_eq!(ctx.files_created().len(), 1);
        assert_eq!(ctx.files_modified().len(), 1);
    }

    #[test]
    fn issue_filters_by_severity() {
        let mut ctx = WaveContext::new();
        ctx.add_issue(Issue::new(Severity::Critical, "c", "x"));
        ctx.add_issue(Issue::new(Severity::Important, "i1", "x"));
        ctx.add_issue(Issue::new(Severity::Important, "i2", "x"));
        ctx.add_issue(Issue::new(Severity::Minor, "m", "x"));

        assert_eq!(ctx.critical_issues().len(), 1);
        assert_eq!(ctx.important_issues().len(), 2);
        assert!(ctx.has_critical_issues());
    }

    #[test]
    fn decisions_are_stamped_with_the_current_wave() {
        let ctx = WaveContext::new();
        let mut wave2 = ctx.advance().advance();
        wave2.record_decision("use sqlite", "single-node deployment");
        assert_eq!(wave2.decisions()[0].wave_number, 2);
    }

    #[test]
    fn test_status_updates_replace_prior_entries() {
        let mut ctx = WaveContext::new();
        ctx.update_test_status("auth::login", TestStatus::Failed);
        ctx.update_test_status("auth::login", TestStatus::Passed);
        assert_eq!(
            ctx.test_status().get("auth::login"),
            Some(&TestStatus::Passed)
        );
    }
}
