//! Analysis Context
//!
//! Per-run mutable state. A fresh context is built for every analysis call and
//! threaded through the passes by `&mut`; nothing here outlives the run.

use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};

use crate::config::RuleConfig;
use crate::diagnostics::Issue;

/// schema name -> names it references directly
pub type DependencyMap = IndexMap<String, BTreeSet<String>>;

#[derive(Debug, Default)]
pub struct AnalysisContext {
    issues: Vec<Issue>,
    /// Lowercased operation ids seen so far
    operation_ids: HashSet<String>,
    dependencies: DependencyMap,
    /// Canonical keys of cycles already reported
    reported_cycles: HashSet<String>,
    rules: RuleConfig,
}

impl AnalysisContext {
    pub fn new(rules: RuleConfig) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    /// Add an issue
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn issue_count(&self) -> usize {
        self.issues.len()
    }

    /// Record an operation id; `false` if it was already claimed
    /// (case-insensitive)
    pub fn claim_operation_id(&mut self, operation_id: &str) -> bool {
        self.operation_ids.insert(operation_id.to_lowercase())
    }

    /// Make sure `schema` has an entry, even with no outgoing edges
    pub fn register_schema(&mut self, schema: &str) {
        self.dependencies.entry(schema.to_string()).or_default();
    }

    pub fn add_dependency(&mut self, from: &str, to: &str) {
        self.dependencies
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    pub fn dependencies(&self) -> &DependencyMap {
        &self.dependencies
    }

    /// Record a cycle key; `false` if that cycle was already reported
    pub fn claim_cycle(&mut self, key: &str) -> bool {
        self.reported_cycles.insert(key.to_string())
    }

    /// Consume the context, yielding the issues in emission order
    pub fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}
