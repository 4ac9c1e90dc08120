use crate::domain::errors::GateError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Serialize)]
pub struct JsonOut<T: Serialize> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Data,
    Alias,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Data => "data",
            SymbolKind::Alias => "alias",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Hidden,
}

/// One exported symbol as observed in a binary artifact or a stored snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub visibility: Visibility,
    pub fingerprint: String,
    #[serde(default)]
    pub low_confidence: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introduced_in: Option<String>,
}

impl Symbol {
    pub fn identity(&self) -> SymbolId {
        SymbolId {
            kind: self.kind,
            name: self.name.clone(),
        }
    }
}

/// Symbol identity: two symbols are "the same" across snapshots iff
/// `(name, kind)` matches. Ordered by `(kind, name)` ascending, which is
/// also the snapshot file sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SymbolId {
    pub kind: SymbolKind,
    pub name: String,
}

impl Ord for SymbolId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.kind.as_str(), &self.name).cmp(&(other.kind.as_str(), &other.name))
    }
}

impl PartialOrd for SymbolId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind.as_str())
    }
}

/// Order-independent collection of symbols with unique identities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolSet {
    symbols: BTreeMap<SymbolId, Symbol>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a symbol. Re-inserting an identical record is a no-op; the
    /// same identity with a different fingerprint is a conflict.
    pub fn insert(&mut self, symbol: Symbol) -> Result<(), GateError> {
        let id = symbol.identity();
        match self.symbols.get(&id) {
            Some(existing) if existing.fingerprint != symbol.fingerprint => {
                Err(GateError::SymbolSetConflict(id.to_string()))
            }
            Some(_) => Ok(()),
            None => {
                self.symbols.insert(id, symbol);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &SymbolId) -> Option<&Symbol> {
        self.symbols.get(id)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in `(kind, name)` order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    pub fn to_sorted_vec(&self) -> Vec<Symbol> {
        self.symbols.values().cloned().collect()
    }

    pub fn from_symbols(symbols: &[Symbol]) -> Result<Self, GateError> {
        let mut set = Self::new();
        for s in symbols {
            set.insert(s.clone())?;
        }
        Ok(set)
    }
}

/// Stored snapshot of an exported symbol surface, keyed by release tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineSnapshot {
    pub release_tag: String,
    pub upstream_commit: String,
    pub created_at: u64,
    pub version: u32,
    pub symbols: Vec<Symbol>,
}

impl BaselineSnapshot {
    pub fn symbol_set(&self) -> Result<SymbolSet, GateError> {
        SymbolSet::from_symbols(&self.symbols)
    }
}

/// The authoritative record of which upstream state the working tree
/// corresponds to. Written by the external upstream-sync procedure and
/// read-only here; parsed exactly (unknown fields are rejected).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SyncRecord {
    pub remote_url: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub commit: String,
    pub verified_at: String,
}

/// Partition of the union of two symbol sets by identity.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    pub added: Vec<Symbol>,
    pub removed: Vec<Symbol>,
    pub changed: Vec<(Symbol, Symbol)>,
    pub unchanged: Vec<Symbol>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Pass,
    Fail,
    Skipped,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseDecision {
    pub tag: String,
    pub outcome: Outcome,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Changed,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Changed => "changed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Breaking,
    NonBreaking,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Breaking => "breaking",
            Severity::NonBreaking => "non-breaking",
        }
    }
}

/// One diff entry after policy classification.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedChange {
    pub symbol: String,
    pub kind: SymbolKind,
    pub change: ChangeKind,
    pub severity: Severity,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompatReport {
    pub entries: Vec<ClassifiedChange>,
    pub breaking_count: usize,
    pub unchanged_count: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PolicyConfig {
    #[serde(default)]
    pub allow: Vec<AllowEntry>,
}

/// One auditable exception: the named identity may be removed or changed
/// without breaking the gate. The justification is copied into the
/// decision reasons.
#[derive(Debug, Clone, Deserialize)]
pub struct AllowEntry {
    pub symbol: String,
    pub kind: SymbolKind,
    pub justification: String,
}

#[derive(Debug, Serialize)]
pub struct BaselineListItem {
    pub release_tag: String,
    pub version: u32,
    pub created_at: u64,
    pub symbol_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SyncStatusReport {
    pub remote_url: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub commit: String,
    pub verified_at: String,
    pub status: String,
}
