use crate::domain::models::{
    AllowEntry, ChangeKind, ClassifiedChange, CompatReport, DiffResult, PolicyConfig, Severity,
    Symbol,
};

/// Assigns a severity to every diff entry. Defaults are conservative:
/// removals and changes are breaking, additions are not. Only an explicit
/// allow-list entry downgrades a removal or change, and its justification
/// is recorded in the entry reason.
pub fn classify(diff: &DiffResult, policy: &PolicyConfig) -> CompatReport {
    let mut entries = Vec::new();

    for symbol in &diff.removed {
        entries.push(classify_entry(policy, symbol, ChangeKind::Removed));
    }
    for (_, current) in &diff.changed {
        entries.push(classify_entry(policy, current, ChangeKind::Changed));
    }
    for symbol in &diff.added {
        entries.push(ClassifiedChange {
            symbol: symbol.name.clone(),
            kind: symbol.kind,
            change: ChangeKind::Added,
            severity: Severity::NonBreaking,
            reason: format!("added: {}", symbol.identity()),
        });
    }

    let breaking_count = entries
        .iter()
        .filter(|e| e.severity == Severity::Breaking)
        .count();
    CompatReport {
        entries,
        breaking_count,
        unchanged_count: diff.unchanged.len(),
    }
}

fn classify_entry(policy: &PolicyConfig, symbol: &Symbol, change: ChangeKind) -> ClassifiedChange {
    match allow_entry_for(policy, symbol) {
        Some(allow) => ClassifiedChange {
            symbol: symbol.name.clone(),
            kind: symbol.kind,
            change,
            severity: Severity::NonBreaking,
            reason: format!(
                "allowed {}: {}: {}",
                change_noun(change),
                symbol.identity(),
                allow.justification
            ),
        },
        None => ClassifiedChange {
            symbol: symbol.name.clone(),
            kind: symbol.kind,
            change,
            severity: Severity::Breaking,
            reason: format!("{}: {}", change.as_str(), symbol.identity()),
        },
    }
}

fn change_noun(change: ChangeKind) -> &'static str {
    match change {
        ChangeKind::Removed => "removal",
        ChangeKind::Changed => "change",
        ChangeKind::Added => "addition",
    }
}

fn allow_entry_for<'a>(policy: &'a PolicyConfig, symbol: &Symbol) -> Option<&'a AllowEntry> {
    policy
        .allow
        .iter()
        .find(|a| a.symbol == symbol.name && a.kind == symbol.kind)
}
