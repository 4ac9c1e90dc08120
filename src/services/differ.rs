use crate::domain::models::{DiffResult, SymbolSet};

/// Identity-keyed diff of two symbol sets. The four output parts partition
/// the union of both inputs; `diff(a, b).added == diff(b, a).removed` holds
/// by construction. Fingerprints are compared literally: low confidence on
/// either side neither hides nor forces a change.
pub fn diff(baseline: &SymbolSet, current: &SymbolSet) -> DiffResult {
    let mut out = DiffResult::default();

    for symbol in current.iter() {
        match baseline.get(&symbol.identity()) {
            None => out.added.push(symbol.clone()),
            Some(old) if old.fingerprint == symbol.fingerprint => {
                out.unchanged.push(symbol.clone())
            }
            Some(old) => out.changed.push((old.clone(), symbol.clone())),
        }
    }

    for symbol in baseline.iter() {
        if current.get(&symbol.identity()).is_none() {
            out.removed.push(symbol.clone());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Symbol, SymbolKind, Visibility};

    fn sym(name: &str, kind: SymbolKind, fingerprint: &str) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            visibility: Visibility::Public,
            fingerprint: fingerprint.to_string(),
            low_confidence: false,
            introduced_in: None,
        }
    }

    fn set(symbols: &[Symbol]) -> SymbolSet {
        SymbolSet::from_symbols(symbols).unwrap()
    }

    #[test]
    fn diff_against_self_is_all_unchanged() {
        let a = set(&[
            sym("lrtc_init", SymbolKind::Function, "f1"),
            sym("lrtc_version", SymbolKind::Data, "d1"),
        ]);
        let d = diff(&a, &a);
        assert!(d.added.is_empty());
        assert!(d.removed.is_empty());
        assert!(d.changed.is_empty());
        assert_eq!(d.unchanged.len(), 2);
    }

    #[test]
    fn added_and_removed_swap_under_argument_reversal() {
        let a = set(&[
            sym("lrtc_init", SymbolKind::Function, "f1"),
            sym("lrtc_old", SymbolKind::Function, "f2"),
        ]);
        let b = set(&[
            sym("lrtc_init", SymbolKind::Function, "f1"),
            sym("lrtc_new", SymbolKind::Function, "f3"),
        ]);
        let ab = diff(&a, &b);
        let ba = diff(&b, &a);
        assert_eq!(ab.added, ba.removed);
        assert_eq!(ab.removed, ba.added);
    }

    #[test]
    fn baseline_foo_bar_vs_current_foo_baz() {
        let baseline = set(&[
            sym("foo", SymbolKind::Function, "f"),
            sym("bar", SymbolKind::Data, "d"),
        ]);
        let current = set(&[
            sym("foo", SymbolKind::Function, "f"),
            sym("baz", SymbolKind::Function, "g"),
        ]);
        let d = diff(&baseline, &current);
        assert_eq!(d.added.len(), 1);
        assert_eq!(d.added[0].name, "baz");
        assert_eq!(d.removed.len(), 1);
        assert_eq!(d.removed[0].name, "bar");
        assert_eq!(d.unchanged.len(), 1);
        assert_eq!(d.unchanged[0].name, "foo");
        assert!(d.changed.is_empty());
    }

    #[test]
    fn same_identity_with_different_fingerprint_is_changed() {
        let baseline = set(&[sym("lrtc_version", SymbolKind::Data, "d1")]);
        let current = set(&[sym("lrtc_version", SymbolKind::Data, "d2")]);
        let d = diff(&baseline, &current);
        assert_eq!(d.changed.len(), 1);
        assert_eq!(d.changed[0].0.fingerprint, "d1");
        assert_eq!(d.changed[0].1.fingerprint, "d2");
        assert!(d.added.is_empty() && d.removed.is_empty() && d.unchanged.is_empty());
    }

    #[test]
    fn same_name_different_kind_is_not_the_same_identity() {
        let baseline = set(&[sym("lrtc_state", SymbolKind::Data, "d1")]);
        let current = set(&[sym("lrtc_state", SymbolKind::Function, "f1")]);
        let d = diff(&baseline, &current);
        assert_eq!(d.added.len(), 1);
        assert_eq!(d.removed.len(), 1);
        assert!(d.changed.is_empty());
    }
}
