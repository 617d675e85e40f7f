use std::collections::HashSet;

use crate::chain::CollatorSnapshot;
use crate::registry::AddressRegistry;

/// Snapshot addresses with no registry entry, in snapshot order, each once.
pub fn detect_unknown(snapshot: &CollatorSnapshot, registry: &AddressRegistry) -> Vec<String> {
    let mut seen = HashSet::new();
    snapshot
        .addresses()
        .filter(|address| !registry.contains(address))
        .filter(|address| seen.insert(*address))
        .map(str::to_string)
        .collect()
}
