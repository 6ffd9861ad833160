//! Group Pruning
//!
//! Runs after feature resolution. Groups may only name constants that
//! survived it, and a group left with no members is dropped.

use std::collections::BTreeMap;
use tracing::info;

use crate::registry::{Registry, TypeGroup};

/// Produce a registry whose groups reference only live enum constants
pub fn prune_groups(registry: &Registry) -> Registry {
    let groups: BTreeMap<String, TypeGroup> = registry
        .groups()
        .values()
        .filter_map(|group| {
            let members = group
                .members
                .iter()
                .filter(|member| registry.get_enum(member).is_some())
                .cloned()
                .collect();
            let pruned = TypeGroup {
                name: group.name.clone(),
                members,
            };
            (!pruned.is_empty()).then(|| (pruned.name.clone(), pruned))
        })
        .collect();

    info!(
        kept = groups.len(),
        dropped = registry.groups().len() - groups.len(),
        "Pruned groups"
    );

    registry.with_groups(groups)
}
