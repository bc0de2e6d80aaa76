//! Reconciliation of configured commands against registered and live state.
//!
//! [`reconcile`] is a pure function: it never talks to Discord and never
//! touches persisted state. Applying the plan is the job of
//! [`crate::sync::CommandSynchronizer`].

use ccmd_config::CustomCommand;
use std::collections::{BTreeSet, HashSet};

/// What a reconciliation pass has to do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan<'a> {
    /// Enabled commands, first occurrence of each name, in declaration order.
    pub desired: Vec<&'a CustomCommand>,
    /// Desired commands missing from the live set, in declaration order.
    pub to_register: Vec<&'a CustomCommand>,
    /// Names declared more than once among enabled commands.
    pub to_skip: BTreeSet<String>,
    /// Registered or live names that are no longer desired.
    pub to_delete: BTreeSet<String>,
    /// One entry per skipped occurrence, in declaration order.
    pub duplicates: Vec<String>,
}

impl ReconcilePlan<'_> {
    /// Whether the pass issues no remote calls.
    pub fn is_noop(&self) -> bool {
        self.to_register.is_empty() && self.to_delete.is_empty()
    }

    /// Names of the desired commands.
    pub fn desired_names(&self) -> BTreeSet<&str> {
        self.desired.iter().map(|command| command.name.as_str()).collect()
    }
}

/// Compares the desired commands with what was registered before and what
/// Discord currently reports.
///
/// Disabled commands are ignored, so a command that is disabled and one that
/// was removed from configuration are both deleted. Matching against the live
/// set is purely by name, which also catches commands created out of band.
pub fn reconcile<'a>(
    desired: &'a [CustomCommand],
    registered_prev: &BTreeSet<String>,
    remote_live: &BTreeSet<String>,
) -> ReconcilePlan<'a> {
    let mut plan = ReconcilePlan::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for command in desired.iter().filter(|command| command.enabled) {
        if !seen.insert(command.name.as_str()) {
            plan.to_skip.insert(command.name.clone());
            plan.duplicates.push(command.name.clone());
            continue;
        }

        plan.desired.push(command);
        if !remote_live.contains(&command.name) {
            plan.to_register.push(command);
        }
    }

    plan.to_delete = registered_prev
        .iter()
        .chain(remote_live)
        .filter(|name| !seen.contains(name.as_str()))
        .cloned()
        .collect();

    plan
}
