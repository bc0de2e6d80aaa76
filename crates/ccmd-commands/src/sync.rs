//! Applies reconciliation plans against Discord and persisted state.

use crate::error::ReconcileError;
use crate::reconciler::reconcile;
use crate::remote::{CommandService, RemoteCommand, RemoteError};
use crate::routes::CommandRoutes;
use crate::store::{RegisteredCommands, StateStore, StoreError};
use ccmd_common::format_timestamp;
use ccmd_config::CustomCommand;
use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Result of one synchronization pass.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Commands registered during the pass, in declaration order.
    pub registered: Vec<String>,
    /// Live commands re-created because their definition changed, in
    /// declaration order.
    pub updated: Vec<String>,
    /// Commands deleted (or found already gone) during the pass, sorted.
    pub deleted: Vec<String>,
    /// Duplicate names that were skipped.
    pub skipped: BTreeSet<String>,
    /// Desired commands already live and up to date before the pass.
    pub unchanged: usize,
    /// Reply routes for every desired command.
    pub routes: CommandRoutes,
    /// Per-command and persistence failures.
    pub errors: Vec<ReconcileError>,
}

impl SyncReport {
    /// Whether the pass finished without any error.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Logs a one line summary of the pass.
    pub fn log_summary(&self) {
        if self.is_clean() {
            info!(
                active = self.routes.len(),
                registered = self.registered.len(),
                updated = self.updated.len(),
                deleted = self.deleted.len(),
                unchanged = self.unchanged,
                "Custom commands ready"
            );
        } else {
            warn!(
                active = self.routes.len(),
                registered = self.registered.len(),
                updated = self.updated.len(),
                deleted = self.deleted.len(),
                skipped = self.skipped.len(),
                errors = self.errors.len(),
                "Custom commands ready with errors"
            );
        }
    }
}

enum Outcome {
    Registered {
        name: String,
        result: Result<(), RemoteError>,
    },
    Updated {
        name: String,
        result: Result<(), RemoteError>,
    },
    Deleted {
        name: String,
        result: Result<(), RemoteError>,
    },
}

/// Keeps Discord's global commands in line with configuration.
///
/// The registered set is loaded once and held for the lifetime of the
/// synchronizer; passes run one at a time.
pub struct CommandSynchronizer<S, P> {
    service: S,
    store: P,
    state: Mutex<RegisteredCommands>,
}

impl<S, P> CommandSynchronizer<S, P>
where
    S: CommandService,
    P: StateStore,
{
    /// Creates a synchronizer, loading the registered set from `store`.
    pub async fn load(service: S, store: P) -> Result<Self, StoreError> {
        let state = store.load().await?;
        let saved_at = state
            .updated_at()
            .map_or_else(|| "never".to_string(), format_timestamp);
        info!(
            registered = state.len(),
            saved_at = %saved_at,
            "Loaded registered command state"
        );

        Ok(Self {
            service,
            store,
            state: Mutex::new(state),
        })
    }

    /// Snapshot of the registered set.
    pub async fn registered(&self) -> RegisteredCommands {
        self.state.lock().await.clone()
    }

    /// The remote command service.
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// The state store.
    pub const fn store(&self) -> &P {
        &self.store
    }

    /// Runs one reconciliation pass for `commands`.
    ///
    /// Only a failure to list the live commands fails the pass as a whole;
    /// every other problem is collected in [`SyncReport::errors`]. If the
    /// returned future is dropped midway, the in-memory set still reflects
    /// every remote call that had completed and is saved by the next pass.
    #[instrument(skip_all, fields(pass = %Uuid::new_v4()))]
    pub async fn run(&self, commands: &[CustomCommand]) -> Result<SyncReport, ReconcileError> {
        let mut state = self.state.lock().await;

        let live = self
            .service
            .list_global_commands()
            .await
            .map_err(ReconcileError::RemoteListFailed)?;
        let live: HashMap<String, RemoteCommand> = live
            .into_iter()
            .map(|command| (command.name.clone(), command))
            .collect();
        let live_names: BTreeSet<String> = live.keys().cloned().collect();

        let plan = reconcile(commands, state.names(), &live_names);
        let outdated: Vec<&CustomCommand> = plan
            .desired
            .iter()
            .copied()
            .filter(|command| {
                live.get(&command.name)
                    .is_some_and(|remote| !remote.matches(command))
            })
            .collect();
        debug!(
            desired = plan.desired.len(),
            to_register = plan.to_register.len(),
            to_update = outdated.len(),
            to_delete = plan.to_delete.len(),
            "Computed reconciliation plan"
        );

        let mut report = SyncReport {
            skipped: plan.to_skip.clone(),
            unchanged: plan.desired.len() - plan.to_register.len() - outdated.len(),
            routes: CommandRoutes::from_commands(plan.desired.iter().copied()),
            ..SyncReport::default()
        };

        for name in &plan.duplicates {
            error!(command = %name, "Attempting to register duplicate command");
            report
                .errors
                .push(ReconcileError::DuplicateCommandName { name: name.clone() });
        }

        for command in &plan.desired {
            if live_names.contains(&command.name) && state.insert(command.name.as_str()) {
                debug!(command = %command.name, "Adopted live command into registered state");
            }
        }

        let mut pending: FuturesUnordered<BoxFuture<'_, Outcome>> = FuturesUnordered::new();

        for &command in &plan.to_register {
            pending.push(
                async move {
                    let result = self.service.create_command(command).await.map(|_| ());
                    Outcome::Registered {
                        name: command.name.clone(),
                        result,
                    }
                }
                .boxed(),
            );
        }

        for &command in &outdated {
            pending.push(
                async move {
                    let result = self.service.create_command(command).await.map(|_| ());
                    Outcome::Updated {
                        name: command.name.clone(),
                        result,
                    }
                }
                .boxed(),
            );
        }

        for name in &plan.to_delete {
            if let Some(id) = live.get(name).map(|remote| remote.id) {
                pending.push(
                    async move {
                        let result = self.service.delete_command(id).await;
                        Outcome::Deleted {
                            name: name.clone(),
                            result,
                        }
                    }
                    .boxed(),
                );
            } else {
                // Nothing to delete remotely.
                state.remove(name);
                debug!(command = %name, "Stale command no longer exists remotely");
                report.deleted.push(name.clone());
            }
        }

        let mut succeeded = HashSet::new();
        while let Some(outcome) = pending.next().await {
            match outcome {
                Outcome::Registered { name, result: Ok(()) } => {
                    info!(command = %name, "Registered custom command");
                    state.insert(name.as_str());
                    succeeded.insert(name);
                }
                Outcome::Registered {
                    name,
                    result: Err(source),
                } => {
                    error!(command = %name, error = %source, "Failed to register custom command");
                    state.remove(&name);
                    report
                        .errors
                        .push(ReconcileError::RemoteRegistrationFailed { name, source });
                }
                Outcome::Updated { name, result: Ok(()) } => {
                    info!(command = %name, "Updated custom command");
                    succeeded.insert(name);
                }
                Outcome::Updated {
                    name,
                    result: Err(source),
                } => {
                    // Still live with the old definition.
                    error!(command = %name, error = %source, "Failed to update custom command");
                    report
                        .errors
                        .push(ReconcileError::RemoteRegistrationFailed { name, source });
                }
                Outcome::Deleted { name, result: Ok(()) } => {
                    info!(command = %name, "Deleted custom command");
                    state.remove(&name);
                    report.deleted.push(name);
                }
                Outcome::Deleted {
                    name,
                    result: Err(source),
                } => {
                    error!(command = %name, error = %source, "Failed to delete custom command");
                    report
                        .errors
                        .push(ReconcileError::RemoteDeletionFailed { name, source });
                }
            }
        }
        drop(pending);

        report.registered = plan
            .to_register
            .iter()
            .filter(|command| succeeded.contains(&command.name))
            .map(|command| command.name.clone())
            .collect();
        report.updated = outdated
            .iter()
            .filter(|command| succeeded.contains(&command.name))
            .map(|command| command.name.clone())
            .collect();
        report.deleted.sort();

        state.touch(Utc::now());
        if let Err(source) = self.store.save(&state).await {
            error!(error = %source, "Failed to persist registered commands");
            report
                .errors
                .push(ReconcileError::PersistenceWriteFailed(source));
        }

        Ok(report)
    }
}
