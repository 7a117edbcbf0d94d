use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};

use crate::accounts::AccountEntry;
use crate::api::{ApiError, ClientSettings, Credential, FarmApi, RemoteClient};
use crate::state::{FarmState, StateManager};
use crate::types::AccountStatus;

use super::account::{AccountWorker, Timing};

/// Point-in-time copy of one account for display
#[derive(Debug, Clone)]
pub struct AccountSnapshot {
    pub account_id: usize,
    pub farm: FarmState,
}

/// Owns every account worker and the shutdown switch they watch
pub struct Supervisor {
    timing: Timing,
    accounts: Vec<StateManager>,
    workers: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Supervisor {
    pub fn new(timing: Timing) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            timing,
            accounts: Vec::new(),
            workers: Vec::new(),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Build a client per account and start its worker. Accounts whose
    /// credential does not parse are listed but never started.
    pub fn launch(settings: &ClientSettings, timing: Timing, entries: &[AccountEntry]) -> Self {
        let mut supervisor = Self::new(timing);
        for entry in entries {
            match RemoteClient::new(settings, &Credential::new(entry.raw.clone())) {
                Ok(client) => {
                    supervisor.spawn(entry.id, client);
                }
                Err(e) => supervisor.register_invalid(entry.id, &e),
            }
        }
        info!(
            "Started {} worker(s) for {} account(s)",
            supervisor.worker_count(),
            supervisor.accounts.len()
        );
        supervisor
    }

    /// Start a worker for `account_id` on its own task
    pub fn spawn<A: FarmApi + 'static>(&mut self, account_id: usize, api: A) -> StateManager {
        let state = StateManager::new(account_id);
        let worker = AccountWorker::new(api, state.clone(), self.timing, self.shutdown_rx.clone());
        let handle = tokio::spawn(worker.run().instrument(info_span!("account", id = account_id)));

        self.accounts.push(state.clone());
        self.workers.push(handle);
        state
    }

    /// List an account that cannot run
    pub fn register_invalid(&mut self, account_id: usize, error: &ApiError) {
        let reason = match error {
            ApiError::CredentialInvalid(reason) => reason.clone(),
            other => other.short_message(),
        };
        warn!("Account #{} not started: {}", account_id, reason);

        let state = StateManager::new(account_id);
        state.set_status(AccountStatus::InvalidCredential(reason));
        self.accounts.push(state);
    }

    /// Copies of every account's state, in registration order
    pub fn snapshot(&self) -> Vec<AccountSnapshot> {
        self.accounts
            .iter()
            .map(|state| AccountSnapshot {
                account_id: state.account_id(),
                farm: state.snapshot(),
            })
            .collect()
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Ask every worker to stop after its current step
    pub fn shutdown(&self) {
        info!("Shutdown requested");
        self.shutdown_tx.send_replace(true);
    }

    /// Wait for all workers to finish. Call `shutdown` first.
    pub async fn wait(self) {
        for result in join_all(self.workers).await {
            if let Err(e) = result {
                if e.is_panic() {
                    error!("Worker panicked: {}", e);
                } else {
                    warn!("Worker ended abnormally: {}", e);
                }
            }
        }
        info!("All workers stopped");
    }
}
