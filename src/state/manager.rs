use crate::state::FarmState;
use crate::types::AccountStatus;
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared handle to one account's farm. The owning worker writes through it,
/// everyone else only takes snapshots.
#[derive(Clone)]
pub struct StateManager {
    account_id: usize,
    state: Arc<RwLock<FarmState>>,
}

impl StateManager {
    pub fn new(account_id: usize) -> Self {
        Self {
            account_id,
            state: Arc::new(RwLock::new(FarmState::new())),
        }
    }

    pub fn account_id(&self) -> usize {
        self.account_id
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> FarmState {
        self.state.read().clone()
    }

    pub fn status(&self) -> AccountStatus {
        self.state.read().status.clone()
    }

    /// Apply a batch of changes under one write guard so readers never see
    /// half of it.
    pub fn update<R>(&self, f: impl FnOnce(&mut FarmState) -> R) -> R {
        f(&mut self.state.write())
    }

    pub fn set_status(&self, new_status: AccountStatus) {
        let mut state = self.state.write();
        if state.status != new_status {
            tracing::info!(
                "Account #{} status changed: {} -> {}",
                self.account_id,
                state.status,
                new_status
            );
            state.status = new_status;
        }
    }
}
