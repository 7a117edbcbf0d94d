/// Account worker
///
/// Runs one account forever: login, refresh profile and plots, act on the
/// plots, optionally wait for the server to settle and refresh again, then
/// pause and start over. Every failure is recovered inside the loop; only the
/// shutdown signal ends it.

use chrono::Local;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ApiFuture, FarmApi, ProfileData};
use crate::handlers::policy;
use crate::state::StateManager;
use crate::types::{AccountStatus, Action, PlotIndex};

/// Pauses that shape the worker loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Wait after acting before state is refreshed again
    pub settle_delay: Duration,
    /// Wait between cycles
    pub cycle_pause: Duration,
    /// Wait after an unexpected failure
    pub error_pause: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(30),
            cycle_pause: Duration::from_secs(1),
            error_pause: Duration::from_secs(5),
        }
    }
}

/// Why a cycle ended early
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("login failed: {0}")]
    Login(#[source] ApiError),

    #[error("profile refresh failed: {0}")]
    Profile(#[source] ApiError),

    #[error("crop state refresh failed: {0}")]
    CropStates(#[source] ApiError),

    #[error("unexpected failure during {step}: {source}")]
    Unexpected {
        step: &'static str,
        #[source]
        source: ApiError,
    },
}

impl CycleError {
    /// Malformed bodies are unexpected wherever they happen; everything else
    /// keeps the step-specific variant.
    fn at_step(step: &'static str, error: ApiError, variant: fn(ApiError) -> CycleError) -> Self {
        if error.is_malformed() {
            CycleError::Unexpected { step, source: error }
        } else {
            variant(error)
        }
    }

    pub fn status(&self) -> AccountStatus {
        match self {
            CycleError::Login(_) => AccountStatus::LoginFailed,
            CycleError::Profile(_) => AccountStatus::DataFailed,
            CycleError::CropStates(_) => AccountStatus::CropFailed,
            CycleError::Unexpected { source, .. } => AccountStatus::Error(source.short_message()),
        }
    }

    pub fn pause(&self, timing: &Timing) -> Duration {
        match self {
            CycleError::Unexpected { .. } => timing.error_pause,
            _ => timing.cycle_pause,
        }
    }
}

/// Tally of what the policy run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Planned actions dropped because their precondition no longer held
    pub skipped: usize,
}

impl ActionReport {
    pub fn any_attempted(&self) -> bool {
        self.attempted > 0
    }
}

/// Result of a completed cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub actions: ActionReport,
    /// Crop entries the server sent for indices outside the farm
    pub discarded_entries: usize,
}

pub struct AccountWorker<A> {
    api: A,
    state: StateManager,
    timing: Timing,
    shutdown: watch::Receiver<bool>,
}

impl<A: FarmApi> AccountWorker<A> {
    pub fn new(api: A, state: StateManager, timing: Timing, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            api,
            state,
            timing,
            shutdown,
        }
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Loop until shutdown. A request already in flight is always allowed to finish.
    pub async fn run(self) {
        info!("Worker started");
        while !self.is_shutdown() {
            let pause = match self.run_cycle().await {
                Ok(outcome) => {
                    debug!("Cycle complete: {:?}", outcome);
                    self.timing.cycle_pause
                }
                Err(e) => {
                    warn!("Cycle ended early: {}", e);
                    self.state.set_status(e.status());
                    e.pause(&self.timing)
                }
            };
            self.pause(pause).await;
        }
        info!("Worker stopped");
    }

    /// One full pass over the account
    pub async fn run_cycle(&self) -> Result<CycleOutcome, CycleError> {
        self.api
            .login()
            .await
            .map_err(|e| CycleError::at_step("login", e, CycleError::Login))?;

        let profile = self
            .api
            .profile()
            .await
            .map_err(|e| CycleError::at_step("profile", e, CycleError::Profile))?;
        self.state.update(|s| s.apply_profile(&profile));

        let crops = self
            .api
            .crop_states()
            .await
            .map_err(|e| CycleError::at_step("crop states", e, CycleError::CropStates))?;
        let discarded_entries = self.state.update(|s| s.apply_crop_states(&crops));
        if discarded_entries > 0 {
            debug!("Ignored {} crop entries with out-of-range plot index", discarded_entries);
        }

        let actions = self.execute_policy().await?;

        if actions.any_attempted() {
            self.state.set_status(AccountStatus::Processing);
            self.pause(self.timing.settle_delay).await;
            if self.is_shutdown() {
                debug!("Shutdown during settle, skipping refresh");
            } else {
                self.refresh_best_effort().await;
            }
        }

        self.state.update(|s| s.last_update = Some(Local::now()));
        self.state.set_status(AccountStatus::Active);

        Ok(CycleOutcome {
            actions,
            discarded_entries,
        })
    }

    /// Walk the plots in order, asking the policy what to do against the live
    /// state each time, then sell whatever wheat is left.
    async fn execute_policy(&self) -> Result<ActionReport, CycleError> {
        let mut report = ActionReport::default();

        for plot in PlotIndex::all() {
            let actions = policy::plot_actions(&self.state.snapshot(), plot);
            for action in actions {
                self.attempt(action, &mut report).await?;
            }
        }

        if let Some(sale) = policy::sale_action(&self.state.snapshot()) {
            self.attempt(sale, &mut report).await?;
        }

        if report.any_attempted() {
            info!(
                "Actions: {} attempted, {} succeeded, {} failed, {} skipped",
                report.attempted, report.succeeded, report.failed, report.skipped
            );
        }
        Ok(report)
    }

    async fn attempt(&self, action: Action, report: &mut ActionReport) -> Result<(), CycleError> {
        if !policy::precondition_met(&self.state.snapshot(), &action) {
            debug!("Skipping {}: not possible with current stock", action);
            report.skipped += 1;
            return Ok(());
        }

        report.attempted += 1;
        match self.call(action).await {
            Ok(user) => {
                self.state.update(|s| s.apply_action_result(&action, &user));
                report.succeeded += 1;
                debug!("{} succeeded", action);
            }
            Err(e) if e.is_malformed() => {
                return Err(CycleError::Unexpected {
                    step: action.name(),
                    source: e,
                });
            }
            Err(e) => {
                report.failed += 1;
                warn!("{} failed ({:?}): {}", action, e.kind(), e);
            }
        }
        Ok(())
    }

    fn call(&self, action: Action) -> ApiFuture<'_, ProfileData> {
        match action {
            Action::Harvest(plot) => self.api.harvest(plot),
            Action::Water(plot) => self.api.water(plot),
            Action::Plant(plot) => self.api.plant(plot),
            Action::BuyWater(amount) => self.api.buy_water(amount),
            Action::BuySeeds(amount) => self.api.buy_seeds(amount),
            Action::SellWheat(amount) => self.api.sell_wheat(amount),
        }
    }

    async fn refresh_best_effort(&self) {
        match self.api.crop_states().await {
            Ok(crops) => {
                self.state.update(|s| s.apply_crop_states(&crops));
            }
            Err(e) => debug!("Post-action crop refresh failed: {}", e),
        }
        match self.api.profile().await {
            Ok(profile) => self.state.update(|s| s.apply_profile(&profile)),
            Err(e) => debug!("Post-action profile refresh failed: {}", e),
        }
    }

    fn is_shutdown(&self) -> bool {
        // A dropped sender counts as shutdown
        *self.shutdown.borrow() || self.shutdown.has_changed().is_err()
    }

    /// Sleep unless shutdown is signalled first. Always yields at least once
    /// so zero-length pauses don't starve other tasks.
    async fn pause(&self, duration: Duration) {
        if duration.is_zero() || self.is_shutdown() {
            tokio::task::yield_now().await;
            return;
        }
        let mut shutdown = self.shutdown.clone();
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = shutdown.wait_for(|stop| *stop) => {}
        }
    }
}
