/// Farm model
///
/// In-memory picture of one account: economy counters, the nine plots and
/// the lifecycle label. Remote payloads are merged by presence; a field the
/// server leaves out keeps whatever value we had before.

use chrono::{DateTime, Local};
use tracing::debug;

use crate::api::{CropStateEntry, ProfileData};
use crate::types::{AccountStatus, Action, Plot, PlotIndex, PlotState, PLOT_COUNT};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FarmState {
    pub coins: u64,
    pub seeds: u64,
    pub water: u64,
    pub wheat: u64,
    pub plots: [Plot; PLOT_COUNT],
    pub status: AccountStatus,
    pub last_update: Option<DateTime<Local>>,
}

impl FarmState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plot(&self, index: PlotIndex) -> &Plot {
        &self.plots[index.get()]
    }

    /// Merge a `/user/me` payload
    pub fn apply_profile(&mut self, profile: &ProfileData) {
        merge(&mut self.coins, profile.coins);
        merge(&mut self.seeds, profile.seeds);
        merge(&mut self.water, profile.water);
        merge(&mut self.wheat, profile.wheat);
    }

    /// Merge a `/crop/states` payload. Entries without a usable plot index
    /// are skipped; returns how many were skipped.
    pub fn apply_crop_states(&mut self, entries: &[CropStateEntry]) -> usize {
        let mut discarded = 0;
        for entry in entries {
            let Some(index) = entry.plot_index.and_then(PlotIndex::from_remote) else {
                debug!("Ignoring crop state for plot {:?}", entry.plot_index);
                discarded += 1;
                continue;
            };
            let plot = &mut self.plots[index.get()];
            *plot = Plot::new(
                entry
                    .state
                    .as_deref()
                    .map(PlotState::from_remote)
                    .unwrap_or_default(),
                entry.timer_remaining.unwrap_or(0),
            );
        }
        discarded
    }

    /// Merge the `user` object of a successful action response. Only the
    /// counters that action is known to report are taken.
    pub fn apply_action_result(&mut self, action: &Action, user: &ProfileData) {
        match action {
            Action::Plant(_) => merge(&mut self.seeds, user.seeds),
            Action::Water(_) => merge(&mut self.water, user.water),
            Action::Harvest(_) => merge(&mut self.wheat, user.wheat),
            Action::BuySeeds(_) => {
                merge(&mut self.coins, user.coins);
                merge(&mut self.seeds, user.seeds);
            }
            Action::BuyWater(_) => {
                merge(&mut self.coins, user.coins);
                merge(&mut self.water, user.water);
            }
            Action::SellWheat(_) => {
                merge(&mut self.coins, user.coins);
                merge(&mut self.wheat, user.wheat);
            }
        }
    }

    /// Smallest running countdown across all plots
    pub fn next_timer(&self) -> Option<u64> {
        self.plots
            .iter()
            .map(|p| p.timer_remaining)
            .filter(|t| *t > 0)
            .min()
    }
}

fn merge(field: &mut u64, value: Option<u64>) {
    if let Some(v) = value {
        *field = v;
    }
}
