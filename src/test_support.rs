//! Test-only in-memory game server implementing `FarmApi`.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use crate::api::{ApiError, ApiFuture, CropStateEntry, FarmApi, ProfileData};
use crate::types::{Action, PlotIndex, SEED_UNIT_COST, WATER_UNIT_COST};

/// Coins paid per unit of wheat sold
pub const WHEAT_PRICE: u64 = 10;

/// How a scripted operation should fail
#[derive(Debug, Clone, Copy)]
pub enum Failure {
    Status(u16),
    Malformed,
    Rejected,
}

#[derive(Default)]
struct Server {
    coins: u64,
    seeds: u64,
    water: u64,
    wheat: u64,
    plots: HashMap<i64, (String, u64)>,
}

/// Fake farm server. Operations are logged by name (`login`, `profile`,
/// `crop states`) or by the action's display form (`plant(plot 0)`).
#[derive(Default)]
pub struct FakeFarm {
    server: Mutex<Server>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, Failure>>,
}

impl FakeFarm {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_counters(&self, coins: u64, seeds: u64, water: u64, wheat: u64) {
        let mut server = self.server.lock();
        server.coins = coins;
        server.seeds = seeds;
        server.water = water;
        server.wheat = wheat;
    }

    /// Index is signed so tests can plant out-of-range entries
    pub fn set_plot(&self, index: i64, state: &str, timer: u64) {
        self.server.lock().plots.insert(index, (state.to_string(), timer));
    }

    /// Make every call to `operation` fail. Uses the operation names from
    /// `Action::name` plus `login`, `profile` and `crop states`.
    pub fn fail(&self, operation: &'static str, failure: Failure) {
        self.failures.lock().insert(operation, failure);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn respond<T>(
        &self,
        operation: &'static str,
        label: String,
        handler: impl FnOnce(&mut Server) -> T,
    ) -> Result<T, ApiError> {
        self.calls.lock().push(label);
        if let Some(failure) = self.failures.lock().get(operation).copied() {
            return Err(match failure {
                Failure::Status(status) => ApiError::Status { operation, status },
                Failure::Malformed => ApiError::Malformed {
                    operation,
                    message: "expected value at line 1 column 1".to_string(),
                },
                Failure::Rejected => ApiError::Rejected {
                    operation,
                    status: Some("error".to_string()),
                },
            });
        }
        Ok(handler(&mut self.server.lock()))
    }

    fn action(
        &self,
        action: Action,
        handler: impl FnOnce(&mut Server) -> ProfileData,
    ) -> ApiFuture<'_, ProfileData> {
        let result = self.respond(action.name(), action.to_string(), handler);
        Box::pin(std::future::ready(result))
    }
}

fn set_plot(server: &mut Server, plot: PlotIndex, state: &str, timer: u64) {
    server.plots.insert(plot.get() as i64, (state.to_string(), timer));
}

impl FarmApi for FakeFarm {
    fn login(&self) -> ApiFuture<'_, ()> {
        Box::pin(std::future::ready(self.respond("login", "login".to_string(), |_| ())))
    }

    fn profile(&self) -> ApiFuture<'_, ProfileData> {
        let result = self.respond("profile", "profile".to_string(), |s| ProfileData {
            coins: Some(s.coins),
            seeds: Some(s.seeds),
            water: Some(s.water),
            wheat: Some(s.wheat),
        });
        Box::pin(std::future::ready(result))
    }

    fn crop_states(&self) -> ApiFuture<'_, Vec<CropStateEntry>> {
        let result = self.respond("crop states", "crop states".to_string(), |s| {
            let mut entries: Vec<CropStateEntry> = s
                .plots
                .iter()
                .map(|(index, (state, timer))| CropStateEntry {
                    plot_index: Some(*index),
                    state: Some(state.clone()),
                    timer_remaining: Some(*timer),
                })
                .collect();
            entries.sort_by_key(|e| e.plot_index);
            entries
        });
        Box::pin(std::future::ready(result))
    }

    fn plant(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData> {
        self.action(Action::Plant(plot), |s| {
            s.seeds = s.seeds.saturating_sub(1);
            set_plot(s, plot, "waiting_water", 30);
            ProfileData { seeds: Some(s.seeds), ..Default::default() }
        })
    }

    fn water(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData> {
        self.action(Action::Water(plot), |s| {
            s.water = s.water.saturating_sub(1);
            set_plot(s, plot, "waiting_harvest", 30);
            ProfileData { water: Some(s.water), ..Default::default() }
        })
    }

    fn harvest(&self, plot: PlotIndex) -> ApiFuture<'_, ProfileData> {
        self.action(Action::Harvest(plot), |s| {
            s.wheat += 1;
            set_plot(s, plot, "empty", 0);
            ProfileData { wheat: Some(s.wheat), ..Default::default() }
        })
    }

    fn buy_seeds(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData> {
        self.action(Action::BuySeeds(amount), |s| {
            s.coins = s.coins.saturating_sub(amount.get() * SEED_UNIT_COST);
            s.seeds += amount.get();
            ProfileData { coins: Some(s.coins), seeds: Some(s.seeds), ..Default::default() }
        })
    }

    fn buy_water(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData> {
        self.action(Action::BuyWater(amount), |s| {
            s.coins = s.coins.saturating_sub(amount.get() * WATER_UNIT_COST);
            s.water += amount.get();
            ProfileData { coins: Some(s.coins), water: Some(s.water), ..Default::default() }
        })
    }

    fn sell_wheat(&self, amount: NonZeroU64) -> ApiFuture<'_, ProfileData> {
        self.action(Action::SellWheat(amount), |s| {
            let sold = amount.get().min(s.wheat);
            s.wheat -= sold;
            s.coins += sold * WHEAT_PRICE;
            ProfileData { coins: Some(s.coins), wheat: Some(s.wheat), ..Default::default() }
        })
    }
}
