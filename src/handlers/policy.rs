/// Farming policy
///
/// Decides what to do with each plot:
/// - Harvest ready crops first
/// - Water plots waiting for water, topping up water stock if it is empty
/// - Plant empty plots, topping up seed stock if it is empty
/// - Sell all wheat once every plot has been handled
///
/// Plots are handled in index order against one shared pool of water and
/// seeds, so a purchase made for plot 2 also serves plot 5 later in the same
/// cycle. Purchases only happen when the full top-up is affordable.

use std::num::NonZeroU64;

use crate::state::FarmState;
use crate::types::{Action, PlotIndex, PlotState, REFILL_TARGET, SEED_UNIT_COST, WATER_UNIT_COST};

/// Actions for a single plot, evaluated against `state` as it is now
pub fn plot_actions(state: &FarmState, plot: PlotIndex) -> Vec<Action> {
    let current = state.plot(plot);
    if current.timer_remaining > 0 {
        return Vec::new();
    }

    match current.state {
        PlotState::WaitingHarvest => vec![Action::Harvest(plot)],
        PlotState::WaitingWater => {
            with_top_up(state.water, state.coins, WATER_UNIT_COST, Action::BuyWater, Action::Water(plot))
        }
        PlotState::Empty => {
            with_top_up(state.seeds, state.coins, SEED_UNIT_COST, Action::BuySeeds, Action::Plant(plot))
        }
        PlotState::Unknown => Vec::new(),
    }
}

/// Final action of a cycle: sell every unit of wheat on hand
pub fn sale_action(state: &FarmState) -> Option<Action> {
    NonZeroU64::new(state.wheat).map(Action::SellWheat)
}

/// Whole-cycle plan. Purchases and consumption are projected onto a private
/// copy as if each action succeeded; harvest yields are unknown and not
/// projected.
pub fn plan(state: &FarmState) -> Vec<Action> {
    let mut projected = state.clone();
    let mut actions = Vec::new();

    for plot in PlotIndex::all() {
        for action in plot_actions(&projected, plot) {
            project(&mut projected, &action);
            actions.push(action);
        }
    }

    actions.extend(sale_action(&projected));
    actions
}

/// Whether `action` can still be issued given the live state. Checked right
/// before each request so that a failed purchase stops the action that
/// depended on it.
pub fn precondition_met(state: &FarmState, action: &Action) -> bool {
    match action {
        Action::Harvest(_) => true,
        Action::Water(_) => state.water >= 1,
        Action::Plant(_) => state.seeds >= 1,
        Action::BuyWater(amount) => state.coins >= purchase_cost(*amount, WATER_UNIT_COST),
        Action::BuySeeds(amount) => state.coins >= purchase_cost(*amount, SEED_UNIT_COST),
        Action::SellWheat(_) => state.wheat > 0,
    }
}

pub fn purchase_cost(amount: NonZeroU64, unit_cost: u64) -> u64 {
    amount.get().saturating_mul(unit_cost)
}

fn with_top_up(
    stock: u64,
    coins: u64,
    unit_cost: u64,
    buy: fn(NonZeroU64) -> Action,
    then: Action,
) -> Vec<Action> {
    let mut actions = Vec::with_capacity(2);
    let mut available = stock;

    if stock < 1 {
        if let Some(need) = NonZeroU64::new(REFILL_TARGET.saturating_sub(stock)) {
            if coins >= purchase_cost(need, unit_cost) {
                actions.push(buy(need));
                available += need.get();
            }
        }
    }

    if available >= 1 {
        actions.push(then);
    }
    actions
}

fn project(state: &mut FarmState, action: &Action) {
    match action {
        Action::BuyWater(amount) => {
            state.coins = state.coins.saturating_sub(purchase_cost(*amount, WATER_UNIT_COST));
            state.water += amount.get();
        }
        Action::BuySeeds(amount) => {
            state.coins = state.coins.saturating_sub(purchase_cost(*amount, SEED_UNIT_COST));
            state.seeds += amount.get();
        }
        Action::Water(_) => state.water = state.water.saturating_sub(1),
        Action::Plant(_) => state.seeds = state.seeds.saturating_sub(1),
        Action::SellWheat(_) => state.wheat = 0,
        Action::Harvest(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Plot;

    fn idx(i: usize) -> PlotIndex {
        PlotIndex::new(i).unwrap()
    }

    fn amount(n: u64) -> NonZeroU64 {
        NonZeroU64::new(n).unwrap()
    }

    fn farm_with(plots: &[(usize, PlotState, u64)]) -> FarmState {
        let mut state = FarmState::new();
        for (i, plot_state, timer) in plots {
            state.plots[*i] = Plot::new(*plot_state, *timer);
        }
        state
    }

    #[test]
    fn test_water_purchase_gated_on_coins() {
        let mut state = farm_with(&[(0, PlotState::WaitingWater, 0)]);
        state.coins = 10;
        state.water = 0;
        assert!(plan(&state).is_empty());
    }

    #[test]
    fn test_seed_purchase_then_plant() {
        let mut state = farm_with(&[(4, PlotState::Empty, 0)]);
        state.coins = 200;
        state.seeds = 0;
        assert_eq!(plan(&state), vec![Action::BuySeeds(amount(9)), Action::Plant(idx(4))]);
    }

    #[test]
    fn test_harvests_then_single_sale() {
        let mut state = farm_with(&[
            (1, PlotState::WaitingHarvest, 0),
            (3, PlotState::WaitingHarvest, 0),
            (7, PlotState::WaitingHarvest, 0),
        ]);
        state.wheat = 5;
        assert_eq!(
            plan(&state),
            vec![
                Action::Harvest(idx(1)),
                Action::Harvest(idx(3)),
                Action::Harvest(idx(7)),
                Action::SellWheat(amount(5)),
            ]
        );
    }

    #[test]
    fn test_unknown_and_running_timers_do_nothing() {
        let state = farm_with(&[
            (0, PlotState::Unknown, 0),
            (1, PlotState::Empty, 10),
            (2, PlotState::WaitingWater, 1),
            (3, PlotState::WaitingHarvest, 99),
        ]);
        let mut rich = state.clone();
        rich.coins = 10_000;
        rich.seeds = 5;
        rich.water = 5;
        assert!(plan(&rich).is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let mut state = farm_with(&[
            (0, PlotState::Empty, 0),
            (2, PlotState::WaitingWater, 0),
            (5, PlotState::WaitingHarvest, 0),
        ]);
        state.coins = 500;
        state.wheat = 1;
        assert_eq!(plan(&state), plan(&state));
    }

    #[test]
    fn test_purchase_shared_across_plots() {
        let mut state = farm_with(&[
            (2, PlotState::WaitingWater, 0),
            (5, PlotState::WaitingWater, 0),
        ]);
        state.coins = 135;
        assert_eq!(
            plan(&state),
            vec![
                Action::BuyWater(amount(9)),
                Action::Water(idx(2)),
                Action::Water(idx(5)),
            ]
        );
    }

    #[test]
    fn test_existing_stock_skips_purchase() {
        let mut state = farm_with(&[(0, PlotState::Empty, 0), (1, PlotState::Empty, 0)]);
        state.seeds = 1;
        state.coins = 1_000;
        // One seed covers plot 0, plot 1 triggers a top-up
        assert_eq!(
            plan(&state),
            vec![
                Action::Plant(idx(0)),
                Action::BuySeeds(amount(9)),
                Action::Plant(idx(1)),
            ]
        );
    }

    #[test]
    fn test_mixed_cycle_order() {
        let mut state = farm_with(&[
            (0, PlotState::Empty, 0),
            (1, PlotState::WaitingHarvest, 0),
            (2, PlotState::WaitingWater, 0),
        ]);
        state.coins = 45;
        state.wheat = 2;
        // Seeds (45) are affordable, water (135) afterwards is not
        assert_eq!(
            plan(&state),
            vec![
                Action::BuySeeds(amount(9)),
                Action::Plant(idx(0)),
                Action::Harvest(idx(1)),
                Action::SellWheat(amount(2)),
            ]
        );
    }

    #[test]
    fn test_preconditions() {
        let mut state = FarmState::new();
        assert!(precondition_met(&state, &Action::Harvest(idx(0))));
        assert!(!precondition_met(&state, &Action::Water(idx(0))));
        assert!(!precondition_met(&state, &Action::Plant(idx(0))));
        assert!(!precondition_met(&state, &Action::SellWheat(amount(1))));
        assert!(!precondition_met(&state, &Action::BuySeeds(amount(9))));

        state.coins = 45;
        assert!(precondition_met(&state, &Action::BuySeeds(amount(9))));
        assert!(!precondition_met(&state, &Action::BuyWater(amount(9))));
    }

    #[test]
    fn test_sale_action() {
        let mut state = FarmState::new();
        assert_eq!(sale_action(&state), None);
        state.wheat = 12;
        assert_eq!(sale_action(&state), Some(Action::SellWheat(amount(12))));
    }
}
