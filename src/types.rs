use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Number of plots every farm has
pub const PLOT_COUNT: usize = 9;

/// Coins charged per unit of water
pub const WATER_UNIT_COST: u64 = 15;

/// Coins charged per seed
pub const SEED_UNIT_COST: u64 = 5;

/// Stock level a purchase tops a resource up to (one unit per plot)
pub const REFILL_TARGET: u64 = PLOT_COUNT as u64;

/// Lifecycle state of a single plot as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlotState {
    Empty,
    WaitingWater,
    WaitingHarvest,
    #[default]
    Unknown,
}

impl PlotState {
    /// Map a remote state string; anything unrecognised is `Unknown`.
    pub fn from_remote(value: &str) -> Self {
        match value {
            "empty" => PlotState::Empty,
            "waiting_water" => PlotState::WaitingWater,
            "waiting_harvest" => PlotState::WaitingHarvest,
            _ => PlotState::Unknown,
        }
    }

    /// Single glyph used by the status view
    pub fn glyph(&self) -> char {
        match self {
            PlotState::Empty => '○',
            PlotState::WaitingWater => '◐',
            PlotState::WaitingHarvest => '●',
            PlotState::Unknown => '?',
        }
    }
}

/// One farming slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Plot {
    pub state: PlotState,
    /// Seconds until the plot can be acted on
    pub timer_remaining: u64,
}

impl Plot {
    pub fn new(state: PlotState, timer_remaining: u64) -> Self {
        Self { state, timer_remaining }
    }
}

/// Index of a plot, guaranteed to be in `0..PLOT_COUNT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlotIndex(usize);

impl PlotIndex {
    pub fn new(index: usize) -> Option<Self> {
        (index < PLOT_COUNT).then_some(Self(index))
    }

    /// Accepts the signed indices the server sends; out-of-range values are rejected.
    pub fn from_remote(index: i64) -> Option<Self> {
        usize::try_from(index).ok().and_then(Self::new)
    }

    pub fn all() -> impl Iterator<Item = PlotIndex> {
        (0..PLOT_COUNT).map(PlotIndex)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account lifecycle label shown in the status view
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AccountStatus {
    #[default]
    Initializing,
    InvalidCredential(String),
    LoginFailed,
    DataFailed,
    CropFailed,
    Processing,
    Active,
    Error(String),
}

impl AccountStatus {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            AccountStatus::InvalidCredential(_)
                | AccountStatus::LoginFailed
                | AccountStatus::DataFailed
                | AccountStatus::CropFailed
                | AccountStatus::Error(_)
        )
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountStatus::Initializing => write!(f, "Initializing"),
            AccountStatus::InvalidCredential(reason) => write!(f, "Invalid Data: {}", reason),
            AccountStatus::LoginFailed => write!(f, "Login Failed"),
            AccountStatus::DataFailed => write!(f, "Data Update Failed"),
            AccountStatus::CropFailed => write!(f, "Crop States Failed"),
            AccountStatus::Processing => write!(f, "Processing..."),
            AccountStatus::Active => write!(f, "Active"),
            AccountStatus::Error(message) => write!(f, "Error: {}", message),
        }
    }
}

/// A single remote action the policy can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Harvest(PlotIndex),
    Water(PlotIndex),
    Plant(PlotIndex),
    BuyWater(NonZeroU64),
    BuySeeds(NonZeroU64),
    SellWheat(NonZeroU64),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Harvest(_) => "harvest",
            Action::Water(_) => "water",
            Action::Plant(_) => "plant",
            Action::BuyWater(_) => "buy-water",
            Action::BuySeeds(_) => "buy-seeds",
            Action::SellWheat(_) => "sell-wheat",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Harvest(plot) | Action::Water(plot) | Action::Plant(plot) => {
                write!(f, "{}(plot {})", self.name(), plot)
            }
            Action::BuyWater(amount) | Action::BuySeeds(amount) | Action::SellWheat(amount) => {
                write!(f, "{}({})", self.name(), amount)
            }
        }
    }
}
