/// Status view
///
/// Renders supervisor snapshots as fixed-width text rows and writes them to
/// the log. Failing accounts are reported at warn level so they stand out.

use tracing::{info, warn};

use crate::state::FarmState;
use crate::worker::AccountSnapshot;

pub const LEGEND: &str = "Legend: ○ = Empty | ◐ = Need Water | ● = Ready to Harvest | ? = Unknown";

pub const HEADER: &str = "ID  | Status               |     Coins | Seeds | Water | Wheat | Plots             | Timer";

/// Group digits in thousands: 1234567 -> "1,234,567"
pub fn format_number_with_separators(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn plot_glyphs(farm: &FarmState) -> String {
    farm.plots
        .iter()
        .map(|plot| plot.state.glyph().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shortest running countdown, or `Ready` when nothing is counting down
pub fn timer_label(farm: &FarmState) -> String {
    match farm.next_timer() {
        Some(seconds) => format!("{}s", seconds),
        None => "Ready".to_string(),
    }
}

pub fn format_row(account: &AccountSnapshot) -> String {
    let farm = &account.farm;
    let mut status = farm.status.to_string();
    if status.chars().count() > 20 {
        status = status.chars().take(19).collect::<String>() + "…";
    }
    format!(
        "{:<3} | {:<20} | {:>9} | {:>5} | {:>5} | {:>5} | {} | {}",
        account.account_id,
        status,
        format_number_with_separators(farm.coins),
        farm.seeds,
        farm.water,
        farm.wheat,
        plot_glyphs(farm),
        timer_label(farm),
    )
}

/// Log one row per account
pub fn report(accounts: &[AccountSnapshot]) {
    info!("{}", HEADER);
    for account in accounts {
        let row = format_row(account);
        if account.farm.status.is_failure() {
            warn!("{}", row);
        } else {
            info!("{}", row);
        }
    }
}
