//! Equity and statistics aggregation over one owner's journal.
//!
//! Pure, single-pass-per-statistic computation: the caller fetches the
//! complete (unpaginated) record set and [`compute_dashboard`] turns it into
//! a [`DashboardSummary`]. Malformed fields never fail the computation;
//! they contribute a neutral default instead.

use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;

use super::entry::{Outcome, Side, TradeEntry};

pub const UNKNOWN_INSTRUMENT: &str = "UNKNOWN";

/// Profit summed over one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPnl {
    pub date: NaiveDate,
    pub pnl: f64,
}

/// Profit summed over one ISO-8601 week (`YYYY-Www`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPnl {
    pub week: String,
    pub pnl: f64,
}

/// Profit summed per instrument symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentPnl {
    pub instrument: String,
    pub pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// Final running balance after capital resets and cumulative P/L.
    pub equity: f64,
    pub total_pnl: f64,
    /// Mean risk/reward ratio, 2 decimals.
    #[serde(rename = "avg_rr")]
    pub avg_risk_reward: f64,
    /// Percentage of winning trades, 2 decimals.
    pub win_rate: f64,
    /// Peak-to-trough decline as a percentage of the final peak, 2 decimals.
    pub max_drawdown_pct: f64,
    pub total_trades: usize,
    pub avg_profit_per_win: f64,
    /// Mean stored profit over losing trades; typically negative.
    pub avg_loss_per_trade: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub most_traded_instrument: Option<String>,
    pub consecutive_wins: u32,
    pub consecutive_losses: u32,
    #[serde(rename = "daily")]
    pub daily_pnl: Vec<DailyPnl>,
    #[serde(rename = "weekly")]
    pub weekly_pnl: Vec<WeeklyPnl>,
    pub profit_per_instrument: Vec<InstrumentPnl>,
}

impl DashboardSummary {
    /// The defined terminal case for an empty journal: every numeric field
    /// zero, no instrument, all lists empty.
    pub fn empty() -> Self {
        DashboardSummary {
            equity: 0.0,
            total_pnl: 0.0,
            avg_risk_reward: 0.0,
            win_rate: 0.0,
            max_drawdown_pct: 0.0,
            total_trades: 0,
            avg_profit_per_win: 0.0,
            avg_loss_per_trade: 0.0,
            profit_factor: 0.0,
            largest_win: 0.0,
            largest_loss: 0.0,
            most_traded_instrument: None,
            consecutive_wins: 0,
            consecutive_losses: 0,
            daily_pnl: Vec::new(),
            weekly_pnl: Vec::new(),
            profit_per_instrument: Vec::new(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A present, numeric, strictly-positive capital amount; anything else is
/// treated as absent.
fn valid_capital(entry: &TradeEntry) -> Option<f64> {
    entry.capital.filter(|c| *c > 0.0)
}

fn instrument_label(entry: &TradeEntry) -> String {
    entry
        .instrument
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_INSTRUMENT)
        .to_string()
}

fn iso_week_label(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// Compute the dashboard summary from one owner's complete journal.
///
/// Deterministic for a given input set. Equity, drawdown and streaks
/// depend on chronological order (ties kept in input order by the stable
/// sort); the plain sums do not.
pub fn compute_dashboard(entries: &[TradeEntry]) -> DashboardSummary {
    if entries.is_empty() {
        return DashboardSummary::empty();
    }

    // Chronological view; sort_by is stable so same-date rows keep their
    // stored relative order.
    let mut ordered: Vec<&TradeEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date));

    // Baseline: last valid capital in chronological order, else 0.
    let baseline = ordered
        .iter()
        .rev()
        .find_map(|e| valid_capital(e))
        .unwrap_or(0.0);

    // Running equity walk. A fresh capital entry overrides prior equity,
    // it does not add to it.
    let mut equity = baseline;
    let mut peak_equity = baseline;
    let mut max_drawdown = 0.0_f64;
    for entry in &ordered {
        if let Some(capital) = valid_capital(entry) {
            equity = capital;
            peak_equity = capital;
        }
        if let Some(profit) = entry.profit {
            equity += profit;
        }
        if equity > peak_equity {
            peak_equity = equity;
        }
        let drawdown = peak_equity - equity;
        if drawdown > max_drawdown {
            max_drawdown = drawdown;
        }
    }
    let max_drawdown_pct = if peak_equity > 0.0 {
        max_drawdown / peak_equity * 100.0
    } else {
        0.0
    };

    let total_pnl: f64 = entries.iter().filter_map(|e| e.profit).sum();

    // Risk/reward: needs the full price triple and a side; degenerate
    // stops (entry == stop loss) and non-positive ratios are excluded.
    let mut rr_sum = 0.0_f64;
    let mut rr_count = 0usize;
    for entry in entries {
        let (Some(entry_price), Some(take_profit), Some(stop_loss), Some(side)) = (
            entry.entry_price,
            entry.take_profit,
            entry.stop_loss,
            entry.side,
        ) else {
            continue;
        };
        if entry_price == stop_loss {
            continue;
        }
        let (reward, risk) = match side {
            Side::Long => (take_profit - entry_price, entry_price - stop_loss),
            Side::Short => (entry_price - take_profit, stop_loss - entry_price),
        };
        let reward = reward.abs();
        let risk = risk.abs();
        if risk > 0.0 {
            let ratio = reward / risk;
            if ratio > 0.0 {
                rr_sum += ratio;
                rr_count += 1;
            }
        }
    }
    let avg_risk_reward = if rr_count > 0 {
        rr_sum / rr_count as f64
    } else {
        0.0
    };

    // Win rate and per-outcome profit partitions. Unrecognized outcomes
    // stay in the denominator but join neither partition.
    let total_trades = entries.len();
    let mut wins = 0usize;
    let mut loses = 0usize;
    let mut win_profit_sum = 0.0_f64;
    let mut lose_profit_sum = 0.0_f64;
    let mut largest_win = 0.0_f64;
    let mut largest_loss = 0.0_f64;
    for entry in entries {
        let profit = entry.profit.unwrap_or(0.0);
        match entry.outcome {
            Some(Outcome::Win) => {
                wins += 1;
                win_profit_sum += profit;
                if profit > largest_win {
                    largest_win = profit;
                }
            }
            Some(Outcome::Lose) => {
                loses += 1;
                lose_profit_sum += profit;
                if profit < largest_loss {
                    largest_loss = profit;
                }
            }
            None => {}
        }
    }
    let win_rate = if total_trades > 0 {
        wins as f64 / total_trades as f64 * 100.0
    } else {
        0.0
    };
    let avg_profit_per_win = if wins > 0 {
        win_profit_sum / wins as f64
    } else {
        0.0
    };
    let avg_loss_per_trade = if loses > 0 {
        lose_profit_sum / loses as f64
    } else {
        0.0
    };
    let profit_factor = if avg_loss_per_trade.abs() > 0.0 {
        avg_profit_per_win / avg_loss_per_trade.abs()
    } else {
        0.0
    };

    // Streaks walk chronological order; an opposite or unrecognized
    // outcome resets the counter.
    let mut win_run = 0u32;
    let mut lose_run = 0u32;
    let mut consecutive_wins = 0u32;
    let mut consecutive_losses = 0u32;
    for entry in &ordered {
        match entry.outcome {
            Some(Outcome::Win) => {
                win_run += 1;
                lose_run = 0;
            }
            Some(Outcome::Lose) => {
                lose_run += 1;
                win_run = 0;
            }
            None => {
                win_run = 0;
                lose_run = 0;
            }
        }
        consecutive_wins = consecutive_wins.max(win_run);
        consecutive_losses = consecutive_losses.max(lose_run);
    }

    // Groupings keep first-encountered order, which also settles the
    // most-traded tie rule.
    let mut daily: IndexMap<NaiveDate, f64> = IndexMap::new();
    let mut weekly: IndexMap<String, f64> = IndexMap::new();
    let mut per_instrument: IndexMap<String, f64> = IndexMap::new();
    let mut instrument_counts: IndexMap<String, usize> = IndexMap::new();
    for entry in entries {
        let profit = entry.profit.unwrap_or(0.0);
        *daily.entry(entry.date).or_insert(0.0) += profit;
        *weekly.entry(iso_week_label(entry.date)).or_insert(0.0) += profit;
        let label = instrument_label(entry);
        *per_instrument.entry(label.clone()).or_insert(0.0) += profit;
        *instrument_counts.entry(label).or_insert(0) += 1;
    }

    let mut most_traded_instrument: Option<String> = None;
    let mut best_count = 0usize;
    for (instrument, count) in &instrument_counts {
        if *count > best_count {
            best_count = *count;
            most_traded_instrument = Some(instrument.clone());
        }
    }

    DashboardSummary {
        equity,
        total_pnl,
        avg_risk_reward: round2(avg_risk_reward),
        win_rate: round2(win_rate),
        max_drawdown_pct: round2(max_drawdown_pct),
        total_trades,
        avg_profit_per_win,
        avg_loss_per_trade,
        profit_factor,
        largest_win,
        largest_loss,
        most_traded_instrument,
        consecutive_wins,
        consecutive_losses,
        daily_pnl: daily
            .into_iter()
            .map(|(date, pnl)| DailyPnl { date, pnl })
            .collect(),
        weekly_pnl: weekly
            .into_iter()
            .map(|(week, pnl)| WeeklyPnl { week, pnl })
            .collect(),
        profit_per_instrument: per_instrument
            .into_iter()
            .map(|(instrument, pnl)| InstrumentPnl { instrument, pnl })
            .collect(),
    }
}
