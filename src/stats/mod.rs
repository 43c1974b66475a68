//! Stats module - Headline metrics and distribution summaries

mod calculator;

pub use calculator::{BoxSummary, Kpis, StatsCalculator};
