//! The protected market dashboard.

use std::fmt::Write;

use screener_protocol::{BreadthIndicator, MarketSnapshot};
use serde::Serialize;

use crate::{Route, View, ViewContext};

/// Headline counts over a market snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarketStats {
    /// Tickers listed in the snapshot.
    pub entries: usize,
    /// Tickers with more than one strategy signalling.
    pub multiple_indicators: usize,
    /// Tickers with exactly one strategy signalling.
    pub single_indicator: usize,
}

impl MarketStats {
    pub fn from_snapshot(snapshot: &MarketSnapshot) -> Self {
        snapshot.tickers().fold(Self::default(), |mut stats, ticker| {
            stats.entries += 1;
            match snapshot.active_strategies(ticker) {
                0 => {}
                1 => stats.single_indicator += 1,
                _ => stats.multiple_indicators += 1,
            }
            stats
        })
    }
}

/// The `/application` page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationView;

impl View for ApplicationView {
    fn route(&self) -> Route {
        Route::Application
    }

    fn render(&self, ctx: &ViewContext<'_>) -> String {
        let mut out = String::from("Market Overview\n===============\n");
        if let Some(user) = ctx.user() {
            let _ = writeln!(out, "Signed in as {}", user.display_name());
        }

        let Some(snapshot) = ctx.market else {
            out.push_str("No market data available.");
            return out;
        };

        let stats = MarketStats::from_snapshot(snapshot);
        let _ = writeln!(out, "{:<22}{:>6}", "Entries", stats.entries);
        let _ = writeln!(out, "{:<22}{:>6}", "Multiple Indicators", stats.multiple_indicators);
        let _ = write!(out, "{:<22}{:>6}", "Single Indicator", stats.single_indicator);

        if let Some(breadth) = &snapshot.market_breadth {
            let _ = write!(
                out,
                "\n\nMarket breadth ({})",
                if breadth.is_entry { "entry" } else { "no entry" }
            );
            write_indicator(&mut out, "SEFI", &breadth.sefi);
            write_indicator(&mut out, "ADR", &breadth.adr);
            for (name, active) in &breadth.strategies {
                let _ = write!(out, "\n  {name}: {}", if *active { "yes" } else { "no" });
            }
        }
        out
    }
}

fn write_indicator(out: &mut String, name: &str, indicator: &BreadthIndicator) {
    let signal = match (indicator.long, indicator.short) {
        (true, _) => "long",
        (false, true) => "short",
        (false, false) => "neutral",
    };
    let _ = write!(out, "\n  {name:<5}{:>10.2}  {signal}", indicator.value);
}
