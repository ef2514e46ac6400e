//! SVG balance-curve chart implementing ReportPort.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BandtraderError;
use crate::domain::ledger::Ledger;
use crate::ports::report_port::ReportPort;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 400.0;
const PADDING: f64 = 50.0;

/// Render the balance after each trade, starting from the initial balance.
pub fn format_balance_chart(ledger: &Ledger) -> String {
    let balances: Vec<f64> = std::iter::once(ledger.initial_balance())
        .chain(ledger.balance_series().map(|p| p.balance))
        .map(|b| b.to_f64().unwrap_or_default())
        .collect();

    let min = balances.iter().copied().fold(f64::INFINITY, f64::min);
    let max = balances.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;
    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if balances.len() > 1 {
        plot_width / (balances.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<(f64, f64)> = balances
        .iter()
        .enumerate()
        .map(|(i, balance)| {
            let x = PADDING + i as f64 * scale_x;
            let y = HEIGHT - PADDING - (balance - min) * scale_y;
            (x, y)
        })
        .collect();
    let polyline: Vec<String> = points.iter().map(|(x, y)| format!("{x:.1},{y:.1}")).collect();

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH:.0}" height="{HEIGHT:.0}" viewBox="0 0 {WIDTH:.0} {HEIGHT:.0}">"#
    );
    svg.push('\n');
    svg.push_str("  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{:.0}\" y=\"{:.0}\" text-anchor=\"middle\" font-family=\"sans-serif\" font-size=\"16\">Balance over trades</text>\n",
        WIDTH / 2.0,
        PADDING / 2.0
    ));
    svg.push_str(&format!(
        "  <line x1=\"{PADDING:.0}\" y1=\"{PADDING:.0}\" x2=\"{PADDING:.0}\" y2=\"{:.0}\" stroke=\"black\"/>\n",
        HEIGHT - PADDING
    ));
    svg.push_str(&format!(
        "  <line x1=\"{PADDING:.0}\" y1=\"{y:.0}\" x2=\"{x:.0}\" y2=\"{y:.0}\" stroke=\"black\"/>\n",
        y = HEIGHT - PADDING,
        x = WIDTH - PADDING
    ));
    svg.push_str(&axis_label(PADDING, max));
    svg.push_str(&axis_label(HEIGHT - PADDING, min));
    svg.push_str(&format!(
        "  <polyline fill=\"none\" stroke=\"blue\" stroke-width=\"2\" points=\"{}\"/>\n",
        polyline.join(" ")
    ));
    for (x, y) in &points {
        svg.push_str(&format!(
            "  <circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"3\" fill=\"blue\"/>\n"
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

fn axis_label(y: f64, balance: f64) -> String {
    format!(
        "  <text x=\"5\" y=\"{y:.0}\" font-family=\"sans-serif\" font-size=\"10\">{balance:.2}</text>\n"
    )
}

pub struct SvgChartAdapter;

impl ReportPort for SvgChartAdapter {
    fn write(&self, result: &BacktestResult, output_path: &Path) -> Result<(), BandtraderError> {
        std::fs::write(output_path, format_balance_chart(&result.ledger))?;
        Ok(())
    }
}
