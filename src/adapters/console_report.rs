//! Plain-text trade table and run summary for the terminal.

use crate::domain::backtest::BacktestResult;
use crate::domain::metrics::TradeStats;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn format_trade_table(result: &BacktestResult) -> String {
    let trades = result.ledger.trades();
    if trades.is_empty() {
        return "No trades.\n".to_string();
    }

    let mut out = format!(
        "{:>3}  {:<16}  {:<16}  {:<5}  {:>10}  {:>10}  {:>10}  {:<3}\n",
        "#", "entry", "exit", "side", "entry px", "exit px", "profit", "by"
    );
    for (i, t) in trades.iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:<16}  {:<16}  {:<5}  {:>10.2}  {:>10.2}  {:>10.2}  {:<3}\n",
            i + 1,
            t.entry_timestamp.format(TIME_FORMAT).to_string(),
            t.exit_timestamp.format(TIME_FORMAT).to_string(),
            t.side.to_string(),
            t.entry_price,
            t.exit_price,
            t.realized_profit,
            t.exit_reason.to_string(),
        ));
    }
    out
}

pub fn format_summary(result: &BacktestResult, stats: &TradeStats) -> String {
    let mut out = format!("Bars simulated:   {}\n", result.bars_processed);
    if let (Some(first), Some(last)) = (result.first_timestamp, result.last_timestamp) {
        out.push_str(&format!(
            "Period:           {} to {}\n",
            first.format(TIME_FORMAT),
            last.format(TIME_FORMAT)
        ));
    }
    out.push_str(&format!("Total profit:     {:.2}\n", result.total_profit()));
    out.push_str(&format!("Final balance:    {:.2}\n", result.final_balance()));
    out.push_str(&format!("Total trades:     {}\n", stats.total_trades));
    out.push_str(&format!(
        "Exits:            {} SL, {} TP, {} end of data\n",
        stats.stop_loss_exits, stats.take_profit_exits, stats.end_of_data_exits
    ));
    out.push_str(&format!("Win rate:         {:.1}%\n", stats.win_rate * 100.0));
    out.push_str(&format!("Profit factor:    {:.2}\n", stats.profit_factor));
    out.push_str(&format!("Largest win:      {:.2}\n", stats.largest_win));
    out.push_str(&format!("Largest loss:     {:.2}\n", stats.largest_loss));
    out.push_str(&format!("Max drawdown:     -{:.1}%\n", stats.max_drawdown * 100.0));
    out.push_str(&format!("Avg holding time: {:.0} min\n", stats.avg_holding_minutes));
    out
}
