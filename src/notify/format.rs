// =============================================================================
// Message formatting — Telegram HTML cards
// =============================================================================

use chrono::NaiveDate;

use crate::indicators::adx::adx_label;
use crate::indicators::rsi::rsi_label;
use crate::scanner::Candidate;

pub const DISCLAIMER: &str = "⚠️ <b>Disclaimer:</b> For educational purposes only.\n\
                              Always do your own analysis. Not financial advice.";

pub const NO_SETUPS: &str = "ℹ️ EOD Scan complete — no strong setups found today.";

/// Escape the three characters Telegram's HTML mode reserves.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn rupees(v: f64) -> String {
    format!("₹{v:.2}")
}

/// Delivery-percentage tier.
pub fn delivery_label(pct: f64) -> &'static str {
    if pct >= 65.0 {
        "🔥 Exceptional"
    } else if pct >= 50.0 {
        "💪 Very High"
    } else if pct >= 35.0 {
        "✅ High"
    } else if pct >= 20.0 {
        "⚖️ Moderate"
    } else {
        "⚠️ Low"
    }
}

/// Opening message of a run.
pub fn header(date: NaiveDate, setups: usize, scanned: usize) -> String {
    format!(
        "🔔 <b>EOD SETUPS — {}</b>\n📋 {} setups from {} scanned\n{}",
        date.format("%d %b %Y"),
        setups,
        scanned,
        "─".repeat(30)
    )
}

/// Full card for the candidate at position `rank` (1-based).
pub fn candidate_card(rank: usize, c: &Candidate) -> String {
    let ind = &c.indicators;
    let ch = &c.channel;
    let pred = &c.prediction;
    let bullish = pred.direction.is_bullish();

    let mut msg = String::new();
    msg.push_str(&"─".repeat(32));
    msg.push('\n');
    msg.push_str(&format!(
        "#{rank}  {} <b>{}</b>",
        if bullish { "🟢📈" } else { "🔴📉" },
        escape_html(&c.symbol)
    ));
    if !c.name.is_empty() {
        msg.push_str(&format!("  |  {}", escape_html(&c.name)));
    }

    msg.push_str(&format!(
        "\n\n🔍 <b>Setup: {} {}</b>\n{}\n",
        c.setup.kind.icon(),
        c.setup.kind,
        escape_html(&c.setup.description)
    ));

    msg.push_str(&format!(
        "\n📐 <b>Support &amp; Resistance  (LR Channel)</b>\
         \n  🔴 R3 {}  ·  R2 {}  ·  R1 {}\
         \n  ▶ CMP {}\
         \n  🟢 S1 {}  ·  S2 {}  ·  S3 {}\n",
        rupees(ch.r3),
        rupees(ch.r2),
        rupees(ch.r1),
        rupees(c.price),
        rupees(ch.s1),
        rupees(ch.s2),
        rupees(ch.s3),
    ));

    msg.push_str(&format!(
        "\n📊 <b>Indicators</b>\
         \n  RSI {:.1} — {}\
         \n  ADX {:.1} — {}\
         \n  MACD: {}\
         \n  Supertrend: {}\
         \n  EMA50 {}  ·  EMA200 {}\
         \n  ATR {:.2}%  ·  Vol Spike {:+.0}%",
        ind.rsi,
        rsi_label(ind.rsi),
        ind.adx,
        adx_label(ind.adx),
        if ind.macd_hist > 0.0 { "▲ Positive" } else { "▼ Negative" },
        if ind.supertrend > 0 { "Bullish 🟩" } else { "Bearish 🟥" },
        rupees(ind.ema50),
        rupees(ind.ema200),
        ind.atr_pct,
        ind.volume_spike_pct,
    ));
    if let Some(vwap) = ind.vwap_dist_pct {
        msg.push_str(&format!("  ·  VWAP {vwap:+.1}%"));
    }
    if let Some(pct) = c.delivery_pct {
        msg.push_str(&format!("\n  Delivery {pct:.0}% — {}", delivery_label(pct)));
    }

    let (target_sign, stop_sign) = if bullish { ('+', '-') } else { ('-', '+') };
    msg.push_str(&format!(
        "\n\n🎯 <b>Prediction  ({} {}  [{}/6 signals])</b>\
         \n  Direction:  <b>{}</b>\
         \n  Target:     {}  ({}{:.1}%)\
         \n  Stop Loss:  {}  ({}{:.1}%)\
         \n  Timeframe:  ~{} trading days",
        c.confidence,
        c.confidence.icon(),
        c.bullish_votes,
        pred.direction,
        rupees(pred.target_price),
        target_sign,
        pred.target_pct,
        rupees(pred.stop_loss),
        stop_sign,
        pred.sl_pct,
        pred.timeframe_days,
    ));

    if let Some(date) = c.result_date {
        msg.push_str(&format!(
            "\n\n📅 Result Date: <b>{}</b>",
            date.format("%d %B %Y")
        ));
    }
    if let Some(fib) = c.fib {
        msg.push_str(&format!("\n🔑 {fib}"));
    }

    msg
}
