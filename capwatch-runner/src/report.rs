//! Plain-text report rendering with indicator glyphs.
//!
//! Two messages per run: the macro snapshot and the market-cap ranking
//! report. Warm-up placeholders are normal body text, not errors; a failed
//! stage gets a stand-in message so the recipient always hears something.

use crate::pipeline::McapAnalysis;
use capwatch_core::analysis::{Direction, MomentumReport, RankDeltaReport, RankMove};
use capwatch_core::macroview::MacroSnapshot;
use chrono::NaiveDate;

fn glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "🟢",
        Direction::Down => "🔻",
        Direction::Flat => "➖",
    }
}

/// Group an integer part with thousands separators: 1234567.89 → "1,234,567.89".
fn format_value(v: f64) -> String {
    let formatted = format!("{v:.2}");
    let (int_part, frac) = formatted.split_once('.').expect("fixed-point format");
    let digits = int_part.trim_start_matches('-');

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if int_part.starts_with('-') { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

// ─── Macro message ──────────────────────────────────────────────────

pub fn render_macro(snapshot: &MacroSnapshot) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(&format!("🌍 [Global Markets] {}\n", snapshot.date));
    out.push_str(&"─".repeat(30));
    out.push('\n');

    for line in &snapshot.lines {
        out.push_str(&format!("{} {}\n", glyph(line.direction), line.name));
        out.push_str(&format!(
            "   {} ({:+.2}%)\n",
            format_value(line.value),
            line.change_pct
        ));
    }

    if !snapshot.skipped.is_empty() {
        out.push_str(&format!(
            "({} indicators unavailable)\n",
            snapshot.skipped.len()
        ));
    }

    out
}

pub fn render_macro_error(date: NaiveDate, error: &str) -> String {
    format!("⚠️ [Global Markets] {date}\nreport unavailable: {error}\n")
}

// ─── Market-cap message ─────────────────────────────────────────────

pub fn render_mcap(analysis: &McapAnalysis) -> String {
    let mut out = String::with_capacity(1024);
    out.push_str(&format!("🏆 [Market Cap Rankings] {}\n", analysis.date));
    out.push_str(&"═".repeat(30));
    out.push('\n');

    match &analysis.deltas {
        RankDeltaReport::Warmup { .. } => {
            out.push_str("\n🔥 [Top 10]\n");
            out.push_str("   collecting data — rank analysis starts on day 2\n");
        }
        RankDeltaReport::Ready {
            top_moves,
            mid_moves,
        } => {
            out.push_str("\n🔥 [Top 10]\n");
            if top_moves.is_empty() {
                out.push_str("   no change\n");
            }
            for m in top_moves {
                out.push_str(&format!("🔥 {}: #{} → #{}\n", m.symbol, m.prev, m.now));
            }

            out.push_str("\n📊 [Ranks 11–30]\n");
            if mid_moves.is_empty() {
                out.push_str("   no change\n");
            }
            for m in mid_moves {
                out.push_str(&format!(
                    "{} {}: #{} → #{}\n",
                    move_glyph(m),
                    m.symbol,
                    m.prev,
                    m.now
                ));
            }
        }
    }

    out.push_str("\n🌊 [20-day average Top 30]\n");
    match &analysis.momentum {
        MomentumReport::Warmup { have, need } => {
            out.push_str(&format!("   collecting data ({have}/{need} days)\n"));
        }
        MomentumReport::Ready { entered, exited } => {
            for e in entered {
                out.push_str(&format!("🚀 [IN] {} (avg #{})\n", e.symbol, e.mean_rank));
            }
            for symbol in exited {
                out.push_str(&format!("🍂 [OUT] {symbol}\n"));
            }
            if entered.is_empty() && exited.is_empty() {
                out.push_str("   no change\n");
            }
        }
    }

    if analysis.skipped_symbols > 0 {
        out.push_str(&format!(
            "\n({} symbols skipped: no data)\n",
            analysis.skipped_symbols
        ));
    }

    out
}

fn move_glyph(m: &RankMove) -> &'static str {
    glyph(m.direction())
}

pub fn render_mcap_error(date: NaiveDate, error: &str) -> String {
    format!("⚠️ [Market Cap Rankings] {date}\nreport unavailable: {error}\n")
}
