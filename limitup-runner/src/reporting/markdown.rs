//! Markdown digest of a study.

use crate::runner::StudyResult;
use crate::stats::ReturnStats;
use chrono::NaiveDate;

fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn pct(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:+.2}%", v * 100.0))
        .unwrap_or_else(|| "-".to_string())
}

fn headline(study: &StudyResult) -> String {
    let s = &study.summary;
    if s.limit_up_days == 0 {
        return "No limit-up days were identified in the sample; the data cannot support \
                conclusions about limit-up behaviour."
            .to_string();
    }
    format!(
        "{} limit-up days identified: {:.1}% sealed, {:.1}% one-word, median next-open \
         premium {:+.2}%. The same strategy differs by {:+.2}% in total return between \
         IDEAL and CONSERVATIVE fills.",
        s.limit_up_days,
        s.sealed_ratio * 100.0,
        s.one_word_ratio * 100.0,
        s.next_open_ret_median * 100.0,
        s.ideal_conservative_gap.unwrap_or(0.0) * 100.0,
    )
}

/// Render `report.md`: headline, KPIs, fill-model comparison and grouped quantiles.
pub fn render_report(study: &StudyResult) -> String {
    let s = &study.summary;
    let mut report = format!(
        "# Limit-Up Study Report\n\n\
Run ID: `{}`\n\n\
{}\n\n\
## Summary\n\
- Period: {} to {}\n\
- Samples: {} ({} instruments)\n\
- Limit-up days: {} ({:.2}% of samples)\n\
- Sealed ratio: {:.1}%\n\
- One-word ratio: {:.1}%\n\
- Blocked under CONSERVATIVE: {} ({:.1}%)\n\
- Median next-open premium: {:+.2}%\n",
        study.run_id,
        headline(study),
        date_or_dash(s.start_date),
        date_or_dash(s.end_date),
        s.total_rows,
        s.total_instruments,
        s.limit_up_days,
        s.limit_up_rate * 100.0,
        s.sealed_ratio * 100.0,
        s.one_word_ratio * 100.0,
        s.blocked_buy_days_conservative,
        s.blocked_buy_ratio_conservative * 100.0,
        s.next_open_ret_median * 100.0,
    );

    report.push_str(&format!(
        "\n## Fill Model Comparison\n\nStrategy: `{}` (fee {} bps, slippage {} bps)\n\n",
        study.comparison.strategy_id, study.costs.fee_bps, study.costs.slippage_bps
    ));
    report.push_str("| Fill Model | Trades | Total Return | Max Drawdown | Win Rate |\n");
    report.push_str("|------------|--------|--------------|--------------|----------|\n");
    for run in &study.comparison.runs {
        let m = &run.summary;
        report.push_str(&format!(
            "| {} | {} | {:+.2}% | {:+.2}% | {:.1}% |\n",
            m.fill_model,
            m.trade_count,
            m.total_return * 100.0,
            m.max_drawdown * 100.0,
            m.win_rate * 100.0
        ));
    }

    if !study.groups.is_empty() {
        report.push_str("\n## Next-Day Returns by Group\n\n");
        let key_names: Vec<&str> = study.groups[0].keys.iter().map(|(k, _)| k.as_str()).collect();
        report.push_str(&format!(
            "| {} | Count | Open p10 | Open p50 | Open p90 | Close p10 | Close p50 | Close p90 |\n",
            key_names.join(" | ")
        ));
        report.push_str(&format!("|{}\n", "---|".repeat(key_names.len() + 7)));
        for group in &study.groups {
            let values: Vec<String> = group.keys.iter().map(|(_, v)| v.to_string()).collect();
            let quantiles = |r: &ReturnStats| [pct(r.p10), pct(r.p50), pct(r.p90)].join(" | ");
            report.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                values.join(" | "),
                group.count,
                quantiles(&group.next_open_ret),
                quantiles(&group.next_close_ret)
            ));
        }
    }

    report.push_str(&format!(
        "\n## Provenance\n\n- Dataset hash: `{}`\n- Rules: {}\n- Epsilon: {}\n",
        study.dataset_hash,
        study
            .rule_source
            .as_ref()
            .map(|p| format!("`{}`", p.display()))
            .unwrap_or_else(|| "built-in defaults".to_string()),
        study.eps
    ));
    report
}
