//! Criterion benchmarks for the labeling pipeline hot paths.
//!
//! Benchmarks:
//! 1. Per-row labeling (limit price + four labels)
//! 2. Streak tracking across many instruments
//! 3. Forward returns
//! 4. Backtest under both fill models

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use limitup_core::backtest::{run_backtest, CostModel};
use limitup_core::domain::{AnnotatedBar, Board, DailyBar, Instrument, InstrumentTable};
use limitup_core::labels::{label_bars, DEFAULT_EPS};
use limitup_core::returns::{apply_forward_returns, compute_forward_returns};
use limitup_core::rules::LimitRuleResolver;
use limitup_core::strategy::BuyFirstLimitUpSellNextClose;
use limitup_core::streaks::{apply_streaks, compute_streaks};
use limitup_core::FillModel;

// ── Helpers ──────────────────────────────────────────────────────────

/// Deterministic synthetic market: every 7th session is an opened limit-up,
/// every 11th a one-word limit-up.
fn make_bars(instruments: usize, days: usize) -> Vec<DailyBar> {
    let base_date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    let mut bars = Vec::with_capacity(instruments * days);
    for i in 0..instruments {
        let mut previous_close = 10.0 + i as f64 * 0.37;
        for d in 0..days {
            let limit = (previous_close * 1.1 * 100.0_f64).round() / 100.0;
            let (open, high, low, close) = if d % 11 == 0 {
                (limit, limit, limit, limit)
            } else if d % 7 == 0 {
                (previous_close, limit, previous_close * 0.99, limit)
            } else {
                let drift = ((i + d) as f64 * 0.3).sin() * 0.03;
                let close = (previous_close * (1.0 + drift) * 100.0).round() / 100.0;
                (previous_close, close.max(previous_close), close.min(previous_close), close)
            };
            bars.push(DailyBar {
                instrument_id: format!("{:06}.SH", 600_000 + i),
                trade_date: base_date + chrono::Days::new(d as u64),
                open,
                high,
                low,
                close,
                previous_close,
                volume: 1_000_000.0,
                turnover_amount: close * 1_000_000.0,
            });
            previous_close = close;
        }
    }
    bars
}

fn make_table(instruments: usize) -> InstrumentTable {
    InstrumentTable::new((0..instruments).map(|i| Instrument {
        instrument_id: format!("{:06}.SH", 600_000 + i),
        name: None,
        board: if i % 3 == 0 { Board::Star } else { Board::Main },
        is_special_treatment: i % 10 == 0,
        listing_date: None,
    }))
}

fn make_annotated(instruments: usize, days: usize) -> Vec<AnnotatedBar> {
    let mut rows = label_bars(
        make_bars(instruments, days),
        &make_table(instruments),
        &LimitRuleResolver::default(),
        DEFAULT_EPS,
    );
    apply_streaks(&mut rows);
    apply_forward_returns(&mut rows);
    rows
}

// ── 1. Labeling ──────────────────────────────────────────────────────

fn bench_labeling(c: &mut Criterion) {
    let mut group = c.benchmark_group("labeling");
    let resolver = LimitRuleResolver::default();

    for &instruments in &[10, 100, 500] {
        let bars = make_bars(instruments, 250);
        let table = make_table(instruments);
        group.bench_with_input(
            BenchmarkId::new("label_bars_250d", instruments),
            &instruments,
            |b, _| {
                b.iter(|| label_bars(black_box(bars.clone()), &table, &resolver, DEFAULT_EPS));
            },
        );
    }

    group.finish();
}

// ── 2. Streaks ───────────────────────────────────────────────────────

fn bench_streaks(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaks");

    for &instruments in &[10, 100, 500] {
        let rows = make_annotated(instruments, 250);
        group.bench_with_input(
            BenchmarkId::new("compute_streaks_250d", instruments),
            &instruments,
            |b, _| {
                b.iter(|| compute_streaks(black_box(&rows)));
            },
        );
    }

    group.finish();
}

// ── 3. Forward returns ───────────────────────────────────────────────

fn bench_forward_returns(c: &mut Criterion) {
    let rows = make_annotated(500, 250);
    c.bench_function("forward_returns_500x250", |b| {
        b.iter(|| compute_forward_returns(black_box(&rows)));
    });
}

// ── 4. Backtest ──────────────────────────────────────────────────────

fn bench_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtest");
    let rows = make_annotated(500, 250);
    let costs = CostModel::new(5.0, 5.0);

    for model in FillModel::ALL {
        group.bench_function(model.as_str(), |b| {
            b.iter(|| {
                run_backtest(
                    black_box(&rows),
                    &BuyFirstLimitUpSellNextClose,
                    model,
                    &costs,
                )
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_labeling,
    bench_streaks,
    bench_forward_returns,
    bench_backtest,
);
criterion_main!(benches);
