//! Benchmarks for the frequency analyzer and report builder
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;

use pawtrack::analysis::{
    trigger_frequencies, FixedClock, FrequencyAnalyzer, TriggerAnalyzer, TriggerBasis,
    WindowPreset, DAY_MILLIS,
};
use pawtrack::events::{
    Category, EventLog, Severity, Subject, SymptomCategory, SymptomEvent, TriggerCategory,
    TriggerEvent,
};
use pawtrack::report::{render, ReportFormat, VetReportBuilder};

const NOW: i64 = 1000 * DAY_MILLIS;

/// One trigger and one symptom per step, spread over the last 120 days
fn create_test_log(count: usize) -> EventLog {
    let triggers = TriggerCategory::all();
    let symptoms = SymptomCategory::all();
    let step = 120 * DAY_MILLIS / count.max(1) as i64;

    let mut log = EventLog::new(Subject::new("bench", "Bench"));
    for i in 0..count {
        let ts = NOW - i as i64 * step;
        let trigger = triggers[i % triggers.len()];
        log.add_trigger(TriggerEvent::new("bench", trigger, ts));

        let severity = Severity::new((i % 5) as u8 + 1).unwrap();
        log.add_symptom(
            SymptomEvent::new("bench", symptoms[i % symptoms.len()], severity, ts)
                .triggers([trigger, triggers[(i * 7) % triggers.len()]]),
        );
    }
    log
}

fn bench_frequencies(c: &mut Criterion) {
    let mut group = c.benchmark_group("frequencies");

    for size in [100, 1000, 10000] {
        let log = create_test_log(size);
        let window = WindowPreset::Last30Days.ending_at(NOW);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("trigger_log_{}", size), |b| {
            b.iter(|| trigger_frequencies(black_box(&log.triggers), Some(&window)))
        });

        for basis in [TriggerBasis::SymptomTags, TriggerBasis::Combined] {
            let analyzer = FrequencyAnalyzer::new(basis);
            group.bench_function(format!("{}_{}", basis, size), |b| {
                b.iter(|| analyzer.trigger_frequencies(black_box(&log), Some(&window)))
            });
        }

        let analyzer = FrequencyAnalyzer::default();
        group.bench_function(format!("co_occurrence_{}", size), |b| {
            b.iter(|| analyzer.co_occurrence(black_box(&log), Some(&window)))
        });
    }

    group.finish();
}

fn bench_report(c: &mut Criterion) {
    let mut group = c.benchmark_group("report");

    let log = create_test_log(5000);
    let builder = VetReportBuilder::new(
        Arc::new(FrequencyAnalyzer::default()),
        Arc::new(FixedClock(NOW)),
    );

    group.bench_function("build_90d", |b| {
        b.iter(|| builder.build(black_box(&log), WindowPreset::Last90Days))
    });

    let report = builder.build(&log, WindowPreset::Last90Days);
    for format in [ReportFormat::Text, ReportFormat::Json, ReportFormat::Csv] {
        group.bench_function(format!("render_{}", format.extension()), |b| {
            b.iter(|| render(black_box(&report), format, 30).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_frequencies, bench_report);
criterion_main!(benches);
