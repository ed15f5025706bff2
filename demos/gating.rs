//! Demo: a producer gated by a changing set of consumers.
//!
//! One producer publishes into a ring of `--ring-size` slots and may never
//! run more than a ring ahead of the slowest consumer. Consumers join and
//! leave while the producer is running; the final progress is printed with
//! the selected observer.
//!
//! Run with:
//! ```bash
//! RUST_LOG=sequenze=debug cargo run --example gating --features demo -- --help
//! ```

use clap::{Parser, ValueEnum};
use sequenze::adapters::Labeled;
use sequenze::observers::json::JsonObserver;
use sequenze::observers::prometheus::PrometheusObserver;
use sequenze::observers::table::{TableObserver, TableStyle};
use sequenze::sequences::group::SequenceGroup;
use sequenze::sequences::sequence::Sequence;
use sequenze::sequences::Observable;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Output format for the final progress report.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty ASCII table
    Table,
    /// Compact table with multiple columns
    Compact,
    /// JSON format
    Json,
    /// Prometheus exposition format
    Prometheus,
}

/// Runs a producer gated by consumers that join and leave concurrently.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Number of consumers present from the start
    #[arg(short, long, default_value = "3")]
    consumers: usize,

    /// Number of consumers joining while the producer runs
    #[arg(long, default_value = "2")]
    late_consumers: usize,

    /// Number of slots in the ring
    #[arg(long, default_value = "1024")]
    ring_size: i64,

    /// Number of slots the producer publishes
    #[arg(short, long, default_value = "1000000")]
    events: i64,

    /// Prometheus metric namespace (prefix)
    #[arg(long, default_value = "gating")]
    namespace: String,
}

/// Consumes up to the producer cursor until told to stop.
fn spawn_consumer(
    cursor: Arc<Sequence>,
    sequence: Arc<Sequence>,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !stop.load(Ordering::Acquire) {
            let available = cursor.get();
            if available > sequence.get() {
                sequence.lazy_set(available);
            } else {
                thread::yield_now();
            }
        }
    })
}

fn render(args: &Args, sequences: Vec<&dyn Observable>) -> String {
    match args.format {
        OutputFormat::Table => TableObserver::new()
            .with_style(TableStyle::Rounded)
            .with_title("Final progress")
            .render(sequences.into_iter()),
        OutputFormat::Compact => TableObserver::new()
            .compact(true)
            .columns(3)
            .render(sequences.into_iter()),
        OutputFormat::Json => JsonObserver::new()
            .pretty(true)
            .wrap_in_snapshot(true)
            .include_timestamp(true)
            .to_json(sequences.into_iter())
            .unwrap_or_else(|e| format!("Error: {}", e)),
        OutputFormat::Prometheus => PrometheusObserver::new()
            .with_namespace(&args.namespace)
            .with_help("cursor", "Last slot published by the producer")
            .with_help("consumer", "Last slot processed by a consumer")
            .with_help("gating", "Slowest consumer the producer waits for")
            .render(sequences.into_iter())
            .unwrap_or_else(|e| format!("Error: {}", e)),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let ring_size = args.ring_size.max(1);

    let cursor = Arc::new(Sequence::default().with_name("cursor"));
    let gating = Arc::new(SequenceGroup::new().with_name("gating"));
    let stop = Arc::new(AtomicBool::new(false));

    let mut consumers = Vec::new();
    let mut handles = Vec::new();
    for _ in 0..args.consumers {
        let sequence = Arc::new(Sequence::default().with_name("consumer"));
        gating.add(Arc::clone(&sequence));
        handles.push(spawn_consumer(
            Arc::clone(&cursor),
            Arc::clone(&sequence),
            Arc::clone(&stop),
        ));
        consumers.push(sequence);
    }

    let join_every = args.events / (args.late_consumers as i64 + 1);
    let mut next = 0;
    while next < args.events {
        // Wait for the slowest consumer to free the slot. An empty group gates
        // nothing.
        while next.saturating_sub(gating.get()) > ring_size && !gating.is_empty() {
            thread::yield_now();
        }
        cursor.set(next);

        let joining = join_every > 0 && next > 0 && next % join_every == 0;
        if joining && consumers.len() < args.consumers + args.late_consumers {
            let sequence = Arc::new(Sequence::default().with_name("consumer"));
            gating.add_while_running(&*cursor, Arc::clone(&sequence));
            handles.push(spawn_consumer(
                Arc::clone(&cursor),
                Arc::clone(&sequence),
                Arc::clone(&stop),
            ));
            info!(slot = next, members = gating.size(), "consumer joined");
            consumers.push(sequence);
        }
        next += 1;
    }

    // Let the consumers drain, then retire the first one.
    while gating.get() < args.events - 1 && !gating.is_empty() {
        thread::sleep(Duration::from_millis(1));
    }
    if let Some(first) = consumers.first() {
        gating.remove(first);
        info!(members = gating.size(), "consumer left");
    }

    stop.store(true, Ordering::Release);
    for handle in handles {
        if let Err(panic) = handle.join() {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(%message, "consumer thread panicked");
        }
    }

    let labeled: Vec<_> = consumers
        .iter()
        .enumerate()
        .map(|(i, sequence)| {
            Labeled::new(Arc::clone(sequence)).with_label("id", i.to_string())
        })
        .collect();

    let mut sequences: Vec<&dyn Observable> = vec![&*cursor as &dyn Observable, &*gating];
    sequences.extend(labeled.iter().map(|s| s as &dyn Observable));

    println!("{}", render(&args, sequences));
}
