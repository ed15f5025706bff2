//! Benchmark comparing the copy-on-write group with a mutex-guarded vector.
//!
//! A producer thread reads the gating value in a tight loop while other
//! threads keep adding and removing members. The lock-free group never makes
//! the reader wait; the mutex baseline serializes reads and membership changes.
//!
//! Run with:
//! ```bash
//! cargo bench --bench group_vs_mutex
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sequenze::sequences::group::SequenceGroup;
use sequenze::sequences::minimum_sequence;
use sequenze::sequences::sequence::Sequence;

const MEMBERS: usize = 8;
const READS: usize = 1_000_000;

fn bench_gating_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("gating_read");

    for churners in [0usize, 1, 4] {
        group.bench_function(
            BenchmarkId::new(
                "SequenceGroup (copy-on-write)",
                format!("{}churners x {}reads", churners, READS),
            ),
            |b| {
                b.iter(|| {
                    let gating = Arc::new(SequenceGroup::new());
                    for i in 0..MEMBERS {
                        gating.add(Arc::new(Sequence::new(i as i64)));
                    }
                    let stop = Arc::new(AtomicBool::new(false));

                    let handles: Vec<_> = (0..churners)
                        .map(|_| {
                            let gating = Arc::clone(&gating);
                            let stop = Arc::clone(&stop);
                            thread::spawn(move || {
                                let sequence = Arc::new(Sequence::new(1));
                                while !stop.load(Ordering::Relaxed) {
                                    gating.add(Arc::clone(&sequence));
                                    gating.remove(&sequence);
                                }
                            })
                        })
                        .collect();

                    let mut minimum = i64::MAX;
                    for _ in 0..READS {
                        minimum = minimum.min(black_box(gating.get()));
                    }

                    stop.store(true, Ordering::Relaxed);
                    for handle in handles {
                        handle.join().unwrap();
                    }

                    black_box(minimum)
                })
            },
        );

        group.bench_function(
            BenchmarkId::new(
                "Mutex<Vec> (locked)",
                format!("{}churners x {}reads", churners, READS),
            ),
            |b| {
                b.iter(|| {
                    let gating: Arc<Mutex<Vec<Arc<Sequence>>>> = Arc::new(Mutex::new(
                        (0..MEMBERS)
                            .map(|i| Arc::new(Sequence::new(i as i64)))
                            .collect(),
                    ));
                    let stop = Arc::new(AtomicBool::new(false));

                    let handles: Vec<_> = (0..churners)
                        .map(|_| {
                            let gating = Arc::clone(&gating);
                            let stop = Arc::clone(&stop);
                            thread::spawn(move || {
                                let sequence = Arc::new(Sequence::new(1));
                                while !stop.load(Ordering::Relaxed) {
                                    gating.lock().unwrap().push(Arc::clone(&sequence));
                                    gating
                                        .lock()
                                        .unwrap()
                                        .retain(|member| !Arc::ptr_eq(member, &sequence));
                                }
                            })
                        })
                        .collect();

                    let mut minimum = i64::MAX;
                    for _ in 0..READS {
                        let members = gating.lock().unwrap();
                        minimum = minimum.min(black_box(minimum_sequence(&members, i64::MAX)));
                    }

                    stop.store(true, Ordering::Relaxed);
                    for handle in handles {
                        handle.join().unwrap();
                    }

                    black_box(minimum)
                })
            },
        );
    }

    group.finish();
}

fn bench_membership_change(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership_change");

    for members in [1usize, 16, 256] {
        group.bench_with_input(
            BenchmarkId::new("add + remove", members),
            &members,
            |b, &members| {
                let gating = SequenceGroup::new();
                for i in 0..members {
                    gating.add(Arc::new(Sequence::new(i as i64)));
                }
                let sequence = Arc::new(Sequence::new(0));
                b.iter(|| {
                    gating.add(Arc::clone(&sequence));
                    black_box(gating.remove(&sequence))
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_gating_read, bench_membership_change);
criterion_main!(benches);
