use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::sync::Arc;
use std::thread;
use flight_gateway::{BookingForm, IntentLedger, SessionId};

fn booking_form(price: f64) -> BookingForm {
    BookingForm {
        airline: "UA".to_string(),
        origin: "JFK".to_string(),
        destination: "LAX".to_string(),
        departure_time: "2025-06-01T08:00".to_string(),
        arrival_time: "2025-06-01T11:00".to_string(),
        price,
        passengers: Some(2),
    }
}

// Capture/drain mix from concurrent request workers sharing one ledger
pub fn ledger_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("intent_ledger");

    // Number of distinct sessions competing for ledger entries
    for sessions in [10usize, 1_000, 100_000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(sessions),
            sessions,
            |b, &sessions| {
                b.iter(|| {
                    let ledger = Arc::new(IntentLedger::default());
                    let session_ids = (0..sessions)
                        .map(|i| SessionId::new(format!("session-{}", i)))
                        .collect::<Vec<_>>();

                    let mut handles = vec![];
                    for _ in 0..4 {
                        let ledger = Arc::clone(&ledger);
                        let session_ids = session_ids.clone();

                        let handle = thread::spawn(move || {
                            let mut rng = thread_rng();
                            let mut drained = 0usize;

                            for _ in 0..250 {
                                let Some(session) = session_ids.choose(&mut rng) else {
                                    break;
                                };

                                if rng.gen_bool(0.6) {
                                    // Anonymous booking attempt
                                    ledger.capture(session, &booking_form(rng.gen_range(50.0..900.0)));
                                } else if ledger.drain(session).is_some() {
                                    // Login resuming a pending attempt
                                    drained += 1;
                                }
                            }
                            drained
                        });

                        handles.push(handle);
                    }

                    let drained: usize = handles
                        .into_iter()
                        .map(|handle| handle.join().unwrap_or(0))
                        .sum();

                    black_box((drained, ledger.len()))
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, ledger_benchmark);
criterion_main!(benches);
