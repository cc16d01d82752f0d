use clock::physical::ManualPhysicalClock;
use clock::{Clock, ClockHandle, HybridClock, HybridTime, LogicalClock};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const CALLS_PER_THREAD: usize = 2_000;

/// Runs `now()` from many threads at once and returns every value in the order each thread got it.
fn hammer_now(clock: &ClockHandle) -> Vec<Vec<HybridTime>> {
    thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    (0..CALLS_PER_THREAD)
                        .map(|_| clock.now().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

#[test]
fn test_concurrent_now_on_logical_clock_is_contiguous() {
    let clock: ClockHandle = LogicalClock::create_starting_at(HybridTime::INITIAL).unwrap();
    let per_thread = hammer_now(&clock);

    for values in &per_thread {
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    let mut all: Vec<u64> = per_thread.into_iter().flatten().map(u64::from).collect();
    all.sort_unstable();
    let expected: Vec<u64> = (2..2 + (THREADS * CALLS_PER_THREAD) as u64).collect();
    // No duplicates and no lost updates: exactly the next N values were handed out.
    assert_eq!(all, expected);
}

#[test]
fn test_concurrent_now_on_hybrid_clock_is_unique() {
    let physical = Arc::new(ManualPhysicalClock::new(1_000, 0));
    let clock: ClockHandle = HybridClock::create_starting_at(HybridTime::INITIAL, physical, 500).unwrap();
    let per_thread = hammer_now(&clock);

    for values in &per_thread {
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }
    let unique: HashSet<HybridTime> = per_thread.iter().flatten().copied().collect();
    assert_eq!(unique.len(), THREADS * CALLS_PER_THREAD);
}

#[test]
fn test_concurrent_updates_and_now_never_regress() {
    let clock: ClockHandle = LogicalClock::create_starting_at(HybridTime::INITIAL).unwrap();
    let observed_max = 50_000u64;

    let issued = thread::scope(|s| {
        let updaters: Vec<_> = (0..THREADS as u64)
            .map(|t| {
                let clock = &clock;
                s.spawn(move || {
                    for v in (t..observed_max).step_by(THREADS * 97) {
                        clock.update(HybridTime::new(v)).unwrap();
                    }
                    clock.update(HybridTime::new(observed_max)).unwrap();
                })
            })
            .collect();
        let reader = s.spawn(|| {
            (0..CALLS_PER_THREAD)
                .map(|_| clock.now().unwrap())
                .collect::<Vec<_>>()
        });
        for u in updaters {
            u.join().unwrap();
        }
        reader.join().unwrap()
    });

    assert!(issued.windows(2).all(|w| w[0] < w[1]));
    // Every update has returned, so the next value orders after all of them.
    assert!(clock.now().unwrap().value() > observed_max);
}

#[test]
fn test_shutdown_while_in_use() {
    let clock: ClockHandle = LogicalClock::create_starting_at(HybridTime::INITIAL).unwrap();
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                let mut last = HybridTime::MIN;
                // Runs until the shutdown lands; every value issued before that is still ordered.
                while let Ok(now) = clock.now() {
                    assert!(now > last);
                    last = now;
                }
            });
        }
        clock.shutdown();
    });
    assert!(clock.now().unwrap_err().is_shut_down());
    assert!(clock.update(HybridTime::new(10)).unwrap_err().is_shut_down());
}
