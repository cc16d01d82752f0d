use clock::{Clock, HybridTime, LogicalClock};
use proptest::prelude::*;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Op {
    Now,
    Update(u64),
    IsAfterIssued,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Now),
        (0u64..1_000_000).prop_map(Op::Update),
        Just(Op::IsAfterIssued),
    ]
}

proptest! {
    /// Whatever mix of advances and merges happens, issued values strictly increase and each one
    /// lands after every observation merged before it.
    #[test]
    fn prop_issued_values_increase_and_follow_observations(
        start in 1u64..1_000,
        ops in prop::collection::vec(op(), 1..200),
    ) {
        let clock = LogicalClock::create_starting_at(HybridTime::new(start)).unwrap();
        let mut last_issued: Option<HybridTime> = None;
        let mut max_seen = start;

        for op in ops {
            match op {
                Op::Now => {
                    let now = clock.now().unwrap();
                    prop_assert_eq!(now.value(), max_seen + 1);
                    if let Some(last) = last_issued {
                        prop_assert!(now > last);
                    }
                    last_issued = Some(now);
                    max_seen = now.value();
                }
                Op::Update(v) => {
                    clock.update(HybridTime::new(v)).unwrap();
                    max_seen = max_seen.max(v);
                    prop_assert_eq!(clock.peek().unwrap().value(), max_seen);
                }
                Op::IsAfterIssued => {
                    if let Some(last) = last_issued {
                        prop_assert!(clock.is_after(last).unwrap());
                        max_seen += 1;
                    }
                }
            }
        }
    }

    #[test]
    fn prop_update_then_now(current in 1u64..1_000_000, observed in 0u64..2_000_000) {
        let clock = LogicalClock::create_starting_at(HybridTime::new(current)).unwrap();
        clock.update(HybridTime::new(observed)).unwrap();
        let expected = current.max(observed) + 1;
        prop_assert_eq!(clock.now().unwrap().value(), expected);
    }

    #[test]
    fn prop_logical_wait_always_unavailable(target in any::<u64>(), millis in 0u64..10_000) {
        let clock = LogicalClock::create_starting_at(HybridTime::INITIAL).unwrap();
        let result = clock.wait_until_after(
            HybridTime::new(target),
            Instant::now() + Duration::from_millis(millis),
        );
        prop_assert!(result.unwrap_err().is_service_unavailable());
        prop_assert_eq!(clock.peek().unwrap(), HybridTime::INITIAL);
    }
}
