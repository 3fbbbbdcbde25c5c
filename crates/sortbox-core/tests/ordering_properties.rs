use proptest::prelude::*;
use sortbox_core::{PrioritySorter, Record, Sandbox, SandboxConfig, SortKey, SwapSelection};
use std::collections::HashSet;

fn sort_key() -> impl Strategy<Value = SortKey> {
    prop_oneof![
        Just(SortKey::Status),
        Just(SortKey::Priority),
        Just(SortKey::Time),
    ]
}

fn records(max_len: usize, max_time: u64) -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec((1u8..=4, 1u8..=3, 1u64..=max_time), 0..max_len).prop_map(|fields| {
        fields
            .into_iter()
            .enumerate()
            .map(|(idx, (status, priority, time))| {
                Record::new(idx as u32, status, priority, time).expect("in-range record")
            })
            .collect()
    })
}

fn sorter_after(swaps: &[SortKey]) -> PrioritySorter {
    let mut sorter = PrioritySorter::default();
    for key in swaps {
        sorter.select_for_swap(*key);
    }
    sorter
}

proptest! {
    #[test]
    fn weight_order_stays_a_permutation(swaps in prop::collection::vec(sort_key(), 0..40)) {
        let sorter = sorter_after(&swaps);
        let keys: HashSet<SortKey> = sorter.order().iter().collect();
        prop_assert_eq!(keys.len(), 3);
        for key in SortKey::ALL {
            prop_assert!(keys.contains(&key));
        }

        let expected_armed = swaps.len() % 2 == 1;
        prop_assert_eq!(sorter.armed_key().is_some(), expected_armed);
        if !expected_armed {
            prop_assert_eq!(sorter.selection(), SwapSelection::Idle);
        }
    }

    #[test]
    fn sorted_output_is_ordered_and_stable(
        input in records(24, 4),
        swaps in prop::collection::vec(sort_key(), 0..8),
    ) {
        let sorter = sorter_after(&swaps);
        let mut sorted = input.clone();
        sorter.sort(&mut sorted);

        prop_assert_eq!(sorted.len(), input.len());
        for pair in sorted.windows(2) {
            let ordering = sorter.compare(&pair[0], &pair[1]);
            prop_assert!(ordering.is_le());
            if ordering.is_eq() {
                // input ids follow insertion order
                prop_assert!(pair[0].id < pair[1].id);
            }
        }
    }

    #[test]
    fn sandbox_view_matches_weight_order(
        seed in any::<u64>(),
        adds in 0usize..6,
        acks in prop::collection::vec(0u32..10, 0..6),
        swaps in prop::collection::vec(sort_key(), 0..6),
    ) {
        let mut sandbox = Sandbox::new(SandboxConfig {
            rng_seed: Some(seed),
            ..SandboxConfig::default()
        });
        for _ in 0..adds {
            sandbox.add_record();
        }
        for id in acks {
            sandbox.acknowledge_record(id);
        }
        for key in swaps {
            sandbox.arm_or_swap_weight(key);
        }

        let order = sandbox.weight_order();
        prop_assert_eq!(sandbox.len(), 3 + adds);
        for pair in sandbox.sorted_records().windows(2) {
            prop_assert!(order.compare(&pair[0], &pair[1]).is_lt());
        }
        let ids: HashSet<u32> = sandbox.sorted_records().iter().map(|r| r.id).collect();
        prop_assert_eq!(ids.len(), sandbox.len());
    }
}
