//! Property-based tests for the worker pool.
//!
//! These tests use proptest to generate random batch sizes and worker
//! counts and verify that no item is ever lost or duplicated.

#[cfg(test)]
mod proptest_tests {
    use crate::pool::WorkerPool;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: the pool returns exactly one result per input item
        #[test]
        fn run_yields_exactly_one_result_per_item(
            items in prop::collection::vec(any::<u16>(), 0..200),
            workers in 1usize..12,
        ) {
            let pool = WorkerPool::new(workers);
            let mut results = pool.run(items.clone(), |n| *n, |n, _| *n);
            let mut expected = items;
            results.sort_unstable();
            expected.sort_unstable();
            prop_assert_eq!(results, expected);
        }

        /// Property: a panicking item only affects its own result
        #[test]
        fn panics_do_not_leak_into_siblings(
            len in 1usize..60,
            poisoned in 0usize..60,
            workers in 1usize..8,
        ) {
            let poisoned = poisoned % len;
            let items: Vec<usize> = (0..len).collect();
            let pool = WorkerPool::new(workers);
            let results = pool.run(
                items,
                |n| {
                    if *n == poisoned {
                        panic!("poisoned item");
                    }
                    (*n, true)
                },
                |n, _| (*n, false),
            );

            prop_assert_eq!(results.len(), len);
            for (n, ok) in results {
                prop_assert_eq!(ok, n != poisoned);
            }
        }
    }
}
