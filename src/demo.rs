//! Stand-alone demonstrations of lazy and parallel iteration.
//!
//! Nothing here touches the catalog.

use std::collections::BTreeMap;

use rayon::prelude::*;

/// The first `count` even numbers, taken from an unbounded counter starting at 1.
pub fn even_numbers(count: usize) -> Vec<u64> {
    (1u64..).filter(|n| n % 2 == 0).take(count).collect()
}

/// Enumerate `1..=upper` in parallel, grouping each number under the name of the worker that
/// handled it. Calls made outside a rayon pool are grouped under `"main"`.
pub fn numbers_per_worker(upper: u32) -> BTreeMap<String, Vec<u32>> {
    let tagged: Vec<(String, u32)> = (1..=upper)
        .into_par_iter()
        .map(|n| (worker_name(), n))
        .collect();

    let mut out: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    for (worker, n) in tagged {
        out.entry(worker).or_default().push(n);
    }
    out
}

fn worker_name() -> String {
    match rayon::current_thread_index() {
        Some(idx) => format!("worker-{idx}"),
        None => "main".to_string(),
    }
}
