//! Reduction building blocks.
//!
//! Every reducer is an [`Accumulator`]: it absorbs inputs one at a time, can absorb another
//! accumulator of the same type built over *later* input, and finally produces its output.
//! The sequential pipeline only uses [`Accumulator::add`]; the parallel engine in
//! [`crate::execution`] builds one accumulator per chunk and merges them in chunk order, so
//! order-sensitive reducers ([`MaxBy`], [`Distinct`]) give the same answer on both paths.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// A mergeable reducer.
pub trait Accumulator: Default + Send {
    type Input;
    type Output;

    /// Absorb one input.
    fn add(&mut self, input: Self::Input);

    /// Absorb an accumulator built over input that comes after everything `self` has seen.
    fn merge(&mut self, later: Self);

    /// Produce the final result.
    fn finish(self) -> Self::Output;

    /// Absorb every input from `inputs`.
    fn add_all<I>(&mut self, inputs: I)
    where
        I: IntoIterator<Item = Self::Input>,
        Self: Sized,
    {
        for input in inputs {
            self.add(input);
        }
    }
}

/// Counts inputs.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counter(u64);

impl Accumulator for Counter {
    type Input = ();
    type Output = u64;

    fn add(&mut self, _input: ()) {
        self.0 += 1;
    }

    fn merge(&mut self, later: Self) {
        self.0 += later.0;
    }

    fn finish(self) -> u64 {
        self.0
    }
}

/// Arithmetic mean of `f64` inputs. An empty mean finishes as `0.0`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Mean {
    sum: f64,
    count: u64,
}

impl Accumulator for Mean {
    type Input = f64;
    type Output = f64;

    fn add(&mut self, input: f64) {
        self.sum += input;
        self.count += 1;
    }

    fn merge(&mut self, later: Self) {
        self.sum += later.sum;
        self.count += later.count;
    }

    fn finish(self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Keeps the value with the greatest key. On equal keys the first one seen wins.
#[derive(Debug, Clone, PartialEq)]
pub struct MaxBy<T> {
    best: Option<(f64, T)>,
}

impl<T> Default for MaxBy<T> {
    fn default() -> Self {
        Self { best: None }
    }
}

impl<T: Send> Accumulator for MaxBy<T> {
    type Input = (f64, T);
    type Output = Option<T>;

    fn add(&mut self, (key, value): (f64, T)) {
        let replace = match &self.best {
            Some((best, _)) => key > *best,
            None => true,
        };
        if replace {
            self.best = Some((key, value));
        }
    }

    fn merge(&mut self, later: Self) {
        if let Some(best) = later.best {
            self.add(best);
        }
    }

    fn finish(self) -> Option<T> {
        self.best.map(|(_, v)| v)
    }
}

/// Routes each input to a per-key accumulator.
#[derive(Debug, Clone)]
pub struct GroupBy<K, A> {
    groups: HashMap<K, A>,
}

impl<K, A> Default for GroupBy<K, A> {
    fn default() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }
}

impl<K, A> GroupBy<K, A> {
    /// Number of distinct keys seen so far.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<K, A> Accumulator for GroupBy<K, A>
where
    K: Eq + Hash + Send,
    A: Accumulator,
{
    type Input = (K, A::Input);
    type Output = HashMap<K, A::Output>;

    fn add(&mut self, (key, input): (K, A::Input)) {
        self.groups.entry(key).or_default().add(input);
    }

    fn merge(&mut self, later: Self) {
        for (key, acc) in later.groups {
            self.groups.entry(key).or_default().merge(acc);
        }
    }

    fn finish(self) -> HashMap<K, A::Output> {
        self.groups
            .into_iter()
            .map(|(k, acc)| (k, acc.finish()))
            .collect()
    }
}

/// Deduplicates inputs, keeping first-occurrence order.
#[derive(Debug, Clone)]
pub struct Distinct<T> {
    seen: HashSet<T>,
    items: Vec<T>,
}

impl<T> Default for Distinct<T> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }
}

impl<T> Accumulator for Distinct<T>
where
    T: Eq + Hash + Clone + Send,
{
    type Input = T;
    type Output = Vec<T>;

    fn add(&mut self, input: T) {
        if self.seen.insert(input.clone()) {
            self.items.push(input);
        }
    }

    fn merge(&mut self, later: Self) {
        self.add_all(later.items);
    }

    fn finish(self) -> Vec<T> {
        self.items
    }
}

/// Direction of a count ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    Ascending,
    Descending,
}

/// Sort `(key, count)` pairs by count, breaking ties on the key ascending, and keep at most
/// `limit` of them.
pub fn rank_by_count<K: Ord>(
    counts: HashMap<K, u64>,
    order: RankOrder,
    limit: Option<usize>,
) -> Vec<(K, u64)> {
    let mut ranked: Vec<(K, u64)> = counts.into_iter().collect();
    ranked.sort_by(|(ka, a), (kb, b)| {
        let by_count = match order {
            RankOrder::Ascending => a.cmp(b),
            RankOrder::Descending => b.cmp(a),
        };
        by_count.then_with(|| ka.cmp(kb))
    });
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}
