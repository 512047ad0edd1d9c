//! K-fold log splitting for cross-validation.

use crate::event_log::{EventLog, Trace};

/// One cross-validation split. Mining and complexity run on the training
/// log, performance runs on the evaluation log.
#[derive(Debug, Clone)]
pub struct Fold {
    pub index: usize,
    pub training: EventLog,
    pub evaluation: EventLog,
}

/// Produces K train/eval splits of a log. Folds are independent; the index
/// maps deterministically to the `-<index>` run name suffix.
pub trait LogSplitter: Send + Sync {
    fn split(&self, log: &EventLog, k: usize) -> Vec<Fold>;
}

/// Deterministic splitter: shuffles trace indices with a seeded LCG and
/// partitions them into K near-equal chunks. Fold i evaluates on chunk i and
/// trains on everything else.
#[derive(Debug, Clone)]
pub struct ShuffleSplitter {
    seed: u64,
}

impl Default for ShuffleSplitter {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

impl ShuffleSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    fn shuffled_indices(&self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng_state = self.seed;
        for i in (1..n).rev() {
            rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let j = (rng_state >> 33) as usize % (i + 1);
            indices.swap(i, j);
        }
        indices
    }
}

impl LogSplitter for ShuffleSplitter {
    fn split(&self, log: &EventLog, k: usize) -> Vec<Fold> {
        if k == 0 {
            return Vec::new();
        }

        let n = log.len();
        let indices = self.shuffled_indices(n);
        let fold_size = n / k;
        let remainder = n % k;

        let mut folds = Vec::with_capacity(k);
        let mut start = 0;
        for i in 0..k {
            let extra = usize::from(i < remainder);
            let end = start + fold_size + extra;

            let eval_indices = &indices[start..end];
            let training: Vec<Trace> = indices[..start]
                .iter()
                .chain(indices[end..].iter())
                .map(|&idx| log.traces()[idx].clone())
                .collect();
            let evaluation: Vec<Trace> = eval_indices
                .iter()
                .map(|&idx| log.traces()[idx].clone())
                .collect();

            folds.push(Fold {
                index: i,
                training: EventLog::new(format!("{}-train-{i}", log.name()), training),
                evaluation: EventLog::new(format!("{}-eval-{i}", log.name()), evaluation),
            });
            start = end;
        }
        folds
    }
}
