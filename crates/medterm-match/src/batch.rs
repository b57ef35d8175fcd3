//! Batch normalisation.
//!
//! Queries are independent: each gets its own `Result`, in input order, and
//! a failure never touches its neighbours.

use crate::{MatchOutcome, MatchPipeline, Result};

impl MatchPipeline {
    /// Normalise many queries. Batches larger than the configured
    /// `parallel_threshold` run on the rayon pool.
    pub fn normalise_batch(&self, queries: &[&str]) -> Vec<Result<MatchOutcome>> {
        self.normalise_batch_with_threshold(queries, self.parallel_threshold())
    }

    /// Normalise many queries with explicit parallelism control.
    /// Set `parallel_threshold` to 0 to always run sequentially.
    pub fn normalise_batch_with_threshold(
        &self,
        queries: &[&str],
        parallel_threshold: usize,
    ) -> Vec<Result<MatchOutcome>> {
        #[cfg(feature = "parallel")]
        {
            if queries.len() > parallel_threshold && parallel_threshold > 0 {
                use rayon::prelude::*;
                return queries
                    .par_iter()
                    .map(|query| self.normalise(query))
                    .collect();
            }
        }
        #[cfg(not(feature = "parallel"))]
        let _ = parallel_threshold;

        queries.iter().map(|query| self.normalise(query)).collect()
    }
}
