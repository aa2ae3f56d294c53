//! Thread configuration for weight generation
//!
//! Face/cell overlaps are computed on Rayon. A [`ParallelConfig`] either sizes
//! the global pool once at startup or runs a single weight computation on a
//! dedicated pool via [`ParallelConfig::install`].

use crate::errors::{RegridError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Number of threads used for weight generation. `None` means Rayon's
/// default (one per logical core unless `RAYON_NUM_THREADS` is set).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParallelConfig {
    pub num_threads: Option<usize>,
}

impl ParallelConfig {
    pub fn new(num_threads: Option<usize>) -> Self {
        Self { num_threads }
    }

    pub fn with_threads(num_threads: usize) -> Self {
        Self::new(Some(num_threads))
    }

    /// One thread per CPU core, ignoring `RAYON_NUM_THREADS`
    pub fn all_cores() -> Self {
        Self::with_threads(num_cpus::get())
    }

    /// Threads weight generation will run on under this configuration
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(rayon::current_num_threads)
    }

    fn builder(&self) -> Result<ThreadPoolBuilder> {
        match self.num_threads {
            Some(0) => Err(RegridError::ThreadPoolError(
                "thread count must be at least 1".to_string(),
            )),
            Some(n) => Ok(ThreadPoolBuilder::new()
                .num_threads(n)
                .thread_name(|i| format!("regrid-weights-{}", i))),
            None => Ok(ThreadPoolBuilder::new()),
        }
    }

    /// Sizes Rayon's global pool. Only the first call in a process can
    /// succeed; a config without a thread count leaves the pool alone.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::ThreadPoolError`] for a zero thread count or
    /// if the global pool was already built.
    pub fn setup_global_pool(&self) -> Result<()> {
        let Some(threads) = self.num_threads else {
            tracing::info!(threads = rayon::current_num_threads(), "using default thread pool");
            return Ok(());
        };
        self.builder()?.build_global().map_err(|e| {
            RegridError::ThreadPoolError(format!(
                "failed to initialize global pool with {} threads: {}",
                threads, e
            ))
        })?;
        tracing::info!(threads, "configured global thread pool");
        Ok(())
    }

    /// Runs `op` on a pool of this configuration's size, or on the current
    /// pool when no thread count is set.
    ///
    /// # Errors
    ///
    /// Returns [`RegridError::ThreadPoolError`] if the pool cannot be built.
    pub fn install<R, F>(&self, op: F) -> Result<R>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match self.num_threads {
            None => Ok(op()),
            Some(_) => Ok(self.build_pool()?.install(op)),
        }
    }

    fn build_pool(&self) -> Result<ThreadPool> {
        self.builder()?
            .build()
            .map_err(|e| RegridError::ThreadPoolError(e.to_string()))
    }
}

/// Snapshot of the parallel environment
#[derive(Debug, Clone)]
pub struct ParallelInfo {
    pub current_threads: usize,
    pub available_cores: usize,
    pub available_parallelism: usize,
}

pub fn get_parallel_info() -> ParallelInfo {
    ParallelInfo {
        current_threads: rayon::current_num_threads(),
        available_cores: num_cpus::get(),
        available_parallelism: std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1),
    }
}

impl ParallelInfo {
    pub fn print_info(&self) {
        println!("📊 Weight generation threads: {}", self.current_threads);
        println!(
            "   CPU cores: {} (available parallelism {})",
            self.available_cores, self.available_parallelism
        );
    }
}
