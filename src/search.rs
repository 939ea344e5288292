//! Search engine: the main loop, checkpoint cadence, and timeout guard
//!
//! The engine walks odd candidates upward two at a time, evaluates each
//! one's descent, and checkpoints whenever the seed lands on a multiple of
//! the checkpoint interval. Availability beats durability throughout: a
//! failed checkpoint write is logged and the search keeps its in-memory
//! position.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use eyre::Result;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{debug, error, info};

use crate::checkpoint::CheckpointStore;
use crate::config::Config;
use crate::trajectory::{Descent, descend};

/// Why the search loop returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Wall-clock budget exceeded; timeout snapshot written
    TimedOut,
    /// Stop flag observed (signal); final checkpoint written
    Interrupted,
}

/// One-shot wall-clock budget check.
///
/// Once the budget elapses the guard writes the current seed to the
/// timeout snapshot file, exactly once, and reports that the loop should
/// stop. A `None` budget disables the guard entirely.
#[derive(Debug)]
pub struct TimeoutGuard {
    started: Instant,
    budget: Option<Duration>,
    fired: bool,
}

impl TimeoutGuard {
    /// Start the clock now
    pub fn new(budget: Option<Duration>) -> Self {
        debug!(?budget, "TimeoutGuard::new: called");
        Self {
            started: Instant::now(),
            budget,
            fired: false,
        }
    }

    /// Check the budget, writing the one-shot snapshot on first expiry.
    /// Returns true when the loop should stop.
    pub fn check(&mut self, seed: &BigUint, store: &CheckpointStore) -> bool {
        let Some(budget) = self.budget else {
            return false;
        };
        if self.started.elapsed() < budget {
            return false;
        }
        if !self.fired {
            self.fired = true;
            error!(elapsed = ?self.started.elapsed(), "timeout budget exceeded, saving snapshot");
            if let Err(e) = store.save_timeout(seed) {
                error!(error = %e, "failed to write timeout snapshot");
            }
        }
        true
    }
}

/// The search loop: owns the current seed and performs checkpointing
pub struct SearchEngine {
    store: CheckpointStore,
    initial: BigUint,
    seed: BigUint,
    interval: BigUint,
    backup_modulus: BigUint,
    timeout_budget: Option<Duration>,
    /// Checkpoint reports emitted so far this run
    reports: u64,
    /// Echo progress reports to stdout (foreground mode)
    print_progress: bool,
}

impl SearchEngine {
    /// Build an engine from validated configuration.
    ///
    /// The seed starts at the initial constant; call [`resume`] to run the
    /// resume chain against the checkpoint files.
    ///
    /// [`resume`]: SearchEngine::resume
    pub fn new(config: &Config, print_progress: bool) -> Result<Self> {
        let initial = config.initial_seed()?;
        debug!(%initial, interval = config.search.checkpoint_interval, "SearchEngine::new: called");
        Ok(Self {
            store: CheckpointStore::new(&config.files),
            seed: initial.clone(),
            initial,
            interval: BigUint::from(config.search.checkpoint_interval),
            backup_modulus: BigUint::from(config.search.backup_modulus),
            timeout_budget: (config.search.timeout_secs > 0)
                .then(|| Duration::from_secs(config.search.timeout_secs)),
            reports: 0,
            print_progress,
        })
    }

    /// Current search position
    pub fn seed(&self) -> &BigUint {
        &self.seed
    }

    /// Recover the last checkpointed seed through the resume chain
    pub fn resume(&mut self) {
        debug!("SearchEngine::resume: called");
        self.seed = self.store.load_seed(&self.initial);
        info!(seed = %self.seed, "search position resumed");
    }

    /// Advance to the next odd candidate and evaluate its descent.
    ///
    /// Returns true when this round landed on a checkpoint boundary (and
    /// the progress report plus save files were handled).
    pub fn step(&mut self) -> bool {
        self.seed += 2u32;
        let descent = descend(&self.seed);

        if (&self.seed % &self.interval).is_zero() {
            self.report(&descent);
            self.checkpoint();
            true
        } else {
            false
        }
    }

    /// Run until the stop flag is raised or the timeout budget expires.
    ///
    /// The stop flag is polled every round; the timeout guard only at
    /// checkpoint boundaries. An interrupt writes a final primary
    /// checkpoint so the resume chain picks up exactly where we left off.
    pub fn run(&mut self, stop: &AtomicBool) -> StopReason {
        let mut guard = TimeoutGuard::new(self.timeout_budget);
        info!(seed = %self.seed, "search loop started");

        loop {
            let checkpointed = self.step();

            if stop.load(Ordering::Relaxed) {
                if let Err(e) = self.store.save_primary(&self.seed) {
                    error!(error = %e, "failed to write final checkpoint on interrupt");
                }
                info!(seed = %self.seed, "search interrupted, final checkpoint written");
                return StopReason::Interrupted;
            }

            if checkpointed && guard.check(&self.seed, &self.store) {
                info!(seed = %self.seed, "search stopped by timeout guard");
                return StopReason::TimedOut;
            }
        }
    }

    /// Log (and optionally print) one progress report
    fn report(&mut self, descent: &Descent) {
        self.reports += 1;
        // A resumed seed below the initial constant would underflow here
        let iterations = if self.seed >= self.initial {
            &self.seed - &self.initial
        } else {
            BigUint::zero()
        };

        info!(
            seed = %self.seed,
            diagnostic = %descent.terminal,
            steps = descent.steps,
            %iterations,
            reports = self.reports,
            "progress"
        );

        if self.print_progress {
            println!(
                "\nseed: {}\ndiagnostic: {}\niteration: {}\nprinted {} times, at {}",
                self.seed,
                descent.terminal,
                iterations,
                self.reports,
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            );
        }
    }

    /// Write the primary save, and the backup when the seed divides evenly
    fn checkpoint(&self) {
        if let Err(e) = self.store.save_primary(&self.seed) {
            error!(error = %e, "failed to write primary checkpoint");
        }
        if (&self.seed % &self.backup_modulus).is_zero() {
            if let Err(e) = self.store.save_backup(&self.seed) {
                error!(error = %e, "failed to write backup checkpoint");
            }
        }
    }
}
