/*!
 * Workload Driver
 *
 * Pre-populates the ordered set, spawns the worker pool, times the run
 * and verifies the set and counters afterwards.
 *
 * # Lifecycle
 *
 * 1. Pre-populate single-threaded (no lock yet)
 * 2. Wrap the set in the configured lock backend
 * 3. Spawn `threads` scoped workers; each runs `total_ops / threads` ops
 * 4. Join every worker, then fold-check counters and tear the lock down
 */

use super::backend::SharedSet;
use super::config::{OpMix, WorkloadConfig};
use super::counters::{Aggregator, ThreadCounters};
use super::summary::{RepeatedSummary, RunSummary};
use crate::core::data_structures::OrderedSet;
use crate::core::errors::{BenchError, ConfigError, WorkloadError};
use crate::core::limits::{DEFAULT_PREPOPULATE_SEED, PREPOPULATE_ATTEMPT_FACTOR, WORKER_THREAD_PREFIX};
use crate::core::types::{Key, SetResult};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Shared state handed to every worker by reference
pub struct BenchContext {
    set: Box<dyn SharedSet>,
    aggregator: Aggregator,
}

impl BenchContext {
    pub fn new(set: Box<dyn SharedSet>) -> Self {
        Self {
            set,
            aggregator: Aggregator::new(),
        }
    }

    pub fn set(&self) -> &dyn SharedSet {
        self.set.as_ref()
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Tear down, returning the set and the final totals
    pub fn into_parts(self) -> Result<(OrderedSet, ThreadCounters), BenchError> {
        let totals = self.aggregator.totals();
        let set = self.set.into_set()?;
        Ok((set, totals))
    }
}

/// Result of the pre-population phase
#[derive(Debug)]
pub struct Prepopulated {
    pub set: OrderedSet,
    /// Distinct keys inserted
    pub inserted: usize,
    /// Keys drawn, including duplicates
    pub attempts: usize,
}

/// Per-worker parameters
#[derive(Debug, Clone, Copy)]
struct WorkerPlan {
    rank: usize,
    ops: u64,
    seed: u64,
    mix: OpMix,
    key_space: Key,
}

/// Drives one configured benchmark
#[derive(Debug, Clone)]
pub struct WorkloadDriver {
    config: WorkloadConfig,
}

impl WorkloadDriver {
    /// Validate `config` and build a driver
    pub fn new(config: WorkloadConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WorkloadConfig {
        &self.config
    }

    /// Insert random keys until `initial_keys` are distinct or the attempt budget runs out
    pub fn prepopulate(&self) -> SetResult<Prepopulated> {
        let target = self.config.initial_keys;
        let budget = target.saturating_mul(PREPOPULATE_ATTEMPT_FACTOR);
        let mut rng = StdRng::seed_from_u64(self.config.seed.unwrap_or(DEFAULT_PREPOPULATE_SEED));
        let mut set = OrderedSet::with_capacity(target);

        let mut inserted = 0;
        let mut attempts = 0;
        while inserted < target && attempts < budget {
            let key = rng.gen_range(0..self.config.key_space);
            attempts += 1;
            if set.insert(key)? {
                inserted += 1;
            }
        }

        if inserted < target {
            warn!(
                requested = target,
                inserted, attempts, "pre-population stopped short of requested key count"
            );
        }
        info!(inserted, attempts, "pre-populated ordered set");

        Ok(Prepopulated {
            set,
            inserted,
            attempts,
        })
    }

    /// Execute one timed run
    pub fn run(&self) -> Result<RunSummary, BenchError> {
        let config = &self.config;
        let Prepopulated { set, inserted, .. } = self.prepopulate()?;

        let ctx = BenchContext::new(config.backend.wrap(set, config.lock));
        let ops = config.ops_per_thread();
        let base_seed = config.seed.unwrap_or_else(time_seed);

        info!(
            backend = ctx.set().name(),
            threads = config.threads,
            ops_per_thread = ops,
            search = config.mix.search(),
            insert = config.mix.insert(),
            delete = config.mix.delete(),
            "starting workload"
        );

        let plans: Vec<WorkerPlan> = (0..config.threads)
            .map(|rank| WorkerPlan {
                rank,
                ops,
                seed: base_seed.wrapping_add(1 + rank as u64),
                mix: config.mix,
                key_space: config.key_space,
            })
            .collect();

        let start = Instant::now();
        let per_thread = spawn_and_join(&ctx, &plans)?;
        let elapsed = start.elapsed();

        let lock_stats = ctx.set().lock_stats();
        let folds = ctx.aggregator().folds();
        let (set, totals) = ctx.into_parts()?;

        verify_totals(&totals, folds, config)?;
        verify_set(&set, inserted, &totals)?;

        info!(
            elapsed_secs = elapsed.as_secs_f64(),
            total_ops = totals.total(),
            final_len = set.len(),
            "workload complete"
        );

        Ok(RunSummary {
            backend: config.backend,
            threads: config.threads,
            ops_per_thread: ops,
            initial_keys_requested: config.initial_keys,
            initial_keys_inserted: inserted,
            elapsed,
            totals,
            per_thread,
            final_len: set.len(),
            lock_stats,
        })
    }

    /// Execute `config.runs` independent runs, each on a fresh set
    pub fn run_repeated(&self) -> Result<RepeatedSummary, BenchError> {
        let mut runs = Vec::with_capacity(self.config.runs as usize);
        for run in 0..self.config.runs {
            debug!(run = run + 1, of = self.config.runs, "starting run");
            runs.push(self.run()?);
        }
        RepeatedSummary::from_runs(runs).ok_or(BenchError::Config(ConfigError::NoRuns))
    }
}

/// Spawn one named worker per plan and join them all
///
/// Every spawned worker is joined before the first error is reported.
fn spawn_and_join(
    ctx: &BenchContext,
    plans: &[WorkerPlan],
) -> Result<Vec<ThreadCounters>, WorkloadError> {
    thread::scope(|scope| {
        let handles: Vec<_> = plans
            .iter()
            .map(|plan| {
                let plan = *plan;
                thread::Builder::new()
                    .name(format!("{}-{}", WORKER_THREAD_PREFIX, plan.rank))
                    .spawn_scoped(scope, move || run_worker(ctx, plan))
                    .map_err(|e| WorkloadError::Spawn {
                        rank: plan.rank,
                        reason: e.to_string(),
                    })
            })
            .collect();

        let mut per_thread = Vec::with_capacity(plans.len());
        let mut first_error = None;
        for (rank, handle) in handles.into_iter().enumerate() {
            let outcome = handle.and_then(|h| {
                h.join()
                    .map_err(|_| WorkloadError::WorkerPanicked { rank })
                    .and_then(|result| result)
            });
            match outcome {
                Ok(counters) => per_thread.push(counters),
                Err(e) => {
                    warn!(rank, error = %e, "worker failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(per_thread),
        }
    })
}

/// Worker body: pick op, take the matching lock mode, operate, release, tally
fn run_worker(ctx: &BenchContext, plan: WorkerPlan) -> Result<ThreadCounters, WorkloadError> {
    let mut rng = StdRng::seed_from_u64(plan.seed);
    let mut local = ThreadCounters::default();

    for _ in 0..plan.ops {
        let op = plan.mix.select(rng.gen::<f64>());
        let key = rng.gen_range(0..plan.key_space);
        let hit = ctx
            .set()
            .apply(op, key)
            .map_err(|e| WorkloadError::from_access(plan.rank, e))?;
        local.record(op, hit);
    }

    ctx.aggregator().fold(&local);
    debug!(
        rank = plan.rank,
        search = local.search,
        insert = local.insert,
        delete = local.delete,
        "worker finished"
    );
    Ok(local)
}

/// Check every worker folded exactly once and no operation went missing
fn verify_totals(
    totals: &ThreadCounters,
    folds: usize,
    config: &WorkloadConfig,
) -> Result<(), WorkloadError> {
    let expected = config.expected_ops();
    if totals.total() != expected || folds != config.threads {
        return Err(WorkloadError::LostUpdates {
            expected,
            recorded: totals.total(),
            folds,
            workers: config.threads,
        });
    }
    Ok(())
}

/// Check ordering and that successful inserts/deletes explain the final size
fn verify_set(
    set: &OrderedSet,
    initial: usize,
    totals: &ThreadCounters,
) -> Result<(), WorkloadError> {
    if !set.is_strictly_ascending() {
        return Err(WorkloadError::OrderViolation);
    }
    let expected = (initial as i64 + totals.net_growth()).max(0) as usize;
    if set.len() != expected {
        return Err(WorkloadError::SizeMismatch {
            expected,
            actual: set.len(),
        });
    }
    Ok(())
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
