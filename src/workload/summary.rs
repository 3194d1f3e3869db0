/*!
 * Run Summaries
 *
 * Human-readable and JSON reports for single and repeated runs
 */

use super::config::LockBackend;
use super::counters::ThreadCounters;
use crate::core::sync::LockStats;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Outcome of one benchmark run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub backend: LockBackend,
    pub threads: usize,
    pub ops_per_thread: u64,
    /// Keys requested for pre-population
    pub initial_keys_requested: usize,
    /// Distinct keys actually inserted before workers started
    pub initial_keys_inserted: usize,
    /// Wall-clock time from first spawn to last join
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
    /// Aggregated counters
    pub totals: ThreadCounters,
    /// Counters reported by each worker, indexed by rank
    pub per_thread: Vec<ThreadCounters>,
    /// Set size after all workers joined
    pub final_len: usize,
    pub lock_stats: Option<LockStats>,
}

impl RunSummary {
    /// Completed operations per second
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.totals.total() as f64 / secs
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Results ({}) ===", self.backend)?;
        writeln!(f, "Threads = {}", self.threads)?;
        writeln!(
            f,
            "Initial keys = {} (requested {})",
            self.initial_keys_inserted, self.initial_keys_requested
        )?;
        writeln!(f, "Elapsed time = {:.6} seconds", self.elapsed.as_secs_f64())?;
        writeln!(f, "Total ops = {}", self.totals.total())?;
        writeln!(f, "Member ops = {}", self.totals.search)?;
        writeln!(f, "Insert ops = {}", self.totals.insert)?;
        writeln!(f, "Delete ops = {}", self.totals.delete)?;
        writeln!(f, "Final keys = {}", self.final_len)?;
        writeln!(f, "Throughput = {:.0} ops/s", self.throughput())?;
        if let Some(stats) = &self.lock_stats {
            writeln!(
                f,
                "Contended reads = {} / {}",
                stats.contended_reads, stats.read_acquisitions
            )?;
            writeln!(
                f,
                "Contended writes = {} / {}",
                stats.contended_writes, stats.write_acquisitions
            )?;
            writeln!(f, "Contention rate = {:.2}%", stats.contention_rate() * 100.0)?;
            writeln!(f, "Peak readers = {}", stats.peak_readers)?;
        }
        write!(f, "===========================")
    }
}

/// Timing across repeated runs
#[derive(Debug, Clone, Serialize)]
pub struct RepeatedSummary {
    pub runs: Vec<RunSummary>,
    #[serde(rename = "min_secs", serialize_with = "as_secs")]
    pub min: Duration,
    #[serde(rename = "max_secs", serialize_with = "as_secs")]
    pub max: Duration,
    #[serde(rename = "avg_secs", serialize_with = "as_secs")]
    pub avg: Duration,
}

impl RepeatedSummary {
    /// Compute min/max/avg over completed runs
    ///
    /// Returns `None` for an empty run list.
    pub fn from_runs(runs: Vec<RunSummary>) -> Option<Self> {
        let min = runs.iter().map(|r| r.elapsed).min()?;
        let max = runs.iter().map(|r| r.elapsed).max()?;
        let total: Duration = runs.iter().map(|r| r.elapsed).sum();
        let avg = total / runs.len() as u32;
        Some(Self {
            runs,
            min,
            max,
            avg,
        })
    }
}

impl fmt::Display for RepeatedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, run) in self.runs.iter().enumerate() {
            if self.runs.len() > 1 {
                writeln!(f, "--- Run {} ---", i + 1)?;
            }
            writeln!(f, "{}", run)?;
        }
        if self.runs.len() > 1 {
            writeln!(f, "Runs = {}", self.runs.len())?;
            writeln!(f, "Min time = {:.6} seconds", self.min.as_secs_f64())?;
            writeln!(f, "Max time = {:.6} seconds", self.max.as_secs_f64())?;
            write!(f, "Avg time = {:.6} seconds", self.avg.as_secs_f64())?;
        }
        Ok(())
    }
}
