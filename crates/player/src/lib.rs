//! Reference animation player.
//!
//! Stands in for a renderer: it pulls jobs off the engine's operation queue,
//! lets each one run for its nominal duration and then reports it complete.
//! The player owns no game data and never mutates the board; it only holds
//! the jobs it has started and how far along each one is.
//!
//! A front end would draw each [`RunningJob`] at [`RunningJob::progress`]
//! between ticks.

use tracing::trace;

use match3_core::{AnimationJob, FlavorSource, Game, JobId};

pub use match3_core as core;
pub use match3_types as types;

/// A started job and its elapsed playback time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningJob {
    pub job: AnimationJob,
    pub elapsed_ms: u32,
}

impl RunningJob {
    fn new(job: AnimationJob) -> Self {
        Self { job, elapsed_ms: 0 }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.job.duration_ms
    }

    /// Fraction of the animation played, in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.job.duration_ms == 0 {
            return 1.0;
        }
        (self.elapsed_ms as f32 / self.job.duration_ms as f32).min(1.0)
    }
}

/// Per-tick counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub started: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Player {
    running: Vec<RunningJob>,
    completed_total: u64,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance playback by `elapsed_ms`.
    ///
    /// Running jobs age first; those past their duration are reported complete
    /// and release their cells. Then every job the queue will hand out starts,
    /// so a job unblocked this tick begins in the same tick.
    pub fn tick<S: FlavorSource>(&mut self, game: &mut Game<S>, elapsed_ms: u32) -> TickReport {
        let mut report = TickReport::default();

        for r in &mut self.running {
            r.elapsed_ms = r.elapsed_ms.saturating_add(elapsed_ms);
        }

        let mut finished: Vec<JobId> = Vec::new();
        self.running.retain(|r| {
            if r.is_finished() {
                finished.push(r.job.id);
                false
            } else {
                true
            }
        });
        for id in finished {
            if game.report_job_complete(id) {
                report.completed += 1;
            }
        }
        self.completed_total += report.completed as u64;

        while let Some(job) = game.drain_animation_queue() {
            trace!(id = job.id, kind = job.kind.as_str(), cells = job.cells.len(), "job started");
            self.running.push(RunningJob::new(job));
            report.started += 1;
        }

        report
    }

    /// Tick until the queue is empty, returning the simulated time spent.
    ///
    /// Gives up after `max_ticks` ticks.
    pub fn run_until_idle<S: FlavorSource>(
        &mut self,
        game: &mut Game<S>,
        tick_ms: u32,
        max_ticks: usize,
    ) -> Option<u64> {
        let mut spent = 0u64;
        // Start whatever is ready before time passes.
        self.tick(game, 0);
        for _ in 0..max_ticks {
            if self.is_idle() && game.queue().is_idle() {
                return Some(spent);
            }
            self.tick(game, tick_ms);
            spent += tick_ms as u64;
        }
        if self.is_idle() && game.queue().is_idle() {
            Some(spent)
        } else {
            None
        }
    }

    pub fn running(&self) -> &[RunningJob] {
        &self.running
    }

    pub fn is_idle(&self) -> bool {
        self.running.is_empty()
    }

    pub fn completed_total(&self) -> u64 {
        self.completed_total
    }

    /// Drop everything in flight without reporting it, e.g. on restart
    pub fn reset(&mut self) {
        self.running.clear();
    }
}
