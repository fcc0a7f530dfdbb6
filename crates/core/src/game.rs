//! Game module - the engine facade
//!
//! Ties the board, flavor source, move validator, step scheduler and operation
//! queue together behind the operations a front end needs:
//!
//! - [`Game::initialize`]: fill and settle a fresh board
//! - [`Game::request_swap`]: validate a swap and resolve its whole cascade
//! - [`Game::drain_animation_queue`] / [`Game::report_job_complete`]: animation bridge
//!
//! All board mutation happens synchronously inside these calls. Animation jobs
//! are enqueued in the order the effects were produced: the swap, then each
//! step's clear followed by its fill.

use tracing::{debug, warn};

use crate::board::Board;
use crate::cascade::settle;
use crate::config::GameConfig;
use crate::error::{ConfigError, EngineError, Result};
use crate::gravity::{affected_columns, shift_column};
use crate::matcher::find_clearable_lines;
use crate::queue::{AnimationJob, JobId, JobKind, OperationQueue};
use crate::rng::{FlavorSource, SimpleRng};
use crate::snapshot::{board_hash, GameSnapshot};
use crate::types::{
    CellIndex, ColumnShiftResult, Phase, StepResult, SwapRejection, SwapRequest,
};
use crate::validator::{legal_swaps, try_swap};

/// Result of a swap request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub request: SwapRequest,
    pub accepted: bool,
    /// Set iff `accepted` is false
    pub rejection: Option<SwapRejection>,
    /// Resolution cycles in order; empty when rejected
    pub cascade: Vec<StepResult>,
    /// Points awarded across the cascade
    pub score_delta: u32,
}

impl SwapOutcome {
    fn rejected(request: SwapRequest, why: SwapRejection) -> Self {
        Self {
            request,
            accepted: false,
            rejection: Some(why),
            cascade: Vec::new(),
            score_delta: 0,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct Game<S: FlavorSource = SimpleRng> {
    config: GameConfig,
    board: Board,
    source: S,
    queue: OperationQueue,
    phase: Phase,
    /// Monotonic episode id (increments on restart)
    episode_id: u32,
    score: u32,
    /// Accepted swaps this episode
    moves: u32,
    /// Resolution cycles run for accepted swaps this episode
    cascade_steps: u32,
}

impl Game<SimpleRng> {
    /// Create a settled board seeded from `config.seed`
    pub fn initialize(config: GameConfig) -> Result<Self> {
        let rng = SimpleRng::new(config.seed);
        Self::with_source(config, rng)
    }

    /// Start a new episode on a fresh board with a new seed
    pub fn restart(&mut self, seed: u32) -> Result<()> {
        let config = self.config.clone().with_seed(seed);
        let episode_id = self.episode_id.wrapping_add(1);
        *self = Self::initialize(config)?;
        self.episode_id = episode_id;
        Ok(())
    }
}

impl<S: FlavorSource> Game<S> {
    /// Create a settled board drawing every flavor from `source`
    pub fn with_source(config: GameConfig, mut source: S) -> Result<Self> {
        config.validate()?;
        let mut board = Board::new(config.width, config.height)?;
        board.fill_random(&mut source, config.flavor_count as u32);
        Self::from_board(config, board, source)
    }

    /// Adopt a prepared board.
    ///
    /// Vacant cells are compacted and refilled from `source` first, then the
    /// board is settled if it has clearable lines.
    pub fn from_board(config: GameConfig, mut board: Board, mut source: S) -> Result<Self> {
        config.validate()?;
        if board.width() != config.width || board.height() != config.height {
            return Err(ConfigError::BoardMismatch {
                width: config.width,
                height: config.height,
                actual_width: board.width(),
                actual_height: board.height(),
            }
            .into());
        }
        if let Some(bad) = board
            .cells()
            .iter()
            .find(|p| p.active && p.flavor >= config.flavor_count as u32)
        {
            return Err(ConfigError::FlavorOutOfRange {
                flavor: bad.flavor,
                flavor_count: config.flavor_count,
            }
            .into());
        }

        let flavor_count = config.flavor_count as u32;
        let vacant: Vec<CellIndex> = (0..board.len() as CellIndex)
            .filter(|&i| !board.is_active(i))
            .collect();
        for x in affected_columns(&board, &vacant) {
            shift_column(&mut board, x, &mut source, flavor_count);
        }

        let cascade = settle(&mut board, &mut source, flavor_count, config.max_settle_steps);
        if !cascade.settled {
            return Err(EngineError::Unsettleable {
                steps: config.max_settle_steps,
            });
        }
        debug!(
            width = config.width,
            height = config.height,
            flavors = config.flavor_count,
            settle_steps = cascade.len(),
            "board initialized"
        );

        Ok(Self {
            config,
            board,
            source,
            queue: OperationQueue::new(),
            phase: Phase::Idle,
            episode_id: 0,
            score: 0,
            moves: 0,
            cascade_steps: 0,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn cascade_steps(&self) -> u32 {
        self.cascade_steps
    }

    pub fn queue(&self) -> &OperationQueue {
        &self.queue
    }

    /// Swap two cells and resolve the resulting cascade.
    ///
    /// Rejected requests leave the board unchanged and enqueue nothing, except a
    /// there-and-back animation for adjacent swaps that formed no line (when
    /// `animate_rejected_swaps` is on).
    pub fn request_swap(&mut self, a: CellIndex, b: CellIndex) -> SwapOutcome {
        let request = SwapRequest::new(a, b);

        if let Err(why) = try_swap(&mut self.board, a, b) {
            debug!(a, b, reason = why.as_str(), "swap rejected");
            if why.is_animated() && self.config.animate_rejected_swaps {
                self.queue.enqueue(JobKind::SwapRevert { a, b }, vec![a, b]);
            }
            return SwapOutcome::rejected(request, why);
        }

        self.phase = Phase::Resolving;
        self.queue.enqueue(JobKind::Swap { a, b }, vec![a, b]);

        let flavor_count = self.config.flavor_count as u32;
        let cascade = settle(
            &mut self.board,
            &mut self.source,
            flavor_count,
            self.config.max_settle_steps,
        );
        if !cascade.settled {
            warn!(
                steps = cascade.len(),
                "cascade hit the step limit before the board came to rest"
            );
        }

        for step in &cascade.steps {
            // Committed in cycle order.
            self.score = self.score.saturating_add(step.score);
            self.queue.enqueue(
                JobKind::Clear {
                    cells: step.cleared.clone(),
                },
                step.cleared.clone(),
            );
            let cells = fill_cells(&self.board, &step.shifts);
            self.queue.enqueue(
                JobKind::Fill {
                    shifts: step.shifts.clone(),
                },
                cells,
            );
        }

        self.moves = self.moves.wrapping_add(1);
        self.cascade_steps = self.cascade_steps.saturating_add(cascade.len() as u32);
        self.phase = Phase::Idle;

        let score_delta = cascade.score();
        debug!(a, b, steps = cascade.len(), score_delta, "swap resolved");

        SwapOutcome {
            request,
            accepted: true,
            rejection: None,
            cascade: cascade.steps,
            score_delta,
        }
    }

    /// Start the next animation job if its cells are free
    pub fn drain_animation_queue(&mut self) -> Option<AnimationJob> {
        self.queue.drain()
    }

    /// Release the cells of a finished job
    pub fn report_job_complete(&mut self, id: JobId) -> bool {
        self.queue.report_complete(id)
    }

    /// Whether the board has no clearable lines and no vacant cells
    pub fn is_at_rest(&self) -> bool {
        self.board.is_full() && find_clearable_lines(&self.board).is_empty()
    }

    /// Every swap that would currently be accepted
    pub fn legal_moves(&self) -> Vec<SwapRequest> {
        let mut scratch = self.board.clone();
        legal_swaps(&mut scratch)
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.width = self.board.width();
        out.height = self.board.height();
        self.board.write_flavors(&mut out.flavors);
        out.board_hash = board_hash(&self.board);
        out.phase = self.phase;
        out.episode_id = self.episode_id;
        out.seed = self.config.seed;
        out.score = self.score;
        out.moves = self.moves;
        out.cascade_steps = self.cascade_steps;
        out.pending_jobs = self.queue.pending_len();
        out.running_jobs = self.queue.running_len();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut s = GameSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }
}

/// Cells a fill animation touches: every swap endpoint plus the spawned cells at the top
fn fill_cells(board: &Board, shifts: &[ColumnShiftResult]) -> Vec<CellIndex> {
    let (w, h) = (board.width(), board.height());
    let mut cells = Vec::new();
    for shift in shifts {
        for swap in &shift.swaps {
            cells.push(swap.source);
            cells.push(swap.target);
        }
        let spawned = shift.spawned.len() as i32;
        cells.extend(((h - spawned)..h).map(|y| shift.column + w * y));
    }
    cells
}
