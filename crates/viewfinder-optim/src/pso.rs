//! Particle-swarm viewpoint search.
//!
//! Canonical global-best PSO with a linearly decreasing inertia weight,
//! adapted to the evaluator's strengths: every candidate evaluation
//! passes the candidate's personal best as the lazy threshold, so the
//! objective can abandon any camera that cannot improve on it after the
//! cheap properties alone. Termination is wall-clock first, satisfaction
//! threshold second, with a hard iteration cap as the backstop.

use std::time::{Duration, Instant};

use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use viewfinder_core::math::Real;
use viewfinder_core::scene::SceneOracle;

use crate::objective::Eval;
use crate::rig::CameraRig;
use crate::viewpoint::Viewpoint;

const MAX_CANDIDATES: usize = 300;
const MAX_ITERATIONS: usize = 3000;
/// Fraction of the time budget over which inertia decays to its minimum.
const INERTIA_DECAY_FRACTION: Real = 0.85;
/// Velocity fraction of the dimension range below which a candidate
/// counts as steady.
const STEADY_VELOCITY_FRACTION: Real = 1e-3;

/// Swarm parameters, in the usual PSO notation.
#[derive(Debug, Clone)]
pub struct PsoOptions {
    pub num_candidates: usize,
    /// Fraction of non-seeded candidates initialized uniformly; the rest
    /// come from smart sampling spread across the targets.
    pub random_fraction: Real,
    /// Cognitive acceleration (pull toward the personal best).
    pub c1: Real,
    /// Social acceleration (pull toward the global best).
    pub c2: Real,
    pub w_max: Real,
    pub w_min: Real,
    /// Random-number generator seed (for reproducibility).
    pub seed: u64,
}

impl Default for PsoOptions {
    fn default() -> Self {
        Self {
            num_candidates: 64,
            random_fraction: 0.5,
            c1: 2.0,
            c2: 2.0,
            w_max: 0.9,
            w_min: 0.4,
            seed: 1_234_567,
        }
    }
}

impl PsoOptions {
    fn validate(&self) -> Result<()> {
        ensure!(
            (1..=MAX_CANDIDATES).contains(&self.num_candidates),
            "num_candidates must be in 1..={}",
            MAX_CANDIDATES
        );
        ensure!(
            (0.0..=1.0).contains(&self.random_fraction),
            "random_fraction must be in [0, 1]"
        );
        ensure!(self.c1 > 0.0 && self.c2 > 0.0, "c1 and c2 must be positive");
        ensure!(
            self.w_max >= self.w_min && self.w_min >= 0.0,
            "inertia weights need w_max >= w_min >= 0"
        );
        Ok(())
    }
}

/// One swarm member. Buffers are allocated at initialization and reused
/// across iterations and across warm-started solves.
#[derive(Debug, Clone)]
struct Candidate {
    position: Vec<Real>,
    velocity: Vec<Real>,
    best_position: Vec<Real>,
    /// Best non-pruned evaluation seen at `best_position`.
    best_eval: Option<Real>,
    eval: Eval,
    times_out_of_domain: u32,
    best_iteration: usize,
}

impl Candidate {
    fn start_at(position: Vec<Real>) -> Self {
        let dims = position.len();
        Self {
            best_position: position.clone(),
            position,
            velocity: vec![0.0; dims],
            best_eval: None,
            eval: Eval::Pruned,
            times_out_of_domain: 0,
            best_iteration: 0,
        }
    }
}

/// Why a solve stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCondition {
    /// The wall-clock budget ran out.
    TimeOut,
    /// The global best reached the satisfaction threshold.
    Satisfied,
    /// The hard iteration cap was hit before either of the above.
    IterationCap,
}

/// Diagnostics for the last `solve` call.
#[derive(Debug, Clone)]
pub struct SolveStats {
    pub iterations: usize,
    pub best_iteration: usize,
    pub evaluations: u64,
    pub pruned: u64,
    pub out_of_domain: u64,
    pub smart_fallbacks: u64,
    /// Every candidate's velocity collapsed below the steady threshold
    /// at least once.
    pub steady_particles: bool,
    pub exit: ExitCondition,
    pub elapsed: Duration,
    pub best_satisfaction: Real,
}

impl Default for SolveStats {
    fn default() -> Self {
        Self {
            iterations: 0,
            best_iteration: 0,
            evaluations: 0,
            pruned: 0,
            out_of_domain: 0,
            smart_fallbacks: 0,
            steady_particles: false,
            exit: ExitCondition::TimeOut,
            elapsed: Duration::ZERO,
            best_satisfaction: -1.0,
        }
    }
}

/// One solve request.
#[derive(Debug, Clone, Default)]
pub struct SolveRequest {
    pub time_limit: Duration,
    /// Stop early once the objective reaches this value.
    pub sat_threshold: Real,
    /// Externally provided starting candidates (full-length parameter
    /// vectors; others are ignored).
    pub seeds: Vec<Vec<Real>>,
    /// Keep the current swarm, personal bests and global best instead of
    /// re-initializing.
    pub warm_start: bool,
}

impl SolveRequest {
    pub fn with_budget(time_limit: Duration, sat_threshold: Real) -> Self {
        Self {
            time_limit,
            sat_threshold,
            seeds: Vec::new(),
            warm_start: false,
        }
    }
}

/// The swarm and its bookkeeping; reusable across solves.
#[derive(Debug)]
pub struct PsoSolver {
    opts: PsoOptions,
    rng: StdRng,
    candidates: Vec<Candidate>,
    leader: usize,
    best_value: Real,
    /// Reused copy of the leader's best position for velocity updates.
    leader_buf: Vec<Real>,
    best_history: Vec<Viewpoint>,
    stats: SolveStats,
}

impl PsoSolver {
    pub fn new(opts: PsoOptions) -> Result<Self> {
        opts.validate()?;
        let rng = StdRng::seed_from_u64(opts.seed);
        Ok(Self {
            opts,
            rng,
            candidates: Vec::new(),
            leader: 0,
            best_value: -1.0,
            leader_buf: Vec::new(),
            best_history: Vec::new(),
            stats: SolveStats::default(),
        })
    }

    /// Adjust swarm size and coefficients between solves.
    pub fn set_parameters(
        &mut self,
        num_candidates: usize,
        random_fraction: Real,
        coefficients: Option<(Real, Real, Real, Real)>,
    ) -> Result<()> {
        let mut opts = self.opts.clone();
        opts.num_candidates = num_candidates;
        opts.random_fraction = random_fraction;
        if let Some((c1, c2, w_max, w_min)) = coefficients {
            opts.c1 = c1;
            opts.c2 = c2;
            opts.w_max = w_max;
            opts.w_min = w_min;
        }
        opts.validate()?;
        self.opts = opts;
        Ok(())
    }

    pub fn options(&self) -> &PsoOptions {
        &self.opts
    }

    /// Global-best snapshots in promotion order, oldest first.
    pub fn best_history(&self) -> &[Viewpoint] {
        &self.best_history
    }

    pub fn last_stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Current global best evaluation (`-1` before any valid one).
    pub fn best_evaluation(&self) -> Real {
        self.best_value
    }

    /// Run the swarm until the budget, the threshold or the iteration
    /// cap stops it, and return the best viewpoint found.
    ///
    /// With no valid evaluation at all (for example a time budget
    /// exhausted during initialization) the sentinel viewpoint is
    /// returned; callers check [`Viewpoint::is_valid`].
    pub fn solve<S: SceneOracle + ?Sized>(
        &mut self,
        scene: &S,
        rig: &mut CameraRig,
        request: &SolveRequest,
    ) -> Viewpoint {
        let t0 = Instant::now();
        let dims = rig.dims();
        let (lo, hi) = rig.bounds();
        let ranges: Vec<Real> = lo.iter().zip(&hi).map(|(&l, &h)| h - l).collect();

        let fallbacks_before = rig.smart_fallbacks();
        self.stats = SolveStats::default();

        if !request.warm_start || self.candidates.is_empty() {
            self.initialize(scene, rig, &request.seeds, dims);
        }

        let mut exit = ExitCondition::IterationCap;
        'outer: for iter in 1..=MAX_ITERATIONS {
            if t0.elapsed() >= request.time_limit {
                exit = ExitCondition::TimeOut;
                break;
            }
            self.stats.iterations = iter;
            let w = self.inertia(t0.elapsed(), request.time_limit);
            let mut steady = true;

            for i in 0..self.candidates.len() {
                if iter > 1 {
                    self.advance(i, w, &ranges);
                }
                for j in 0..dims {
                    if self.candidates[i].velocity[j].abs()
                        > STEADY_VELOCITY_FRACTION * ranges[j]
                    {
                        steady = false;
                    }
                }

                self.evaluate_candidate(scene, rig, i, iter);

                if t0.elapsed() >= request.time_limit {
                    exit = ExitCondition::TimeOut;
                    break 'outer;
                }
                if self.best_value >= request.sat_threshold {
                    exit = ExitCondition::Satisfied;
                    break 'outer;
                }
            }

            if iter > 1 && steady {
                self.stats.steady_particles = true;
            }
        }

        self.stats.exit = exit;
        self.stats.elapsed = t0.elapsed();
        self.stats.best_iteration = self.candidates.get(self.leader).map_or(0, |c| c.best_iteration);
        self.stats.out_of_domain = self
            .candidates
            .iter()
            .map(|c| c.times_out_of_domain as u64)
            .sum();
        self.stats.smart_fallbacks = rig.smart_fallbacks() - fallbacks_before;
        self.stats.best_satisfaction = self.best_value;

        log::debug!(
            "solve finished: best {:.4} after {} iterations ({:?})",
            self.best_value,
            self.stats.iterations,
            self.stats.exit
        );

        if self.best_value < 0.0 {
            return Viewpoint::sentinel(rig.objective().len());
        }
        let best_position = self.candidates[self.leader].best_position.clone();
        rig.snapshot(scene, &best_position, &mut self.rng)
    }

    fn initialize<S: SceneOracle + ?Sized>(
        &mut self,
        scene: &S,
        rig: &mut CameraRig,
        seeds: &[Vec<Real>],
        dims: usize,
    ) {
        let n = self.opts.num_candidates;
        self.candidates.clear();
        self.candidates.reserve_exact(n);
        self.best_history.clear();
        self.leader = 0;
        self.best_value = -1.0;

        for seed in seeds.iter().take(n) {
            if seed.len() == dims {
                self.candidates.push(Candidate::start_at(seed.clone()));
            } else {
                log::debug!(
                    "ignoring seed with {} dims (domain has {})",
                    seed.len(),
                    dims
                );
            }
        }

        let n_uniform = ((n as Real) * self.opts.random_fraction).floor() as usize;
        while self.candidates.len() < n_uniform {
            let p = rig.random_viewpoint(&mut self.rng);
            self.candidates.push(Candidate::start_at(p));
        }

        let n_targets = rig.targets().len();
        let mut next_target = 0usize;
        while self.candidates.len() < n {
            let p = if n_targets == 0 {
                rig.random_viewpoint(&mut self.rng)
            } else {
                let t = next_target % n_targets;
                next_target += 1;
                rig.smart_viewpoint(scene, t, &mut self.rng)
            };
            self.candidates.push(Candidate::start_at(p));
        }
    }

    /// Velocity and position update for candidate `i`.
    fn advance(&mut self, i: usize, w: Real, ranges: &[Real]) {
        self.leader_buf.clear();
        self.leader_buf
            .extend_from_slice(&self.candidates[self.leader].best_position);
        let cand = &mut self.candidates[i];
        for j in 0..cand.position.len() {
            let r1: Real = self.rng.random_range(0.0..1.0);
            let r2: Real = self.rng.random_range(0.0..1.0);
            let cognitive = self.opts.c1 * r1 * (cand.best_position[j] - cand.position[j]);
            let social = self.opts.c2 * r2 * (self.leader_buf[j] - cand.position[j]);
            let v = (w * cand.velocity[j] + cognitive + social).clamp(-ranges[j], ranges[j]);
            cand.velocity[j] = v;
            cand.position[j] += v;
        }
    }

    fn evaluate_candidate<S: SceneOracle + ?Sized>(
        &mut self,
        scene: &S,
        rig: &mut CameraRig,
        i: usize,
        iter: usize,
    ) {
        self.stats.evaluations += 1;

        if !rig.in_domain(scene, &self.candidates[i].position) {
            let cand = &mut self.candidates[i];
            cand.eval = Eval::OutOfDomain;
            cand.times_out_of_domain += 1;
            return;
        }

        // Any evaluation that cannot strictly beat this candidate's
        // personal best may prune.
        let threshold = self.candidates[i].best_eval.unwrap_or(Real::NEG_INFINITY);
        self.candidates[i].eval =
            rig.evaluate_params(scene, &self.candidates[i].position, threshold, &mut self.rng);

        let value = match self.candidates[i].eval {
            Eval::Valid(v) => v,
            Eval::Pruned => {
                self.stats.pruned += 1;
                return;
            }
            Eval::OutOfDomain => return,
        };

        let cand = &mut self.candidates[i];
        if cand.best_eval.map_or(true, |b| value > b) {
            cand.best_eval = Some(value);
            cand.best_position.copy_from_slice(&cand.position);
            cand.best_iteration = iter;
        }

        let promote = value > self.best_value || (value == self.best_value && i == self.leader);
        if promote {
            self.leader = i;
            self.best_value = value;
            let position = self.candidates[i].best_position.clone();
            let snapshot = rig.snapshot(scene, &position, &mut self.rng);
            log::debug!(
                "new global best {:.4} from candidate {} at iteration {}",
                value,
                i,
                iter
            );
            self.best_history.push(snapshot);
        }
    }

    /// Linearly decreasing inertia over the first 85% of the budget,
    /// clamped at `w_min` afterwards.
    fn inertia(&self, elapsed: Duration, limit: Duration) -> Real {
        let limit_s = limit.as_secs_f64().max(1e-9);
        let t = elapsed.as_secs_f64();
        let w = self.opts.w_max
            - t * (self.opts.w_max - self.opts.w_min) / (INERTIA_DECAY_FRACTION * limit_s);
        w.max(self.opts.w_min)
    }
}
