use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

use super::action::TradeAction;
use super::node::{run_iteration, Arena, Node, NodeId};
use super::state::{SearchParams, SimulationState};
use crate::corpus::PathPool;
use crate::errors::{ConfigurationError, Result, SimBotError};

/// Per-root-child diagnostics exposed after an evaluation
#[derive(Debug, Clone)]
pub struct ActionStats {
    pub action: TradeAction,
    pub visits: u64,
    pub total_reward: f64,
    pub mean_reward: f64,
    /// Liquidation value of the child's state minus investment, unshaped
    pub roi: f64,
}

/// Time-bounded MCTS driver for one trading tick.
///
/// Owns its node arena and RNG exclusively; borrows the path pool read-only,
/// so any number of trees can search over the same pool concurrently. The
/// active info path is re-drawn from the pool every `batch_size` iterations,
/// which averages the value estimates over many plausible futures.
pub struct SearchTree<'a> {
    pool: &'a PathPool,
    params: SearchParams,
    arena: Arena,
    root: NodeId,
    active_path: usize,
    rng: StdRng,
    iterations_run: u64,
}

impl<'a> SearchTree<'a> {
    /// Build a search seeded with the live market scalars. Fails fast on
    /// invalid parameters or a pool that does not cover the horizon;
    /// `seed` pins the RNG for reproducible searches.
    pub fn new(
        pool: &'a PathPool,
        price: f64,
        investment: f64,
        holding: f64,
        current_step: usize,
        previous_action: TradeAction,
        params: SearchParams,
        seed: Option<u64>,
    ) -> Result<Self> {
        params.validate()?;
        if pool.is_empty() {
            return Err(SimBotError::Configuration(ConfigurationError::EmptyPathPool));
        }
        if pool.horizon() < params.max_steps {
            return Err(SimBotError::invalid_field(
                "max_steps",
                format!(
                    "horizon {} exceeds pool coverage {}",
                    params.max_steps,
                    pool.horizon()
                ),
            ));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(SimBotError::invalid_field("price", "must be positive"));
        }
        if !investment.is_finite() || investment <= 0.0 {
            return Err(SimBotError::invalid_field(
                "investment",
                "must be positive",
            ));
        }
        if !holding.is_finite() || holding < 0.0 {
            return Err(SimBotError::invalid_field(
                "holding",
                "must be non-negative",
            ));
        }

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let active_path = rng.gen_range(0..pool.len());

        let mut arena = Arena::new();
        let root_state =
            SimulationState::root(price, investment, holding, current_step, previous_action);
        let root = arena.insert(Node::new(root_state, None));

        Ok(Self {
            pool,
            params,
            arena,
            root,
            active_path,
            rng,
            iterations_run: 0,
        })
    }

    /// Run tree-policy iterations until the wall-clock budget expires.
    /// Returns the number of iterations completed.
    pub fn evaluate(&mut self, time_budget: Duration) -> Result<u64> {
        if time_budget.is_zero() {
            return Err(SimBotError::Configuration(
                ConfigurationError::NonPositiveTimeBudget {
                    seconds: time_budget.as_secs_f64(),
                },
            ));
        }

        let started = Instant::now();
        let mut completed = 0u64;
        while started.elapsed() < time_budget {
            self.step_iteration()?;
            completed += 1;
        }
        Ok(completed)
    }

    /// Run exactly `n` iterations. Deterministic together with a fixed seed
    /// and pool; the test and benchmark entry point.
    pub fn evaluate_iterations(&mut self, n: u64) -> Result<()> {
        for _ in 0..n {
            self.step_iteration()?;
        }
        Ok(())
    }

    fn step_iteration(&mut self) -> Result<()> {
        // Re-draw the world model between batches of simulations
        if self.iterations_run > 0 && self.iterations_run % self.params.batch_size == 0 {
            self.active_path = self.rng.gen_range(0..self.pool.len());
        }
        let path = self.pool.get(self.active_path);
        run_iteration(&mut self.arena, self.root, path, &self.params, &mut self.rng)?;
        self.iterations_run += 1;
        Ok(())
    }

    /// The action of the root child with the most visits. Visit count, not
    /// mean reward: it is the robust decision rule, less sensitive to noise
    /// on lightly-visited high-variance branches. DoNothing when the budget
    /// expired before any expansion.
    pub fn decide(&self) -> TradeAction {
        let mut best: Option<(TradeAction, u64)> = None;
        if let Ok(root) = self.arena.get(self.root) {
            for &child_id in &root.children {
                if let Ok(child) = self.arena.get(child_id) {
                    match best {
                        Some((_, best_visits)) if child.visits <= best_visits => {}
                        _ => best = Some((child.state.action, child.visits)),
                    }
                }
            }
        }
        best.map(|(action, _)| action).unwrap_or(TradeAction::DoNothing)
    }

    /// Per-root-child observability tuples, in child order
    pub fn root_stats(&self) -> Vec<ActionStats> {
        let mut stats = Vec::new();
        if let Ok(root) = self.arena.get(self.root) {
            for &child_id in &root.children {
                if let Ok(child) = self.arena.get(child_id) {
                    stats.push(ActionStats {
                        action: child.state.action,
                        visits: child.visits,
                        total_reward: child.total_reward,
                        mean_reward: child.mean_reward(),
                        roi: child.state.return_of_investment(),
                    });
                }
            }
        }
        stats
    }

    pub fn iterations_run(&self) -> u64 {
        self.iterations_run
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }
}
