/// SimBot trading engine
///
/// Replays a price series tick by tick, runs one time-bounded tree search
/// per tick, and routes the resulting decision to an execution handler.
/// Order routing itself stays behind the `ExecutionHandler` seam; the
/// engine only decides and tracks the position it believes it holds.
use anyhow::Result;
use std::time::Duration;

use crate::config::Config;
use crate::corpus::PathPool;
use crate::logger::{log, LogTag};
use crate::search::{exchange_buy, exchange_sell, SearchParams, SearchTree, TradeAction};
use crate::utils::{format_pct, format_price};

// =============================================================================
// TRADING LOOP CONFIGURATION CONSTANTS
// =============================================================================

/// Log a position snapshot every N ticks while holding
pub const POSITION_LOG_EVERY_TICKS: usize = 10;

/// One market observation handed to the engine per tick
#[derive(Debug, Clone, Copy)]
pub struct MarketTick {
    pub index: usize,
    pub price: f64,
}

/// Execution collaborator seam. The engine calls this after every decision;
/// live order routing, retries and confirmation belong behind it, never in
/// the engine.
pub trait ExecutionHandler {
    fn execute(
        &mut self,
        action: TradeAction,
        tick: &MarketTick,
        investment: f64,
        holding: f64,
    ) -> Result<()>;
}

/// Paper execution: fills every order instantly at the tick price and tracks
/// balance and realized PnL.
#[derive(Debug, Clone)]
pub struct PaperExecution {
    pub balance: f64,
    pub realized_pnl: f64,
    pub open_cost: f64,
    pub trades: u32,
}

impl PaperExecution {
    pub fn new(balance: f64) -> Self {
        Self {
            balance,
            realized_pnl: 0.0,
            open_cost: 0.0,
            trades: 0,
        }
    }
}

impl ExecutionHandler for PaperExecution {
    fn execute(
        &mut self,
        action: TradeAction,
        tick: &MarketTick,
        investment: f64,
        holding: f64,
    ) -> Result<()> {
        match action {
            TradeAction::Buy => {
                self.balance -= investment;
                self.open_cost = investment;
                self.trades += 1;
            }
            TradeAction::Sell => {
                let proceeds = exchange_sell(holding, tick.price);
                self.balance += proceeds;
                self.realized_pnl += proceeds - self.open_cost;
                self.open_cost = 0.0;
                self.trades += 1;
            }
            TradeAction::DoNothing => {}
        }
        Ok(())
    }
}

/// Counters for one replay session
#[derive(Debug, Clone, Default)]
pub struct TraderSummary {
    pub ticks: usize,
    pub buys: u32,
    pub sells: u32,
    pub holds: u32,
}

/// Tick-loop driver: owns the position state between searches and seeds each
/// search with it ("already holding" vs "flat").
pub struct TraderEngine<'a> {
    pool: &'a PathPool,
    params: SearchParams,
    investment: f64,
    time_budget: Duration,
    tick_interval: Duration,
    max_ticks: usize,
    /// When set, each tick runs a fixed iteration count instead of a
    /// wall-clock budget (deterministic replays and tests)
    iterations_per_tick: Option<u64>,
    seed: Option<u64>,

    // Position state carried across ticks
    previous_action: TradeAction,
    holding: f64,
    steps_held: usize,
}

impl<'a> TraderEngine<'a> {
    pub fn new(pool: &'a PathPool, config: &Config, seed: Option<u64>) -> Self {
        Self {
            pool,
            params: SearchParams::from(&config.search),
            investment: config.trader.investment,
            time_budget: Duration::from_secs_f64(config.search.time_budget_secs),
            tick_interval: Duration::from_millis(config.trader.tick_interval_ms),
            max_ticks: config.trader.max_ticks,
            iterations_per_tick: None,
            seed,
            previous_action: TradeAction::DoNothing,
            holding: 0.0,
            steps_held: 0,
        }
    }

    /// Pin each tick to a fixed iteration count (replaces the wall-clock budget)
    pub fn with_iterations_per_tick(mut self, iterations: u64) -> Self {
        self.iterations_per_tick = Some(iterations);
        self
    }

    pub fn is_holding(&self) -> bool {
        self.holding > 0.0
    }

    /// Replay `prices` tick by tick, deciding and executing on each one.
    /// An open position at the end of the series is closed at the last price.
    pub fn run_series(
        &mut self,
        prices: &[f64],
        exec: &mut dyn ExecutionHandler,
    ) -> Result<TraderSummary> {
        let mut summary = TraderSummary::default();
        let mut last_tick: Option<MarketTick> = None;

        for (index, &price) in prices.iter().enumerate() {
            if self.max_ticks > 0 && index >= self.max_ticks {
                break;
            }
            let tick = MarketTick { index, price };
            let action = self.decide_tick(&tick)?;
            self.apply_decision(action, &tick, exec, &mut summary)?;
            summary.ticks += 1;
            last_tick = Some(tick);

            if !self.tick_interval.is_zero() {
                std::thread::sleep(self.tick_interval);
            }
        }

        // Close out rather than leaving a phantom position behind
        if self.is_holding() {
            if let Some(tick) = last_tick {
                log(
                    LogTag::Trader,
                    "WARN",
                    &format!(
                        "Series ended while holding, closing at {}",
                        format_price(tick.price)
                    ),
                );
                self.execute_sell(&tick, exec, &mut summary)?;
            }
        }

        Ok(summary)
    }

    /// Run one search for the current tick and return its decision
    fn decide_tick(&mut self, tick: &MarketTick) -> Result<TradeAction> {
        // Holding at the horizon: the search root is terminal and can no
        // longer recommend an exit, so force one
        if self.is_holding() && self.steps_held + 1 >= self.params.max_steps {
            log(
                LogTag::Trader,
                "WARN",
                &format!(
                    "Held for {} steps, exiting at the horizon",
                    self.steps_held
                ),
            );
            return Ok(TradeAction::Sell);
        }

        let tick_seed = self.seed.map(|s| s.wrapping_add(tick.index as u64));
        let mut tree = SearchTree::new(
            self.pool,
            tick.price,
            self.investment,
            self.holding,
            self.steps_held,
            self.previous_action,
            self.params,
            tick_seed,
        )?;

        let iterations = match self.iterations_per_tick {
            Some(n) => {
                tree.evaluate_iterations(n)?;
                n
            }
            None => tree.evaluate(self.time_budget)?,
        };

        let action = tree.decide();

        log(
            LogTag::Trader,
            "DEBUG",
            &format!(
                "Tick {} price {} -> {} after {} iterations over {} nodes",
                tick.index,
                format_price(tick.price),
                action,
                iterations,
                tree.node_count()
            ),
        );
        for stat in tree.root_stats() {
            log(
                LogTag::Search,
                "DEBUG",
                &format!(
                    "  {} visits={} mean_reward={:.4} roi={:.4}",
                    stat.action, stat.visits, stat.mean_reward, stat.roi
                ),
            );
        }

        Ok(action)
    }

    fn apply_decision(
        &mut self,
        action: TradeAction,
        tick: &MarketTick,
        exec: &mut dyn ExecutionHandler,
        summary: &mut TraderSummary,
    ) -> Result<()> {
        match action {
            TradeAction::Buy => {
                exec.execute(TradeAction::Buy, tick, self.investment, self.holding)?;
                self.holding = exchange_buy(self.investment, tick.price);
                self.previous_action = TradeAction::Buy;
                self.steps_held = 0;
                summary.buys += 1;
                log(
                    LogTag::Trader,
                    "SUCCESS",
                    &format!(
                        "Opened {:.4} units at {} for {}",
                        self.holding,
                        format_price(tick.price),
                        self.investment
                    ),
                );
            }
            TradeAction::Sell => {
                self.execute_sell(tick, exec, summary)?;
            }
            TradeAction::DoNothing => {
                summary.holds += 1;
                if self.is_holding() {
                    self.steps_held += 1;
                    self.previous_action = TradeAction::DoNothing;
                    if tick.index % POSITION_LOG_EVERY_TICKS == 0 {
                        let value = exchange_sell(self.holding, tick.price);
                        let change = (value / self.investment - 1.0) * 100.0;
                        log(
                            LogTag::Trader,
                            "INFO",
                            &format!(
                                "Holding {:.4} units, value {} ({})",
                                self.holding,
                                format_price(value),
                                format_pct(change)
                            ),
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn execute_sell(
        &mut self,
        tick: &MarketTick,
        exec: &mut dyn ExecutionHandler,
        summary: &mut TraderSummary,
    ) -> Result<()> {
        let proceeds = exchange_sell(self.holding, tick.price);
        let roi = proceeds - self.investment;
        exec.execute(TradeAction::Sell, tick, self.investment, self.holding)?;
        summary.sells += 1;
        log(
            LogTag::Trader,
            "SUCCESS",
            &format!(
                "Closed {:.4} units at {} for {} (return {})",
                self.holding,
                format_price(tick.price),
                format_price(proceeds),
                format_pct(roi / self.investment * 100.0)
            ),
        );
        self.holding = 0.0;
        self.previous_action = TradeAction::DoNothing;
        self.steps_held = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::corpus::{InfoPath, PathPool};

    fn pump_pool(horizon: usize) -> PathPool {
        PathPool::new(
            vec![InfoPath::from_changes(&vec![0.5; horizon], 1.0)],
            horizon,
        )
        .unwrap()
    }

    fn test_config(max_steps: usize) -> Config {
        let mut config = Config::default();
        config.search.max_steps = max_steps;
        config.trader.investment = 10.0;
        config.trader.tick_interval_ms = 0;
        config
    }

    #[test]
    fn test_paper_execution_accounting() {
        let mut exec = PaperExecution::new(100.0);
        let t0 = MarketTick { index: 0, price: 2.0 };
        let t1 = MarketTick { index: 1, price: 4.0 };

        exec.execute(TradeAction::Buy, &t0, 10.0, 0.0).unwrap();
        assert!((exec.balance - 90.0).abs() < 1e-9);

        // 5 units bought at 2.0, sold at 4.0
        exec.execute(TradeAction::Sell, &t1, 10.0, 5.0).unwrap();
        assert!((exec.balance - 110.0).abs() < 1e-9);
        assert!((exec.realized_pnl - 10.0).abs() < 1e-9);
        assert_eq!(exec.trades, 2);
    }

    #[test]
    fn test_do_nothing_leaves_execution_untouched() {
        let mut exec = PaperExecution::new(50.0);
        let tick = MarketTick { index: 0, price: 1.0 };
        exec.execute(TradeAction::DoNothing, &tick, 10.0, 0.0).unwrap();
        assert!((exec.balance - 50.0).abs() < 1e-9);
        assert_eq!(exec.trades, 0);
    }

    #[test]
    fn test_engine_buys_into_pump_and_closes_out() {
        let pool = pump_pool(8);
        let config = test_config(8);
        let mut engine =
            TraderEngine::new(&pool, &config, Some(99)).with_iterations_per_tick(400);
        let mut exec = PaperExecution::new(100.0);

        // Reality matches the corpus belief: steady pump
        let prices: Vec<f64> = (0..6).map(|i| 1.5f64.powi(i)).collect();
        let summary = engine.run_series(&prices, &mut exec).unwrap();

        assert_eq!(summary.ticks, 6);
        assert!(summary.buys >= 1);
        assert!(summary.sells >= 1, "open positions must be closed out");
        assert!(!engine.is_holding());
        // Bought into a pump that materialized
        assert!(exec.realized_pnl > 0.0);
    }

    #[test]
    fn test_engine_forces_exit_at_horizon() {
        let pool = pump_pool(4);
        let config = test_config(4);
        let mut engine =
            TraderEngine::new(&pool, &config, Some(7)).with_iterations_per_tick(300);
        let mut exec = PaperExecution::new(100.0);

        // Long flat series: if the engine buys, the horizon must force the
        // exit well before the series ends
        let prices = vec![1.0; 12];
        let summary = engine.run_series(&prices, &mut exec).unwrap();

        assert_eq!(summary.buys, summary.sells);
        assert!(!engine.is_holding());
    }

    #[test]
    fn test_max_ticks_caps_the_replay() {
        let pool = pump_pool(8);
        let mut config = test_config(8);
        config.trader.max_ticks = 3;
        let mut engine =
            TraderEngine::new(&pool, &config, Some(5)).with_iterations_per_tick(100);
        let mut exec = PaperExecution::new(100.0);

        let prices = vec![1.0; 10];
        let summary = engine.run_series(&prices, &mut exec).unwrap();
        assert_eq!(summary.ticks, 3);
    }
}
