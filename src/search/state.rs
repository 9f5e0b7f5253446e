use super::action::{legal_actions, TradeAction};
use crate::config::SearchConfig;
use crate::errors::{Result, SimBotError};

/// Token units purchasable with `investment` at `price`
pub fn exchange_buy(investment: f64, price: f64) -> f64 {
    investment / price
}

/// Proceeds from liquidating `holding_units` at `price`
pub fn exchange_sell(holding_units: f64, price: f64) -> f64 {
    holding_units * price
}

/// Engine-level knobs for one search. All reward-shaping fields are policy
/// parameters, not laws; the defaults mirror the config defaults.
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    pub max_steps: usize,
    pub batch_size: u64,
    pub exploration_constant: f64,
    pub win_amplify_threshold: f64,
    pub loss_amplify_threshold: f64,
    pub amplify_factor: f64,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_steps: 20,
            batch_size: 5000,
            exploration_constant: 2.0,
            win_amplify_threshold: 4.0,
            loss_amplify_threshold: -5.0,
            amplify_factor: 2.0,
        }
    }
}

impl From<&SearchConfig> for SearchParams {
    fn from(config: &SearchConfig) -> Self {
        Self {
            max_steps: config.max_steps,
            batch_size: config.batch_size,
            exploration_constant: config.exploration_constant,
            win_amplify_threshold: config.win_amplify_threshold,
            loss_amplify_threshold: config.loss_amplify_threshold,
            amplify_factor: config.amplify_factor,
        }
    }
}

impl SearchParams {
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(SimBotError::invalid_field("max_steps", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(SimBotError::invalid_field("batch_size", "must be at least 1"));
        }
        if self.exploration_constant < 0.0 || !self.exploration_constant.is_finite() {
            return Err(SimBotError::invalid_field(
                "exploration_constant",
                "must be finite and non-negative",
            ));
        }
        if self.amplify_factor <= 0.0 {
            return Err(SimBotError::invalid_field(
                "amplify_factor",
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// One point along one simulated trajectory. Immutable: children are built by
/// `apply`, never by mutating a parent.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// Absolute step on the tick timeline, increases by exactly 1 per child
    pub step_index: usize,
    /// Simulated price at this step
    pub price: f64,
    /// Action taken to reach this point
    pub action: TradeAction,
    /// Capital committed at entry, quote-asset denominated
    pub investment: f64,
    /// Token units currently held, never negative
    pub holding: f64,
    /// Entries consumed from the active info path to reach this point
    pub path_cursor: usize,
}

impl SimulationState {
    /// Seed state for a search root, built from live market scalars. The
    /// previous action and holding decide which branch of the action machine
    /// the search starts in ("already holding" vs "flat").
    pub fn root(
        price: f64,
        investment: f64,
        holding: f64,
        current_step: usize,
        previous_action: TradeAction,
    ) -> Self {
        Self {
            step_index: current_step,
            price,
            action: previous_action,
            investment,
            holding,
            path_cursor: 0,
        }
    }

    /// Build the successor reached by taking `action` while the price moves
    /// to `next_price` (one info-path entry consumed).
    ///
    /// A Buy converts the committed investment to units at the new price. A
    /// Sell keeps the holding on the state; proceeds are derived in
    /// `return_of_investment` from (holding, price) at the moment of sale.
    pub fn apply(&self, action: TradeAction, next_price: f64) -> Self {
        let holding = match action {
            TradeAction::Buy => exchange_buy(self.investment, next_price),
            TradeAction::Sell | TradeAction::DoNothing => self.holding,
        };
        Self {
            step_index: self.step_index + 1,
            price: next_price,
            action,
            investment: self.investment,
            holding,
            path_cursor: self.path_cursor + 1,
        }
    }

    /// Terminal iff sold or the horizon is reached
    pub fn is_terminal(&self, max_steps: usize) -> bool {
        self.action == TradeAction::Sell || self.step_index >= max_steps
    }

    pub fn legal_actions(&self) -> &'static [TradeAction] {
        legal_actions(self.action, self.holding)
    }

    /// Liquidation value minus committed investment. This is the
    /// decision-quality signal reported to callers, without reward shaping.
    pub fn return_of_investment(&self) -> f64 {
        exchange_sell(self.holding, self.price) - self.investment
    }

    /// Reward propagated through the tree: return on investment with large
    /// outcomes amplified so the search strongly seeks big wins and strongly
    /// avoids big losses.
    pub fn terminal_reward(&self, params: &SearchParams) -> f64 {
        let mut reward = self.return_of_investment();
        if reward >= params.win_amplify_threshold || reward < params.loss_amplify_threshold {
            reward *= params.amplify_factor;
        }
        reward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SearchParams {
        SearchParams::default()
    }

    #[test]
    fn test_exchange_round_trip() {
        let units = exchange_buy(10.0, 0.25);
        assert!((units - 40.0).abs() < 1e-9);
        let proceeds = exchange_sell(units, 0.25);
        assert!((proceeds - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_apply_buy_converts_investment_at_new_price() {
        let root = SimulationState::root(1.0, 10.0, 0.0, 0, TradeAction::DoNothing);
        let child = root.apply(TradeAction::Buy, 2.0);
        assert_eq!(child.step_index, 1);
        assert_eq!(child.path_cursor, 1);
        assert!((child.holding - 5.0).abs() < 1e-9);
        assert_eq!(child.action, TradeAction::Buy);
    }

    #[test]
    fn test_apply_sell_keeps_holding_for_valuation() {
        let root = SimulationState::root(1.0, 10.0, 100.0, 0, TradeAction::Buy);
        let child = root.apply(TradeAction::Sell, 2.0);
        assert!((child.holding - 100.0).abs() < 1e-9);
        assert!((child.return_of_investment() - 190.0).abs() < 1e-9);
    }

    #[test]
    fn test_terminal_conditions() {
        let p = params();
        let sold = SimulationState::root(1.0, 10.0, 5.0, 3, TradeAction::Sell);
        assert!(sold.is_terminal(p.max_steps));
        assert!(sold.legal_actions().is_empty());

        let at_horizon = SimulationState::root(1.0, 10.0, 0.0, p.max_steps, TradeAction::DoNothing);
        assert!(at_horizon.is_terminal(p.max_steps));

        let live = SimulationState::root(1.0, 10.0, 0.0, 0, TradeAction::DoNothing);
        assert!(!live.is_terminal(p.max_steps));
    }

    #[test]
    fn test_reward_amplification_thresholds() {
        let p = params();

        // Big win doubled
        let win = SimulationState::root(1.0, 10.0, 15.0, 5, TradeAction::Sell);
        assert!((win.return_of_investment() - 5.0).abs() < 1e-9);
        assert!((win.terminal_reward(&p) - 10.0).abs() < 1e-9);

        // Big loss doubled
        let loss = SimulationState::root(1.0, 10.0, 4.0, 5, TradeAction::Sell);
        assert!((loss.return_of_investment() + 6.0).abs() < 1e-9);
        assert!((loss.terminal_reward(&p) + 12.0).abs() < 1e-9);

        // Small outcome untouched
        let flat = SimulationState::root(1.0, 10.0, 11.0, 5, TradeAction::Sell);
        assert!((flat.return_of_investment() - 1.0).abs() < 1e-9);
        assert!((flat.terminal_reward(&p) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_amplification_boundary_is_inclusive_on_wins() {
        let p = params();
        // Exactly at the win threshold: amplified
        let edge = SimulationState::root(1.0, 10.0, 14.0, 5, TradeAction::Sell);
        assert!((edge.return_of_investment() - 4.0).abs() < 1e-9);
        assert!((edge.terminal_reward(&p) - 8.0).abs() < 1e-9);

        // Exactly at the loss threshold: NOT amplified (strict less-than)
        let loss_edge = SimulationState::root(1.0, 10.0, 5.0, 5, TradeAction::Sell);
        assert!((loss_edge.return_of_investment() + 5.0).abs() < 1e-9);
        assert!((loss_edge.terminal_reward(&p) + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_params_validation() {
        let mut p = params();
        assert!(p.validate().is_ok());
        p.max_steps = 0;
        assert!(p.validate().is_err());

        let mut p = params();
        p.batch_size = 0;
        assert!(p.validate().is_err());

        let mut p = params();
        p.exploration_constant = -1.0;
        assert!(p.validate().is_err());
    }
}
