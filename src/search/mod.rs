// ═══════════════════════════════════════════════════════════════════════════════
// SEARCH MODULE - TIME-BOUNDED MONTE CARLO TREE SEARCH OVER PRICE TRAJECTORIES
// ═══════════════════════════════════════════════════════════════════════════════
//
// Decides BUY / SELL / DO_NOTHING for one tick by simulating futures drawn
// from the historical corpus:
//
// • Tree policy: UCB1 selection, one-child-per-legal-action expansion,
//   uniform-random rollout on first visit, full-ancestry backpropagation
// • The active info path is re-drawn from the pool every batch of
//   iterations, so value estimates average over many plausible futures
//   instead of over-fitting one sampled trajectory
// • The final decision is the root child with the most visits (robust to
//   reward noise on lightly-visited high-variance branches)
//
// The whole search is synchronous and allocation-light: nodes live in a
// per-search arena, the corpus is only read, nothing blocks.

pub mod action;
pub mod node;
pub mod state;
pub mod tree;


pub use action::{legal_actions, TradeAction};
pub use node::{ucb1_score, Arena, Node, NodeId};
pub use state::{exchange_buy, exchange_sell, SearchParams, SimulationState};
pub use tree::{ActionStats, SearchTree};
