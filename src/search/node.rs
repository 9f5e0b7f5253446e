use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::state::{SearchParams, SimulationState};
use crate::corpus::InfoPath;
use crate::errors::{Result, SearchError, SimBotError};

pub type NodeId = usize;

/// One search-tree node. Children are exclusively owned by the arena and
/// referenced by index; `parent` is a non-owning back-reference used only by
/// backpropagation.
#[derive(Debug)]
pub struct Node {
    pub state: SimulationState,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub visits: u64,
    pub total_reward: f64,
}

impl Node {
    pub fn new(state: SimulationState, parent: Option<NodeId>) -> Self {
        Self {
            state,
            parent,
            children: Vec::new(),
            visits: 0,
            total_reward: 0.0,
        }
    }

    pub fn mean_reward(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.total_reward / self.visits as f64
        }
    }
}

/// Index arena holding one search's tree. Dropping the arena tears the whole
/// tree down at once; no reference counting, no parent/child cycles.
#[derive(Debug, Default)]
pub struct Arena {
    nodes: Vec<Node>,
}

impl Arena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn insert(&mut self, node: Node) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or(SimBotError::Search(SearchError::InvalidNodeId { id }))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or(SimBotError::Search(SearchError::InvalidNodeId { id }))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// UCB1: exploitation (mean reward) plus an exploration bonus that shrinks
/// with child visits. Unvisited children score +infinity so every action gets
/// sampled once before exploitation begins.
pub fn ucb1_score(
    total_reward: f64,
    visits: u64,
    parent_visits: u64,
    exploration_constant: f64,
) -> f64 {
    if visits == 0 {
        return f64::INFINITY;
    }
    let mean = total_reward / visits as f64;
    // Parent visit floor of 1 keeps ln() out of negative territory on the
    // first descent, before any backpropagation has reached the parent.
    let bonus =
        exploration_constant * ((parent_visits.max(1) as f64).ln() / visits as f64).sqrt();
    mean + bonus
}

/// One full descent of the tree policy from `root`: select down, expand or
/// roll out, backpropagate one terminal reward. Returns that reward.
pub fn run_iteration(
    arena: &mut Arena,
    root: NodeId,
    path: &InfoPath,
    params: &SearchParams,
    rng: &mut StdRng,
) -> Result<f64> {
    let mut current = root;
    loop {
        let node = arena.get(current)?;

        // Terminal states only re-assert their own reward
        if node.state.is_terminal(params.max_steps) {
            let reward = node.state.terminal_reward(params);
            backpropagate(arena, current, reward)?;
            return Ok(reward);
        }

        // Fresh non-root nodes get a rollout estimate before any expansion
        if node.visits == 0 && current != root {
            let reward = rollout(&node.state, path, params, rng)?;
            backpropagate(arena, current, reward)?;
            return Ok(reward);
        }

        if node.children.is_empty() {
            expand(arena, current, path)?;
        }

        current = select_best_child(arena, current, params)?;
    }
}

/// Create exactly one child per legal action, all advancing one step along
/// the active info path.
fn expand(arena: &mut Arena, id: NodeId, path: &InfoPath) -> Result<()> {
    let (state, cursor) = {
        let node = arena.get(id)?;
        (node.state.clone(), node.state.path_cursor)
    };

    let change = path
        .change_at(cursor)
        .ok_or_else(|| SimBotError::path_exhausted(cursor, path.len()))?;
    let next_price = state.price * (1.0 + change);

    for &action in state.legal_actions() {
        let child_state = state.apply(action, next_price);
        let child_id = arena.insert(Node::new(child_state, Some(id)));
        arena.get_mut(id)?.children.push(child_id);
    }
    Ok(())
}

/// Child maximizing UCB1; ties resolved to the first maximum in child order
fn select_best_child(arena: &Arena, id: NodeId, params: &SearchParams) -> Result<NodeId> {
    let node = arena.get(id)?;
    let mut best: Option<(NodeId, f64)> = None;
    for &child_id in &node.children {
        let child = arena.get(child_id)?;
        let score = ucb1_score(
            child.total_reward,
            child.visits,
            node.visits,
            params.exploration_constant,
        );
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((child_id, score)),
        }
    }
    best.map(|(child_id, _)| child_id).ok_or_else(|| {
        SimBotError::Search(SearchError::Generic {
            message: "selection reached a node with no children".to_string(),
        })
    })
}

/// Policy-free playout: walk the active path taking uniform-random legal
/// actions until a terminal state, return its shaped reward. Seeds the value
/// of freshly discovered nodes and is never used once a node has children.
fn rollout(
    start: &SimulationState,
    path: &InfoPath,
    params: &SearchParams,
    rng: &mut StdRng,
) -> Result<f64> {
    let mut state = start.clone();
    while !state.is_terminal(params.max_steps) {
        let change = path
            .change_at(state.path_cursor)
            .ok_or_else(|| SimBotError::path_exhausted(state.path_cursor, path.len()))?;
        let next_price = state.price * (1.0 + change);

        let legal = state.legal_actions();
        let action = *legal.choose(rng).ok_or_else(|| {
            SimBotError::Search(SearchError::Generic {
                message: "non-terminal state with no legal actions".to_string(),
            })
        })?;
        state = state.apply(action, next_price);
    }
    Ok(state.terminal_reward(params))
}

/// Add one visit and the reward to the node and every ancestor up to and
/// including the root.
fn backpropagate(arena: &mut Arena, from: NodeId, reward: f64) -> Result<()> {
    let mut current = Some(from);
    while let Some(id) = current {
        let node = arena.get_mut(id)?;
        node.visits += 1;
        node.total_reward += reward;
        current = node.parent;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::action::TradeAction;
    use rand::SeedableRng;

    fn flat_path(len: usize) -> InfoPath {
        InfoPath::from_changes(&vec![0.0; len], 1.0)
    }

    fn small_params() -> SearchParams {
        SearchParams {
            max_steps: 5,
            ..SearchParams::default()
        }
    }

    fn seed_root(arena: &mut Arena, holding: f64, previous: TradeAction) -> NodeId {
        let state = SimulationState::root(1.0, 10.0, holding, 0, previous);
        arena.insert(Node::new(state, None))
    }

    #[test]
    fn test_ucb1_unvisited_is_infinite() {
        assert_eq!(ucb1_score(0.0, 0, 100, 2.0), f64::INFINITY);
        assert!(ucb1_score(50.0, 10, 100, 2.0).is_finite());
    }

    #[test]
    fn test_ucb1_monotone_in_mean_reward() {
        // Same visit counts: higher average reward, higher score
        let low = ucb1_score(10.0, 5, 50, 2.0);
        let high = ucb1_score(20.0, 5, 50, 2.0);
        assert!(high > low);
    }

    #[test]
    fn test_ucb1_exploration_bonus_shrinks_with_visits() {
        let lightly_visited = ucb1_score(5.0, 5, 100, 2.0);
        let heavily_visited = ucb1_score(100.0, 100, 100, 2.0);
        // Equal means (1.0), bonus favors the lightly visited child
        assert!(lightly_visited > heavily_visited);
    }

    #[test]
    fn test_expansion_creates_one_child_per_legal_action() {
        let mut arena = Arena::new();
        let root = seed_root(&mut arena, 0.0, TradeAction::DoNothing);
        let path = flat_path(8);
        expand(&mut arena, root, &path).unwrap();

        let children = arena.get(root).unwrap().children.clone();
        assert_eq!(children.len(), 2);
        assert_eq!(arena.get(children[0]).unwrap().state.action, TradeAction::Buy);
        assert_eq!(
            arena.get(children[1]).unwrap().state.action,
            TradeAction::DoNothing
        );
        for id in children {
            let child = arena.get(id).unwrap();
            assert_eq!(child.state.step_index, 1);
            assert_eq!(child.state.path_cursor, 1);
            assert_eq!(child.parent, Some(root));
        }
    }

    #[test]
    fn test_backpropagation_conservation() {
        let mut arena = Arena::new();
        let root = seed_root(&mut arena, 0.0, TradeAction::DoNothing);
        let path = flat_path(8);
        let params = small_params();
        let mut rng = StdRng::seed_from_u64(3);

        let n = 200;
        let mut reward_sum = 0.0;
        for _ in 0..n {
            reward_sum += run_iteration(&mut arena, root, &path, &params, &mut rng).unwrap();
        }

        let root_node = arena.get(root).unwrap();
        assert_eq!(root_node.visits, n);
        assert!((root_node.total_reward - reward_sum).abs() < 1e-6);
    }

    #[test]
    fn test_terminal_node_never_expands_and_repeats_reward() {
        let mut arena = Arena::new();
        // Sold state: terminal from the start
        let root = seed_root(&mut arena, 20.0, TradeAction::Sell);
        let path = flat_path(8);
        let params = small_params();
        let mut rng = StdRng::seed_from_u64(3);

        let first = run_iteration(&mut arena, root, &path, &params, &mut rng).unwrap();
        for _ in 0..10 {
            let again = run_iteration(&mut arena, root, &path, &params, &mut rng).unwrap();
            assert!((again - first).abs() < 1e-12);
        }

        let node = arena.get(root).unwrap();
        assert!(node.children.is_empty());
        assert_eq!(node.visits, 11);
        assert!((node.total_reward - first * 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_rollout_reaches_terminal_on_flat_path() {
        let state = SimulationState::root(1.0, 10.0, 0.0, 0, TradeAction::DoNothing);
        let path = flat_path(8);
        let params = small_params();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let reward = rollout(&state, &path, &params, &mut rng).unwrap();
            // Flat path: a bought-then-sold branch returns 0, a never-bought
            // branch returns -investment, amplified past the loss threshold
            assert!(reward == 0.0 || (reward + 20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_path_exhaustion_is_an_error_not_truncation() {
        let state = SimulationState::root(1.0, 10.0, 0.0, 0, TradeAction::DoNothing);
        // Path shorter than the horizon: rollout must fail loudly
        let path = flat_path(2);
        let params = small_params();
        let mut rng = StdRng::seed_from_u64(1);
        let mut saw_exhaustion = false;
        for _ in 0..50 {
            if let Err(SimBotError::Search(SearchError::PathExhausted { .. })) =
                rollout(&state, &path, &params, &mut rng)
            {
                saw_exhaustion = true;
                break;
            }
        }
        assert!(saw_exhaustion);
    }

    #[test]
    fn test_selection_prefers_unvisited_children() {
        let mut arena = Arena::new();
        let root = seed_root(&mut arena, 0.0, TradeAction::DoNothing);
        let path = flat_path(8);
        let params = small_params();
        expand(&mut arena, root, &path).unwrap();

        let children = arena.get(root).unwrap().children.clone();
        // Visit the first child; the unvisited second must win selection
        {
            let first = arena.get_mut(children[0]).unwrap();
            first.visits = 5;
            first.total_reward = 1000.0;
        }
        arena.get_mut(root).unwrap().visits = 5;

        let picked = select_best_child(&arena, root, &params).unwrap();
        assert_eq!(picked, children[1]);
    }
}
