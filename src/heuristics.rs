//! Static position evaluation and the greedy baseline strategy.

use serde::{Deserialize, Serialize};

use crate::engine::{all_components, Board, Component};

/// Weights of the static evaluation used at the bounded search's horizon.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    /// Per legal move available.
    pub mobility: f64,
    /// Per cell of average removable-component size.
    pub average_size: f64,
    /// Applied to the (non-positive) normalized spread between the most and least common color.
    pub color_balance: f64,
    /// Applied to the fraction of empty cells.
    pub empty_fraction: f64,
    /// Subtracted once per legal move, offsetting boards fragmented into many small groups.
    pub clustering_penalty: f64,
    /// Applied to the sum of squared component sizes.
    pub large_component_bonus: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        EvalWeights {
            mobility: 50.0,
            average_size: 30.0,
            color_balance: 100.0,
            empty_fraction: 200.0,
            clustering_penalty: 5.0,
            large_component_bonus: 0.1,
        }
    }
}

/// Number of distinct colors still on the board.
pub fn count_unique_colors(board: &Board) -> usize {
    board.color_counts().iter().filter(|&&n| n > 0).count()
}

/// `-(max - min) / cells` over the colors present; zero when fewer than two colors remain.
pub fn color_balance(board: &Board) -> f64 {
    if count_unique_colors(board) < 2 {
        return 0.0;
    }
    let present: Vec<usize> = board
        .color_counts()
        .into_iter()
        .filter(|&n| n > 0)
        .collect();
    let max = present.iter().copied().max().unwrap_or(0);
    let min = present.iter().copied().min().unwrap_or(0);
    -((max - min) as f64) / (board.rows() * board.cols()) as f64
}

/// Scores how promising a position is for the player about to move.
///
/// Combines the number of legal moves, the average removable-component size, the color
/// balance, the fraction of empty cells and a bonus for large components. The result only
/// depends on the board, so equal boards always evaluate equally.
pub fn evaluate(board: &Board, weights: &EvalWeights) -> f64 {
    let components = all_components(board);
    let total_cells = (board.rows() * board.cols()) as f64;

    let num_moves = components.len() as f64;
    let avg_size = if components.is_empty() {
        0.0
    } else {
        components.iter().map(Component::len).sum::<usize>() as f64 / num_moves
    };
    let empty = (board.rows() * board.cols() - board.live_cells()) as f64 / total_cells;
    let squared: u64 = components.iter().map(Component::gain).sum();

    weights.mobility * num_moves + weights.average_size * avg_size
        + weights.color_balance * color_balance(board)
        + weights.empty_fraction * empty
        - weights.clustering_penalty * num_moves
        + weights.large_component_bonus * squared as f64
}

/// Chooses the move with the highest immediate score, i.e. the largest component.
///
/// Ties go to the component met first in row-major scan order. Returns `None` when no
/// removable component exists.
pub fn greedy_move(board: &Board) -> Option<Component> {
    largest_component(all_components(board))
}

/// The largest of `components`, keeping the earliest one on ties.
pub fn largest_component(components: impl IntoIterator<Item = Component>) -> Option<Component> {
    let mut best: Option<Component> = None;
    for component in components {
        if best.as_ref().map_or(true, |b| component.len() > b.len()) {
            best = Some(component);
        }
    }
    best
}
