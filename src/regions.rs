//! Decomposition of a board into independent subproblems.
//!
//! Two decompositions are provided:
//! - [`partition`] splits the board at fully empty columns. No component can cross an empty
//!   column, so the resulting regions are independent for single-ply evaluation.
//! - [`bisect`] splits at the fixed midpoint `cols / 2`. Components straddling the midpoint
//!   go to the side holding the strict majority of their cells, ties to the left.
//!
//! Neither result is cached: a move can compact columns and merge regions, so callers must
//! partition again before every evaluation.
use crate::engine::{all_components, Board, Cell, Component};
use std::ops::Range;

/// A maximal run of non-empty columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    columns: Range<usize>,
}

impl Region {
    pub fn new(columns: Range<usize>) -> Self {
        Region { columns }
    }

    /// Column indices covered by this region (half-open).
    pub fn columns(&self) -> Range<usize> {
        self.columns.clone()
    }

    pub fn contains_column(&self, col: usize) -> bool {
        self.columns.contains(&col)
    }

    /// Whether every cell of `component` lies inside this region.
    pub fn contains_component(&self, component: &Component) -> bool {
        !component.is_empty() && component.cells().iter().all(|&(_, c)| self.contains_column(c))
    }

    /// Removable components of `board` that lie entirely inside this region, in scan order.
    pub fn components(&self, board: &Board) -> Vec<Component> {
        all_components(board)
            .into_iter()
            .filter(|component| self.contains_component(component))
            .collect()
    }
}

/// Splits the board into regions separated by fully empty columns, ordered left to right.
///
/// The union of the regions' columns is exactly the set of columns holding at least one
/// occupied cell. A cleared board has no regions.
///
/// # Examples
/// ```
/// use samegame_engine::regions::partition;
/// use samegame_engine::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["RR..G", "RB..G"]).unwrap();
/// let regions = partition(&board);
/// assert_eq!(regions.len(), 2);
/// assert_eq!(regions[0].columns(), 0..2);
/// assert_eq!(regions[1].columns(), 4..5);
/// ```
pub fn partition(board: &Board) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut start: Option<usize> = None;

    for c in 0..board.cols() {
        match (board.is_column_empty(c), start) {
            (false, None) => start = Some(c),
            (true, Some(s)) => {
                regions.push(Region::new(s..c));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        regions.push(Region::new(s..board.cols()));
    }
    regions
}

/// Which half of a bisected board a component belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Decides the side for a set of cells split at column `mid`: strict majority wins, an
/// exact tie goes left.
pub fn side_of(cells: &[Cell], mid: usize) -> Side {
    let left = cells.iter().filter(|&&(_, c)| c < mid).count();
    let right = cells.len() - left;
    if right > left {
        Side::Right
    } else {
        Side::Left
    }
}

/// The removable components of a board split at its midpoint column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bisection {
    pub mid: usize,
    pub left: Vec<Component>,
    pub right: Vec<Component>,
}

impl Bisection {
    /// Number of components that have cells on both sides of the midpoint.
    pub fn straddling(&self) -> usize {
        self.left
            .iter()
            .chain(self.right.iter())
            .filter(|component| {
                component
                    .column_span()
                    .map_or(false, |(lo, hi)| lo < self.mid && hi >= self.mid)
            })
            .count()
    }
}

/// Assigns every removable component to exactly one half of the board.
pub fn bisect(board: &Board) -> Bisection {
    let mid = board.cols() / 2;
    let mut bisection = Bisection {
        mid,
        ..Bisection::default()
    };
    for component in all_components(board) {
        match side_of(component.cells(), mid) {
            Side::Left => bisection.left.push(component),
            Side::Right => bisection.right.push(component),
        }
    }
    bisection
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::board_from_str_array;

    #[test]
    fn test_partition_full_board_is_one_region() {
        let board = board_from_str_array(&["RGB", "GBR"]).unwrap();
        assert_eq!(partition(&board), vec![Region::new(0..3)]);
    }

    #[test]
    fn test_partition_skips_leading_and_trailing_gaps() {
        let board = board_from_str_array(&[".R.GG.", ".R.BB."]).unwrap();
        assert_eq!(
            partition(&board),
            vec![Region::new(1..2), Region::new(3..5)]
        );
    }

    #[test]
    fn test_partition_cleared_board() {
        let board = board_from_str_array(&["...", "..."]).unwrap();
        assert!(partition(&board).is_empty());
    }

    #[test]
    fn test_region_components_filter() {
        let board = board_from_str_array(&["RR.GG", "BR.GY"]).unwrap();
        let regions = partition(&board);
        let left = regions[0].components(&board);
        let right = regions[1].components(&board);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].anchor(), Some((0, 0)));
        assert_eq!(right.len(), 1);
        assert_eq!(right[0].anchor(), Some((0, 3)));
    }

    #[test]
    fn test_side_of_majority_and_tie() {
        assert_eq!(side_of(&[(0, 1), (0, 2), (0, 3)], 2), Side::Right);
        assert_eq!(side_of(&[(0, 1), (0, 2)], 2), Side::Left);
        assert_eq!(side_of(&[(0, 0), (1, 0), (1, 2)], 2), Side::Left);
    }

    #[test]
    fn test_bisect_assigns_each_component_once() {
        let board = board_from_str_array(&["GRRR", "GBYB"]).unwrap();
        let bisection = bisect(&board);
        assert_eq!(bisection.mid, 2);
        // GG is fully left; RRR has two cells right of the midpoint.
        assert_eq!(bisection.left.len(), 1);
        assert_eq!(bisection.right.len(), 1);
        assert_eq!(bisection.right[0].len(), 3);
        assert_eq!(bisection.straddling(), 1);
    }

    #[test]
    fn test_bisect_tie_goes_left() {
        let board = board_from_str_array(&["GRRB"]).unwrap();
        let bisection = bisect(&board);
        assert_eq!(bisection.left.len(), 1);
        assert!(bisection.right.is_empty());
    }
}
