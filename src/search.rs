//! Game-tree evaluation.
//!
//! [`ExactSearch`] computes the optimal score differential with a memoized dynamic program
//! keyed by the full board and the side to move. It walks the game tree with an explicit
//! stack of frames, so call-stack depth stays constant however long the game runs.
//!
//! [`BoundedSearch`] is the fallback for boards too large to solve exactly: a depth-limited
//! alpha-beta minimax with a wall-clock deadline and a static evaluation at the horizon.
//!
//! Both express values in the same frame: `V(board, to_move)` is the CPU's future score
//! minus the human's. The CPU maximizes it, the human minimizes it, and a terminal board is
//! worth 0. Swapping the side to move negates the value: `V(b, Human) == -V(b, Cpu)`.
use std::collections::HashMap;
use std::time::Instant;

use crate::config::DifficultyPreset;
use crate::engine::{all_components, simulate, Board, Component, Player};
use crate::heuristics::{evaluate, EvalWeights};
use crate::trace::SearchStats;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rule {
    /// Players alternate; value is CPU minus Human.
    Duel,
    /// One player makes every move; value is that player's total.
    Solo,
}

impl Rule {
    fn child_turn(self, to_move: Player) -> Player {
        match self {
            Rule::Duel => to_move.other(),
            Rule::Solo => to_move,
        }
    }

    fn fold(self, to_move: Player, gain: i64, child: i64) -> i64 {
        match (self, to_move) {
            (Rule::Duel, Player::Human) => child - gain,
            _ => gain + child,
        }
    }

    fn prefers(self, to_move: Player, candidate: i64, incumbent: i64) -> bool {
        match (self, to_move) {
            (Rule::Duel, Player::Human) => candidate < incumbent,
            _ => candidate > incumbent,
        }
    }
}

// One position on the explicit search stack. `next` indexes the move whose subtree is
// being evaluated; `best` folds the values of the moves already finished.
struct Frame {
    board: Board,
    to_move: Player,
    moves: Vec<Component>,
    next: usize,
    best: Option<i64>,
}

impl Frame {
    fn absorb(&mut self, rule: Rule, child_value: i64) {
        let gain = self.moves[self.next].gain() as i64;
        let candidate = rule.fold(self.to_move, gain, child_value);
        if self
            .best
            .map_or(true, |best| rule.prefers(self.to_move, candidate, best))
        {
            self.best = Some(candidate);
        }
        self.next += 1;
    }
}

/// Memoized exact evaluator.
///
/// The memo table belongs to this value: create one per top-level move computation and
/// drop it (or call [`ExactSearch::reset`]) afterwards.
pub struct ExactSearch {
    rule: Rule,
    memo: HashMap<(Board, Player), i64>,
    stats: SearchStats,
}

impl ExactSearch {
    /// Evaluator for the two-player game.
    pub fn duel() -> Self {
        Self::with_rule(Rule::Duel)
    }

    /// Evaluator for a single player maximizing their own total.
    pub fn solo() -> Self {
        Self::with_rule(Rule::Solo)
    }

    fn with_rule(rule: Rule) -> Self {
        ExactSearch {
            rule,
            memo: HashMap::new(),
            stats: SearchStats::default(),
        }
    }

    /// Clears the memo table and counters.
    pub fn reset(&mut self) {
        self.memo.clear();
        self.stats = SearchStats::default();
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            memo_entries: self.memo.len(),
            ..self.stats
        }
    }

    /// `V(board, to_move)`: CPU score minus human score from here under optimal play.
    ///
    /// On a solo evaluator this is the best total the mover can still collect.
    pub fn differential(&mut self, board: &Board, to_move: Player) -> i64 {
        self.evaluate(board, to_move)
    }

    /// The value of `board` for `player`, with `player` to move.
    pub fn value_for(&mut self, board: &Board, player: Player) -> i64 {
        match self.rule {
            Rule::Duel => player.sign() * self.evaluate(board, player),
            Rule::Solo => self.evaluate(board, player),
        }
    }

    /// What playing `component` is worth to `mover`: the immediate gain minus the value
    /// of the resulting position for the opponent (solo: plus the best continuation).
    pub fn move_value(&mut self, board: &Board, component: &Component, mover: Player) -> i64 {
        let child = simulate(board, component);
        let gain = component.gain() as i64;
        match self.rule {
            Rule::Duel => gain - self.value_for(&child, mover.other()),
            Rule::Solo => gain + self.evaluate(&child, mover),
        }
    }

    fn open(&mut self, board: Board, to_move: Player) -> Frame {
        self.stats.nodes += 1;
        let moves = all_components(&board);
        Frame {
            board,
            to_move,
            moves,
            next: 0,
            best: None,
        }
    }

    fn evaluate(&mut self, board: &Board, to_move: Player) -> i64 {
        let root_key = (board.clone(), to_move);
        if let Some(&value) = self.memo.get(&root_key) {
            self.stats.memo_hits += 1;
            return value;
        }
        let root = self.open(root_key.0, to_move);
        if root.moves.is_empty() {
            self.memo.insert((root.board, to_move), 0);
            return 0;
        }

        let rule = self.rule;
        let mut stack = vec![root];
        loop {
            let Some(frame) = stack.last_mut() else {
                return 0;
            };

            if frame.next == frame.moves.len() {
                let value = frame.best.unwrap_or(0);
                if let Some(done) = stack.pop() {
                    self.memo.insert((done.board, done.to_move), value);
                }
                match stack.last_mut() {
                    Some(parent) => parent.absorb(rule, value),
                    None => return value,
                }
                continue;
            }

            let key = (
                simulate(&frame.board, &frame.moves[frame.next]),
                rule.child_turn(frame.to_move),
            );
            if let Some(&value) = self.memo.get(&key) {
                self.stats.memo_hits += 1;
                frame.absorb(rule, value);
                continue;
            }

            let child = self.open(key.0, key.1);
            if child.moves.is_empty() {
                self.memo.insert((child.board, child.to_move), 0);
                frame.absorb(rule, 0);
            } else {
                stack.push(child);
            }
        }
    }
}

/// Highest total a single player can collect from `board` playing alone.
///
/// ```
/// use samegame_engine::search::best_solo_score;
/// use samegame_engine::utils::board_from_str_array;
///
/// // Taking BB first merges the reds: 4 + 16 beats 4 + 4 + 4.
/// let board = board_from_str_array(&["RRBBRR"]).unwrap();
/// assert_eq!(best_solo_score(&board), 20);
/// ```
pub fn best_solo_score(board: &Board) -> u64 {
    let mut search = ExactSearch::solo();
    search.differential(board, Player::Human).max(0) as u64
}

/// Depth-limited alpha-beta minimax with a wall-clock deadline.
///
/// Values are the searching player's gains minus the opponent's along the explored line,
/// plus the static evaluation of the horizon position signed for that player.
pub struct BoundedSearch {
    preset: DifficultyPreset,
    weights: EvalWeights,
    started: Instant,
    deadline: Instant,
    expired: bool,
    stats: SearchStats,
}

impl BoundedSearch {
    /// Starts the clock now; the deadline is `preset.time_limit()` away.
    pub fn new(preset: DifficultyPreset, weights: EvalWeights) -> Self {
        let started = Instant::now();
        Self::with_deadline(preset, weights, started + preset.time_limit())
    }

    /// Uses an explicit deadline instead of the preset's time limit.
    pub fn with_deadline(preset: DifficultyPreset, weights: EvalWeights, deadline: Instant) -> Self {
        BoundedSearch {
            preset,
            weights,
            started: Instant::now(),
            deadline,
            expired: false,
            stats: SearchStats::default(),
        }
    }

    /// Whether the deadline has been observed to pass.
    pub fn expired(&self) -> bool {
        self.expired
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            elapsed: self.started.elapsed(),
            deadline_hit: self.expired,
            ..self.stats
        }
    }

    /// What playing `component` is worth to `root`, searched `max_depth` plies deep.
    ///
    /// `alpha` is the best value already secured by a sibling move; a result at or below
    /// it is only an upper bound.
    pub fn move_value(&mut self, board: &Board, component: &Component, root: Player, alpha: f64) -> f64 {
        let child = simulate(board, component);
        let gain = component.gain() as f64;
        let depth = self.preset.max_depth.saturating_sub(1);
        gain + self.minimax(&child, depth, alpha - gain, f64::INFINITY, root.other(), root)
    }

    /// Minimax value of `board` for `root` with `to_move` to play.
    pub fn minimax(
        &mut self,
        board: &Board,
        depth: u32,
        mut alpha: f64,
        mut beta: f64,
        to_move: Player,
        root: Player,
    ) -> f64 {
        self.stats.nodes += 1;
        let mut moves = all_components(board);
        if moves.is_empty() {
            return 0.0;
        }
        if depth == 0 || self.check_deadline() {
            return self.horizon(board, to_move, root);
        }

        // Largest groups first: they tend to be the strongest replies and tighten the window early.
        moves.sort_by(|a, b| b.len().cmp(&a.len()));
        let maximizing = to_move == root;
        let mut best = if maximizing {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };

        for component in &moves {
            let child = simulate(board, component);
            let gain = component.gain() as f64;
            if maximizing {
                let value =
                    gain + self.minimax(&child, depth - 1, alpha - gain, beta - gain, to_move.other(), root);
                best = best.max(value);
                alpha = alpha.max(best);
            } else {
                let value =
                    self.minimax(&child, depth - 1, alpha + gain, beta + gain, to_move.other(), root) - gain;
                best = best.min(value);
                beta = beta.min(best);
            }
            if alpha >= beta || self.expired {
                break;
            }
        }
        best
    }

    fn horizon(&self, board: &Board, to_move: Player, root: Player) -> f64 {
        let value = evaluate(board, &self.weights);
        if to_move == root {
            value
        } else {
            -value
        }
    }

    fn check_deadline(&mut self) -> bool {
        if !self.expired && Instant::now() >= self.deadline {
            self.expired = true;
        }
        self.expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{component_at, Board};
    use crate::utils::board_from_str_array;
    use std::time::Duration;

    // Plain recursive minimax in the CPU-minus-Human frame, no memo.
    fn reference(board: &Board, to_move: Player) -> i64 {
        let moves = all_components(board);
        if moves.is_empty() {
            return 0;
        }
        let values = moves.iter().map(|m| {
            let child = reference(&simulate(board, m), to_move.other());
            match to_move {
                Player::Cpu => m.gain() as i64 + child,
                Player::Human => child - m.gain() as i64,
            }
        });
        match to_move {
            Player::Cpu => values.max().unwrap_or(0),
            Player::Human => values.min().unwrap_or(0),
        }
    }

    fn deep_preset() -> DifficultyPreset {
        DifficultyPreset {
            max_depth: 32,
            time_limit_ms: 60_000,
            candidate_limit: 8,
        }
    }

    #[test]
    fn test_terminal_board_is_worth_zero() {
        let board = board_from_str_array(&["RG", "GR"]).unwrap();
        let mut search = ExactSearch::duel();
        assert_eq!(search.differential(&board, Player::Cpu), 0);
        assert_eq!(search.differential(&board, Player::Human), 0);
    }

    #[test]
    fn test_single_move_board() {
        let board = board_from_str_array(&["RR"]).unwrap();
        let mut search = ExactSearch::duel();
        assert_eq!(search.differential(&board, Player::Cpu), 4);
        assert_eq!(search.differential(&board, Player::Human), -4);
    }

    #[test]
    fn test_forced_alternation_cancels_out() {
        let board = board_from_str_array(&["RR.", "GG."]).unwrap();
        let mut search = ExactSearch::duel();
        assert_eq!(search.differential(&board, Player::Cpu), 0);
    }

    #[test]
    fn test_big_group_then_small() {
        // GGG first leaves RR for the opponent: 9 - 4.
        let board = board_from_str_array(&["RRGGG"]).unwrap();
        let mut search = ExactSearch::duel();
        assert_eq!(search.differential(&board, Player::Cpu), 5);
    }

    #[test]
    fn test_greedy_move_is_not_optimal() {
        // BBB scores 9 now but hands the opponent a merged RRRR worth 16.
        let board = board_from_str_array(&["RRBBBRR"]).unwrap();
        let mut search = ExactSearch::duel();
        let bbb = component_at(&board, 0, 2);
        let left_rr = component_at(&board, 0, 0);
        assert_eq!(search.move_value(&board, &bbb, Player::Cpu), -7);
        assert_eq!(search.move_value(&board, &left_rr, Player::Cpu), -1);
        assert_eq!(search.differential(&board, Player::Cpu), -1);
    }

    #[test]
    fn test_zero_sum_symmetry() {
        for seed in 0..6 {
            let board = Board::random(3, 4, 3, seed).unwrap();
            let mut search = ExactSearch::duel();
            let cpu = search.differential(&board, Player::Cpu);
            let human = search.differential(&board, Player::Human);
            assert_eq!(human, -cpu, "seed {seed}");
            assert_eq!(search.value_for(&board, Player::Human), cpu);
        }
    }

    #[test]
    fn test_matches_recursive_reference() {
        for seed in 0..8 {
            let board = Board::random(3, 3, 3, seed).unwrap();
            let mut search = ExactSearch::duel();
            for player in [Player::Cpu, Player::Human] {
                assert_eq!(
                    search.differential(&board, player),
                    reference(&board, player),
                    "seed {seed}, {player} to move"
                );
            }
        }
    }

    #[test]
    fn test_memo_hits_return_same_value() {
        let board = Board::random(3, 4, 3, 11).unwrap();
        let mut search = ExactSearch::duel();
        let first = search.differential(&board, Player::Cpu);
        let entries = search.stats().memo_entries;
        let second = search.differential(&board, Player::Cpu);
        assert_eq!(first, second);
        assert_eq!(search.stats().memo_entries, entries);
        assert!(search.stats().memo_hits >= 1);

        search.reset();
        assert_eq!(search.stats().memo_entries, 0);
        assert_eq!(search.differential(&board, Player::Cpu), first);
    }

    #[test]
    fn test_long_forced_line() {
        // One column: a BB pair wrapped in mirrored R/G shells. Each removal merges the two
        // cells around the gap, so exactly one move exists at every ply: forty plies deep.
        let shells: Vec<&str> = (1..40).map(|i| if i % 2 == 1 { "R" } else { "G" }).collect();
        let mut rows: Vec<&str> = shells.iter().rev().copied().collect();
        rows.extend(["B", "B"]);
        rows.extend(shells.iter().copied());
        let board = board_from_str_array(&rows).unwrap();
        assert_eq!(all_components(&board).len(), 1);

        let mut search = ExactSearch::duel();
        // Twenty pairs each at 4 points apiece.
        assert_eq!(search.differential(&board, Player::Cpu), 0);
        assert_eq!(search.stats().nodes, 41);
    }

    #[test]
    fn test_solo_score() {
        assert_eq!(best_solo_score(&board_from_str_array(&["RRGGG"]).unwrap()), 13);
        assert_eq!(best_solo_score(&board_from_str_array(&["RRBBBRR"]).unwrap()), 25);
        assert_eq!(best_solo_score(&board_from_str_array(&["RG"]).unwrap()), 0);
    }

    #[test]
    fn test_bounded_matches_exact_when_unconstrained() {
        for seed in 0..5 {
            let board = Board::random(3, 3, 3, seed).unwrap();
            let mut exact = ExactSearch::duel();
            let mut bounded = BoundedSearch::new(deep_preset(), EvalWeights::default());
            for component in all_components(&board) {
                for player in [Player::Cpu, Player::Human] {
                    let expected = exact.move_value(&board, &component, player) as f64;
                    let got = bounded.move_value(&board, &component, player, f64::NEG_INFINITY);
                    assert_eq!(got, expected, "seed {seed}, {player}");
                }
            }
            assert!(!bounded.expired());
        }
    }

    #[test]
    fn test_bounded_depth_limit_uses_horizon() {
        let board = board_from_str_array(&["RRGB", "GGBB", "RYYR"]).unwrap();
        let preset = DifficultyPreset {
            max_depth: 1,
            ..deep_preset()
        };
        let weights = EvalWeights::default();
        let mut search = BoundedSearch::new(preset, weights);
        let component = component_at(&board, 0, 0);
        let child = simulate(&board, &component);
        let expected = component.gain() as f64 - evaluate(&child, &weights);
        assert_eq!(
            search.move_value(&board, &component, Player::Cpu, f64::NEG_INFINITY),
            expected
        );
    }

    #[test]
    fn test_bounded_expired_deadline_returns_immediately() {
        let board = Board::random(8, 8, 4, 3).unwrap();
        let past = Instant::now() - Duration::from_millis(1);
        let mut search = BoundedSearch::with_deadline(deep_preset(), EvalWeights::default(), past);
        let component = all_components(&board).remove(0);
        let value = search.move_value(&board, &component, Player::Cpu, f64::NEG_INFINITY);
        assert!(value.is_finite());
        assert!(search.expired());
        assert!(search.stats().deadline_hit);
        assert!(search.stats().nodes <= 1);
    }
}
