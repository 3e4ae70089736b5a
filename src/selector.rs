//! Move selection for both sides of a duel.
//!
//! Small boards (at most `exact_cell_limit` occupied cells) are solved exactly: the board is
//! divided at empty columns, each region's best move is found with a shared
//! [`ExactSearch`], and the region winners are combined. Larger boards go to a
//! [`BoundedSearch`] over a short list of root candidates.
//!
//! The CPU and the hint use the same path; only the player the search optimizes for differs.
use std::cmp::Ordering;
use std::time::Instant;

use crate::config::{Difficulty, DifficultyPreset, EngineConfig};
use crate::engine::{all_components, is_terminal, Board, Cell, Component, Player};
use crate::heuristics::largest_component;
use crate::regions::{partition, Region};
use crate::search::{BoundedSearch, ExactSearch};
use crate::trace::{LogObserver, SearchEvent, SearchObserver, SearchStats};

/// How a move's value was obtained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveScore {
    /// Optimal own-minus-opponent score from the exact solver.
    Exact(i64),
    /// Depth-limited estimate, including the horizon evaluation.
    Estimated(f64),
}

impl MoveScore {
    pub fn as_f64(self) -> f64 {
        match self {
            MoveScore::Exact(v) => v as f64,
            MoveScore::Estimated(v) => v,
        }
    }

    pub fn is_exact(self) -> bool {
        matches!(self, MoveScore::Exact(_))
    }
}

/// A chosen move.
#[derive(Clone, Debug, PartialEq)]
pub struct Move {
    pub component: Component,
    /// First cell of the component in row-major order; clicking it plays the move.
    pub anchor: Cell,
    /// Points scored by the move itself.
    pub gain: u64,
    pub score: MoveScore,
}

impl Move {
    fn new(component: Component, score: MoveScore) -> Option<Move> {
        let anchor = component.anchor()?;
        Some(Move {
            anchor,
            gain: component.gain(),
            component,
            score,
        })
    }
}

/// Suggested move for the human.
#[derive(Clone, Debug, PartialEq)]
pub struct Hint {
    pub cell: Cell,
    /// Points the suggested move scores immediately.
    pub immediate_score: u64,
    /// Projected human-minus-CPU score from here when following the hint.
    pub score: MoveScore,
}

impl From<Move> for Hint {
    fn from(mv: Move) -> Self {
        Hint {
            cell: mv.anchor,
            immediate_score: mv.gain,
            score: mv.score,
        }
    }
}

/// Picks the best of several candidate results.
///
/// Candidates without a removable component are skipped. The highest value wins; on equal
/// values the earliest candidate is kept. Returns `None` when no candidate has a move.
pub fn combine<V: PartialOrd + Copy>(
    candidates: impl IntoIterator<Item = (Option<Component>, V)>,
) -> Option<(Component, V)> {
    let mut best: Option<(Component, V)> = None;
    for (component, value) in candidates {
        let Some(component) = component.filter(Component::is_removable) else {
            continue;
        };
        if best.as_ref().map_or(true, |(_, incumbent)| value > *incumbent) {
            best = Some((component, value));
        }
    }
    best
}

/// Chooses moves under an [`EngineConfig`], reporting progress to a [`SearchObserver`].
pub struct MoveSelector {
    config: EngineConfig,
    observer: Box<dyn SearchObserver>,
}

impl Default for MoveSelector {
    fn default() -> Self {
        MoveSelector::new(EngineConfig::default())
    }
}

impl MoveSelector {
    /// Selector reporting to the `log` facade.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_observer(config, Box::new(LogObserver))
    }

    pub fn with_observer(config: EngineConfig, observer: Box<dyn SearchObserver>) -> Self {
        MoveSelector { config, observer }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The CPU's move on `board` at `difficulty`, or `None` when no move exists.
    pub fn cpu_select_move(&mut self, board: &Board, difficulty: Difficulty) -> Option<Move> {
        let preset = self.config.preset(difficulty);
        self.select_for(board, Player::Cpu, preset)
    }

    /// The move the human should play on `board`, or `None` when no move exists.
    pub fn hint_for_human(&mut self, board: &Board) -> Option<Hint> {
        let preset = self.config.preset(self.config.hint_difficulty);
        self.select_for(board, Player::Human, preset).map(Hint::from)
    }

    /// Best move for `player`, exact when the board is small enough, bounded by `preset`
    /// otherwise.
    pub fn select_for(&mut self, board: &Board, player: Player, preset: DifficultyPreset) -> Option<Move> {
        if is_terminal(board) {
            return None;
        }
        if board.live_cells() <= self.config.exact_cell_limit {
            self.select_exact(board, player)
        } else {
            self.select_bounded(board, player, preset)
        }
    }

    /// Every legal move for `player`, best first.
    ///
    /// Small boards are scored exactly; larger ones with a full-window bounded search at
    /// `difficulty`. Moves of equal value keep their row-major scan order, so the first entry
    /// is the move [`MoveSelector::select_for`] would choose on an exactly solved board.
    pub fn rank_moves(&mut self, board: &Board, player: Player, difficulty: Difficulty) -> Vec<Move> {
        let started = Instant::now();
        let components = all_components(board);
        let (mut ranked, mut stats) = if board.live_cells() <= self.config.exact_cell_limit {
            let mut search = ExactSearch::duel();
            let ranked: Vec<Move> = components
                .into_iter()
                .filter_map(|component| {
                    let value = search.move_value(board, &component, player);
                    Move::new(component, MoveScore::Exact(value))
                })
                .collect();
            (ranked, search.stats())
        } else {
            let preset = self.config.preset(difficulty);
            let mut search = BoundedSearch::new(preset, self.config.weights);
            self.emit(SearchEvent::Bounded {
                player,
                candidates: components.len(),
                max_depth: preset.max_depth,
            });
            let ranked: Vec<Move> = components
                .into_iter()
                .filter_map(|component| {
                    let value = search.move_value(board, &component, player, f64::NEG_INFINITY);
                    Move::new(component, MoveScore::Estimated(value))
                })
                .collect();
            (ranked, search.stats())
        };

        ranked.sort_by(|a, b| {
            b.score
                .as_f64()
                .partial_cmp(&a.score.as_f64())
                .unwrap_or(Ordering::Equal)
        });
        stats.elapsed = started.elapsed();
        self.emit(SearchEvent::Finished { stats });
        ranked
    }

    fn emit(&mut self, event: SearchEvent) {
        self.observer.on_event(&event);
    }

    fn divide(&mut self, board: &Board, player: Player) -> Vec<Region> {
        let regions = partition(board);
        self.emit(SearchEvent::Divide {
            player,
            regions: regions.iter().map(Region::columns).collect(),
        });
        regions
    }

    fn select_exact(&mut self, board: &Board, player: Player) -> Option<Move> {
        let started = Instant::now();
        let mut search = ExactSearch::duel();
        let regions = self.divide(board, player);

        let mut winners = Vec::with_capacity(regions.len());
        for (index, region) in regions.iter().enumerate() {
            let components = region.components(board);
            let candidates = components.len();
            let best = combine(components.into_iter().map(|component| {
                let value = search.move_value(board, &component, player);
                (Some(component), value)
            }));
            self.emit(SearchEvent::Conquer {
                region: index,
                columns: region.columns(),
                candidates,
                best: best
                    .as_ref()
                    .and_then(|(component, value)| Some((component.anchor()?, *value as f64))),
            });
            winners.extend(best);
        }

        // Regions can interleave in scan order; sorting by anchor makes ties resolve the same
        // way a scan of the whole board would.
        winners.sort_by_key(|(component, _)| component.anchor());
        let chosen = combine(winners.into_iter().map(|(component, value)| (Some(component), value)));

        let mut stats = search.stats();
        stats.elapsed = started.elapsed();
        self.finish(chosen.as_ref().map(|(c, v)| (c, *v as f64)), stats);
        chosen.and_then(|(component, value)| Move::new(component, MoveScore::Exact(value)))
    }

    fn select_bounded(&mut self, board: &Board, player: Player, preset: DifficultyPreset) -> Option<Move> {
        let mut search = BoundedSearch::new(preset, self.config.weights);
        let regions = self.divide(board, player);

        let mut roots = all_components(board);
        roots.sort_by(|a, b| b.len().cmp(&a.len()));
        roots.truncate(preset.candidate_limit);
        for region in &regions {
            if let Some(largest) = largest_component(region.components(board)) {
                if !roots.contains(&largest) {
                    roots.push(largest);
                }
            }
        }
        self.emit(SearchEvent::Bounded {
            player,
            candidates: roots.len(),
            max_depth: preset.max_depth,
        });

        let mut scored = Vec::with_capacity(roots.len());
        let mut alpha = f64::NEG_INFINITY;
        for component in roots {
            let value = search.move_value(board, &component, player, alpha);
            alpha = alpha.max(value);
            scored.push((Some(component), value));
            if search.expired() {
                self.emit(SearchEvent::DeadlineExpired {
                    nodes: search.stats().nodes,
                });
                break;
            }
        }

        let chosen = combine(scored);
        self.finish(chosen.as_ref().map(|(c, v)| (c, *v)), search.stats());
        chosen.and_then(|(component, value)| Move::new(component, MoveScore::Estimated(value)))
    }

    fn finish(&mut self, chosen: Option<(&Component, f64)>, stats: SearchStats) {
        let chosen = chosen.and_then(|(component, value)| Some((component.anchor()?, value)));
        self.emit(SearchEvent::Combine { chosen });
        self.emit(SearchEvent::Finished { stats });
    }
}

/// The CPU's move on `board` with the default configuration.
///
/// ```
/// use samegame_engine::config::Difficulty;
/// use samegame_engine::selector::cpu_select_move;
/// use samegame_engine::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["RRGGG"]).unwrap();
/// let mv = cpu_select_move(&board, Difficulty::Easy).unwrap();
/// assert_eq!(mv.anchor, (0, 2));
/// ```
pub fn cpu_select_move(board: &Board, difficulty: Difficulty) -> Option<Move> {
    MoveSelector::default().cpu_select_move(board, difficulty)
}

/// A hint for the human on `board` with the default configuration.
pub fn hint_for_human(board: &Board) -> Option<Hint> {
    MoveSelector::default().hint_for_human(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::component_at;
    use crate::trace::Recorder;
    use crate::utils::board_from_str_array;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn selector_with_recorder(config: EngineConfig) -> (MoveSelector, Rc<RefCell<Recorder>>) {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let sink = Rc::clone(&recorder);
        let observer = move |event: &SearchEvent| sink.borrow_mut().on_event(event);
        (MoveSelector::with_observer(config, Box::new(observer)), recorder)
    }

    #[test]
    fn test_combine_skips_missing_and_keeps_first_tie() {
        let board = board_from_str_array(&["RRGG"]).unwrap();
        let rr = component_at(&board, 0, 0);
        let gg = component_at(&board, 0, 2);
        let (chosen, value) = combine([(None, 9), (Some(rr.clone()), 4), (Some(gg), 4)]).unwrap();
        assert_eq!(chosen, rr);
        assert_eq!(value, 4);

        assert!(combine([(None, 1i64), (Some(Component::default()), 2)]).is_none());
    }

    #[test]
    fn test_no_move_on_empty_or_terminal_board() {
        let empty = Board::new_empty(3, 3).unwrap();
        assert!(cpu_select_move(&empty, Difficulty::Hard).is_none());
        assert!(hint_for_human(&empty).is_none());

        let stuck = board_from_str_array(&["RG", "GR"]).unwrap();
        assert!(cpu_select_move(&stuck, Difficulty::Easy).is_none());
        assert!(hint_for_human(&stuck).is_none());
    }

    #[test]
    fn test_single_pair() {
        let board = board_from_str_array(&["RR"]).unwrap();
        let mv = cpu_select_move(&board, Difficulty::Medium).unwrap();
        assert_eq!(mv.anchor, (0, 0));
        assert_eq!(mv.gain, 4);
        assert_eq!(mv.score, MoveScore::Exact(4));

        let hint = hint_for_human(&board).unwrap();
        assert_eq!(hint.cell, (0, 0));
        assert_eq!(hint.immediate_score, 4);
        assert_eq!(hint.score, MoveScore::Exact(4));
    }

    #[test]
    fn test_cpu_avoids_greedy_trap() {
        let board = board_from_str_array(&["RRBBBRR"]).unwrap();
        let mv = cpu_select_move(&board, Difficulty::Easy).unwrap();
        assert_eq!(mv.anchor, (0, 0));
        assert_eq!(mv.score, MoveScore::Exact(-1));

        let hint = hint_for_human(&board).unwrap();
        assert_eq!(hint.cell, (0, 0));
        assert_eq!(hint.score, MoveScore::Exact(-1));
    }

    #[test]
    fn test_three_by_three_same_move_for_both_sides() {
        let board = board_from_str_array(&["RRG", "RGG", "BBB"]).unwrap();
        let cpu = cpu_select_move(&board, Difficulty::Hard).unwrap();
        let hint = hint_for_human(&board).unwrap();
        // The value of a position for the mover does not depend on who the mover is.
        assert_eq!(cpu.anchor, hint.cell);
        assert_eq!(cpu.score, hint.score);
        assert!(cpu.score.is_exact());
    }

    #[test]
    fn test_ties_across_regions_follow_scan_order() {
        // Left region holds a pair in its bottom row, right region a pair in its top row.
        let board = board_from_str_array(&["RG.YY", "BB.GR"]).unwrap();
        let regions = partition(&board);
        assert_eq!(regions.len(), 2);
        let mv = cpu_select_move(&board, Difficulty::Easy).unwrap();
        let mut search = ExactSearch::duel();
        let best = all_components(&board)
            .iter()
            .map(|c| search.move_value(&board, c, Player::Cpu))
            .max()
            .unwrap();
        assert_eq!(mv.score, MoveScore::Exact(best));
        let first_best = all_components(&board)
            .into_iter()
            .find(|c| search.move_value(&board, c, Player::Cpu) == best)
            .unwrap();
        assert_eq!(Some(mv.anchor), first_best.anchor());
        assert_eq!(mv.anchor, (0, 3));
    }

    #[test]
    fn test_rank_moves_leads_with_selected_move() {
        let mut selector = MoveSelector::default();
        let boards: [&[&str]; 3] = [&["RRBBBRR"], &["RRG", "RGG", "BBB"], &["RG.YY", "BB.GR"]];
        for rows in boards {
            let board = board_from_str_array(rows).unwrap();
            let ranked = selector.rank_moves(&board, Player::Cpu, Difficulty::Easy);
            let chosen = selector.cpu_select_move(&board, Difficulty::Easy).unwrap();
            assert_eq!(ranked.len(), all_components(&board).len());
            assert_eq!(ranked[0], chosen);
        }
    }

    #[test]
    fn test_rank_moves_orders_by_value() {
        // Values for the CPU: left RR -1, BBB -7, right RR -1.
        let board = board_from_str_array(&["RRBBBRR"]).unwrap();
        let ranked = MoveSelector::default().rank_moves(&board, Player::Cpu, Difficulty::Easy);
        let summary: Vec<(Cell, MoveScore)> = ranked.iter().map(|m| (m.anchor, m.score)).collect();
        assert_eq!(
            summary,
            vec![
                ((0, 0), MoveScore::Exact(-1)),
                ((0, 5), MoveScore::Exact(-1)),
                ((0, 2), MoveScore::Exact(-7)),
            ]
        );
    }

    #[test]
    fn test_rank_moves_bounded_and_terminal() {
        let config = EngineConfig {
            exact_cell_limit: 1,
            ..EngineConfig::default()
        };
        let mut selector = MoveSelector::new(config);
        let board = board_from_str_array(&["RRGGG"]).unwrap();
        let ranked = selector.rank_moves(&board, Player::Human, Difficulty::Hard);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].anchor, (0, 2));
        assert_eq!(ranked[0].score, MoveScore::Estimated(5.0));
        assert_eq!(ranked[1].score, MoveScore::Estimated(-5.0));

        let stuck = board_from_str_array(&["RG", "GR"]).unwrap();
        assert!(selector.rank_moves(&stuck, Player::Cpu, Difficulty::Hard).is_empty());
    }

    #[test]
    fn test_exact_path_events() {
        let (mut selector, recorder) = selector_with_recorder(EngineConfig::default());
        let board = board_from_str_array(&["RR.GG", "BB.YY"]).unwrap();
        selector.cpu_select_move(&board, Difficulty::Easy).unwrap();
        assert_eq!(
            recorder.borrow().phases(),
            vec!["divide", "conquer", "conquer", "combine", "finished"]
        );
    }

    #[test]
    fn test_bounded_path_on_large_board() {
        let config = EngineConfig {
            exact_cell_limit: 4,
            ..EngineConfig::default()
        };
        let (mut selector, recorder) = selector_with_recorder(config);
        let board = Board::random(6, 6, 3, 7).unwrap();
        let mv = selector.cpu_select_move(&board, Difficulty::Easy).unwrap();
        assert!(!mv.score.is_exact());
        assert!(all_components(&board).contains(&mv.component));

        let phases = recorder.borrow().phases();
        assert_eq!(phases.first(), Some(&"divide"));
        assert!(phases.contains(&"bounded"));
        assert_eq!(phases.last(), Some(&"finished"));
    }

    #[test]
    fn test_bounded_agrees_with_exact_when_deep_enough() {
        let board = board_from_str_array(&["RRG", "GBB", "RRG"]).unwrap();
        let exact = MoveSelector::default()
            .cpu_select_move(&board, Difficulty::Hard)
            .unwrap();

        let mut config = EngineConfig {
            exact_cell_limit: 1,
            ..EngineConfig::default()
        };
        config.presets.hard.candidate_limit = 16;
        let bounded = MoveSelector::new(config)
            .cpu_select_move(&board, Difficulty::Hard)
            .unwrap();
        assert_eq!(bounded.score.as_f64(), exact.score.as_f64());
    }
}
