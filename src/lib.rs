//! # SameGame Duel Engine
//!
//! This library provides the game logic for a two-player variant of SameGame, where a human
//! and the CPU alternate removing groups of same-colored cells and each removal of `n` cells
//! scores `n²` for the mover, together with the search that drives the CPU and the hints.
//!
//! It is used by three binaries:
//! - `duel`: interactive play against the CPU (or alone) on the command line.
//! - `ai_solver`: loads a board file and prints the CPU's move, the human hint and optionally
//!   the best single-player total.
//! - `arena`: plays every difficulty against a greedy opponent on seeded boards.
//!
//! ## Modules
//! - `engine`: board representation (`Board`), connected components, gravity and column
//!   compaction, move application and the `Game` session with scores, turns and undo.
//! - `regions`: splits a board at empty columns and bisects it at the midpoint.
//! - `search`: the memoized exact solver and the deadline-bounded alpha-beta search.
//! - `selector`: picks the CPU's move and the human's hint on top of `search`.
//! - `heuristics`: static evaluation of positions and the greedy strategy.
//! - `config`: difficulty presets and engine settings, loadable from TOML.
//! - `trace`: search progress events and observers.
//! - `error`: error types.
//! - `utils`: parsing boards from text.

pub mod config;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod regions;
pub mod search;
pub mod selector;
pub mod trace;
pub mod utils;

// Items from sub-modules should be accessed via their full path, e.g.
// `samegame_engine::selector::cpu_select_move()`.
