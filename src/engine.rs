//! Core board model for the SameGame duel.
//!
//! This module defines the game's fundamental pieces:
//! - `Color`: the finite palette a cell can hold.
//! - `Board`: the `rows x cols` grid value type with bounds-checked access and the
//!   gravity/compaction transform.
//! - `Component`: a maximal connected group of same-colored cells, found by flood fill.
//! - `Game`: a play session tracking per-player scores, turn order and undo history.
//!
//! Boards are never mutated by the search: every simulated move produces a fresh board
//! through [`apply_move`] or the crate-internal `simulate`.
use crate::error::{BoardError, MoveError};
use log::debug;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::fmt;

/// A `(row, col)` coordinate. Row 0 is the top of the board.
pub type Cell = (usize, usize);

/// Represents the color of an occupied cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Red,
    Green,
    Blue,
    Yellow,
    Purple,
}

/// Every color in palette order. Random boards draw from a prefix of this list.
pub const PALETTE: [Color; 5] = [
    Color::Red,
    Color::Green,
    Color::Blue,
    Color::Yellow,
    Color::Purple,
];

/// Number of colors used by random boards unless told otherwise.
pub const DEFAULT_PALETTE_SIZE: usize = 4;

impl Color {
    /// Converts the color to its board-file glyph.
    ///
    /// ```
    /// use samegame_engine::engine::Color;
    /// assert_eq!(Color::Red.to_char(), 'R');
    /// assert_eq!(Color::Purple.to_char(), 'P');
    /// ```
    pub fn to_char(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Green => 'G',
            Color::Blue => 'B',
            Color::Yellow => 'Y',
            Color::Purple => 'P',
        }
    }

    /// Parses a board-file glyph. Returns `None` for anything that is not a color.
    pub fn from_char(glyph: char) -> Option<Color> {
        match glyph {
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            'B' => Some(Color::Blue),
            'Y' => Some(Color::Yellow),
            'P' => Some(Color::Purple),
            _ => None,
        }
    }

    /// Position of the color in [`PALETTE`].
    pub fn index(self) -> usize {
        self as usize
    }

    fn to_ansi_color_code(self) -> &'static str {
        match self {
            Color::Red => "41",
            Color::Green => "42",
            Color::Yellow => "43",
            Color::Blue => "44",
            Color::Purple => "45",
        }
    }
}

/// Glyph for a cell value, `.` when empty.
pub fn cell_char(cell: Option<Color>) -> char {
    cell.map_or('.', Color::to_char)
}

/// The two sides of a duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Player {
    Cpu,
    Human,
}

impl Player {
    /// The opponent of this player.
    pub fn other(self) -> Player {
        match self {
            Player::Cpu => Player::Human,
            Player::Human => Player::Cpu,
        }
    }

    /// Sign that converts a CPU-minus-Human differential into this player's point of view.
    pub fn sign(self) -> i64 {
        match self {
            Player::Cpu => 1,
            Player::Human => -1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Cpu => write!(f, "CPU"),
            Player::Human => write!(f, "Human"),
        }
    }
}

/// Score for removing a component of `size` cells: `size²`.
pub fn gain(size: usize) -> u64 {
    let n = size as u64;
    n * n
}

/// The 4-neighbors (up, down, left, right) of `(r, c)` that lie inside a `rows x cols` grid.
pub fn neighbors(r: usize, c: usize, rows: usize, cols: usize) -> impl Iterator<Item = Cell> {
    let up = (r > 0).then(|| (r - 1, c));
    let down = (r + 1 < rows).then(|| (r + 1, c));
    let left = (c > 0).then(|| (r, c - 1));
    let right = (c + 1 < cols).then(|| (r, c + 1));
    [up, down, left, right].into_iter().flatten()
}

/// Represents the game board as a row-major grid of optional colors.
///
/// Two boards compare equal (and hash identically) only when their dimensions and every
/// cell match, which makes the board usable directly as a memoization key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<Option<Color>>,
}

impl Board {
    /// Creates a board of the given size with every cell empty.
    ///
    /// # Errors
    /// Returns `BoardError::InvalidDimensions` if either dimension is zero.
    ///
    /// # Examples
    /// ```
    /// use samegame_engine::engine::Board;
    /// let board = Board::new_empty(3, 4).unwrap();
    /// assert_eq!(board.cell(0, 0), None);
    /// assert!(Board::new_empty(0, 4).is_err());
    /// ```
    pub fn new_empty(rows: usize, cols: usize) -> Result<Self, BoardError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::InvalidDimensions { rows, cols });
        }
        Ok(Board {
            rows,
            cols,
            cells: vec![None; rows * cols],
        })
    }

    /// Creates a board from explicit rows. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<Option<Color>>>) -> Result<Self, BoardError> {
        let width = rows.first().map_or(0, Vec::len);
        let mut board = Board::new_empty(rows.len(), width)?;
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(BoardError::RaggedRow {
                    row: r,
                    expected: width,
                    found: row.len(),
                });
            }
            for (c, cell) in row.into_iter().enumerate() {
                board.cells[r * width + c] = cell;
            }
        }
        Ok(board)
    }

    /// Creates a fully occupied board whose colors are drawn from the first `palette_size`
    /// entries of [`PALETTE`], using a seeded `SmallRng` so the same seed always produces
    /// the same board.
    pub fn random(
        rows: usize,
        cols: usize,
        palette_size: usize,
        seed: u64,
    ) -> Result<Self, BoardError> {
        if palette_size == 0 || palette_size > PALETTE.len() {
            return Err(BoardError::InvalidPalette {
                found: palette_size,
                max: PALETTE.len(),
            });
        }
        let mut board = Board::new_empty(rows, cols)?;
        let mut rng = SmallRng::seed_from_u64(seed);
        for cell in board.cells.iter_mut() {
            *cell = Some(PALETTE[rng.gen_range(0..palette_size)]);
        }
        Ok(board)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether `(r, c)` lies on the board.
    pub fn in_bounds(&self, r: usize, c: usize) -> bool {
        r < self.rows && c < self.cols
    }

    fn index(&self, r: usize, c: usize) -> usize {
        r * self.cols + c
    }

    /// Returns the cell at `(r, c)`. Out-of-bounds coordinates read as empty.
    pub fn cell(&self, r: usize, c: usize) -> Option<Color> {
        if self.in_bounds(r, c) {
            self.cells[self.index(r, c)]
        } else {
            None
        }
    }

    /// Writes a cell.
    ///
    /// # Errors
    /// Returns `BoardError::OutOfBounds` and leaves the board untouched when `(r, c)` is
    /// outside the grid.
    pub fn set_cell(&mut self, r: usize, c: usize, value: Option<Color>) -> Result<(), BoardError> {
        if !self.in_bounds(r, c) {
            return Err(BoardError::OutOfBounds {
                row: r,
                col: c,
                rows: self.rows,
                cols: self.cols,
            });
        }
        let idx = self.index(r, c);
        self.cells[idx] = value;
        Ok(())
    }

    /// Number of occupied cells.
    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// True when no cell is occupied.
    pub fn is_cleared(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// True when every cell of column `c` is empty. Columns outside the board count as empty.
    pub fn is_column_empty(&self, c: usize) -> bool {
        c >= self.cols || (0..self.rows).all(|r| self.cells[self.index(r, c)].is_none())
    }

    /// Occupied-cell count per color, indexed by [`Color::index`].
    pub fn color_counts(&self) -> [usize; PALETTE.len()] {
        let mut counts = [0; PALETTE.len()];
        for color in self.cells.iter().flatten() {
            counts[color.index()] += 1;
        }
        counts
    }

    /// Applies vertical gravity in place.
    ///
    /// Within each column the occupied cells fall to the bottom, keeping their relative
    /// top-to-bottom order; vacated cells at the top become empty.
    pub fn collapse_columns(&mut self) {
        for c in 0..self.cols {
            let mut write_row = self.rows;
            for r in (0..self.rows).rev() {
                let idx = self.index(r, c);
                if let Some(color) = self.cells[idx] {
                    write_row -= 1;
                    if write_row != r {
                        let target = self.index(write_row, c);
                        self.cells[target] = Some(color);
                        self.cells[idx] = None;
                    }
                }
            }
        }
    }

    /// Removes fully empty columns in place.
    ///
    /// Non-empty columns shift left in their original order and the freed columns end up
    /// empty on the right, so the board keeps its width.
    pub fn compact_columns(&mut self) {
        let mut write_col = 0;
        for read_col in 0..self.cols {
            if self.is_column_empty(read_col) {
                continue;
            }
            if read_col != write_col {
                for r in 0..self.rows {
                    let from = self.index(r, read_col);
                    let to = self.index(r, write_col);
                    self.cells[to] = self.cells[from];
                    self.cells[from] = None;
                }
            }
            write_col += 1;
        }
    }

    /// Generates a terminal rendering of the board with an optional highlighted cell.
    ///
    /// The output carries row and column numbers and uses ANSI background colors. The
    /// highlighted cell (if any) is drawn with `..` instead of blank space.
    pub fn to_string_with_highlight(&self, pos: Option<Cell>) -> String {
        let mut output = String::new();

        output.push_str("  ");
        for c_idx in 0..self.cols {
            output.push_str(&format!("{:<2}", c_idx));
        }
        output.push('\n');

        for r_idx in 0..self.rows {
            output.push_str(&format!("{:<2}", r_idx));
            for c_idx in 0..self.cols {
                let is_highlight = pos == Some((r_idx, c_idx));
                let color_code = self
                    .cell(r_idx, c_idx)
                    .map_or("40", Color::to_ansi_color_code);
                let content = if is_highlight { ".." } else { "  " };
                output.push_str(&format!("\x1b[1;{};m{}\x1b[m", color_code, content));
            }
            if r_idx + 1 < self.rows {
                output.push('\n');
            }
        }

        output
    }

    /// Renders the board with one glyph per cell and one line per row, the same format
    /// accepted by [`crate::utils::board_from_str_array`].
    pub fn to_plain_string(&self) -> String {
        (0..self.rows)
            .map(|r| (0..self.cols).map(|c| cell_char(self.cell(r, c))).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}

/// A maximal group of 4-connected, same-colored cells.
///
/// Cells are kept sorted row-major, so the first cell (the *anchor*) is the one a row-major
/// scan meets first. An empty component is what queries on empty or out-of-range cells return.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Component {
    cells: Vec<Cell>,
}

impl Component {
    /// Builds a component from arbitrary cells, sorting and de-duplicating them.
    pub fn from_cells(mut cells: Vec<Cell>) -> Self {
        cells.sort_unstable();
        cells.dedup();
        Component { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// A component can be eliminated when it has at least two cells.
    pub fn is_removable(&self) -> bool {
        self.cells.len() >= 2
    }

    /// Immediate score for eliminating this component.
    pub fn gain(&self) -> u64 {
        gain(self.cells.len())
    }

    /// First cell in row-major order, used as the click point.
    pub fn anchor(&self) -> Option<Cell> {
        self.cells.first().copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.cells.binary_search(&cell).is_ok()
    }

    /// Leftmost and rightmost column touched by the component.
    pub fn column_span(&self) -> Option<(usize, usize)> {
        let min = self.cells.iter().map(|&(_, c)| c).min()?;
        let max = self.cells.iter().map(|&(_, c)| c).max()?;
        Some((min, max))
    }
}

/// Whether a component may be played (`size >= 2`).
pub fn is_removable(component: &Component) -> bool {
    component.is_removable()
}

// Breadth-first fill from `start`, marking cells in the shared index-based `visited` set.
// The queue lives on the heap, so board size never bounds call-stack depth.
fn flood_fill(board: &Board, start: Cell, visited: &mut [bool]) -> Vec<Cell> {
    let Some(color) = board.cell(start.0, start.1) else {
        return Vec::new();
    };
    let mut cells = Vec::new();
    let mut queue = VecDeque::new();
    visited[board.index(start.0, start.1)] = true;
    queue.push_back(start);

    while let Some((r, c)) = queue.pop_front() {
        cells.push((r, c));
        for (nr, nc) in neighbors(r, c, board.rows, board.cols) {
            let idx = board.index(nr, nc);
            if !visited[idx] && board.cells[idx] == Some(color) {
                visited[idx] = true;
                queue.push_back((nr, nc));
            }
        }
    }
    cells
}

/// Returns the component containing `(r, c)`.
///
/// Out-of-bounds coordinates and empty cells yield an empty component rather than an error.
/// Singletons are returned as a component of length 1; use [`Component::is_removable`] to
/// check playability.
///
/// # Examples
/// ```
/// use samegame_engine::engine::component_at;
/// use samegame_engine::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["RRG", "RGG", "BBB"]).unwrap();
/// let red = component_at(&board, 0, 0);
/// assert_eq!(red.cells(), &[(0, 0), (0, 1), (1, 0)]);
/// assert!(component_at(&board, 7, 7).is_empty());
/// ```
pub fn component_at(board: &Board, r: usize, c: usize) -> Component {
    if board.cell(r, c).is_none() {
        return Component::default();
    }
    let mut visited = vec![false; board.rows * board.cols];
    Component::from_cells(flood_fill(board, (r, c), &mut visited))
}

/// Partitions every occupied cell into components, singletons included.
///
/// Components come back in row-major order of their anchors.
pub fn all_components_with_singletons(board: &Board) -> Vec<Component> {
    let mut visited = vec![false; board.rows * board.cols];
    let mut components = Vec::new();
    for r in 0..board.rows {
        for c in 0..board.cols {
            let idx = board.index(r, c);
            if board.cells[idx].is_some() && !visited[idx] {
                components.push(Component::from_cells(flood_fill(board, (r, c), &mut visited)));
            }
        }
    }
    components
}

/// Returns the removable components (size >= 2) in row-major order of their anchors.
pub fn all_components(board: &Board) -> Vec<Component> {
    all_components_with_singletons(board)
        .into_iter()
        .filter(Component::is_removable)
        .collect()
}

/// True when no removable component exists.
///
/// Equivalent to `all_components(board).is_empty()`: a removable component exists exactly
/// when two 4-adjacent cells share a color, which this checks without building components.
pub fn is_terminal(board: &Board) -> bool {
    for r in 0..board.rows {
        for c in 0..board.cols {
            let Some(color) = board.cell(r, c) else {
                continue;
            };
            if board.cell(r + 1, c) == Some(color) || board.cell(r, c + 1) == Some(color) {
                return false;
            }
        }
    }
    true
}

/// Vertical collapse followed by horizontal compaction, as a pure transform.
///
/// Applying it to an already settled board returns an identical board.
pub fn apply_gravity_and_compact(board: &Board) -> Board {
    let mut settled = board.clone();
    settled.collapse_columns();
    settled.compact_columns();
    settled
}

// Removes `component` and settles the board without validating it. Search code only feeds
// it components freshly produced by `all_components` on the same board.
pub(crate) fn simulate(board: &Board, component: &Component) -> Board {
    let mut next = board.clone();
    for &(r, c) in component.cells() {
        let idx = next.index(r, c);
        next.cells[idx] = None;
    }
    next.collapse_columns();
    next.compact_columns();
    next
}

/// Removes `component`, then applies gravity and compaction. The input board is untouched.
///
/// # Errors
/// - `MoveError::NotRemovable` when the component has fewer than two cells.
/// - `MoveError::OutOfBounds` / `MoveError::EmptyCell` when its anchor is not a live cell.
/// - `MoveError::StaleComponent` when the cells are not exactly a component of `board`.
pub fn apply_move(board: &Board, component: &Component) -> Result<Board, MoveError> {
    if !component.is_removable() {
        return Err(MoveError::NotRemovable {
            size: component.len(),
        });
    }
    let (row, col) = component
        .anchor()
        .ok_or(MoveError::NotRemovable { size: 0 })?;
    if !board.in_bounds(row, col) {
        return Err(MoveError::OutOfBounds { row, col });
    }
    if board.cell(row, col).is_none() {
        return Err(MoveError::EmptyCell { row, col });
    }
    if component_at(board, row, col) != *component {
        return Err(MoveError::StaleComponent { row, col });
    }
    Ok(simulate(board, component))
}

/// Whether a session alternates turns or is played by one person.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameMode {
    /// A single human plays every move.
    Solo,
    /// Human and CPU alternate, the human moving first.
    Versus,
}

#[derive(Clone, Debug)]
struct Snapshot {
    board: Board,
    scores: [u64; 2],
    turn: Player,
}

/// Manages a play session: the board, both players' scores, whose turn it is and a history
/// of earlier states for undo.
///
/// # Examples
/// ```
/// use samegame_engine::engine::{Game, GameMode, Player};
/// use samegame_engine::utils::board_from_str_array;
///
/// let board = board_from_str_array(&["RR", "GB"]).unwrap();
/// let mut game = Game::new(board, GameMode::Versus);
/// assert_eq!(game.process_move(0, 0), Ok(4));
/// assert_eq!(game.score(Player::Human), 4);
/// assert_eq!(game.turn(), Player::Cpu);
/// assert!(game.is_game_over());
/// ```
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    mode: GameMode,
    scores: [u64; 2],
    turn: Player,
    history: Vec<Snapshot>,
}

impl Game {
    /// Starts a session on `board`. The human always moves first.
    pub fn new(board: Board, mode: GameMode) -> Self {
        Game {
            board,
            mode,
            scores: [0, 0],
            turn: Player::Human,
            history: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// The player whose move it is.
    pub fn turn(&self) -> Player {
        self.turn
    }

    pub fn score(&self, player: Player) -> u64 {
        self.scores[Self::slot(player)]
    }

    /// Number of moves played and not undone.
    pub fn moves_played(&self) -> usize {
        self.history.len()
    }

    fn slot(player: Player) -> usize {
        match player {
            Player::Human => 0,
            Player::Cpu => 1,
        }
    }

    /// Plays the component containing `(r, c)` for the player to move.
    ///
    /// On success the gain is credited to the mover, the board settles, the previous state
    /// is pushed to the undo history and, in versus mode, the turn passes.
    ///
    /// # Errors
    /// Returns a `MoveError` and leaves the session unchanged when the click is off the
    /// board, on an empty cell, or on a component smaller than two cells.
    pub fn process_move(&mut self, r: usize, c: usize) -> Result<u64, MoveError> {
        if !self.board.in_bounds(r, c) {
            return Err(MoveError::OutOfBounds { row: r, col: c });
        }
        let component = component_at(&self.board, r, c);
        if component.is_empty() {
            return Err(MoveError::EmptyCell { row: r, col: c });
        }
        let next = apply_move(&self.board, &component)?;
        let gained = component.gain();

        self.history.push(Snapshot {
            board: std::mem::replace(&mut self.board, next),
            scores: self.scores,
            turn: self.turn,
        });
        self.scores[Self::slot(self.turn)] += gained;
        debug!(
            "{} removed {} cells at ({}, {}) for {} points",
            self.turn,
            component.len(),
            r,
            c,
            gained
        );
        if self.mode == GameMode::Versus {
            self.turn = self.turn.other();
        }
        Ok(gained)
    }

    /// Reverts the last move. Returns `false` when there is nothing to undo.
    pub fn undo_last_move(&mut self) -> bool {
        match self.history.pop() {
            Some(snapshot) => {
                self.board = snapshot.board;
                self.scores = snapshot.scores;
                self.turn = snapshot.turn;
                true
            }
            None => false,
        }
    }

    /// The game ends when no removable component is left.
    pub fn is_game_over(&self) -> bool {
        is_terminal(&self.board)
    }

    /// The player with the higher score, or `None` on a tie (and always in solo mode).
    pub fn winner(&self) -> Option<Player> {
        if self.mode == GameMode::Solo {
            return None;
        }
        let human = self.score(Player::Human);
        let cpu = self.score(Player::Cpu);
        match human.cmp(&cpu) {
            std::cmp::Ordering::Greater => Some(Player::Human),
            std::cmp::Ordering::Less => Some(Player::Cpu),
            std::cmp::Ordering::Equal => None,
        }
    }
}
