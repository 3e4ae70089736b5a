use clap::Parser;
use log::{info, warn};
use samegame_engine::config::{Difficulty, EngineConfig};
use samegame_engine::engine::{Board, Game, GameMode, Player};
use samegame_engine::heuristics::greedy_move;
use samegame_engine::selector::MoveSelector;
use samegame_engine::trace::{LogObserver, NullObserver, SearchObserver};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Pit each CPU difficulty against a greedy player", long_about = None)]
struct Args {
    /// Number of seeded boards per difficulty
    #[clap(long, default_value_t = 10)]
    boards: u64,

    #[clap(long, default_value_t = 0)]
    start_seed: u64,

    #[clap(long, default_value_t = 6)]
    rows: usize,

    #[clap(long, default_value_t = 6)]
    cols: usize,

    #[clap(long, default_value_t = 3)]
    colors: usize,

    #[clap(long)]
    config: Option<PathBuf>,

    #[clap(short, long)]
    verbose: bool,
}

#[derive(Debug, Default)]
struct Tally {
    wins: u32,
    losses: u32,
    ties: u32,
    margin: i64,
}

// Greedy moves first as the human; the CPU replies at `difficulty`.
fn play_out(selector: &mut MoveSelector, board: Board, difficulty: Difficulty) -> Result<Game, Box<dyn Error>> {
    let mut game = Game::new(board, GameMode::Versus);
    while !game.is_game_over() {
        let anchor = match game.turn() {
            Player::Human => greedy_move(game.board()).and_then(|c| c.anchor()),
            Player::Cpu => selector
                .cpu_select_move(game.board(), difficulty)
                .map(|mv| mv.anchor),
        };
        let Some((r, c)) = anchor else {
            warn!("{} found no move on a live board", game.turn());
            break;
        };
        game.process_move(r, c)?;
    }
    Ok(game)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    // Search events are only logged with --verbose.
    let observer: Box<dyn SearchObserver> = if args.verbose {
        Box::new(LogObserver)
    } else {
        Box::new(NullObserver)
    };
    let mut selector = MoveSelector::with_observer(config, observer);

    println!(
        "Evaluating {} boards ({}x{}, {} colors) per difficulty...",
        args.boards, args.rows, args.cols, args.colors
    );

    for difficulty in Difficulty::ALL {
        let mut tally = Tally::default();
        for seed in args.start_seed..args.start_seed + args.boards {
            let board = Board::random(args.rows, args.cols, args.colors, seed)?;
            let game = play_out(&mut selector, board, difficulty)?;
            let cpu = game.score(Player::Cpu);
            let human = game.score(Player::Human);
            info!("{difficulty:?} seed {seed}: CPU {cpu} vs greedy {human}");

            tally.margin += cpu as i64 - human as i64;
            match game.winner() {
                Some(Player::Cpu) => tally.wins += 1,
                Some(Player::Human) => tally.losses += 1,
                None => tally.ties += 1,
            }
        }
        println!(
            "{:<8} W {:>3}  L {:>3}  T {:>3}  avg margin {:>8.2}",
            format!("{difficulty:?}"),
            tally.wins,
            tally.losses,
            tally.ties,
            tally.margin as f64 / args.boards.max(1) as f64
        );
    }
    Ok(())
}
