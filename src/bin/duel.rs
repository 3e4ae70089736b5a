use clap::Parser;
use log::info;
use samegame_engine::config::{Difficulty, EngineConfig};
use samegame_engine::engine::{Board, Game, GameMode, Player, DEFAULT_PALETTE_SIZE};
use samegame_engine::search::best_solo_score;
use samegame_engine::selector::{MoveScore, MoveSelector};
use std::error::Error;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Play SameGame against the CPU", long_about = None)]
struct Args {
    #[clap(long, default_value_t = 8)]
    rows: usize,

    #[clap(long, default_value_t = 8)]
    cols: usize,

    /// Number of colors used for the random board (1-5)
    #[clap(long, default_value_t = DEFAULT_PALETTE_SIZE)]
    colors: usize,

    /// Seed for the board; random when omitted
    #[clap(long)]
    seed: Option<u64>,

    #[clap(short, long, value_enum, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// TOML engine configuration
    #[clap(long)]
    config: Option<PathBuf>,

    /// Play alone instead of against the CPU
    #[clap(long)]
    solo: bool,

    /// Log search progress
    #[clap(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn print_score(score: MoveScore) -> String {
    match score {
        MoveScore::Exact(v) => format!("{v}"),
        MoveScore::Estimated(v) => format!("~{v:.1}"),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => EngineConfig::load_or_default(path)?,
        None => EngineConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("board seed {seed}");
    let board = Board::random(args.rows, args.cols, args.colors, seed)?;
    let mode = if args.solo { GameMode::Solo } else { GameMode::Versus };

    let mut selector = MoveSelector::new(config);
    let mut game = Game::new(board, mode);
    println!("Welcome to SameGame! (seed {seed})");

    loop {
        println!("---------------------");
        match mode {
            GameMode::Solo => println!("Moves: {}, Score: {}", game.moves_played(), game.score(Player::Human)),
            GameMode::Versus => println!(
                "Moves: {}, You: {}, CPU: {}",
                game.moves_played(),
                game.score(Player::Human),
                game.score(Player::Cpu)
            ),
        }
        println!("{}", game.board());

        if game.is_game_over() {
            println!("---------------------");
            println!("GAME OVER");
            match (mode, game.winner()) {
                (GameMode::Solo, _) => println!("Final score: {}", game.score(Player::Human)),
                (_, Some(Player::Human)) => println!("You win!"),
                (_, Some(Player::Cpu)) => println!("The CPU wins."),
                (_, None) => println!("It's a tie."),
            }
            break;
        }

        if game.turn() == Player::Cpu {
            let Some(mv) = selector.cpu_select_move(game.board(), args.difficulty) else {
                break;
            };
            let (r, c) = mv.anchor;
            let gained = game.process_move(r, c)?;
            println!("CPU plays ({r}, {c}) for {gained} points (value {})", print_score(mv.score));
            continue;
        }

        print!("Enter your move (row col), 'h' for a hint, 'u' to undo, 'q' to quit: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        match input.trim() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "u" => {
                // In a duel, take back the CPU's reply as well so it is the human's turn again.
                let mut undone = game.undo_last_move();
                while undone && game.turn() != Player::Human {
                    undone = game.undo_last_move();
                }
                if undone {
                    println!("Move undone.");
                } else {
                    println!("Nothing to undo.");
                }
            }
            "h" => match selector.hint_for_human(game.board()) {
                Some(hint) => {
                    println!(
                        "Hint: ({}, {}) scores {} now, projected margin {}",
                        hint.cell.0,
                        hint.cell.1,
                        hint.immediate_score,
                        print_score(hint.score)
                    );
                    println!("{}", game.board().to_string_with_highlight(Some(hint.cell)));
                    if mode == GameMode::Solo
                        && game.board().live_cells() <= selector.config().exact_cell_limit
                    {
                        println!("Best reachable score from here: {}", best_solo_score(game.board()));
                    }
                }
                None => println!("No moves left."),
            },
            other => {
                let parts: Vec<&str> = other.split_whitespace().collect();
                let parsed = match parts.as_slice() {
                    [r, c] => r.parse::<usize>().ok().zip(c.parse::<usize>().ok()),
                    _ => None,
                };
                match parsed {
                    Some((r, c)) => match game.process_move(r, c) {
                        Ok(gained) => println!("+{gained} points"),
                        Err(e) => println!("Invalid move: {e}"),
                    },
                    None => println!("Invalid input format. Use 'row col', 'h', 'u', or 'q'."),
                }
            }
        }
    }
    Ok(())
}
