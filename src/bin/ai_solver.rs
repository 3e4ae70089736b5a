use clap::Parser;
use samegame_engine::config::{Difficulty, EngineConfig};
use samegame_engine::engine::{Board, Player};
use samegame_engine::search::best_solo_score;
use samegame_engine::selector::MoveSelector;
use samegame_engine::utils::board_from_text;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Suggest moves for a SameGame position", long_about = None)]
struct Args {
    /// Board file: one row per line, color letters R G B Y P and '.' for empty cells
    board_file: PathBuf,

    #[clap(short, long, value_enum, default_value_t = Difficulty::Hard)]
    difficulty: Difficulty,

    /// TOML engine configuration
    #[clap(long)]
    config: Option<PathBuf>,

    /// Also compute the best single-player total (exhaustive; keep boards small)
    #[clap(long)]
    solo: bool,

    /// Show the top five CPU moves ranked by value
    #[clap(long)]
    analyze: bool,

    #[clap(short, long)]
    verbose: bool,
}

fn read_board_file(path: &Path) -> Result<Board, Box<dyn Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    Ok(board_from_text(&content)?)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let board = read_board_file(&args.board_file)?;
    println!("Loaded board from {}\n", args.board_file.display());
    println!("{}\n", board);

    let exact = board.live_cells() <= config.exact_cell_limit;
    println!(
        "{} occupied cells: {} search",
        board.live_cells(),
        if exact { "exact" } else { "bounded" }
    );

    let mut selector = MoveSelector::new(config);
    match selector.cpu_select_move(&board, args.difficulty) {
        Some(mv) => {
            println!(
                "CPU move ({:?}): ({}, {}) removes {} cells for {} points, value {:?}",
                args.difficulty,
                mv.anchor.0,
                mv.anchor.1,
                mv.component.len(),
                mv.gain,
                mv.score
            );
            println!("{}\n", board.to_string_with_highlight(Some(mv.anchor)));
        }
        None => {
            println!("No moves available.");
            return Ok(());
        }
    }

    if args.analyze {
        let ranked = selector.rank_moves(&board, Player::Cpu, args.difficulty);
        println!("Top moves for the CPU ({} legal):", ranked.len());
        for (i, mv) in ranked.iter().take(5).enumerate() {
            println!(
                "  {}{}. ({}, {}) size {:<3} gain {:<5} value {:?}",
                if i == 0 { "*" } else { " " },
                i + 1,
                mv.anchor.0,
                mv.anchor.1,
                mv.component.len(),
                mv.gain,
                mv.score
            );
        }
        println!();
    }

    if let Some(hint) = selector.hint_for_human(&board) {
        println!(
            "Hint for the human: ({}, {}) for {} points, value {:?}",
            hint.cell.0, hint.cell.1, hint.immediate_score, hint.score
        );
    }

    if args.solo {
        println!("Best single-player total: {}", best_solo_score(&board));
    }
    Ok(())
}
