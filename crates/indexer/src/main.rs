//! Chess opening statistics CLI.
//!
//! Subcommands cover the whole corpus lifecycle: `fetch` downloads PGN
//! files from a catalog page, `sample` thins them out, `index` builds the
//! position/outcome index, and `analyze` reports the historical outcome
//! distribution for one position.
//!
//! Usage: chess-openings <fetch|sample|index|analyze> [args]

use std::collections::BTreeMap;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use pgn_reader::{RawTag, Reader, SanPlus, Visitor};
use shakmaty::fen::Fen;
use shakmaty::{CastlingMode, Chess, Color, Position};
use tracing::info;

use openings_core::Outcome;
use openings_indexer::config::{Config, DEFAULT_SAMPLE_RATE, DEFAULT_SAMPLE_SEED};
use openings_indexer::{fetch, lookup, persist, pipeline, sample, sequential};
use openings_indexer::PositionIndex;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("fetch") => cmd_fetch(&args[2..]).await,
        Some("sample") => cmd_sample(&args[2..]),
        Some("index") => cmd_index(&args[2..]).await,
        Some("analyze") => cmd_analyze(&args[2..]),
        Some("help") => {
            print_usage(&args[0]);
            Ok(())
        }
        _ => {
            print_usage(&args[0]);
            std::process::exit(1);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  fetch   [--catalog URL] [--dest DIR]");
    eprintln!("          Download every catalog-listed PGN file into DIR.");
    eprintln!("  sample  [rate] [--seed N] [--src DIR] [--dest DIR]");
    eprintln!("          Copy a random fraction of each file's games.");
    eprintln!("  index   [workers|max] [--corpus DIR] [--depth N] [--out FILE]");
    eprintln!("          Build the position/outcome index. Without a worker");
    eprintln!("          count the corpus is indexed on a single thread.");
    eprintln!("  analyze <pgn|fen> <file> [--index FILE]");
    eprintln!("          Report historical outcomes for the game's position.");
}

async fn cmd_fetch(args: &[String]) -> anyhow::Result<()> {
    let config = Config::from_env();
    let mut catalog = fetch::DEFAULT_CATALOG_URL.to_string();
    let mut dest = config.all_games_dir;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--catalog" => {
                if let Some(url) = args.get(i + 1) {
                    catalog = url.clone();
                }
                i += 2;
            }
            "--dest" => {
                if let Some(dir) = args.get(i + 1) {
                    dest = PathBuf::from(dir);
                }
                i += 2;
            }
            _ => i += 1,
        }
    }

    let files = fetch::fetch_corpus(&catalog, &dest).await?;
    println!("Fetched {} files into {}", files, dest.display());
    Ok(())
}

fn cmd_sample(args: &[String]) -> anyhow::Result<()> {
    let config = Config::from_env();
    let mut rate = DEFAULT_SAMPLE_RATE;
    let mut seed = DEFAULT_SAMPLE_SEED;
    let mut src = config.all_games_dir;
    let mut dest = config.corpus_dir;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                seed = args.get(i + 1).and_then(|s| s.parse().ok()).unwrap_or(seed);
                i += 2;
            }
            "--src" => {
                if let Some(dir) = args.get(i + 1) {
                    src = PathBuf::from(dir);
                }
                i += 2;
            }
            "--dest" => {
                if let Some(dir) = args.get(i + 1) {
                    dest = PathBuf::from(dir);
                }
                i += 2;
            }
            other => {
                if let Ok(r) = other.parse() {
                    rate = r;
                }
                i += 1;
            }
        }
    }

    let stats = sample::sample_corpus(&src, &dest, rate, seed)?;
    println!(
        "Kept {} of {} games across {} files in {}",
        stats.games_kept,
        stats.games_seen,
        stats.files,
        dest.display()
    );
    Ok(())
}

/// Resolve the `index` subcommand's arguments against the environment
/// config. Anything unparseable is a usage error, reported before any
/// indexing work starts; a typo must not silently fall back to a
/// default and overwrite the persisted index.
fn parse_index_args(args: &[String], mut config: Config) -> anyhow::Result<Config> {
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--corpus" => {
                if let Some(dir) = args.get(i + 1) {
                    config.corpus_dir = PathBuf::from(dir);
                }
                i += 2;
            }
            "--depth" => {
                let Some(value) = args.get(i + 1) else {
                    bail!("--depth requires a value");
                };
                let Ok(depth) = value.parse() else {
                    bail!("invalid depth '{value}': expected a positive number of move pairs");
                };
                config.depth_bound = depth;
                i += 2;
            }
            "--out" => {
                if let Some(path) = args.get(i + 1) {
                    config.index_path = PathBuf::from(path);
                }
                i += 2;
            }
            "max" => {
                config.workers = Some(num_cpus::get());
                i += 1;
            }
            other => {
                match other.parse() {
                    Ok(n) => config.workers = Some(n),
                    Err(_) => {
                        bail!("unrecognized argument '{other}': expected a worker count or 'max'")
                    }
                }
                i += 1;
            }
        }
    }

    config.validate()?;
    Ok(config)
}

async fn cmd_index(args: &[String]) -> anyhow::Result<()> {
    let config = parse_index_args(args, Config::from_env())?;

    let store = Arc::new(PositionIndex::new());
    let start = Instant::now();

    match config.workers {
        Some(workers) => {
            info!(workers, corpus = %config.corpus_dir.display(), "concurrent indexing");
            pipeline::index_concurrent(&config.corpus_dir, config.depth_bound, store.clone(), workers)
                .await?;
        }
        None => {
            info!(corpus = %config.corpus_dir.display(), "sequential indexing");
            sequential::index_sequential(&config.corpus_dir, config.depth_bound, &store)?;
        }
    }

    persist::persist(&store, &config.index_path)?;

    println!(
        "Indexed {} observations over {} keys in {:.1}s, written to {}",
        store.total_observations(),
        store.len(),
        start.elapsed().as_secs_f64(),
        config.index_path.display()
    );
    Ok(())
}

fn cmd_analyze(args: &[String]) -> anyhow::Result<()> {
    let config = Config::from_env();
    let mut index_path = config.index_path;

    let mut positional: Vec<&String> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--index" => {
                if let Some(path) = args.get(i + 1) {
                    index_path = PathBuf::from(path);
                }
                i += 2;
            }
            _ => {
                positional.push(&args[i]);
                i += 1;
            }
        }
    }

    let [input_type, input_file] = positional.as_slice() else {
        bail!("analyze takes an input type (pgn or fen) and an input file");
    };

    let pos = match input_type.as_str() {
        "pgn" => position_from_pgn(Path::new(input_file))?,
        "fen" => position_from_fen(Path::new(input_file))?,
        other => bail!("input type must be 'pgn' or 'fen', got '{other}'"),
    };

    let index = persist::load(&index_path)?;
    print_report(&pos, &index);
    Ok(())
}

/// Visitor that replays a single game's moves to its final position.
struct FinalPosition {
    board: Chess,
    games: u64,
    illegal: Option<String>,
}

impl Visitor for FinalPosition {
    type Tags = ();
    type Movetext = Chess;
    type Output = ();

    fn begin_tags(&mut self) -> ControlFlow<(), ()> {
        ControlFlow::Continue(())
    }

    fn tag(&mut self, _tags: &mut (), _name: &[u8], _value: RawTag<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, _tags: ()) -> ControlFlow<(), Chess> {
        self.games += 1;
        ControlFlow::Continue(Chess::default())
    }

    fn san(&mut self, board: &mut Chess, san_plus: SanPlus) -> ControlFlow<()> {
        match san_plus
            .san
            .to_move(board)
            .ok()
            .and_then(|mv| board.clone().play(mv).ok())
        {
            Some(next) => {
                *board = next;
                ControlFlow::Continue(())
            }
            None => {
                self.illegal = Some(san_plus.san.to_string());
                ControlFlow::Break(())
            }
        }
    }

    fn end_game(&mut self, board: Chess) {
        self.board = board;
    }
}

fn position_from_pgn(path: &Path) -> anyhow::Result<Chess> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut visitor = FinalPosition {
        board: Chess::default(),
        games: 0,
        illegal: None,
    };

    let mut reader = Reader::new(BufReader::new(file));
    while reader.read_game(&mut visitor)?.is_some() {}

    if let Some(san) = visitor.illegal {
        bail!("illegal move '{san}' in {}", path.display());
    }
    match visitor.games {
        0 => bail!("no game found in {}", path.display()),
        1 => Ok(visitor.board),
        n => bail!("expected one game in {}, found {n}", path.display()),
    }
}

fn position_from_fen(path: &Path) -> anyhow::Result<Chess> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let fen: Fen = text
        .trim()
        .parse()
        .with_context(|| format!("invalid FEN in {}", path.display()))?;
    fen.into_position(CastlingMode::Standard)
        .context("FEN does not describe a legal position")
}

fn print_report(pos: &Chess, index: &BTreeMap<String, u64>) {
    let Some(report) = lookup::lookup(pos, index) else {
        println!("No games found with this position.");
        return;
    };

    let turn = match pos.turn() {
        Color::White => "White",
        Color::Black => "Black",
    };

    println!("Historically, in this position ({turn} to move)");
    println!("==============================================");
    println!(
        "White WON:\t{:.1}% ({} games)",
        report.percent(Outcome::WhiteWin),
        report.white_wins
    );
    println!(
        "Black WON:\t{:.1}% ({} games)",
        report.percent(Outcome::BlackWin),
        report.black_wins
    );
    println!(
        "DRAWN:\t\t{:.1}% ({} games)",
        report.percent(Outcome::Draw),
        report.draws
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            all_games_dir: PathBuf::from("data/all_games"),
            corpus_dir: PathBuf::from("data/sampled_games"),
            depth_bound: 10,
            workers: None,
            index_path: PathBuf::from("data/analysis.json"),
        }
    }

    fn arg_list(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_index_args_select_the_indexing_mode() {
        let config = parse_index_args(&arg_list(&["4"]), base_config()).unwrap();
        assert_eq!(config.workers, Some(4));

        let config = parse_index_args(&arg_list(&["max"]), base_config()).unwrap();
        assert!(config.workers.unwrap() >= 1);

        let config = parse_index_args(&[], base_config()).unwrap();
        assert_eq!(config.workers, None);
    }

    #[test]
    fn test_index_overrides_paths_and_depth() {
        let config = parse_index_args(
            &arg_list(&["--corpus", "pgns", "--depth", "6", "--out", "idx.json"]),
            base_config(),
        )
        .unwrap();
        assert_eq!(config.corpus_dir, PathBuf::from("pgns"));
        assert_eq!(config.depth_bound, 6);
        assert_eq!(config.index_path, PathBuf::from("idx.json"));
    }

    #[test]
    fn test_index_rejects_a_non_numeric_worker_count() {
        let err = parse_index_args(&arg_list(&["notanumber"]), base_config()).unwrap_err();
        assert!(err.to_string().contains("notanumber"));
    }

    #[test]
    fn test_index_rejects_zero_workers() {
        assert!(parse_index_args(&arg_list(&["0"]), base_config()).is_err());
    }

    #[test]
    fn test_index_rejects_bad_depth_values() {
        assert!(parse_index_args(&arg_list(&["--depth", "ten"]), base_config()).is_err());
        assert!(parse_index_args(&arg_list(&["--depth", "-3"]), base_config()).is_err());
        assert!(parse_index_args(&arg_list(&["--depth", "0"]), base_config()).is_err());
        assert!(parse_index_args(&arg_list(&["--depth"]), base_config()).is_err());
    }
}
