use clap::{Parser, ValueEnum};
use flowgen::{generate, Encoding, GeneratorConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use tracing::info;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Termini lettered by flow
    Text,
    /// Every cell lettered by flow
    Solution,
    /// 0 on termini, 1 elsewhere
    Mask,
    /// Flow number on termini, 0 elsewhere
    Puzzle,
    /// Puzzle and solution encodings as JSON
    Json,
}

#[derive(Parser)]
#[command(name = "flowgen", version, about = "Generate Numberlink and Flow Free puzzles")]
struct Args {
    /// Board width in cells
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Board height in cells
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Number of boards to generate
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Fewest numbers per board
    #[arg(long)]
    min: Option<usize>,

    /// Most numbers per board
    #[arg(long)]
    max: Option<usize>,

    /// Seed for reproducible boards, random if absent
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log generation progress
    #[arg(short, long)]
    verbose: bool,
}

fn print_cells(cells: &[Vec<usize>]) {
    for row in cells {
        println!("{}", row.iter().map(usize::to_string).collect::<Vec<_>>().join(" "));
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let config = GeneratorConfig {
        min_numbers: args.min,
        max_numbers: args.max,
        ..GeneratorConfig::new(args.width, args.height, args.count)
    };
    let (min, max) = config.number_bounds();
    info!(seed, min, max, "generating {} {}x{} board(s)", args.count, args.width, args.height);

    let boards = generate(&config, &mut StdRng::seed_from_u64(seed))?;

    match args.format {
        Format::Text => boards.iter().for_each(|board| println!("{board}")),
        Format::Solution => boards.iter().for_each(|board| println!("{}", board.solution())),
        Format::Mask => boards.iter().for_each(|board| print_cells(&board.encode(Encoding::Mask).cells)),
        Format::Puzzle => boards.iter().for_each(|board| print_cells(&board.encode(Encoding::Puzzle).cells)),
        Format::Json => {
            let boards = boards.iter()
                .map(|board| json!({
                    "puzzle": board.encode(Encoding::Puzzle),
                    "solution": board.encode(Encoding::Solution),
                }))
                .collect::<Vec<_>>();
            println!("{}", serde_json::to_string_pretty(&json!({ "seed": seed, "boards": boards }))?);
        }
    }

    Ok(())
}
