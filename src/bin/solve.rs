use std::path::PathBuf;

use clap::Parser;
use nashsolver::harness::{GameFile, HarnessError};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file with the actions and the payoff table of the game.
    #[arg(short, long)]
    input: PathBuf,

    /// Seed of the starting point of general-sum searches.
    #[arg(short, long, default_value_t = 1337)]
    seed: u64,
}

fn main() -> Result<(), HarnessError> {
    env_logger::init();
    let args = Args::parse();

    let game = GameFile::from_file(&args.input)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let solution = game.solve(&mut rng)?;
    println!("{}", serde_json::to_string_pretty(&solution)?);
    Ok(())
}
