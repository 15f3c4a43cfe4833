use std::fmt::Display;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use nashsolver::{
    ActionSet, GameError, NonZeroSumGame, ZeroSumGame,
    classic::{
        Prisoner, Rps, Venue, battle_of_the_sexes, prisoners_dilemma, rock_paper_scissors,
        rock_paper_scissors_pair,
    },
    harness::{format_policy, simulate_general_sum, simulate_zero_sum},
};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GameKind {
    /// Rock paper scissors with every action available.
    Rps,
    /// Rock paper scissors where the second player cannot play scissors.
    RpsNoScissors,
    /// Rock paper scissors where the second player can only play rock.
    RpsRockOnly,
    PrisonersDilemma,
    BattleOfTheSexes,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Game to solve and simulate. Every game is run when missing.
    #[arg(short, long, value_enum)]
    game: Option<GameKind>,

    /// Rounds played with the computed strategies.
    #[arg(short, long, default_value_t = 10_000)]
    iterations: usize,

    /// Seed of the random generator used for starting points and sampling.
    #[arg(short, long, default_value_t = 1337)]
    seed: u64,

    /// Times each general-sum game is solved. Different starting points may reach
    /// different equilibria.
    #[arg(short, long, default_value_t = 1)]
    repeat: usize,

    /// Solve rock paper scissors with the general-sum solver too.
    #[arg(long)]
    general_sum: bool,
}

fn progress_bar(iterations: usize) -> ProgressBar {
    let pb = ProgressBar::new(iterations as u64);
    pb.set_style(
        ProgressStyle::with_template("{wide_bar:40.cyan/blue} {human_pos}/{human_len} {msg} ")
            .expect("Valid progress bar template.")
            .progress_chars("##-"),
    );
    pb
}

fn run_zero_sum(
    title: &str,
    second_actions: Vec<Rps>,
    args: &Args,
    rng: &mut StdRng,
) -> Result<(), GameError> {
    let first = ActionSet::new(Rps::ALL.to_vec())?;
    let second = ActionSet::new(second_actions)?;
    let game_first = ZeroSumGame::new(rock_paper_scissors, first.clone(), &second)?;
    let game_second = ZeroSumGame::for_second_player(rock_paper_scissors, &first, second)?;

    println!("{title}");
    println!(
        "First player: {}",
        format_policy(game_first.actions(), game_first.optimal_policy())
    );
    println!(
        "Second player: {}",
        format_policy(game_second.actions(), game_second.optimal_policy())
    );

    let pb = progress_bar(args.iterations);
    let average = simulate_zero_sum(
        rock_paper_scissors,
        &game_first,
        &game_second,
        args.iterations,
        rng,
        |_| pb.inc(1),
    );
    pb.finish_and_clear();

    println!("Game price: {:.5}", game_first.game_price());
    println!(
        "Payoff against each pure action: {}",
        format_policy(game_second.actions(), &game_first.guaranteed_payoffs())
    );
    println!("Average score: {average:.5}");
    println!();
    Ok(())
}

fn run_general_sum<A, B, F>(
    title: &str,
    get_score: F,
    first_actions: Vec<A>,
    second_actions: Vec<B>,
    args: &Args,
    rng: &mut StdRng,
) -> Result<(), GameError>
where
    A: Display + Clone,
    B: Display + Clone,
    F: Fn(&A, &B) -> (f64, f64) + Copy,
{
    let first = ActionSet::new(first_actions)?;
    let second = ActionSet::new(second_actions)?;

    println!("{title}");
    for run in 1..=args.repeat {
        let game = NonZeroSumGame::new(get_score, first.clone(), second.clone(), rng)?;
        let (first_policy, second_policy) = game.optimal_policy();
        let (first_price, second_price) = game.game_price();
        let (first_regret, second_regret) = game.regret();

        if args.repeat > 1 {
            println!("Run {run}:");
        }
        println!(
            "First player: {}",
            format_policy(game.first_actions(), first_policy)
        );
        println!(
            "Second player: {}",
            format_policy(game.second_actions(), second_policy)
        );
        println!(
            "Convergence: {:?}, regret {first_regret:.2e} {second_regret:.2e}",
            game.convergence()
        );

        let pb = progress_bar(args.iterations);
        let (first_average, second_average) =
            simulate_general_sum(get_score, &game, args.iterations, rng, |i| {
                pb.inc(1);
                if i % 1000 == 0 {
                    pb.set_message(format!("Run {run}"));
                }
            });
        pb.finish_and_clear();

        println!("Game price: {first_price:.5} {second_price:.5}");
        println!("Average score: {first_average:.5} {second_average:.5}");
        println!();
    }
    Ok(())
}

fn run(kind: GameKind, args: &Args, rng: &mut StdRng) -> Result<(), GameError> {
    match kind {
        GameKind::Rps => {
            run_zero_sum("Rock paper scissors", Rps::ALL.to_vec(), args, rng)?;
            if args.general_sum {
                run_general_sum(
                    "Rock paper scissors (general-sum solver)",
                    rock_paper_scissors_pair,
                    Rps::ALL.to_vec(),
                    Rps::ALL.to_vec(),
                    args,
                    rng,
                )?;
            }
            Ok(())
        }
        GameKind::RpsNoScissors => run_zero_sum(
            "Rock paper scissors, second player without scissors",
            vec![Rps::Rock, Rps::Paper],
            args,
            rng,
        ),
        GameKind::RpsRockOnly => run_zero_sum(
            "Rock paper scissors, second player only plays rock",
            vec![Rps::Rock],
            args,
            rng,
        ),
        GameKind::PrisonersDilemma => run_general_sum(
            "Prisoner's dilemma",
            prisoners_dilemma,
            Prisoner::ALL.to_vec(),
            Prisoner::ALL.to_vec(),
            args,
            rng,
        ),
        GameKind::BattleOfTheSexes => run_general_sum(
            "Battle of the sexes",
            battle_of_the_sexes,
            Venue::ALL.to_vec(),
            Venue::ALL.to_vec(),
            args,
            rng,
        ),
    }
}

fn main() -> Result<(), GameError> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let games = match args.game {
        Some(kind) => vec![kind],
        None => GameKind::value_variants().to_vec(),
    };
    for kind in games {
        run(kind, &args, &mut rng)?;
    }
    Ok(())
}
