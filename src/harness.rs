//! Glue used by the binaries: games read from JSON files and repeated play.
use std::{fmt::Display, fs, path::Path};

use itertools::Itertools;
use ndarray::Array1;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optim::Convergence;
use crate::{ActionSet, GameError, NonZeroSumGame, ZeroSumGame};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Cannot read game file: {1}")]
    GameFileRead(#[source] std::io::Error, String),

    #[error("Invalid JSON.")]
    Json(#[from] serde_json::Error),

    #[error("Cannot solve game.")]
    Game(#[from] GameError),
}

/// Game given as a payoff table: `payoffs[i][j]` is the outcome when the first
/// player picks `first_actions[i]` and the second `second_actions[j]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameFile {
    ZeroSum {
        first_actions: ActionSet<String>,
        second_actions: ActionSet<String>,
        payoffs: Vec<Vec<f64>>,
    },
    GeneralSum {
        first_actions: ActionSet<String>,
        second_actions: ActionSet<String>,
        payoffs: Vec<Vec<(f64, f64)>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionProbability {
    pub action: String,
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Solution {
    ZeroSum {
        first_policy: Vec<ActionProbability>,
        second_policy: Vec<ActionProbability>,
        game_price: f64,
    },
    GeneralSum {
        first_policy: Vec<ActionProbability>,
        second_policy: Vec<ActionProbability>,
        game_price: (f64, f64),
        regret: (f64, f64),
        convergence: Convergence,
        converged: bool,
    },
}

impl GameFile {
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| HarnessError::GameFileRead(e, path.display().to_string()))?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// `rng` only matters for general-sum games.
    pub fn solve<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Solution, HarnessError> {
        match self {
            GameFile::ZeroSum {
                first_actions,
                second_actions,
                payoffs,
            } => {
                check_shape(payoffs, first_actions.len(), second_actions.len())?;
                let first = index_set(first_actions.len())?;
                let second = index_set(second_actions.len())?;
                let get_score = |&i: &usize, &j: &usize| payoffs[i][j];

                let game_first = ZeroSumGame::new(get_score, first.clone(), &second)?;
                let game_second = ZeroSumGame::for_second_player(get_score, &first, second)?;

                Ok(Solution::ZeroSum {
                    first_policy: labelled(first_actions, game_first.optimal_policy()),
                    second_policy: labelled(second_actions, game_second.optimal_policy()),
                    game_price: game_first.game_price(),
                })
            }
            GameFile::GeneralSum {
                first_actions,
                second_actions,
                payoffs,
            } => {
                check_shape(payoffs, first_actions.len(), second_actions.len())?;
                let first = index_set(first_actions.len())?;
                let second = index_set(second_actions.len())?;

                let get_score = |&i: &usize, &j: &usize| payoffs[i][j];

                let game = NonZeroSumGame::new(get_score, first, second, rng)?;
                let (first_policy, second_policy) = game.optimal_policy();

                Ok(Solution::GeneralSum {
                    first_policy: labelled(first_actions, first_policy),
                    second_policy: labelled(second_actions, second_policy),
                    game_price: game.game_price(),
                    regret: game.regret(),
                    convergence: game.convergence(),
                    converged: game.convergence().is_converged(),
                })
            }
        }
    }
}

fn check_shape<T>(payoffs: &[Vec<T>], rows: usize, columns: usize) -> Result<(), GameError> {
    let found_columns = payoffs
        .iter()
        .map(Vec::len)
        .find(|&len| len != columns)
        .unwrap_or(columns);
    if payoffs.len() != rows || found_columns != columns {
        return Err(GameError::PayoffShape {
            expected: (rows, columns),
            found: (payoffs.len(), found_columns),
        });
    }
    Ok(())
}

fn index_set(len: usize) -> Result<ActionSet<usize>, GameError> {
    ActionSet::new((0..len).collect())
}

fn labelled(actions: &ActionSet<String>, policy: &Array1<f64>) -> Vec<ActionProbability> {
    actions
        .iter()
        .zip(policy.iter())
        .map(|(action, &probability)| ActionProbability {
            action: action.clone(),
            probability,
        })
        .collect()
}

/// `rock: 0.3333, paper: 0.3333, scissors: 0.3333`
pub fn format_policy<A: Display>(actions: &ActionSet<A>, policy: &Array1<f64>) -> String {
    actions
        .iter()
        .zip(policy.iter())
        .map(|(action, probability)| format!("{action}: {probability:.4}"))
        .join(", ")
}

/// Plays `iterations` rounds with both players sampling from their optimal
/// policies and returns the average score of the first player.
pub fn simulate_zero_sum<A, B, F, R>(
    get_score: F,
    first: &ZeroSumGame<A>,
    second: &ZeroSumGame<B>,
    iterations: usize,
    rng: &mut R,
    mut on_iteration: impl FnMut(usize),
) -> f64
where
    F: Fn(&A, &B) -> f64,
    R: Rng + ?Sized,
{
    let mut score = 0.;
    for i in 0..iterations {
        let a = first.gen_action(rng);
        let b = second.gen_action(rng);
        score += get_score(a, b);
        on_iteration(i);
    }
    score / iterations.max(1) as f64
}

/// Like [`simulate_zero_sum`], returning the average score of each player.
pub fn simulate_general_sum<A, B, F, R>(
    get_score: F,
    game: &NonZeroSumGame<A, B>,
    iterations: usize,
    rng: &mut R,
    mut on_iteration: impl FnMut(usize),
) -> (f64, f64)
where
    F: Fn(&A, &B) -> (f64, f64),
    R: Rng + ?Sized,
{
    let mut score = (0., 0.);
    for i in 0..iterations {
        let a = game.gen_first_action(rng);
        let b = game.gen_second_action(rng);
        let (first_score, second_score) = get_score(a, b);
        score.0 += first_score;
        score.1 += second_score;
        on_iteration(i);
    }
    let iterations = iterations.max(1) as f64;
    (score.0 / iterations, score.1 / iterations)
}
