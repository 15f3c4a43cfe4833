//! Payoff functions of a few well known games.
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rps {
    Rock,
    Paper,
    Scissors,
}

impl Rps {
    pub const ALL: [Rps; 3] = [Rps::Rock, Rps::Paper, Rps::Scissors];

    fn beats(self, other: Rps) -> bool {
        matches!(
            (self, other),
            (Rps::Rock, Rps::Scissors) | (Rps::Paper, Rps::Rock) | (Rps::Scissors, Rps::Paper)
        )
    }
}

/// Score of the first player: 1 for a win, -1 for a loss, 0 for a tie.
pub fn rock_paper_scissors(first: &Rps, second: &Rps) -> f64 {
    if first.beats(*second) {
        1.
    } else if second.beats(*first) {
        -1.
    } else {
        0.
    }
}

pub fn rock_paper_scissors_pair(first: &Rps, second: &Rps) -> (f64, f64) {
    let score = rock_paper_scissors(first, second);
    (score, -score)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prisoner {
    Silent,
    Betray,
}

impl Prisoner {
    pub const ALL: [Prisoner; 2] = [Prisoner::Silent, Prisoner::Betray];
}

/// Years in prison, negated.
pub fn prisoners_dilemma(first: &Prisoner, second: &Prisoner) -> (f64, f64) {
    match (first, second) {
        (Prisoner::Silent, Prisoner::Silent) => (-1., -1.),
        (Prisoner::Silent, Prisoner::Betray) => (-3., 0.),
        (Prisoner::Betray, Prisoner::Silent) => (0., -3.),
        (Prisoner::Betray, Prisoner::Betray) => (-2., -2.),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Opera,
    Football,
}

impl Venue {
    pub const ALL: [Venue; 2] = [Venue::Opera, Venue::Football];
}

pub fn battle_of_the_sexes(first: &Venue, second: &Venue) -> (f64, f64) {
    match (first, second) {
        (Venue::Opera, Venue::Opera) => (2., 1.),
        (Venue::Football, Venue::Football) => (1., 2.),
        _ => (-1., -1.),
    }
}

impl fmt::Display for Rps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}

impl fmt::Display for Prisoner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format!("{self:?}").to_lowercase())
    }
}
