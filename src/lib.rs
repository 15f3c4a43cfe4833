//! Nash equilibria in mixed strategies for two-player finite games.
//!
//! [`ZeroSumGame`] solves zero-sum games exactly with linear programming.
//! [`NonZeroSumGame`] finds an equilibrium of a general-sum game as a stationary
//! point of a bilinear program. Both sample actions from the strategies they find.
mod game;
pub use game::*;

pub mod classic;
pub mod harness;
pub mod optim;
