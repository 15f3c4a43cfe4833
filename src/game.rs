mod action_set;
pub use self::action_set::*;

mod payoff;
pub use self::payoff::*;

mod mixed_strategy;
pub use self::mixed_strategy::*;

mod bimatrix_game;
pub use self::bimatrix_game::*;

mod zero_sum_game;
pub use self::zero_sum_game::*;

mod non_zero_sum_game;
pub use self::non_zero_sum_game::*;

mod game_error;
pub use game_error::GameError;
