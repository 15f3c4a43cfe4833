use log::debug;
use ndarray::prelude::*;
use rand::Rng;

use super::{ActionSet, GameError, MixedStrategy, payoff_matrix};
use crate::optim::{Bound, LinearProgram, LinearSolver, Simplex};

/// Optimal mixed strategy of the first player of a two-player zero-sum game.
///
/// By the minimax theorem the first player can guarantee the price of the game
/// against any strategy of the second one. The strategy and the price are found
/// with a linear program when the game is built.
///
/// The policy of the second player is the policy of the first one in the game with
/// swapped roles and negated payoffs, see [`ZeroSumGame::for_second_player`].
#[derive(Debug, Clone)]
pub struct ZeroSumGame<A> {
    actions: ActionSet<A>,
    payoff: Array2<f64>,
    optimal_policy: MixedStrategy,
    game_price: f64,
}

impl<A> ZeroSumGame<A> {
    /// `get_score(a, b)` is the payoff of the first player when they play `a` and
    /// the second player plays `b`.
    pub fn new<B, F>(
        get_score: F,
        first_actions: ActionSet<A>,
        second_actions: &ActionSet<B>,
    ) -> Result<Self, GameError>
    where
        F: Fn(&A, &B) -> f64,
    {
        Self::with_solver(get_score, first_actions, second_actions, &Simplex::default())
    }

    pub fn with_solver<B, F, S>(
        get_score: F,
        first_actions: ActionSet<A>,
        second_actions: &ActionSet<B>,
        solver: &S,
    ) -> Result<Self, GameError>
    where
        F: Fn(&A, &B) -> f64,
        S: LinearSolver + ?Sized,
    {
        let payoff = payoff_matrix(get_score, &first_actions, second_actions)?;
        let (policy, game_price) = Self::calc_optimal_policy(&payoff, solver)?;
        debug!(
            "zero-sum game {}x{} solved, price {game_price:.6}",
            payoff.nrows(),
            payoff.ncols()
        );

        Ok(ZeroSumGame {
            actions: first_actions,
            payoff,
            optimal_policy: MixedStrategy::new(policy)?,
            game_price,
        })
    }

    /// Solves the game from the point of view of the second player: their payoff
    /// for `(b, a)` is `-get_score(a, b)`.
    pub fn for_second_player<B, F>(
        get_score: F,
        first_actions: &ActionSet<B>,
        second_actions: ActionSet<A>,
    ) -> Result<Self, GameError>
    where
        F: Fn(&B, &A) -> f64,
    {
        Self::new(|b: &A, a: &B| -get_score(a, b), second_actions, first_actions)
    }

    fn calc_optimal_policy<S>(
        payoff: &Array2<f64>,
        solver: &S,
    ) -> Result<(Array1<f64>, f64), GameError>
    where
        S: LinearSolver + ?Sized,
    {
        let (n, m) = payoff.dim();

        // The first n variables are the probabilities of the first player's actions,
        // the last one is the price of the game, which is maximized.
        let mut c = Array1::zeros(n + 1);
        c[n] = -1.;

        // Against every pure strategy of the second player the first one gets at
        // least the price of the game.
        let mut a_ub = Array2::ones((m, n + 1));
        a_ub.slice_mut(s![.., ..n]).assign(&payoff.t().mapv(|v| -v));
        let b_ub = Array1::zeros(m);

        let mut a_eq = Array2::ones((1, n + 1));
        a_eq[[0, n]] = 0.;
        let b_eq = array![1.];

        // The price may be negative.
        let mut bounds = vec![Bound::NON_NEGATIVE; n];
        bounds.push(Bound::FREE);

        let lp = LinearProgram::new(c)
            .with_inequalities(a_ub, b_ub)
            .with_equalities(a_eq, b_eq)
            .with_bounds(bounds);
        let solution = solver.solve(&lp)?;

        Ok((solution.x.slice(s![..n]).to_owned(), -solution.fun))
    }

    pub fn actions(&self) -> &ActionSet<A> {
        &self.actions
    }

    pub fn optimal_policy(&self) -> &Array1<f64> {
        self.optimal_policy.probabilities()
    }

    pub fn game_price(&self) -> f64 {
        self.game_price
    }

    /// Expected payoff of the optimal policy against each pure strategy of the
    /// second player. None of them is below the price of the game.
    pub fn guaranteed_payoffs(&self) -> Array1<f64> {
        self.optimal_policy.probabilities().dot(&self.payoff)
    }

    /// Samples an action of the first player from the optimal policy.
    pub fn gen_action<R: Rng + ?Sized>(&self, rng: &mut R) -> &A {
        &self.actions[self.optimal_policy.sample(rng)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classic::{Rps, rock_paper_scissors};
    use crate::optim::{OptimError, SimplexConfig};
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rps_game(second: Vec<Rps>) -> ZeroSumGame<Rps> {
        ZeroSumGame::new(
            rock_paper_scissors,
            ActionSet::new(Rps::ALL.to_vec()).unwrap(),
            &ActionSet::new(second).unwrap(),
        )
        .unwrap()
    }

    fn assert_distribution(policy: &Array1<f64>) {
        assert!(policy.iter().all(|&p| p >= -1e-9));
        assert_abs_diff_eq!(policy.sum(), 1., epsilon = 1e-6);
    }

    #[test]
    fn fair_rock_paper_scissors() {
        let game = rps_game(Rps::ALL.to_vec());

        assert_distribution(game.optimal_policy());
        assert_abs_diff_eq!(
            game.optimal_policy(),
            &Array1::from_elem(3, 1. / 3.),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(game.game_price(), 0., epsilon = 1e-6);
    }

    #[test]
    fn second_player_without_scissors() {
        let game = rps_game(vec![Rps::Rock, Rps::Paper]);

        assert_distribution(game.optimal_policy());
        assert!(game.game_price() > 1e-3);
        // Paper ties paper and beats rock, scissors beat paper and lose to rock.
        assert_abs_diff_eq!(
            game.optimal_policy(),
            &array![0., 2. / 3., 1. / 3.],
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(game.game_price(), 1. / 3., epsilon = 1e-6);
    }

    #[test]
    fn second_player_only_rock() {
        let game = rps_game(vec![Rps::Rock]);

        assert_abs_diff_eq!(game.optimal_policy(), &array![0., 1., 0.], epsilon = 1e-6);
        assert_abs_diff_eq!(game.game_price(), 1., epsilon = 1e-6);
    }

    #[test]
    fn minimax_guarantee() {
        let first = ActionSet::new(vec![0usize, 1, 2, 3]).unwrap();
        let second = ActionSet::new(vec![0usize, 1, 2]).unwrap();
        let table = array![[3., -1., 2.], [-2., 4., 0.], [1., 1., -3.], [0., -2., 5.]];
        let game =
            ZeroSumGame::new(|&a: &usize, &b: &usize| table[[a, b]], first, &second).unwrap();

        assert_distribution(game.optimal_policy());
        for payoff in game.guaranteed_payoffs() {
            assert!(payoff >= game.game_price() - 1e-6);
        }
    }

    #[test]
    fn second_player_policy() {
        let first = ActionSet::new(Rps::ALL.to_vec()).unwrap();
        let second = ActionSet::new(vec![Rps::Rock, Rps::Paper]).unwrap();

        let game_first = ZeroSumGame::new(rock_paper_scissors, first.clone(), &second).unwrap();
        let game_second =
            ZeroSumGame::for_second_player(rock_paper_scissors, &first, second).unwrap();

        assert_abs_diff_eq!(
            game_first.game_price(),
            -game_second.game_price(),
            epsilon = 1e-6
        );
        assert_abs_diff_eq!(
            game_second.optimal_policy(),
            &array![1. / 3., 2. / 3.],
            epsilon = 1e-6
        );
    }

    #[test]
    fn deterministic() {
        let a = rps_game(vec![Rps::Rock, Rps::Paper]);
        let b = rps_game(vec![Rps::Rock, Rps::Paper]);

        assert_eq!(a.optimal_policy(), b.optimal_policy());
        assert_eq!(a.game_price(), b.game_price());
    }

    #[test]
    fn sampled_actions_follow_policy() {
        let game = rps_game(vec![Rps::Rock, Rps::Paper]);
        let mut rng = StdRng::seed_from_u64(1337);

        let draws = 30_000;
        let scissors = (0..draws)
            .filter(|_| *game.gen_action(&mut rng) == Rps::Scissors)
            .count();

        assert_abs_diff_eq!(scissors as f64 / draws as f64, 1. / 3., epsilon = 0.02);
        assert!((0..1000).all(|_| *game.gen_action(&mut rng) != Rps::Rock));
    }

    #[test]
    fn solver_failure_is_propagated() {
        let simplex = Simplex::new(SimplexConfig {
            max_iterations: 0,
            ..Default::default()
        });
        let actions = ActionSet::new(Rps::ALL.to_vec()).unwrap();

        let result =
            ZeroSumGame::with_solver(rock_paper_scissors, actions.clone(), &actions, &simplex);

        assert!(matches!(
            result,
            Err(GameError::Optimization(OptimError::IterationLimit(0)))
        ));
    }
}
