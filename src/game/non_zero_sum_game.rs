use log::{debug, warn};
use ndarray::prelude::*;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::Rng;

use super::{ActionSet, BimatrixGame, GameError, MixedStrategy, Strategy};
use crate::optim::{
    Bound, ConstrainedMinimizer, Convergence, LinearConstraints, Objective,
    SequentialLinearProgramming,
};

/// Nash equilibrium in mixed strategies of a two-player general-sum game.
///
/// With `x`, `y` the strategies of both players, `P1`, `P2` their payoff matrices
/// and `T = P1 + P2`, the equilibria are the global minima of
///
/// ```text
/// -xᵀ·T·y + α + β
/// subject to  α >= P1[i]·y     for every action i of the first player
///             β >= x·P2[.., j] for every action j of the second player
///             x, y probability vectors
/// ```
///
/// The problem is not convex. Depending on the random starting point the local
/// minimizer ends at one of the equilibria or at a stationary point that is not an
/// equilibrium at all, which gets more common as the game grows; such points are
/// still reported as converged. Whatever point the minimizer returns is accepted
/// as the solution. [`NonZeroSumGame::convergence`] tells how the search stopped,
/// [`NonZeroSumGame::regret`] and [`NonZeroSumGame::is_equilibrium`] tell whether
/// the result is actually an equilibrium.
#[derive(Debug, Clone)]
pub struct NonZeroSumGame<A, B> {
    actions: (ActionSet<A>, ActionSet<B>),
    game: BimatrixGame,
    optimal_policy: (MixedStrategy, MixedStrategy),
    game_price: (f64, f64),
    convergence: Convergence,
}

/// Objective over `(x, y, α, β)`.
struct EquilibriumLoss {
    total_payoff: Array2<f64>,
}

impl EquilibriumLoss {
    fn split<'a>(&self, z: &'a Array1<f64>) -> (ArrayView1<'a, f64>, ArrayView1<'a, f64>) {
        let (n, m) = self.total_payoff.dim();
        (z.slice(s![..n]), z.slice(s![n..n + m]))
    }
}

impl Objective for EquilibriumLoss {
    fn value(&self, z: &Array1<f64>) -> f64 {
        let (first, second) = self.split(z);
        let (n, m) = self.total_payoff.dim();
        -first.dot(&self.total_payoff.dot(&second)) + z[n + m] + z[n + m + 1]
    }

    fn gradient(&self, z: &Array1<f64>) -> Array1<f64> {
        let (first, second) = self.split(z);
        let (n, m) = self.total_payoff.dim();
        let mut jac = Array1::ones(n + m + 2);
        jac.slice_mut(s![..n])
            .assign(&-self.total_payoff.dot(&second));
        jac.slice_mut(s![n..n + m])
            .assign(&-first.dot(&self.total_payoff));
        jac
    }
}

impl<A, B> NonZeroSumGame<A, B> {
    /// `get_score(a, b)` returns the payoffs of both players when the first plays
    /// `a` and the second plays `b`. `rng` drives the starting point of the search.
    pub fn new<F, R>(
        get_score: F,
        first_actions: ActionSet<A>,
        second_actions: ActionSet<B>,
        rng: &mut R,
    ) -> Result<Self, GameError>
    where
        F: Fn(&A, &B) -> (f64, f64),
        R: Rng + ?Sized,
    {
        Self::with_minimizer(
            get_score,
            first_actions,
            second_actions,
            rng,
            &SequentialLinearProgramming::default(),
        )
    }

    pub fn with_minimizer<F, R, M>(
        get_score: F,
        first_actions: ActionSet<A>,
        second_actions: ActionSet<B>,
        rng: &mut R,
        minimizer: &M,
    ) -> Result<Self, GameError>
    where
        F: Fn(&A, &B) -> (f64, f64),
        R: Rng + ?Sized,
        M: ConstrainedMinimizer + ?Sized,
    {
        let game = BimatrixGame::from_oracle(get_score, &first_actions, &second_actions)?;
        let (n, m) = game.num_strategies();

        let objective = EquilibriumLoss {
            total_payoff: game.total_payoff(),
        };
        let constraints = Self::constraints(&game);
        let x0 = Self::initial_point(&objective.total_payoff, rng);

        let result = minimizer.minimize(&objective, &constraints, x0);
        if result.converged() {
            debug!(
                "general-sum game {n}x{m} solved in {} iterations, loss {:.3e}",
                result.iterations, result.fun
            );
        } else {
            warn!(
                "general-sum game {n}x{m}: minimizer stopped with {:?} after {} iterations, \
                 keeping last iterate",
                result.convergence, result.iterations
            );
        }

        let strategy = Strategy(
            result.x.slice(s![..n]).to_owned(),
            result.x.slice(s![n..n + m]).to_owned(),
        );
        let game_price = game.strategy_payoff(&strategy);
        let Strategy(first, second) = strategy;

        Ok(NonZeroSumGame {
            actions: (first_actions, second_actions),
            game,
            optimal_policy: (MixedStrategy::new(first)?, MixedStrategy::new(second)?),
            game_price,
            convergence: result.convergence,
        })
    }

    /// `G·z >= 0` bounds α and β by the payoff of every pure deviation, `A·z = 1`
    /// makes both strategies sum to one.
    fn constraints(game: &BimatrixGame) -> LinearConstraints {
        let (n, m) = game.num_strategies();
        let vars_count = n + m + 2;

        let mut g = Array2::zeros((n + m, vars_count));
        g.slice_mut(s![..n, n..n + m])
            .assign(&-game.payoff_matrix(0));
        g.slice_mut(s![..n, n + m]).fill(1.);
        g.slice_mut(s![n.., ..n])
            .assign(&game.payoff_matrix(1).t().mapv(|v| -v));
        g.slice_mut(s![n.., n + m + 1]).fill(1.);

        let mut a = Array2::zeros((2, vars_count));
        a.slice_mut(s![0, ..n]).fill(1.);
        a.slice_mut(s![1, n..n + m]).fill(1.);

        let mut bounds = vec![Bound::NON_NEGATIVE; n + m];
        bounds.extend([Bound::FREE, Bound::FREE]);

        LinearConstraints::new(g, Array1::zeros(n + m), a, Array1::ones(2), bounds)
    }

    /// Random strategies, with α and β scaled by the sum of all payoffs.
    fn initial_point<R: Rng + ?Sized>(total_payoff: &Array2<f64>, rng: &mut R) -> Array1<f64> {
        let (n, m) = total_payoff.dim();
        let mut x0: Array1<f64> = Array::random_using(n + m + 2, Uniform::new(0., 1.), rng);

        let (first, second) = x0.multi_slice_mut((s![..n], s![n..n + m]));
        for mut probabilities in [first, second] {
            let sum = probabilities.sum();
            if sum > 0. {
                probabilities /= sum;
            } else {
                probabilities.fill(1. / probabilities.len() as f64);
            }
        }
        let scale = total_payoff.sum();
        x0.slice_mut(s![n + m..]).mapv_inplace(|v| v * scale);
        x0
    }

    pub fn first_actions(&self) -> &ActionSet<A> {
        &self.actions.0
    }

    pub fn second_actions(&self) -> &ActionSet<B> {
        &self.actions.1
    }

    /// Strategies of the first and second player.
    pub fn optimal_policy(&self) -> (&Array1<f64>, &Array1<f64>) {
        (
            self.optimal_policy.0.probabilities(),
            self.optimal_policy.1.probabilities(),
        )
    }

    /// Expected payoff of each player under [`NonZeroSumGame::optimal_policy`].
    pub fn game_price(&self) -> (f64, f64) {
        self.game_price
    }

    pub fn convergence(&self) -> Convergence {
        self.convergence
    }

    /// Gain each player could get by deviating to their best pure response.
    pub fn regret(&self) -> (f64, f64) {
        self.game.regret(&self.strategy())
    }

    pub fn is_equilibrium(&self, tolerance: f64) -> bool {
        self.game.is_ne(&self.strategy(), tolerance)
    }

    fn strategy(&self) -> Strategy {
        let (first, second) = self.optimal_policy();
        Strategy(first.clone(), second.clone())
    }

    /// Index of an action of `player` (1 or 2) sampled from their strategy.
    pub fn gen_action<R: Rng + ?Sized>(&self, player: usize, rng: &mut R) -> usize {
        assert!(player == 1 || player == 2, "Player must be 1 or 2, got {player}.");
        if player == 1 {
            self.optimal_policy.0.sample(rng)
        } else {
            self.optimal_policy.1.sample(rng)
        }
    }

    pub fn gen_first_action<R: Rng + ?Sized>(&self, rng: &mut R) -> &A {
        &self.actions.0[self.gen_action(1, rng)]
    }

    pub fn gen_second_action<R: Rng + ?Sized>(&self, rng: &mut R) -> &B {
        &self.actions.1[self.gen_action(2, rng)]
    }
}
