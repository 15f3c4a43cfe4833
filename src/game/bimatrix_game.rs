use ndarray::prelude::*;

use super::{ActionSet, GameError, payoff_bimatrix};

/// Two-player game in normal form. Entry `[i, j]` of each matrix is the payoff when
/// the first player picks action `i` and the second action `j`.
#[derive(Debug, Clone)]
pub struct BimatrixGame {
    payoff: (Array2<f64>, Array2<f64>),
}

/// One mixed strategy per player.
#[derive(Debug, Clone)]
pub struct Strategy(pub Array1<f64>, pub Array1<f64>);

impl BimatrixGame {
    pub fn new(p1: Array2<f64>, p2: Array2<f64>) -> Self {
        if p1.shape() != p2.shape() {
            panic!("Payoff matrices must have same size.");
        }
        BimatrixGame { payoff: (p1, p2) }
    }

    pub fn from_oracle<A, B, F>(
        get_score: F,
        first_actions: &ActionSet<A>,
        second_actions: &ActionSet<B>,
    ) -> Result<Self, GameError>
    where
        F: Fn(&A, &B) -> (f64, f64),
    {
        let (p1, p2) = payoff_bimatrix(get_score, first_actions, second_actions)?;
        Ok(BimatrixGame::new(p1, p2))
    }

    pub fn num_strategies(&self) -> (usize, usize) {
        self.payoff.0.dim()
    }

    pub fn payoff_matrix(&self, player: usize) -> &Array2<f64> {
        if player == 0 {
            &self.payoff.0
        } else {
            &self.payoff.1
        }
    }

    /// Sum of both payoff matrices.
    pub fn total_payoff(&self) -> Array2<f64> {
        &self.payoff.0 + &self.payoff.1
    }

    /// Expected payoff of each player, `xᵀ·P·y`.
    pub fn strategy_payoff(&self, strategy: &Strategy) -> (f64, f64) {
        let payoff0 = strategy.0.dot(&self.payoff.0.dot(&strategy.1));
        let payoff1 = strategy.0.dot(&self.payoff.1.dot(&strategy.1));

        (payoff0, payoff1)
    }

    /// How much each player could gain by switching to their best pure response.
    pub fn regret(&self, strategy: &Strategy) -> (f64, f64) {
        let strategy_payoff = self.strategy_payoff(strategy);
        let payoff0 = self.payoff.0.dot(&strategy.1);
        let payoff1 = strategy.0.dot(&self.payoff.1);

        let max_payoff0 = payoff0.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let max_payoff1 = payoff1.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        (
            max_payoff0 - strategy_payoff.0,
            max_payoff1 - strategy_payoff.1,
        )
    }

    pub fn is_ne(&self, strategy: &Strategy, tolerance: f64) -> bool {
        let r = self.regret(strategy);

        r.0 < tolerance && r.1 < tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    #[should_panic]
    fn bimatrixgame_new() {
        let a = array![[2., 1.], [1., 2.]];
        let b = array![[2., 1.], [1., 2.], [3., 4.]];

        let _game = BimatrixGame::new(a, b);
    }

    #[test]
    fn from_oracle() {
        let first = ActionSet::new(vec!["opera", "football"]).unwrap();
        let second = ActionSet::new(vec!["opera", "football", "home"]).unwrap();
        let game = BimatrixGame::from_oracle(
            |a, b| if a == b { (2., 1.) } else { (0., 0.) },
            &first,
            &second,
        )
        .unwrap();

        assert_eq!(game.num_strategies(), (2, 3));
        assert_eq!(game.payoff_matrix(0), &array![[2., 0., 0.], [0., 2., 0.]]);
        assert_eq!(game.total_payoff(), array![[3., 0., 0.], [0., 3., 0.]]);
    }

    #[test]
    fn regret() {
        let a = array![[1. / 3., 0.], [1., 1.]];
        let b = array![[1. / 3., 1.], [0., 1.]];
        let game = BimatrixGame::new(a, b);

        let s = Strategy(array![0., 1.], array![0., 1.]);

        assert!(game.is_ne(&s, 1e-9));

        let r = Strategy(array![0., 1.], array![0.5, 0.5]);
        assert_eq!(game.regret(&r), (0., 0.5));
    }

    #[test]
    fn mixed_equilibrium_payoff() {
        let a = array![[2., -1.], [-1., 1.]];
        let b = array![[1., -1.], [-1., 2.]];
        let game = BimatrixGame::new(a, b);

        let s = Strategy(array![0.6, 0.4], array![0.4, 0.6]);
        let (payoff0, payoff1) = game.strategy_payoff(&s);

        assert!(game.is_ne(&s, 1e-9));
        assert_abs_diff_eq!(payoff0, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(payoff1, 0.2, epsilon = 1e-12);
    }
}
