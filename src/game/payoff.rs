use ndarray::prelude::*;

use super::{ActionSet, GameError};

/// Evaluates `get_score` on every pair of actions. Entry `[i, j]` is the score when
/// the first player picks `first_actions[i]` and the second `second_actions[j]`.
pub fn payoff_matrix<A, B, F>(
    get_score: F,
    first_actions: &ActionSet<A>,
    second_actions: &ActionSet<B>,
) -> Result<Array2<f64>, GameError>
where
    F: Fn(&A, &B) -> f64,
{
    let matrix = Array2::from_shape_fn(
        (first_actions.len(), second_actions.len()),
        |(i, j)| get_score(&first_actions[i], &second_actions[j]),
    );
    check_finite(&matrix)?;
    Ok(matrix)
}

/// Like [`payoff_matrix`] for oracles returning one score per player.
pub fn payoff_bimatrix<A, B, F>(
    get_score: F,
    first_actions: &ActionSet<A>,
    second_actions: &ActionSet<B>,
) -> Result<(Array2<f64>, Array2<f64>), GameError>
where
    F: Fn(&A, &B) -> (f64, f64),
{
    let shape = (first_actions.len(), second_actions.len());
    let mut first = Array2::zeros(shape);
    let mut second = Array2::zeros(shape);
    for (i, a) in first_actions.iter().enumerate() {
        for (j, b) in second_actions.iter().enumerate() {
            (first[[i, j]], second[[i, j]]) = get_score(a, b);
        }
    }
    check_finite(&first)?;
    check_finite(&second)?;
    Ok((first, second))
}

fn check_finite(matrix: &Array2<f64>) -> Result<(), GameError> {
    match matrix.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((i, j), _)) => Err(GameError::NonFinitePayoff(i, j)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_layout() {
        let first = ActionSet::new(vec![1., 2., 3.]).unwrap();
        let second = ActionSet::new(vec![10., 20.]).unwrap();

        let matrix = payoff_matrix(|a, b| a * b, &first, &second).unwrap();

        assert_eq!(matrix, array![[10., 20.], [20., 40.], [30., 60.]]);
    }

    #[test]
    fn bimatrix_layout() {
        let first = ActionSet::new(vec![0, 1]).unwrap();
        let second = ActionSet::new(vec![0, 1, 2]).unwrap();

        let (p1, p2) =
            payoff_bimatrix(|&a, &b| (a as f64, b as f64), &first, &second).unwrap();

        assert_eq!(p1, array![[0., 0., 0.], [1., 1., 1.]]);
        assert_eq!(p2, array![[0., 1., 2.], [0., 1., 2.]]);
    }

    #[test]
    fn non_finite_payoff() {
        let first = ActionSet::new(vec![1., 2.]).unwrap();
        let second = ActionSet::new(vec![1., 0.]).unwrap();

        let result = payoff_matrix(|a, b| a / b, &first, &second);

        assert!(matches!(result, Err(GameError::NonFinitePayoff(0, 1))));
    }
}
