use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use nashsolver::{
    ActionSet, NonZeroSumGame, ZeroSumGame,
    classic::{Venue, battle_of_the_sexes},
};
use ndarray::Array2;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn random_table(n: usize, m: usize, rng: &mut StdRng) -> Array2<f64> {
    Array2::random_using((n, m), Uniform::new(-10., 10.), rng)
}

fn bench_zero_sum(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1337);
    c.bench_function("zero_sum_20x20", |b| {
        b.iter_batched(
            || random_table(20, 20, &mut rng),
            |table| {
                let actions = ActionSet::new((0..20).collect::<Vec<usize>>()).unwrap();
                ZeroSumGame::new(|&i: &usize, &j: &usize| table[[i, j]], actions.clone(), &actions)
                    .unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_general_sum(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1337);
    c.bench_function("battle_of_the_sexes", |b| {
        b.iter(|| {
            let actions = ActionSet::new(Venue::ALL.to_vec()).unwrap();
            NonZeroSumGame::new(battle_of_the_sexes, actions.clone(), actions, &mut rng).unwrap()
        })
    });

    c.bench_function("general_sum_8x8", |b| {
        b.iter_batched(
            || (random_table(8, 8, &mut rng), random_table(8, 8, &mut rng)),
            |(first, second)| {
                let actions = ActionSet::new((0..8).collect::<Vec<usize>>()).unwrap();
                let mut rng = StdRng::seed_from_u64(7);
                NonZeroSumGame::new(
                    |&i: &usize, &j: &usize| (first[[i, j]], second[[i, j]]),
                    actions.clone(),
                    actions,
                    &mut rng,
                )
                .unwrap()
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_zero_sum, bench_general_sum);
criterion_main!(benches);
