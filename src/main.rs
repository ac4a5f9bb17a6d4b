use binpols::{Strategy, run_batched, run_sequential};
use noisy_float::prelude::*;
use rand::prelude::*;

fn main() -> Result<(), binpols::SimError> {
    let m = 100;
    let n = m * m;
    let repetitions = 5;
    let seed = 3;

    let beta_values = [0.25, 0.5, 0.75];
    let b_values = [m, 2 * m, 10 * m, 30 * m, 50 * m, 70 * m];
    let k_values = [1, 2];

    println!(
        "Bins: {}, Balls: {}, Repetitions: {}, Seed: {}",
        m, n, repetitions, seed
    );

    let mut strategies = vec![
        Strategy::OneChoice,
        Strategy::TwoChoice,
        Strategy::ThreeChoice,
    ];
    for beta in beta_values {
        strategies.push(Strategy::one_plus_beta(beta)?);
    }

    println!("Strategy; Gap at n=m; Final Gap; Peak Gap;");
    for strategy in &strategies {
        let mut reps = Vec::with_capacity(repetitions);
        for rep in 0..repetitions {
            let mut rng = StdRng::seed_from_u64(seed + rep as u64);
            reps.push(run_sequential(n, m, *strategy, &mut rng)?);
        }
        let mean = mean_over_reps(&reps);
        println!(
            "{}; {}; {}; {};",
            label(strategy),
            mean[m - 1],
            mean[n - 1],
            peak(&mean)
        );
    }

    println!("Batch; Budget; Final Gap; Peak Gap (smoothed);");
    for b in b_values {
        for k in k_values {
            let strategy = Strategy::with_query_budget(k)?;
            let mut reps = Vec::with_capacity(repetitions);
            for rep in 0..repetitions {
                let mut rng = StdRng::seed_from_u64(seed + rep as u64);
                reps.push(run_batched(n, m, b, strategy, &mut rng)?);
            }
            let mean = mean_over_reps(&reps);
            let smoothed = smooth_data(&mean, 10);
            println!(
                "{}; {}; {}; {};",
                b,
                k,
                mean[mean.len() - 1],
                peak(&smoothed)
            );
        }
    }
    Ok(())
}

fn label(strategy: &Strategy) -> String {
    match strategy {
        Strategy::OneBetaChoice { beta } => format!("{}_beta={}", strategy.name(), beta),
        Strategy::QueryResolution { k } => format!("{}_k={}", strategy.name(), k),
        other => other.name().to_string(),
    }
}

// elementwise mean across repetitions; all runs share one sample count
fn mean_over_reps(reps: &[Vec<f64>]) -> Vec<f64> {
    let len = reps[0].len();
    let mut mean = vec![0.0; len];
    for rep in reps {
        for (acc, g) in mean.iter_mut().zip(rep) {
            *acc += g;
        }
    }
    mean.iter_mut().for_each(|g| *g /= reps.len() as f64);
    mean
}

// width-w moving average, len - w + 1 points; short inputs pass through
fn smooth_data(data: &[f64], window: usize) -> Vec<f64> {
    if data.len() < window {
        return data.to_vec();
    }
    data.windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .collect()
}

fn peak(gaps: &[f64]) -> f64 {
    gaps.iter()
        .copied()
        .max_by_key(|g| n64(*g))
        .unwrap_or(0.0)
}
