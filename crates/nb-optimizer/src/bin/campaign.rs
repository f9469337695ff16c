use anyhow::Context;
use nb_optimizer::{Campaign, CampaignConfig, ProposerConfig};
use nb_types::ObservationSet;
use tracing_subscriber::EnvFilter;

/// Benchmark objective with its maximum at 0.3333 in every dimension.
fn quadratic(x: &[f64]) -> f64 {
    -x.iter().map(|v| (v - 0.3333) * (v - 0.3333)).sum::<f64>()
}

fn env_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse().with_context(|| format!("invalid {name}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Warm-start observations from JSON, or a single point at the box center.
fn initial_observations(
    warm_start: Option<&str>,
    num_dim: usize,
) -> anyhow::Result<ObservationSet> {
    match warm_start {
        Some(json) => ObservationSet::from_json(json).context("invalid NB_OBSERVATIONS"),
        None => {
            let x0 = vec![0.5; num_dim];
            let y0 = quadratic(&x0);
            Ok(ObservationSet::from_parts(vec![x0], vec![y0])?)
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let num_dim: usize = env_or("NB_DIMENSIONS", 1)?;
    let rounds: usize = env_or("NB_ROUNDS", 10)?;
    let proposer = ProposerConfig::new()
        .with_eps(env_or("NB_EPS", 0.1)?)
        .with_iterations(env_or("NB_ITERATIONS", 1000)?);

    let mut config = CampaignConfig::new("quadratic")
        .with_rounds(rounds)
        .with_proposer(proposer);
    if let Ok(raw) = std::env::var("NB_SEED") {
        config = config.with_seed(raw.parse().with_context(|| format!("invalid NB_SEED: {raw:?}"))?);
    }

    let warm_start = std::env::var("NB_OBSERVATIONS").ok();
    let initial = initial_observations(warm_start.as_deref(), num_dim)?;

    let mut campaign = Campaign::new(config, initial)?;
    let summary = campaign.run(quadratic)?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_or_falls_back_and_parses() {
        std::env::remove_var("NB_TEST_UNSET_ROUNDS");
        assert_eq!(env_or("NB_TEST_UNSET_ROUNDS", 10usize).unwrap(), 10);

        std::env::set_var("NB_TEST_SET_EPS", "0.25");
        assert_eq!(env_or("NB_TEST_SET_EPS", 0.1f64).unwrap(), 0.25);
    }

    #[test]
    fn env_or_reports_bad_values() {
        std::env::set_var("NB_TEST_BAD_DIMENSIONS", "two");
        let err = env_or("NB_TEST_BAD_DIMENSIONS", 1usize).unwrap_err();
        assert!(err.to_string().contains("NB_TEST_BAD_DIMENSIONS"));
        assert!(err.to_string().contains("two"));
    }

    #[test]
    fn default_start_is_box_center() {
        let initial = initial_observations(None, 2).unwrap();
        assert_eq!(initial.points(), &[vec![0.5, 0.5]]);
        assert_eq!(initial.values(), &[quadratic(&[0.5, 0.5])]);
    }

    #[test]
    fn warm_start_from_json() {
        let json = r#"{"points": [[0.2], [0.9]], "values": [-0.02, -0.3]}"#;
        let initial = initial_observations(Some(json), 1).unwrap();
        assert_eq!(initial.len(), 2);
        assert_eq!(initial.best(), Some((&[0.2][..], -0.02)));

        let err = initial_observations(Some(r#"{"points": [[0.2]]}"#), 1).unwrap_err();
        assert!(err.to_string().contains("NB_OBSERVATIONS"));
    }
}
