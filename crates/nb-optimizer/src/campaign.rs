//! Campaign tracking: the propose / evaluate / append loop.

use chrono::{DateTime, Utc};
use nb_types::{config_error, Bounds, InputError, NbError, NbResult, ObservationSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::proposer::{search, ProposerConfig};

/// Unique campaign identifier.
pub type CampaignId = Uuid;

/// Top-level configuration for a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub id: CampaignId,
    pub name: String,

    /// Search parameters handed to every proposal.
    pub proposer: ProposerConfig,

    /// Search box; `None` means the unit box.
    pub bounds: Option<Bounds>,

    /// Number of propose/evaluate rounds in [`Campaign::run`].
    pub max_rounds: usize,

    /// Generator seed. `None` seeds from the thread-local generator.
    pub seed: Option<u64>,

    pub created_at: DateTime<Utc>,
}

impl CampaignConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            proposer: ProposerConfig::default(),
            bounds: None,
            max_rounds: 10,
            seed: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_rounds(mut self, n: usize) -> Self {
        self.max_rounds = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_proposer(mut self, proposer: ProposerConfig) -> Self {
        self.proposer = proposer;
        self
    }

    pub fn validate(&self) -> NbResult<()> {
        if self.max_rounds == 0 {
            return Err(config_error!("campaign '{}' needs at least one round", self.name));
        }
        self.proposer
            .validate()
            .map_err(|e| config_error!("campaign '{}': {}", self.name, e))
    }
}

/// Lifecycle state for a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// One propose/evaluate round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 0-indexed round number.
    pub round: usize,
    pub point: Vec<f64>,
    pub value: f64,
    /// Acquisition score the proposer assigned to `point`.
    pub acquisition: f64,
    /// Whether `value` beat every earlier observation.
    pub improved: bool,
    pub evaluated_at: DateTime<Utc>,
}

/// Aggregate view of a campaign, suitable for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub id: CampaignId,
    pub name: String,
    pub state: CampaignState,
    pub rounds_completed: usize,
    pub observations: usize,
    pub best_point: Option<Vec<f64>>,
    pub best_value: Option<f64>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Owns the observation set and the generator across rounds.
#[derive(Debug, Clone)]
pub struct Campaign {
    config: CampaignConfig,
    observations: ObservationSet,
    rng: ChaCha8Rng,
    state: CampaignState,
    rounds: Vec<RoundRecord>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

impl Campaign {
    /// Start a campaign from `initial` observations (at least one is needed
    /// before the first round).
    pub fn new(config: CampaignConfig, initial: ObservationSet) -> NbResult<Self> {
        config.validate()?;
        if let (Some(bounds), Some(num_dim)) = (&config.bounds, initial.num_dim()) {
            bounds.check_dim(num_dim)?;
        }

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_rng(&mut rand::rng()),
        };

        Ok(Self {
            config,
            observations: initial,
            rng,
            state: CampaignState::Pending,
            rounds: Vec::new(),
            started_at: None,
            finished_at: None,
            error: None,
        })
    }

    pub fn observations(&self) -> &ObservationSet {
        &self.observations
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    pub fn state(&self) -> CampaignState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Best observation so far, initial observations included.
    pub fn best(&self) -> Option<(&[f64], f64)> {
        self.observations.best()
    }

    /// Run a single round: propose, evaluate `objective`, append.
    pub fn step<F>(&mut self, objective: &mut F) -> NbResult<&RoundRecord>
    where
        F: FnMut(&[f64]) -> f64,
    {
        match self.state {
            CampaignState::Pending => self.mark_running(),
            CampaignState::Running => {}
            CampaignState::Completed | CampaignState::Failed => {
                return Err(config_error!(
                    "campaign '{}' is {:?} and cannot run more rounds",
                    self.config.name,
                    self.state
                ));
            }
        }

        let proposal = match search(
            &self.observations,
            self.config.bounds.as_ref(),
            &self.config.proposer,
            &mut self.rng,
        ) {
            Ok(p) => p,
            Err(e) => return Err(self.fail(e)),
        };

        let value = objective(&proposal.point);
        if !value.is_finite() {
            warn!(
                "Campaign '{}' round {}: objective returned {} at {:?}",
                self.config.name,
                self.rounds.len(),
                value,
                proposal.point
            );
            return Err(self.fail(
                InputError::NonFiniteObjective {
                    point: proposal.point,
                    value,
                }
                .into(),
            ));
        }

        let improved = self.best().map_or(true, |(_, best)| value > best);
        if let Err(e) = self.observations.push(proposal.point.clone(), value) {
            return Err(self.fail(e));
        }

        let record = RoundRecord {
            round: self.rounds.len(),
            point: proposal.point,
            value,
            acquisition: proposal.score,
            improved,
            evaluated_at: Utc::now(),
        };
        info!(
            "Campaign '{}' round {}: f({:?}) = {}{}",
            self.config.name,
            record.round,
            record.point,
            record.value,
            if improved { " (new best)" } else { "" }
        );
        self.rounds.push(record);

        Ok(&self.rounds[self.rounds.len() - 1])
    }

    /// Run the remaining rounds up to `max_rounds`.
    pub fn run<F>(&mut self, mut objective: F) -> NbResult<CampaignSummary>
    where
        F: FnMut(&[f64]) -> f64,
    {
        while self.rounds.len() < self.config.max_rounds {
            self.step(&mut objective)?;
        }
        self.mark_completed();

        if let Some((point, value)) = self.best() {
            info!(
                "Campaign '{}' completed after {} rounds: best f({:?}) = {}",
                self.config.name,
                self.rounds.len(),
                point,
                value
            );
        }
        Ok(self.summary())
    }

    pub fn summary(&self) -> CampaignSummary {
        let best = self.best();
        CampaignSummary {
            id: self.config.id,
            name: self.config.name.clone(),
            state: self.state,
            rounds_completed: self.rounds.len(),
            observations: self.observations.len(),
            best_point: best.map(|(p, _)| p.to_vec()),
            best_value: best.map(|(_, v)| v),
            started_at: self.started_at,
            finished_at: self.finished_at,
            error: self.error.clone(),
        }
    }

    fn mark_running(&mut self) {
        self.state = CampaignState::Running;
        self.started_at = Some(Utc::now());
    }

    fn mark_completed(&mut self) {
        self.state = CampaignState::Completed;
        self.finished_at = Some(Utc::now());
    }

    fn fail(&mut self, error: NbError) -> NbError {
        self.state = CampaignState::Failed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error.to_string());
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(x: &[f64]) -> f64 {
        -x.iter().map(|v| (v - 0.3333) * (v - 0.3333)).sum::<f64>()
    }

    fn start_at_half(num_dim: usize) -> ObservationSet {
        let x0 = vec![0.5; num_dim];
        let y0 = quadratic(&x0);
        ObservationSet::from_parts(vec![x0], vec![y0]).unwrap()
    }

    #[test]
    fn converges_in_one_dimension() {
        let config = CampaignConfig::new("quadratic_1d").with_rounds(10).with_seed(7);
        let mut campaign = Campaign::new(config, start_at_half(1)).unwrap();

        let summary = campaign.run(quadratic).unwrap();
        assert_eq!(summary.state, CampaignState::Completed);
        assert_eq!(summary.rounds_completed, 10);
        assert_eq!(summary.observations, 11);
        let best = summary.best_value.unwrap();
        assert!(best > -0.01, "best value {best}");
    }

    #[test]
    fn converges_in_two_dimensions() {
        let config = CampaignConfig::new("quadratic_2d").with_rounds(40).with_seed(7);
        let mut campaign = Campaign::new(config, start_at_half(2)).unwrap();

        let summary = campaign.run(quadratic).unwrap();
        let best = summary.best_value.unwrap();
        assert!(best > -0.01, "best value {best}");
    }

    #[test]
    fn campaign_lifecycle() {
        let config = CampaignConfig::new("lifecycle").with_rounds(3).with_seed(1);
        let mut campaign = Campaign::new(config, start_at_half(1)).unwrap();
        assert_eq!(campaign.state(), CampaignState::Pending);
        assert!(campaign.summary().started_at.is_none());

        let mut objective = quadratic;
        let record = campaign.step(&mut objective).unwrap().clone();
        assert_eq!(record.round, 0);
        assert_eq!(record.value, quadratic(&record.point));
        assert_eq!(campaign.state(), CampaignState::Running);

        let summary = campaign.run(quadratic).unwrap();
        assert_eq!(summary.rounds_completed, 3);
        assert!(summary.finished_at.is_some());

        // A completed campaign refuses further rounds.
        assert!(matches!(
            campaign.step(&mut objective),
            Err(NbError::Config(_))
        ));
    }

    #[test]
    fn improved_flag_tracks_best() {
        let config = CampaignConfig::new("improved").with_rounds(15).with_seed(2);
        let initial = start_at_half(1);
        let mut best = initial.values()[0];
        let mut campaign = Campaign::new(config, initial).unwrap();
        campaign.run(quadratic).unwrap();

        for record in campaign.rounds() {
            assert_eq!(record.improved, record.value > best);
            best = best.max(record.value);
        }
        assert_eq!(campaign.best().unwrap().1, best);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let run = || {
            let config = CampaignConfig::new("repro").with_rounds(5).with_seed(99);
            let mut campaign = Campaign::new(config, start_at_half(2)).unwrap();
            campaign.run(quadratic).unwrap();
            campaign.observations().clone()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn rounds_respect_bounds() {
        let bounds = Bounds::new(vec![0.2, 0.4], vec![0.3, 0.45]).unwrap();
        let config = CampaignConfig::new("boxed")
            .with_rounds(8)
            .with_seed(4)
            .with_bounds(bounds.clone());
        let mut campaign = Campaign::new(config, start_at_half(2)).unwrap();
        campaign.run(quadratic).unwrap();

        for record in campaign.rounds() {
            assert!(bounds.contains(&record.point), "{:?}", record.point);
        }
    }

    #[test]
    fn empty_start_fails_campaign() {
        let config = CampaignConfig::new("empty").with_seed(0);
        let mut campaign = Campaign::new(config, ObservationSet::new()).unwrap();

        let err = campaign.run(quadratic).unwrap_err();
        assert!(err.is_invalid_input());
        assert_eq!(campaign.state(), CampaignState::Failed);
        assert!(campaign.error().unwrap().contains("empty"));
        assert!(campaign.rounds().is_empty());
    }

    #[test]
    fn non_finite_objective_fails_campaign() {
        let config = CampaignConfig::new("nan").with_seed(0);
        let mut campaign = Campaign::new(config, start_at_half(1)).unwrap();

        let err = campaign.run(|_: &[f64]| f64::NAN).unwrap_err();
        assert!(matches!(
            err,
            NbError::InvalidInput(InputError::NonFiniteObjective { .. })
        ));
        assert_eq!(campaign.state(), CampaignState::Failed);
        assert_eq!(campaign.observations().len(), 1);
    }

    #[test]
    fn invalid_config_rejected() {
        let zero_rounds = CampaignConfig::new("zero").with_rounds(0);
        assert!(matches!(
            Campaign::new(zero_rounds, start_at_half(1)),
            Err(NbError::Config(_))
        ));

        let bad_step = CampaignConfig::new("bad_step")
            .with_proposer(ProposerConfig::new().with_eps(f64::INFINITY));
        assert!(Campaign::new(bad_step, start_at_half(1)).is_err());

        let mismatched = CampaignConfig::new("mismatch").with_bounds(Bounds::unit(3));
        assert!(Campaign::new(mismatched, start_at_half(2))
            .unwrap_err()
            .is_invalid_input());
    }

    #[test]
    fn config_round_trip() {
        let config = CampaignConfig::new("json")
            .with_rounds(25)
            .with_seed(123)
            .with_bounds(Bounds::new(vec![-1.0], vec![1.0]).unwrap());

        let json = serde_json::to_string(&config).unwrap();
        let back: CampaignConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
