//! # nb-optimizer
//!
//! Sequential single-point Bayesian optimization over a box.
//!
//! Provides a one-nearest-neighbor surrogate, a damped UCB acquisition, a
//! greedy hill-climb proposer that maximizes it, and a campaign driver that
//! alternates proposals with objective evaluations.

mod acquisition;
mod campaign;
mod proposer;
mod surrogate;

pub use acquisition::{upper_confidence_bound, EXPLORATION_WEIGHT};
pub use campaign::{
    Campaign, CampaignConfig, CampaignId, CampaignState, CampaignSummary, RoundRecord,
};
pub use proposer::{
    propose, propose_with_thread_rng, search, standardize, Proposal, ProposerConfig, STD_EPSILON,
};
pub use surrogate::{NearestNeighborSurrogate, Prediction};
