//! Company/application "intelligence": market signals, interview
//! briefings, coaching prompts.
//!
//! ARCHITECTURAL RULE: everything behind `IntelligenceProvider` is
//! presentation-grade content. The shipped implementation is a canned
//! fake with artificial latency; a real backend integration would be a
//! second implementation of the same trait, never a change to callers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::StoreResult;
use crate::models::application::JobApplication;
use crate::models::company::Company;

mod canned;
mod panel;

pub use canned::CannedIntelligence;
pub use panel::IntelPanel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Hiring,
    Funding,
    Product,
    Culture,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSignal {
    pub kind: SignalKind,
    pub headline: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Briefing {
    pub company_overview: String,
    pub talking_points: Vec<String>,
    pub likely_questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingPrompt {
    pub question: String,
    pub hint: String,
}

#[async_trait]
pub trait IntelligenceProvider: Send + Sync {
    async fn market_signals(&self, company: &Company) -> StoreResult<Vec<MarketSignal>>;

    async fn briefing(
        &self,
        application: &JobApplication,
        company: &Company,
    ) -> StoreResult<Briefing>;

    async fn coaching_prompts(&self, application: &JobApplication)
        -> StoreResult<Vec<CoachingPrompt>>;
}
