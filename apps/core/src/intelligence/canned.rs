//! Canned intelligence provider: fixed artificial latency, deterministic
//! content derived from the input. A stand-in, not an analysis engine.

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::StoreResult;
use crate::models::application::JobApplication;
use crate::models::company::Company;

use super::{Briefing, CoachingPrompt, IntelligenceProvider, MarketSignal, SignalKind};

pub struct CannedIntelligence {
    delay: Duration,
}

impl CannedIntelligence {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Latency tuned to feel like a backend round trip in the UI.
    pub fn with_default_delay() -> Self {
        Self::new(Duration::from_millis(600))
    }
}

#[async_trait]
impl IntelligenceProvider for CannedIntelligence {
    async fn market_signals(&self, company: &Company) -> StoreResult<Vec<MarketSignal>> {
        tokio::time::sleep(self.delay).await;

        let mut signals = vec![MarketSignal {
            kind: SignalKind::Hiring,
            headline: format!("{} is growing its engineering org", company.name),
            detail: format!(
                "{} has open roles across several teams. A referral could move your application up.",
                company.name
            ),
        }];
        if let Some(industry) = &company.industry {
            signals.push(MarketSignal {
                kind: SignalKind::Product,
                headline: format!("Momentum in {industry}"),
                detail: format!(
                    "Companies in {industry} have been shipping fast this quarter. Expect product questions."
                ),
            });
        }
        if !company.tech_stack.is_empty() {
            signals.push(MarketSignal {
                kind: SignalKind::Culture,
                headline: "Stack alignment".to_string(),
                detail: format!(
                    "Their public stack mentions {}. Lead with your strongest overlap.",
                    company.tech_stack.join(", ")
                ),
            });
        }
        Ok(signals)
    }

    async fn briefing(
        &self,
        application: &JobApplication,
        company: &Company,
    ) -> StoreResult<Briefing> {
        tokio::time::sleep(self.delay).await;

        Ok(Briefing {
            company_overview: format!(
                "{} ({}). You applied for {} on {}.",
                company.name,
                company.industry.as_deref().unwrap_or("industry unknown"),
                application.role_title,
                application.applied_at.format("%Y-%m-%d"),
            ),
            talking_points: vec![
                format!("Why {} specifically, beyond the role", company.name),
                format!(
                    "A concrete story that maps your experience onto '{}'",
                    application.role_title
                ),
                "One thoughtful question about their roadmap".to_string(),
            ],
            likely_questions: vec![
                "Walk me through a recent project you led.".to_string(),
                format!("What draws you to {}?", company.name),
                "Where do you want to grow in the next two years?".to_string(),
            ],
        })
    }

    async fn coaching_prompts(
        &self,
        application: &JobApplication,
    ) -> StoreResult<Vec<CoachingPrompt>> {
        tokio::time::sleep(self.delay).await;

        let mut prompts = vec![CoachingPrompt {
            question: format!(
                "Describe the hardest problem you solved that is relevant to '{}'.",
                application.role_title
            ),
            hint: "Name the constraint, the decision, and the measurable outcome.".to_string(),
        }];
        for skill in application.skills.iter().take(2) {
            prompts.push(CoachingPrompt {
                question: format!("Tell me about a time {skill} made the difference."),
                hint: "One specific incident beats a survey of everything you know.".to_string(),
            });
        }
        Ok(prompts)
    }
}
