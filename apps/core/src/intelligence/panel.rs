//! Holder for the latest signals/briefing, guarded by generation counters.
//!
//! Switching companies fires a new request while the previous one may
//! still be in flight. There is no cancellation; instead each request
//! captures a token from a monotonic counter and a completion is applied
//! only if its token is still current, so a superseded response finishes
//! quietly and is discarded.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::StoreResult;
use crate::models::application::JobApplication;
use crate::models::company::Company;

use super::{Briefing, CoachingPrompt, IntelligenceProvider, MarketSignal};

struct Slot<T> {
    value: Mutex<Option<T>>,
    error: Mutex<Option<String>>,
    generation: AtomicU64,
    settled_generation: AtomicU64,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            value: Mutex::new(None),
            error: Mutex::new(None),
            generation: AtomicU64::new(0),
            settled_generation: AtomicU64::new(0),
        }
    }

    /// Starts a request: bumps the generation and returns the new token.
    fn begin(&self) -> u64 {
        *self.error.lock() = None;
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies a completion only when its token is still current.
    fn settle(&self, token: u64, result: StoreResult<T>) {
        if self.generation.load(Ordering::SeqCst) != token {
            debug!("Discarding stale response (token {token})");
            return;
        }
        self.settled_generation.store(token, Ordering::SeqCst);
        match result {
            Ok(value) => *self.value.lock() = Some(value),
            Err(err) => {
                warn!("Intelligence request failed: {err}");
                *self.error.lock() = Some(err.to_string());
            }
        }
    }

    fn is_loading(&self) -> bool {
        self.generation.load(Ordering::SeqCst) != self.settled_generation.load(Ordering::SeqCst)
    }
}

pub struct IntelPanel {
    provider: Arc<dyn IntelligenceProvider>,
    signals: Slot<Vec<MarketSignal>>,
    briefing: Slot<Briefing>,
}

impl IntelPanel {
    pub fn new(provider: Arc<dyn IntelligenceProvider>) -> Self {
        Self {
            provider,
            signals: Slot::new(),
            briefing: Slot::new(),
        }
    }

    pub async fn load_signals(&self, company: &Company) {
        let token = self.signals.begin();
        let result = self.provider.market_signals(company).await;
        self.signals.settle(token, result);
    }

    pub async fn load_briefing(&self, application: &JobApplication, company: &Company) {
        let token = self.briefing.begin();
        let result = self.provider.briefing(application, company).await;
        self.briefing.settle(token, result);
    }

    /// One-shot; no panel state, so no generation guard.
    pub async fn coaching_prompts(
        &self,
        application: &JobApplication,
    ) -> StoreResult<Vec<CoachingPrompt>> {
        self.provider.coaching_prompts(application).await
    }

    pub fn signals(&self) -> Option<Vec<MarketSignal>> {
        self.signals.value.lock().clone()
    }

    pub fn signals_error(&self) -> Option<String> {
        self.signals.error.lock().clone()
    }

    pub fn signals_loading(&self) -> bool {
        self.signals.is_loading()
    }

    pub fn briefing(&self) -> Option<Briefing> {
        self.briefing.value.lock().clone()
    }

    pub fn briefing_error(&self) -> Option<String> {
        self.briefing.error.lock().clone()
    }

    pub fn briefing_loading(&self) -> bool {
        self.briefing.is_loading()
    }

    pub fn clear(&self) {
        *self.signals.value.lock() = None;
        *self.briefing.value.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::models::company::CompanyTier;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;
    use uuid::Uuid;

    fn company(name: &str) -> Company {
        Company {
            id: Uuid::new_v4(),
            name: name.to_string(),
            website: None,
            address: None,
            industry: None,
            tech_stack: Vec::new(),
            tier: CompanyTier::Tier2,
            total_applications: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn signal(headline: &str) -> MarketSignal {
        MarketSignal {
            kind: super::super::SignalKind::Hiring,
            headline: headline.to_string(),
            detail: String::new(),
        }
    }

    /// Completes each `market_signals` call only when the test fires the
    /// matching oneshot, letting tests interleave in-flight requests.
    struct ScriptedProvider {
        pending: Mutex<VecDeque<oneshot::Receiver<StoreResult<Vec<MarketSignal>>>>>,
    }

    impl ScriptedProvider {
        fn with_calls(n: usize) -> (Arc<Self>, Vec<oneshot::Sender<StoreResult<Vec<MarketSignal>>>>) {
            let mut senders = Vec::new();
            let mut receivers = VecDeque::new();
            for _ in 0..n {
                let (tx, rx) = oneshot::channel();
                senders.push(tx);
                receivers.push_back(rx);
            }
            (
                Arc::new(Self {
                    pending: Mutex::new(receivers),
                }),
                senders,
            )
        }
    }

    #[async_trait]
    impl IntelligenceProvider for ScriptedProvider {
        async fn market_signals(&self, _company: &Company) -> StoreResult<Vec<MarketSignal>> {
            let rx = self
                .pending
                .lock()
                .pop_front()
                .expect("unexpected market_signals call");
            rx.await.expect("test dropped the sender")
        }

        async fn briefing(
            &self,
            _application: &JobApplication,
            _company: &Company,
        ) -> StoreResult<Briefing> {
            unimplemented!("not scripted")
        }

        async fn coaching_prompts(
            &self,
            _application: &JobApplication,
        ) -> StoreResult<Vec<CoachingPrompt>> {
            unimplemented!("not scripted")
        }
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let (provider, mut senders) = ScriptedProvider::with_calls(2);
        let panel = Arc::new(IntelPanel::new(provider));

        let p = panel.clone();
        let first_company = company("First");
        let first = tokio::spawn(async move { p.load_signals(&first_company).await });
        tokio::task::yield_now().await;

        let p = panel.clone();
        let second_company = company("Second");
        let second = tokio::spawn(async move { p.load_signals(&second_company).await });
        tokio::task::yield_now().await;

        // The newer request completes first and lands.
        senders
            .pop()
            .unwrap()
            .send(Ok(vec![signal("second")]))
            .unwrap();
        second.await.unwrap();
        assert_eq!(panel.signals().unwrap()[0].headline, "second");

        // The superseded request completes late; its result is dropped.
        senders
            .pop()
            .unwrap()
            .send(Ok(vec![signal("first")]))
            .unwrap();
        first.await.unwrap();
        assert_eq!(panel.signals().unwrap()[0].headline, "second");
    }

    #[tokio::test]
    async fn test_loading_clears_only_when_current_request_settles() {
        let (provider, mut senders) = ScriptedProvider::with_calls(2);
        let panel = Arc::new(IntelPanel::new(provider));

        let p = panel.clone();
        let c = company("First");
        let first = tokio::spawn(async move { p.load_signals(&c).await });
        tokio::task::yield_now().await;
        assert!(panel.signals_loading());

        let p = panel.clone();
        let c = company("Second");
        let second = tokio::spawn(async move { p.load_signals(&c).await });
        tokio::task::yield_now().await;

        // The stale completion does not clear the flag.
        let second_tx = senders.pop().unwrap();
        senders.pop().unwrap().send(Ok(vec![signal("first")])).unwrap();
        first.await.unwrap();
        assert!(panel.signals_loading());

        second_tx.send(Ok(vec![signal("second")])).unwrap();
        second.await.unwrap();
        assert!(!panel.signals_loading());
    }

    #[tokio::test]
    async fn test_error_is_recorded_when_current() {
        let (provider, mut senders) = ScriptedProvider::with_calls(1);
        let panel = Arc::new(IntelPanel::new(provider));

        let p = panel.clone();
        let c = company("Only");
        let task = tokio::spawn(async move { p.load_signals(&c).await });
        tokio::task::yield_now().await;

        senders
            .pop()
            .unwrap()
            .send(Err(StoreError::Transport("down".to_string())))
            .unwrap();
        task.await.unwrap();

        assert!(panel.signals().is_none());
        assert!(panel.signals_error().unwrap().contains("down"));
        assert!(!panel.signals_loading());
    }
}
