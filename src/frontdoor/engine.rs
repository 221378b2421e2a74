//! Trust decision engine.
//!
//! # State Machine
//! ```text
//! Start
//!   → probe marked?
//!       MalformedProbe      → Reject
//!       ValidProbeCandidate → strategy.admit → Accept(rewrite = strategy's probe front end)
//!   → not a probe           → strategy.admit → Accept(no rewrite)
//! ```
//!
//! # Design Decisions
//! - Probe checks always run before any forwarded-host adoption
//! - The rewrite is the engine's only side effect, applied by `screen`
//! - Adoption and host filtering live in their own stages

use std::sync::Arc;

use axum::http::{HeaderMap, Uri};

use crate::frontdoor::decision::{Decision, Rejection};
use crate::frontdoor::probe::{classify, ProbeClass};
use crate::frontdoor::settings::FrontDoorSettings;
use crate::frontdoor::signals::{InboundSignals, X_FORWARDED_HOST};
use crate::frontdoor::strategy::{self, TrustStrategy};

/// Composes probe classification and the trust strategy into one decision.
#[derive(Debug)]
pub struct TrustEngine {
    settings: Arc<FrontDoorSettings>,
    strategy: Box<dyn TrustStrategy>,
}

impl TrustEngine {
    /// Create an engine with the strategy selected by `settings`.
    pub fn new(settings: Arc<FrontDoorSettings>) -> Self {
        let strategy = strategy::from_settings(&settings);
        Self::with_strategy(settings, strategy)
    }

    pub fn with_strategy(settings: Arc<FrontDoorSettings>, strategy: Box<dyn TrustStrategy>) -> Self {
        Self { settings, strategy }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn strategy(&self) -> &dyn TrustStrategy {
        self.strategy.as_ref()
    }

    /// Decide what to do with a request.
    pub fn decide(&self, signals: &InboundSignals) -> Decision {
        let rewrite = match classify(signals, self.settings.health_probe_path()) {
            ProbeClass::Malformed(reason) => return Decision::Reject(reason.into()),
            ProbeClass::ValidProbeCandidate => self.strategy.probe_front_end().cloned(),
            ProbeClass::NotAProbe => None,
        };

        match self.strategy.admit(signals) {
            Ok(()) => Decision::Accept {
                forwarded_host_rewrite: rewrite,
            },
            Err(rejection) => Decision::Reject(rejection),
        }
    }

    /// Inspect the request, decide, and apply any forwarded-host rewrite.
    pub fn screen(&self, headers: &mut HeaderMap, uri: &Uri) -> Result<(), Rejection> {
        let signals = InboundSignals::inspect(headers, uri);
        match self.decide(&signals) {
            Decision::Accept {
                forwarded_host_rewrite,
            } => {
                if let Some(host) = forwarded_host_rewrite {
                    headers.insert(X_FORWARDED_HOST, host);
                }
                Ok(())
            }
            Decision::Reject(rejection) => Err(rejection),
        }
    }
}
