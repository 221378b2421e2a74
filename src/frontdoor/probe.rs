//! Health probe classification.
//!
//! Edge probes come from the edge's internal probing subsystem, not through
//! the edge's forwarding path, so a legitimate probe never carries a
//! forwarded-host claim and only ever hits the configured probe path.

use thiserror::Error;

use crate::frontdoor::signals::InboundSignals;

/// Why a probe-marked request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedProbe {
    #[error("probe targeted a path other than the configured probe path")]
    UnexpectedPath,
    #[error("probe carried a forwarded-host claim")]
    ForwardedHostPresent,
}

impl MalformedProbe {
    /// Metric/log label.
    pub fn label(&self) -> &'static str {
        match self {
            MalformedProbe::UnexpectedPath => "probe_path",
            MalformedProbe::ForwardedHostPresent => "probe_forwarded_host",
        }
    }
}

/// Outcome of probe classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeClass {
    NotAProbe,
    ValidProbeCandidate,
    Malformed(MalformedProbe),
}

/// Classify a request against the optional configured probe path.
pub fn classify(signals: &InboundSignals, probe_path: Option<&str>) -> ProbeClass {
    if !signals.probe_marked {
        return ProbeClass::NotAProbe;
    }

    if let Some(expected) = probe_path {
        if !signals.path.eq_ignore_ascii_case(expected) {
            return ProbeClass::Malformed(MalformedProbe::UnexpectedPath);
        }
    }

    if signals.forwarded_host_present {
        return ProbeClass::Malformed(MalformedProbe::ForwardedHostPresent);
    }

    ProbeClass::ValidProbeCandidate
}
