//! The assembled gate: screening, adoption and the final check over one set
//! of settings. The last two stages belong to the trust strategy.

use std::sync::Arc;

use axum::http::{HeaderMap, Uri};

use crate::frontdoor::decision::Rejection;
use crate::frontdoor::engine::TrustEngine;
use crate::frontdoor::forwarded::Adoption;
use crate::frontdoor::settings::FrontDoorSettings;

/// Shared, read-only gate. One instance serves every request.
#[derive(Debug)]
pub struct FrontDoorGate {
    settings: Arc<FrontDoorSettings>,
    engine: TrustEngine,
}

impl FrontDoorGate {
    pub fn new(settings: FrontDoorSettings) -> Self {
        let settings = Arc::new(settings);
        let engine = TrustEngine::new(settings.clone());
        Self { settings, engine }
    }

    pub fn settings(&self) -> &FrontDoorSettings {
        &self.settings
    }

    pub fn engine(&self) -> &TrustEngine {
        &self.engine
    }

    /// Stage 1: probe checks, strategy admission and probe rewrite.
    pub fn screen(&self, headers: &mut HeaderMap, uri: &Uri) -> Result<(), Rejection> {
        self.engine.screen(headers, uri)
    }

    /// Stage 2: forwarded-host adoption (host scheme only).
    pub fn adopt(&self, headers: &mut HeaderMap) -> Adoption {
        self.engine.strategy().adopt(headers)
    }

    /// Stage 3: final check (the host filter under the host scheme).
    pub fn filter(&self, headers: &HeaderMap, uri: &Uri) -> Result<(), Rejection> {
        self.engine.strategy().verify(headers, uri)
    }

    /// Run all three stages in order.
    pub fn process(&self, headers: &mut HeaderMap, uri: &Uri) -> Result<(), Rejection> {
        self.screen(headers, uri)?;
        self.adopt(headers);
        self.filter(headers, uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontdoor::allow_list::AllowList;
    use crate::frontdoor::probe::MalformedProbe;
    use axum::http::{header, HeaderValue};

    const PROBE_PATH: &str = "/HealthProbe";
    const BAD_PROBE_PATH: &str = "/PokeTheApp";

    fn gate() -> FrontDoorGate {
        FrontDoorGate::new(
            FrontDoorSettings::new(
                Some(AllowList::hosts(["my.front.door.net"]).unwrap()),
                Some(PROBE_PATH.to_string()),
                None,
            )
            .unwrap(),
        )
    }

    fn edge_id_gate() -> FrontDoorGate {
        FrontDoorGate::new(
            FrontDoorSettings::new(
                None,
                Some(PROBE_PATH.to_string()),
                Some(AllowList::identifiers(["abc-123"]).unwrap()),
            )
            .unwrap(),
        )
    }

    /// (forwarded host, declared host, probe path) → outcome.
    fn run(forwarded: Option<&str>, host: &str, probe_path: Option<&str>) -> (Result<(), Rejection>, HeaderMap) {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_str(host).unwrap());
        if let Some(forwarded) = forwarded {
            headers.insert("x-forwarded-host", HeaderValue::from_str(forwarded).unwrap());
        }
        let path = match probe_path {
            Some(path) => {
                headers.insert("x-fd-healthprobe", HeaderValue::from_static("1"));
                path
            }
            None => "/",
        };
        let uri: Uri = path.parse().unwrap();
        let outcome = gate().process(&mut headers, &uri);
        (outcome, headers)
    }

    #[test]
    fn test_happy_path() {
        let (outcome, headers) = run(Some("MY.Front.Door.net"), "MY.Front.Door.net", None);
        assert_eq!(outcome, Ok(()));
        assert_eq!(headers.get(header::HOST).unwrap(), "MY.Front.Door.net");
    }

    #[test]
    fn test_our_edge_probing() {
        let (outcome, headers) = run(None, "my.azurewebsite.net", Some(PROBE_PATH));
        assert_eq!(outcome, Ok(()));
        assert_eq!(headers.get(header::HOST).unwrap(), "my.front.door.net");
        assert_eq!(headers.get("x-original-host").unwrap(), "my.azurewebsite.net");
    }

    #[test]
    fn test_our_edge_probing_wrong_path() {
        let (outcome, _) = run(None, "my.azurewebsite.net", Some(BAD_PROBE_PATH));
        assert_eq!(outcome, Err(Rejection::MalformedProbe(MalformedProbe::UnexpectedPath)));
    }

    #[test]
    fn test_another_edge_accessing_backend() {
        let (outcome, _) = run(Some("spoof.front.door.net"), "my.azurewebsite.net", None);
        assert_eq!(outcome, Err(Rejection::UntrustedHost));
    }

    #[test]
    fn test_injected_probe_marker_through_our_edge() {
        for path in [PROBE_PATH, BAD_PROBE_PATH] {
            let (outcome, _) = run(Some("my.front.door.net"), "MY.Front.Door.net", Some(path));
            assert!(matches!(outcome, Err(Rejection::MalformedProbe(_))), "{path}");
        }
    }

    #[test]
    fn test_spoof_edge_probing() {
        for path in [PROBE_PATH, BAD_PROBE_PATH] {
            let (outcome, _) = run(Some("SPOOF.Front.Door.net"), "my.azurewebsite.net", Some(path));
            assert!(matches!(outcome, Err(Rejection::MalformedProbe(_))), "{path}");
        }
    }

    #[test]
    fn test_direct_hit_on_allow_listed_host_without_claim() {
        let (outcome, _) = run(None, "my.front.door.net", None);
        assert_eq!(outcome, Ok(()));
    }

    #[test]
    fn test_edge_id_scheme_replaces_host_checks() {
        let gate = edge_id_gate();
        let uri: Uri = "/".parse().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("my.azurewebsite.net"));
        headers.insert("x-azure-fdid", HeaderValue::from_static("abc-123"));
        assert_eq!(gate.process(&mut headers, &uri), Ok(()));
        assert_eq!(headers.get(header::HOST).unwrap(), "my.azurewebsite.net");
        assert!(!headers.contains_key("x-original-host"));

        headers.insert("x-azure-fdid", HeaderValue::from_static("someone-else"));
        assert_eq!(gate.process(&mut headers, &uri), Err(Rejection::UntrustedEdge));
    }

    #[test]
    fn test_edge_id_scheme_leaves_health_check_unstamped() {
        let gate = edge_id_gate();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("my.azurewebsite.net"));
        headers.insert("x-fd-healthprobe", HeaderValue::from_static("1"));
        headers.insert("x-azure-fdid", HeaderValue::from_static("abc-123"));
        let uri: Uri = PROBE_PATH.parse().unwrap();

        assert_eq!(gate.process(&mut headers, &uri), Ok(()));
        assert!(!headers.contains_key("x-forwarded-host"));

        let uri: Uri = BAD_PROBE_PATH.parse().unwrap();
        assert_eq!(
            gate.process(&mut headers, &uri),
            Err(Rejection::MalformedProbe(MalformedProbe::UnexpectedPath))
        );
    }
}
