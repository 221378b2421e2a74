//! Bounded request capture for diagnosis.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, Method, Uri};
use serde::Serialize;
use uuid::Uuid;

use crate::frontdoor::signals::declared_host;

/// A request as it arrived, before the gate touched it, plus its final status.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedRequest {
    pub id: Uuid,
    /// Seconds since epoch.
    pub received_at: u64,
    pub method: String,
    pub host: Option<String>,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub status: u16,
}

impl CapturedRequest {
    pub fn new(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        let id = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(Uuid::new_v4);

        Self {
            id,
            received_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            method: method.to_string(),
            host: declared_host(headers, uri),
            path: uri.path().to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
                .collect(),
            status: 0,
        }
    }
}

/// Receives every captured request. Implementations must be cheap; they are
/// called inline once per request.
pub trait RequestObserver: Send + Sync {
    /// When false, callers skip building entries altogether.
    fn enabled(&self) -> bool {
        true
    }

    fn observe(&self, entry: CapturedRequest);

    /// Captured requests, oldest first.
    fn snapshot(&self) -> Vec<CapturedRequest>;
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl RequestObserver for NoopObserver {
    fn enabled(&self) -> bool {
        false
    }

    fn observe(&self, _entry: CapturedRequest) {}

    fn snapshot(&self) -> Vec<CapturedRequest> {
        Vec::new()
    }
}

/// Keeps the most recent `capacity` requests.
#[derive(Debug)]
pub struct RingBufferObserver {
    capacity: usize,
    entries: Mutex<VecDeque<CapturedRequest>>,
}

impl RingBufferObserver {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl RequestObserver for RingBufferObserver {
    fn enabled(&self) -> bool {
        self.capacity > 0
    }

    fn observe(&self, entry: CapturedRequest) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().expect("capture buffer mutex poisoned");
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    fn snapshot(&self) -> Vec<CapturedRequest> {
        let entries = self.entries.lock().expect("capture buffer mutex poisoned");
        entries.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> CapturedRequest {
        let uri: Uri = path.parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("host", "my.front.door.net".parse().unwrap());
        CapturedRequest::new(&Method::GET, &uri, &headers)
    }

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let observer = RingBufferObserver::new(2);
        observer.observe(entry("/one"));
        observer.observe(entry("/two"));
        observer.observe(entry("/three"));

        let paths: Vec<_> = observer.snapshot().into_iter().map(|e| e.path).collect();
        assert_eq!(paths, vec!["/two", "/three"]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let observer = RingBufferObserver::new(0);
        observer.observe(entry("/one"));
        assert!(observer.snapshot().is_empty());
    }

    #[test]
    fn test_entry_fields() {
        let mut headers = HeaderMap::new();
        let id = Uuid::new_v4();
        headers.insert("x-request-id", id.to_string().parse().unwrap());
        headers.insert("x-forwarded-host", "spoof.net".parse().unwrap());
        let uri: Uri = "http://my.azurewebsite.net/PokeTheApp".parse().unwrap();

        let captured = CapturedRequest::new(&Method::POST, &uri, &headers);
        assert_eq!(captured.id, id);
        assert_eq!(captured.method, "POST");
        assert_eq!(captured.host.as_deref(), Some("my.azurewebsite.net"));
        assert_eq!(captured.path, "/PokeTheApp");
        assert!(captured.headers.contains(&("x-forwarded-host".to_string(), "spoof.net".to_string())));
    }
}
