//! A wiremock responder that serves byte ranges of an in-memory body.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[derive(Debug, Default)]
struct Behaviour {
    /// Remaining forced failures keyed by range start.
    failures: HashMap<u64, (usize, u16)>,
    /// Response delay keyed by range start.
    delays: HashMap<u64, Duration>,
    /// Every `Range` header seen, in arrival order.
    seen: Vec<String>,
    /// Range start and arrival time of every served request.
    arrivals: Vec<(u64, Instant)>,
}

/// Answers `GET` requests carrying `Range: bytes=S-E` with a 206 slice of
/// `body`. Clones share state, so a test keeps one handle for inspection
/// and mounts another.
#[derive(Debug, Clone)]
pub struct RangeResponder {
    body: Arc<Vec<u8>>,
    behaviour: Arc<Mutex<Behaviour>>,
}

#[allow(dead_code)]
impl RangeResponder {
    pub fn new(body: Vec<u8>) -> Self {
        Self {
            body: Arc::new(body),
            behaviour: Arc::new(Mutex::new(Behaviour::default())),
        }
    }

    /// Fails the first `times` requests for the range starting at `start`.
    pub fn fail_range(self, start: u64, times: usize, status: u16) -> Self {
        self.lock().failures.insert(start, (times, status));
        self
    }

    /// Delays every response for the range starting at `start`.
    pub fn delay_range(self, start: u64, delay: Duration) -> Self {
        self.lock().delays.insert(start, delay);
        self
    }

    /// `Range` headers received so far.
    pub fn seen_ranges(&self) -> Vec<String> {
        self.lock().seen.clone()
    }

    /// Arrival time of each request, keyed by range start, in arrival order.
    pub fn arrivals(&self) -> Vec<(u64, Instant)> {
        self.lock().arrivals.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Behaviour> {
        self.behaviour.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Respond for RangeResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let Some(header) = request
            .headers
            .get("range")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
        else {
            return ResponseTemplate::new(200).set_body_bytes(self.body.as_slice());
        };

        let Some((start, end)) = parse_range(&header) else {
            return ResponseTemplate::new(416);
        };
        let total = self.body.len() as u64;
        if start >= total {
            return ResponseTemplate::new(416).insert_header("Content-Range", format!("bytes */{total}"));
        }
        let end = end.min(total - 1);

        let delay = {
            let mut behaviour = self.lock();
            behaviour.seen.push(header.clone());
            behaviour.arrivals.push((start, Instant::now()));
            if let Some((remaining, status)) = behaviour.failures.get_mut(&start) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return ResponseTemplate::new(*status);
                }
            }
            behaviour.delays.get(&start).copied()
        };

        #[allow(clippy::cast_possible_truncation)]
        let slice = &self.body[start as usize..=end as usize];
        let template = ResponseTemplate::new(206)
            .insert_header("Content-Range", format!("bytes {start}-{end}/{total}"))
            .set_body_bytes(slice);
        match delay {
            Some(delay) => template.set_delay(delay),
            None => template,
        }
    }
}

fn parse_range(value: &str) -> Option<(u64, u64)> {
    let (start, end) = value.strip_prefix("bytes=")?.split_once('-')?;
    let start = start.trim().parse().ok()?;
    let end = end.trim().parse().ok()?;
    (start <= end).then_some((start, end))
}

/// Deterministic, non-repeating-looking payload of `len` bytes.
#[allow(dead_code)]
pub fn payload(len: usize) -> Vec<u8> {
    #[allow(clippy::cast_possible_truncation)]
    (0..len).map(|i| (i.wrapping_mul(31) ^ (i >> 8)) as u8).collect()
}

/// Mounts a `HEAD` answering with `Content-Length: len`.
#[allow(dead_code)]
pub async fn mount_head(server: &MockServer, route: &str, len: usize) {
    // hyper derives Content-Length from the body and drops the body itself.
    Mock::given(method("HEAD"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; len]))
        .mount(server)
        .await;
}

/// Mounts `responder` for ranged `GET`s on `route`.
#[allow(dead_code)]
pub async fn mount_ranges(server: &MockServer, route: &str, responder: RangeResponder) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(responder)
        .mount(server)
        .await;
}

/// Mounts a `HEAD` plus ranged `GET`s serving `body`; returns the shared
/// responder handle.
#[allow(dead_code)]
pub async fn serve(server: &MockServer, route: &str, body: Vec<u8>) -> RangeResponder {
    mount_head(server, route, body.len()).await;
    let responder = RangeResponder::new(body);
    mount_ranges(server, route, responder.clone()).await;
    responder
}
