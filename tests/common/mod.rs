//! Shared utilities for integration tests.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

/// Deterministic generator for jitter draws.
#[allow(dead_code)]
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Collect every message delivered within `window`.
#[allow(dead_code)]
pub async fn drain_for<M>(rx: &mut mpsc::UnboundedReceiver<M>, window: Duration) -> Vec<M> {
    let mut received = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Some(message)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        received.push(message);
    }
    received
}
