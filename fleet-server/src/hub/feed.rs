//! Push location feed abstraction.
//!
//! The hub consumes samples through the [`LocationFeed`] trait so the
//! transport is swappable: production wires the ingest endpoint into a
//! [`BroadcastFeed`]; tests drive the same type directly.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::domain::{Coordinate, Position, VehicleNumber};

/// Buffered samples per channel before slow subscribers start lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Feed channel name for a vehicle.
pub fn channel_for(number: &VehicleNumber) -> String {
    format!("vehicle_location/{number}")
}

/// One position report as delivered by the upstream feed, unvalidated.
///
/// Feeds forward whatever the reporting device sent; missing or
/// non-numeric coordinates are possible and are filtered by
/// [`RawSample::validate`] before they reach the cache.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl RawSample {
    /// A well-formed sample.
    pub fn new(lat: f64, lng: f64, recorded_at: DateTime<Utc>) -> Self {
        Self {
            lat: Some(lat),
            lng: Some(lng),
            recorded_at: Some(recorded_at),
        }
    }

    /// Validate into a position. Returns `None` when either coordinate
    /// component is missing, non-finite or out of range; a missing
    /// timestamp is tolerated.
    pub fn validate(&self) -> Option<Position> {
        let coord = Coordinate::new(self.lat?, self.lng?).ok()?;
        Some(Position {
            coord,
            recorded_at: self.recorded_at,
        })
    }
}

/// A source of per-vehicle location samples.
pub trait LocationFeed: Send + Sync + 'static {
    /// Subscribe to a channel. The stream yields samples in arrival
    /// order and ends when the feed drops the channel (a disconnect).
    fn subscribe(&self, channel: &str) -> BoxStream<'static, RawSample>;
}

/// In-process feed over tokio broadcast channels, one per vehicle.
///
/// The ingest endpoint publishes into it; each hub subscription holds
/// a receiver. Publishing to a channel nobody is subscribed to drops
/// the sample, mirroring a push feed with no listeners.
pub struct BroadcastFeed {
    channels: Mutex<HashMap<String, broadcast::Sender<RawSample>>>,
}

impl BroadcastFeed {
    pub fn new() -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
        }
    }

    fn sender_for(&self, channel: &str) -> broadcast::Sender<RawSample> {
        let mut channels = self.channels.lock().expect("feed lock poisoned");
        channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Publish a sample to a channel.
    pub fn publish(&self, channel: &str, sample: RawSample) {
        // send only fails when there are no receivers; a sample with
        // nobody listening is simply lost, which is fine.
        let _ = self.sender_for(channel).send(sample);
    }

    /// Drop a channel, ending every subscriber's stream.
    ///
    /// Models an upstream disconnect: subscribers see end-of-stream,
    /// not an unsubscribe.
    pub fn disconnect(&self, channel: &str) {
        let mut channels = self.channels.lock().expect("feed lock poisoned");
        channels.remove(channel);
    }
}

impl Default for BroadcastFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationFeed for BroadcastFeed {
    fn subscribe(&self, channel: &str) -> BoxStream<'static, RawSample> {
        let rx = self.sender_for(channel).subscribe();
        Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(sample) => return Some((sample, rx)),
                    // A lagged subscriber skips to the oldest retained
                    // sample; only the latest matters to the hub anyway.
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        }))
    }
}
