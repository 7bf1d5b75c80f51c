//! The live location hub.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use futures::StreamExt;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::domain::{Position, Vehicle, VehicleId, VehicleNumber};

use super::feed::{LocationFeed, RawSample, channel_for};

/// Where a vehicle's subscription is in its lifecycle.
///
/// `Unsubscribed` vehicles have no entry at all; `Subscribing` means a
/// feed task is running but nothing has arrived yet; `Active` means
/// the feed has delivered at least once (even if that delivery was
/// malformed or an explicit no-data signal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Unsubscribed,
    Subscribing,
    Active,
}

struct Entry {
    state: SubscriptionState,
    position: Option<Position>,
    channel: String,
    task: Option<JoinHandle<()>>,
}

type EntryMap = Arc<RwLock<HashMap<VehicleId, Entry>>>;

/// Live position cache over many per-vehicle feed subscriptions.
///
/// The hub exclusively owns the cache. Each sample replaces the whole
/// entry's position under one write lock, so a concurrent read either
/// sees the previous sample or the new one, never a torn mix. Reads
/// never touch the network.
///
/// Failure behavior per vehicle: a feed stream ending (disconnect)
/// retains the last cached value as stale and does not disturb other
/// vehicles; only an explicit [`LiveLocationHub::unsubscribe`] clears
/// the cached value.
#[derive(Clone)]
pub struct LiveLocationHub {
    entries: EntryMap,
    feed: Arc<dyn LocationFeed>,
}

impl LiveLocationHub {
    pub fn new(feed: Arc<dyn LocationFeed>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            feed,
        }
    }

    /// Start a live subscription for a vehicle.
    ///
    /// At most one subscription per vehicle: calling this again with
    /// the same number is a no-op. A changed number moves the
    /// subscription to the new feed channel while keeping the cached
    /// position, since the vehicle itself is unchanged. A fresh
    /// subscription enters `Subscribing` and becomes `Active` on first
    /// delivery from the feed.
    pub async fn subscribe(&self, id: VehicleId, number: &VehicleNumber) {
        let channel = channel_for(number);
        let mut entries = self.entries.write().await;

        let (state, position) = match entries.get_mut(&id) {
            Some(entry) if entry.channel == channel => return,
            Some(entry) => {
                if let Some(task) = entry.task.take() {
                    task.abort();
                }
                debug!(vehicle = %id, %channel, "moving subscription to renamed feed channel");
                (entry.state, entry.position)
            }
            None => (SubscriptionState::Subscribing, None),
        };

        // Register the receiver before inserting the entry so samples
        // published from here on are buffered for the task.
        let mut stream = self.feed.subscribe(&channel);

        let map = Arc::clone(&self.entries);
        let task_id = id.clone();
        let task = tokio::spawn(async move {
            while let Some(raw) = stream.next().await {
                apply_sample(&map, &task_id, raw).await;
            }
            debug!(vehicle = %task_id, "location feed stream ended, keeping last known position");
        });

        entries.insert(
            id,
            Entry {
                state,
                position,
                channel,
                task: Some(task),
            },
        );
    }

    /// Stop a vehicle's subscription and drop its cached position.
    ///
    /// Idempotent; unknown vehicles are ignored. A later `subscribe`
    /// starts from `Unknown` again; the old value is never
    /// resurrected.
    pub async fn unsubscribe(&self, id: &VehicleId) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.remove(id)
            && let Some(task) = entry.task
        {
            task.abort();
        }
    }

    /// Deliver one sample for a vehicle, as the feed would.
    ///
    /// Last received wins, regardless of the sample's own timestamp.
    /// Malformed samples are dropped and leave any previously cached
    /// value untouched. Samples for vehicles without a subscription
    /// are ignored.
    pub async fn on_sample(&self, id: &VehicleId, raw: RawSample) {
        apply_sample(&self.entries, id, raw).await;
    }

    /// The last cached position for a vehicle, or `None` if no valid
    /// sample has ever arrived. Never blocks on I/O.
    pub async fn current_position(&self, id: &VehicleId) -> Option<Position> {
        self.entries.read().await.get(id).and_then(|e| e.position)
    }

    /// Like [`current_position`](Self::current_position), but treats a
    /// cached position as `Unknown` once it is older than `max_age`.
    /// Untimed positions cannot prove freshness and are also withheld.
    pub async fn position_no_older_than(
        &self,
        id: &VehicleId,
        max_age: Duration,
        now: DateTime<Utc>,
    ) -> Option<Position> {
        self.current_position(id)
            .await
            .filter(|p| match p.recorded_at {
                Some(at) => now.signed_duration_since(at) <= max_age,
                None => false,
            })
    }

    /// Current lifecycle state of a vehicle's subscription.
    pub async fn state(&self, id: &VehicleId) -> SubscriptionState {
        self.entries
            .read()
            .await
            .get(id)
            .map(|e| e.state)
            .unwrap_or(SubscriptionState::Unsubscribed)
    }

    /// Number of vehicles with a running subscription.
    pub async fn subscription_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Reconcile subscriptions against the current vehicle set:
    /// subscribe vehicles that are new, move subscriptions whose
    /// vehicle number (and so feed channel) changed, unsubscribe
    /// vehicles that are gone.
    pub async fn sync(&self, vehicles: &[Vehicle]) {
        for vehicle in vehicles {
            self.subscribe(vehicle.id.clone(), &vehicle.number).await;
        }

        let keep: HashSet<&VehicleId> = vehicles.iter().map(|v| &v.id).collect();
        let stale: Vec<VehicleId> = {
            let entries = self.entries.read().await;
            entries
                .keys()
                .filter(|id| !keep.contains(id))
                .cloned()
                .collect()
        };
        for id in &stale {
            self.unsubscribe(id).await;
        }
    }
}

/// Apply one raw sample to the cache.
async fn apply_sample(entries: &RwLock<HashMap<VehicleId, Entry>>, id: &VehicleId, raw: RawSample) {
    let position = raw.validate();

    let mut guard = entries.write().await;
    let Some(entry) = guard.get_mut(id) else {
        // Unsubscribed while the sample was in flight.
        return;
    };

    // Any delivery proves the feed is answering for this vehicle.
    entry.state = SubscriptionState::Active;

    match position {
        Some(position) => entry.position = Some(position),
        None => debug!(vehicle = %id, "dropping malformed location sample"),
    }
}
