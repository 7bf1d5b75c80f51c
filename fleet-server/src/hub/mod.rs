//! Live vehicle location hub.
//!
//! The only mutable shared state in the core: a map from vehicle id to
//! the latest position sample, fed by per-vehicle subscriptions to a
//! push feed. Reads never block on I/O and never observe a partially
//! written position.

mod feed;
mod live;

pub use feed::{BroadcastFeed, LocationFeed, RawSample, channel_for};
pub use live::{LiveLocationHub, SubscriptionState};
