//! Fleet location and route-matching server.
//!
//! A web service that answers: "which vehicles serve a trip between
//! these two stops, and where are they right now?"

pub mod cache;
pub mod domain;
pub mod hub;
pub mod matcher;
pub mod routing;
pub mod search;
pub mod stops;
pub mod store;
pub mod web;
