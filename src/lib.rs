//! Core domain service for club memberships.
//!
//! The domain model tracks people, clubs, and the memberships linking them. A
//! membership is a small temporal state machine (active, expired, pending
//! cancellation, cancelled) with an append-only event history; the registry
//! keeps the set of memberships consistent with the per-person and per-club
//! views at all times. Command parsing, persistence, and display live outside
//! this crate and call in through the command services.

pub mod adapters;
pub mod commands;
pub mod domain;
pub mod ports;
