//! # fanout-bench
//!
//! Fan-out write throughput harness for distributed stores.
//!
//! One logical message is replicated into many follower timelines: a
//! producer expands it into per-follower work items on a shared queue, a
//! fixed pool of workers drains the queue into a [`storage::TimelineStore`],
//! and a completion monitor decides when the run is over and how long it
//! took.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod model;
pub mod queue;
pub mod storage;
pub mod telemetry;
