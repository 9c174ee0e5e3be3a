#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Benchmark harness for the structures of the [`rmq`] crate.
//!
//! The [`driver::Driver`] sweeps datasets × engines, running every build, query batch and update
//! batch under a [`watchdog::Watchdog`] deadline, and collects raw [`sample::Sample`]s. Those are
//! reduced by [`aggregate::aggregate`] and written by [`export::export_csv`].

mod error;
pub use error::{Error, Result};

pub mod aggregate;
pub mod alloc;
pub mod config;
pub mod dataset;
pub mod driver;
pub mod export;
pub mod generate;
pub mod sample;
pub mod watchdog;

// Tests measuring allocations need the tracker installed in the test binary as well
#[cfg(test)]
#[global_allocator]
static GLOBAL: alloc::TrackingAllocator = alloc::TrackingAllocator::new();
