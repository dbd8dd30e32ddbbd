//! Data layer for a genome read viewer.
//!
//! Raw alignment records are decoded into per-base pieces and laid out in
//! display lanes, and a [`cache::ReadCache`] keeps the reads relevant to the
//! visible window.

pub mod alignment;
pub mod cache;
pub mod config;
pub mod region;
pub mod session;
pub mod stats;
pub mod variant;
pub mod view;
