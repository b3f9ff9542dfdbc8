//! Data Transfer Objects
//!
//! Lightweight representations of domain entities served to API consumers
//! (status pollers, queue diagnostics).

pub mod job;
