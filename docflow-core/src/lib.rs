//! DocFlow Core
//!
//! Shared types for the DocFlow document-processing system.
//!
//! This crate contains:
//! - Domain types: Core business entities (Job, JobStatus, tier policy)
//! - DTOs: Read-only snapshots served to status pollers

pub mod domain;
pub mod dto;
