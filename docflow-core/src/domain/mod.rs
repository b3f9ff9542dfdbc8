//! Core domain types
//!
//! This module contains the core domain structures used across DocFlow.
//! These types represent the fundamental business entities and are shared
//! between the admission layer (persists) and the worker pool (updates).

pub mod job;
pub mod tier;
