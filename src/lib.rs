//! BRSR Intake - manual disclosure data consolidation and extraction submission
//!
//! This crate keeps one consolidated, fully-defaulted record per disclosure
//! section (with derived totals recomputed on every edit) and submits source
//! documents plus those records to an external extraction service.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
