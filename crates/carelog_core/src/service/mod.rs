//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep callers (CLI, menus) decoupled from storage details.

pub mod summary_service;
pub mod tracker_service;
