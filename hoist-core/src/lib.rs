//! Hoist Core
//!
//! Core types and abstractions for the Hoist build-server client.
//!
//! This crate contains:
//! - Domain types: normalized build status, references, queue tickets,
//!   item classification, tail/cursor logic
//! - DTOs: raw wire shapes returned by the server's JSON API
//! - Locator helpers: conversions between item names and item URLs

pub mod domain;
pub mod dto;
pub mod locator;
