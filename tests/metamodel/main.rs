//! Metamodel integration tests: loading, caching, lookups, invalidation,
//! validation and configuration through the public loader API.

#[path = "../common/mod.rs"]
mod common;

mod config;
mod loader;
mod validation;
