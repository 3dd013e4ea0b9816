//! Test helpers shared across crates.
//!
//! This crate provides the on-disk fragment corpus, helpers that write
//! ad-hoc fragment trees into temporary directories, and a seeded
//! `figment::Jail` for settings tests.

pub mod fragments;
pub mod jail;
