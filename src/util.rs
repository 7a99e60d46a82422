//! Shared utility modules used across xlucene components.

pub mod wildcard;
