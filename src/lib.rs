//! restorecheck - daily restorability verification for managed PostgreSQL backups
//!
//! Once per day, stages the newest completed backup of every managed cluster
//! into a scratch location, boots the engine against it in isolation, waits
//! for it to become queryable, and records an aggregate pass/fail status.

pub mod catalog;
pub mod cli;
pub mod coordinator;
pub mod instance;
pub mod observability;
pub mod poll;
pub mod selector;
pub mod staging;
