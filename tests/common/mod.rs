//! Common test utilities
//!
//! This module is shared across all integration tests

#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use team_distributor::storage::{create_pool, EmptyTeams, TeamStore, TeamStoreConfig};

/// Team store on a fresh database file.
///
/// Keep the returned `TempDir` alive for as long as the store is used.
pub fn temp_store(team_count: u32, empty_teams: EmptyTeams) -> (TempDir, TeamStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("teams.db");
    let pool = create_pool(path.to_str().expect("temp path is not UTF-8")).expect("Failed to create pool");
    let store = TeamStore::new(
        Arc::new(pool),
        TeamStoreConfig {
            team_count,
            empty_teams,
        },
    )
    .expect("Failed to create store");
    (dir, store)
}

/// Spread of a count list: largest minus smallest
pub fn spread(counts: &[(u32, u64)]) -> u64 {
    let max = counts.iter().map(|&(_, c)| c).max().unwrap_or(0);
    let min = counts.iter().map(|&(_, c)| c).min().unwrap_or(0);
    max - min
}
