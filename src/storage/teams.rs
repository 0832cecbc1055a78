//! Team store: registrations and balanced team assignment
//!
//! Every registrant is bound to exactly one team for good. New registrants
//! always land in one of the teams that currently have the fewest members,
//! chosen uniformly at random among them, so team sizes never differ by
//! more than one.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::core::config::teams::MAX_COUNT;
use crate::core::config::Settings;
use crate::core::error::{AppError, AppResult};
use crate::storage::db::{get_connection, DbPool};

/// A participant bound to a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Telegram user ID
    pub user_id: i64,
    /// Name as confirmed by the user
    pub full_name: String,
    /// Team number in `1..=team_count`
    pub team_number: u32,
    /// Time of assignment
    pub registered_at: DateTime<Utc>,
}

/// Whether listings include teams without members.
///
/// Only affects `rosters`, `team_counts` and `stats`; balancing always
/// takes every team into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyTeams {
    #[default]
    Omit,
    Include,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamStoreConfig {
    pub team_count: u32,
    pub empty_teams: EmptyTeams,
}

impl Default for TeamStoreConfig {
    fn default() -> Self {
        Self {
            team_count: crate::core::config::teams::DEFAULT_COUNT,
            empty_teams: EmptyTeams::Omit,
        }
    }
}

impl TeamStoreConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            team_count: settings.team_count,
            empty_teams: if settings.show_empty_teams {
                EmptyTeams::Include
            } else {
                EmptyTeams::Omit
            },
        }
    }
}

/// Per-team counts and the total, read from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamStats {
    pub counts: Vec<(u32, u64)>,
    pub total: u64,
}

/// Registration storage backed by the shared SQLite pool.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct TeamStore {
    pool: Arc<DbPool>,
    config: TeamStoreConfig,
}

impl TeamStore {
    pub fn new(pool: Arc<DbPool>, config: TeamStoreConfig) -> AppResult<Self> {
        if config.team_count == 0 || config.team_count > MAX_COUNT {
            return Err(AppError::Config(format!(
                "team count must be between 1 and {}, got {}",
                MAX_COUNT, config.team_count
            )));
        }
        Ok(Self { pool, config })
    }

    pub fn team_count(&self) -> u32 {
        self.config.team_count
    }

    pub fn config(&self) -> TeamStoreConfig {
        self.config
    }

    pub fn pool(&self) -> &Arc<DbPool> {
        &self.pool
    }

    /// Returns the registration of `user_id`, or `None` if the user never registered.
    pub fn lookup(&self, user_id: i64) -> AppResult<Option<Registration>> {
        let conn = get_connection(&self.pool)?;
        select_registration(&conn, user_id)
    }

    /// Assigns `user_id` to a team and returns the team number.
    ///
    /// Calling this again for an already registered user returns the
    /// original team and leaves the stored name untouched, whatever name
    /// is passed.
    ///
    /// # Errors
    ///
    /// `AppError::Validation` for a blank name of a new user, storage
    /// errors otherwise.
    pub fn assign(&self, user_id: i64, full_name: &str) -> AppResult<u32> {
        self.assign_with_rng(user_id, full_name, &mut rand::thread_rng())
    }

    /// Same as [`TeamStore::assign`], drawing the tie-break from `rng`.
    pub fn assign_with_rng<R: Rng + ?Sized>(&self, user_id: i64, full_name: &str, rng: &mut R) -> AppResult<u32> {
        let mut conn = get_connection(&self.pool)?;
        // IMMEDIATE takes the database write lock up front: the existence
        // check, the counts and the insert all see the same state.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(existing) = select_registration(&tx, user_id)? {
            log::debug!("User {} already in team {}", user_id, existing.team_number);
            return Ok(existing.team_number);
        }

        // Only a new row needs a name; re-entry ignores it
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(AppError::Validation("full name must not be empty".to_string()));
        }

        let counts = balance_counts(&tx, self.config.team_count)?;
        let team_number = pick_balanced_team(&counts, rng)
            .ok_or_else(|| AppError::Config("no teams to assign to".to_string()))?;

        tx.execute(
            "INSERT INTO registrations (user_id, full_name, team_number, registered_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, full_name, i64::from(team_number), Utc::now()],
        )?;
        tx.commit()?;

        log::info!("User {} ({}) assigned to team {}", user_id, full_name, team_number);
        Ok(team_number)
    }

    /// Member names per team, teams ascending, members in registration order.
    pub fn rosters(&self) -> AppResult<BTreeMap<u32, Vec<String>>> {
        let conn = get_connection(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT team_number, full_name FROM registrations ORDER BY team_number, registered_at, rowid",
        )?;
        let rows = stmt.query_map([], |row| Ok((to_team_number(row.get(0)?, 0)?, row.get::<_, String>(1)?)))?;

        let mut teams: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        if self.config.empty_teams == EmptyTeams::Include {
            for team in 1..=self.config.team_count {
                teams.insert(team, Vec::new());
            }
        }
        for row in rows {
            let (team, name) = row?;
            teams.entry(team).or_default().push(name);
        }

        Ok(teams)
    }

    /// `(team_number, members)` ascending by team number.
    pub fn team_counts(&self) -> AppResult<Vec<(u32, u64)>> {
        let conn = get_connection(&self.pool)?;
        let counts = grouped_counts(&conn)?;
        Ok(self.apply_display_policy(counts))
    }

    /// Total number of registrations.
    pub fn total_count(&self) -> AppResult<u64> {
        let conn = get_connection(&self.pool)?;
        total_registrations(&conn)
    }

    /// Team counts and total from a single read transaction, so the counts
    /// always add up to the total even while registrations are coming in.
    pub fn stats(&self) -> AppResult<TeamStats> {
        let mut conn = get_connection(&self.pool)?;
        let tx = conn.transaction()?;
        let counts = grouped_counts(&tx)?;
        let total = total_registrations(&tx)?;
        tx.commit()?;

        Ok(TeamStats {
            counts: self.apply_display_policy(counts),
            total,
        })
    }

    fn apply_display_policy(&self, counts: Vec<(u32, u64)>) -> Vec<(u32, u64)> {
        match self.config.empty_teams {
            EmptyTeams::Omit => counts,
            EmptyTeams::Include => {
                let mut all: BTreeMap<u32, u64> = (1..=self.config.team_count).map(|team| (team, 0)).collect();
                all.extend(counts);
                all.into_iter().collect()
            }
        }
    }
}

/// Picks one of the teams holding the minimum count, uniformly at random.
///
/// Returns `None` only for an empty slice.
pub fn pick_balanced_team<R: Rng + ?Sized>(counts: &[(u32, u64)], rng: &mut R) -> Option<u32> {
    let min_count = counts.iter().map(|&(_, count)| count).min()?;
    let candidates: Vec<u32> = counts
        .iter()
        .filter(|&&(_, count)| count == min_count)
        .map(|&(team, _)| team)
        .collect();
    candidates.choose(rng).copied()
}

fn select_registration(conn: &Connection, user_id: i64) -> AppResult<Option<Registration>> {
    let registration = conn
        .query_row(
            "SELECT user_id, full_name, team_number, registered_at FROM registrations WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(Registration {
                    user_id: row.get(0)?,
                    full_name: row.get(1)?,
                    team_number: to_team_number(row.get(2)?, 2)?,
                    registered_at: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(registration)
}

/// Counts for every team in `1..=team_count`, zero-filled.
///
/// Rows outside that range (a dataset created with a different team count)
/// are ignored for balancing.
fn balance_counts(conn: &Connection, team_count: u32) -> AppResult<Vec<(u32, u64)>> {
    let mut counts: Vec<(u32, u64)> = (1..=team_count).map(|team| (team, 0)).collect();

    for (team, count) in grouped_counts(conn)? {
        match team.checked_sub(1).and_then(|idx| counts.get_mut(idx as usize)) {
            Some(slot) => slot.1 = count,
            None => log::warn!(
                "Team {} has {} member(s) but only {} teams are configured",
                team,
                count,
                team_count
            ),
        }
    }

    Ok(counts)
}

/// Counts for teams that have at least one member.
fn grouped_counts(conn: &Connection) -> AppResult<Vec<(u32, u64)>> {
    let mut stmt = conn.prepare(
        "SELECT team_number, COUNT(*) FROM registrations GROUP BY team_number ORDER BY team_number",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((to_team_number(row.get(0)?, 0)?, row.get::<_, i64>(1)?.unsigned_abs()))
    })?;

    let mut counts = Vec::new();
    for row in rows {
        counts.push(row?);
    }
    Ok(counts)
}

fn total_registrations(conn: &Connection) -> AppResult<u64> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM registrations", [], |row| row.get(0))?;
    Ok(total.unsigned_abs())
}

fn to_team_number(raw: i64, column: usize) -> rusqlite::Result<u32> {
    u32::try_from(raw).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(column, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::db::create_pool;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn store(team_count: u32, empty_teams: EmptyTeams) -> (TeamStore, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teams.db");
        let pool = Arc::new(create_pool(path.to_str().unwrap()).unwrap());
        let store = TeamStore::new(pool, TeamStoreConfig { team_count, empty_teams }).unwrap();
        (store, dir)
    }

    #[test]
    fn test_pick_balanced_team_only_minimum() {
        let mut rng = StdRng::seed_from_u64(7);
        let counts = [(1, 3), (2, 2), (3, 3), (4, 2)];
        for _ in 0..50 {
            let team = pick_balanced_team(&counts, &mut rng).unwrap();
            assert!(team == 2 || team == 4, "picked non-minimal team {}", team);
        }
    }

    #[test]
    fn test_pick_balanced_team_reaches_every_tied_team() {
        let mut rng = StdRng::seed_from_u64(1);
        let counts = [(1, 0), (2, 0), (3, 0)];
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..200 {
            seen.insert(pick_balanced_team(&counts, &mut rng).unwrap());
        }
        assert_eq!(seen.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_pick_balanced_team_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(pick_balanced_team(&[], &mut rng), None);
    }

    #[test]
    fn test_new_rejects_zero_teams() {
        let dir = tempfile::tempdir().unwrap();
        let pool = Arc::new(create_pool(dir.path().join("t.db").to_str().unwrap()).unwrap());
        let result = TeamStore::new(
            pool,
            TeamStoreConfig {
                team_count: 0,
                empty_teams: EmptyTeams::Omit,
            },
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_new_rejects_oversized_team_count() {
        let dir = tempfile::tempdir().unwrap();
        let pool = Arc::new(create_pool(dir.path().join("t.db").to_str().unwrap()).unwrap());
        let result = TeamStore::new(
            Arc::clone(&pool),
            TeamStoreConfig {
                team_count: MAX_COUNT + 1,
                empty_teams: EmptyTeams::Include,
            },
        );
        assert!(matches!(result, Err(AppError::Config(_))));

        let at_limit = TeamStore::new(
            pool,
            TeamStoreConfig {
                team_count: MAX_COUNT,
                empty_teams: EmptyTeams::Include,
            },
        );
        assert!(at_limit.is_ok());
    }

    #[test]
    fn test_blank_name_on_reentry_returns_stored_team() {
        let (store, _dir) = store(12, EmptyTeams::Omit);
        let first = store.assign(42, "Ivanov Ivan Ivanovich").unwrap();

        assert_eq!(store.assign(42, "").unwrap(), first);
        assert_eq!(store.assign(42, "   ").unwrap(), first);
        assert_eq!(store.total_count().unwrap(), 1);
    }

    #[test]
    fn test_lookup_absent_user() {
        let (store, _dir) = store(12, EmptyTeams::Omit);
        assert_eq!(store.lookup(1).unwrap(), None);
    }

    #[test]
    fn test_assign_then_lookup() {
        let (store, _dir) = store(12, EmptyTeams::Omit);
        let team = store.assign(42, "Ivanov Ivan Ivanovich").unwrap();
        assert!((1..=12).contains(&team));

        let registration = store.lookup(42).unwrap().unwrap();
        assert_eq!(registration.user_id, 42);
        assert_eq!(registration.team_number, team);
        assert_eq!(registration.full_name, "Ivanov Ivan Ivanovich");
    }

    #[test]
    fn test_assign_is_idempotent_and_keeps_first_name() {
        let (store, _dir) = store(12, EmptyTeams::Omit);
        let first = store.assign(42, "Ivanov Ivan Ivanovich").unwrap();
        let second = store.assign(42, "Somebody Else").unwrap();

        assert_eq!(first, second);
        assert_eq!(store.total_count().unwrap(), 1);
        assert_eq!(store.lookup(42).unwrap().unwrap().full_name, "Ivanov Ivan Ivanovich");
    }

    #[test]
    fn test_assign_rejects_blank_name() {
        let (store, _dir) = store(12, EmptyTeams::Omit);
        assert!(matches!(store.assign(1, "   "), Err(AppError::Validation(_))));
        assert_eq!(store.total_count().unwrap(), 0);
    }

    #[test]
    fn test_assign_trims_name() {
        let (store, _dir) = store(3, EmptyTeams::Omit);
        store.assign(5, "  Petrov Petr  ").unwrap();
        assert_eq!(store.lookup(5).unwrap().unwrap().full_name, "Petrov Petr");
    }

    #[test]
    fn test_three_users_fill_three_teams() {
        let (store, _dir) = store(3, EmptyTeams::Omit);
        for user_id in 1..=3 {
            store.assign(user_id, &format!("User Number{}", user_id)).unwrap();
        }
        assert_eq!(store.team_counts().unwrap(), vec![(1, 1), (2, 1), (3, 1)]);
    }

    #[test]
    fn test_balance_gap_never_exceeds_one() {
        let (store, _dir) = store(5, EmptyTeams::Include);
        let mut rng = StdRng::seed_from_u64(99);
        for user_id in 0..37 {
            store
                .assign_with_rng(user_id, &format!("Member Number{}", user_id), &mut rng)
                .unwrap();
            let counts: Vec<u64> = store.team_counts().unwrap().into_iter().map(|(_, c)| c).collect();
            let max = counts.iter().max().unwrap();
            let min = counts.iter().min().unwrap();
            assert!(max - min <= 1, "unbalanced after user {}: {:?}", user_id, counts);
        }
    }

    #[test]
    fn test_team_counts_omit_and_include_empty() {
        let (store, _dir) = store(4, EmptyTeams::Omit);
        store.assign(1, "Ivanov Ivan").unwrap();
        let counts = store.team_counts().unwrap();
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].1, 1);

        let including = TeamStore::new(
            store.pool().clone(),
            TeamStoreConfig {
                team_count: 4,
                empty_teams: EmptyTeams::Include,
            },
        )
        .unwrap();
        let counts = including.team_counts().unwrap();
        assert_eq!(counts.len(), 4);
        assert_eq!(counts.iter().map(|(_, c)| c).sum::<u64>(), 1);
        assert_eq!(counts.iter().map(|(t, _)| *t).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rosters_order_by_registration_time() {
        let (store, _dir) = store(1, EmptyTeams::Omit);
        store.assign(30, "First Registered").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.assign(10, "Second Registered").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.assign(20, "Third Registered").unwrap();

        let rosters = store.rosters().unwrap();
        assert_eq!(
            rosters.get(&1).unwrap(),
            &vec![
                "First Registered".to_string(),
                "Second Registered".to_string(),
                "Third Registered".to_string()
            ]
        );
    }

    #[test]
    fn test_rosters_include_empty_teams() {
        let (store, _dir) = store(3, EmptyTeams::Include);
        store.assign(1, "Ivanov Ivan").unwrap();

        let rosters = store.rosters().unwrap();
        assert_eq!(rosters.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(rosters.values().map(Vec::len).sum::<usize>(), 1);
    }

    #[test]
    fn test_stats_sum_matches_total() {
        let (store, _dir) = store(4, EmptyTeams::Omit);
        for user_id in 0..10 {
            store.assign(user_id, "Some Person").unwrap();
        }
        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 10);
        assert_eq!(stats.counts.iter().map(|(_, c)| c).sum::<u64>(), stats.total);
        let mut sizes: Vec<u64> = stats.counts.iter().map(|(_, c)| *c).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![2, 2, 3, 3]);
    }

    #[test]
    fn test_balancing_ignores_out_of_range_rows() {
        let (store, _dir) = store(2, EmptyTeams::Omit);
        {
            let conn = get_connection(store.pool()).unwrap();
            conn.execute(
                "INSERT INTO registrations (user_id, full_name, team_number) VALUES (100, 'Legacy Member', 5)",
                [],
            )
            .unwrap();
        }

        let team = store.assign(1, "Fresh Member").unwrap();
        assert!(team == 1 || team == 2);
        assert_eq!(store.total_count().unwrap(), 2);
        assert_eq!(store.team_counts().unwrap().iter().map(|(_, c)| c).sum::<u64>(), 2);
    }
}
