//! In-memory record store for teams, users and pull requests.
//!
//! All records and the reviewer index live behind one `RwLock`. Reads share
//! the lock, writes are serialized against everything, which keeps the index
//! consistent with the pull request records at every point a caller can observe.
//! Every read hands out a clone so callers can never alias stored state.

pub mod index;
pub mod selection;

pub use index::ReviewerIndex;

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;
use rand::Rng;
use tracing::{debug, warn};

use crate::error::{ReviewError, ReviewResult};
use crate::types::{PullRequest, PullRequestShort, Team, User};

/// Record set guarded by the store lock.
///
/// Methods here assume the caller already holds the appropriate lock; they are
/// only reachable through [`MemoryStore::read`] and [`MemoryStore::write`].
#[derive(Debug, Default)]
pub struct Records {
    teams: HashMap<String, Team>,
    users: HashMap<String, User>,
    pull_requests: HashMap<String, PullRequest>,
    reviewer_index: ReviewerIndex,
}

impl Records {
    /// Insert a team and materialize one user per member.
    ///
    /// If a member id repeats within the team, the first entry wins. A user id
    /// already owned by another team is moved to this one.
    pub fn save_team(&mut self, team: Team) -> ReviewResult<()> {
        if self.teams.contains_key(&team.name) {
            return Err(ReviewError::TeamExists(team.name));
        }

        let mut seen: HashSet<String> = HashSet::new();
        for member in &team.members {
            if !seen.insert(member.user_id.clone()) {
                continue;
            }
            let user = member.to_user(&team.name);
            if let Some(previous) = self.users.insert(user.id.clone(), user) {
                warn!(
                    "User {} moved from team {} to team {}",
                    previous.id, previous.team_name, team.name
                );
            }
        }

        debug!("Saved team {} with {} members", team.name, team.members.len());
        self.teams.insert(team.name.clone(), team);
        Ok(())
    }

    pub fn get_team(&self, name: &str) -> ReviewResult<Team> {
        self.teams
            .get(name)
            .cloned()
            .ok_or_else(|| ReviewError::TeamNotFound(name.to_string()))
    }

    pub fn get_user(&self, id: &str) -> ReviewResult<User> {
        self.users
            .get(id)
            .cloned()
            .ok_or_else(|| ReviewError::UserNotFound(id.to_string()))
    }

    pub fn get_pull_request(&self, id: &str) -> ReviewResult<PullRequest> {
        self.pull_requests
            .get(id)
            .cloned()
            .ok_or_else(|| ReviewError::PullRequestNotFound(id.to_string()))
    }

    pub fn set_user_active(&mut self, id: &str, active: bool) -> ReviewResult<User> {
        let user = self
            .users
            .get_mut(id)
            .ok_or_else(|| ReviewError::UserNotFound(id.to_string()))?;
        user.is_active = active;
        debug!("User {} is_active set to {}", id, active);
        Ok(user.clone())
    }

    pub fn save_pull_request(&mut self, pull_request: PullRequest) -> ReviewResult<()> {
        if self.pull_requests.contains_key(&pull_request.id) {
            return Err(ReviewError::PullRequestExists(pull_request.id));
        }

        self.reviewer_index
            .add_all(&pull_request.assigned_reviewers, &pull_request.id);
        debug!(
            "Saved pull request {} with reviewers {:?}",
            pull_request.id, pull_request.assigned_reviewers
        );
        self.pull_requests
            .insert(pull_request.id.clone(), pull_request);
        Ok(())
    }

    /// Replace a stored pull request wholesale.
    ///
    /// Index maintenance runs in three steps: drop the old reviewers' entries,
    /// swap the record, then add the new reviewers' entries.
    pub fn update_pull_request(&mut self, pull_request: PullRequest) -> ReviewResult<()> {
        let stored = self
            .pull_requests
            .get_mut(&pull_request.id)
            .ok_or_else(|| ReviewError::PullRequestNotFound(pull_request.id.clone()))?;

        self.reviewer_index
            .remove_all(&stored.assigned_reviewers, &stored.id);
        *stored = pull_request;
        self.reviewer_index
            .add_all(&stored.assigned_reviewers, &stored.id);

        debug!(
            "Updated pull request {} (status {:?}, reviewers {:?})",
            stored.id, stored.status, stored.assigned_reviewers
        );
        Ok(())
    }

    /// Pull requests the user currently reviews, sorted by pull request id.
    pub fn list_review_assignments(&self, user_id: &str) -> ReviewResult<Vec<PullRequestShort>> {
        if !self.users.contains_key(user_id) {
            return Err(ReviewError::UserNotFound(user_id.to_string()));
        }

        let mut assignments: Vec<PullRequestShort> = self
            .reviewer_index
            .pull_requests_for(user_id)
            .filter_map(|id| self.pull_requests.get(id))
            .map(PullRequest::to_short)
            .collect();
        assignments.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(assignments)
    }

    /// Pick up to `limit` active members of a team, skipping `exclude`.
    ///
    /// A member is eligible only when both the team snapshot and the live user
    /// record mark it active.
    pub fn select_random_active_members<R>(
        &self,
        team_name: &str,
        exclude: &HashSet<String>,
        limit: usize,
        rng: &mut R,
    ) -> ReviewResult<Vec<User>>
    where
        R: Rng + ?Sized,
    {
        let team = self
            .teams
            .get(team_name)
            .ok_or_else(|| ReviewError::TeamNotFound(team_name.to_string()))?;

        let candidates: Vec<User> = team
            .active_member_ids()
            .filter(|id| !exclude.contains(*id))
            .filter_map(|id| self.users.get(id))
            .filter(|user| user.is_active)
            .cloned()
            .collect();

        debug!(
            "Team {} has {} eligible candidates for {} slots",
            team_name,
            candidates.len(),
            limit
        );
        Ok(selection::sample_without_replacement(candidates, limit, rng))
    }

    pub fn team_count(&self) -> usize {
        self.teams.len()
    }

    pub fn pull_request_count(&self) -> usize {
        self.pull_requests.len()
    }
}

/// Thread-safe handle over [`Records`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Records>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` under the shared lock.
    pub fn read<T>(&self, f: impl FnOnce(&Records) -> T) -> T {
        let records = self.records.read();
        f(&records)
    }

    /// Run `f` under the exclusive lock. Multi-step operations that must see
    /// and write the same state go through here.
    pub fn write<T>(&self, f: impl FnOnce(&mut Records) -> T) -> T {
        let mut records = self.records.write();
        f(&mut records)
    }

    pub fn save_team(&self, team: Team) -> ReviewResult<()> {
        self.write(|records| records.save_team(team))
    }

    pub fn get_team(&self, name: &str) -> ReviewResult<Team> {
        self.read(|records| records.get_team(name))
    }

    pub fn get_user(&self, id: &str) -> ReviewResult<User> {
        self.read(|records| records.get_user(id))
    }

    pub fn get_pull_request(&self, id: &str) -> ReviewResult<PullRequest> {
        self.read(|records| records.get_pull_request(id))
    }

    pub fn set_user_active(&self, id: &str, active: bool) -> ReviewResult<User> {
        self.write(|records| records.set_user_active(id, active))
    }

    pub fn save_pull_request(&self, pull_request: PullRequest) -> ReviewResult<()> {
        self.write(|records| records.save_pull_request(pull_request))
    }

    pub fn update_pull_request(&self, pull_request: PullRequest) -> ReviewResult<()> {
        self.write(|records| records.update_pull_request(pull_request))
    }

    pub fn list_review_assignments(&self, user_id: &str) -> ReviewResult<Vec<PullRequestShort>> {
        self.read(|records| records.list_review_assignments(user_id))
    }

    pub fn select_random_active_members<R>(
        &self,
        team_name: &str,
        exclude: &HashSet<String>,
        limit: usize,
        rng: &mut R,
    ) -> ReviewResult<Vec<User>>
    where
        R: Rng + ?Sized,
    {
        self.read(|records| records.select_random_active_members(team_name, exclude, limit, rng))
    }
}
