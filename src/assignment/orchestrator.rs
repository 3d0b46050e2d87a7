use crate::assignment::clock::{Clock, SystemClock};
use crate::error::{ReviewError, ReviewResult};
use crate::store::{MemoryStore, Records};
use crate::types::*;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Coordinates the record store and reviewer selection.
///
/// Each operation runs inside a single write section of the store, so the
/// candidates picked are exactly the ones persisted.
pub struct ReviewAssignmentOrchestrator {
    store: Arc<MemoryStore>,
    clock: Arc<dyn Clock>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    config: AssignmentConfig,
}

#[derive(Debug, Clone)]
pub struct AssignmentConfig {
    /// Reviewers picked when a pull request is opened.
    pub max_reviewers: usize,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self { max_reviewers: 2 }
    }
}

impl ReviewAssignmentOrchestrator {
    /// Create an orchestrator with the system clock and an entropy-seeded RNG.
    pub fn new(store: Arc<MemoryStore>, config: AssignmentConfig) -> Self {
        Self::with_sources(
            store,
            config,
            Arc::new(SystemClock),
            Box::new(StdRng::from_entropy()),
        )
    }

    /// Create an orchestrator with explicit time and randomness sources.
    pub fn with_sources(
        store: Arc<MemoryStore>,
        config: AssignmentConfig,
        clock: Arc<dyn Clock>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            store,
            clock,
            rng: Mutex::new(rng),
            config,
        }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    #[instrument(skip(self, team), fields(team_name = %team.name))]
    pub fn create_team(&self, team: Team) -> ReviewResult<Team> {
        let name = team.name.clone();
        let saved = self.store.write(|records| -> ReviewResult<Team> {
            records.save_team(team)?;
            records.get_team(&name)
        })?;

        info!("Created team {} with {} members", saved.name, saved.members.len());
        Ok(saved)
    }

    pub fn get_team(&self, name: &str) -> ReviewResult<Team> {
        self.store.get_team(name)
    }

    #[instrument(skip(self))]
    pub fn set_user_active(&self, user_id: &str, active: bool) -> ReviewResult<User> {
        let user = self.store.set_user_active(user_id, active)?;
        info!("User {} is now {}", user.id, if active { "active" } else { "inactive" });
        Ok(user)
    }

    pub fn get_pull_request(&self, id: &str) -> ReviewResult<PullRequest> {
        self.store.get_pull_request(id)
    }

    /// Open a pull request and assign up to `max_reviewers` from the author's team.
    ///
    /// An author whose team cannot be resolved gets a pull request with no
    /// reviewers rather than an error.
    #[instrument(skip(self, name))]
    pub fn create_pull_request(
        &self,
        id: &str,
        name: &str,
        author_id: &str,
    ) -> ReviewResult<PullRequest> {
        let mut rng = self.rng.lock();
        let pull_request = self.store.write(|records| -> ReviewResult<PullRequest> {
            let author = records.get_user(author_id)?;
            let exclude: HashSet<String> = [author.id.clone()].into_iter().collect();

            let reviewers = match records.select_random_active_members(
                &author.team_name,
                &exclude,
                self.config.max_reviewers,
                &mut **rng,
            ) {
                Ok(reviewers) => reviewers,
                Err(ReviewError::TeamNotFound(team)) => {
                    warn!(
                        "Author {} has no resolvable team {}; assigning no reviewers",
                        author.id, team
                    );
                    Vec::new()
                }
                Err(e) => return Err(e),
            };

            let mut pull_request = PullRequest::new(id, name, author_id);
            pull_request.assigned_reviewers =
                reviewers.into_iter().map(|user| user.id).collect();
            pull_request.created_at = Some(self.clock.now());

            records.save_pull_request(pull_request.clone())?;
            Ok(pull_request)
        })?;

        info!(
            "Created pull request {} with reviewers {:?}",
            pull_request.id, pull_request.assigned_reviewers
        );
        Ok(pull_request)
    }

    /// Merge a pull request. Merging an already merged one returns it unchanged.
    #[instrument(skip(self))]
    pub fn merge_pull_request(&self, id: &str) -> ReviewResult<PullRequest> {
        self.store.write(|records| {
            let mut pull_request = records.get_pull_request(id)?;
            if pull_request.is_merged() {
                info!("Pull request {} already merged", id);
                return Ok(pull_request);
            }

            pull_request.status = PullRequestStatus::Merged;
            pull_request.merged_at = Some(self.clock.now());
            records.update_pull_request(pull_request.clone())?;

            info!("Merged pull request {}", id);
            Ok(pull_request)
        })
    }

    /// Replace one reviewer on an open pull request with a fresh candidate from
    /// the replaced reviewer's team. Returns the updated record and the new id.
    #[instrument(skip(self))]
    pub fn reassign_reviewer(
        &self,
        pull_request_id: &str,
        old_reviewer_id: &str,
    ) -> ReviewResult<(PullRequest, String)> {
        let mut rng = self.rng.lock();
        self.store.write(|records| {
            let mut pull_request = records.get_pull_request(pull_request_id)?;
            if pull_request.is_merged() {
                return Err(ReviewError::PullRequestMerged(pull_request.id));
            }

            let position = pull_request
                .reviewer_position(old_reviewer_id)
                .ok_or_else(|| ReviewError::ReviewerMissing {
                    pull_request_id: pull_request.id.clone(),
                    reviewer_id: old_reviewer_id.to_string(),
                })?;

            let replacement =
                pick_replacement(records, &pull_request, old_reviewer_id, &mut **rng)?;
            pull_request.assigned_reviewers[position] = replacement.clone();
            records.update_pull_request(pull_request.clone())?;

            info!(
                "Reassigned pull request {}: {} -> {}",
                pull_request.id, old_reviewer_id, replacement
            );
            Ok((pull_request, replacement))
        })
    }

    pub fn list_user_reviews(&self, user_id: &str) -> ReviewResult<Vec<PullRequestShort>> {
        self.store.list_review_assignments(user_id)
    }
}

/// One active member of the old reviewer's team who is neither the author nor
/// already on the pull request.
fn pick_replacement(
    records: &Records,
    pull_request: &PullRequest,
    old_reviewer_id: &str,
    rng: &mut dyn RngCore,
) -> ReviewResult<String> {
    let old_reviewer = records.get_user(old_reviewer_id)?;

    let mut exclude: HashSet<String> = pull_request.assigned_reviewers.iter().cloned().collect();
    exclude.insert(old_reviewer.id.clone());
    exclude.insert(pull_request.author_id.clone());

    records
        .select_random_active_members(&old_reviewer.team_name, &exclude, 1, rng)?
        .into_iter()
        .next()
        .map(|user| user.id)
        .ok_or(ReviewError::NoCandidate(old_reviewer.team_name))
}
