use std::collections::{HashMap, HashSet};

/// Reverse mapping from reviewer id to the pull requests they currently review.
///
/// Only the record store mutates this, always while holding its write lock,
/// so an entry never outlives the assignment it mirrors.
#[derive(Debug, Default)]
pub struct ReviewerIndex {
    entries: HashMap<String, HashSet<String>>,
}

impl ReviewerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, reviewer_id: &str, pull_request_id: &str) {
        self.entries
            .entry(reviewer_id.to_string())
            .or_insert_with(HashSet::new)
            .insert(pull_request_id.to_string());
    }

    pub fn remove(&mut self, reviewer_id: &str, pull_request_id: &str) {
        if let Some(pull_requests) = self.entries.get_mut(reviewer_id) {
            pull_requests.remove(pull_request_id);
            if pull_requests.is_empty() {
                self.entries.remove(reviewer_id);
            }
        }
    }

    pub fn add_all<'a>(
        &mut self,
        reviewers: impl IntoIterator<Item = &'a String>,
        pull_request_id: &str,
    ) {
        for reviewer_id in reviewers {
            self.add(reviewer_id, pull_request_id);
        }
    }

    pub fn remove_all<'a>(
        &mut self,
        reviewers: impl IntoIterator<Item = &'a String>,
        pull_request_id: &str,
    ) {
        for reviewer_id in reviewers {
            self.remove(reviewer_id, pull_request_id);
        }
    }

    /// Pull request ids for a reviewer, in no particular order.
    pub fn pull_requests_for(&self, reviewer_id: &str) -> impl Iterator<Item = &str> {
        self.entries
            .get(reviewer_id)
            .into_iter()
            .flat_map(|pull_requests| pull_requests.iter().map(String::as_str))
    }

    pub fn contains(&self, reviewer_id: &str, pull_request_id: &str) -> bool {
        self.entries
            .get(reviewer_id)
            .is_some_and(|pull_requests| pull_requests.contains(pull_request_id))
    }

    pub fn reviewer_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut index = ReviewerIndex::new();
        index.add("u1", "pr-1");
        index.add("u1", "pr-2");
        index.add("u2", "pr-1");

        let mut prs: Vec<&str> = index.pull_requests_for("u1").collect();
        prs.sort();
        assert_eq!(prs, vec!["pr-1", "pr-2"]);
        assert!(index.contains("u2", "pr-1"));
        assert_eq!(index.pull_requests_for("u3").count(), 0);
    }

    #[test]
    fn test_remove_drops_empty_entries() {
        let mut index = ReviewerIndex::new();
        index.add("u1", "pr-1");
        index.remove("u1", "pr-1");

        assert!(!index.contains("u1", "pr-1"));
        assert_eq!(index.reviewer_count(), 0);

        // Removing something that was never there is a no-op
        index.remove("u9", "pr-9");
        assert_eq!(index.reviewer_count(), 0);
    }

    #[test]
    fn test_bulk_operations() {
        let mut index = ReviewerIndex::new();
        let reviewers = vec!["u1".to_string(), "u2".to_string()];

        index.add_all(&reviewers, "pr-1");
        assert!(index.contains("u1", "pr-1"));
        assert!(index.contains("u2", "pr-1"));

        index.remove_all(&reviewers, "pr-1");
        assert_eq!(index.reviewer_count(), 0);
    }
}
