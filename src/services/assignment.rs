//! Reviewer selection.
//!
//! Pure functions over a candidate pool that the caller has already loaded.
//! Selection walks the pool in the order given, so a pool sorted by user id
//! always yields the same reviewers.

use crate::models::{PullRequest, User};

/// Pick up to two reviewers for a new pull request.
///
/// Skips the author and anyone not eligible. Returning fewer than two ids
/// (or none) is a valid outcome for small teams.
pub fn select_initial_reviewers(candidates: &[User], author_id: &str) -> Vec<String> {
    let mut picked: Vec<String> = Vec::with_capacity(PullRequest::MAX_REVIEWERS);

    for candidate in candidates
        .iter()
        .filter(|u| u.is_eligible() && u.user_id != author_id)
    {
        if picked.len() == PullRequest::MAX_REVIEWERS {
            break;
        }
        if !picked.contains(&candidate.user_id) {
            picked.push(candidate.user_id.clone());
        }
    }

    picked
}

/// Pick the first eligible candidate to take over from `old_reviewer_id`.
///
/// `exclude` holds the pull request's current reviewers and its author.
/// Returns `None` when nobody is left.
pub fn select_replacement(
    candidates: &[User],
    exclude: &[&str],
    old_reviewer_id: &str,
) -> Option<String> {
    candidates
        .iter()
        .filter(|u| u.is_eligible())
        .find(|u| u.user_id != old_reviewer_id && !exclude.contains(&u.user_id.as_str()))
        .map(|u| u.user_id.clone())
}
