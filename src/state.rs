//! Router state management

use crate::params::NavigationArgs;
use crate::result::ActionResult;
use crate::{debug_log, trace_log};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// HistoryStack
// ============================================================================

/// Ordered navigation history with a cursor.
///
/// The cursor is `None` before the first commit and after [`clear`](Self::clear),
/// and otherwise points at the displayed entry. Navigation arguments are kept
/// per route string so a replayed route gets the arguments it was last
/// navigated with.
#[derive(Debug, Default, Clone)]
pub struct HistoryStack {
    entries: Vec<ActionResult>,
    cursor: Option<usize>,
    args: HashMap<String, NavigationArgs>,
    capacity: Option<usize>,
}

impl HistoryStack {
    /// Create an unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `capacity` entries, evicting the
    /// oldest ones on push. A capacity of zero is treated as one.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            capacity: capacity.map(|c| c.max(1)),
            ..Self::default()
        }
    }

    /// Append `result` after the cursor.
    ///
    /// Every entry after the cursor is discarded first, so pushing while
    /// stepped back drops the forward branch. Returns the results that left
    /// the history (forward branch and capacity evictions).
    pub fn push(&mut self, result: ActionResult, args: NavigationArgs) -> Vec<ActionResult> {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        let mut dropped: Vec<ActionResult> = self.entries.drain(keep..).collect();
        if !dropped.is_empty() {
            debug_log!("Discarded {} forward history entries", dropped.len());
        }

        self.args.insert(result.route_url().to_string(), args);
        self.entries.push(result);

        if let Some(capacity) = self.capacity {
            if self.entries.len() > capacity {
                let excess = self.entries.len() - capacity;
                dropped.extend(self.entries.drain(..excess));
                trace_log!("Evicted {} history entries over capacity", excess);
            }
        }

        self.cursor = Some(self.entries.len() - 1);
        self.forget_args_of(&dropped);
        dropped
    }

    /// Replace the entry under the cursor, or push when the history is empty.
    ///
    /// Returns the replaced entry.
    pub fn replace_current(&mut self, result: ActionResult, args: NavigationArgs) -> Option<ActionResult> {
        let Some(cursor) = self.cursor else {
            self.push(result, args);
            return None;
        };

        self.args.insert(result.route_url().to_string(), args);
        let replaced = std::mem::replace(&mut self.entries[cursor], result);
        self.forget_args_of(std::slice::from_ref(&replaced));
        Some(replaced)
    }

    /// Move the cursor to `index` without touching the entries.
    ///
    /// Returns `false` and leaves the cursor alone if `index` is out of range.
    pub fn move_to(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.cursor = Some(index);
        true
    }

    /// Drop every entry and argument; the cursor returns to before the first
    /// entry.
    pub fn clear(&mut self) -> Vec<ActionResult> {
        self.cursor = None;
        self.args.clear();
        std::mem::take(&mut self.entries)
    }

    /// Cursor position.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&ActionResult> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    /// Newest entry.
    pub fn last(&self) -> Option<&ActionResult> {
        self.entries.last()
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&ActionResult> {
        self.entries.get(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the history is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[ActionResult] {
        &self.entries
    }

    /// Arguments last used for `route`.
    pub fn args_for(&self, route: &str) -> Option<&NavigationArgs> {
        self.args.get(route)
    }

    /// Maximum number of entries, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Check if stepping back is possible.
    pub fn can_go_back(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    /// Check if stepping forward is possible.
    pub fn can_go_forward(&self) -> bool {
        self.cursor
            .is_some_and(|cursor| cursor + 1 < self.entries.len())
    }

    /// Index `steps` entries behind the cursor, clamped to the first entry.
    pub fn back_index(&self, steps: usize) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.cursor.unwrap_or(0).saturating_sub(steps))
    }

    /// Index `steps` entries ahead of the cursor, clamped to the last entry.
    pub fn forward_index(&self, steps: usize) -> Option<usize> {
        let last = self.entries.len().checked_sub(1)?;
        let from = self.cursor.unwrap_or(0);
        Some(from.saturating_add(steps).min(last))
    }

    fn forget_args_of(&mut self, dropped: &[ActionResult]) {
        for result in dropped {
            let route = result.route_url();
            if !self.entries.iter().any(|entry| entry.route_url() == route) {
                self.args.remove(route);
            }
        }
    }
}

// ============================================================================
// RouterState
// ============================================================================

/// How a resolved result enters the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommitKind {
    /// Append after the cursor, dropping the forward branch.
    Push,
    /// Replace the entry under the cursor.
    Replace,
    /// Move the cursor to an existing, equal entry. The entry itself is
    /// left as it was.
    Replay {
        /// History index being replayed.
        index: usize,
    },
}

/// What a commit displaced.
#[derive(Debug, Default)]
pub(crate) struct CommitOutcome {
    /// The view that was displayed before the commit, if it differs from the
    /// committed one.
    pub(crate) previous: Option<ActionResult>,
    /// Results that left the history and are no longer displayed.
    pub(crate) evicted: Vec<ActionResult>,
}

/// Router state: history, the displayed view and the navigation generation.
#[derive(Debug, Default)]
pub(crate) struct RouterState {
    history: HistoryStack,
    active: Option<ActionResult>,
    navigation_id: AtomicUsize,
}

impl RouterState {
    /// Create a new router state
    pub fn new(history_capacity: Option<usize>) -> Self {
        Self {
            history: HistoryStack::with_capacity(history_capacity),
            active: None,
            navigation_id: AtomicUsize::new(0),
        }
    }

    /// Get current navigation ID
    pub fn navigation_id(&self) -> usize {
        self.navigation_id.load(Ordering::SeqCst)
    }

    /// Start a new navigation and return the new navigation ID
    ///
    /// Completions carrying an older ID are stale.
    pub fn start_navigation(&self) -> usize {
        self.navigation_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Check if a navigation is still current (not superseded by a newer one)
    pub fn is_navigation_current(&self, nav_id: usize) -> bool {
        self.navigation_id() == nav_id
    }

    /// The history stack.
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// The displayed full view.
    pub fn active(&self) -> Option<&ActionResult> {
        self.active.as_ref()
    }

    /// Record `result` as the displayed view.
    ///
    /// The caller destroys whatever comes back in the outcome, outside any
    /// lock. A replay whose index no longer exists falls back to a push.
    pub(crate) fn commit(
        &mut self,
        result: ActionResult,
        kind: CommitKind,
        args: NavigationArgs,
    ) -> CommitOutcome {
        let mut evicted = match kind {
            CommitKind::Replay { index }
                if self.history.get(index).is_some_and(|entry| *entry == result) =>
            {
                self.history.move_to(index);
                Vec::new()
            }
            CommitKind::Replay { index } => {
                debug_log!(
                    "History entry {} changed during replay of '{}', pushing instead",
                    index,
                    result.route_url()
                );
                self.history.push(result.clone(), args)
            }
            CommitKind::Push => self.history.push(result.clone(), args),
            CommitKind::Replace => self
                .history
                .replace_current(result.clone(), args)
                .into_iter()
                .collect(),
        };

        debug_log!(
            "Committed '{}' ({:?}), cursor at {:?}",
            result.route_url(),
            kind,
            self.history.cursor()
        );

        let previous = self
            .active
            .replace(result.clone())
            .filter(|previous| !previous.same_instance(&result));

        // The previous view is handed back separately.
        evicted.retain(|entry| {
            !entry.same_instance(&result)
                && previous
                    .as_ref()
                    .map_or(true, |previous| !previous.same_instance(entry))
        });

        CommitOutcome { previous, evicted }
    }

    /// Clear the history. The displayed view stays.
    pub(crate) fn clear_history(&mut self) -> Vec<ActionResult> {
        let active = self.active.as_ref();
        let mut dropped = self.history.clear();
        dropped.retain(|entry| active.map_or(true, |active| !active.same_instance(entry)));
        dropped
    }

    /// Clear everything and start a new generation. Returns the results to
    /// destroy.
    pub(crate) fn reset(&mut self) -> Vec<ActionResult> {
        self.start_navigation();
        let mut dropped = self.history.clear();
        if let Some(active) = self.active.take() {
            if !dropped.iter().any(|entry| entry.same_instance(&active)) {
                dropped.push(active);
            }
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::{ActionType, ViewResult};

    fn entry(route: &str) -> ActionResult {
        let result = ActionResult::pending(route, ActionType::View);
        result.fulfill(ViewResult::new("Home", "Index"));
        result
    }

    fn routes(history: &HistoryStack) -> Vec<&str> {
        history.entries().iter().map(ActionResult::route_url).collect()
    }

    #[test]
    fn test_empty_history() {
        let history = HistoryStack::new();
        assert_eq!(history.cursor(), None);
        assert!(history.current().is_none());
        assert!(!history.can_go_back());
        assert!(!history.can_go_forward());
        assert_eq!(history.back_index(1), None);
        assert_eq!(history.forward_index(1), None);
    }

    #[test]
    fn test_push_moves_cursor() {
        let mut history = HistoryStack::new();
        history.push(entry("A/A"), NavigationArgs::new());
        history.push(entry("B/B"), NavigationArgs::new());

        assert_eq!(history.cursor(), Some(1));
        assert_eq!(history.current().map(ActionResult::route_url), Some("B/B"));
        assert!(history.can_go_back());
        assert!(!history.can_go_forward());
    }

    #[test]
    fn test_push_discards_forward_branch() {
        let mut history = HistoryStack::new();
        for route in ["A/A", "B/B", "C/C"] {
            history.push(entry(route), NavigationArgs::new());
        }
        assert!(history.move_to(1));

        let dropped = history.push(entry("D/D"), NavigationArgs::new());
        assert_eq!(routes(&history), vec!["A/A", "B/B", "D/D"]);
        assert_eq!(history.cursor(), Some(2));
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].route_url(), "C/C");
        assert!(history.args_for("C/C").is_none());
    }

    #[test]
    fn test_move_to_leaves_entries() {
        let mut history = HistoryStack::new();
        for route in ["A/A", "B/B", "C/C"] {
            history.push(entry(route), NavigationArgs::new());
        }
        assert!(history.move_to(0));
        assert!(history.move_to(0));
        assert!(!history.move_to(3));
        assert_eq!(history.cursor(), Some(0));
        assert_eq!(routes(&history), vec!["A/A", "B/B", "C/C"]);
        assert!(history.can_go_forward());
    }

    #[test]
    fn test_clamped_indices() {
        let mut history = HistoryStack::new();
        for route in ["A/A", "B/B", "C/C"] {
            history.push(entry(route), NavigationArgs::new());
        }
        history.move_to(1);
        assert_eq!(history.back_index(5), Some(0));
        assert_eq!(history.forward_index(5), Some(2));
        assert_eq!(history.back_index(0), Some(1));
    }

    #[test]
    fn test_replace_current() {
        let mut history = HistoryStack::new();
        assert!(history.replace_current(entry("A/A"), NavigationArgs::new()).is_none());
        assert_eq!(history.len(), 1);

        history.push(entry("B/B"), NavigationArgs::new().with(7_u8));
        let replaced = history.replace_current(entry("C/C"), NavigationArgs::new());
        assert_eq!(replaced.map(|r| r.route_url().to_string()), Some("B/B".to_string()));
        assert_eq!(routes(&history), vec!["A/A", "C/C"]);
        assert!(history.args_for("B/B").is_none());
    }

    #[test]
    fn test_args_per_route() {
        let mut history = HistoryStack::new();
        history.push(entry("Shop/Item/1"), NavigationArgs::new().with("gold"));
        history.push(entry("Home/Index"), NavigationArgs::new());

        let args = history.args_for("Shop/Item/1").unwrap();
        assert_eq!(args.get_as::<&str>(0), Some(&"gold"));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = HistoryStack::with_capacity(Some(2));
        history.push(entry("A/A"), NavigationArgs::new());
        history.push(entry("B/B"), NavigationArgs::new());
        let evicted = history.push(entry("C/C"), NavigationArgs::new());

        assert_eq!(routes(&history), vec!["B/B", "C/C"]);
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(evicted.len(), 1);
        assert_eq!(history.capacity(), Some(2));
    }

    #[test]
    fn test_clear() {
        let mut history = HistoryStack::new();
        history.push(entry("A/A"), NavigationArgs::new().with(1_i32));
        let dropped = history.clear();
        assert_eq!(dropped.len(), 1);
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
        assert!(history.args_for("A/A").is_none());
    }

    #[test]
    fn test_navigation_id() {
        let state = RouterState::default();
        let first = state.start_navigation();
        assert!(state.is_navigation_current(first));
        let second = state.start_navigation();
        assert!(!state.is_navigation_current(first));
        assert!(state.is_navigation_current(second));
    }

    #[test]
    fn test_commit_returns_previous() {
        let mut state = RouterState::new(None);
        let a = entry("A/A");
        let b = entry("B/B");

        let outcome = state.commit(a.clone(), CommitKind::Push, NavigationArgs::new());
        assert!(outcome.previous.is_none());

        let outcome = state.commit(b.clone(), CommitKind::Push, NavigationArgs::new());
        assert!(outcome.previous.is_some_and(|p| p.same_instance(&a)));
        assert!(state.active().is_some_and(|active| active.same_instance(&b)));
    }

    #[test]
    fn test_commit_replay_moves_cursor() {
        let mut state = RouterState::new(None);
        let a = entry("A/A");
        let b = entry("B/B");
        state.commit(a.clone(), CommitKind::Push, NavigationArgs::new());
        state.commit(b, CommitKind::Push, NavigationArgs::new());

        let replayed = entry("A/A");
        let outcome = state.commit(replayed.clone(), CommitKind::Replay { index: 0 }, NavigationArgs::new());
        assert!(outcome.evicted.is_empty());
        assert!(state.history().get(0).is_some_and(|e| e.same_instance(&a)));
        assert!(state.active().is_some_and(|e| e.same_instance(&replayed)));
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history().cursor(), Some(0));
    }

    #[test]
    fn test_commit_replay_falls_back_to_push() {
        let mut state = RouterState::new(None);
        state.commit(entry("A/A"), CommitKind::Push, NavigationArgs::new());

        state.commit(entry("B/B"), CommitKind::Replay { index: 4 }, NavigationArgs::new());
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history().cursor(), Some(1));
    }

    #[test]
    fn test_forward_branch_not_double_destroyed() {
        let mut state = RouterState::new(None);
        let a = entry("A/A");
        let b = entry("B/B");
        state.commit(a.clone(), CommitKind::Push, NavigationArgs::new());
        state.commit(b.clone(), CommitKind::Push, NavigationArgs::new());
        state.commit(a, CommitKind::Replay { index: 0 }, NavigationArgs::new());

        // B leaves with the forward branch; A is handed back as the previous view.
        let outcome = state.commit(entry("C/C"), CommitKind::Push, NavigationArgs::new());
        assert!(outcome.previous.is_some_and(|p| p.route_url() == "A/A"));
        assert_eq!(outcome.evicted.len(), 1);
        assert!(outcome.evicted[0].same_instance(&b));
    }

    #[test]
    fn test_clear_history_keeps_active() {
        let mut state = RouterState::new(None);
        let a = entry("A/A");
        state.commit(a.clone(), CommitKind::Push, NavigationArgs::new());
        state.commit(entry("B/B"), CommitKind::Push, NavigationArgs::new());

        let dropped = state.clear_history();
        assert_eq!(dropped.len(), 1);
        assert!(dropped[0].same_instance(&a));
        assert!(state.active().is_some());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_reset_bumps_generation() {
        let mut state = RouterState::new(None);
        let id = state.start_navigation();
        state.commit(entry("A/A"), CommitKind::Push, NavigationArgs::new());

        let dropped = state.reset();
        assert_eq!(dropped.len(), 1);
        assert!(state.active().is_none());
        assert!(!state.is_navigation_current(id));
    }
}
