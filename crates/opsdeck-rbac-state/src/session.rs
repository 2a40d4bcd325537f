//! Edit-session controller: single-slot inline assignment state.
//!
//! Each owning collection affords one inline assignment row at a time.
//! Starting an edit on another row silently abandons the previous one —
//! no confirmation, no autosave; an unsubmitted candidate selection is
//! simply discarded.

use std::collections::HashMap;
use std::hash::Hash;

use opsdeck_rbac_core::{NamespaceId, PermissionId, ProcessId, RoleId, UserId};

/// Edit state of one owning collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState<O> {
    Idle,
    Editing(O),
}

/// A one-shot directive for the presentation layer: focus-and-select the
/// assignment input for `owner` and open its candidate panel on the next
/// render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest<O> {
    pub owner: O,
    pub open_panel: bool,
}

/// Single-slot edit session for one owning collection.
///
/// Selection slots and per-owner search text are explicit maps owned here,
/// handed to the presentation layer by reference — never ambient state.
#[derive(Debug)]
pub struct EditSessionController<O, R> {
    state: EditState<O>,
    selection: HashMap<O, R>,
    search: HashMap<O, String>,
    focus: Option<FocusRequest<O>>,
}

impl<O, R> Default for EditSessionController<O, R> {
    fn default() -> Self {
        Self {
            state: EditState::Idle,
            selection: HashMap::new(),
            search: HashMap::new(),
            focus: None,
        }
    }
}

impl<O: Copy + Eq + Hash, R: Copy> EditSessionController<O, R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditState<O> {
        self.state
    }

    /// The owner currently in assign mode, if any.
    pub fn editing(&self) -> Option<O> {
        match self.state {
            EditState::Idle => None,
            EditState::Editing(owner) => Some(owner),
        }
    }

    /// Enter assign mode for `owner`.
    ///
    /// Resets the owner's pending selection, clears its search text, and
    /// schedules focus-and-open for the next render pass. Any other owner's
    /// in-progress edit is abandoned without warning.
    pub fn start_edit(&mut self, owner: O) {
        if let EditState::Editing(previous) = self.state {
            self.selection.remove(&previous);
        }
        self.state = EditState::Editing(owner);
        self.selection.remove(&owner);
        self.search.remove(&owner);
        self.focus = Some(FocusRequest {
            owner,
            open_panel: true,
        });
    }

    /// Leave assign mode unconditionally. Does not trigger a reload; that
    /// is the mutator's responsibility on success.
    pub fn finish_edit(&mut self) {
        self.state = EditState::Idle;
        self.focus = None;
    }

    /// Leave assign mode only if `owner` is the one editing. Used by the
    /// mutator so a completed call for row A never closes a newer edit on
    /// row B.
    pub fn finish_edit_for(&mut self, owner: O) {
        if self.state == EditState::Editing(owner) {
            self.finish_edit();
        }
    }

    /// Consume the pending focus directive, if any.
    pub fn take_focus_request(&mut self) -> Option<FocusRequest<O>> {
        self.focus.take()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Per-owner Slots
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_selection(&mut self, owner: O, related: R) {
        self.selection.insert(owner, related);
    }

    pub fn selection(&self, owner: O) -> Option<R> {
        self.selection.get(&owner).copied()
    }

    pub fn clear_selection(&mut self, owner: O) {
        self.selection.remove(&owner);
    }

    pub fn set_search(&mut self, owner: O, text: impl Into<String>) {
        self.search.insert(owner, text.into());
    }

    pub fn search(&self, owner: O) -> &str {
        self.search.get(&owner).map(String::as_str).unwrap_or("")
    }

    pub fn clear_search(&mut self, owner: O) {
        self.search.remove(&owner);
    }
}

/// The three edit sessions, one per owning collection.
#[derive(Debug, Default)]
pub struct EditSessions {
    pub user_roles: EditSessionController<UserId, RoleId>,
    pub role_permissions: EditSessionController<RoleId, PermissionId>,
    pub process_namespaces: EditSessionController<ProcessId, NamespaceId>,
}

impl EditSessions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_slot_per_collection() {
        let mut session: EditSessionController<UserId, RoleId> = EditSessionController::new();

        session.start_edit(UserId::new(1));
        session.set_selection(UserId::new(1), RoleId::new(10));

        // Starting B abandons A, discarding A's pending selection.
        session.start_edit(UserId::new(2));
        assert_eq!(session.editing(), Some(UserId::new(2)));
        assert_eq!(session.selection(UserId::new(1)), None);
    }

    #[test]
    fn test_start_edit_resets_slot_and_search() {
        let mut session: EditSessionController<UserId, RoleId> = EditSessionController::new();

        session.set_selection(UserId::new(1), RoleId::new(10));
        session.set_search(UserId::new(1), "adm");

        session.start_edit(UserId::new(1));
        assert_eq!(session.selection(UserId::new(1)), None);
        assert_eq!(session.search(UserId::new(1)), "");
    }

    #[test]
    fn test_focus_request_is_one_shot() {
        let mut session: EditSessionController<UserId, RoleId> = EditSessionController::new();

        session.start_edit(UserId::new(1));
        let focus = session.take_focus_request().unwrap();
        assert_eq!(focus.owner, UserId::new(1));
        assert!(focus.open_panel);
        assert_eq!(session.take_focus_request(), None);
    }

    #[test]
    fn test_finish_edit_unconditional() {
        let mut session: EditSessionController<UserId, RoleId> = EditSessionController::new();

        session.start_edit(UserId::new(1));
        session.finish_edit();
        assert_eq!(session.state(), EditState::Idle);
        assert_eq!(session.take_focus_request(), None);
    }

    #[test]
    fn test_finish_edit_for_other_owner_is_noop() {
        let mut session: EditSessionController<UserId, RoleId> = EditSessionController::new();

        session.start_edit(UserId::new(2));
        session.finish_edit_for(UserId::new(1));
        assert_eq!(session.editing(), Some(UserId::new(2)));

        session.finish_edit_for(UserId::new(2));
        assert_eq!(session.editing(), None);
    }
}
