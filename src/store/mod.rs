//! The user store: loaded users, load state, and the create/edit modal.
//!
//! Every piece of state lives in an [`Observable`] cell. Cell changes are
//! forwarded to store-level subscribers as [`StoreChange`] events, so a view
//! can redraw or re-clamp its selection without polling.
//!
//! Nothing here talks to a terminal or blocks on the user: deletes take a
//! [`Confirm`] answer and saves return a [`ValidationError`] instead of
//! raising a dialog.

mod validate;

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::error::{LoadError, ValidationError};
use crate::model::{Draft, DraftField, User, UserId};
use crate::observe::{Observable, SubscriptionId, Subscribers};
use crate::remote::{PendingLoad, UserSource};

pub use validate::validate_email;

/// Prompt handed to [`Confirm`] before a delete.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this user?";

/// Which kind of form the modal is showing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ModalMode {
    #[default]
    Create,
    Edit,
}

impl ModalMode {
    pub fn title(self) -> &'static str {
        match self {
            ModalMode::Create => "Create New User",
            ModalMode::Edit => "Edit User",
        }
    }
}

/// Visibility plus mode of the modal.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modal {
    pub visible: bool,
    pub mode: ModalMode,
}

/// Which cell of the store changed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StoreChange {
    Users,
    Loading,
    Error,
    Modal,
    Draft,
}

/// Result of a save that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// A new user was appended under this id.
    Created(UserId),
    /// The user with this id was replaced in place.
    Updated(UserId),
    /// The edited user no longer exists; nothing changed.
    StaleTarget(UserId),
    /// The modal was not open; nothing changed.
    Inactive,
    /// Users are still loading; nothing changed and the modal stays open.
    Loading,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    Removed(User),
    NotFound,
    Declined,
}

/// Answers the yes/no question asked before a delete.
pub trait Confirm {
    fn confirm(self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnOnce(&str) -> bool,
{
    fn confirm(self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// A confirmation answer decided ahead of the call, e.g. by a dialog.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Accepted,
    Declined,
}

impl Confirm for Confirmation {
    fn confirm(self, _prompt: &str) -> bool {
        self == Confirmation::Accepted
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LoadPhase {
    Idle,
    InFlight,
    Settled,
}

type ChangeBus = Rc<RefCell<Subscribers<StoreChange>>>;

pub struct UserStore {
    users: Observable<Vec<User>>,
    is_loading: Observable<bool>,
    error: Observable<Option<String>>,
    modal: Observable<Modal>,
    draft: Observable<Draft>,
    phase: LoadPhase,
    changes: ChangeBus,
}

/// Re-publish every change of `cell` on the store-level bus as `change`.
fn forward<T: 'static>(cell: &mut Observable<T>, bus: &ChangeBus, change: StoreChange) {
    let bus = Rc::clone(bus);
    cell.subscribe(move |_| bus.borrow_mut().notify(&change));
}

impl UserStore {
    /// A store waiting for its one load: loading, no users, modal closed.
    pub fn new() -> Self {
        let changes: ChangeBus = Rc::new(RefCell::new(Subscribers::new()));

        let mut users = Observable::new(Vec::new());
        forward(&mut users, &changes, StoreChange::Users);
        let mut is_loading = Observable::new(true);
        forward(&mut is_loading, &changes, StoreChange::Loading);
        let mut error: Observable<Option<String>> = Observable::new(None);
        forward(&mut error, &changes, StoreChange::Error);
        let mut modal = Observable::new(Modal::default());
        forward(&mut modal, &changes, StoreChange::Modal);
        let mut draft = Observable::new(Draft::default());
        forward(&mut draft, &changes, StoreChange::Draft);

        Self {
            users,
            is_loading,
            error,
            modal,
            draft,
            phase: LoadPhase::Idle,
            changes,
        }
    }

    /// Create a store and load it synchronously from `source`.
    pub fn load_from(source: &dyn UserSource) -> Self {
        let mut store = Self::new();
        store.fetch_users(source);
        store
    }

    // ----- reads -----

    pub fn users(&self) -> &[User] {
        self.users.get()
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.get().iter().find(|u| u.id == id)
    }

    pub fn is_loading(&self) -> bool {
        *self.is_loading.get()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.get().as_deref()
    }

    pub fn modal_visible(&self) -> bool {
        self.modal.get().visible
    }

    pub fn modal_mode(&self) -> ModalMode {
        self.modal.get().mode
    }

    pub fn draft(&self) -> &Draft {
        self.draft.get()
    }

    /// Title for the form, derived from the modal mode.
    pub fn modal_title(&self) -> &'static str {
        self.modal_mode().title()
    }

    // ----- subscriptions -----

    /// Call `callback` after every change to a store cell.
    pub fn watch<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&StoreChange) + 'static,
    {
        self.changes.borrow_mut().subscribe(callback)
    }

    pub fn unwatch(&mut self, id: SubscriptionId) -> bool {
        self.changes.borrow_mut().unsubscribe(id)
    }

    // ----- loading -----

    /// Run the one load synchronously. Returns false if a load was already
    /// started, in which case `source` is not called.
    pub fn fetch_users(&mut self, source: &dyn UserSource) -> bool {
        if !self.begin_load() {
            return false;
        }
        let outcome = source.fetch_users();
        self.finish_load(outcome)
    }

    /// Start the one load on a background thread. The caller polls the
    /// returned handle and passes the outcome to [`UserStore::finish_load`].
    pub fn spawn_fetch<S>(&mut self, source: S) -> Option<PendingLoad>
    where
        S: UserSource + Send + 'static,
    {
        if !self.begin_load() {
            return None;
        }
        Some(PendingLoad::spawn(source))
    }

    fn begin_load(&mut self) -> bool {
        if self.phase != LoadPhase::Idle {
            warn!(phase = ?self.phase, "load already started; ignoring");
            return false;
        }
        self.phase = LoadPhase::InFlight;
        true
    }

    /// Apply the outcome of the load. Only the first outcome of a started
    /// load is accepted; `is_loading` drops to false either way.
    pub fn finish_load(&mut self, outcome: Result<Vec<User>, LoadError>) -> bool {
        if self.phase != LoadPhase::InFlight {
            warn!(phase = ?self.phase, "unexpected load outcome; ignoring");
            return false;
        }
        match outcome {
            Ok(fetched) => {
                let fetched = dedupe_ids(fetched);
                info!(count = fetched.len(), "users loaded");
                self.users.replace(fetched);
                self.error.set(None);
            }
            Err(err) => {
                warn!(error = %err, "failed to load users");
                self.error.set(Some(err.to_string()));
            }
        }
        self.phase = LoadPhase::Settled;
        self.is_loading.set(false);
        true
    }

    // ----- modal -----

    pub fn open_create_modal(&mut self) {
        self.draft.set(Draft::default());
        self.modal.set(Modal { visible: true, mode: ModalMode::Create });
    }

    /// Open the form on a copy of `user`; the stored record is untouched
    /// until a save.
    pub fn open_edit_modal(&mut self, user: &User) {
        self.draft.set(Draft::from(user));
        self.modal.set(Modal { visible: true, mode: ModalMode::Edit });
    }

    /// Hide the form. The draft is kept as is but is inert until the next open.
    pub fn close_modal(&mut self) {
        let mode = self.modal.get().mode;
        self.modal.set(Modal { visible: false, mode });
    }

    /// Mutate the draft's text fields. The draft id cannot be changed here.
    pub fn edit_draft(&mut self, f: impl FnOnce(&mut Draft)) {
        let id = self.draft.get().id;
        self.draft.update(|draft| {
            f(draft);
            draft.id = id;
        });
    }

    pub fn set_draft_field(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        self.edit_draft(|draft| *draft.field_mut(field) = value);
    }

    // ----- mutations -----

    /// Commit the draft. An invalid email, an exhausted id space, or a
    /// create before the load has finished leaves everything as it was,
    /// modal included; otherwise the modal is closed afterwards.
    pub fn save_user(&mut self) -> Result<SaveOutcome, ValidationError> {
        if !self.modal.get().visible {
            debug!("save requested with the modal closed");
            return Ok(SaveOutcome::Inactive);
        }
        if let Err(err) = validate_email(&self.draft.get().email) {
            debug!(error = %err, "draft rejected");
            return Err(err);
        }

        let mode = self.modal.get().mode;
        let target = self.draft.get().id;
        if mode == ModalMode::Create && self.is_loading() {
            debug!("create held back until users are loaded");
            return Ok(SaveOutcome::Loading);
        }
        let outcome = match mode {
            ModalMode::Create => {
                let id = self.next_id()?;
                let user = self.draft.get().to_user(id);
                self.users.update(|users| users.push(user));
                info!(id, "user created");
                SaveOutcome::Created(id)
            }
            ModalMode::Edit => match target {
                Some(id) => self.replace_user(id),
                None => {
                    warn!("edit draft without an id");
                    SaveOutcome::Inactive
                }
            },
        };
        self.close_modal();
        Ok(outcome)
    }

    fn replace_user(&mut self, id: UserId) -> SaveOutcome {
        let Some(index) = self.users.get().iter().position(|u| u.id == id) else {
            debug!(id, "edited user is gone; nothing to update");
            return SaveOutcome::StaleTarget(id);
        };
        let user = self.draft.get().to_user(id);
        self.users.update(|users| users[index] = user);
        info!(id, "user updated");
        SaveOutcome::Updated(id)
    }

    /// Remove the user with `id` once `confirm` agrees.
    pub fn delete_user<C: Confirm>(&mut self, id: UserId, confirm: C) -> DeleteOutcome {
        if !confirm.confirm(DELETE_PROMPT) {
            return DeleteOutcome::Declined;
        }
        let Some(index) = self.users.get().iter().position(|u| u.id == id) else {
            debug!(id, "delete of unknown user");
            return DeleteOutcome::NotFound;
        };
        let removed = self.users.get()[index].clone();
        self.users.update(|users| {
            users.remove(index);
        });
        info!(id, "user deleted");
        DeleteOutcome::Removed(removed)
    }

    fn next_id(&self) -> Result<UserId, ValidationError> {
        match self.users.get().iter().map(|u| u.id).max() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(ValidationError::IdExhausted(max)),
        }
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UserStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserStore")
            .field("users", self.users.get())
            .field("is_loading", self.is_loading.get())
            .field("error", self.error.get())
            .field("modal", self.modal.get())
            .field("draft", self.draft.get())
            .field("phase", &self.phase)
            .finish()
    }
}

/// Keep the first record for each id.
fn dedupe_ids(users: Vec<User>) -> Vec<User> {
    let mut seen = HashSet::with_capacity(users.len());
    users
        .into_iter()
        .filter(|u| {
            let fresh = seen.insert(u.id);
            if !fresh {
                warn!(id = u.id, "dropping user with duplicate id");
            }
            fresh
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn mk_user(id: UserId, name: &str, email: &str) -> User {
        User {
            id,
            name: name.to_string(),
            username: name.to_lowercase(),
            email: email.to_string(),
            phone: String::new(),
        }
    }

    struct Counting {
        calls: Cell<usize>,
        outcome: Result<Vec<User>, LoadError>,
    }

    impl Counting {
        fn new(outcome: Result<Vec<User>, LoadError>) -> Self {
            Self { calls: Cell::new(0), outcome }
        }
    }

    impl UserSource for Counting {
        fn fetch_users(&self) -> Result<Vec<User>, LoadError> {
            self.calls.set(self.calls.get() + 1);
            self.outcome.clone()
        }
    }

    fn loaded(users: Vec<User>) -> UserStore {
        UserStore::load_from(&Counting::new(Ok(users)))
    }

    #[test]
    fn new_store_is_loading_and_empty() {
        let store = UserStore::new();
        assert!(store.is_loading());
        assert!(store.users().is_empty());
        assert!(store.error().is_none());
        assert!(!store.modal_visible());
    }

    #[test]
    fn only_one_load_is_ever_attempted() {
        let source = Counting::new(Ok(vec![mk_user(1, "Ann", "ann@x.io")]));
        let mut store = UserStore::new();
        assert!(store.fetch_users(&source));
        assert!(!store.fetch_users(&source));
        assert_eq!(source.calls.get(), 1);
        assert!(!store.is_loading());
        assert_eq!(store.users().len(), 1);
    }

    #[test]
    fn late_outcomes_are_ignored() {
        let mut store = loaded(vec![mk_user(1, "Ann", "ann@x.io")]);
        assert!(!store.finish_load(Ok(vec![])));
        assert!(!store.finish_load(Err(LoadError::Malformed)));
        assert_eq!(store.users().len(), 1);
        assert!(store.error().is_none());
    }

    #[test]
    fn outcome_before_start_is_ignored() {
        let mut store = UserStore::new();
        assert!(!store.finish_load(Ok(vec![mk_user(1, "Ann", "ann@x.io")])));
        assert!(store.is_loading());
        assert!(store.users().is_empty());
    }

    #[test]
    fn failed_load_sets_error_and_stops_loading() {
        let store = UserStore::load_from(&Counting::new(Err(LoadError::Network { status: 500 })));
        assert!(!store.is_loading());
        assert!(store.users().is_empty());
        assert_eq!(store.error(), Some("HTTP error: 500"));
    }

    #[test]
    fn duplicate_ids_in_payload_keep_the_first() {
        let store = loaded(vec![
            mk_user(1, "Ann", "ann@x.io"),
            mk_user(2, "Bob", "bob@x.io"),
            mk_user(1, "Imposter", "imp@x.io"),
        ]);
        let names: Vec<_> = store.users().iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Ann", "Bob"]);
    }

    #[test]
    fn create_appends_with_max_plus_one() {
        let mut store = loaded(vec![mk_user(3, "Ann", "ann@x.io"), mk_user(7, "Bob", "bob@x.io")]);
        store.open_create_modal();
        store.set_draft_field(DraftField::Name, "Cy");
        store.set_draft_field(DraftField::Email, "cy@x.io");
        assert_eq!(store.save_user(), Ok(SaveOutcome::Created(8)));
        assert_eq!(store.users().last().map(|u| u.id), Some(8));
        assert_eq!(store.users().last().map(|u| u.name.as_str()), Some("Cy"));
        assert!(!store.modal_visible());
    }

    #[test]
    fn create_on_empty_list_starts_at_one() {
        let mut store = loaded(vec![]);
        store.open_create_modal();
        store.set_draft_field(DraftField::Email, "a@b.com");
        assert_eq!(store.save_user(), Ok(SaveOutcome::Created(1)));
        assert_eq!(store.users().len(), 1);
        assert_eq!(store.users()[0].id, 1);
        assert_eq!(store.users()[0].phone, "");
    }

    #[test]
    fn invalid_email_keeps_modal_open_and_users_untouched() {
        let mut store = loaded(vec![mk_user(1, "Ann", "ann@x.io")]);
        store.open_create_modal();
        store.set_draft_field(DraftField::Email, "bad");
        assert_eq!(
            store.save_user(),
            Err(ValidationError::InvalidEmail("bad".to_string()))
        );
        assert_eq!(store.users().len(), 1);
        assert!(store.modal_visible());
        assert!(store.user(2).is_none());

        store.set_draft_field(DraftField::Email, "");
        assert_eq!(store.save_user(), Err(ValidationError::MissingEmail));
        assert!(store.modal_visible());
    }

    #[test]
    fn create_while_loading_is_held_back() {
        let mut store = UserStore::new();
        let pending = store.spawn_fetch(Counting::new(Ok(vec![mk_user(1, "Ann", "ann@x.io")])));
        store.open_create_modal();
        store.set_draft_field(DraftField::Email, "new@x.io");
        assert_eq!(store.save_user(), Ok(SaveOutcome::Loading));
        assert!(store.is_loading());
        assert!(store.users().is_empty());
        assert!(store.modal_visible());

        let outcome = pending.map(PendingLoad::wait).unwrap_or(Err(LoadError::Malformed));
        assert!(store.finish_load(outcome));
        assert_eq!(store.users(), [mk_user(1, "Ann", "ann@x.io")].as_slice());

        assert_eq!(store.save_user(), Ok(SaveOutcome::Created(2)));
        assert_eq!(store.users().len(), 2);
    }

    #[test]
    fn create_after_max_id_fails_without_panicking() {
        let mut store = loaded(vec![mk_user(u64::MAX, "Max", "max@x.io")]);
        store.open_create_modal();
        store.set_draft_field(DraftField::Email, "a@b.com");
        assert_eq!(store.save_user(), Err(ValidationError::IdExhausted(u64::MAX)));
        assert_eq!(store.users().len(), 1);
        assert!(store.modal_visible());
    }

    #[test]
    fn edit_replaces_in_place() {
        let mut store = loaded(vec![
            mk_user(1, "Ann", "ann@x.io"),
            mk_user(2, "Bob", "bob@x.io"),
            mk_user(3, "Cy", "cy@x.io"),
        ]);
        let bob = store.users()[1].clone();
        store.open_edit_modal(&bob);
        assert_eq!(store.modal_mode(), ModalMode::Edit);
        assert_eq!(store.draft().id, Some(2));
        store.set_draft_field(DraftField::Name, "Robert");
        assert_eq!(store.save_user(), Ok(SaveOutcome::Updated(2)));
        assert_eq!(store.users().len(), 3);
        assert_eq!(store.users()[1].name, "Robert");
        assert_eq!(store.users()[1].id, 2);
    }

    #[test]
    fn edit_of_vanished_user_is_tolerated() {
        let mut store = loaded(vec![mk_user(1, "Ann", "ann@x.io"), mk_user(2, "Bob", "bob@x.io")]);
        let bob = store.users()[1].clone();
        store.open_edit_modal(&bob);
        store.delete_user(2, Confirmation::Accepted);
        assert_eq!(store.save_user(), Ok(SaveOutcome::StaleTarget(2)));
        assert_eq!(store.users().len(), 1);
        assert!(!store.modal_visible());
    }

    #[test]
    fn draft_edits_do_not_touch_stored_user_until_save() {
        let mut store = loaded(vec![mk_user(1, "Ann", "ann@x.io")]);
        let ann = store.users()[0].clone();
        store.open_edit_modal(&ann);
        store.set_draft_field(DraftField::Name, "Changed");
        store.close_modal();
        assert_eq!(store.users()[0].name, "Ann");
        assert_eq!(store.draft().name, "Changed");
    }

    #[test]
    fn edit_draft_cannot_retarget_the_id() {
        let mut store = loaded(vec![mk_user(1, "Ann", "ann@x.io")]);
        let ann = store.users()[0].clone();
        store.open_edit_modal(&ann);
        store.edit_draft(|d| {
            d.id = Some(99);
            d.phone = "555".into();
        });
        assert_eq!(store.draft().id, Some(1));
        assert_eq!(store.draft().phone, "555");
    }

    #[test]
    fn open_create_resets_draft_after_edit() {
        let mut store = loaded(vec![mk_user(1, "Ann", "ann@x.io")]);
        let ann = store.users()[0].clone();
        store.open_edit_modal(&ann);
        store.open_create_modal();
        assert_eq!(store.draft(), &Draft::default());
        assert_eq!(store.modal_title(), "Create New User");
        store.open_create_modal();
        assert!(store.modal_visible());
    }

    #[test]
    fn save_with_closed_modal_does_nothing() {
        let mut store = loaded(vec![]);
        store.open_create_modal();
        store.set_draft_field(DraftField::Email, "a@b.com");
        store.close_modal();
        assert_eq!(store.save_user(), Ok(SaveOutcome::Inactive));
        assert!(store.users().is_empty());
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut store = loaded(vec![mk_user(1, "Ann", "ann@x.io"), mk_user(2, "Bob", "bob@x.io")]);
        let mut asked = String::new();
        let outcome = store.delete_user(1, |prompt: &str| {
            asked = prompt.to_string();
            false
        });
        assert_eq!(outcome, DeleteOutcome::Declined);
        assert_eq!(asked, DELETE_PROMPT);
        assert_eq!(store.users().len(), 2);

        let outcome = store.delete_user(1, Confirmation::Accepted);
        assert!(matches!(outcome, DeleteOutcome::Removed(ref u) if u.id == 1));
        assert_eq!(store.users().len(), 1);
        assert_eq!(store.users()[0].id, 2);
    }

    #[test]
    fn delete_unknown_id_is_a_no_op() {
        let mut store = loaded(vec![mk_user(1, "Ann", "ann@x.io")]);
        assert_eq!(store.delete_user(42, Confirmation::Accepted), DeleteOutcome::NotFound);
        assert_eq!(store.users().len(), 1);
    }

    #[test]
    fn modal_title_follows_mode() {
        let mut store = loaded(vec![mk_user(1, "Ann", "ann@x.io")]);
        assert_eq!(store.modal_title(), "Create New User");
        let ann = store.users()[0].clone();
        store.open_edit_modal(&ann);
        assert_eq!(store.modal_title(), "Edit User");
    }

    #[test]
    fn watchers_see_each_changed_cell() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut store = UserStore::new();
        let id = store.watch(move |change| sink.borrow_mut().push(*change));

        store.fetch_users(&Counting::new(Ok(vec![mk_user(1, "Ann", "ann@x.io")])));
        assert_eq!(*log.borrow(), vec![StoreChange::Users, StoreChange::Loading]);

        log.borrow_mut().clear();
        store.open_create_modal();
        // Draft was already empty, so only the modal cell changed.
        assert_eq!(*log.borrow(), vec![StoreChange::Modal]);

        assert!(store.unwatch(id));
        store.close_modal();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn failed_load_publishes_error_then_loading() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let mut store = UserStore::new();
        store.watch(move |change| sink.borrow_mut().push(*change));
        store.fetch_users(&Counting::new(Err(LoadError::Malformed)));
        assert_eq!(*log.borrow(), vec![StoreChange::Error, StoreChange::Loading]);
    }
}
