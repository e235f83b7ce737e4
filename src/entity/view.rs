//! List view state machine
//!
//! ```text
//! Idle --begin_create--> Creating --submit/cancel--> Idle
//! Idle --begin_edit----> Editing  --submit/cancel--> Idle
//! Idle --begin_delete--> ConfirmingDelete --confirm_delete/cancel--> Idle
//! ```

use super::{Entity, EntityList};
use crate::store::StoreError;
use thiserror::Error;

/// Where the list view currently is
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<E> {
    Idle,
    Creating,
    Editing(E),
    ConfirmingDelete(String),
}

impl<E> ViewState<E> {
    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Idle => "idle",
            ViewState::Creating => "creating",
            ViewState::Editing(_) => "editing",
            ViewState::ConfirmingDelete(_) => "confirming_delete",
        }
    }
}

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("{0} not found: {1}")]
    NotFound(&'static str, String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// A list of `E` plus the modal state layered over it
pub struct ListView<E: Entity> {
    list: EntityList<E>,
    state: ViewState<E>,
}

impl<E: Entity> ListView<E> {
    pub fn new(list: EntityList<E>) -> Self {
        Self {
            list,
            state: ViewState::Idle,
        }
    }

    pub fn state(&self) -> &ViewState<E> {
        &self.state
    }

    pub fn list(&self) -> &EntityList<E> {
        &self.list
    }

    pub fn begin_create(&mut self) -> Result<(), ViewError> {
        self.require_idle("create")?;
        self.state = ViewState::Creating;
        Ok(())
    }

    /// Open the edit form for `id`, returning the record being edited
    pub fn begin_edit(&mut self, id: &str) -> Result<E, ViewError> {
        self.require_idle("edit")?;
        let record = self
            .list
            .get(id)
            .ok_or_else(|| ViewError::NotFound(E::LABEL, id.to_string()))?;
        self.state = ViewState::Editing(record.clone());
        Ok(record)
    }

    pub fn begin_delete(&mut self, id: &str) -> Result<(), ViewError> {
        self.require_idle("delete")?;
        self.state = ViewState::ConfirmingDelete(id.to_string());
        Ok(())
    }

    /// Save the form contents. A new record gets a fresh id; an edited one
    /// keeps the id it was opened with.
    pub fn submit(&mut self, mut record: E) -> Result<E, ViewError> {
        let saved = match &self.state {
            ViewState::Creating => self.list.create(record)?,
            ViewState::Editing(original) => {
                record.set_id(original.id().to_string());
                self.list.update(record)?
            }
            other => {
                return Err(ViewError::InvalidTransition {
                    action: "submit",
                    state: other.name(),
                })
            }
        };
        self.state = ViewState::Idle;
        Ok(saved)
    }

    /// Delete the pending record. Returns whether anything was removed.
    pub fn confirm_delete(&mut self) -> Result<bool, ViewError> {
        let id = match &self.state {
            ViewState::ConfirmingDelete(id) => id.clone(),
            other => {
                return Err(ViewError::InvalidTransition {
                    action: "confirm delete",
                    state: other.name(),
                })
            }
        };
        let removed = self.list.delete(&id)?;
        self.state = ViewState::Idle;
        Ok(removed)
    }

    /// Close any open form or dialog without writing
    pub fn cancel(&mut self) {
        self.state = ViewState::Idle;
    }

    fn require_idle(&self, action: &'static str) -> Result<(), ViewError> {
        match self.state {
            ViewState::Idle => Ok(()),
            ref other => Err(ViewError::InvalidTransition {
                action,
                state: other.name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Patient;
    use crate::store::LocalStore;

    fn view() -> ListView<Patient> {
        ListView::new(EntityList::new(LocalStore::in_memory()))
    }

    fn patient(name: &str) -> Patient {
        Patient {
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_flow() {
        let mut view = view();
        view.begin_create().unwrap();
        assert_eq!(view.state().name(), "creating");

        let saved = view.submit(patient("Asha")).unwrap();
        assert!(!saved.id.is_empty());
        assert_eq!(*view.state(), ViewState::Idle);
        assert_eq!(view.list().count(), 1);
    }

    #[test]
    fn test_edit_keeps_id() {
        let mut view = view();
        view.begin_create().unwrap();
        let saved = view.submit(patient("Asha")).unwrap();

        let mut changed = view.begin_edit(&saved.id).unwrap();
        changed.name = "Asha Rao".into();
        changed.id = "something-else".into();
        let updated = view.submit(changed).unwrap();

        assert_eq!(updated.id, saved.id);
        let all = view.list().all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Asha Rao");
    }

    #[test]
    fn test_delete_flow() {
        let mut view = view();
        view.begin_create().unwrap();
        let saved = view.submit(patient("Asha")).unwrap();

        view.begin_delete(&saved.id).unwrap();
        assert!(view.confirm_delete().unwrap());
        assert_eq!(view.list().count(), 0);

        view.begin_delete("gone").unwrap();
        assert!(!view.confirm_delete().unwrap());
    }

    #[test]
    fn test_cancel_writes_nothing() {
        let mut view = view();
        view.begin_create().unwrap();
        view.cancel();
        assert_eq!(*view.state(), ViewState::Idle);
        assert_eq!(view.list().count(), 0);
    }

    #[test]
    fn test_illegal_transitions() {
        let mut view = view();
        assert!(matches!(
            view.submit(patient("Asha")),
            Err(ViewError::InvalidTransition { action: "submit", state: "idle" })
        ));
        assert!(matches!(
            view.confirm_delete(),
            Err(ViewError::InvalidTransition { .. })
        ));

        view.begin_create().unwrap();
        assert!(matches!(
            view.begin_delete("x"),
            Err(ViewError::InvalidTransition { state: "creating", .. })
        ));
        assert!(matches!(view.begin_edit("x"), Err(ViewError::InvalidTransition { .. })));
    }

    #[test]
    fn test_edit_unknown_id() {
        let mut view = view();
        assert!(matches!(view.begin_edit("nope"), Err(ViewError::NotFound("Patient", _))));
        assert_eq!(*view.state(), ViewState::Idle);
    }
}
