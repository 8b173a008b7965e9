use crate::data::Dataset;
use crate::filter::FilterState;
use crate::types::RecordId;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("record {0} does not exist")]
    UnknownRecord(RecordId),
    #[error("record {0} is hidden by the active filter")]
    NotVisible(RecordId),
}

/// At most one selected record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Idle,
    Selected(RecordId),
}

impl Selection {
    pub fn id(&self) -> Option<RecordId> {
        match self {
            Selection::Idle => None,
            Selection::Selected(id) => Some(*id),
        }
    }

    /// Select `id`, replacing any current selection.
    pub fn select(self, dataset: &Dataset, filter: &FilterState, id: RecordId) -> Result<Self, SelectError> {
        let record = dataset.get(id).ok_or(SelectError::UnknownRecord(id))?;
        if !filter.is_visible(record) {
            return Err(SelectError::NotVisible(id));
        }
        Ok(Selection::Selected(id))
    }

    pub fn deselect(self) -> Self {
        Selection::Idle
    }

    /// Drop the selection if its record is no longer visible under `filter`.
    pub fn reconcile(self, dataset: &Dataset, filter: &FilterState) -> Self {
        match self {
            Selection::Selected(id) if dataset.get(id).is_some_and(|r| filter.is_visible(r)) => self,
            _ => Selection::Idle,
        }
    }
}
