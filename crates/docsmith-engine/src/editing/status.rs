/// Persistence state of the open document.
///
/// `Clean -> Dirty` on any mutation, `Dirty -> Pending` when the debounce
/// timer arms, `Pending -> Clean` once the write completes. A mutation while
/// pending goes back through `Dirty` and re-arms the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Clean,
    Dirty,
    Pending,
}

impl SaveStatus {
    pub fn on_mutation(self) -> Self {
        SaveStatus::Dirty
    }

    pub fn on_timer_armed(self) -> Self {
        match self {
            SaveStatus::Dirty | SaveStatus::Pending => SaveStatus::Pending,
            SaveStatus::Clean => SaveStatus::Clean,
        }
    }

    pub fn on_written(self) -> Self {
        SaveStatus::Clean
    }

    /// A failed write leaves unsaved changes behind.
    pub fn on_write_failed(self) -> Self {
        SaveStatus::Dirty
    }

    pub fn has_unsaved_changes(self) -> bool {
        self != SaveStatus::Clean
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_arm_write_cycle() {
        let status = SaveStatus::default();
        assert_eq!(status, SaveStatus::Clean);

        let status = status.on_mutation();
        assert_eq!(status, SaveStatus::Dirty);
        let status = status.on_timer_armed();
        assert_eq!(status, SaveStatus::Pending);
        let status = status.on_written();
        assert_eq!(status, SaveStatus::Clean);
    }

    #[test]
    fn arming_a_clean_document_keeps_it_clean() {
        assert_eq!(SaveStatus::Clean.on_timer_armed(), SaveStatus::Clean);
    }

    #[test]
    fn mutation_while_pending_is_dirty_again() {
        assert_eq!(SaveStatus::Pending.on_mutation(), SaveStatus::Dirty);
    }

    #[test]
    fn failed_write_keeps_changes_unsaved() {
        let status = SaveStatus::Pending.on_write_failed();
        assert!(status.has_unsaved_changes());
        assert!(!SaveStatus::Clean.has_unsaved_changes());
    }
}
