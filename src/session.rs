use crate::{image::ImageCatalog, sync::SliceSync, topology::Topology};

/// Everything one composing session mutates.
#[derive(Debug, Clone)]
pub struct Session {
    pub catalog: ImageCatalog,
    pub topology: Topology,
    pub sync: SliceSync,
    selection: Vec<String>,
    counter: u32,
}

impl Session {
    pub fn new(slice_name: impl Into<String>) -> Self {
        Self {
            catalog: ImageCatalog::default(),
            topology: Topology::new(),
            sync: SliceSync::new(slice_name),
            selection: Vec::new(),
            counter: 1,
        }
    }

    /// Suggested name for the next VM.
    pub fn suggested_name(&self) -> String {
        format!("VM{}", self.counter)
    }

    pub fn bump_counter(&mut self) {
        self.counter += 1;
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Replace the selection. Duplicates collapse, order of first mention is kept.
    pub fn set_selection(&mut self, ids: Vec<String>) {
        self.selection.clear();
        for id in ids {
            if !self.selection.contains(&id) {
                self.selection.push(id);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn slice_id(&self) -> Option<u64> {
        self.sync.slice_id()
    }

    /// Back to a blank canvas: no VMs, no links, no selection, counter at 1,
    /// no saved slice. The image catalog survives.
    pub fn reset(&mut self) {
        self.topology.clear();
        self.selection.clear();
        self.counter = 1;
        self.sync.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_dedups() {
        let mut session = Session::new("s");
        session.set_selection(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(session.selection(), ["a", "b"]);
    }

    #[test]
    fn reset_restores_counter() {
        let mut session = Session::new("s");
        session.bump_counter();
        session.bump_counter();
        assert_eq!(session.suggested_name(), "VM3");
        session.set_selection(vec!["VM1".into()]);

        session.reset();
        assert_eq!(session.counter(), 1);
        assert_eq!(session.suggested_name(), "VM1");
        assert!(session.selection().is_empty());
        assert!(session.slice_id().is_none());
    }
}
