use crate::model::Item;

/// State shared between the stock list and the editor form.
///
/// Selection is matched by id, not by row position, so a reload that
/// reorders the list keeps the same product selected. The reload counter
/// flips once per successful mutation; the fetch sequence number lets the
/// list drop responses from superseded requests.
#[derive(Debug, Default)]
pub struct SharedState {
    selection: Option<Item>,
    reload: u64,
    fetch_seq: u64,
}

impl SharedState {
    pub fn selection(&self) -> Option<&Item> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, item: Option<Item>) {
        self.selection = item;
    }

    pub fn reload(&self) -> u64 {
        self.reload
    }

    pub fn request_reload(&mut self) {
        self.reload = self.reload.wrapping_add(1);
    }

    /// Start a new list fetch; older in-flight fetches become stale.
    pub fn begin_fetch(&mut self) -> u64 {
        self.fetch_seq = self.fetch_seq.wrapping_add(1);
        self.fetch_seq
    }

    pub fn is_current_fetch(&self, seq: u64) -> bool {
        self.fetch_seq == seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_fetch_invalidates_older() {
        let mut st = SharedState::default();
        let first = st.begin_fetch();
        let second = st.begin_fetch();
        assert!(!st.is_current_fetch(first));
        assert!(st.is_current_fetch(second));
    }

    #[test]
    fn reload_counter_advances_once_per_request() {
        let mut st = SharedState::default();
        assert_eq!(st.reload(), 0);
        st.request_reload();
        assert_eq!(st.reload(), 1);
        st.request_reload();
        assert_eq!(st.reload(), 2);
    }
}
