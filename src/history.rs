/// Maximum number of usernames kept in the recent-search list.
pub const HISTORY_CAP: usize = 5;

/// Recently searched usernames, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful search. Returns `false` when the username was
    /// already present, in which case the order is left alone.
    pub fn record(&mut self, username: &str) -> bool {
        if self.contains(username) {
            return false;
        }
        self.entries.insert(0, username.to_string());
        self.entries.truncate(HISTORY_CAP);
        true
    }

    pub fn contains(&self, username: &str) -> bool {
        self.entries.iter().any(|entry| entry == username)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
