//! The search screen as a plain state container.
//!
//! Every user interaction and every network completion goes through
//! [`SearchState::update`], which mutates the state and returns the side
//! effects the caller has to carry out. Nothing in here touches the network
//! or the window, so the whole lifecycle can be driven from tests.

use tracing::{debug, info};

use crate::error::LookupError;
use crate::history::History;
use crate::models::Profile;

/// Lifecycle of the visible search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Success(Profile),
    Error(String),
}

impl RequestState {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            RequestState::Success(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }
}

/// One issued lookup. The sequence number tells a fresh response apart from
/// one that was overtaken by a newer search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub seq: u64,
    pub username: String,
}

#[derive(Debug)]
pub enum Action {
    /// The text in the search box changed.
    QueryChanged(String),
    /// Search button or Enter: search for the current query.
    Submit,
    /// Search for a username without touching the search box.
    Search(String),
    /// A recent-search entry was clicked.
    SelectHistory(String),
    LookupFinished {
        ticket: Ticket,
        result: Result<Profile, LookupError>,
    },
    ToggleTheme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Look the ticket's username up and report back with
    /// [`Action::LookupFinished`].
    Fetch(Ticket),
    /// Bring the result card into view once layout has settled.
    ScrollToResult,
}

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    request: RequestState,
    history: History,
    dark_mode: bool,
    issued: u64,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn request(&self) -> &RequestState {
        &self.request
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Whether `seq` belongs to the most recently issued lookup.
    pub fn is_latest(&self, seq: u64) -> bool {
        seq == self.issued
    }

    pub fn update(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::QueryChanged(query) => {
                self.query = query;
                Vec::new()
            }
            Action::Submit => {
                let query = self.query.clone();
                self.begin_search(&query)
            }
            Action::Search(username) => self.begin_search(&username),
            Action::SelectHistory(username) => {
                let effects = self.begin_search(&username);
                if !effects.is_empty() {
                    self.query = username;
                }
                effects
            }
            Action::LookupFinished { ticket, result } => self.finish_search(ticket, result),
            Action::ToggleTheme => {
                self.dark_mode = !self.dark_mode;
                Vec::new()
            }
        }
    }

    fn begin_search(&mut self, raw: &str) -> Vec<Effect> {
        let username = raw.trim();
        if username.is_empty() {
            return Vec::new();
        }

        self.issued += 1;
        self.request = RequestState::Loading;
        info!(seq = self.issued, "searching for {username}");

        vec![Effect::Fetch(Ticket {
            seq: self.issued,
            username: username.to_string(),
        })]
    }

    fn finish_search(&mut self, ticket: Ticket, result: Result<Profile, LookupError>) -> Vec<Effect> {
        if !self.is_latest(ticket.seq) {
            debug!(
                seq = ticket.seq,
                latest = self.issued,
                "dropping stale response for {}",
                ticket.username
            );
            return Vec::new();
        }

        match result {
            Ok(profile) => {
                info!(seq = ticket.seq, "found {}", profile.login);
                self.history.record(&ticket.username);
                self.request = RequestState::Success(profile);
                vec![Effect::ScrollToResult]
            }
            Err(err) => {
                info!(seq = ticket.seq, "lookup for {} failed: {err}", ticket.username);
                self.request = RequestState::Error(err.to_string());
                Vec::new()
            }
        }
    }
}
