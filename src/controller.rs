use std::sync::Arc;

use crate::client::ProfileSource;
use crate::state::{Action, Effect, RequestState, SearchState, Ticket};

/// Avatar still to be fetched for the profile a lookup found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarRequest {
    pub seq: u64,
    pub url: String,
}

/// Resolves one ticket against `source` and hands the resulting
/// [`Action::LookupFinished`] to `deliver` as soon as the profile is in.
/// Anything slower, like the avatar, is left to the caller through the
/// returned request.
pub async fn lookup<S: ProfileSource>(
    source: &S,
    ticket: Ticket,
    deliver: impl FnOnce(Action),
) -> Option<AvatarRequest> {
    let result = source.fetch_profile(&ticket.username).await;
    let avatar = result.as_ref().ok().map(|profile| AvatarRequest {
        seq: ticket.seq,
        url: profile.avatar_url.clone(),
    });

    deliver(Action::LookupFinished { ticket, result });
    avatar
}

/// Owns the search state together with the source profiles come from.
///
/// The window drives it one step at a time through [`dispatch`](Self::dispatch)
/// and runs [`lookup`] on the background runtime. [`search`](Self::search) runs
/// the same cycle inline.
pub struct SearchController<S> {
    state: SearchState,
    source: Arc<S>,
}

impl<S: ProfileSource> SearchController<S> {
    pub fn new(source: S) -> Self {
        Self {
            state: SearchState::new(),
            source: Arc::new(source),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn source(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }

    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        self.state.update(action)
    }

    /// Looks `username` up and returns the resulting state. Blank input
    /// leaves the state untouched.
    pub async fn search(&mut self, username: &str) -> &RequestState {
        let effects = self.dispatch(Action::Search(username.to_string()));
        self.run(effects).await;
        self.state.request()
    }

    /// Same as a fresh submission, with the search box set to `username`.
    pub async fn select_from_history(&mut self, username: &str) -> &RequestState {
        let effects = self.dispatch(Action::SelectHistory(username.to_string()));
        self.run(effects).await;
        self.state.request()
    }

    async fn run(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            // Scrolling only means something with a window attached.
            if let Effect::Fetch(ticket) = effect {
                let mut finished = None;
                lookup(self.source.as_ref(), ticket, |action| finished = Some(action)).await;
                if let Some(action) = finished {
                    self.dispatch(action);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::LookupError;
    use crate::models::fixtures::octocat;
    use crate::models::Profile;

    /// Serves profiles from memory and counts the lookups it gets.
    #[derive(Default)]
    struct StubSource {
        profiles: HashMap<String, Profile>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn with(profiles: impl IntoIterator<Item = Profile>) -> Self {
            Self {
                profiles: profiles.into_iter().map(|p| (p.login.clone(), p)).collect(),
                ..Default::default()
            }
        }
    }

    impl ProfileSource for StubSource {
        async fn fetch_profile(&self, username: &str) -> Result<Profile, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.profiles.get(username).cloned().ok_or(LookupError::NotFound)
        }
    }

    fn calls(controller: &SearchController<StubSource>) -> usize {
        controller.source().calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn search_yields_the_fetched_profile() {
        let mut controller = SearchController::new(StubSource::with([octocat()]));

        let state = controller.search("octocat").await;

        let profile = state.profile().expect("success state");
        assert_eq!(profile.login, "octocat");
        assert_eq!(profile.display_name(), "The Octocat");
        assert_eq!(profile.public_repos, 8);
        assert_eq!(profile.followers, 100);
        assert_eq!(controller.state().history().entries(), ["octocat"]);
    }

    #[tokio::test]
    async fn unknown_user_is_reported() {
        let mut controller = SearchController::new(StubSource::with([octocat()]));

        let state = controller.search("zzz-nonexistent-zzz").await;

        assert_eq!(state.error(), Some("User not found"));
        assert!(controller.state().history().is_empty());
    }

    #[tokio::test]
    async fn blank_search_never_reaches_the_source() {
        let mut controller = SearchController::new(StubSource::with([octocat()]));

        let state = controller.search("   ").await;

        assert_eq!(*state, RequestState::Idle);
        assert_eq!(calls(&controller), 0);
    }

    #[tokio::test]
    async fn lookup_delivers_before_handing_out_the_avatar() {
        let source = StubSource::with([octocat()]);
        let ticket = Ticket {
            seq: 7,
            username: "octocat".into(),
        };
        let mut delivered = Vec::new();

        let avatar = lookup(&source, ticket, |action| delivered.push(action)).await;

        match delivered.as_slice() {
            [Action::LookupFinished { ticket, result: Ok(profile) }] => {
                assert_eq!(ticket.seq, 7);
                assert_eq!(profile.login, "octocat");
            }
            other => panic!("expected one finished lookup, got {other:?}"),
        }
        assert_eq!(
            avatar,
            Some(AvatarRequest {
                seq: 7,
                url: octocat().avatar_url,
            })
        );
    }

    #[tokio::test]
    async fn failed_lookup_has_no_avatar_to_fetch() {
        let source = StubSource::default();
        let ticket = Ticket {
            seq: 1,
            username: "ghost".into(),
        };
        let mut delivered = Vec::new();

        let avatar = lookup(&source, ticket, |action| delivered.push(action)).await;

        assert!(avatar.is_none());
        assert!(matches!(
            delivered.as_slice(),
            [Action::LookupFinished { result: Err(LookupError::NotFound), .. }]
        ));
    }

    #[tokio::test]
    async fn history_selection_searches_again() {
        let mut controller = SearchController::new(StubSource::with([octocat()]));
        controller.search("octocat").await;
        controller.search("ghost").await;

        let state = controller.select_from_history("octocat").await;

        assert!(state.profile().is_some());
        assert_eq!(controller.state().query(), "octocat");
        assert_eq!(controller.state().history().entries(), ["octocat"]);
        assert_eq!(calls(&controller), 3);
    }
}
