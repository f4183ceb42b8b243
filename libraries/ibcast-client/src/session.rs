//! Session flow: login, load the library, select tracks, submit a playlist.
//!
//! ```text
//! Unauthenticated -> Authenticated -> LibraryLoaded -> (Selecting)* -> Submitted
//!                                                                  \-> Aborted
//! ```
//!
//! Every call is awaited before the next one is issued; a session never has
//! two requests in flight.

use crate::checksum::ChecksumCache;
use crate::error::{ClientError, Result, Stage};
use crate::service::MusicService;
use crate::types::{LoginResponse, NewPlaylist};
use ibcast_core::matching::{matching_albums, resolve_albums, resolve_folder};
use ibcast_core::{
    Album, LibraryBuilder, LibrarySnapshot, MatchPolicy, PlaylistId, SelectionAccumulator,
};
use std::fmt;
use tracing::{debug, info, warn};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Unauthenticated,
    Authenticated,
    LibraryLoaded,
    Selecting,
    Submitted,
    Aborted,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated => "authenticated",
            SessionState::LibraryLoaded => "library loaded",
            SessionState::Selecting => "selecting",
            SessionState::Submitted => "submitted",
            SessionState::Aborted => "aborted",
        }
    }

    /// No further work is possible once a session is submitted or aborted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Submitted | SessionState::Aborted)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One login-to-logout run against a music service.
pub struct Session<S: MusicService> {
    service: S,
    policy: MatchPolicy,
    builder: LibraryBuilder,
    state: SessionState,
    snapshot: Option<LibrarySnapshot>,
    selection: SelectionAccumulator,
    checksums: Option<ChecksumCache>,
}

impl<S: MusicService> Session<S> {
    pub fn new(service: S, policy: MatchPolicy) -> Self {
        Self {
            service,
            policy,
            builder: LibraryBuilder::new(),
            state: SessionState::Unauthenticated,
            snapshot: None,
            selection: SelectionAccumulator::new(),
            checksums: None,
        }
    }

    /// Annotate loaded tracks with checksums recorded by earlier uploads.
    pub fn with_checksum_cache(mut self, cache: ChecksumCache) -> Self {
        self.checksums = Some(cache);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// The loaded library, if any
    pub fn snapshot(&self) -> Option<&LibrarySnapshot> {
        self.snapshot.as_ref()
    }

    /// Tracks chosen so far, in playlist order
    pub fn selection(&self) -> &SelectionAccumulator {
        &self.selection
    }

    /// Authenticate against the service.
    ///
    /// Rejected credentials abort the session; transport failures leave it
    /// unauthenticated so the caller may retry.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<LoginResponse> {
        self.require(Stage::Auth, "log in", &[SessionState::Unauthenticated])?;

        let response = self
            .service
            .login(username, password)
            .await
            .map_err(|e| self.fail(e))?;

        self.transition(SessionState::Authenticated);
        Ok(response)
    }

    /// Fetch the library and replace the current snapshot.
    ///
    /// Tracks already selected stay selected across a reload.
    pub async fn load_library(&mut self) -> Result<&LibrarySnapshot> {
        self.require(
            Stage::Fetch,
            "load the library",
            &[
                SessionState::Authenticated,
                SessionState::LibraryLoaded,
                SessionState::Selecting,
            ],
        )?;

        let dump = self.service.fetch_library().await.map_err(|e| self.fail(e))?;
        let mut snapshot = self.builder.build(&dump)?;

        if let Some(cache) = &self.checksums {
            snapshot = snapshot.with_checksums(|id| cache.checksum_for(id));
        }

        info!(
            tracks = snapshot.track_count(),
            albums = snapshot.album_count(),
            kept_selection = self.selection.len(),
            "Library loaded"
        );

        self.transition(SessionState::LibraryLoaded);
        Ok(self.snapshot.insert(snapshot))
    }

    /// Add every track under `folder` to the selection.
    ///
    /// Returns how many tracks were newly added.
    pub fn select_folder(&mut self, folder: &str) -> Result<usize> {
        let snapshot = self.loaded_snapshot("select a folder")?;
        let matched = resolve_folder(snapshot, folder, &self.policy);
        let matched_count = matched.len();

        let added = self.selection.add(matched);
        info!(folder = %folder, matched = matched_count, added, "Folder selected");

        self.transition(SessionState::Selecting);
        Ok(added)
    }

    /// Add the tracks of every album whose name matches `pattern`.
    ///
    /// Returns how many tracks were newly added.
    pub fn select_albums(&mut self, pattern: &str) -> Result<usize> {
        let snapshot = self.loaded_snapshot("select albums")?;
        let matched = resolve_albums(snapshot, pattern, &self.policy);
        let matched_count = matched.len();

        let added = self.selection.add(matched);
        info!(pattern = %pattern, matched = matched_count, added, "Albums selected");

        self.transition(SessionState::Selecting);
        Ok(added)
    }

    /// Albums matching `pattern`, without touching the selection.
    pub fn preview_albums(&self, pattern: &str) -> Result<Vec<&Album>> {
        let snapshot = self.loaded_snapshot("preview albums")?;
        Ok(matching_albums(snapshot, pattern, &self.policy))
    }

    /// Create a playlist from the selection.
    ///
    /// An empty selection fails with `EmptySelection` and leaves the session
    /// as it was. On success the selection is drained into the playlist.
    pub async fn submit(
        &mut self,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<PlaylistId> {
        self.require(
            Stage::Submit,
            "submit a playlist",
            &[SessionState::LibraryLoaded, SessionState::Selecting],
        )?;

        if self.selection.is_empty() {
            return Err(ClientError::EmptySelection);
        }

        let tracks = self.selection.iter().cloned().collect();
        let playlist = NewPlaylist::new(name, tracks)
            .with_description(description)
            .public(public);

        let playlist_id = self
            .service
            .create_playlist(&playlist)
            .await
            .map_err(|e| self.fail(e))?;

        let drained = self.selection.drain();
        info!(playlist_id = %playlist_id, tracks = drained.len(), "Selection submitted");

        self.transition(SessionState::Submitted);
        Ok(playlist_id)
    }

    /// Delete a playlist; the service does not support this.
    pub async fn delete_playlist(&mut self, playlist_id: &PlaylistId) -> Result<()> {
        self.service.delete_playlist(playlist_id).await
    }

    /// End the session.
    ///
    /// The remote logout is best effort: the session is closed whatever it
    /// returns. A submitted session stays `Submitted`, anything else becomes
    /// `Aborted`.
    pub async fn logout(&mut self) -> Result<()> {
        if self.state == SessionState::Unauthenticated {
            self.transition(SessionState::Aborted);
            return Ok(());
        }

        let result = self.service.logout().await;
        if let Err(e) = &result {
            warn!(error = %e, "Logout failed");
        }

        if self.state != SessionState::Submitted {
            self.transition(SessionState::Aborted);
        }
        result
    }

    fn loaded_snapshot(&self, action: &str) -> Result<&LibrarySnapshot> {
        self.require(
            Stage::Select,
            action,
            &[SessionState::LibraryLoaded, SessionState::Selecting],
        )?;
        self.snapshot.as_ref().ok_or_else(|| ClientError::InvalidState {
            stage: Stage::Select,
            message: format!("cannot {} before the library is loaded", action),
        })
    }

    fn require(&self, stage: Stage, action: &str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ClientError::InvalidState {
                stage,
                message: format!("cannot {} while {}", action, self.state),
            })
        }
    }

    /// Abort on authentication errors, pass everything through.
    fn fail(&mut self, error: ClientError) -> ClientError {
        if error.is_fatal() {
            warn!(error = %error, "Authentication lost, aborting session");
            self.transition(SessionState::Aborted);
        }
        error
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "Session state change");
            self.state = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ibcast_core::TrackId;
    use mockall::mock;
    use serde_json::{json, Value};

    mock! {
        Service {}

        #[async_trait]
        impl MusicService for Service {
            async fn login(&self, username: &str, password: &str) -> Result<LoginResponse>;
            async fn logout(&self) -> Result<()>;
            async fn fetch_library(&self) -> Result<Value>;
            async fn create_playlist(&self, playlist: &NewPlaylist) -> Result<PlaylistId>;
            async fn delete_playlist(&self, playlist_id: &PlaylistId) -> Result<()>;
        }
    }

    fn dump() -> Value {
        json!({
            "library": {
                "tracks": {
                    "map": { "title": 2, "album_id": 5, "path": 12 },
                    "1": [1, 2001, "Intro", 0, 0, 10, 0, 0, 0, 0, 0, 0, "Music/Rock"],
                    "2": [2, 2001, "Live One", 0, 0, 10, 0, 0, 0, 0, 0, 0, "Music/Rock/Live"],
                    "3": [1, 1999, "Blue", 0, 0, 20, 0, 0, 0, 0, 0, 0, "Music/Jazz"]
                },
                "albums": {
                    "map": { "name": 0, "tracks": 1 },
                    "10": ["Rock Night", [1, 2]],
                    "20": ["Late Jazz", [3]]
                }
            }
        })
    }

    fn logged_in_service() -> MockService {
        let mut service = MockService::new();
        service
            .expect_login()
            .times(1)
            .returning(|username, _| {
                Ok(LoginResponse {
                    user_id: "7".into(),
                    username: username.to_string(),
                })
            });
        service
    }

    async fn loaded_session(mut service: MockService) -> Session<MockService> {
        service
            .expect_fetch_library()
            .times(1)
            .returning(|| Ok(dump()));

        let mut session = Session::new(service, MatchPolicy::default());
        session.login("me@example.com", "secret").await.unwrap();
        session.load_library().await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_full_flow() {
        let mut service = logged_in_service();
        service
            .expect_create_playlist()
            .withf(|playlist| {
                playlist.name == "Mix"
                    && playlist.description == "desc"
                    && !playlist.public
                    && playlist.tracks == vec![TrackId::new("3"), TrackId::new("1"), TrackId::new("2")]
            })
            .times(1)
            .returning(|_| Ok(PlaylistId::new("99")));
        service.expect_logout().times(1).returning(|| Ok(()));

        let mut session = loaded_session(service).await;
        assert_eq!(session.state(), SessionState::LibraryLoaded);

        assert_eq!(session.select_albums("Late*").unwrap(), 1);
        assert_eq!(session.select_folder("Music/Rock").unwrap(), 2);
        assert_eq!(session.state(), SessionState::Selecting);

        let id = session.submit("Mix", "desc", false).await.unwrap();
        assert_eq!(id, PlaylistId::new("99"));
        assert_eq!(session.state(), SessionState::Submitted);
        assert!(session.selection().is_empty());

        session.logout().await.unwrap();
        assert_eq!(session.state(), SessionState::Submitted);
    }

    #[tokio::test]
    async fn test_repeated_selection_is_idempotent() {
        let mut session = loaded_session(logged_in_service()).await;

        assert_eq!(session.select_folder("Music/Rock").unwrap(), 2);
        assert_eq!(session.select_folder("Music/Rock").unwrap(), 0);
        assert_eq!(session.select_albums("Rock Night").unwrap(), 0);
        assert_eq!(session.selection().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_submit_keeps_state() {
        let mut service = logged_in_service();
        service.expect_create_playlist().times(0);

        let mut session = loaded_session(service).await;
        assert_eq!(session.select_folder("Music/Classical").unwrap(), 0);

        match session.submit("Empty", "", false).await {
            Err(ClientError::EmptySelection) => {}
            other => panic!("Expected EmptySelection, got: {:?}", other),
        }
        assert_eq!(session.state(), SessionState::Selecting);
    }

    #[tokio::test]
    async fn test_failed_login_aborts() {
        let mut service = MockService::new();
        service
            .expect_login()
            .times(1)
            .returning(|_, _| Err(ClientError::AuthFailed("Invalid username or password".into())));

        let mut session = Session::new(service, MatchPolicy::default());
        assert!(session.login("me@example.com", "wrong").await.is_err());
        assert_eq!(session.state(), SessionState::Aborted);

        match session.load_library().await {
            Err(ClientError::InvalidState { stage, .. }) => assert_eq!(stage, Stage::Fetch),
            other => panic!("Expected InvalidState, got: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_expired_token_during_submit_aborts() {
        let mut service = logged_in_service();
        service
            .expect_create_playlist()
            .times(1)
            .returning(|_| Err(ClientError::AuthRequired { stage: Stage::Submit }));

        let mut session = loaded_session(service).await;
        session.select_folder("Music/Jazz").unwrap();

        let err = session.submit("Jazz", "", true).await.unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(session.state(), SessionState::Aborted);
        assert_eq!(session.selection().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_submit_keeps_selection() {
        let mut service = logged_in_service();
        service.expect_create_playlist().times(1).returning(|_| {
            Err(ClientError::RemoteRejected {
                stage: Stage::Submit,
                message: "playlist name taken".into(),
            })
        });

        let mut session = loaded_session(service).await;
        session.select_albums("*").unwrap();

        match session.submit("Mix", "", false).await {
            Err(ClientError::RemoteRejected { message, .. }) => {
                assert_eq!(message, "playlist name taken")
            }
            other => panic!("Expected RemoteRejected, got: {:?}", other),
        }
        assert_eq!(session.state(), SessionState::Selecting);
        assert_eq!(session.selection().len(), 3);
    }

    #[tokio::test]
    async fn test_select_before_library_is_invalid() {
        let mut session = Session::new(logged_in_service(), MatchPolicy::default());
        session.login("me@example.com", "secret").await.unwrap();

        match session.select_folder("Music") {
            Err(ClientError::InvalidState { stage, message }) => {
                assert_eq!(stage, Stage::Select);
                assert!(message.contains("authenticated"));
            }
            other => panic!("Expected InvalidState, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reload_keeps_selection() {
        let mut service = logged_in_service();
        service.expect_fetch_library().times(2).returning(|| Ok(dump()));

        let mut session = Session::new(service, MatchPolicy::default());
        session.login("me@example.com", "secret").await.unwrap();
        session.load_library().await.unwrap();
        session.select_folder("Music/Jazz").unwrap();

        session.load_library().await.unwrap();
        assert_eq!(session.state(), SessionState::LibraryLoaded);
        assert!(session.selection().contains(&TrackId::new("3")));
    }

    #[tokio::test]
    async fn test_logout_before_submit_aborts() {
        let mut service = logged_in_service();
        service.expect_logout().times(1).returning(|| {
            Err(ClientError::ServerUnreachable {
                stage: Stage::Auth,
                message: "connection refused".into(),
            })
        });

        let mut session = loaded_session(service).await;
        assert!(session.logout().await.is_err());
        assert_eq!(session.state(), SessionState::Aborted);
    }

    #[tokio::test]
    async fn test_logout_without_login_sends_nothing() {
        let mut service = MockService::new();
        service.expect_logout().times(0);

        let mut session = Session::new(service, MatchPolicy::default());
        session.logout().await.unwrap();
        assert_eq!(session.state(), SessionState::Aborted);
    }

    #[tokio::test]
    async fn test_checksum_cache_annotates_tracks() {
        let mut cache = ChecksumCache::new();
        cache.record_upload(Some(TrackId::new("2")), "abc123");

        let mut service = logged_in_service();
        service.expect_fetch_library().returning(|| Ok(dump()));

        let mut session = Session::new(service, MatchPolicy::default()).with_checksum_cache(cache);
        session.login("me@example.com", "secret").await.unwrap();
        let snapshot = session.load_library().await.unwrap();

        let track = snapshot.track(&TrackId::new("2")).unwrap();
        assert_eq!(track.checksum.as_deref(), Some("abc123"));
        assert!(snapshot.track(&TrackId::new("1")).unwrap().checksum.is_none());
    }

    #[tokio::test]
    async fn test_preview_does_not_select() {
        let session = loaded_session(logged_in_service()).await;
        let albums = session.preview_albums("*Night").unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].name, "Rock Night");
        assert!(session.selection().is_empty());
    }
}
