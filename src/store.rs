/// Board persistence
///
/// Every write lands in the local SQLite cache first and is then mirrored
/// to the hosted backend when one is configured and a user is signed in.
/// Remote failures never lose the local write; they come back as
/// [`SyncOutcome::Fallback`] so the caller can tell the user.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::media::data_url;
use crate::remote::RemoteBoards;
use crate::state::data::Board;
use crate::state::library::{Library, LibraryError};

/// Local cache failures; these are fatal for the operation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("local cache error: {0}")]
    Library(#[from] LibraryError),
}

/// How far an operation got
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome<T> {
    /// Local cache and backend both succeeded
    Synced(T),
    /// No backend configured or nobody signed in
    LocalOnly(T),
    /// The backend failed; `value` comes from the local cache
    Fallback { value: T, reason: String },
}

impl<T> SyncOutcome<T> {
    pub fn value(&self) -> &T {
        match self {
            SyncOutcome::Synced(v) | SyncOutcome::LocalOnly(v) => v,
            SyncOutcome::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            SyncOutcome::Synced(v) | SyncOutcome::LocalOnly(v) => v,
            SyncOutcome::Fallback { value, .. } => value,
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced(_))
    }

    /// Why the backend was skipped over, if it was
    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            SyncOutcome::Fallback { reason, .. } => Some(reason.as_str()),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> SyncOutcome<U> {
        match self {
            SyncOutcome::Synced(v) => SyncOutcome::Synced(f(v)),
            SyncOutcome::LocalOnly(v) => SyncOutcome::LocalOnly(f(v)),
            SyncOutcome::Fallback { value, reason } => SyncOutcome::Fallback {
                value: f(value),
                reason,
            },
        }
    }
}

pub type StoreResult<T> = Result<SyncOutcome<T>, StoreError>;

/// Dual-write board store. Cheap to clone; each operation opens its own
/// cache connection so the returned futures are `Send`.
#[derive(Clone)]
pub struct BoardStore {
    db_path: PathBuf,
    remote: Option<Arc<dyn RemoteBoards>>,
}

impl std::fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardStore")
            .field("db_path", &self.db_path)
            .field("remote", &self.remote.is_some())
            .finish()
    }
}

impl BoardStore {
    pub fn new(db_path: impl Into<PathBuf>, remote: Option<Arc<dyn RemoteBoards>>) -> Self {
        Self {
            db_path: db_path.into(),
            remote,
        }
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    fn library(&self) -> Result<Library, StoreError> {
        Ok(Library::open(self.db_path.clone())?)
    }

    /// Backend and owner, when both are available
    fn target<'a>(&'a self, owner: Option<&'a str>) -> Option<(&'a dyn RemoteBoards, &'a str)> {
        match (&self.remote, owner) {
            (Some(remote), Some(owner)) if !owner.is_empty() => Some((remote.as_ref(), owner)),
            _ => None,
        }
    }

    /// Load the board list. Own boards come first, followed by boards
    /// shared through family groups that are not already listed.
    pub async fn list_boards(&self, owner: Option<&str>) -> StoreResult<Vec<Board>> {
        let Some((remote, owner)) = self.target(owner) else {
            return Ok(SyncOutcome::LocalOnly(self.library()?.get_all_boards()?));
        };

        let mut boards = match remote.list_boards(owner).await {
            Ok(boards) => boards,
            Err(e) => {
                log::warn!("⚠️  Remote board list failed, using cache: {e}");
                return Ok(SyncOutcome::Fallback {
                    value: self.library()?.get_all_boards()?,
                    reason: e.to_string(),
                });
            }
        };

        match remote.list_shared_boards(owner).await {
            Ok(shared) => {
                let mut seen: HashSet<String> = boards.iter().map(|b| b.id.clone()).collect();
                boards.extend(shared.into_iter().filter(|b| seen.insert(b.id.clone())));
            }
            Err(e) => log::warn!("⚠️  Shared boards unavailable: {e}"),
        }

        let mut library = self.library()?;
        if boards.is_empty() {
            // nothing remote yet; keep showing what was created offline
            return Ok(SyncOutcome::Synced(library.get_all_boards()?));
        }

        library.replace_all(&boards)?;
        let pending = library.pending_boards()?;
        drop(library);
        log::info!("☁️  Loaded {} boards from backend", boards.len());

        // local edits the backend never received stay in the list
        for board in pending {
            match remote.upsert_board(&board, owner).await {
                Ok(()) => {
                    self.library()?.set_pending_sync(&board.id, false)?;
                    log::info!("☁️  Synced board {} saved while offline", board.id);
                }
                Err(e) => log::warn!("⚠️  Board {} still not synced: {e}", board.id),
            }
            match boards.iter_mut().find(|b| b.id == board.id) {
                Some(listed) => *listed = board,
                None => boards.insert(0, board),
            }
        }
        Ok(SyncOutcome::Synced(boards))
    }

    /// Save locally, then mirror to the backend. Until the backend has
    /// the board it is flagged in the cache so a refresh cannot drop it.
    pub async fn save_board(&self, board: &Board, owner: Option<&str>) -> StoreResult<()> {
        {
            let library = self.library()?;
            library.upsert_board(board)?;
            library.set_pending_sync(&board.id, true)?;
        }
        log::debug!("💾 Cached board {} ({})", board.id, board.title);

        let Some((remote, owner)) = self.target(owner) else {
            return Ok(SyncOutcome::LocalOnly(()));
        };
        match remote.upsert_board(board, owner).await {
            Ok(()) => {
                self.library()?.set_pending_sync(&board.id, false)?;
                Ok(SyncOutcome::Synced(()))
            }
            Err(e) => {
                log::warn!("⚠️  Remote save of board {} failed: {e}", board.id);
                Ok(SyncOutcome::Fallback {
                    value: (),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Delete locally, then from the backend
    pub async fn delete_board(&self, id: &str, owner: Option<&str>) -> StoreResult<()> {
        let removed = self.library()?.delete_board(id)?;
        log::debug!("🗑️  Deleted board {id} from cache (present: {removed})");

        let Some((remote, _)) = self.target(owner) else {
            return Ok(SyncOutcome::LocalOnly(()));
        };
        match remote.delete_board(id).await {
            Ok(()) => Ok(SyncOutcome::Synced(())),
            Err(e) => {
                log::warn!("⚠️  Remote delete of board {id} failed: {e}");
                Ok(SyncOutcome::Fallback {
                    value: (),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Store a picture. Without a backend the picture is embedded as a
    /// `data:` URL instead.
    pub async fn upload_image(&self, bytes: Vec<u8>, file_name: &str, owner: Option<&str>) -> StoreResult<String> {
        let embed = |bytes: &[u8]| data_url::encode(data_url::sniff_mime(bytes), bytes);

        let Some((remote, owner)) = self.target(owner) else {
            return Ok(SyncOutcome::LocalOnly(embed(&bytes)));
        };
        let inline = embed(&bytes);
        match remote.upload_image(bytes, file_name, owner).await {
            Ok(url) => Ok(SyncOutcome::Synced(url)),
            Err(e) => {
                log::warn!("⚠️  Picture upload failed, embedding instead: {e}");
                Ok(SyncOutcome::Fallback {
                    value: inline,
                    reason: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockRemote {
        boards: Mutex<Vec<Board>>,
        shared: Vec<Board>,
        fail: bool,
        fail_shared: bool,
    }

    impl MockRemote {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn check(&self) -> Result<(), RemoteError> {
            if self.fail {
                return Err(RemoteError::ApiError {
                    status: 503,
                    body: "unavailable".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteBoards for MockRemote {
        async fn list_boards(&self, _owner: &str) -> Result<Vec<Board>, RemoteError> {
            self.check()?;
            Ok(self.boards.lock().unwrap().clone())
        }

        async fn list_shared_boards(&self, _owner: &str) -> Result<Vec<Board>, RemoteError> {
            if self.fail_shared {
                return Err(RemoteError::NotSignedIn);
            }
            Ok(self.shared.clone())
        }

        async fn upsert_board(&self, board: &Board, _owner: &str) -> Result<(), RemoteError> {
            self.check()?;
            let mut boards = self.boards.lock().unwrap();
            boards.retain(|b| b.id != board.id);
            boards.push(board.clone());
            Ok(())
        }

        async fn delete_board(&self, id: &str) -> Result<(), RemoteError> {
            self.check()?;
            self.boards.lock().unwrap().retain(|b| b.id != id);
            Ok(())
        }

        async fn upload_image(&self, _bytes: Vec<u8>, file_name: &str, owner: &str) -> Result<String, RemoteError> {
            self.check()?;
            Ok(format!("https://cdn.example.com/{owner}/{file_name}"))
        }
    }

    fn store_with(remote: Option<Arc<dyn RemoteBoards>>) -> (tempfile::TempDir, BoardStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = BoardStore::new(dir.path().join("boards.db"), remote);
        (dir, store)
    }

    #[tokio::test]
    async fn test_local_only_without_remote() {
        let (_dir, store) = store_with(None);
        let board = Board::new("Offline");

        let saved = store.save_board(&board, Some("u1")).await.unwrap();
        assert_eq!(saved, SyncOutcome::LocalOnly(()));

        let listed = store.list_boards(Some("u1")).await.unwrap();
        assert!(matches!(listed, SyncOutcome::LocalOnly(_)));
        assert_eq!(listed.value(), &vec![board]);
    }

    #[tokio::test]
    async fn test_signed_out_stays_local() {
        let remote = Arc::new(MockRemote::default());
        let (_dir, store) = store_with(Some(remote.clone()));

        let saved = store.save_board(&Board::new("Draft"), None).await.unwrap();
        assert_eq!(saved, SyncOutcome::LocalOnly(()));
        assert!(remote.boards.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_mirrors_to_remote() {
        let remote = Arc::new(MockRemote::default());
        let (_dir, store) = store_with(Some(remote.clone()));
        let board = Board::new("Synced");

        let saved = store.save_board(&board, Some("u1")).await.unwrap();
        assert!(saved.is_synced());
        assert_eq!(remote.boards.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_remote_keeps_local_write() {
        let (_dir, store) = store_with(Some(Arc::new(MockRemote::failing())));
        let board = Board::new("Resilient");

        let saved = store.save_board(&board, Some("u1")).await.unwrap();
        assert!(saved.fallback_reason().unwrap().contains("503"));

        let listed = store.list_boards(Some("u1")).await.unwrap();
        assert!(listed.fallback_reason().is_some());
        assert_eq!(listed.into_value(), vec![board]);
    }

    #[tokio::test]
    async fn test_remote_list_replaces_cache_and_merges_shared() {
        let own = Board::new("Own");
        let mut shared = Board::new("Family");
        shared.family_group_id = Some("g1".into());

        let remote = Arc::new(MockRemote {
            boards: Mutex::new(vec![own.clone()]),
            shared: vec![shared.clone(), own.clone()],
            ..MockRemote::default()
        });
        let (_dir, store) = store_with(Some(remote));
        store.library().unwrap().upsert_board(&Board::new("Stale")).unwrap();

        let listed = store.list_boards(Some("u1")).await.unwrap();
        assert!(listed.is_synced());
        let titles: Vec<_> = listed.value().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Own", "Family"]);

        let cached = store.library().unwrap().get_all_boards().unwrap();
        assert_eq!(cached.len(), 2);
        assert!(cached.iter().all(|b| b.title != "Stale"));
    }

    #[tokio::test]
    async fn test_refresh_keeps_board_saved_during_outage() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("boards.db");

        let offline = Board::new("Saved during outage");
        let outage = BoardStore::new(&db, Some(Arc::new(MockRemote::failing()) as Arc<dyn RemoteBoards>));
        let saved = outage.save_board(&offline, Some("u1")).await.unwrap();
        assert!(saved.fallback_reason().is_some());

        let remote = Arc::new(MockRemote {
            boards: Mutex::new(vec![Board::new("From backend")]),
            ..MockRemote::default()
        });
        let store = BoardStore::new(&db, Some(remote.clone() as Arc<dyn RemoteBoards>));
        let listed = store.list_boards(Some("u1")).await.unwrap();

        let titles: Vec<_> = listed.value().iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Saved during outage", "From backend"]);
        assert!(remote.boards.lock().unwrap().iter().any(|b| b.id == offline.id));
        assert!(store.library().unwrap().pending_boards().unwrap().is_empty());
        assert_eq!(store.library().unwrap().board_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_synced_save_is_not_pending() {
        let (_dir, store) = store_with(Some(Arc::new(MockRemote::default())));
        store.save_board(&Board::new("Synced"), Some("u1")).await.unwrap();
        assert!(store.library().unwrap().pending_boards().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_remote_list_keeps_cache() {
        let (_dir, store) = store_with(Some(Arc::new(MockRemote::default())));
        let local = Board::new("Made offline");
        store.library().unwrap().upsert_board(&local).unwrap();

        let listed = store.list_boards(Some("u1")).await.unwrap();
        assert_eq!(listed.into_value(), vec![local]);
    }

    #[tokio::test]
    async fn test_shared_failure_does_not_fail_list() {
        let own = Board::new("Own");
        let remote = Arc::new(MockRemote {
            boards: Mutex::new(vec![own.clone()]),
            fail_shared: true,
            ..MockRemote::default()
        });
        let (_dir, store) = store_with(Some(remote));

        let listed = store.list_boards(Some("u1")).await.unwrap();
        assert!(listed.is_synced());
        assert_eq!(listed.into_value(), vec![own]);
    }

    #[tokio::test]
    async fn test_delete_removes_everywhere() {
        let board = Board::new("Gone");
        let remote = Arc::new(MockRemote {
            boards: Mutex::new(vec![board.clone()]),
            ..MockRemote::default()
        });
        let (_dir, store) = store_with(Some(remote.clone()));
        store.save_board(&board, Some("u1")).await.unwrap();

        let deleted = store.delete_board(&board.id, Some("u1")).await.unwrap();
        assert!(deleted.is_synced());
        assert!(remote.boards.lock().unwrap().is_empty());
        assert_eq!(store.library().unwrap().board_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upload_falls_back_to_data_url() {
        let png_magic = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

        let (_dir, store) = store_with(None);
        let url = store.upload_image(png_magic.clone(), "a.png", Some("u1")).await.unwrap();
        assert!(matches!(&url, SyncOutcome::LocalOnly(u) if u.starts_with("data:image/png;base64,")));

        let (_dir, store) = store_with(Some(Arc::new(MockRemote::failing())));
        let url = store.upload_image(png_magic.clone(), "a.png", Some("u1")).await.unwrap();
        assert!(url.fallback_reason().is_some());
        assert!(url.value().starts_with("data:image/png"));

        let (_dir, store) = store_with(Some(Arc::new(MockRemote::default())));
        let url = store.upload_image(png_magic, "a.png", Some("u1")).await.unwrap();
        assert_eq!(url, SyncOutcome::Synced("https://cdn.example.com/u1/a.png".into()));
    }

    #[tokio::test]
    async fn test_unopenable_cache_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // a directory where the database file should be
        let blocked = dir.path().join("boards.db");
        std::fs::create_dir_all(&blocked).unwrap();
        let store = BoardStore::new(blocked, None);

        assert!(store.save_board(&Board::new("x"), None).await.is_err());
    }
}
