use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use super::data::Board;

/// Errors from the local board cache
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored board is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not create data directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type LibraryResult<T> = Result<T, LibraryError>;

/// The Library manages the SQLite cache of boards.
/// It is the local half of the dual-write persistence and the
/// source of truth whenever the hosted backend is unreachable.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open or create the library at a specific path
    pub fn open(db_path: impl Into<PathBuf>) -> LibraryResult<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&db_path)?;
        log::debug!("📁 Board cache opened at: {}", db_path.display());

        let library = Library { conn, db_path };
        library.init_schema()?;
        Ok(library)
    }

    /// A throwaway library that lives only in memory
    pub fn in_memory() -> LibraryResult<Self> {
        let conn = Connection::open_in_memory()?;
        let library = Library {
            conn,
            db_path: PathBuf::from(":memory:"),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Default database location in the user's data directory:
    /// - Linux: ~/.local/share/pecs-board/pecs_board.db
    /// - macOS: ~/Library/Application Support/pecs-board/pecs_board.db
    /// - Windows: %APPDATA%\pecs-board\pecs_board.db
    pub fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("pecs-board");
        path.push("pecs_board.db");
        path
    }

    /// Create all tables and indexes if they don't exist.
    fn init_schema(&self) -> LibraryResult<()> {
        // One row per board; the full document is stored as JSON
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS boards (
                id              TEXT PRIMARY KEY,
                title           TEXT NOT NULL,
                board_json      TEXT NOT NULL,
                updated_at      INTEGER NOT NULL,
                pending_sync    INTEGER NOT NULL DEFAULT 0
            )",
            [],
        )?;

        // Caches created before sync tracking; fails harmlessly if present
        let _ = self.conn.execute(
            "ALTER TABLE boards ADD COLUMN pending_sync INTEGER NOT NULL DEFAULT 0",
            [],
        );

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_boards_updated_at
             ON boards(updated_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Get a count of boards in the cache
    pub fn board_count(&self) -> LibraryResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM boards", [], |row| row.get(0))?;
        Ok(count)
    }

    /// All cached boards, most recently modified first
    pub fn get_all_boards(&self) -> LibraryResult<Vec<Board>> {
        let mut stmt = self
            .conn
            .prepare("SELECT board_json FROM boards ORDER BY updated_at DESC, id")?;

        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut boards = Vec::new();
        for json in rows {
            let json = json?;
            match serde_json::from_str::<Board>(&json) {
                Ok(board) => boards.push(board),
                // A corrupt row must not hide the rest of the cache
                Err(e) => log::warn!("⚠️  Skipping unreadable cached board: {e}"),
            }
        }

        Ok(boards)
    }

    pub fn get_board(&self, id: &str) -> LibraryResult<Option<Board>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT board_json FROM boards WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace a board by id
    pub fn upsert_board(&self, board: &Board) -> LibraryResult<()> {
        let json = serde_json::to_string(board)?;
        self.conn.execute(
            "INSERT INTO boards (id, title, board_json, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                board_json = excluded.board_json,
                updated_at = excluded.updated_at",
            params![board.id, board.title, json, board.updated_at],
        )?;
        Ok(())
    }

    /// Flag a board whose latest version has not reached the backend
    pub fn set_pending_sync(&self, id: &str, pending: bool) -> LibraryResult<()> {
        self.conn.execute(
            "UPDATE boards SET pending_sync = ?2 WHERE id = ?1",
            params![id, pending],
        )?;
        Ok(())
    }

    /// Boards saved here that the backend has not confirmed yet
    pub fn pending_boards(&self) -> LibraryResult<Vec<Board>> {
        let mut stmt = self.conn.prepare(
            "SELECT board_json FROM boards WHERE pending_sync = 1 ORDER BY updated_at DESC, id",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut boards = Vec::new();
        for json in rows {
            boards.push(serde_json::from_str(&json?)?);
        }
        Ok(boards)
    }

    /// Remove a board; returns whether it existed
    pub fn delete_board(&self, id: &str) -> LibraryResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM boards WHERE id = ?1", params![id])?;
        Ok(removed > 0)
    }

    /// Replace the cache with a fresh listing from the backend.
    ///
    /// Boards still waiting to sync are kept unless the listing carries a
    /// version at least as new; that version then clears the flag.
    pub fn replace_all(&mut self, boards: &[Board]) -> LibraryResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM boards WHERE pending_sync = 0", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO boards (id, title, board_json, updated_at, pending_sync)
                 VALUES (?1, ?2, ?3, ?4, 0)
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    board_json = excluded.board_json,
                    updated_at = excluded.updated_at,
                    pending_sync = 0
                 WHERE excluded.updated_at >= boards.updated_at",
            )?;
            for board in boards {
                let json = serde_json::to_string(board)?;
                stmt.execute(params![board.id, board.title, json, board.updated_at])?;
            }
        }
        tx.commit()?;

        log::debug!("🔄 Board cache refreshed with {} boards", boards.len());
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
