/// Hosted backend collaborator
///
/// A thin REST client for the Supabase project that mirrors boards,
/// stores card pictures and manages family sharing. Everything here is
/// request shaping and response mapping; access rules, invite code
/// generation and membership checks live on the server.
///
/// Architecture:
/// - `client.rs` - connection, session and identity endpoints
/// - `boards.rs` - the `RemoteBoards` seam used by the store
/// - `family.rs` - family groups, members and invite codes

pub mod boards;
pub mod client;
pub mod family;

use async_trait::async_trait;

use crate::state::data::Board;

pub use client::SupabaseClient;
pub use family::{normalize_invite_code, FamilyGroup, FamilyMember, InviteCode, JoinResult, MemberRole};

/// Errors from the hosted backend
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code
    #[error("backend error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("not signed in")]
    NotSignedIn,

    #[error("backend is not configured")]
    NotConfigured,

    /// A 2xx response without the expected content
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Board storage operations the persistence layer mirrors to
#[async_trait]
pub trait RemoteBoards: Send + Sync {
    /// Boards owned by `owner`, newest first
    async fn list_boards(&self, owner: &str) -> Result<Vec<Board>, RemoteError>;

    /// Boards shared with `owner` through family groups
    async fn list_shared_boards(&self, owner: &str) -> Result<Vec<Board>, RemoteError>;

    /// Insert or update by id
    async fn upsert_board(&self, board: &Board, owner: &str) -> Result<(), RemoteError>;

    async fn delete_board(&self, id: &str) -> Result<(), RemoteError>;

    /// Store a picture and return its public URL
    async fn upload_image(&self, bytes: Vec<u8>, file_name: &str, owner: &str) -> Result<String, RemoteError>;
}
