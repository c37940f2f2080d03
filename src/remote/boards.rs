/// Board rows and picture storage

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::data::{now_millis, Board, Card, DEFAULT_BACKGROUND, DEFAULT_COLUMNS, DEFAULT_GAP};

use super::client::SupabaseClient;
use super::{RemoteBoards, RemoteError};

/// Storage bucket for card pictures
pub const IMAGE_BUCKET: &str = "pecs-images";

/// A row of the `boards` table. Ownership columns are snake_case while
/// the layout columns keep the document's camelCase names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardRow {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "gridColumns", default)]
    pub grid_columns: Option<u32>,
    #[serde(rename = "gridGap", default)]
    pub grid_gap: Option<u32>,
    #[serde(rename = "backgroundColor", default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub cards: Option<Vec<Card>>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<i64>,
}

impl BoardRow {
    pub fn from_board(board: &Board, owner: &str) -> Self {
        Self {
            id: board.id.clone(),
            user_id: Some(owner.to_string()),
            group_id: board.family_group_id.clone(),
            title: Some(board.title.clone()),
            grid_columns: Some(board.grid_columns),
            grid_gap: Some(board.grid_gap),
            background_color: Some(board.background_color.clone()),
            cards: Some(board.cards.clone()),
            updated_at: Some(board.updated_at),
        }
    }

    /// Convert to a board, filling in layout defaults
    pub fn into_board(self) -> Board {
        Board {
            id: self.id,
            user_id: self.user_id,
            family_group_id: self.group_id,
            title: self.title.unwrap_or_default(),
            grid_columns: self.grid_columns.filter(|c| *c > 0).unwrap_or(DEFAULT_COLUMNS),
            grid_gap: self.grid_gap.unwrap_or(DEFAULT_GAP),
            background_color: self
                .background_color
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string()),
            cards: self.cards.unwrap_or_default(),
            updated_at: self.updated_at.unwrap_or_else(now_millis),
        }
    }
}

/// Storage object path for an upload: `<owner>/<millis>-<name>`
pub fn upload_path(owner: &str, file_name: &str, at: i64) -> String {
    let name: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let name = if name.is_empty() { "image".to_string() } else { name };
    format!("{owner}/{at}-{name}")
}

impl SupabaseClient {
    /// Ids of the family groups `user` belongs to
    pub(crate) async fn member_group_ids(&self, user: &str) -> Result<Vec<String>, RemoteError> {
        #[derive(Deserialize)]
        struct Membership {
            family_group_id: String,
        }

        let response = self
            .rest_get("family_members")
            .query(&[("select", "family_group_id".to_string()), ("user_id", format!("eq.{user}"))])
            .send()
            .await?;
        let rows: Vec<Membership> = Self::parse_response(response).await?;
        Ok(rows.into_iter().map(|m| m.family_group_id).collect())
    }

    async fn fetch_boards(&self, filter: (&str, String)) -> Result<Vec<Board>, RemoteError> {
        let response = self
            .rest_get("boards")
            .query(&[
                ("select", "*".to_string()),
                (filter.0, filter.1),
                ("order", "updatedAt.desc".to_string()),
            ])
            .send()
            .await?;
        let rows: Vec<BoardRow> = Self::parse_response(response).await?;
        Ok(rows.into_iter().map(BoardRow::into_board).collect())
    }
}

#[async_trait]
impl RemoteBoards for SupabaseClient {
    async fn list_boards(&self, owner: &str) -> Result<Vec<Board>, RemoteError> {
        self.fetch_boards(("user_id", format!("eq.{owner}"))).await
    }

    async fn list_shared_boards(&self, owner: &str) -> Result<Vec<Board>, RemoteError> {
        let groups = self.member_group_ids(owner).await?;
        if groups.is_empty() {
            return Ok(Vec::new());
        }
        self.fetch_boards(("group_id", format!("in.({})", groups.join(",")))).await
    }

    async fn upsert_board(&self, board: &Board, owner: &str) -> Result<(), RemoteError> {
        let response = self
            .rest_post("boards")
            .header("Prefer", "resolution=merge-duplicates")
            .json(&BoardRow::from_board(board, owner))
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn delete_board(&self, id: &str) -> Result<(), RemoteError> {
        let response = self
            .rest_delete("boards")
            .query(&[("id", format!("eq.{id}"))])
            .send()
            .await?;
        Self::check_status(response).await
    }

    async fn upload_image(&self, bytes: Vec<u8>, file_name: &str, owner: &str) -> Result<String, RemoteError> {
        let path = upload_path(owner, file_name, now_millis());
        let mime = crate::media::data_url::sniff_mime(&bytes);

        let response = self
            .authorize(
                self.http()
                    .post(self.endpoint(&format!("/storage/v1/object/{IMAGE_BUCKET}/{path}"))),
            )
            .header("Content-Type", mime)
            .body(bytes)
            .send()
            .await?;
        let _: Value = Self::parse_response(response).await?;

        log::info!("☁️  Uploaded picture to {path}");
        Ok(self.public_object_url(IMAGE_BUCKET, &path))
    }
}
