/// Shared data structures for the application state
///
/// These structs represent the board documents that flow between
/// the local cache, the hosted backend, exported files and the UI.
/// Field names serialize in camelCase, which is also the file
/// interchange format.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default number of grid columns for a new board
pub const DEFAULT_COLUMNS: u32 = 4;
/// Default gap between cards, in pixels
pub const DEFAULT_GAP: u32 = 16;
/// Default board background
pub const DEFAULT_BACKGROUND: &str = "#ffffff";
/// Background used for cards without a category
pub const DEFAULT_CARD_COLOR: &str = "#FFFFFF";

/// Mint a fresh identifier for a board or card
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Grammatical category of a card
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CardCategory {
    Noun,
    Verb,
    Adjective,
    Social,
}

impl CardCategory {
    pub const ALL: [CardCategory; 4] = [
        CardCategory::Noun,
        CardCategory::Verb,
        CardCategory::Adjective,
        CardCategory::Social,
    ];

    /// Conventional card color for this category
    pub fn color(self) -> &'static str {
        match self {
            CardCategory::Noun => "#FFD700",
            CardCategory::Verb => "#90EE90",
            CardCategory::Adjective => "#87CEEB",
            CardCategory::Social => "#FFB6C1",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CardCategory::Noun => "noun",
            CardCategory::Verb => "verb",
            CardCategory::Adjective => "adjective",
            CardCategory::Social => "social",
        }
    }
}

impl std::fmt::Display for CardCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A single labeled picture on a board
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub label: String,
    /// Remote URL, local file path, or a self-contained `data:` URL
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_card_color")]
    pub background_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CardCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Number of times the card was tapped in use mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<i64>,
}

fn default_card_color() -> String {
    DEFAULT_CARD_COLOR.to_string()
}

impl Card {
    /// Create a card with a fresh identifier
    pub fn new(label: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            label: label.into(),
            image_url: image_url.into(),
            background_color: default_card_color(),
            category: None,
            audio_url: None,
            usage_count: None,
            last_used: None,
        }
    }

    /// Set the category and adopt its conventional color
    pub fn with_category(mut self, category: CardCategory) -> Self {
        self.category = Some(category);
        self.background_color = category.color().to_string();
        self
    }

    /// Copy of this card under a new identifier
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_id(),
            ..self.clone()
        }
    }
}

/// A titled grid of cards plus its layout settings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_group_id: Option<String>,
    pub title: String,
    #[serde(default = "default_columns")]
    pub grid_columns: u32,
    #[serde(default = "default_gap")]
    pub grid_gap: u32,
    #[serde(default = "default_background")]
    pub background_color: String,
    #[serde(default)]
    pub cards: Vec<Card>,
    /// Last modification, milliseconds since the Unix epoch
    #[serde(default)]
    pub updated_at: i64,
}

fn default_columns() -> u32 {
    DEFAULT_COLUMNS
}

fn default_gap() -> u32 {
    DEFAULT_GAP
}

fn default_background() -> String {
    DEFAULT_BACKGROUND.to_string()
}

impl Board {
    /// Create an empty board with default layout settings
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            user_id: None,
            family_group_id: None,
            title: title.into(),
            grid_columns: DEFAULT_COLUMNS,
            grid_gap: DEFAULT_GAP,
            background_color: default_background(),
            cards: Vec::new(),
            updated_at: now_millis(),
        }
    }

    /// Mark the board as modified now
    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_index(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Replace the card with the same id; returns false if it is not on the board
    pub fn replace_card(&mut self, card: Card) -> bool {
        match self.card_index(&card.id) {
            Some(index) => {
                self.cards[index] = card;
                true
            }
            None => false,
        }
    }

    pub fn remove_card(&mut self, id: &str) -> Option<Card> {
        let index = self.card_index(id)?;
        Some(self.cards.remove(index))
    }

    /// Drag-reorder: take the card at `from` and insert it at `to`.
    /// Out-of-range `from` is ignored; `to` is clamped to the end.
    pub fn move_card(&mut self, from: usize, to: usize) -> bool {
        if from >= self.cards.len() {
            return false;
        }
        let card = self.cards.remove(from);
        let to = to.min(self.cards.len());
        self.cards.insert(to, card);
        from != to
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Column count is always at least one
    pub fn set_columns(&mut self, columns: u32) {
        self.grid_columns = columns.max(1);
    }

    pub fn set_gap(&mut self, gap: u32) {
        self.grid_gap = gap;
    }

    pub fn set_background(&mut self, color: impl Into<String>) {
        self.background_color = color.into();
    }

    /// Count a tap on a card in use mode
    pub fn record_card_use(&mut self, id: &str, at: i64) -> bool {
        match self.cards.iter_mut().find(|c| c.id == id) {
            Some(card) => {
                card.usage_count = Some(card.usage_count.unwrap_or(0).saturating_add(1));
                card.last_used = Some(at);
                true
            }
            None => false,
        }
    }

    /// Paste a copy of `card` from another board. The copy gets a new id
    /// and starts without usage history; returns the new id.
    pub fn paste_card(&mut self, card: &Card) -> String {
        let copy = Card {
            usage_count: None,
            last_used: None,
            ..card.duplicate()
        };
        let id = copy.id.clone();
        self.add_card(copy);
        self.touch();
        id
    }

    /// Copy of this board with new board and card identifiers
    pub fn duplicate(&self) -> Self {
        Self {
            id: new_id(),
            title: format!("{} (Copy)", self.title),
            cards: self.cards.iter().map(Card::duplicate).collect(),
            updated_at: now_millis(),
            ..self.clone()
        }
    }

    /// Case-insensitive title match used by the board search box
    pub fn matches_query(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(&query.trim().to_lowercase())
    }
}

/// A signed-in user as reported by the identity service
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserIdentity {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl UserIdentity {
    /// Display name, falling back to the local part of the email
    pub fn name(&self) -> String {
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .unwrap_or("user")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(labels: &[&str]) -> Board {
        let mut board = Board::new("Test");
        for label in labels {
            board.add_card(Card::new(*label, ""));
        }
        board
    }

    fn labels(board: &Board) -> Vec<&str> {
        board.cards.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_move_card_reorders() {
        let mut board = board_with(&["a", "b", "c", "d"]);
        assert!(board.move_card(0, 2));
        assert_eq!(labels(&board), vec!["b", "c", "a", "d"]);

        assert!(board.move_card(3, 0));
        assert_eq!(labels(&board), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_move_card_out_of_range() {
        let mut board = board_with(&["a", "b"]);
        assert!(!board.move_card(5, 0));
        assert!(board.move_card(0, 99));
        assert_eq!(labels(&board), vec!["b", "a"]);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut board = board_with(&["a", "b"]);
        let mut edited = board.cards[1].clone();
        edited.label = "bee".into();
        assert!(board.replace_card(edited));
        assert_eq!(labels(&board), vec!["a", "bee"]);

        let id = board.cards[0].id.clone();
        assert_eq!(board.remove_card(&id).map(|c| c.label), Some("a".to_string()));
        assert!(board.remove_card(&id).is_none());
        assert!(!board.replace_card(Card::new("ghost", "")));
    }

    #[test]
    fn test_columns_never_zero() {
        let mut board = Board::new("x");
        board.set_columns(0);
        assert_eq!(board.grid_columns, 1);
    }

    #[test]
    fn test_duplicate_mints_new_ids() {
        let board = board_with(&["a", "b"]);
        let copy = board.duplicate();
        assert_ne!(copy.id, board.id);
        assert_eq!(copy.title, "Test (Copy)");
        for (orig, dup) in board.cards.iter().zip(&copy.cards) {
            assert_ne!(orig.id, dup.id);
            assert_eq!(orig.label, dup.label);
        }
    }

    #[test]
    fn test_record_card_use() {
        let mut board = board_with(&["a"]);
        let id = board.cards[0].id.clone();
        board.record_card_use(&id, 10);
        board.record_card_use(&id, 20);
        assert_eq!(board.cards[0].usage_count, Some(2));
        assert_eq!(board.cards[0].last_used, Some(20));
        assert!(!board.record_card_use("missing", 30));
    }

    #[test]
    fn test_usage_count_saturates() {
        let mut board = board_with(&["a"]);
        let id = board.cards[0].id.clone();
        board.cards[0].usage_count = Some(u32::MAX);
        assert!(board.record_card_use(&id, 1));
        assert_eq!(board.cards[0].usage_count, Some(u32::MAX));
    }

    #[test]
    fn test_paste_card_into_other_board() {
        let mut source = board_with(&["drink", "eat"]);
        let id = source.cards[1].id.clone();
        source.record_card_use(&id, 50);
        let before = source.clone();

        let mut target = board_with(&["play"]);
        target.updated_at = 0;
        let card = source.card(&id).unwrap();
        let new_id = target.paste_card(card);

        assert_ne!(new_id, id);
        assert_eq!(labels(&target), vec!["play", "eat"]);
        let pasted = target.card(&new_id).unwrap();
        assert_eq!(pasted.usage_count, None);
        assert_eq!(pasted.image_url, card.image_url);
        assert!(target.updated_at > 0);
        assert_eq!(source, before);
    }

    #[test]
    fn test_camel_case_shape() {
        let card = Card::new("Eat", "https://example.com/eat.png").with_category(CardCategory::Verb);
        let mut board = Board::new("Food");
        board.add_card(card);

        let json = serde_json::to_value(&board).unwrap();
        assert!(json.get("gridColumns").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["cards"][0]["imageUrl"], "https://example.com/eat.png");
        assert_eq!(json["cards"][0]["category"], "verb");
        assert_eq!(json["cards"][0]["backgroundColor"], "#90EE90");
        assert!(json["cards"][0].get("usageCount").is_none());
    }

    #[test]
    fn test_missing_layout_fields_take_defaults() {
        let board: Board = serde_json::from_str(r#"{"id":"b1","title":"T","cards":[]}"#).unwrap();
        assert_eq!(board.grid_columns, DEFAULT_COLUMNS);
        assert_eq!(board.grid_gap, DEFAULT_GAP);
        assert_eq!(board.background_color, DEFAULT_BACKGROUND);
    }

    #[test]
    fn test_identity_name_fallback() {
        let user = UserIdentity {
            id: "u".into(),
            email: Some("sam@example.com".into()),
            display_name: None,
        };
        assert_eq!(user.name(), "sam");
    }
}
