/// Board file interchange
///
/// Boards are shared as pretty-printed JSON in the same camelCase shape the
/// cache stores. Importing always mints fresh identifiers so a file can be
/// imported any number of times without colliding with existing boards.

use serde_json::Value;

use crate::media::loader;
use crate::state::data::{new_id, Board};

#[derive(Debug, thiserror::Error)]
pub enum InterchangeError {
    #[error("not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid board file: {0}")]
    InvalidBoard(String),
}

/// Fields a board file must carry
const REQUIRED_FIELDS: [&str; 4] = ["id", "title", "cards", "gridColumns"];

/// Serialize a board for export
pub fn export_board(board: &Board) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(board)?)
}

/// Suggested file name: whitespace runs become `_`
pub fn export_file_name(board: &Board) -> String {
    let stem = board.title.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if stem.is_empty() { "board".to_string() } else { stem };
    format!("{stem}_board.json")
}

/// Parse a board file, regenerating the board id and every card id.
/// `now` becomes the board's modification time.
pub fn import_board(json: &str, now: i64) -> Result<Board, InterchangeError> {
    let mut value: Value = serde_json::from_str(json)?;
    validate(&value)?;

    // only Value::Object reaches this point
    if let Some(object) = value.as_object_mut() {
        object.insert("id".into(), Value::String(new_id()));
        object.insert("updatedAt".into(), Value::from(now));
        object.remove("userId");
        object.remove("familyGroupId");
        if let Some(Value::Array(cards)) = object.get_mut("cards") {
            for card in cards.iter_mut() {
                let Some(card) = card.as_object_mut() else {
                    return Err(InterchangeError::InvalidBoard("card is not an object".into()));
                };
                card.insert("id".into(), Value::String(new_id()));
            }
        }
    }

    let mut board: Board =
        serde_json::from_value(value).map_err(|e| InterchangeError::InvalidBoard(e.to_string()))?;
    board.grid_columns = board.grid_columns.max(1);

    log::info!("📥 Imported board '{}' with {} cards", board.title, board.cards.len());
    Ok(board)
}

fn validate(value: &Value) -> Result<(), InterchangeError> {
    let Some(object) = value.as_object() else {
        return Err(InterchangeError::InvalidBoard("expected a JSON object".into()));
    };
    for field in REQUIRED_FIELDS {
        if !object.contains_key(field) {
            return Err(InterchangeError::InvalidBoard(format!("missing field '{field}'")));
        }
    }
    if !object["cards"].is_array() {
        return Err(InterchangeError::InvalidBoard("'cards' must be an array".into()));
    }
    Ok(())
}

/// Replace card picture references with `data:` URLs so an exported file
/// is self-contained. Pictures that cannot be fetched keep their reference.
pub async fn inline_images(mut board: Board, client: reqwest::Client) -> Board {
    for card in board.cards.iter_mut() {
        if card.image_url.is_empty() {
            continue;
        }
        match loader::inline_reference(&card.image_url, &client).await {
            Ok(url) => card.image_url = url,
            Err(e) => log::warn!("⚠️  Keeping picture reference for '{}': {e}", card.label),
        }
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{Card, CardCategory};
    use std::collections::HashSet;

    const SAMPLE: &str = r##"{
        "id": "board-1",
        "title": "Snack Time",
        "gridColumns": 3,
        "cards": [
            { "id": "c1", "label": "Apple", "imageUrl": "data:image/png;base64,AAAA", "category": "noun" },
            { "id": "c2", "label": "Eat", "imageUrl": "", "backgroundColor": "#90EE90" }
        ]
    }"##;

    #[test]
    fn test_export_file_name() {
        let mut board = Board::new("Morning   Routine\tBoard");
        assert_eq!(export_file_name(&board), "Morning_Routine_Board_board.json");
        board.title = "  ".into();
        assert_eq!(export_file_name(&board), "board_board.json");
    }

    #[test]
    fn test_export_then_import_keeps_content() {
        let mut board = Board::new("Feelings");
        board.add_card(Card::new("Happy", "").with_category(CardCategory::Adjective));
        board.set_columns(5);

        let json = export_board(&board).unwrap();
        assert!(json.contains("\"gridColumns\": 5"));

        let imported = import_board(&json, 42).unwrap();
        assert_ne!(imported.id, board.id);
        assert_ne!(imported.cards[0].id, board.cards[0].id);
        assert_eq!(imported.cards[0].label, "Happy");
        assert_eq!(imported.cards[0].category, Some(CardCategory::Adjective));
        assert_eq!(imported.grid_columns, 5);
        assert_eq!(imported.updated_at, 42);
    }

    #[test]
    fn test_import_defaults_optional_fields() {
        let board = import_board(SAMPLE, 1000).unwrap();
        assert_eq!(board.title, "Snack Time");
        assert_eq!(board.grid_gap, 16);
        assert_eq!(board.background_color, "#ffffff");
        assert_eq!(board.cards[0].background_color, "#FFFFFF");
        assert_eq!(board.cards[1].background_color, "#90EE90");
    }

    #[test]
    fn test_two_imports_have_disjoint_ids() {
        let a = import_board(SAMPLE, 1).unwrap();
        let b = import_board(SAMPLE, 2).unwrap();

        let ids = |board: &Board| {
            let mut ids: HashSet<String> = board.cards.iter().map(|c| c.id.clone()).collect();
            ids.insert(board.id.clone());
            ids
        };
        assert!(ids(&a).is_disjoint(&ids(&b)));
        assert!(!ids(&a).contains("c1"));
        assert!(!ids(&a).contains("board-1"));
    }

    #[test]
    fn test_import_drops_ownership() {
        let json = r#"{"id":"x","title":"t","cards":[],"gridColumns":2,"userId":"someone","familyGroupId":"g"}"#;
        let board = import_board(json, 0).unwrap();
        assert_eq!(board.user_id, None);
        assert_eq!(board.family_group_id, None);
    }

    #[test]
    fn test_import_rejects_invalid_files() {
        assert!(matches!(import_board("{not json", 0), Err(InterchangeError::Json(_))));
        assert!(matches!(import_board("[]", 0), Err(InterchangeError::InvalidBoard(_))));
        assert!(matches!(
            import_board(r#"{"id":"x","title":"t","cards":[]}"#, 0),
            Err(InterchangeError::InvalidBoard(_))
        ));
        assert!(matches!(
            import_board(r#"{"id":"x","title":"t","cards":{},"gridColumns":4}"#, 0),
            Err(InterchangeError::InvalidBoard(_))
        ));
        assert!(matches!(
            import_board(r#"{"id":"x","title":"t","cards":[7],"gridColumns":4}"#, 0),
            Err(InterchangeError::InvalidBoard(_))
        ));
    }

    #[tokio::test]
    async fn test_inline_images_keeps_unreachable_references() {
        let mut board = Board::new("Pictures");
        board.add_card(Card::new("Missing", "/no/such/picture.png"));
        board.add_card(Card::new("Inline", "data:image/png;base64,AAAA"));
        board.add_card(Card::new("Blank", ""));

        let board = inline_images(board, reqwest::Client::new()).await;
        assert_eq!(board.cards[0].image_url, "/no/such/picture.png");
        assert_eq!(board.cards[1].image_url, "data:image/png;base64,AAAA");
        assert_eq!(board.cards[2].image_url, "");
    }
}
