/// Card usage statistics
///
/// Summaries of the tap counts recorded in use mode, over every board
/// or a single one.

use std::collections::HashMap;

use super::data::{Board, CardCategory};

/// How many cards the "most used" list shows
pub const TOP_CARDS: usize = 10;

/// A card counts as recently used within this window (7 days)
pub const RECENT_WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Name used for cards without a category
pub const OTHER_CATEGORY: &str = "other";

/// Which boards the statistics cover
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BoardFilter {
    #[default]
    All,
    Board(String),
}

impl BoardFilter {
    fn includes(&self, board: &Board) -> bool {
        match self {
            BoardFilter::All => true,
            BoardFilter::Board(id) => board.id == *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardUsage {
    pub card_id: String,
    pub label: String,
    pub category: Option<CardCategory>,
    pub usage_count: u32,
    pub last_used: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryUsage {
    pub name: &'static str,
    pub taps: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsageStats {
    pub total_taps: u64,
    pub card_count: usize,
    pub board_count: usize,
    /// Most used first, at most [`TOP_CARDS`]; unused cards are left out
    pub top_cards: Vec<CardUsage>,
    /// Every category present on a card, most taps first
    pub by_category: Vec<CategoryUsage>,
    /// Cards tapped within [`RECENT_WINDOW_MS`] of `now`
    pub recent_cards: usize,
}

impl UsageStats {
    pub fn compute(boards: &[Board], filter: &BoardFilter, now: i64) -> Self {
        let boards: Vec<&Board> = boards.iter().filter(|b| filter.includes(b)).collect();
        let cards = boards.iter().flat_map(|b| b.cards.iter());

        let mut stats = UsageStats {
            board_count: boards.len(),
            ..Self::default()
        };
        let mut categories: HashMap<&'static str, u64> = HashMap::new();
        let recent_since = now.saturating_sub(RECENT_WINDOW_MS);

        for card in cards {
            let taps = card.usage_count.unwrap_or(0);
            stats.card_count += 1;
            stats.total_taps += u64::from(taps);

            let name = card.category.map_or(OTHER_CATEGORY, CardCategory::label);
            *categories.entry(name).or_default() += u64::from(taps);

            if card.last_used.is_some_and(|at| at > recent_since) {
                stats.recent_cards += 1;
            }
            if taps > 0 {
                stats.top_cards.push(CardUsage {
                    card_id: card.id.clone(),
                    label: card.label.clone(),
                    category: card.category,
                    usage_count: taps,
                    last_used: card.last_used,
                });
            }
        }

        // stable: ties keep board order
        stats.top_cards.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));
        stats.top_cards.truncate(TOP_CARDS);

        stats.by_category = categories
            .into_iter()
            .map(|(name, taps)| CategoryUsage { name, taps })
            .collect();
        stats
            .by_category
            .sort_by(|a, b| b.taps.cmp(&a.taps).then_with(|| a.name.cmp(b.name)));

        stats
    }

    /// Share of all taps, in percent
    pub fn percent_of_total(&self, taps: u64) -> f32 {
        if self.total_taps == 0 {
            return 0.0;
        }
        taps as f32 * 100.0 / self.total_taps as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::Card;

    const NOW: i64 = 1_700_000_000_000;

    fn used(label: &str, category: Option<CardCategory>, taps: u32, last_used: Option<i64>) -> Card {
        let mut card = Card::new(label, "");
        card.category = category;
        card.usage_count = (taps > 0).then_some(taps);
        card.last_used = last_used;
        card
    }

    fn boards() -> Vec<Board> {
        let mut food = Board::new("Food");
        food.add_card(used("eat", Some(CardCategory::Verb), 5, Some(NOW - 1_000)));
        food.add_card(used("apple", Some(CardCategory::Noun), 2, Some(NOW - RECENT_WINDOW_MS - 1)));
        food.add_card(used("yes", None, 0, None));

        let mut play = Board::new("Play");
        play.add_card(used("ball", Some(CardCategory::Noun), 7, Some(NOW)));
        play.add_card(used("hello", None, 1, Some(NOW - 60_000)));
        vec![food, play]
    }

    #[test]
    fn test_all_boards() {
        let stats = UsageStats::compute(&boards(), &BoardFilter::All, NOW);

        assert_eq!(stats.total_taps, 15);
        assert_eq!(stats.card_count, 5);
        assert_eq!(stats.board_count, 2);
        assert_eq!(stats.recent_cards, 3);

        let top: Vec<_> = stats.top_cards.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(top, vec!["ball", "eat", "apple", "hello"]);

        assert_eq!(
            stats.by_category,
            vec![
                CategoryUsage { name: "noun", taps: 9 },
                CategoryUsage { name: "verb", taps: 5 },
                CategoryUsage { name: "other", taps: 1 },
            ]
        );
    }

    #[test]
    fn test_single_board() {
        let boards = boards();
        let filter = BoardFilter::Board(boards[0].id.clone());
        let stats = UsageStats::compute(&boards, &filter, NOW);

        assert_eq!(stats.board_count, 1);
        assert_eq!(stats.card_count, 3);
        assert_eq!(stats.total_taps, 7);
        assert_eq!(stats.recent_cards, 1);
        assert_eq!(stats.top_cards.len(), 2);
        // untapped categories are still listed
        assert!(stats.by_category.contains(&CategoryUsage { name: "other", taps: 0 }));
    }

    #[test]
    fn test_top_list_is_capped() {
        let mut board = Board::new("Many");
        for taps in 1..=15 {
            board.add_card(used(&format!("c{taps}"), None, taps, None));
        }
        let stats = UsageStats::compute(&[board], &BoardFilter::All, NOW);

        assert_eq!(stats.top_cards.len(), TOP_CARDS);
        assert_eq!(stats.top_cards[0].usage_count, 15);
        assert_eq!(stats.top_cards[9].usage_count, 6);
    }

    #[test]
    fn test_no_usage() {
        let stats = UsageStats::compute(&[Board::new("Empty")], &BoardFilter::All, NOW);
        assert_eq!(stats.total_taps, 0);
        assert!(stats.top_cards.is_empty());
        assert!(stats.by_category.is_empty());
        assert_eq!(stats.percent_of_total(0), 0.0);

        let stats = UsageStats::compute(&boards(), &BoardFilter::Board("gone".into()), NOW);
        assert_eq!(stats.board_count, 0);
        assert_eq!(stats.card_count, 0);
    }

    #[test]
    fn test_percent_of_total() {
        let stats = UsageStats::compute(&boards(), &BoardFilter::All, NOW);
        assert!((stats.percent_of_total(9) - 60.0).abs() < 1e-4);
    }
}
