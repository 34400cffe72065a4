//! Rank table: the ladder of cats from Kitten to ULTIMATE CAT
//!
//! Static and read-only. Radius strictly increases with rank and the top
//! rank never merges further.

use std::ops::Range;

use serde::Serialize;

/// Index into a [`RankTable`]
pub type RankIndex = usize;

/// One tier of cat
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rank {
    pub name: &'static str,
    pub radius: f32,
    /// Points awarded when a merge produces this rank
    pub score_value: u64,
    /// Fill colour (CSS hex)
    pub color: &'static str,
    pub emoji: &'static str,
}

impl Rank {
    /// Emoji without decorations, for small previews
    pub fn plain_emoji(&self) -> &'static str {
        self.emoji.trim_end_matches('✨')
    }
}

/// Cats from smallest to largest
pub const CAT_RANKS: [Rank; 11] = [
    Rank {
        name: "Kitten",
        radius: 20.0,
        score_value: 1,
        color: "#FFB6C1",
        emoji: "🐱",
    },
    Rank {
        name: "Tabby",
        radius: 28.0,
        score_value: 3,
        color: "#FFA07A",
        emoji: "😺",
    },
    Rank {
        name: "Ginger",
        radius: 36.0,
        score_value: 6,
        color: "#FF8C00",
        emoji: "😸",
    },
    Rank {
        name: "Siamese",
        radius: 44.0,
        score_value: 10,
        color: "#DEB887",
        emoji: "😹",
    },
    Rank {
        name: "Persian",
        radius: 52.0,
        score_value: 15,
        color: "#F5F5DC",
        emoji: "😻",
    },
    Rank {
        name: "Maine Coon",
        radius: 62.0,
        score_value: 21,
        color: "#CD853F",
        emoji: "😼",
    },
    Rank {
        name: "Chonker",
        radius: 72.0,
        score_value: 28,
        color: "#808080",
        emoji: "😽",
    },
    Rank {
        name: "Chungus",
        radius: 84.0,
        score_value: 36,
        color: "#4169E1",
        emoji: "🙀",
    },
    Rank {
        name: "Absolute Unit",
        radius: 98.0,
        score_value: 45,
        color: "#9932CC",
        emoji: "😾",
    },
    Rank {
        name: "Mega Cat",
        radius: 115.0,
        score_value: 55,
        color: "#FFD700",
        emoji: "😿",
    },
    Rank {
        name: "ULTIMATE CAT",
        radius: 135.0,
        score_value: 100,
        color: "#FF1493",
        emoji: "😸✨",
    },
];

/// Only the five smallest cats are ever offered to the player
pub const DROPPABLE_RANKS: usize = 5;

/// Ordered rank ladder plus its droppable prefix
#[derive(Debug, Clone, Copy)]
pub struct RankTable {
    ranks: &'static [Rank],
    droppable: usize,
}

impl Default for RankTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RankTable {
    /// The standard cat ladder
    pub const fn standard() -> Self {
        Self::new(&CAT_RANKS, DROPPABLE_RANKS)
    }

    /// Build a table over `ranks` whose first `droppable` entries can be offered.
    ///
    /// Panics if the table is empty, radii are not strictly increasing, or the
    /// droppable prefix is empty or reaches the top rank.
    pub const fn new(ranks: &'static [Rank], droppable: usize) -> Self {
        assert!(!ranks.is_empty(), "rank table must not be empty");
        assert!(
            droppable > 0 && droppable < ranks.len(),
            "droppable ranks must be a non-empty prefix below the top rank"
        );
        let mut i = 1;
        while i < ranks.len() {
            assert!(
                ranks[i].radius > ranks[i - 1].radius,
                "rank radii must strictly increase"
            );
            i += 1;
        }
        Self { ranks, droppable }
    }

    /// Look up a rank. An out-of-range index is a broken invariant and panics.
    #[inline]
    pub fn rank(&self, index: RankIndex) -> &Rank {
        match self.ranks.get(index) {
            Some(rank) => rank,
            None => panic!(
                "rank index {} out of range (table has {} ranks)",
                index,
                self.ranks.len()
            ),
        }
    }

    /// Non-panicking lookup for presentation code
    #[inline]
    pub fn get(&self, index: RankIndex) -> Option<&Rank> {
        self.ranks.get(index)
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.ranks.len()
    }

    /// True for the top rank, which never merges
    #[inline]
    pub fn is_max_rank(&self, index: RankIndex) -> bool {
        index + 1 == self.ranks.len()
    }

    /// Ranks that may be offered as the current/next drop
    #[inline]
    pub fn droppable_ranks(&self) -> Range<RankIndex> {
        0..self.droppable
    }

    #[inline]
    pub fn radius(&self, index: RankIndex) -> f32 {
        self.rank(index).radius
    }

    /// Radius of the biggest cat the player can be handed
    pub fn largest_droppable_radius(&self) -> f32 {
        self.radius(self.droppable - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rank> {
        self.ranks.iter()
    }
}
