//! Player rankings kept in two skiplists: one ordered by score, one ordered by name.

mod key;

pub use self::key::{NameKey, ScoreKey};

use crate::error::{Error, Result};
use crate::skiplist::{Index, IndexConfig, Iter};
use tracing::debug;

/// A set of uniquely named players and their scores.
///
/// Lookups by name go through an index ordered by name; rankings are read from an index ordered
/// by score and then name. Both indexes always hold the same players.
///
/// # Examples
/// ```
/// use skip_index::leaderboard::Leaderboard;
///
/// let mut board = Leaderboard::new();
/// board.add_player("amy", 30).unwrap();
/// board.add_player("bob", 50).unwrap();
/// board.add_player("cat", 40).unwrap();
/// assert!(board.add_player("amy", 10).is_err());
///
/// assert_eq!(board.score("cat"), Some(40));
/// assert_eq!(board.rank("amy"), Some(3));
///
/// let top: Vec<&str> = board.top(2).into_iter().map(|key| key.name.as_str()).collect();
/// assert_eq!(top, vec!["bob", "cat"]);
/// ```
pub struct Leaderboard {
    by_score: Index<ScoreKey>,
    by_name: Index<NameKey>,
}

impl Leaderboard {
    /// Constructs a new, empty `Leaderboard`.
    pub fn new() -> Self {
        Leaderboard {
            by_score: Index::new(),
            by_name: Index::new(),
        }
    }

    /// Constructs a new, empty `Leaderboard` whose indexes are built from `config`.
    pub fn with_config(config: &IndexConfig) -> Result<Self> {
        Ok(Leaderboard {
            by_score: Index::with_config(config)?,
            by_name: Index::with_config(config)?,
        })
    }

    /// Adds a player. Returns an error if a player with the same name already exists.
    pub fn add_player(&mut self, name: &str, score: u32) -> Result<()> {
        let by_name = NameKey::new(name, score);
        if self.by_name.contains(&by_name) {
            return Err(Error::DuplicatePlayer(name.to_owned()));
        }
        self.by_score.insert(ScoreKey::new(name, score));
        self.by_name.insert(by_name);
        debug!(name = name, score = score, "added player");
        Ok(())
    }

    /// Returns the score of a player, or `None` if no such player exists.
    pub fn score(&self, name: &str) -> Option<u32> {
        self.by_name
            .find(&NameKey::new(name, 0))
            .map(|entry| entry.key().score)
    }

    /// Checks if a player exists.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains(&NameKey::new(name, 0))
    }

    /// Removes a player and returns their score. Returns an error if no such player exists.
    pub fn remove_player(&mut self, name: &str) -> Result<u32> {
        let score = self
            .score(name)
            .ok_or_else(|| Error::UnknownPlayer(name.to_owned()))?;
        self.by_name.remove(&NameKey::new(name, score));
        self.by_score.remove(&ScoreKey::new(name, score));
        debug!(name = name, score = score, "removed player");
        Ok(score)
    }

    /// Replaces the score of a player and returns the previous score. Returns an error if no such
    /// player exists.
    pub fn update_score(&mut self, name: &str, score: u32) -> Result<u32> {
        let previous = self.remove_player(name)?;
        self.add_player(name, score)?;
        Ok(previous)
    }

    /// Returns the 1-based rank of a player, where rank 1 is the highest score. Players with equal
    /// scores are ranked by name, the greater name first.
    pub fn rank(&self, name: &str) -> Option<usize> {
        let key = ScoreKey::new(name, self.score(name)?);
        let position = self.by_score.iter().position(|standing| *standing == key)?;
        Some(self.by_score.len() - position)
    }

    /// Returns up to `count` standings with the highest scores, highest first. Returns every
    /// standing if there are fewer than `count` players.
    pub fn top(&self, count: usize) -> Vec<&ScoreKey> {
        let skipped = self.by_score.len().saturating_sub(count);
        let mut top: Vec<&ScoreKey> = self.by_score.iter().skip(skipped).collect();
        top.reverse();
        top
    }

    /// Returns the number of players.
    pub fn len(&self) -> usize {
        self.by_score.len()
    }

    /// Returns `true` if there are no players.
    pub fn is_empty(&self) -> bool {
        self.by_score.is_empty()
    }

    /// Returns an iterator over every standing, lowest score first.
    pub fn iter(&self) -> Iter<ScoreKey> {
        self.by_score.iter()
    }
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Leaderboard {
    type Item = &'a ScoreKey;
    type IntoIter = Iter<'a, ScoreKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
