use serde_derive::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A player's standing, ordered by score and then by name.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct ScoreKey {
    pub score: u32,
    pub name: String,
}

impl ScoreKey {
    pub fn new<S>(name: S, score: u32) -> Self
    where S: Into<String> {
        ScoreKey {
            score,
            name: name.into(),
        }
    }
}

impl fmt::Display for ScoreKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name: {}, Score: {}", self.name, self.score)
    }
}

/// A player's standing that is ordered and compared by name alone.
///
/// The score is carried along so that a lookup by name yields it, but two keys with the same name
/// are equal whatever their scores.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NameKey {
    pub name: String,
    pub score: u32,
}

impl NameKey {
    pub fn new<S>(name: S, score: u32) -> Self
    where S: Into<String> {
        NameKey {
            name: name.into(),
            score,
        }
    }
}

impl Ord for NameKey {
    fn cmp(&self, other: &NameKey) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl PartialOrd for NameKey {
    fn partial_cmp(&self, other: &NameKey) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for NameKey {
    fn eq(&self, other: &NameKey) -> bool {
        self.name == other.name
    }
}

impl Eq for NameKey {}
