use std::error;
use std::fmt;
use std::result;

/// Errors produced by the index, its storage, and the leaderboard built on top of it.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A level was addressed on an entry or head chain that does not have that many levels.
    LevelOutOfRange { level: usize, height: usize },
    /// An arena handle no longer refers to a live entry.
    StaleHandle,
    /// The promotion probability was not strictly between 0 and 1.
    InvalidProbability(f64),
    /// The maximum height was zero.
    InvalidMaxHeight(usize),
    /// An all-zero seed was supplied for the xorshift generator.
    ZeroSeed,
    /// A player with this name is already ranked.
    DuplicatePlayer(String),
    /// No player with this name is ranked.
    UnknownPlayer(String),
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::LevelOutOfRange { level, height } => {
                write!(f, "level {} is out of range for height {}", level, height)
            },
            Error::StaleHandle => write!(f, "handle does not refer to a live entry"),
            Error::InvalidProbability(p) => write!(f, "promotion probability {} is not in (0, 1)", p),
            Error::InvalidMaxHeight(height) => write!(f, "maximum height {} must be at least 1", height),
            Error::ZeroSeed => write!(f, "seed must not be all zeros"),
            Error::DuplicatePlayer(name) => write!(f, "player {} already exists", name),
            Error::UnknownPlayer(name) => write!(f, "player {} does not exist", name),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
