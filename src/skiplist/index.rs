use super::entry::{key_of, resolve, resolve_mut, Entry};
use super::head::{HeadPosition, LevelHeads};
use super::trace::{SearchPath, SearchStep};
use crate::arena::{Handle, TypedArena};
use crate::error::{Error, Result};
use crate::level_generator::{GeometricLevelGenerator, LevelGenerator, DEFAULT_MAX_HEIGHT, DEFAULT_PROBABILITY};
use serde_derive::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::FromIterator;
use tracing::trace;

const ARENA_CHUNK_SIZE: usize = 256;

// Internal operations only fail when the structure itself is corrupt.
fn invariant<U>(result: Result<U>) -> U {
    match result {
        Ok(value) => value,
        Err(err) => panic!("skiplist invariant violated: {}", err),
    }
}

/// Construction parameters for an `Index`.
///
/// # Examples
/// ```
/// use skip_index::skiplist::{Index, IndexConfig};
///
/// let config = IndexConfig {
///     seed: Some([1, 2, 3, 4]),
///     ..IndexConfig::default()
/// };
/// let mut index = Index::with_config(&config).unwrap();
/// index.insert("a");
/// assert_eq!(index.len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Probability that an entry linked at level `n` is also linked at level `n + 1`.
    pub promotion_probability: f64,
    /// Upper bound on the height of any entry.
    pub max_height: usize,
    /// Seed for the height generator. Heights are drawn from an OS-seeded generator when `None`.
    pub seed: Option<[u32; 4]>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            promotion_probability: DEFAULT_PROBABILITY,
            max_height: DEFAULT_MAX_HEIGHT,
            seed: None,
        }
    }
}

impl IndexConfig {
    /// Builds the height generator described by this configuration.
    pub fn level_generator(&self) -> Result<GeometricLevelGenerator> {
        match self.seed {
            Some(seed) => GeometricLevelGenerator::from_seed(self.max_height, self.promotion_probability, seed),
            None => GeometricLevelGenerator::new(self.max_height, self.promotion_probability),
        }
    }
}

/// An ordered index of unique keys implemented by a skiplist.
///
/// A skiplist maintains a linked hierarchy of subsequences. Level 0 is a sorted linked list of
/// every key in the index and each level above it links a random subset of the level below, so
/// searches can skip over long runs of entries. Searching, insertion, and removal take expected
/// logarithmic time.
///
/// Entries are stored in an arena and linked by handles. Every level has a head slot that records
/// its first entry; the number of levels grows when an entry taller than all previous ones is
/// inserted, and never shrinks.
///
/// # Examples
/// ```
/// use skip_index::skiplist::Index;
///
/// let mut index = Index::new();
/// index.insert(5);
/// index.insert(3);
/// index.insert(8);
/// assert!(index.insert(3).is_none());
///
/// assert_eq!(index.len(), 3);
/// assert_eq!(index.find(&8).map(|entry| *entry.key()), Some(8));
/// assert!(index.find(&4).is_none());
///
/// assert!(index.remove(&5));
/// assert!(!index.remove(&5));
/// assert_eq!(index.iter().collect::<Vec<&u32>>(), vec![&3, &8]);
/// ```
pub struct Index<T, G = GeometricLevelGenerator> {
    arena: TypedArena<Entry<T>>,
    heads: LevelHeads,
    generator: G,
    len: usize,
}

impl<T> Index<T>
where T: Ord
{
    /// Constructs a new, empty `Index<T>` with the default height generator.
    ///
    /// # Examples
    /// ```
    /// use skip_index::skiplist::Index;
    ///
    /// let index: Index<u32> = Index::new();
    /// assert!(index.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_level_generator(GeometricLevelGenerator::default())
    }

    /// Constructs a new, empty `Index<T>` from a configuration. Returns an error if the
    /// configuration is invalid.
    pub fn with_config(config: &IndexConfig) -> Result<Self> {
        Ok(Self::with_level_generator(config.level_generator()?))
    }
}

impl<T, G> Index<T, G>
where
    T: Ord,
    G: LevelGenerator,
{
    /// Constructs a new, empty index that draws entry heights from `generator`.
    pub fn with_level_generator(generator: G) -> Self {
        Index {
            arena: TypedArena::new(ARENA_CHUNK_SIZE),
            heads: LevelHeads::new(),
            generator,
            len: 0,
        }
    }

    fn entry_ref(&self, handle: Handle) -> EntryRef<T> {
        EntryRef {
            arena: &self.arena,
            entry: invariant(resolve(&self.arena, handle)),
        }
    }

    /// Inserts a key into the index and returns a reference to its new entry. If the key already
    /// exists, the index is left unchanged and `None` is returned.
    ///
    /// # Examples
    /// ```
    /// use skip_index::skiplist::Index;
    ///
    /// let mut index = Index::new();
    /// let entry = index.insert(1).unwrap();
    /// assert_eq!(entry.key(), &1);
    /// assert!(entry.height() >= 1);
    ///
    /// assert!(index.insert(1).is_none());
    /// assert_eq!(index.len(), 1);
    /// ```
    pub fn insert(&mut self, key: T) -> Option<EntryRef<T>> {
        let handle = invariant(self.try_insert(key))?;
        Some(self.entry_ref(handle))
    }

    fn try_insert(&mut self, key: T) -> Result<Option<Handle>> {
        if self.search(&key, &mut SearchPath::disabled())?.is_some() {
            return Ok(None);
        }

        let height = self.generator.random_height();
        let handle = self.arena.allocate(Entry::new(key, height));

        if let Some(HeadPosition { mut level, first }) = self.heads.locate_insertion_point(&mut self.arena, handle)? {
            let mut curr = first;
            loop {
                while let Some(next) = resolve(&self.arena, curr)?.link_at(level)? {
                    if resolve(&self.arena, next)?.key() > resolve(&self.arena, handle)?.key() {
                        break;
                    }
                    curr = next;
                }

                let (curr_entry, new_entry) = self.arena.get_pair_mut(curr, handle).ok_or(Error::StaleHandle)?;
                curr_entry.splice_after(new_entry, handle, level)?;

                if level == 0 {
                    break;
                }
                level -= 1;
            }
        }

        self.len += 1;
        trace!(height = height, levels = self.heads.len(), "inserted entry");
        Ok(Some(handle))
    }

    /// Returns a reference to the entry holding `key`, or `None` if the key does not exist.
    ///
    /// # Examples
    /// ```
    /// use skip_index::skiplist::Index;
    ///
    /// let mut index = Index::new();
    /// index.insert(1);
    /// assert_eq!(index.find(&1).map(|entry| *entry.key()), Some(1));
    /// assert!(index.find(&0).is_none());
    /// ```
    pub fn find(&self, key: &T) -> Option<EntryRef<T>> {
        invariant(self.search(key, &mut SearchPath::disabled())).map(|handle| self.entry_ref(handle))
    }

    /// Searches for `key` and also returns every step the search took. The result of the search
    /// is the same as the result of `find`.
    pub fn find_traced(&self, key: &T) -> (Option<EntryRef<T>>, SearchPath<T>) {
        let mut path = SearchPath::enabled();
        let handle = invariant(self.search(key, &mut path));
        (handle.map(|handle| self.entry_ref(handle)), path)
    }

    /// Checks if a key exists in the index.
    pub fn contains(&self, key: &T) -> bool {
        self.find(key).is_some()
    }

    fn search<'a>(&'a self, key: &T, path: &mut SearchPath<'a, T>) -> Result<Option<Handle>> {
        let (mut level, mut curr) = match self.heads.locate_search_entry(&self.arena, key, path)? {
            Some(HeadPosition { level, first }) => (level, first),
            None => return Ok(None),
        };

        loop {
            let entry = resolve(&self.arena, curr)?;
            level = level.min(entry.height() - 1);
            let mut next = entry.link_at(level)?;
            let mut next_key = key_of(&self.arena, next)?;
            path.record(move || SearchStep::Visit {
                level,
                entry: entry.key(),
                next: next_key,
            });

            if entry.key() == key {
                return Ok(Some(curr));
            }

            // The only way out without a match is reaching level 0 with no successor that
            // could still hold the key.
            curr = loop {
                if let (Some(handle), Some(candidate)) = (next, next_key) {
                    if candidate <= key {
                        break handle;
                    }
                }
                if level == 0 {
                    return Ok(None);
                }
                level -= 1;
                next = entry.link_at(level)?;
                next_key = key_of(&self.arena, next)?;
                path.record(move || SearchStep::Descend { level, next: next_key });
            };
        }
    }

    /// Removes a key from the index. Returns `true` if the key existed.
    ///
    /// # Examples
    /// ```
    /// use skip_index::skiplist::Index;
    ///
    /// let mut index = Index::new();
    /// index.insert(1);
    /// assert!(index.remove(&1));
    /// assert!(!index.remove(&1));
    /// assert!(index.is_empty());
    /// ```
    pub fn remove(&mut self, key: &T) -> bool {
        invariant(self.try_remove(key))
    }

    fn try_remove(&mut self, key: &T) -> Result<bool> {
        let removal = self.heads.remove_from_heads(&mut self.arena, key)?;
        let mut removed = removal.removed;

        if let Some(HeadPosition { mut level, first }) = removal.resume {
            let mut curr = first;
            loop {
                let next = match resolve(&self.arena, curr)?.link_at(level)? {
                    Some(next) => Some((next, resolve(&self.arena, next)?.key().cmp(key))),
                    None => None,
                };

                match next {
                    Some((next, Ordering::Less)) => {
                        curr = next;
                        continue;
                    },
                    Some((next, Ordering::Equal)) => {
                        let successor = resolve_mut(&mut self.arena, next)?.set_link_at(level, None)?;
                        resolve_mut(&mut self.arena, curr)?.set_link_at(level, successor)?;
                        removed = Some(next);
                    },
                    _ => {},
                }

                if level == 0 {
                    break;
                }
                level -= 1;
            }
        }

        match removed {
            Some(handle) => {
                self.arena.free(handle).ok_or(Error::StaleHandle)?;
                self.len -= 1;
                trace!(lowest_head_level = ?removal.lowest_cleared, "removed entry");
                Ok(true)
            },
            None => Ok(false),
        }
    }
}

impl<T, G> Index<T, G> {
    /// Returns the number of keys in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of levels in the head chain. This never decreases.
    pub fn levels(&self) -> usize {
        self.heads.len()
    }

    /// Removes every key. The head chain keeps its current number of levels.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.heads.clear();
        self.len = 0;
    }

    /// Returns a reference to the entry with the smallest key, or `None` if the index is empty.
    ///
    /// # Examples
    /// ```
    /// use skip_index::skiplist::Index;
    ///
    /// let mut index = Index::new();
    /// index.insert(3);
    /// index.insert(1);
    ///
    /// let first = index.first_entry().unwrap();
    /// assert_eq!(first.key(), &1);
    /// assert_eq!(first.next().map(|entry| *entry.key()), Some(3));
    /// ```
    pub fn first_entry(&self) -> Option<EntryRef<T>> {
        self.heads.bottom().map(|handle| EntryRef {
            arena: &self.arena,
            entry: invariant(resolve(&self.arena, handle)),
        })
    }

    /// Returns an iterator over the keys of the index in ascending order.
    ///
    /// # Examples
    /// ```
    /// use skip_index::skiplist::Index;
    ///
    /// let mut index = Index::new();
    /// index.insert(2);
    /// index.insert(1);
    ///
    /// let mut iterator = index.iter();
    /// assert_eq!(iterator.next(), Some(&1));
    /// assert_eq!(iterator.next(), Some(&2));
    /// assert_eq!(iterator.next(), None);
    /// ```
    pub fn iter(&self) -> Iter<T> {
        Iter {
            arena: &self.arena,
            current: self.heads.bottom(),
            level: 0,
            remaining: self.len,
        }
    }

    /// Returns an iterator over the keys linked at `level` in ascending order. Returns an error if
    /// the head chain does not have that many levels.
    pub fn level_iter(&self, level: usize) -> Result<Iter<T>> {
        Ok(Iter {
            arena: &self.arena,
            current: self.heads.level_at(level)?,
            level,
            remaining: self.len,
        })
    }
}

impl<T> Default for Index<T>
where T: Ord
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for Index<T>
where T: Ord
{
    fn from_iter<I>(iter: I) -> Self
    where I: IntoIterator<Item = T> {
        let mut index = Index::new();
        index.extend(iter);
        index
    }
}

impl<T, G> Extend<T> for Index<T, G>
where
    T: Ord,
    G: LevelGenerator,
{
    fn extend<I>(&mut self, iter: I)
    where I: IntoIterator<Item = T> {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, T, G> IntoIterator for &'a Index<T, G>
where T: 'a
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, G> fmt::Debug for Index<T, G>
where T: fmt::Debug
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut levels = f.debug_map();
        for level in (0..self.levels()).rev() {
            let keys: Vec<&T> = invariant(self.level_iter(level)).collect();
            levels.entry(&level, &keys);
        }
        levels.finish()
    }
}

/// A read-only view of an entry in an `Index<T>`.
pub struct EntryRef<'a, T>
where T: 'a
{
    arena: &'a TypedArena<Entry<T>>,
    entry: &'a Entry<T>,
}

impl<'a, T> EntryRef<'a, T>
where T: 'a
{
    pub fn key(&self) -> &'a T {
        self.entry.key()
    }

    /// Returns the number of levels this entry is linked into.
    pub fn height(&self) -> usize {
        self.entry.height()
    }

    /// Returns the entry that follows this one at level 0.
    pub fn next(&self) -> Option<EntryRef<'a, T>> {
        invariant(self.next_at(0))
    }

    /// Returns the entry that follows this one at `level`. Returns an error if the entry is not
    /// linked at that level.
    pub fn next_at(&self, level: usize) -> Result<Option<EntryRef<'a, T>>> {
        let arena = self.arena;
        self.entry
            .link_at(level)?
            .map(|handle| resolve(arena, handle).map(|entry| EntryRef { arena, entry }))
            .transpose()
    }
}

impl<'a, T> Clone for EntryRef<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for EntryRef<'a, T> {}

impl<'a, T> fmt::Debug for EntryRef<'a, T>
where T: fmt::Debug
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("EntryRef")
            .field("key", self.key())
            .field("height", &self.height())
            .finish()
    }
}

/// An iterator for `Index<T>`.
///
/// This iterator follows the links of a single level and yields the keys in ascending order.
pub struct Iter<'a, T>
where T: 'a
{
    arena: &'a TypedArena<Entry<T>>,
    current: Option<Handle>,
    level: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T>
where T: 'a
{
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.arena.get(self.current?)?;
        self.current = entry.link_at(self.level).unwrap_or(None);
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry.key())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match (self.current, self.level) {
            (None, _) => (0, Some(0)),
            (Some(_), 0) => (self.remaining, Some(self.remaining)),
            (Some(_), _) => (1, Some(self.remaining)),
        }
    }
}
