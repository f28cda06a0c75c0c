use std::fmt;
use std::slice;

/// A single step taken by a search.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SearchStep<'a, T> {
    /// A level head was skipped because its first entry is missing or greater than the key.
    Head { level: usize, first: Option<&'a T> },
    /// An entry was visited at `level`, with `next` as its successor at that level.
    Visit {
        level: usize,
        entry: &'a T,
        next: Option<&'a T>,
    },
    /// The search dropped to `level` on the current entry, with `next` as the new candidate.
    Descend { level: usize, next: Option<&'a T> },
}

/// The sequence of steps taken by `Index::find_traced`.
///
/// Formatting a `SearchPath` with `{}` prints one line per visited entry or candidate, from the
/// topmost level down.
///
/// # Examples
/// ```
/// use skip_index::skiplist::Index;
///
/// let mut index = Index::new();
/// index.insert(1);
/// index.insert(2);
///
/// let (entry, path) = index.find_traced(&2);
/// assert_eq!(entry.map(|entry| *entry.key()), Some(2));
/// assert!(path.to_string().contains("visiting: 2"));
/// ```
#[derive(Clone, Debug)]
pub struct SearchPath<'a, T> {
    enabled: bool,
    steps: Vec<SearchStep<'a, T>>,
}

impl<'a, T> SearchPath<'a, T> {
    pub(crate) fn enabled() -> Self {
        SearchPath {
            enabled: true,
            steps: Vec::new(),
        }
    }

    pub(crate) fn disabled() -> Self {
        SearchPath {
            enabled: false,
            steps: Vec::new(),
        }
    }

    pub(crate) fn record<F>(&mut self, step: F)
    where F: FnOnce() -> SearchStep<'a, T> {
        if self.enabled {
            self.steps.push(step());
        }
    }

    pub fn steps(&self) -> &[SearchStep<'a, T>] {
        &self.steps
    }

    pub fn iter(&self) -> slice::Iter<SearchStep<'a, T>> {
        self.steps.iter()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

struct Candidate<'a, T>(Option<&'a T>);

impl<'a, T> fmt::Display for Candidate<'a, T>
where T: fmt::Display
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            Some(key) => write!(f, "{}", key),
            None => write!(f, "Null"),
        }
    }
}

impl<'a, T> fmt::Display for SearchPath<'a, T>
where T: fmt::Display
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for step in &self.steps {
            match *step {
                SearchStep::Head { level, first } => {
                    writeln!(f, "Level: {}, next: {}", level, Candidate(first))?;
                },
                SearchStep::Visit { level, entry, next } => {
                    writeln!(f, "Level: {}, visiting: {}", level, entry)?;
                    writeln!(f, "Level: {}, next: {}", level, Candidate(next))?;
                },
                SearchStep::Descend { level, next } => {
                    writeln!(f, "Level: {}, next: {}", level, Candidate(next))?;
                },
            }
        }
        Ok(())
    }
}

impl<'a, 'b, T> IntoIterator for &'b SearchPath<'a, T> {
    type Item = &'b SearchStep<'a, T>;
    type IntoIter = slice::Iter<'b, SearchStep<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
