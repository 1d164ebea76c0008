//! Ordered, name-addressable registry used for every processor chain.
//!
//! Iteration order is evaluation priority. Extensions splice new entries in
//! relative to an existing name (`"<name"` before, `">name"` after) without
//! the core knowing about them ahead of time.

use std::fmt;
use std::str::FromStr;

/// Errors raised while mutating a registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Not a valid location: \"{0}\". Location must be \"_begin\", \"_end\" or start with \"<\" or \">\"")]
    InvalidLocation(String),

    #[error("Unknown registry key: \"{0}\"")]
    UnknownKey(String),

    #[error("Duplicate registry key: \"{0}\"")]
    DuplicateKey(String),
}

/// Where a new entry goes relative to the existing ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Begin,
    End,
    Before(String),
    After(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Begin => write!(f, "_begin"),
            Location::End => write!(f, "_end"),
            Location::Before(name) => write!(f, "<{name}"),
            Location::After(name) => write!(f, ">{name}"),
        }
    }
}

impl FromStr for Location {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "_begin" => Ok(Location::Begin),
            "_end" => Ok(Location::End),
            _ => {
                if let Some(name) = s.strip_prefix('<') {
                    Ok(Location::Before(name.to_string()))
                } else if let Some(name) = s.strip_prefix('>') {
                    Ok(Location::After(name.to_string()))
                } else {
                    Err(RegistryError::InvalidLocation(s.to_string()))
                }
            }
        }
    }
}

/// An ordered association list from name to handler.
pub struct Registry<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `item` under `name`. An existing entry with the same name is
    /// replaced in place and keeps its priority.
    pub fn append(&mut self, name: impl Into<String>, item: T) {
        let name = name.into();
        match self.index_of(&name) {
            Some(i) => self.entries[i].1 = item,
            None => self.entries.push((name, item)),
        }
    }

    /// Inserts `item` at a location given in its textual form (`"_begin"`,
    /// `"_end"`, `"<name"`, `">name"`).
    pub fn add(&mut self, name: impl Into<String>, item: T, location: &str) -> Result<(), RegistryError> {
        let location: Location = location.parse()?;
        self.insert_at(name, item, &location)
    }

    pub fn insert_at(&mut self, name: impl Into<String>, item: T, location: &Location) -> Result<(), RegistryError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(RegistryError::DuplicateKey(name));
        }
        let index = match location {
            Location::Begin => 0,
            Location::End => self.entries.len(),
            Location::Before(anchor) => self
                .index_of(anchor)
                .ok_or_else(|| RegistryError::UnknownKey(anchor.clone()))?,
            Location::After(anchor) => {
                self.index_of(anchor)
                    .ok_or_else(|| RegistryError::UnknownKey(anchor.clone()))?
                    + 1
            }
        };
        log::debug!("[rumdown-registry] Inserting '{name}' at {location} (index {index})");
        self.entries.insert(index, (name, item));
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        let index = self.index_of(name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, item)| item)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// The entry at priority position `index`.
    pub fn at(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(_, item)| item)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().map(|(_, item)| item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
