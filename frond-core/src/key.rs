use core::fmt;

use smol_str::SmolStr;

/// A key into one of the builtin mapping node types.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    /// An integer key.
    Int(i64),
    /// A string key.
    Str(SmolStr),
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Int(key) => write!(f, "{key}"),
            MapKey::Str(key) => write!(f, "{key:?}"),
        }
    }
}

impl fmt::Debug for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<i64> for MapKey {
    fn from(key: i64) -> Self {
        MapKey::Int(key)
    }
}

impl From<&str> for MapKey {
    fn from(key: &str) -> Self {
        MapKey::Str(SmolStr::new(key))
    }
}

impl From<String> for MapKey {
    fn from(key: String) -> Self {
        MapKey::Str(SmolStr::new(key))
    }
}

impl From<SmolStr> for MapKey {
    fn from(key: SmolStr) -> Self {
        MapKey::Str(key)
    }
}

/// One step of the address of a subtree within a tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// An index into a sequence node.
    Seq(usize),
    /// A key into a mapping node.
    Map(MapKey),
    /// A named field of a record or a registered struct.
    Attr(SmolStr),
    /// Position within a node whose type supplies no keys of its own.
    Flat(usize),
}

impl Key {
    /// A named-field key.
    pub fn attr(name: impl Into<SmolStr>) -> Self {
        Key::Attr(name.into())
    }

    /// A mapping key.
    pub fn map(key: impl Into<MapKey>) -> Self {
        Key::Map(key.into())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Seq(index) => write!(f, "[{index}]"),
            Key::Map(key) => write!(f, "[{key}]"),
            Key::Attr(name) => write!(f, ".{name}"),
            Key::Flat(index) => write!(f, "[<flat index {index}>]"),
        }
    }
}

/// The full address of a subtree: the keys traversed from the root.
///
/// Renders by concatenating its keys, so a path through a list, a mapping,
/// and a record field reads `[0]["lr"].step`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(pub Vec<Key>);

impl KeyPath {
    /// The empty path, addressing the root.
    pub fn new() -> Self {
        KeyPath(Vec::new())
    }

    /// Appends a key in place.
    pub fn push(&mut self, key: Key) {
        self.0.push(key);
    }

    /// Returns a copy of this path with `key` appended.
    pub fn with(&self, key: Key) -> Self {
        let mut path = self.clone();
        path.push(key);
        path
    }

    /// The number of keys in the path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the path addresses the root.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the keys from the root downwards.
    pub fn iter(&self) -> core::slice::Iter<'_, Key> {
        self.0.iter()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.0 {
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl FromIterator<Key> for KeyPath {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        KeyPath(iter.into_iter().collect())
    }
}

impl IntoIterator for KeyPath {
    type Item = Key;
    type IntoIter = std::vec::IntoIter<Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a Key;
    type IntoIter = core::slice::Iter<'a, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
