//! String interner for member, parameter, and interface names.
//!
//! Names are interned once and passed around as `u32` handles (Atoms), so
//! property lookup and member comparison during structural checks are integer
//! comparisons instead of string comparisons.

use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// An interned name. Resolve it with [`ShardedInterner::resolve`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string. Interning `""` always yields this atom.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Atom::NONE
    }
}

/// Low bits of an atom select the shard; the rest index into it.
const SHARD_BITS: u32 = 4;
const SHARDS: usize = 1 << SHARD_BITS;

/// Names looked up on every run: `typeof` tags and the apparent members of
/// primitives and arrays.
const PRELOADED: &[&str] = &[
    "string",
    "number",
    "boolean",
    "undefined",
    "object",
    "function",
    "length",
    "toString",
    "valueOf",
    "toUpperCase",
    "toLowerCase",
    "charAt",
    "toFixed",
    "push",
];

#[derive(Default)]
struct Shard {
    by_name: FxHashMap<Arc<str>, Atom>,
    names: Vec<Arc<str>>,
}

impl Shard {
    fn insert(&mut self, shard: usize, name: &str) -> Atom {
        if let Some(&atom) = self.by_name.get(name) {
            return atom;
        }
        let slot = self.names.len() as u32;
        if slot > (u32::MAX >> SHARD_BITS) {
            return Atom::NONE;
        }
        let atom = Atom((slot << SHARD_BITS) | shard as u32);
        let name: Arc<str> = Arc::from(name);
        self.names.push(name.clone());
        self.by_name.insert(name, atom);
        atom
    }
}

/// Thread-safe string interner.
///
/// Strings hash to one of a fixed set of independently locked shards, so
/// concurrent interning of different names rarely contends.
pub struct ShardedInterner {
    shards: [RwLock<Shard>; SHARDS],
}

impl ShardedInterner {
    /// A new interner with the empty string at [`Atom::NONE`] and the common
    /// names already interned.
    pub fn new() -> Self {
        let mut first = Shard::default();
        let empty: Arc<str> = Arc::from("");
        first.names.push(empty.clone());
        first.by_name.insert(empty, Atom::NONE);

        let mut first = Some(first);
        let interner = ShardedInterner {
            shards: std::array::from_fn(|_| RwLock::new(first.take().unwrap_or_default())),
        };
        for name in PRELOADED {
            interner.intern(name);
        }
        interner
    }

    pub fn intern(&self, s: &str) -> Atom {
        if s.is_empty() {
            return Atom::NONE;
        }
        let shard = Self::shard_of(s);
        if let Ok(state) = self.shards[shard].read()
            && let Some(&atom) = state.by_name.get(s)
        {
            return atom;
        }
        match self.shards[shard].write() {
            Ok(mut state) => state.insert(shard, s),
            Err(_) => Atom::NONE,
        }
    }

    /// The string behind `atom`; unknown atoms resolve to `""`.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let shard = (atom.0 & (SHARDS as u32 - 1)) as usize;
        let slot = (atom.0 >> SHARD_BITS) as usize;
        self.shards[shard].read().ok()?.names.get(slot).cloned()
    }

    /// Number of interned strings, the empty string included.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .filter_map(|shard| shard.read().ok().map(|state| state.names.len()))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    fn shard_of(s: &str) -> usize {
        let mut hasher = FxHasher::default();
        s.hash(&mut hasher);
        hasher.finish() as usize & (SHARDS - 1)
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}
