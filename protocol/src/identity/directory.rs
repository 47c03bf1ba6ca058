//! Name ↔ identity directory used for reporting.
//!
//! The ledger core never needs names. Reports and the console driver do,
//! and they ask through [`IdentityDirectory`] so any lookup source works.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::crypto::keys::Identity;

/// Resolves an identity to something a human can read.
pub trait IdentityDirectory {
    /// Never fails; unknown identities get a fallback rendering.
    fn display_name(&self, identity: &Identity) -> String;
}

impl<T: IdentityDirectory + ?Sized> IdentityDirectory for &T {
    fn display_name(&self, identity: &Identity) -> String {
        (**self).display_name(identity)
    }
}

/// Directory that knows no names: every identity renders as its short hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexDirectory;

impl IdentityDirectory for HexDirectory {
    fn display_name(&self, identity: &Identity) -> String {
        identity.short()
    }
}

/// Insertion-ordered map from display name to identity.
///
/// Names are unique; re-inserting a name rebinds it but keeps its original
/// position. Several names may point at the same identity, in which case
/// [`display_name`](IdentityDirectory::display_name) returns the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyMap {
    entries: IndexMap<String, Identity>,
}

impl PublicKeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `identity`, returning the previous binding.
    pub fn insert(&mut self, name: impl Into<String>, identity: Identity) -> Option<Identity> {
        self.entries.insert(name.into(), identity)
    }

    /// Copies every binding of `other` into `self`. Names already present
    /// are rebound to `other`'s identity.
    pub fn merge(&mut self, other: &PublicKeyMap) {
        for (name, identity) in &other.entries {
            self.entries.insert(name.clone(), *identity);
        }
    }

    /// Names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn identity_of(&self, name: &str) -> Option<Identity> {
        self.entries.get(name).copied()
    }

    /// First name bound to `identity`, if any.
    pub fn name_of(&self, identity: &Identity) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, id)| *id == identity)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Identity)> {
        self.entries.iter().map(|(name, id)| (name.as_str(), id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IdentityDirectory for PublicKeyMap {
    fn display_name(&self, identity: &Identity) -> String {
        self.name_of(identity)
            .map(str::to_owned)
            .unwrap_or_else(|| identity.short())
    }
}

impl<S: Into<String>> FromIterator<(S, Identity)> for PublicKeyMap {
    fn from_iter<I: IntoIterator<Item = (S, Identity)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, identity) in iter {
            map.insert(name, identity);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> Identity {
        Identity::from_bytes([byte; 32])
    }

    #[test]
    fn lookup_both_directions() {
        let mut map = PublicKeyMap::new();
        map.insert("alice", id(1));
        map.insert("bob", id(2));

        assert_eq!(map.identity_of("bob"), Some(id(2)));
        assert_eq!(map.identity_of("carol"), None);
        assert_eq!(map.display_name(&id(1)), "alice");
    }

    #[test]
    fn unknown_identity_falls_back_to_short_hex() {
        let map = PublicKeyMap::new();
        assert_eq!(map.display_name(&id(0xab)), "abababab");
        assert_eq!(HexDirectory.display_name(&id(0xab)), "abababab");
    }

    #[test]
    fn merge_keeps_order_and_rebinds() {
        let mut first: PublicKeyMap = [("A1", id(1)), ("A2", id(2))].into_iter().collect();
        let second: PublicKeyMap = [("B1", id(3)), ("A1", id(9))].into_iter().collect();

        first.merge(&second);
        let names: Vec<&str> = first.names().collect();
        assert_eq!(names, vec!["A1", "A2", "B1"]);
        assert_eq!(first.identity_of("A1"), Some(id(9)));
    }

    #[test]
    fn display_name_prefers_first_binding() {
        let map: PublicKeyMap = [("primary", id(1)), ("alias", id(1))].into_iter().collect();
        assert_eq!(map.display_name(&id(1)), "primary");
    }
}
