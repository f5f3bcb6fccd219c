//! Message identifier to frame length mapping.
//!
//! The frame length is never sent on the wire; both ends share a catalog.
//! [`IdentityCatalog`] is the placeholder policy where the identifier is the
//! length. Deployments supply a [`SizeTable`] or their own implementation.

use std::collections::BTreeMap;

/// Maps a message identifier to the total frame length in bytes.
pub trait MessageCatalog {
    /// Frame length for `id`, or `None` if the identifier is unknown.
    fn size_of(&self, id: u8) -> Option<usize>;
}

impl<C: MessageCatalog + ?Sized> MessageCatalog for &C {
    fn size_of(&self, id: u8) -> Option<usize> {
        (**self).size_of(id)
    }
}

impl<C: MessageCatalog + ?Sized> MessageCatalog for Box<C> {
    fn size_of(&self, id: u8) -> Option<usize> {
        (**self).size_of(id)
    }
}

/// Frame length equals the identifier's numeric value.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCatalog;

impl MessageCatalog for IdentityCatalog {
    fn size_of(&self, id: u8) -> Option<usize> {
        Some(usize::from(id))
    }
}

/// Explicit identifier to length table. Unlisted identifiers are unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeTable {
    sizes: BTreeMap<u8, usize>,
}

impl SizeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the length for an identifier.
    pub fn insert(&mut self, id: u8, size: usize) -> Option<usize> {
        self.sizes.insert(id, size)
    }

    /// Number of registered identifiers.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Returns true if no identifiers are registered.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Iterate over `(id, size)` entries in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.sizes.iter().map(|(id, size)| (*id, *size))
    }
}

impl MessageCatalog for SizeTable {
    fn size_of(&self, id: u8) -> Option<usize> {
        self.sizes.get(&id).copied()
    }
}

impl FromIterator<(u8, usize)> for SizeTable {
    fn from_iter<I: IntoIterator<Item = (u8, usize)>>(iter: I) -> Self {
        Self {
            sizes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_maps_id_to_size() {
        assert_eq!(IdentityCatalog.size_of(0), Some(0));
        assert_eq!(IdentityCatalog.size_of(15), Some(15));
        assert_eq!(IdentityCatalog.size_of(255), Some(255));
    }

    #[test]
    fn table_lookup_and_unknown() {
        let table: SizeTable = [(0x01, 10), (0x20, 25)].into_iter().collect();
        assert_eq!(table.size_of(0x01), Some(10));
        assert_eq!(table.size_of(0x20), Some(25));
        assert_eq!(table.size_of(0x02), None);
        assert_eq!(table.len(), 2);
        assert_eq!(table.iter().collect::<Vec<_>>(), vec![(0x01, 10), (0x20, 25)]);
    }

    #[test]
    fn insert_replaces() {
        let mut table = SizeTable::new();
        assert!(table.is_empty());
        assert_eq!(table.insert(7, 10), None);
        assert_eq!(table.insert(7, 15), Some(10));
        assert_eq!(table.size_of(7), Some(15));
    }

    #[test]
    fn boxed_catalog_delegates() {
        let catalog: Box<dyn MessageCatalog> = Box::new(IdentityCatalog);
        assert_eq!(catalog.size_of(20), Some(20));
    }
}
