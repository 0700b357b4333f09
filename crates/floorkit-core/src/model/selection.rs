use serde::{Deserialize, Serialize};

use super::ItemId;

/// Ordered set of selected item ids.
///
/// Insertion order is kept for the final outline pass; duplicates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    items: Vec<ItemId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ItemId) -> bool {
        if self.items.contains(&id) {
            return false;
        }
        self.items.push(id);
        true
    }

    pub fn remove(&mut self, id: &ItemId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i != id);
        before != self.items.len()
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains(id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemId> {
        self.items.iter()
    }
}

impl FromIterator<ItemId> for Selection {
    fn from_iter<T: IntoIterator<Item = ItemId>>(iter: T) -> Self {
        let mut selection = Selection::new();
        for id in iter {
            selection.insert(id);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_insertion_order_without_duplicates() {
        let (a, b) = (ItemId::new(), ItemId::new());
        let mut selection: Selection = [b, a, b].into_iter().collect();
        assert_eq!(selection.iter().copied().collect::<Vec<_>>(), vec![b, a]);
        assert!(selection.remove(&b));
        assert!(!selection.remove(&b));
        assert_eq!(selection.len(), 1);
    }
}
