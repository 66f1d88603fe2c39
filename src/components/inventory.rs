//! Item storage and collectible pickups.

use bevy_ecs::prelude::Component;
use smallvec::SmallVec;

/// A quantity of one item kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStack {
    pub item_id: String,
    pub quantity: u32,
}

/// Stack-based inventory. `capacity` bounds the number of distinct stacks
/// and `max_stack` the quantity held in each.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct Inventory {
    pub capacity: usize,
    pub max_stack: u32,
    pub items: SmallVec<[ItemStack; 8]>,
}

impl Inventory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            max_stack: u32::MAX,
            items: SmallVec::new(),
        }
    }

    pub fn with_max_stack(mut self, max_stack: u32) -> Self {
        self.max_stack = max_stack;
        self
    }

    /// Add up to `quantity` of `item_id`. Returns how many were accepted:
    /// less than asked when the stack fills up, 0 when the item is new and
    /// every slot is taken.
    pub fn add_item(&mut self, item_id: &str, quantity: u32) -> u32 {
        if quantity == 0 {
            return 0;
        }
        if let Some(stack) = self.items.iter_mut().find(|s| s.item_id == item_id) {
            let added = quantity.min(self.max_stack.saturating_sub(stack.quantity));
            stack.quantity += added;
            return added;
        }
        if self.items.len() >= self.capacity || self.max_stack == 0 {
            return 0;
        }
        let added = quantity.min(self.max_stack);
        self.items.push(ItemStack {
            item_id: item_id.to_string(),
            quantity: added,
        });
        added
    }

    /// Remove up to `quantity` of `item_id`. Returns how many were removed.
    /// Empty stacks are dropped.
    pub fn remove_item(&mut self, item_id: &str, quantity: u32) -> u32 {
        let Some(index) = self.items.iter().position(|s| s.item_id == item_id) else {
            return 0;
        };
        let stack = &mut self.items[index];
        let removed = quantity.min(stack.quantity);
        stack.quantity -= removed;
        if stack.quantity == 0 {
            self.items.remove(index);
        }
        removed
    }

    pub fn count(&self, item_id: &str) -> u32 {
        self.items
            .iter()
            .find(|s| s.item_id == item_id)
            .map(|s| s.quantity)
            .unwrap_or(0)
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

/// Collectible lying in the world. Collected by [`Inventory`] holders on contact.
#[derive(Component, Clone, Debug, PartialEq, Eq)]
pub struct ItemPickup {
    pub item_id: String,
    pub quantity: u32,
}

impl ItemPickup {
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_stacks() {
        let mut inv = Inventory::new(2);
        assert_eq!(inv.add_item("coin", 3), 3);
        assert_eq!(inv.add_item("coin", 2), 2);
        assert_eq!(inv.count("coin"), 5);
        assert_eq!(inv.items.len(), 1);
    }

    #[test]
    fn test_add_item_respects_capacity() {
        let mut inv = Inventory::new(1);
        assert_eq!(inv.add_item("coin", 1), 1);
        assert_eq!(inv.add_item("key", 1), 0);
        assert!(inv.is_full());
        // Existing stacks still accept more.
        assert_eq!(inv.add_item("coin", 4), 4);
    }

    #[test]
    fn test_full_stack_accepts_only_the_room_left() {
        let mut inv = Inventory::new(2).with_max_stack(5);
        assert_eq!(inv.add_item("arrow", 3), 3);
        assert_eq!(inv.add_item("arrow", 4), 2);
        assert_eq!(inv.count("arrow"), 5);
        assert_eq!(inv.add_item("arrow", 1), 0);
        // a new stack is capped too
        assert_eq!(inv.add_item("bolt", 9), 5);
        assert_eq!(inv.count("bolt"), 5);
    }

    #[test]
    fn test_unbounded_stack_saturates() {
        let mut inv = Inventory::new(1);
        assert_eq!(inv.add_item("coin", u32::MAX - 1), u32::MAX - 1);
        assert_eq!(inv.add_item("coin", 5), 1);
        assert_eq!(inv.count("coin"), u32::MAX);
    }

    #[test]
    fn test_remove_item_drops_empty_stack() {
        let mut inv = Inventory::new(4);
        inv.add_item("potion", 2);
        assert_eq!(inv.remove_item("potion", 5), 2);
        assert_eq!(inv.count("potion"), 0);
        assert!(inv.items.is_empty());
        assert_eq!(inv.remove_item("potion", 1), 0);
    }
}
