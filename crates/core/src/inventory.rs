use crate::ItemKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Slot<T> {
    Empty,
    Occupied(T),
}

impl<T> Slot<T> {
    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Slot::Empty => None,
            Slot::Occupied(value) => Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn take(&mut self) -> Option<T> {
        match std::mem::replace(self, Slot::Empty) {
            Slot::Empty => None,
            Slot::Occupied(value) => Some(value),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("slot {0} is out of range")]
    SlotOutOfRange(usize),
    #[error("slot {0} is empty")]
    SlotEmpty(usize),
    #[error("slot {0} is occupied")]
    SlotOccupied(usize),
    #[error("no free slot")]
    NoFreeSlot,
    #[error("item {id} is not a {expected:?} item")]
    WrongItemKind { id: String, expected: ItemKind },
}

/// Fixed-capacity, slot-indexed container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Slots<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Slots<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| Slot::Empty).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Slot::as_ref)
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.slots.iter().position(Slot::is_empty)
    }

    pub fn is_full(&self) -> bool {
        self.first_empty().is_none()
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_empty()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|value| (idx, value)))
    }

    pub fn insert(&mut self, value: T) -> Result<usize, InventoryError> {
        let idx = self.first_empty().ok_or(InventoryError::NoFreeSlot)?;
        self.slots[idx] = Slot::Occupied(value);
        Ok(idx)
    }

    pub fn put(&mut self, index: usize, value: T) -> Result<(), InventoryError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(InventoryError::SlotOutOfRange(index))?;
        if !slot.is_empty() {
            return Err(InventoryError::SlotOccupied(index));
        }
        *slot = Slot::Occupied(value);
        Ok(())
    }

    pub fn take(&mut self, index: usize) -> Result<T, InventoryError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(InventoryError::SlotOutOfRange(index))?;
        slot.take().ok_or(InventoryError::SlotEmpty(index))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolBelt {
    pub consumables: Slots<Item>,
    pub passive: Slot<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub bag: Slots<Item>,
    pub tool_belt: ToolBelt,
}

impl Inventory {
    pub fn new(bag_slots: usize, consumable_slots: usize) -> Self {
        Self {
            bag: Slots::with_capacity(bag_slots),
            tool_belt: ToolBelt {
                consumables: Slots::with_capacity(consumable_slots),
                passive: Slot::Empty,
            },
        }
    }

    pub fn add_to_bag(&mut self, item: Item) -> Result<usize, InventoryError> {
        self.bag.insert(item)
    }

    pub fn discard(&mut self, bag_slot: usize) -> Result<Item, InventoryError> {
        self.bag.take(bag_slot)
    }

    fn bag_item(&self, bag_slot: usize) -> Result<&Item, InventoryError> {
        if bag_slot >= self.bag.capacity() {
            return Err(InventoryError::SlotOutOfRange(bag_slot));
        }
        self.bag.get(bag_slot).ok_or(InventoryError::SlotEmpty(bag_slot))
    }

    /// Moves a consumable from the bag to the first empty belt slot.
    pub fn equip_consumable(&mut self, bag_slot: usize) -> Result<usize, InventoryError> {
        let item = self.bag_item(bag_slot)?;
        if item.kind != ItemKind::Consumable {
            return Err(InventoryError::WrongItemKind {
                id: item.id.clone(),
                expected: ItemKind::Consumable,
            });
        }
        let belt_slot = self
            .tool_belt
            .consumables
            .first_empty()
            .ok_or(InventoryError::NoFreeSlot)?;
        let item = self.bag.take(bag_slot)?;
        self.tool_belt.consumables.put(belt_slot, item)?;
        Ok(belt_slot)
    }

    pub fn unequip_consumable(&mut self, belt_slot: usize) -> Result<usize, InventoryError> {
        if self.tool_belt.consumables.get(belt_slot).is_none() {
            return Err(if belt_slot >= self.tool_belt.consumables.capacity() {
                InventoryError::SlotOutOfRange(belt_slot)
            } else {
                InventoryError::SlotEmpty(belt_slot)
            });
        }
        let bag_slot = self.bag.first_empty().ok_or(InventoryError::NoFreeSlot)?;
        let item = self.tool_belt.consumables.take(belt_slot)?;
        self.bag.put(bag_slot, item)?;
        Ok(bag_slot)
    }

    /// Equips a passive; a previously equipped passive returns to the vacated bag slot.
    pub fn equip_passive(&mut self, bag_slot: usize) -> Result<(), InventoryError> {
        let item = self.bag_item(bag_slot)?;
        if item.kind != ItemKind::Passive {
            return Err(InventoryError::WrongItemKind {
                id: item.id.clone(),
                expected: ItemKind::Passive,
            });
        }
        let item = self.bag.take(bag_slot)?;
        if let Some(previous) = self.tool_belt.passive.take() {
            self.bag.put(bag_slot, previous)?;
        }
        self.tool_belt.passive = Slot::Occupied(item);
        Ok(())
    }

    pub fn unequip_passive(&mut self) -> Result<usize, InventoryError> {
        if self.tool_belt.passive.is_empty() {
            return Err(InventoryError::SlotEmpty(0));
        }
        let bag_slot = self.bag.first_empty().ok_or(InventoryError::NoFreeSlot)?;
        if let Some(item) = self.tool_belt.passive.take() {
            self.bag.put(bag_slot, item)?;
        }
        Ok(bag_slot)
    }

    pub fn consumable(&self, belt_slot: usize) -> Option<&Item> {
        self.tool_belt.consumables.get(belt_slot)
    }

    pub fn take_consumable(&mut self, belt_slot: usize) -> Result<Item, InventoryError> {
        self.tool_belt.consumables.take(belt_slot)
    }

    pub fn passive(&self) -> Option<&Item> {
        self.tool_belt.passive.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn potion() -> Item {
        Item::new("healing_potion", ItemKind::Consumable)
    }

    #[test]
    fn equip_moves_item_out_of_bag() {
        let mut inventory = Inventory::new(2, 1);
        inventory.add_to_bag(potion()).expect("add");
        let belt = inventory.equip_consumable(0).expect("equip");
        assert_eq!(belt, 0);
        assert_eq!(inventory.bag.occupied(), 0);
        assert_eq!(inventory.consumable(0), Some(&potion()));
    }

    #[test]
    fn equip_with_full_belt_changes_nothing() {
        let mut inventory = Inventory::new(3, 1);
        inventory.add_to_bag(potion()).expect("add");
        inventory.add_to_bag(potion()).expect("add");
        inventory.equip_consumable(0).expect("equip");
        assert_eq!(inventory.equip_consumable(1), Err(InventoryError::NoFreeSlot));
        assert_eq!(inventory.bag.get(1), Some(&potion()));
        assert_eq!(inventory.tool_belt.consumables.occupied(), 1);
    }

    #[test]
    fn bag_rejects_items_past_capacity() {
        let mut inventory = Inventory::new(1, 1);
        inventory.add_to_bag(potion()).expect("add");
        assert_eq!(inventory.add_to_bag(potion()), Err(InventoryError::NoFreeSlot));
    }

    #[test]
    fn passive_swap_returns_old_passive_to_bag() {
        let mut inventory = Inventory::new(2, 1);
        inventory
            .add_to_bag(Item::new("iron_ring", ItemKind::Passive))
            .expect("add");
        inventory
            .add_to_bag(Item::new("thorn_mail", ItemKind::Passive))
            .expect("add");
        inventory.equip_passive(0).expect("equip ring");
        inventory.equip_passive(1).expect("equip mail");
        assert_eq!(inventory.passive().map(|item| item.id.as_str()), Some("thorn_mail"));
        assert_eq!(inventory.bag.get(1).map(|item| item.id.as_str()), Some("iron_ring"));
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let mut inventory = Inventory::new(1, 1);
        inventory.add_to_bag(potion()).expect("add");
        assert!(matches!(
            inventory.equip_passive(0),
            Err(InventoryError::WrongItemKind { .. })
        ));
        assert_eq!(inventory.equip_consumable(4), Err(InventoryError::SlotOutOfRange(4)));
    }
}
