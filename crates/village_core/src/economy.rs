//! Resources, the shared village inventory, and cost/yield types.

use serde::{Deserialize, Serialize};

/// Resource kinds tracked by the village inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    /// Lumber from trees and sawmills.
    Wood,
    /// Stone from rocks.
    Stone,
    /// Berries, the staple food.
    Berries,
    /// Foraged mushrooms.
    Mushrooms,
}

impl Resource {
    /// All resource kinds, in inventory order.
    pub const ALL: [Self; 4] = [Self::Wood, Self::Stone, Self::Berries, Self::Mushrooms];
}

/// A single-resource yield (building output, harvest grant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Yield {
    /// Resource produced.
    pub resource: Resource,
    /// Amount per completion.
    pub amount: u32,
}

impl Yield {
    /// Create a yield.
    #[must_use]
    pub const fn new(resource: Resource, amount: u32) -> Self {
        Self { resource, amount }
    }
}

/// A multi-resource price (building placement, upgrades, recipes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cost {
    /// Wood component.
    pub wood: u32,
    /// Stone component.
    pub stone: u32,
    /// Berries component.
    pub berries: u32,
    /// Mushrooms component.
    pub mushrooms: u32,
}

impl Cost {
    /// A free cost.
    pub const FREE: Self = Self {
        wood: 0,
        stone: 0,
        berries: 0,
        mushrooms: 0,
    };

    /// Cost in wood only.
    #[must_use]
    pub const fn wood(amount: u32) -> Self {
        Self {
            wood: amount,
            ..Self::FREE
        }
    }

    /// Cost in wood and stone.
    #[must_use]
    pub const fn wood_stone(wood: u32, stone: u32) -> Self {
        Self {
            wood,
            stone,
            ..Self::FREE
        }
    }

    /// Amount of one resource in this cost.
    #[must_use]
    pub const fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Stone => self.stone,
            Resource::Berries => self.berries,
            Resource::Mushrooms => self.mushrooms,
        }
    }

    /// Whether every component is zero.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.wood == 0 && self.stone == 0 && self.berries == 0 && self.mushrooms == 0
    }
}

/// The shared village inventory.
///
/// Counts are unsigned and every spend is pre-checked, so the inventory can
/// never go negative. Credits saturate at [`Inventory::CAP`] per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// Stored wood.
    pub wood: u32,
    /// Stored stone.
    pub stone: u32,
    /// Stored berries.
    pub berries: u32,
    /// Stored mushrooms.
    pub mushrooms: u32,
}

impl Inventory {
    /// Per-resource storage cap.
    pub const CAP: u32 = 999;

    /// Amount stored of one resource.
    #[must_use]
    pub const fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Stone => self.stone,
            Resource::Berries => self.berries,
            Resource::Mushrooms => self.mushrooms,
        }
    }

    fn slot_mut(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Stone => &mut self.stone,
            Resource::Berries => &mut self.berries,
            Resource::Mushrooms => &mut self.mushrooms,
        }
    }

    /// Add to a resource, saturating at the cap. Returns the amount actually
    /// stored.
    pub fn credit(&mut self, resource: Resource, amount: u32) -> u32 {
        let slot = self.slot_mut(resource);
        let stored = amount.min(Self::CAP - *slot);
        *slot += stored;
        stored
    }

    /// Remove up to `amount` of a resource. Returns the amount actually
    /// removed (less than `amount` when the stock runs out).
    pub fn take_up_to(&mut self, resource: Resource, amount: u32) -> u32 {
        let slot = self.slot_mut(resource);
        let taken = amount.min(*slot);
        *slot -= taken;
        taken
    }

    /// Whether the inventory covers a cost.
    #[must_use]
    pub fn can_afford(&self, cost: &Cost) -> bool {
        Resource::ALL.iter().all(|r| self.get(*r) >= cost.get(*r))
    }

    /// Deduct a cost. Returns `false` (and deducts nothing) if unaffordable.
    pub fn pay(&mut self, cost: &Cost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for r in Resource::ALL {
            *self.slot_mut(r) -= cost.get(r);
        }
        true
    }
}
