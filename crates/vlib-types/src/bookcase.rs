use serde::{Deserialize, Serialize};

use crate::book::BookPosition;
use crate::error::TypeError;
use crate::identity::BookcaseId;

/// A bookcase: `shelves` rows of `slots_per_shelf` slots each.
///
/// `position` and `rotation_y` place the bookcase in world space. They are
/// carried through untouched for the renderer; placement logic never reads
/// them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookcase {
    pub id: BookcaseId,
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation_y: f64,
    pub shelves: u32,
    pub slots_per_shelf: u32,
}

impl Bookcase {
    /// Total number of slots.
    pub fn capacity(&self) -> u64 {
        u64::from(self.shelves) * u64::from(self.slots_per_shelf)
    }

    /// Whether `position` addresses a slot inside this bookcase.
    pub fn contains(&self, position: &BookPosition) -> bool {
        position.bookcase_id == self.id && self.in_range(position)
    }

    /// Whether the shelf and slot indices of `position` are in range,
    /// ignoring the bookcase id.
    pub fn in_range(&self, position: &BookPosition) -> bool {
        position.shelf_index < self.shelves && position.slot_index < self.slots_per_shelf
    }

    /// Every slot coordinate in scan order: shelf ascending, then slot
    /// ascending.
    pub fn slots(&self) -> impl Iterator<Item = BookPosition> + '_ {
        (0..self.shelves).flat_map(move |shelf| {
            (0..self.slots_per_shelf)
                .map(move |slot| BookPosition::new(self.id.clone(), shelf, slot))
        })
    }
}

/// Dimensions and world placement rules for newly created bookcases.
///
/// Bookcase `n` (0-based) is placed at `[n * spacing_x, base_y, base_z]` so
/// consecutive bookcases line up along the x axis without overlapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookcaseLayout {
    pub shelves: u32,
    pub slots_per_shelf: u32,
    pub spacing_x: f64,
    pub base_y: f64,
    pub base_z: f64,
}

impl Default for BookcaseLayout {
    fn default() -> Self {
        Self {
            shelves: 5,
            slots_per_shelf: 12,
            spacing_x: -4.0,
            base_y: 0.0,
            base_z: -2.5,
        }
    }
}

impl BookcaseLayout {
    pub fn validate(&self) -> Result<(), TypeError> {
        if self.shelves == 0 {
            return Err(TypeError::EmptyLayout("shelf"));
        }
        if self.slots_per_shelf == 0 {
            return Err(TypeError::EmptyLayout("slot per shelf"));
        }
        Ok(())
    }

    /// World placement for the bookcase at `index`.
    pub fn placement_for(&self, index: usize) -> [f64; 3] {
        [index as f64 * self.spacing_x, self.base_y, self.base_z]
    }

    /// Build the bookcase at `index` with the given id.
    pub fn build(&self, id: BookcaseId, index: usize) -> Bookcase {
        Bookcase {
            id,
            position: self.placement_for(index),
            rotation_y: 0.0,
            shelves: self.shelves,
            slots_per_shelf: self.slots_per_shelf,
        }
    }
}
