//! Arrangement engine - expands flower selections into placed instances and
//! computes their display order.
//!
//! ## Ordering model
//!
//! ```text
//! flowers:      [{peony x2}, {daisy x1}]
//! instances:    peony#0  peony#1  daisy#0
//! natural:         0        1        2
//! flower_order: [  2,       0,       1  ]   (display position per natural index)
//! ```
//!
//! An empty or short `flower_order` falls back to the natural index for every
//! instance it does not cover.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::{FlowerCatalog, FlowerCatalogEntry};
use crate::composition::FlowerSelection;

/// Maximum absolute rotation applied to a placed flower, in degrees.
pub const MAX_ROTATION_DEG: f32 = 5.0;

/// One concrete unit of a selected flower type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowerInstance<'a> {
    /// Catalog entry of this flower.
    pub entry: &'a FlowerCatalogEntry,
    /// Index of the owning selection in `Composition::flowers`.
    pub flower_index: usize,
    /// Index of this unit within its selection (`0..count`).
    pub instance_index: usize,
    /// Default position in the `[0, total)` instance range.
    pub natural_index: usize,
}

/// Total number of instances described by `flowers`.
#[must_use]
pub fn total_instances(flowers: &[FlowerSelection]) -> usize {
    flowers.iter().map(|f| f.count as usize).sum()
}

/// Expand selections into one instance per unit of count.
///
/// Selections whose id is missing from the catalog contribute no instances
/// but still occupy their slice of the natural index range, so every
/// emitted `natural_index` stays aligned with `flower_order`.
#[must_use]
pub fn expand<'a>(
    flowers: &[FlowerSelection],
    catalog: &'a FlowerCatalog,
) -> Vec<FlowerInstance<'a>> {
    let mut instances = Vec::with_capacity(total_instances(flowers));
    let mut offset = 0usize;

    for (flower_index, selection) in flowers.iter().enumerate() {
        let count = selection.count as usize;
        match catalog.get(selection.id) {
            Some(entry) => {
                instances.extend((0..count).map(|instance_index| FlowerInstance {
                    entry,
                    flower_index,
                    instance_index,
                    natural_index: offset + instance_index,
                }));
            }
            None => {
                tracing::debug!("Skipping flower {} absent from catalog", selection.id);
            }
        }
        offset += count;
    }

    instances
}

/// The sequential order `[0, 1, .., total)`, or empty when `total` is 0.
#[must_use]
pub fn default_order(total: usize) -> Vec<usize> {
    (0..total).collect()
}

/// Uniformly random permutation of `[0, total)` (Fisher-Yates).
pub fn reorder<R: Rng + ?Sized>(total: usize, rng: &mut R) -> Vec<usize> {
    let mut order = default_order(total);
    for i in (1..total).rev() {
        let j = rng.gen_range(0..=i);
        order.swap(i, j);
    }
    order
}

/// Display position of the instance at `natural_index`.
///
/// Uses `order[natural_index]` when present and falls back to the natural
/// index itself otherwise.
#[must_use]
pub fn display_position(order: &[usize], natural_index: usize) -> usize {
    order.get(natural_index).copied().unwrap_or(natural_index)
}

/// Check that `order` is a permutation of `[0, total)`.
#[must_use]
pub fn is_permutation(order: &[usize], total: usize) -> bool {
    if order.len() != total {
        return false;
    }
    let mut seen = vec![false; total];
    for &position in order {
        match seen.get_mut(position) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}

/// Rotation in degrees for one placed flower, in `[-5, 5)`.
///
/// Derived from the composition's arrangement seed so that every render of
/// the same composition, preview or export, tilts each flower identically.
#[must_use]
pub fn rotation_jitter(seed: u64, natural_index: usize) -> f32 {
    let mixed = seed ^ (natural_index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut rng = StdRng::seed_from_u64(mixed);
    rng.gen_range(-MAX_ROTATION_DEG..MAX_ROTATION_DEG)
}
