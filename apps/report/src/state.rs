//! # Costing State
//!
//! Holds the materials and BOMs being edited and the cost map derived
//! from them.
//!
//! ## Recompute on Change
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Costing State Operations                             │
//! │                                                                         │
//! │  Edit                     Method                  Effect                │
//! │  ────                     ──────                  ──────                │
//! │                                                                         │
//! │  Import price list ──────► replace_materials() ──► revision += 1        │
//! │                                                                         │
//! │  Change one price ───────► upsert_material() ────► revision += 1        │
//! │                                                                         │
//! │  Save a BOM ─────────────► upsert_bom() ─────────► revision += 1        │
//! │                                                                         │
//! │  Delete a BOM ───────────► remove_bom() ─────────► revision += 1        │
//! │                                                                         │
//! │  Show costs ─────────────► bom_costs() ──────────► recompute if stale,  │
//! │                                                    else shared Arc      │
//! │                                                                         │
//! │  NOTE: A stale read recomputes the whole map, since any edit can        │
//! │        change every BOM above it.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use costbook_core::{
    compute_bom_cost_map, summary_for, BomCostMap, BomCostSummary, BomRecord, CoreResult,
    Material, MaterialIndex,
};
use tracing::debug;

/// Materials, BOMs and the last computed cost map.
#[derive(Debug, Default)]
struct Costing {
    materials: MaterialIndex,
    boms: Vec<BomRecord>,
    revision: u64,
    cached: Option<(u64, Arc<BomCostMap>)>,
}

impl Costing {
    fn touch(&mut self) {
        self.revision += 1;
    }
}

/// Shared costing state.
///
/// Cloning shares the same underlying store.
#[derive(Debug, Clone, Default)]
pub struct CostingState {
    inner: Arc<Mutex<Costing>>,
}

impl CostingState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state seeded with materials and BOMs.
    pub fn with_records(materials: Vec<Material>, boms: Vec<BomRecord>) -> Self {
        let state = Self::new();
        state.with_costing_mut(|costing| {
            costing.materials = materials.into_iter().map(|m| (m.id.clone(), m)).collect();
            costing.boms = boms;
        });
        state
    }

    /// A poisoned lock still holds consistent data: every mutation
    /// completes before the revision is bumped.
    fn lock(&self) -> MutexGuard<'_, Costing> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_costing_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Costing) -> R,
    {
        let mut costing = self.lock();
        let result = f(&mut costing);
        costing.touch();
        result
    }

    /// Current revision. Bumped by every mutation.
    pub fn revision(&self) -> u64 {
        self.lock().revision
    }

    /// Replaces every material (e.g. after re-costing from purchases).
    pub fn replace_materials(&self, materials: Vec<Material>) {
        self.with_costing_mut(|costing| {
            costing.materials = materials.into_iter().map(|m| (m.id.clone(), m)).collect();
        });
    }

    /// Inserts or replaces one material.
    pub fn upsert_material(&self, material: Material) {
        debug!(material_id = %material.id, cents = material.unit_cost_cents, "Material updated");
        self.with_costing_mut(|costing| {
            costing.materials.insert(material.id.clone(), material);
        });
    }

    /// Inserts or replaces a BOM by id.
    pub fn upsert_bom(&self, bom: BomRecord) {
        debug!(bom_id = %bom.id, lines = bom.lines.len(), "BOM saved");
        self.with_costing_mut(|costing| {
            match costing.boms.iter_mut().find(|existing| existing.id == bom.id) {
                Some(existing) => *existing = bom,
                None => costing.boms.push(bom),
            }
        });
    }

    /// Removes a BOM. Parents referencing it become unresolved on the next read.
    ///
    /// Returns whether anything was removed.
    pub fn remove_bom(&self, bom_id: &str) -> bool {
        self.with_costing_mut(|costing| {
            let before = costing.boms.len();
            costing.boms.retain(|bom| bom.id != bom_id);
            costing.boms.len() != before
        })
    }

    /// Number of BOMs held.
    pub fn bom_count(&self) -> usize {
        self.lock().boms.len()
    }

    /// Cost summaries for every BOM, recomputed only if something changed.
    pub fn bom_costs(&self) -> Arc<BomCostMap> {
        let mut costing = self.lock();
        let revision = costing.revision;

        if let Some((cached_at, costs)) = &costing.cached {
            if *cached_at == revision {
                return Arc::clone(costs);
            }
        }

        debug!(revision, "Recomputing BOM cost map");
        let costs = Arc::new(compute_bom_cost_map(&costing.boms, &costing.materials));
        costing.cached = Some((revision, Arc::clone(&costs)));
        costs
    }

    /// Summary for one BOM.
    pub fn summary(&self, bom_id: &str) -> CoreResult<BomCostSummary> {
        let costs = self.bom_costs();
        summary_for(&costs, bom_id).copied()
    }

    /// Runs `f` against the current material index.
    pub fn with_materials<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&MaterialIndex) -> R,
    {
        f(&self.lock().materials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use costbook_core::{BomLine, CoreError};

    fn flour(cents: i64) -> Material {
        Material::new("Flour", cents).with_id("M1")
    }

    fn dough() -> BomRecord {
        BomRecord::new("Dough", 1.0)
            .with_id("Sub")
            .with_line(BomLine::material("M1", 2.0))
    }

    fn loaf() -> BomRecord {
        BomRecord::new("Loaf", 1.0)
            .with_id("Top")
            .with_line(BomLine::subassembly("Sub", 4.0))
    }

    fn bakery() -> CostingState {
        CostingState::with_records(vec![flour(250)], vec![dough(), loaf()])
    }

    #[test]
    fn test_costs_are_cached_between_reads() {
        let state = bakery();
        let first = state.bom_costs();
        let second = state.bom_costs();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first["Top"].total_cost_cents, 2000);
    }

    #[test]
    fn test_material_change_propagates_to_parents() {
        let state = bakery();
        let before = state.bom_costs();
        let revision = state.revision();

        state.upsert_material(flour(300));

        assert_eq!(state.revision(), revision + 1);
        let after = state.bom_costs();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after["Sub"].total_cost_cents, 600);
        assert_eq!(after["Top"].total_cost_cents, 2400);
    }

    #[test]
    fn test_upsert_bom_replaces_by_id() {
        let state = bakery();
        state.upsert_bom(
            BomRecord::new("Dough", 2.0)
                .with_id("Sub")
                .with_line(BomLine::material("M1", 2.0)),
        );

        assert_eq!(state.bom_count(), 2);
        let sub = state.summary("Sub").unwrap();
        assert_eq!(sub.total_cost_cents, 500);
        assert_eq!(sub.unit_cost_cents, Some(250));
        assert_eq!(state.summary("Top").unwrap().total_cost_cents, 1000);
    }

    #[test]
    fn test_removed_child_marks_parent_unresolved() {
        let state = bakery();
        assert!(state.remove_bom("Sub"));
        assert!(!state.remove_bom("Sub"));

        let top = state.summary("Top").unwrap();
        assert!(top.unresolved);
        assert_eq!(top.total_cost_cents, 0);
        assert!(matches!(
            state.summary("Sub"),
            Err(CoreError::BomNotFound(_))
        ));
    }

    #[test]
    fn test_replace_materials() {
        let state = bakery();
        state.replace_materials(vec![]);

        let sub = state.summary("Sub").unwrap();
        assert_eq!(sub.total_cost_cents, 0);
        assert!(sub.unresolved);
        assert!(state.with_materials(|materials| materials.is_empty()));
    }

    #[test]
    fn test_clones_share_state() {
        let state = bakery();
        let other = state.clone();
        other.remove_bom("Top");

        assert_eq!(state.bom_count(), 1);
    }
}
