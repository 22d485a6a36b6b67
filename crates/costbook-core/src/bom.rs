//! # BOM Cost Resolver
//!
//! Rolls material costs up through nested bills of materials.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Memoized Depth-First Roll-up                         │
//! │                                                                         │
//! │   Top (1 unit) ──4×──► Sub (1 unit) ──2×──► Flour @ 250¢               │
//! │                                                                         │
//! │   resolve(Top)                                                          │
//! │     visiting = {Top}                                                    │
//! │     line Sub ──► resolve(Sub)                                           │
//! │                    visiting = {Top, Sub}                                │
//! │                    line Flour ──► 2 × 250 = 500                         │
//! │                    visiting = {Top}        memo[Sub] = 500 / unit       │
//! │     4 × 500 = 2000                                                      │
//! │     visiting = {}                          memo[Top] = 2000 / unit      │
//! │                                                                         │
//! │   A BOM already in `memo` is returned as-is (shared subassemblies are   │
//! │   costed once). A BOM already in `visiting` is a cycle: the call        │
//! │   returns a zero-cost placeholder flagged `has_cycle` + `unresolved`,   │
//! │   and the flags propagate to every ancestor on the way back up.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Unit Cost
//! | Component                          | Unit cost            | Flags                  |
//! |------------------------------------|----------------------|------------------------|
//! | material, id found                 | material's cost      | –                      |
//! | material, id not found             | line's cached cost   | unresolved             |
//! | material, no id                    | line's cached cost   | –                      |
//! | subassembly, own id                | 0                    | has_cycle + unresolved |
//! | subassembly, id found              | child's unit cost ¹  | child's flags          |
//! | subassembly, id not found / no id  | line's cached cost   | unresolved             |
//!
//! ¹ 0 when the child's unit cost is undefined.
//!
//! ## Example
//! ```rust
//! use costbook_core::bom::compute_bom_cost_map;
//! use costbook_core::types::{index_materials, BomLine, BomRecord, Material};
//!
//! let flour = Material::new("Flour", 250).with_id("M1");
//! let bread = BomRecord::new("Bread", 2.0)
//!     .with_id("X")
//!     .with_line(BomLine::material("M1", 3.0));
//!
//! let costs = compute_bom_cost_map(&[bread], &index_materials([&flour]));
//! assert_eq!(costs["X"].total_cost_cents, 750);
//! assert_eq!(costs["X"].unit_cost_cents, Some(375));
//! ```

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult};
use crate::money::{non_negative_quantity, Money};
use crate::types::{BomCostMap, BomCostSummary, BomLine, BomRecord, Component, MaterialIndex};

// =============================================================================
// Entry Points
// =============================================================================

/// Computes a cost summary for every BOM in `boms`.
///
/// Total over its input: never fails and never loops, whatever the
/// references look like. Each call starts from empty state, so concurrent
/// calls are independent. When two records share an id the last one wins.
///
/// Subassemblies are resolved recursively, so stack depth grows with the
/// longest subassembly chain.
pub fn compute_bom_cost_map(boms: &[BomRecord], materials: &MaterialIndex) -> BomCostMap {
    let mut resolver = BomCostResolver::new(boms, materials);
    for bom in boms {
        resolver.resolve_id(&bom.id);
    }

    let costs = resolver.finish();
    debug!(
        boms = costs.len(),
        cycles = costs.values().filter(|s| s.has_cycle).count(),
        unresolved = costs.values().filter(|s| s.unresolved).count(),
        "BOM cost pass complete"
    );
    costs
}

/// Looks up one summary, failing if the id was not part of the pass.
pub fn summary_for<'m>(costs: &'m BomCostMap, bom_id: &str) -> CoreResult<&'m BomCostSummary> {
    costs
        .get(bom_id)
        .ok_or_else(|| CoreError::BomNotFound(bom_id.to_string()))
}

// =============================================================================
// Resolver
// =============================================================================

/// State for one resolution pass.
///
/// `memo` holds finished summaries, `visiting` the BOMs on the current
/// recursion path.
struct BomCostResolver<'a> {
    boms: HashMap<&'a str, &'a BomRecord>,
    materials: &'a MaterialIndex,
    memo: BomCostMap,
    visiting: HashSet<&'a str>,
    #[cfg(test)]
    computed: Vec<String>,
}

/// Accumulated result of costing one line.
struct LineCost {
    unit_cost: Money,
    has_cycle: bool,
    unresolved: bool,
}

impl LineCost {
    fn resolved(unit_cost: Money) -> Self {
        LineCost {
            unit_cost,
            has_cycle: false,
            unresolved: false,
        }
    }

    fn fallback(line: &BomLine) -> Self {
        LineCost {
            unit_cost: Money::from_cents(line.unit_cost_cents),
            has_cycle: false,
            unresolved: true,
        }
    }
}

impl<'a> BomCostResolver<'a> {
    fn new(boms: &'a [BomRecord], materials: &'a MaterialIndex) -> Self {
        BomCostResolver {
            boms: boms.iter().map(|b| (b.id.as_str(), b)).collect(),
            materials,
            memo: BomCostMap::with_capacity(boms.len()),
            visiting: HashSet::new(),
            #[cfg(test)]
            computed: Vec::new(),
        }
    }

    fn resolve_id(&mut self, bom_id: &str) -> Option<BomCostSummary> {
        let bom = self.boms.get(bom_id).copied()?;
        Some(self.resolve(bom))
    }

    fn resolve(&mut self, bom: &'a BomRecord) -> BomCostSummary {
        if let Some(done) = self.memo.get(bom.id.as_str()) {
            trace!(bom_id = %bom.id, "BOM cost memo hit");
            return *done;
        }

        if self.visiting.contains(bom.id.as_str()) {
            debug!(bom_id = %bom.id, "Cycle detected while resolving BOM");
            return BomCostSummary::CYCLE_SENTINEL;
        }

        self.visiting.insert(bom.id.as_str());
        #[cfg(test)]
        self.computed.push(bom.id.clone());

        let mut total = Money::zero();
        let mut has_cycle = false;
        let mut unresolved = false;

        for line in &bom.lines {
            let qty = non_negative_quantity(line.quantity);
            let cost = self.line_cost(bom, line);

            has_cycle |= cost.has_cycle;
            unresolved |= cost.unresolved;
            total += cost.unit_cost.scale(qty);
        }

        self.visiting.remove(bom.id.as_str());

        let total = total.non_negative();
        let summary = BomCostSummary {
            total_cost_cents: total.cents(),
            unit_cost_cents: total.per_unit(bom.output_qty).map(|m| m.cents()),
            has_cycle,
            unresolved,
        };

        self.memo.insert(bom.id.clone(), summary);
        summary
    }

    fn line_cost(&mut self, parent: &'a BomRecord, line: &'a BomLine) -> LineCost {
        match &line.component {
            Component::Material {
                material_id: Some(id),
            } => match self.materials.get(id) {
                Some(material) => LineCost::resolved(material.unit_cost()),
                None => {
                    debug!(bom_id = %parent.id, material_id = %id, "Material not found, using cached cost");
                    LineCost::fallback(line)
                }
            },

            Component::Material { material_id: None } => {
                LineCost::resolved(Money::from_cents(line.unit_cost_cents))
            }

            Component::Subassembly { bom_id: Some(id) } if *id == parent.id => {
                debug!(bom_id = %parent.id, "BOM lists itself as a component");
                LineCost {
                    unit_cost: Money::zero(),
                    has_cycle: true,
                    unresolved: true,
                }
            }

            Component::Subassembly { bom_id: Some(id) } => {
                match self.boms.get(id.as_str()).copied() {
                    Some(child) => {
                        let child_summary = self.resolve(child);
                        LineCost {
                            unit_cost: child_summary.unit_cost().unwrap_or_default(),
                            has_cycle: child_summary.has_cycle,
                            unresolved: child_summary.unresolved,
                        }
                    }
                    None => {
                        debug!(bom_id = %parent.id, component_bom_id = %id, "Subassembly not found, using cached cost");
                        LineCost::fallback(line)
                    }
                }
            }

            Component::Subassembly { bom_id: None } => {
                debug!(bom_id = %parent.id, line_id = %line.id, "Subassembly line has no BOM reference");
                LineCost::fallback(line)
            }
        }
    }

    fn finish(self) -> BomCostMap {
        self.memo
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
