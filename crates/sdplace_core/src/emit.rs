//! Writing placements back onto the netlist.

use crate::design::Design;
use crate::placer::RegionPlan;
use sdplace_config::PlacerConfig;
use sdplace_diagnostics::{Category, Diagnostic, DiagnosticCode};
use sdplace_netlist::{CellId, Netlist};

const BLANK_PLACEMENT: DiagnosticCode = DiagnosticCode::new(Category::Netlist, 102);

/// Applies `plans` to `netlist`.
///
/// Blank placement attributes are dropped and the packer's grouping
/// attributes are cleared from every cell, then each placed cell receives
/// its `X<x>/Y<y>/lc<z>` BEL. Returns the number of BELs written.
pub fn emit(
    netlist: &mut Netlist,
    design: &Design,
    plans: &[RegionPlan],
    config: &PlacerConfig,
    diags: &mut Vec<Diagnostic>,
) -> usize {
    let names = &config.attributes;
    let ids: Vec<CellId> = netlist.cell_ids().collect();

    for &cell in &ids {
        let blank = netlist
            .cell(cell)
            .attrs
            .get(&names.placement)
            .is_some_and(|v| v.trim().is_empty());
        if blank {
            netlist.unset_attr(cell, &names.placement);
            diags.push(
                Diagnostic::warning(
                    BLANK_PLACEMENT,
                    format!("dropping blank {} attribute", names.placement),
                )
                .with_subject(netlist.cell(cell).name.clone()),
            );
        }
        for attr in [&names.group, &names.sub_offset, &names.slot] {
            netlist.unset_attr(cell, attr);
        }
    }

    let mut written = 0;
    for plan in plans {
        for (&key, placement) in &plan.placements {
            let Some(block) = design.block(key) else {
                continue;
            };
            for (slot, &cell) in block.cells.iter().enumerate() {
                netlist.set_attr(cell, &names.placement, placement.bel(slot).to_string());
                written += 1;
            }
        }
    }
    written
}
