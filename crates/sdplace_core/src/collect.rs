//! Scanning the netlist for tagged cells and bucketing them into groups.

use crate::error::PlacementError;
use crate::group::RawGroup;
use crate::ident::{FullCellId, UNGROUPED};
use sdplace_config::PlacerConfig;
use sdplace_netlist::{parse_bits, Netlist, NetlistQuery};
use std::collections::BTreeMap;

/// Buckets every cell carrying the group attribute into its group and block.
///
/// Cells tagged with the ungrouped sentinel are skipped.
pub fn collect_groups(
    netlist: &Netlist,
    config: &PlacerConfig,
) -> Result<BTreeMap<u32, RawGroup>, PlacementError> {
    let attr = config.attributes.group.as_str();
    let mut groups: BTreeMap<u32, RawGroup> = BTreeMap::new();

    for cell in netlist.cell_ids() {
        let Some(value) = netlist.attr(cell, attr) else {
            continue;
        };
        let malformed = || PlacementError::MalformedAttribute {
            cell: netlist.cell(cell).name.clone(),
            attribute: attr.to_string(),
            value: value.to_string(),
        };

        let raw = parse_bits(value).map_err(|_| malformed())?;
        let id = match FullCellId::decode(raw) {
            Some(id) => id,
            None if raw == UNGROUPED => continue,
            None => return Err(malformed()),
        };

        let block = groups
            .entry(id.group)
            .or_insert_with(|| RawGroup::new(id.group))
            .block_mut(id.subgroup, id.block_type);
        block
            .insert(id.slot, cell)
            .map_err(|existing| PlacementError::DuplicateSlot {
                block: id.block(),
                slot: id.slot,
                existing: netlist.cell(existing).name.clone(),
                cell: netlist.cell(cell).name.clone(),
            })?;
    }

    Ok(groups)
}
