//! The analyzed design: all groups of the netlist, ready for placement.

use crate::block::Block;
use crate::collect::collect_groups;
use crate::error::PlacementError;
use crate::group::Group;
use crate::ident::BlockKey;
use crate::site::Region;
use sdplace_config::PlacerConfig;
use sdplace_netlist::Netlist;
use std::collections::BTreeMap;

/// Every analyzed group, keyed by group number.
#[derive(Clone, Debug, Default)]
pub struct Design {
    /// Analyzed groups.
    pub groups: BTreeMap<u32, Group>,
}

impl Design {
    /// Collects and analyzes all groups of `netlist`.
    pub fn analyze(netlist: &Netlist, config: &PlacerConfig) -> Result<Self, PlacementError> {
        let groups = collect_groups(netlist, config)?
            .into_values()
            .map(|raw| raw.analyze(netlist, config).map(|g| (g.id, g)))
            .collect::<Result<_, _>>()?;
        Ok(Self { groups })
    }

    /// Returns the block with `key`, if any.
    pub fn block(&self, key: BlockKey) -> Option<&Block> {
        self.groups
            .get(&key.group)
            .and_then(|g| g.block(key.subgroup, key.block_type))
    }

    /// Iterates over the groups of `region` in group order.
    pub fn groups_in(&self, region: Region) -> impl Iterator<Item = &Group> {
        self.groups.values().filter(move |g| g.region == region)
    }

    /// Total number of blocks.
    pub fn block_count(&self) -> usize {
        self.groups.values().map(|g| g.blocks.len()).sum()
    }

    /// Total number of grouped logic cells.
    pub fn cell_count(&self) -> usize {
        self.groups.values().map(Group::cell_count).sum()
    }
}
