//! SerDes groups: aggregation of blocks around one IO site.

use crate::block::{Block, RawBlock};
use crate::error::PlacementError;
use crate::ident::BlockKey;
use crate::site::Region;
use sdplace_common::Bel;
use sdplace_config::PlacerConfig;
use sdplace_netlist::NetlistQuery;
use std::collections::BTreeMap;

/// A group as collected from the netlist, blocks keyed by `(subgroup, type)`.
#[derive(Clone, Debug)]
pub struct RawGroup {
    /// Group number.
    pub id: u32,
    /// Blocks of the group.
    pub blocks: BTreeMap<(u8, u8), RawBlock>,
}

impl RawGroup {
    /// Creates an empty group.
    pub fn new(id: u32) -> Self {
        Self {
            id,
            blocks: BTreeMap::new(),
        }
    }

    /// Returns the block for `(subgroup, block_type)`, creating it if absent.
    pub fn block_mut(&mut self, subgroup: u8, block_type: u8) -> &mut RawBlock {
        let id = self.id;
        self.blocks
            .entry((subgroup, block_type))
            .or_insert_with(|| RawBlock::new(BlockKey::new(id, subgroup, block_type)))
    }

    /// Analyzes every block and resolves the group's IO site and region.
    pub fn analyze(
        &self,
        netlist: &impl NetlistQuery,
        config: &PlacerConfig,
    ) -> Result<Group, PlacementError> {
        let mut io: Option<Bel> = None;
        let mut blocks = BTreeMap::new();

        for (&key, raw) in &self.blocks {
            let block = raw.analyze(netlist, config)?;
            if let Some(found) = block.io {
                match io {
                    Some(first) if first != found => {
                        return Err(PlacementError::InconsistentGroupIo {
                            group: self.id,
                            first,
                            second: found,
                        })
                    }
                    _ => io = Some(found),
                }
            }
            blocks.insert(key, block);
        }

        let io = io.ok_or(PlacementError::MissingGroupIo { group: self.id })?;
        let region = if io.y == config.grid.bottom_io_row {
            Region::Bottom
        } else {
            Region::Top
        };

        Ok(Group {
            id: self.id,
            io,
            region,
            blocks,
        })
    }
}

/// An analyzed group.
#[derive(Clone, Debug)]
pub struct Group {
    /// Group number.
    pub id: u32,
    /// The IO site all blocks of the group are wired to.
    pub io: Bel,
    /// Region the group is placed in.
    pub region: Region,
    /// Analyzed blocks keyed by `(subgroup, type)`.
    pub blocks: BTreeMap<(u8, u8), Block>,
}

impl Group {
    /// Returns the block `(subgroup, block_type)`, if the group has one.
    pub fn block(&self, subgroup: u8, block_type: u8) -> Option<&Block> {
        self.blocks.get(&(subgroup, block_type))
    }

    /// Total number of logic cells in the group.
    pub fn cell_count(&self) -> usize {
        self.blocks.values().map(|b| b.cells.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::NetlistBuilder;

    fn group_of(b: &NetlistBuilder, blocks: &[(u8, u8, &[&str])]) -> RawGroup {
        let mut g = RawGroup::new(0);
        for &(sid, typ, names) in blocks {
            let blk = g.block_mut(sid, typ);
            for (slot, name) in names.iter().enumerate() {
                blk.insert(slot as u8, b.cell(name)).unwrap();
            }
        }
        g
    }

    #[test]
    fn bottom_group() {
        let mut b = NetlistBuilder::new();
        let din = b.io_pad("pad", Bel::new(7, 0, 0));
        b.lc("a0", Some(din), None);
        b.lc("b0", None, None);
        let raw = group_of(&b, &[(4, 0xa, &["a0"]), (4, 0x9, &["b0"])]);
        let nl = b.build();

        let group = raw.analyze(&nl, &PlacerConfig::default()).unwrap();
        assert_eq!(group.io, Bel::new(7, 0, 0));
        assert_eq!(group.region, Region::Bottom);
        assert_eq!(group.blocks.len(), 2);
        assert_eq!(group.cell_count(), 2);
        assert!(group.block(4, 0x9).is_some());
        assert!(group.block(5, 0x9).is_none());
    }

    #[test]
    fn top_group() {
        let mut b = NetlistBuilder::new();
        let din = b.io_pad("pad", Bel::new(7, 31, 1));
        b.lc("a0", Some(din), None);
        let raw = group_of(&b, &[(0, 0x1, &["a0"])]);
        let nl = b.build();
        let group = raw.analyze(&nl, &PlacerConfig::default()).unwrap();
        assert_eq!(group.region, Region::Top);
    }

    #[test]
    fn same_io_twice_is_fine() {
        let mut b = NetlistBuilder::new();
        let din = b.io_pad("pad", Bel::new(7, 0, 0));
        b.lc("a0", Some(din), None);
        b.lc("b0", Some(din), None);
        let raw = group_of(&b, &[(0, 0x1, &["a0"]), (0, 0x2, &["b0"])]);
        let nl = b.build();
        assert!(raw.analyze(&nl, &PlacerConfig::default()).is_ok());
    }

    #[test]
    fn conflicting_io() {
        let mut b = NetlistBuilder::new();
        let p0 = b.io_pad("p0", Bel::new(7, 0, 0));
        let p1 = b.io_pad("p1", Bel::new(7, 0, 1));
        b.lc("a0", Some(p0), None);
        b.lc("b0", Some(p1), None);
        let raw = group_of(&b, &[(0, 0x1, &["a0"]), (1, 0x1, &["b0"])]);
        let nl = b.build();
        match raw.analyze(&nl, &PlacerConfig::default()) {
            Err(PlacementError::InconsistentGroupIo {
                group,
                first,
                second,
            }) => {
                assert_eq!(group, 0);
                assert_eq!(first, Bel::new(7, 0, 0));
                assert_eq!(second, Bel::new(7, 0, 1));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn missing_io() {
        let mut b = NetlistBuilder::new();
        b.lc("a0", None, None);
        let raw = group_of(&b, &[(0, 0x1, &["a0"])]);
        let nl = b.build();
        assert!(matches!(
            raw.analyze(&nl, &PlacerConfig::default()),
            Err(PlacementError::MissingGroupIo { group: 0 })
        ));
    }
}
