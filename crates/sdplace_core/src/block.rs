//! SerDes blocks: slot collection and per-block analysis.

use crate::error::PlacementError;
use crate::ident::BlockKey;
use crate::signature::ControlSignature;
use sdplace_common::Bel;
use sdplace_config::{PlacerConfig, SITE_CAPACITY};
use sdplace_netlist::{CellId, NetlistQuery};

/// The cells of one block as found while scanning the netlist.
#[derive(Clone, Debug)]
pub struct RawBlock {
    /// The block key.
    pub key: BlockKey,
    slots: [Option<CellId>; SITE_CAPACITY as usize],
}

impl RawBlock {
    /// Creates an empty block.
    pub fn new(key: BlockKey) -> Self {
        Self {
            key,
            slots: [None; SITE_CAPACITY as usize],
        }
    }

    /// Puts `cell` into `slot`, returning the previous occupant if the slot was taken.
    pub fn insert(&mut self, slot: u8, cell: CellId) -> Result<(), CellId> {
        match self.slots[slot as usize] {
            Some(existing) => Err(existing),
            None => {
                self.slots[slot as usize] = Some(cell);
                Ok(())
            }
        }
    }

    /// Returns the populated slot numbers in order.
    pub fn populated(&self) -> Vec<u8> {
        (0..SITE_CAPACITY)
            .filter(|&s| self.slots[s as usize].is_some())
            .collect()
    }

    /// Validates occupancy, then derives the signature and IO site.
    ///
    /// The occupied length is the configured length of the block type, or
    /// the number of populated slots when none is configured. Slots
    /// `[0, length)` must all be filled and the rest empty.
    pub fn analyze(
        &self,
        netlist: &impl NetlistQuery,
        config: &PlacerConfig,
    ) -> Result<Block, PlacementError> {
        let populated = self.populated();
        let length = config
            .expected_length(self.key.block_type)
            .unwrap_or(populated.len() as u8);

        let contiguous = populated.len() == length as usize
            && populated.iter().enumerate().all(|(i, &s)| i == s as usize);
        if !contiguous || length == 0 {
            return Err(PlacementError::InvalidBlockOccupancy {
                block: self.key.describe(config),
                length,
                populated,
            });
        }

        let cells: Vec<CellId> = self.slots.iter().flatten().copied().collect();
        let io = find_io_site(netlist, &cells, config)?;
        let signature = ControlSignature::of_cell(netlist, cells[0], &config.control);

        Ok(Block {
            key: self.key,
            cells,
            signature,
            io,
        })
    }
}

/// An analyzed block ready for placement.
#[derive(Clone, Debug)]
pub struct Block {
    /// The block key.
    pub key: BlockKey,
    /// Cells in slot order; slot `i` is `cells[i]`.
    pub cells: Vec<CellId>,
    /// Control signature of slot 0.
    pub signature: ControlSignature,
    /// IO site the block is wired to, if any.
    pub io: Option<Bel>,
}

impl Block {
    /// Number of logic cells the block occupies on its site.
    pub fn len(&self) -> u8 {
        self.cells.len() as u8
    }

    /// Returns `true` if the block has no cells (never the case after analysis).
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Traces the data ports of `cells` in slot order to the first directly
/// attached IO cell with a fixed placement.
///
/// Unconnected ports and packer-internal nets are skipped. A blank placement
/// attribute counts as unplaced.
pub fn find_io_site(
    netlist: &impl NetlistQuery,
    cells: &[CellId],
    config: &PlacerConfig,
) -> Result<Option<Bel>, PlacementError> {
    let io = &config.io;
    let bel_attr = config.attributes.placement.as_str();

    for &cell in cells {
        for port in &io.trace_ports {
            let Some(net) = netlist.net_of(cell, port) else {
                continue;
            };
            if netlist.net(net).name.starts_with(&io.ignore_net_prefix) {
                continue;
            }
            let pins = netlist
                .driver_of(net)
                .into_iter()
                .chain(netlist.users_of(net).iter().copied());
            for pin in pins {
                let other = netlist.pin(pin).cell;
                if netlist.cell(other).cell_type != io.cell_type {
                    continue;
                }
                let Some(value) = netlist.attr(other, bel_attr) else {
                    continue;
                };
                if value.trim().is_empty() {
                    continue;
                }
                let bel = value
                    .parse::<Bel>()
                    .map_err(|_| PlacementError::MalformedAttribute {
                        cell: netlist.cell(other).name.clone(),
                        attribute: bel_attr.to_string(),
                        value: value.to_string(),
                    })?;
                return Ok(Some(bel));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::NetlistBuilder;
    use sdplace_config::BlockTypeDef;

    fn raw(b: &NetlistBuilder, cells: &[(u8, &str)]) -> RawBlock {
        let mut blk = RawBlock::new(BlockKey::new(0, 0, 0x2));
        for &(slot, name) in cells {
            blk.insert(slot, b.cell(name)).unwrap();
        }
        blk
    }

    #[test]
    fn duplicate_slot_returns_occupant() {
        let mut b = NetlistBuilder::new();
        let x = b.lc("x", None, None);
        let y = b.lc("y", None, None);
        let mut blk = RawBlock::new(BlockKey::new(0, 0, 0x2));
        blk.insert(3, x).unwrap();
        assert_eq!(blk.insert(3, y), Err(x));
    }

    #[test]
    fn contiguous_block_analyzes() {
        let mut b = NetlistBuilder::new();
        let din = b.io_pad("pad", Bel::new(4, 0, 1));
        let clk = b.net("clk");
        b.lc("c0", Some(din), Some(clk));
        b.lc("c1", None, Some(clk));
        let blk = raw(&b, &[(1, "c1"), (0, "c0")]);

        let nl = b.build();
        let analyzed = blk.analyze(&nl, &PlacerConfig::default()).unwrap();
        assert_eq!(analyzed.len(), 2);
        assert_eq!(analyzed.cells[0], nl.find_cell("c0").unwrap());
        assert_eq!(analyzed.io, Some(Bel::new(4, 0, 1)));
        assert_eq!(analyzed.signature.clock, Some(clk));
    }

    #[test]
    fn gap_is_invalid() {
        let mut b = NetlistBuilder::new();
        for name in ["c0", "c1", "c3"] {
            b.lc(name, None, None);
        }
        let blk = raw(&b, &[(0, "c0"), (1, "c1"), (3, "c3")]);
        let nl = b.build();
        let err = blk.analyze(&nl, &PlacerConfig::default()).unwrap_err();
        match err {
            PlacementError::InvalidBlockOccupancy {
                length, populated, ..
            } => {
                assert_eq!(length, 3);
                assert_eq!(populated, vec![0, 1, 3]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn configured_length_must_match() {
        let mut b = NetlistBuilder::new();
        for name in ["c0", "c1"] {
            b.lc(name, None, None);
        }
        let blk = raw(&b, &[(0, "c0"), (1, "c1")]);
        let nl = b.build();

        let mut config = PlacerConfig::default();
        config.block_types.retain(|t| t.id != 0x2);
        config.block_types.push(BlockTypeDef {
            id: 0x2,
            name: "OSERDES NegEdge Delay".into(),
            length: Some(4),
        });
        assert!(matches!(
            blk.analyze(&nl, &config),
            Err(PlacementError::InvalidBlockOccupancy { length: 4, .. })
        ));

        config.block_types.last_mut().unwrap().length = Some(2);
        assert_eq!(blk.analyze(&nl, &config).unwrap().len(), 2);
    }

    #[test]
    fn populated_past_configured_length() {
        let mut b = NetlistBuilder::new();
        for name in ["c0", "c1", "c2"] {
            b.lc(name, None, None);
        }
        let blk = raw(&b, &[(0, "c0"), (1, "c1"), (2, "c2")]);
        let nl = b.build();

        let mut config = PlacerConfig::default();
        config.block_types.retain(|t| t.id != 0x2);
        config.block_types.push(BlockTypeDef {
            id: 0x2,
            name: "OSERDES NegEdge Delay".into(),
            length: Some(2),
        });
        match blk.analyze(&nl, &config) {
            Err(PlacementError::InvalidBlockOccupancy {
                length, populated, ..
            }) => {
                assert_eq!(length, 2);
                assert_eq!(populated, vec![0, 1, 2]);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn io_found_on_later_slot() {
        let mut b = NetlistBuilder::new();
        let din = b.io_pad("pad", Bel::new(9, 31, 0));
        b.lc("c0", None, None);
        b.lc("c1", Some(din), None);
        let blk = raw(&b, &[(0, "c0"), (1, "c1")]);
        let nl = b.build();
        let analyzed = blk.analyze(&nl, &PlacerConfig::default()).unwrap();
        assert_eq!(analyzed.io, Some(Bel::new(9, 31, 0)));
    }

    #[test]
    fn packer_nets_and_blank_bels_ignored() {
        let mut b = NetlistBuilder::new();
        let packer = b.io_pad("$PACKER_pad", Bel::new(3, 0, 0));
        let blank = b.io_pad("blank", Bel::new(5, 0, 0));
        b.set_attr("blank", "BEL", "  ");
        b.lc("c0", Some(packer), None);
        b.lc("c1", Some(blank), None);
        let blk = raw(&b, &[(0, "c0"), (1, "c1")]);
        let nl = b.build();
        let analyzed = blk.analyze(&nl, &PlacerConfig::default()).unwrap();
        assert_eq!(analyzed.io, None);
    }

    #[test]
    fn malformed_io_bel() {
        let mut b = NetlistBuilder::new();
        let din = b.io_pad("pad", Bel::new(4, 0, 0));
        b.set_attr("pad", "BEL", "X4/Y0");
        b.lc("c0", Some(din), None);
        let blk = raw(&b, &[(0, "c0")]);
        let nl = b.build();
        assert!(matches!(
            blk.analyze(&nl, &PlacerConfig::default()),
            Err(PlacementError::MalformedAttribute { .. })
        ));
    }
}
