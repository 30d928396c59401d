//! Netlist builder shared by the unit and scenario tests.

use crate::ident::FullCellId;
use sdplace_common::Bel;
use sdplace_netlist::{format_bits, Cell, CellId, NetId, Netlist, PinDirection};

/// Packs a group identifier the way the packer does.
pub(crate) fn pack(group: u32, subgroup: u8, block_type: u8, slot: u8) -> u64 {
    FullCellId {
        group,
        subgroup,
        block_type,
        slot,
    }
    .encode()
}

pub(crate) struct NetlistBuilder {
    nl: Netlist,
}

impl NetlistBuilder {
    pub(crate) fn new() -> Self {
        Self { nl: Netlist::new() }
    }

    pub(crate) fn net(&mut self, name: &str) -> NetId {
        self.nl.add_net(name)
    }

    /// Adds a placed IO buffer driving a net of the same name.
    pub(crate) fn io_pad(&mut self, name: &str, bel: Bel) -> NetId {
        let io = self.nl.add_cell(Cell::new(name, "SB_IO"));
        self.nl
            .set_attr(io, "BEL", format!("X{}/Y{}/io{}", bel.x, bel.y, bel.z));
        let net = self.nl.add_net(name);
        self.nl
            .connect(io, "D_IN_0", PinDirection::Output, net)
            .unwrap();
        net
    }

    /// Adds a logic cell reading `input` on `I0` and clocked by `clock`.
    pub(crate) fn lc(&mut self, name: &str, input: Option<NetId>, clock: Option<NetId>) -> CellId {
        let lc = self.nl.add_cell(Cell::new(name, "ICESTORM_LC"));
        self.nl.set_param(lc, "NEG_CLK", "0");
        match input {
            Some(net) => {
                self.nl.connect(lc, "I0", PinDirection::Input, net).unwrap();
            }
            None => {
                self.nl.add_port(lc, "I0", PinDirection::Input);
            }
        }
        if let Some(net) = clock {
            self.nl.connect(lc, "CLK", PinDirection::Input, net).unwrap();
        }
        lc
    }

    /// Adds a logic cell tagged with the packed identifier `id`.
    pub(crate) fn serdes(
        &mut self,
        name: &str,
        id: u64,
        input: Option<NetId>,
        clock: Option<NetId>,
    ) -> CellId {
        let lc = self.lc(name, input, clock);
        self.nl.set_attr(lc, "SERDES_GRP", format_bits(id, 16));
        lc
    }

    /// Adds a full block of `len` cells; slot 0 reads `input`, all share `clock`.
    pub(crate) fn block(
        &mut self,
        group: u32,
        subgroup: u8,
        block_type: u8,
        len: u8,
        input: Option<NetId>,
        clock: Option<NetId>,
    ) -> Vec<CellId> {
        (0..len)
            .map(|slot| {
                let name = format!("g{group}_s{subgroup}_t{block_type:x}_{slot}");
                let id = pack(group, subgroup, block_type, slot);
                let input = if slot == 0 { input } else { None };
                self.serdes(&name, id, input, clock)
            })
            .collect()
    }

    pub(crate) fn set_attr(&mut self, cell: &str, name: &str, value: &str) {
        let id = self.cell(cell);
        self.nl.set_attr(id, name, value);
    }

    pub(crate) fn set_param(&mut self, cell: &str, name: &str, value: &str) {
        let id = self.cell(cell);
        self.nl.set_param(id, name, value);
    }

    pub(crate) fn cell(&self, name: &str) -> CellId {
        self.nl.find_cell(name).unwrap()
    }

    pub(crate) fn build(self) -> Netlist {
        self.nl
    }
}
