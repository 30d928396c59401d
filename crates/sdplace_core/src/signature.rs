//! Control-domain signatures.

use sdplace_config::ControlPorts;
use sdplace_netlist::{CellId, NetId, NetlistQuery};

/// The clock, reset, and enable nets plus clock polarity of a block.
///
/// Logic cells sharing a site share these control signals, so only blocks
/// with equal signatures may be placed on the same site.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ControlSignature {
    /// Net on the clock port.
    pub clock: Option<NetId>,
    /// Net on the set/reset port.
    pub reset: Option<NetId>,
    /// Net on the clock enable port.
    pub enable: Option<NetId>,
    /// Whether the cell clocks on the falling edge.
    pub negedge: bool,
}

impl ControlSignature {
    /// Derives the signature of `cell` from its control ports.
    pub fn of_cell(netlist: &impl NetlistQuery, cell: CellId, ports: &ControlPorts) -> Self {
        Self {
            clock: netlist.net_of(cell, &ports.clock),
            reset: netlist.net_of(cell, &ports.reset),
            enable: netlist.net_of(cell, &ports.enable),
            negedge: netlist.param(cell, &ports.negedge_param) == Some("1"),
        }
    }
}
