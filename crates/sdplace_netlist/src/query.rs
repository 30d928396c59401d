//! Read-only query interface used by the placer.
//!
//! The placer never walks the arena directly; it asks for the net on a named
//! port, the driver of a net, and the users of a net. Anything implementing
//! [`NetlistQuery`] can be analyzed.

use crate::data::{Cell, Net, Netlist, Pin};
use crate::ids::{CellId, NetId, PinId};

/// Connectivity and attribute queries over a netlist.
pub trait NetlistQuery {
    /// Returns the cell with the given ID.
    fn cell(&self, id: CellId) -> &Cell;

    /// Returns the net with the given ID.
    fn net(&self, id: NetId) -> &Net;

    /// Returns the pin with the given ID.
    fn pin(&self, id: PinId) -> &Pin;

    /// Returns the net connected to `port` of `cell`, if the port exists and is connected.
    fn net_of(&self, cell: CellId, port: &str) -> Option<NetId> {
        self.cell(cell)
            .pins
            .iter()
            .map(|&p| self.pin(p))
            .find(|p| p.name == port)
            .and_then(|p| p.net)
    }

    /// Returns the pin driving `net`.
    fn driver_of(&self, net: NetId) -> Option<PinId> {
        self.net(net).driver
    }

    /// Returns the pins consuming `net`.
    fn users_of(&self, net: NetId) -> &[PinId] {
        &self.net(net).users
    }

    /// Returns attribute `name` of `cell`.
    fn attr(&self, cell: CellId, name: &str) -> Option<&str> {
        self.cell(cell).attrs.get(name).map(String::as_str)
    }

    /// Returns parameter `name` of `cell`.
    fn param(&self, cell: CellId, name: &str) -> Option<&str> {
        self.cell(cell).params.get(name).map(String::as_str)
    }
}

impl NetlistQuery for Netlist {
    fn cell(&self, id: CellId) -> &Cell {
        Netlist::cell(self, id)
    }

    fn net(&self, id: NetId) -> &Net {
        Netlist::net(self, id)
    }

    fn pin(&self, id: PinId) -> &Pin {
        Netlist::pin(self, id)
    }
}
