//! Core netlist data structures.
//!
//! The host tool's live object graph is represented as an explicit arena:
//! cells, nets, and pins live in vectors and reference each other by ID, so
//! there are no back-pointers to keep alive. Each pin belongs to exactly one
//! cell and optionally connects to one net; each net has at most one driving
//! pin and any number of user pins.

use crate::error::NetlistError;
use crate::ids::{CellId, NetId, PinId};
use sdplace_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// The netlist handed to the placer by the host tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Netlist {
    /// All cells in the netlist.
    pub cells: Vec<Cell>,
    /// All nets in the netlist.
    pub nets: Vec<Net>,
    /// All pins in the netlist.
    pub pins: Vec<Pin>,
    /// Auxiliary index: cell name to ID (rebuilt on deserialization).
    #[serde(skip)]
    pub cell_by_name: HashMap<String, CellId>,
    /// Auxiliary index: net name to ID (rebuilt on deserialization).
    #[serde(skip)]
    pub net_by_name: HashMap<String, NetId>,
}

impl Netlist {
    /// Creates an empty netlist.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cell and returns its ID.
    pub fn add_cell(&mut self, mut cell: Cell) -> CellId {
        let id = CellId::from_raw(self.cells.len() as u32);
        cell.id = id;
        cell.pins.clear();
        self.cell_by_name.insert(cell.name.clone(), id);
        self.cells.push(cell);
        id
    }

    /// Adds an unconnected net and returns its ID.
    pub fn add_net(&mut self, name: impl Into<String>) -> NetId {
        let id = NetId::from_raw(self.nets.len() as u32);
        let name = name.into();
        self.net_by_name.insert(name.clone(), id);
        self.nets.push(Net {
            id,
            name,
            driver: None,
            users: Vec::new(),
        });
        id
    }

    /// Adds an unconnected port to `cell`.
    pub fn add_port(
        &mut self,
        cell: CellId,
        name: impl Into<String>,
        direction: PinDirection,
    ) -> PinId {
        let id = PinId::from_raw(self.pins.len() as u32);
        self.pins.push(Pin {
            id,
            name: name.into(),
            direction,
            cell,
            net: None,
        });
        self.cells[cell.index()].pins.push(id);
        id
    }

    /// Adds a port to `cell` and connects it to `net`.
    ///
    /// An output port becomes the net's driver; an input port is appended to
    /// its users. Connecting a second output to a net fails.
    pub fn connect(
        &mut self,
        cell: CellId,
        port: impl Into<String>,
        direction: PinDirection,
        net: NetId,
    ) -> Result<PinId, NetlistError> {
        if direction == PinDirection::Output && self.nets[net.index()].driver.is_some() {
            return Err(NetlistError::MultipleDrivers { net, cell });
        }
        let pin = self.add_port(cell, port, direction);
        self.pins[pin.index()].net = Some(net);
        let n = &mut self.nets[net.index()];
        match direction {
            PinDirection::Output => n.driver = Some(pin),
            PinDirection::Input => n.users.push(pin),
        }
        Ok(pin)
    }

    /// Returns the cell with the given ID.
    pub fn cell(&self, id: CellId) -> &Cell {
        &self.cells[id.index()]
    }

    /// Returns the net with the given ID.
    pub fn net(&self, id: NetId) -> &Net {
        &self.nets[id.index()]
    }

    /// Returns the pin with the given ID.
    pub fn pin(&self, id: PinId) -> &Pin {
        &self.pins[id.index()]
    }

    /// Iterates over all cell IDs in arena order.
    pub fn cell_ids(&self) -> impl Iterator<Item = CellId> + '_ {
        self.cells.iter().map(|c| c.id)
    }

    /// Looks up a cell by name.
    pub fn find_cell(&self, name: &str) -> Result<CellId, NetlistError> {
        self.cell_by_name
            .get(name)
            .copied()
            .ok_or_else(|| NetlistError::UnknownCell(name.to_string()))
    }

    /// Looks up a net by name.
    pub fn find_net(&self, name: &str) -> Option<NetId> {
        self.net_by_name.get(name).copied()
    }

    /// Sets attribute `name` on `cell`, replacing any previous value.
    pub fn set_attr(&mut self, cell: CellId, name: &str, value: impl Into<String>) {
        self.cells[cell.index()]
            .attrs
            .insert(name.to_string(), value.into());
    }

    /// Removes attribute `name` from `cell`, returning its previous value.
    pub fn unset_attr(&mut self, cell: CellId, name: &str) -> Option<String> {
        self.cells[cell.index()].attrs.remove(name)
    }

    /// Sets parameter `name` on `cell`.
    pub fn set_param(&mut self, cell: CellId, name: &str, value: impl Into<String>) {
        self.cells[cell.index()]
            .params
            .insert(name.to_string(), value.into());
    }

    /// Returns the number of cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns the number of nets.
    pub fn net_count(&self) -> usize {
        self.nets.len()
    }

    /// Returns the number of pins.
    pub fn pin_count(&self) -> usize {
        self.pins.len()
    }

    /// Rebuilds auxiliary indices after deserialization.
    pub fn rebuild_indices(&mut self) {
        self.cell_by_name.clear();
        for (i, cell) in self.cells.iter().enumerate() {
            self.cell_by_name
                .insert(cell.name.clone(), CellId::from_raw(i as u32));
        }
        self.net_by_name.clear();
        for (i, net) in self.nets.iter().enumerate() {
            self.net_by_name
                .insert(net.name.clone(), NetId::from_raw(i as u32));
        }
    }

    /// Checks that all IDs are in range and both sides of every connection agree.
    pub fn check_consistency(&self) -> Result<(), NetlistError> {
        let bad = |msg: String| Err(NetlistError::Inconsistent(msg));

        for (i, cell) in self.cells.iter().enumerate() {
            if cell.id.index() != i {
                return bad(format!(
                    "cell '{}' stored at {i} has id {}",
                    cell.name, cell.id
                ));
            }
            for &pin in &cell.pins {
                match self.pins.get(pin.index()) {
                    Some(p) if p.cell == cell.id => {}
                    Some(_) => {
                        return bad(format!(
                            "pin {pin} listed on cell '{}' belongs elsewhere",
                            cell.name
                        ))
                    }
                    None => {
                        return bad(format!("cell '{}' lists missing pin {pin}", cell.name))
                    }
                }
            }
        }

        for (i, pin) in self.pins.iter().enumerate() {
            if pin.id.index() != i {
                return bad(format!("pin stored at {i} has id {}", pin.id));
            }
            if pin.cell.index() >= self.cells.len() {
                return bad(format!(
                    "pin {} references missing cell {}",
                    pin.id, pin.cell
                ));
            }
            if let Some(net) = pin.net {
                let Some(n) = self.nets.get(net.index()) else {
                    return bad(format!("pin {} references missing net {net}", pin.id));
                };
                if n.driver != Some(pin.id) && !n.users.contains(&pin.id) {
                    return bad(format!("pin {} not listed on net '{}'", pin.id, n.name));
                }
            }
        }

        for (i, net) in self.nets.iter().enumerate() {
            if net.id.index() != i {
                return bad(format!(
                    "net '{}' stored at {i} has id {}",
                    net.name, net.id
                ));
            }
            for pin in net.driver.iter().chain(net.users.iter()) {
                match self.pins.get(pin.index()) {
                    Some(p) if p.net == Some(net.id) => {}
                    _ => {
                        return bad(format!(
                            "net '{}' lists unconnected pin {pin}",
                            net.name
                        ))
                    }
                }
            }
        }

        Ok(())
    }

    /// Fingerprints the values of attribute `attr` over all cells.
    ///
    /// Cells are visited in name order, so the hash depends only on which
    /// cell carries which value.
    pub fn placement_fingerprint(&self, attr: &str) -> ContentHash {
        let mut entries: Vec<(&str, &str)> = self
            .cells
            .iter()
            .filter_map(|c| c.attrs.get(attr).map(|v| (c.name.as_str(), v.as_str())))
            .collect();
        entries.sort_unstable();
        ContentHash::from_fields(entries.into_iter().flat_map(|(name, value)| [name, value]))
    }
}

/// Direction of a pin relative to its cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// The cell consumes the net.
    Input,
    /// The cell drives the net.
    Output,
}

/// A cell of the netlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// The unique ID of this cell.
    pub id: CellId,
    /// Cell instance name.
    pub name: String,
    /// Primitive type, e.g. `ICESTORM_LC` or `SB_IO`.
    pub cell_type: String,
    /// Attributes (strings, or binary strings for bitfields).
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Primitive parameters.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
    /// Ports of this cell.
    #[serde(default)]
    pub pins: Vec<PinId>,
}

impl Cell {
    /// Creates a cell with no attributes, parameters, or ports.
    pub fn new(name: impl Into<String>, cell_type: impl Into<String>) -> Self {
        Self {
            id: CellId::from_raw(0),
            name: name.into(),
            cell_type: cell_type.into(),
            attrs: BTreeMap::new(),
            params: BTreeMap::new(),
            pins: Vec::new(),
        }
    }
}

/// A net connecting one driver pin to any number of user pins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    /// The unique ID of this net.
    pub id: NetId,
    /// Net name.
    pub name: String,
    /// The driving pin, if any.
    pub driver: Option<PinId>,
    /// The consuming pins.
    #[serde(default)]
    pub users: Vec<PinId>,
}

/// A port of a cell, optionally connected to a net.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pin {
    /// The unique ID of this pin.
    pub id: PinId,
    /// Port name (e.g. `I0`, `O`, `CLK`).
    pub name: String,
    /// Direction of the pin relative to the cell.
    pub direction: PinDirection,
    /// The cell that owns this pin.
    pub cell: CellId,
    /// The net this pin is connected to (`None` = unconnected).
    pub net: Option<NetId>,
}
