//! Error types for netlist construction, loading, and attribute decoding.

use crate::ids::{CellId, NetId};

/// Errors raised by the netlist arena and its JSON front end.
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// Reading or writing the netlist file failed.
    #[error("failed to access netlist file: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON content could not be parsed.
    #[error("failed to parse netlist: {0}")]
    Parse(String),

    /// Cross references inside a loaded netlist do not agree.
    #[error("inconsistent netlist: {0}")]
    Inconsistent(String),

    /// A cell name was looked up but does not exist.
    #[error("unknown cell '{0}'")]
    UnknownCell(String),

    /// A second output was connected to a net that already has a driver.
    #[error("net {net} already driven; cannot connect output of cell {cell}")]
    MultipleDrivers {
        /// The net being connected.
        net: NetId,
        /// The cell whose output was rejected.
        cell: CellId,
    },

    /// A bitfield attribute is not a binary string.
    #[error("attribute value '{0}' is not a binary string")]
    BadBits(String),
}
