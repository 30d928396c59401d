//! Netlist arena consumed and annotated by the SerDes placer.
//!
//! Cells, nets, and pins are stored in an index-addressed [`Netlist`]. The
//! placer reads connectivity through the [`NetlistQuery`] trait and writes
//! results back as cell attributes. Netlists can be exchanged with the host
//! tool as JSON.

#![warn(missing_docs)]

pub mod attr;
pub mod data;
pub mod error;
pub mod ids;
pub mod json;
pub mod query;

pub use attr::{format_bits, parse_bits};
pub use data::{Cell, Net, Netlist, Pin, PinDirection};
pub use error::NetlistError;
pub use ids::{CellId, NetId, PinId};
pub use json::{load_netlist, save_netlist};
pub use query::NetlistQuery;
