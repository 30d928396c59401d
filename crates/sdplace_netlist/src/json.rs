//! JSON import and export of netlists.

use crate::data::Netlist;
use crate::error::NetlistError;
use std::path::Path;

impl Netlist {
    /// Parses a netlist from JSON, rebuilding indices and checking references.
    pub fn from_json_str(content: &str) -> Result<Self, NetlistError> {
        let mut netlist: Netlist =
            serde_json::from_str(content).map_err(|e| NetlistError::Parse(e.to_string()))?;
        netlist.rebuild_indices();
        netlist.check_consistency()?;
        Ok(netlist)
    }

    /// Serializes the netlist as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String, NetlistError> {
        serde_json::to_string_pretty(self).map_err(|e| NetlistError::Parse(e.to_string()))
    }
}

/// Loads a netlist from a JSON file.
pub fn load_netlist(path: &Path) -> Result<Netlist, NetlistError> {
    let content = std::fs::read_to_string(path)?;
    Netlist::from_json_str(&content)
}

/// Writes a netlist to a JSON file.
pub fn save_netlist(netlist: &Netlist, path: &Path) -> Result<(), NetlistError> {
    std::fs::write(path, netlist.to_json_string()?)?;
    Ok(())
}
