//! Validation of a parsed placer configuration.
//!
//! Besides range checks, this verifies that the priority list encodes a
//! dependency DAG: every block type referenced by a centroid anchor must be
//! ranked earlier than the type that references it, so its position is known
//! by the time the dependent block is placed.

use crate::error::ConfigError;
use crate::types::{Anchor, GridConfig, PlacerConfig, SITE_CAPACITY};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Validates every section of `config`.
pub fn validate_config(config: &PlacerConfig) -> Result<(), ConfigError> {
    validate_grid(&config.grid)?;
    validate_block_types(config)?;
    validate_priority(config)?;
    validate_preferences(config)?;
    Ok(())
}

/// Builds the placement dependency graph of the priority list.
///
/// Node `i` is the block type of priority rule `i`; an edge `a -> b` means
/// blocks of type `b` aim at placed blocks of type `a`.
pub fn dependency_graph(config: &PlacerConfig) -> Result<DiGraph<u8, ()>, ConfigError> {
    let mut graph = DiGraph::new();
    let mut nodes: HashMap<u8, NodeIndex> = HashMap::new();

    for rule in &config.priority {
        check_nibble("priority block type", rule.block_type)?;
        if nodes.contains_key(&rule.block_type) {
            return Err(invalid(format!(
                "block type {:#x} appears more than once in the priority list",
                rule.block_type
            )));
        }
        nodes.insert(rule.block_type, graph.add_node(rule.block_type));
    }

    for rule in &config.priority {
        let refs = rule.anchor.references();
        if matches!(rule.anchor, Anchor::Centroid { .. }) && refs.is_empty() {
            return Err(invalid(format!(
                "centroid anchor of block type {:#x} references no blocks",
                rule.block_type
            )));
        }
        let node = nodes[&rule.block_type];
        for r in refs {
            check_nibble("referenced block type", r.block_type)?;
            check_nibble("subgroup base", r.subgroup.base)?;
            check_nibble("subgroup keep mask", r.subgroup.keep)?;
            if r.block_type == rule.block_type {
                return Err(invalid(format!(
                    "cyclic placement dependency involving block type {:#x}",
                    rule.block_type
                )));
            }
            let dep = nodes.get(&r.block_type).ok_or_else(|| {
                invalid(format!(
                    "block type {:#x} depends on block type {:#x}, which has no priority rule",
                    rule.block_type, r.block_type
                ))
            })?;
            graph.add_edge(*dep, node, ());
        }
    }

    Ok(graph)
}

fn validate_priority(config: &PlacerConfig) -> Result<(), ConfigError> {
    let graph = dependency_graph(config)?;

    toposort(&graph, None).map_err(|cycle| {
        invalid(format!(
            "cyclic placement dependency involving block type {:#x}",
            graph[cycle.node_id()]
        ))
    })?;

    // Node indices follow priority order
    for edge in graph.edge_references() {
        if edge.source().index() >= edge.target().index() {
            return Err(invalid(format!(
                "block type {:#x} is ranked before block type {:#x} it depends on",
                graph[edge.target()],
                graph[edge.source()]
            )));
        }
    }

    Ok(())
}

fn validate_grid(grid: &GridConfig) -> Result<(), ConfigError> {
    for (what, band) in [
        ("columns", grid.columns),
        ("bottom_rows", grid.bottom_rows),
        ("top_rows", grid.top_rows),
    ] {
        if band.first > band.last {
            return Err(invalid(format!(
                "grid.{what} is empty ({}..={})",
                band.first, band.last
            )));
        }
    }

    if grid.bottom_rows.overlaps(grid.top_rows) {
        return Err(invalid("grid.bottom_rows and grid.top_rows overlap"));
    }

    if let Some(col) = grid
        .reserved_columns
        .iter()
        .find(|c| !grid.columns.contains(**c))
    {
        return Err(invalid(format!(
            "reserved column {col} lies outside grid.columns"
        )));
    }

    Ok(())
}

/// Offsets may reach at most one row past the placement bands, which is where
/// the IO pads sit.
fn validate_preferences(config: &PlacerConfig) -> Result<(), ConfigError> {
    if config.preferences.is_empty() {
        return Err(invalid("at least one preference offset is required"));
    }
    let grid = &config.grid;
    let max_dx = i64::from(grid.columns.last) - i64::from(grid.columns.first);
    let max_dy = i64::from(grid.bottom_rows.last.max(grid.top_rows.last))
        - i64::from(grid.bottom_rows.first.min(grid.top_rows.first))
        + 1;
    for off in &config.preferences {
        if i64::from(off.dx()).abs() > max_dx || i64::from(off.dy()).abs() > max_dy {
            return Err(invalid(format!(
                "preference offset [{}, {}] exceeds the grid extent \
                 (|dx| <= {max_dx}, |dy| <= {max_dy})",
                off.dx(),
                off.dy()
            )));
        }
    }
    Ok(())
}

fn validate_block_types(config: &PlacerConfig) -> Result<(), ConfigError> {
    let mut seen = HashMap::new();
    for def in &config.block_types {
        check_nibble("block type id", def.id)?;
        if seen.insert(def.id, ()).is_some() {
            return Err(invalid(format!("block type {:#x} declared twice", def.id)));
        }
        if let Some(len) = def.length {
            if len == 0 || len > SITE_CAPACITY {
                return Err(invalid(format!(
                    "block type {:#x} length {len} is outside 1..={SITE_CAPACITY}",
                    def.id
                )));
            }
        }
    }
    Ok(())
}

fn check_nibble(what: &str, v: u8) -> Result<(), ConfigError> {
    if v > 0xf {
        return Err(invalid(format!("{what} {v:#x} does not fit in 4 bits")));
    }
    Ok(())
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}
