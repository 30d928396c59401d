//! `sdplace place`: assigns BELs to every SerDes block of a netlist.

use std::path::Path;

use sdplace_config::PlacerConfig;
use sdplace_diagnostics::DiagnosticSink;
use sdplace_netlist::{load_netlist, save_netlist};

use crate::pipeline::{load_placer_config, report_diagnostics};
use crate::{GlobalArgs, PlaceArgs, ReportFormat};

/// Runs the `sdplace place` command.
///
/// Returns exit code 0 on success and 1 if placement failed. The output file
/// is only written when every block was placed.
pub fn run(args: &PlaceArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = load_placer_config(global)?;
    execute(args, &config, global)
}

fn execute(
    args: &PlaceArgs,
    config: &PlacerConfig,
    global: &GlobalArgs,
) -> Result<i32, Box<dyn std::error::Error>> {
    let input = Path::new(&args.netlist);
    let mut netlist = load_netlist(input)?;

    if !global.quiet && global.format == ReportFormat::Text {
        eprintln!(
            "   Loaded {} ({} cells, {} nets)",
            input.display(),
            netlist.cell_count(),
            netlist.net_count()
        );
    }

    let sink = DiagnosticSink::new();
    let summary = match sdplace_core::place(&mut netlist, config, &sink) {
        Ok(summary) => summary,
        Err(e) => {
            sink.emit(e.to_diagnostic());
            report_diagnostics(&sink, global);
            return Ok(1);
        }
    };
    report_diagnostics(&sink, global);

    let output = args.output.as_deref().map(Path::new).unwrap_or(input);
    save_netlist(&netlist, output)?;

    match global.format {
        ReportFormat::Json => println!("{}", serde_json::to_string(&summary)?),
        ReportFormat::Text if !global.quiet => {
            eprintln!(
                "   Placed {} cells in {} blocks ({} groups, {} sites)",
                summary.cells_placed, summary.blocks_placed, summary.groups, summary.sites_used
            );
            eprintln!(
                "   Wrote {} (fingerprint {})",
                output.display(),
                summary.fingerprint
            );
        }
        ReportFormat::Text => {}
    }

    Ok(0)
}
