//! Shared helpers for CLI commands: configuration lookup and diagnostic output.

use std::path::Path;

use sdplace_config::{load_config, PlacerConfig, CONFIG_FILE_NAME};
use sdplace_diagnostics::{
    Diagnostic, DiagnosticRenderer, DiagnosticSink, JsonRenderer, Severity, TerminalRenderer,
};

use crate::{GlobalArgs, ReportFormat};

/// Loads the placer configuration selected by the global flags.
pub fn load_placer_config(global: &GlobalArgs) -> Result<PlacerConfig, Box<dyn std::error::Error>> {
    let explicit = global.config.as_deref().map(Path::new);
    resolve_config(explicit, &std::env::current_dir()?)
}

/// Resolves the configuration: an explicit `--config` path wins, then
/// `sdplace.toml` in `cwd`, then the built-in defaults.
pub fn resolve_config(
    explicit: Option<&Path>,
    cwd: &Path,
) -> Result<PlacerConfig, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        return Ok(load_config(path)?);
    }
    let local = cwd.join(CONFIG_FILE_NAME);
    if local.is_file() {
        Ok(load_config(&local)?)
    } else {
        Ok(PlacerConfig::default())
    }
}

/// Returns `true` if `diag` should be shown under the global verbosity flags.
pub fn is_visible(diag: &Diagnostic, global: &GlobalArgs) -> bool {
    match diag.severity {
        Severity::Error => true,
        Severity::Warning => !global.quiet,
        Severity::Note => global.verbose && !global.quiet,
    }
}

/// Formats the visible diagnostics in the selected output format.
pub fn format_diagnostics(diagnostics: &[Diagnostic], global: &GlobalArgs) -> String {
    let renderer: Box<dyn DiagnosticRenderer> = match global.format {
        ReportFormat::Text => Box::new(TerminalRenderer::new(global.color)),
        ReportFormat::Json => Box::new(JsonRenderer),
    };
    diagnostics
        .iter()
        .filter(|d| is_visible(d, global))
        .map(|d| renderer.render(d))
        .collect()
}

/// Prints the diagnostics collected in `sink` to stderr, followed by a
/// result line in text mode.
pub fn report_diagnostics(sink: &DiagnosticSink, global: &GlobalArgs) {
    let diagnostics = sink.diagnostics();
    eprint!("{}", format_diagnostics(&diagnostics, global));

    if !global.quiet && global.format == ReportFormat::Text {
        let errors = sink.error_count();
        let warnings = sink.warning_count();
        if errors + warnings > 0 {
            eprintln!("   Result: {errors} error(s), {warnings} warning(s)");
        }
    }
}

#[cfg(test)]
pub(crate) fn test_global(format: ReportFormat) -> GlobalArgs {
    GlobalArgs {
        quiet: false,
        verbose: false,
        color: false,
        config: None,
        format,
    }
}
