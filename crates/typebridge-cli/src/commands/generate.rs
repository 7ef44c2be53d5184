use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use typebridge_codegen::{resolve_roots, Emitter, Walker};
use typebridge_symbols::{CheckerDiagnostic, DumpLoader, Program, ProgramLoader};

use crate::config::CliConfig;
use crate::error::CliError;
use crate::io::write_output;

/// Everything the `typebridge` command line can ask for.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub files: Vec<String>,
    pub program: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub trace: bool,
    pub keep_going: bool,
}

pub fn handle_generate(options: GenerateOptions) -> Result<(), CliError> {
    let mut config = CliConfig::discover(options.config.as_deref())?;
    if options.keep_going {
        config.emit.keep_going = true;
    }

    let program_path = config.program_path(options.program);
    let program = DumpLoader::new(program_path).load()?;
    check_diagnostics(&program)?;

    let resolution = resolve_roots(&program, &options.files);
    let mut walker = Walker::new(&program);
    let progress = progress_bar(resolution.roots.len());
    for &root in &resolution.roots {
        progress.set_message(program.symbol(root).name.clone());
        walker.walk_root(root);
        progress.inc(1);
    }
    progress.finish_and_clear();
    let walked = walker.finish();

    if options.trace {
        eprint!("{}", walked.trace);
    }

    let bindings = Emitter::new(&program, &config.emit).emit(&walked.worklists)?;
    write_output(options.output, &bindings.source)?;

    info!(
        "generated bindings for {} root module(s); {} file(s) unresolved, {} symbol(s) skipped",
        resolution.roots.len(),
        resolution.missing.len(),
        bindings.skipped.len()
    );
    Ok(())
}

/// Prints upstream diagnostics verbatim and refuses to emit when there are any.
fn check_diagnostics(program: &Program) -> Result<(), CliError> {
    let diagnostics = program.diagnostics();
    if diagnostics.is_empty() {
        return Ok(());
    }
    for diagnostic in diagnostics {
        eprintln!("{}", format_diagnostic(diagnostic));
    }
    Err(CliError::ProgramDiagnostics {
        count: diagnostics.len(),
    })
}

fn format_diagnostic(diagnostic: &CheckerDiagnostic) -> String {
    let mut line = String::new();
    if let Some(file) = &diagnostic.file {
        line.push_str(&format!("{}: ", file));
    }
    line.push_str("error");
    if let Some(code) = diagnostic.code {
        line.push_str(&format!(" TS{}", code));
    }
    line.push_str(&format!(": {}", diagnostic.message));
    line
}

// Draws on stderr only when it is a terminal.
fn progress_bar(len: usize) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::with_template("{spinner} walking [{pos}/{len}] {msg}") {
        progress.set_style(style);
    }
    progress
}
