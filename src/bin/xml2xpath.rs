//! Command-line front end for path qualification.
//!
//! Prints a namespace-qualified `XPath` expression for every node selected
//! in an XML document. Report lines go to stdout. Log output and the
//! diagnostics of a run go to stderr so the report stays machine-readable;
//! diagnostics are printed after the report regardless of the log filter.

use std::fmt::Display;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use xml2xpath::qualify::{DEFAULT_MAX_ITEMS, XPATH_ALL, XPATH_ALL_NODES};
use xml2xpath::report::{self, Mode};
use xml2xpath::{
    qualify_bytes, qualify_file, Diagnostic, Error, NamespaceMap, Qualification, QualifyOptions,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// xml2xpath -- list namespace-qualified XPath expressions of an XML document.
#[derive(Parser, Debug)]
#[command(name = "xml2xpath", version, about, long_about = None)]
struct Cli {
    /// XML file to inspect (use `-` for stdin).
    file: String,

    /// Output mode: path, all, raw or values.
    #[arg(short, long, default_value_t = Mode::Path, value_name = "MODE")]
    mode: Mode,

    // -- Selection ---------------------------------------------------------
    /// Qualify the nodes selected by this expression.
    #[allow(clippy::doc_markdown)]
    #[arg(short = 'x', long = "xpath", value_name = "EXPR", default_value = XPATH_ALL)]
    start: String,

    /// Also qualify comments and processing instructions.
    #[arg(long, conflicts_with = "start")]
    all_nodes: bool,

    /// Qualify at most this many nodes.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ITEMS)]
    max_items: usize,

    // -- Validation --------------------------------------------------------
    /// Count the nodes matched by every qualified expression.
    #[arg(short, long)]
    count: bool,

    // -- Output ------------------------------------------------------------
    /// Print only the report, without banner and summary.
    #[arg(long)]
    no_banner: bool,

    /// Log what each stage is doing.
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn options(&self) -> QualifyOptions {
        let start = if self.all_nodes {
            XPATH_ALL_NODES
        } else {
            self.start.as_str()
        };
        QualifyOptions::default()
            .start_expression(start)
            .with_match_counts(self.count)
            .max_items(self.max_items)
    }
}

// ---------------------------------------------------------------------------
// Exit codes (errno values where one applies)
// ---------------------------------------------------------------------------

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;
const EXIT_INVALID_ARGUMENT: u8 = 22;

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            let code = if e.use_stderr() {
                EXIT_INVALID_ARGUMENT
            } else {
                EXIT_SUCCESS
            };
            return ExitCode::from(code);
        }
    };

    init_logging(cli.verbose);
    ExitCode::from(run(&cli))
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the default.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "xml2xpath=debug"
    } else {
        "xml2xpath=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Runs one qualification and prints its report; returns the exit code.
fn run(cli: &Cli) -> u8 {
    let options = cli.options();
    advise(&options);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let show_banner = !cli.no_banner;

    if let Err(e) = write_settings(&mut out, show_banner, cli, &options) {
        return write_failed(&e);
    }

    let run = match load(&cli.file, &options) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("{}: {e}", cli.file);
            return if e.is_not_found() {
                EXIT_NOT_FOUND
            } else {
                EXIT_FAILURE
            };
        }
    };

    if let Err(e) = write_results(&mut out, show_banner, cli.mode, &run) {
        return write_failed(&e);
    }
    let _ = write_diagnostics(&mut io::stderr().lock(), &run.diagnostics);
    EXIT_SUCCESS
}

/// Parses and qualifies the input named by `file`.
fn load(file: &str, options: &QualifyOptions) -> Result<Qualification, Error> {
    let (_, run) = if file == "-" {
        let mut input = Vec::new();
        io::stdin()
            .read_to_end(&mut input)
            .map_err(|source| Error::Io {
                path: PathBuf::from(file),
                source,
            })?;
        qualify_bytes(&input, options)?
    } else {
        qualify_file(file, options)?
    };
    Ok(run)
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// Warns about settings that make a run slow.
fn advise(options: &QualifyOptions) {
    if options.max_items <= DEFAULT_MAX_ITEMS {
        return;
    }
    warn!(
        "max items set to {}, above the default of {DEFAULT_MAX_ITEMS}",
        options.max_items
    );
    if options.with_match_counts {
        warn!("counting evaluates one extra expression per node; this may take a while");
    }
}

/// Writes the run settings banner.
fn write_settings(
    out: &mut impl Write,
    show_banner: bool,
    cli: &Cli,
    options: &QualifyOptions,
) -> io::Result<()> {
    banner(out, show_banner, "Running...")?;
    banner(out, show_banner, format_args!("file: {}", cli.file))?;
    banner(out, show_banner, format_args!("mode: {}", cli.mode))?;
    banner(
        out,
        show_banner,
        format_args!("xpath_base: {}", options.start_expression),
    )?;
    banner(
        out,
        show_banner,
        format_args!("with_count: {}", options.with_match_counts),
    )?;
    banner(
        out,
        show_banner,
        format_args!("max_items: {}", options.max_items),
    )
}

/// Writes the namespace map, the report and the summary.
fn write_results(
    out: &mut impl Write,
    show_banner: bool,
    mode: Mode,
    run: &Qualification,
) -> io::Result<()> {
    banner(
        out,
        show_banner,
        format_args!("namespaces: {}", format_namespaces(&run.namespaces)),
    )?;
    banner(out, show_banner, "-".repeat(80))?;
    let summary = report::write_report(out, &run.table, mode)?;
    banner(out, show_banner, "-".repeat(80))?;
    banner(out, show_banner, summary)?;
    out.flush()
}

/// Writes one line per diagnostic of the run.
fn write_diagnostics(out: &mut impl Write, diagnostics: &[Diagnostic]) -> io::Result<()> {
    for diagnostic in diagnostics {
        writeln!(out, "{diagnostic}")?;
    }
    Ok(())
}

/// Writes a banner line unless banners are disabled.
fn banner(out: &mut impl Write, enabled: bool, line: impl Display) -> io::Result<()> {
    if enabled {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn write_failed(err: &io::Error) -> u8 {
    eprintln!("failed to write report: {err}");
    EXIT_FAILURE
}

fn format_namespaces(namespaces: &NamespaceMap) -> String {
    let pairs: Vec<String> = namespaces
        .prefixes()
        .map(|(prefix, uri)| format!("{prefix}={uri}"))
        .collect();
    format!("{{{}}}", pairs.join(", "))
}
