mod output;
mod source;

use fabdiag::render::{Format, Layout, PipelineError, RenderOptions, StyleName};
use serde::Serialize;
use source::{LiveSource, Source};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Config(fabdiag::render::Error),
    Io(std::io::Error),
    Records(fabdiag::Error),
    Json(serde_json::Error),
    Live(String),
    NoRecords,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Config(err) => write!(f, "{err}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Records(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::Live(msg) => write!(f, "Live source error: {msg}"),
            CliError::NoRecords => write!(f, "No wiring records found"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<fabdiag::Error> for CliError {
    fn from(value: fabdiag::Error) -> Self {
        Self::Records(value)
    }
}

impl From<fabdiag::render::Error> for CliError {
    fn from(value: fabdiag::render::Error) -> Self {
        match value {
            fabdiag::render::Error::Json(err) => Self::Json(err),
            other => Self::Config(other),
        }
    }
}

impl From<PipelineError> for CliError {
    fn from(value: PipelineError) -> Self {
        match value {
            PipelineError::Records(err) => Self::Records(err),
            PipelineError::Render(err) => err.into(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Command {
    #[default]
    Render,
    Parse,
    Layout,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    options: RenderOptions,
    out: Option<String>,
    print: bool,
    pretty: bool,
    verbose: bool,
    require_records: bool,
    live: bool,
    kubeconfig: Option<String>,
    resources: Option<String>,
}

fn usage() -> &'static str {
    "fabdiag-cli\n\
\n\
USAGE:\n\
  fabdiag-cli [render] [--format drawio|dot|mermaid] [--style default|cisco|hedgehog] [--out <path>] [--print] [--require-records] [-v] [<path>|-]\n\
  fabdiag-cli parse [--pretty] [-v] [<path>|-]\n\
  fabdiag-cli layout [--pretty] [-v] [<path>|-]\n\
  fabdiag-cli <command> --live [--kubeconfig <path>] [--resources <kinds>] ...\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', records are read from stdin.\n\
  - --live reads records with `kubectl get <kinds> -o yaml` instead of a file.\n\
  - render writes diagram.drawio, diagram.dot or diagram.mmd unless --out or --print is given.\n\
  - --style only changes draw.io output but is validated for every format.\n\
  - parse prints the extracted topology as JSON; layout prints node boxes and edge anchors.\n\
  - FABDIAG_LOG sets the log filter (default: warn); -v raises it to debug.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "render" => args.command = Command::Render,
            "parse" => args.command = Command::Parse,
            "layout" => args.command = Command::Layout,
            "--pretty" => args.pretty = true,
            "--print" => args.print = true,
            "--live" => args.live = true,
            "--require-records" => args.require_records = true,
            "-v" | "--verbose" => args.verbose = true,
            "--format" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options.format = v.parse::<Format>()?;
            }
            "--style" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options.style = v.parse::<StyleName>()?;
            }
            "--out" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(v.clone());
            }
            "--kubeconfig" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.kubeconfig = Some(v.clone());
            }
            "--resources" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                if v.trim().is_empty() {
                    return Err(CliError::Usage(usage()));
                }
                args.resources = Some(v.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.live && args.input.is_some() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("FABDIAG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn source_of(args: &Args) -> Source {
    if args.live {
        let mut live = LiveSource::default();
        if let Some(resources) = &args.resources {
            live.resources = resources.clone();
        }
        live.kubeconfig = args.kubeconfig.clone();
        return Source::Live(live);
    }
    match args.input.as_deref() {
        None | Some("-") => Source::Stdin,
        Some(path) => Source::File(path.to_string()),
    }
}

fn write_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    use std::io::Write;

    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(&mut stdout)?;
    Ok(())
}

fn write_text(text: &str) -> Result<(), CliError> {
    use std::io::Write;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    Ok(())
}

fn output_path(args: &Args) -> PathBuf {
    args.out
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(args.options.format.default_file_name()))
}

fn run(args: Args) -> Result<(), CliError> {
    let text = source_of(&args).read()?;
    let records = fabdiag::parse_records(&text)?;
    tracing::debug!(records = records.len(), "parsed record stream");
    if records.is_empty() && args.require_records {
        return Err(CliError::NoRecords);
    }

    match args.command {
        Command::Parse => {
            let topology = fabdiag::extract_topology(&records);
            write_json(&topology, args.pretty)
        }
        Command::Layout => {
            let topology = fabdiag::extract_topology(&records);
            let layout = Layout::compute(&topology);
            write_json(&layout.to_json()?, args.pretty)
        }
        Command::Render => {
            let diagram = fabdiag::render::render_records(&records, &args.options)?;
            if args.print {
                return write_text(&diagram);
            }
            let path = output_path(&args);
            output::write_atomic(&path, &diagram)?;
            tracing::info!(
                path = %path.display(),
                format = %args.options.format,
                bytes = diagram.len(),
                "wrote diagram"
            );
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(err @ (CliError::Usage(_) | CliError::Config(_))) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_logging(args.verbose);

    match run(args) {
        Ok(()) => {}
        Err(CliError::NoRecords) => {
            eprintln!("{}", CliError::NoRecords);
            std::process::exit(3);
        }
        Err(err @ CliError::Config(_)) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
