use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;
use weft_core::CompilationUnit;
use weft_core::script::{EventScript, load_event_script, load_event_scripts, parse_event_script};

/// Replays recorded construction events and prints the built program tree.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        help = "Event script or directory of *.events files (defaults to stdin)"
    )]
    input: Option<String>,

    #[arg(short, long, help = "Output file (defaults to stdout)")]
    output: Option<String>,

    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "json",
        help = "Output format: json, debug"
    )]
    emit: String,

    #[arg(long, help = "Only replay the scripts and print one summary line each")]
    check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emit {
    Json,
    Debug,
}

impl Emit {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "json" => Ok(Emit::Json),
            "debug" => Ok(Emit::Debug),
            other => bail!("unsupported emit format: {other}"),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::WARN.into()))
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    let emit = Emit::parse(&cli.emit)?;
    let (scripts, is_dir) = read_scripts(cli.input.as_deref())?;

    if cli.check {
        let report = check_scripts(&scripts)?;
        return write_output(cli.output.as_deref(), report.as_bytes());
    }

    let mut built = Vec::with_capacity(scripts.len());
    for script in &scripts {
        debug!(path = %script.path.display(), events = script.events.len(), "replaying script");
        let unit = script
            .replay()
            .with_context(|| format!("failed to build {}", script.path.display()))?;
        built.push((script.path.as_path(), unit));
    }

    let rendered = match emit {
        Emit::Json => render_json(&built, is_dir)?,
        Emit::Debug => render_debug(&built, is_dir),
    };
    write_output(cli.output.as_deref(), rendered.as_bytes())
}

fn read_scripts(input: Option<&str>) -> Result<(Vec<EventScript>, bool)> {
    match input {
        Some(path) if Path::new(path).is_dir() => {
            let scripts = load_event_scripts(path)
                .with_context(|| format!("failed to load event scripts under {path}"))?;
            Ok((scripts, true))
        }
        Some(path) => {
            let script = load_event_script(path)
                .with_context(|| format!("failed to read input file {path}"))?;
            Ok((vec![script], false))
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            let events = parse_event_script(&buffer).context("failed to parse stdin")?;
            let script = EventScript {
                path: PathBuf::from("<stdin>"),
                events,
            };
            Ok((vec![script], false))
        }
    }
}

fn check_scripts(scripts: &[EventScript]) -> Result<String> {
    let mut report = String::new();
    let mut failed = 0;
    for script in scripts {
        let path = script.path.display();
        match script.replay() {
            Ok(unit) => report.push_str(&format!("{path}: ok ({})\n", summary(&unit))),
            Err(err) => {
                failed += 1;
                report.push_str(&format!("{path}: error: {err}\n"));
            }
        }
    }
    if failed > 0 {
        eprint!("{report}");
        bail!("{failed} of {} scripts failed", scripts.len());
    }
    Ok(report)
}

fn summary(unit: &CompilationUnit) -> String {
    format!(
        "{} functions, {} services, {} connectors, {} structs",
        unit.functions.len(),
        unit.services.len(),
        unit.connectors.len(),
        unit.structs.len()
    )
}

fn render_json(built: &[(&Path, CompilationUnit)], keyed: bool) -> Result<String> {
    let mut text = if keyed {
        let mut map = serde_json::Map::new();
        for (path, unit) in built {
            map.insert(path.display().to_string(), serde_json::to_value(unit)?);
        }
        serde_json::to_string_pretty(&map)?
    } else {
        match built.first() {
            Some((_, unit)) => serde_json::to_string_pretty(unit)?,
            None => String::from("null"),
        }
    };
    text.push('\n');
    Ok(text)
}

fn render_debug(built: &[(&Path, CompilationUnit)], keyed: bool) -> String {
    let mut text = String::new();
    for (path, unit) in built {
        if keyed {
            text.push_str(&format!("// {}\n", path.display()));
        }
        text.push_str(&format!("{unit:#?}\n"));
    }
    text
}

fn write_output(path: Option<&str>, bytes: &[u8]) -> Result<()> {
    let Some(path) = path else {
        io::Write::write_all(&mut io::stdout(), bytes)?;
        return Ok(());
    };
    if let Some(parent) = PathBuf::from(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("failed to write output file {path}"))?;
    Ok(())
}
