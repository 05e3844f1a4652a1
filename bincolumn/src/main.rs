//! Column command-line tool for checking and transcoding Column documents.
//!
//! Usage: column [OPTIONS] [FILE|DIR]
//!
//! Options:
//!   -f, --from <FORMAT>      Input format (column, json, yaml, toml) [default: column]
//!   -t, --to <FORMAT>        Output format (json, yaml, toml, xml, column) [default: json]
//!   -w, --write              Write output next to the input, one file per section
//!   -o, --output <FILE>      Write output to specified file
//!       --check              Check if input is valid (exit 0 if valid, 1 if invalid)
//!   -e, --env <KEY=VALUE>    Set an environment entry for `$_KEY` references
//!       --no-env             Do not read the process environment
//!       --lenient-indent     Round unknown dedent levels down instead of failing
//!   -v, --verbose            Log pipeline stages to stderr
//!
//! Logging honors `COLUMN_LOG` (an `EnvFilter` directive), defaulting to
//! `warn`.

use clap::{Parser, ValueEnum};
use libcolumn::{
    load_with_options, EnvProvider, IndentPolicy, LexOptions, ParseOptions, ProcessEnv, Value,
};
use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod transcode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Column,
    Json,
    #[value(alias = "yml")]
    Yaml,
    Toml,
    Xml,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Column => "col",
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Xml => "xml",
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "column", version, about = "Check and transcode Column documents")]
struct Cli {
    /// Input file or directory (reads from stdin if not provided).
    /// A directory is processed file by file (all *.col files in it).
    path: Option<PathBuf>,

    /// Input format
    #[arg(short, long, value_enum, default_value_t = Format::Column)]
    from: Format,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    to: Format,

    /// Write output next to the input with the output format's extension.
    /// Sectioned documents write one `<section>.<ext>` file per section.
    #[arg(short, long)]
    write: bool,

    /// Write output to specified file (not valid with directory input)
    #[arg(short, long, conflicts_with = "write")]
    output: Option<PathBuf>,

    /// Check if input is valid (exit 0 if valid, 1 if invalid)
    #[arg(long)]
    check: bool,

    /// Environment entry visible to `$_KEY` references; overrides the
    /// process environment
    #[arg(short, long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    env: Vec<(String, String)>,

    /// Do not read the process environment
    #[arg(long)]
    no_env: bool,

    /// Round a dedent to an unknown level down to the nearest open level
    #[arg(long)]
    lenient_indent: bool,

    /// Log pipeline stages to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_env_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got {:?}", s)),
    }
}

/// Command-line entries over (optionally) the process environment.
struct CliEnv {
    overrides: HashMap<String, String>,
    process: bool,
}

impl EnvProvider for CliEnv {
    fn get(&self, name: &str) -> Option<String> {
        match self.overrides.get(name) {
            Some(value) => Some(value.clone()),
            None if self.process => ProcessEnv.get(name),
            None => None,
        }
    }
}

/// Everything a single input needs, shared across directory entries.
struct Context {
    from: Format,
    to: Format,
    output: Option<PathBuf>,
    write: bool,
    check: bool,
    env: CliEnv,
    options: ParseOptions,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("COLUMN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let indent_policy = if cli.lenient_indent {
        IndentPolicy::RoundDown
    } else {
        IndentPolicy::Strict
    };
    let ctx = Context {
        from: cli.from,
        to: cli.to,
        output: cli.output,
        write: cli.write,
        check: cli.check,
        env: CliEnv {
            overrides: cli.env.into_iter().collect(),
            process: !cli.no_env,
        },
        options: ParseOptions {
            lex: LexOptions { indent_policy },
        },
    };

    if let Some(path) = &cli.path {
        if path.is_dir() {
            if ctx.output.is_some() {
                eprintln!("Error: --output cannot be used with directory input");
                process::exit(1);
            }
            process::exit(process_directory(path, &ctx));
        }
    }

    let input = match &cli.path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading stdin: {}", e);
                process::exit(1);
            }
            buffer
        }
    };

    process::exit(process_input(&input, cli.path.as_deref(), &ctx));
}

fn process_directory(dir: &Path, ctx: &Context) -> i32 {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("Error reading directory {}: {}", dir.display(), e);
            return 1;
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|e| e == "col").unwrap_or(false))
        .collect();
    paths.sort();

    let mut had_errors = false;
    for path in &paths {
        let input = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                had_errors = true;
                continue;
            }
        };
        if process_input(&input, Some(path), ctx) != 0 {
            had_errors = true;
        }
    }

    if had_errors {
        1
    } else {
        0
    }
}

/// One output document: the whole input, or one section of it.
struct Output {
    section: Option<String>,
    value: Value,
}

fn process_input(input: &str, input_file: Option<&Path>, ctx: &Context) -> i32 {
    let label = input_file
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stdin>".to_string());

    let (combined, sections) = match decode(input, ctx) {
        Ok(decoded) => decoded,
        Err(e) => {
            eprintln!("{}: {}", label, e);
            return 1;
        }
    };

    if ctx.check {
        println!("{}: ok", label);
        return 0;
    }

    // Sectioned documents written back produce one file per section.
    if ctx.write && !sections.is_empty() {
        let Some(input_path) = input_file else {
            eprintln!("Error: --write requires an input file");
            return 1;
        };
        for output in sections {
            let name = output.section.unwrap_or_default();
            let target = input_path.with_file_name(format!("{}.{}", name, ctx.to.extension()));
            if let Err(code) = render_and_write(&output.value, Some(&name), &target, ctx) {
                return code;
            }
        }
        return 0;
    }

    let rendered = match render(&combined, ctx.to, None) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{}: {}", label, e);
            return 1;
        }
    };

    match (&ctx.output, ctx.write, input_file) {
        (Some(path), _, _) => write_file(path, &rendered),
        (None, true, Some(input_path)) => {
            write_file(&input_path.with_extension(ctx.to.extension()), &rendered)
        }
        (None, true, None) => {
            eprintln!("Error: --write requires an input file");
            1
        }
        (None, false, _) => {
            print!("{}", rendered);
            if !rendered.ends_with('\n') {
                println!();
            }
            0
        }
    }
}

/// Decode the input into its combined value and, for sectioned Column
/// documents, the per-section outputs.
fn decode(input: &str, ctx: &Context) -> Result<(Value, Vec<Output>), String> {
    let value = match ctx.from {
        Format::Column => {
            let result =
                load_with_options(input, &ctx.env, &ctx.options).map_err(|e| e.to_string())?;
            if let Some(namespace) = &result.namespace {
                debug!("namespace {}", namespace);
            }
            let sections = if result.is_sectioned() {
                result
                    .outputs
                    .iter()
                    .map(|o| Output {
                        section: o.name.clone(),
                        value: o.value.clone(),
                    })
                    .collect()
            } else {
                Vec::new()
            };
            return Ok((result.into_value(), sections));
        }
        Format::Json => transcode::json::decode(input)?,
        Format::Yaml => transcode::yaml::decode(input)?,
        Format::Toml => transcode::toml::decode(input)?,
        Format::Xml => return Err("XML input is not supported".to_string()),
    };
    Ok((value, Vec::new()))
}

fn render(value: &Value, format: Format, section: Option<&str>) -> Result<String, String> {
    match format {
        Format::Column => Ok(libcolumn::encode(value)),
        Format::Json => transcode::json::encode(value),
        Format::Yaml => transcode::yaml::encode(value),
        Format::Toml => transcode::toml::encode(value),
        Format::Xml => transcode::xml::encode_with_root(value, section.unwrap_or("column")),
    }
}

fn render_and_write(
    value: &Value,
    section: Option<&str>,
    target: &Path,
    ctx: &Context,
) -> Result<(), i32> {
    let rendered = render(value, ctx.to, section).map_err(|e| {
        eprintln!("{}: {}", target.display(), e);
        1
    })?;
    match write_file(target, &rendered) {
        0 => Ok(()),
        code => Err(code),
    }
}

fn write_file(path: &Path, output: &str) -> i32 {
    if let Err(e) = fs::write(path, output) {
        eprintln!("Error writing {}: {}", path.display(), e);
        return 1;
    }
    debug!("wrote {}", path.display());
    0
}
