use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tools::{check_schema, decode_value, encode_value, load_schema, parse_hex};

#[derive(Parser)]
#[command(
    name = "ridl-tools",
    version,
    about = "ridl schema checking and value transcoding"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile schema roots and report what they declare.
    Check {
        /// Glob patterns naming schema root modules (AST JSON).
        #[arg(required = true)]
        patterns: Vec<String>,
        /// Emit the report as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Encode a JSON value against a schema type.
    Encode {
        /// Schema root module (AST JSON).
        #[arg(long)]
        schema: PathBuf,
        /// Dotted type name to encode as.
        #[arg(long = "type")]
        type_name: String,
        /// JSON value file; `-` reads stdin.
        value: PathBuf,
        /// Where to write the bytes; hex to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decode wire bytes against a schema type.
    Decode {
        /// Schema root module (AST JSON).
        #[arg(long)]
        schema: PathBuf,
        /// Dotted type name to decode as.
        #[arg(long = "type")]
        type_name: String,
        /// Bytes to decode.
        input: PathBuf,
        /// How to interpret the input file.
        #[arg(long, value_enum, default_value_t = InputFormat::Raw)]
        format: InputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InputFormat {
    /// Raw bytes.
    Raw,
    /// Hex text, whitespace ignored.
    Hex,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Check { patterns, json } => {
            let mut roots = Vec::new();
            for pattern in &patterns {
                let matched: Vec<_> = glob::glob(pattern)
                    .with_context(|| format!("invalid glob {pattern}"))?
                    .collect::<std::result::Result<_, _>>()
                    .context("walk glob matches")?;
                if matched.is_empty() {
                    bail!("pattern {pattern} matched no files");
                }
                roots.extend(matched);
            }
            for root in roots {
                let report = check_schema(&root)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    println!(
                        "{}: {} modules, hash {}",
                        report.root, report.modules, report.content_hash
                    );
                    for entry in &report.definitions {
                        println!("  {:<10} {}::{}", entry.kind, entry.module, entry.name);
                    }
                }
            }
        }
        Command::Encode {
            schema,
            type_name,
            value,
            out,
        } => {
            let schema = load_schema(&schema)?;
            let json = read_json(&value)?;
            let bytes = encode_value(&schema, &type_name, &json)?;
            match out {
                Some(path) => {
                    fs::write(&path, &bytes)
                        .with_context(|| format!("write {}", path.display()))?;
                }
                None => {
                    for byte in &bytes {
                        print!("{byte:02x}");
                    }
                    println!();
                }
            }
        }
        Command::Decode {
            schema,
            type_name,
            input,
            format,
        } => {
            let schema = load_schema(&schema)?;
            let raw = fs::read(&input).with_context(|| format!("read {}", input.display()))?;
            let bytes = match format {
                InputFormat::Raw => raw,
                InputFormat::Hex => {
                    parse_hex(std::str::from_utf8(&raw).context("hex input is not text")?)?
                }
            };
            let json = decode_value(&schema, &type_name, &bytes)?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}

fn read_json(path: &PathBuf) -> Result<serde_json::Value> {
    let contents = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("read stdin")?
    } else {
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
    };
    serde_json::from_str(&contents).context("parse json value")
}
