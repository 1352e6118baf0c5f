use replay::model::{Delimiter, ViewKind};
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    path: Option<PathBuf>,
    delimiter: Option<Delimiter>,
    view: Option<ViewKind>,
}

fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    let Some(path) = args.path else {
        print_help();
        anyhow::bail!("an input file is required");
    };

    replay::app::run(replay::app::AppOptions {
        path,
        delimiter: args.delimiter.unwrap_or(Delimiter::Comma),
        initial_view: args.view,
    })
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--delimiter" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--delimiter requires a value");
                };
                out.delimiter = Some(parse_delimiter(value)?);
            }
            "--view" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--view requires a value");
                };
                let Some(view) = ViewKind::from_name(value) else {
                    anyhow::bail!(
                        "unknown view {value}; use artist, track, daywise, hourly or stats"
                    );
                };
                out.view = Some(view);
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with('-') => anyhow::bail!("unknown argument {other}"),
            other => {
                if out.path.is_some() {
                    anyhow::bail!("only one input file is supported");
                }
                out.path = Some(PathBuf::from(other));
            }
        }
        index += 1;
    }
    Ok(out)
}

fn parse_delimiter(value: &str) -> anyhow::Result<Delimiter> {
    match value {
        "comma" | "," => Ok(Delimiter::Comma),
        "tab" | "\t" | "\\t" => Ok(Delimiter::Tab),
        "semicolon" | ";" => Ok(Delimiter::Semicolon),
        other if other.len() == 1 && other.is_ascii() => {
            Ok(Delimiter::Custom(other.as_bytes()[0]))
        }
        other => anyhow::bail!("delimiter must be a single ASCII character, got {other:?}"),
    }
}

fn print_help() {
    println!("Replay - streaming history explorer");
    println!("  replay <file.json|file.csv> [options]");
    println!("  --delimiter comma|tab|semicolon|<char>   Delimiter for text input");
    println!("  --view artist|track|daywise|hourly|stats Initial view");
}
