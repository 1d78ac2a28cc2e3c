use clap::Parser as ClapParser;
use dictify_js::cli::{self, CliError, ExtractOptions, Input};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "dictify")]
#[command(about = "Extract object literals from JS/TS source files as JSON")]
#[command(version)]
struct Cli {
    /// Source files (reads stdin if none are given)
    files: Vec<PathBuf>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,

    /// Only keep bindings whose name matches this regex
    #[arg(long, value_name = "REGEX")]
    only: Option<String>,

    /// Maximum literal nesting depth
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Also collect declarations inside blocks and functions
    #[arg(long)]
    nested: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let input = if !cli.files.is_empty() {
        Some(Input::Files(cli.files))
    } else if !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Some(Input::Source(buffer))
    } else {
        None
    };

    let options = ExtractOptions {
        input,
        only: cli.only,
        max_depth: cli.max_depth,
        nested: cli.nested,
    };

    let output = cli::execute_extract(&options)?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }
    .map_err(io::Error::from)?;
    println!("{}", json);
    Ok(())
}
