//! urify CLI
//!
//! Dissect and filter URLs read one per line from stdin.

mod error;
mod logging;
mod pipeline;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use urify_core::{FilterCategory, FilterSpec, Mode, SuffixList};

use crate::error::CliError;
use crate::pipeline::{Output, Pipeline};

#[derive(Parser)]
#[command(name = "urify", version)]
#[command(about = "Dissect and filter URLs provided on stdin")]
struct Cli {
    /// Public suffix list file replacing the built-in rules
    #[arg(long, global = true, env = "URIFY_PSL", value_name = "FILE")]
    psl: Option<PathBuf>,

    /// Read URLs from a file instead of stdin
    #[arg(short, long, global = true, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Retrieve keys from the query string, one per line
    Keys,

    /// Retrieve values from the query string, one per line
    Values,

    /// Retrieve key=value pairs from the query string, one per line
    Params,

    /// Retrieve the path (e.g. /users/me)
    Path,

    /// Retrieve the apex domain (e.g. github.com)
    Apex,

    /// Retrieve the fully qualified domain name (e.g. api.github.com)
    Fqdn,

    /// JSON encode the dissected URL
    Json,

    /// Refine URLs using component filters
    ///
    /// Filters act as an allow-list and a URL passes when any filtered
    /// component matches. Add --absolute to require every component and
    /// --inverse to treat the filters as a deny-list.
    Filter(FilterArgs),
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Schemes (e.g. http https)
    #[arg(long, num_args = 1.., value_name = "SCHEME")]
    scheme: Vec<String>,

    /// Subdomains (e.g. abc abc.xyz)
    #[arg(long = "sub", num_args = 1.., value_name = "SUBDOMAIN")]
    subdomain: Vec<String>,

    /// Domains (e.g. github youtube)
    #[arg(long, num_args = 1.., value_name = "DOMAIN")]
    domain: Vec<String>,

    /// Top level domains (e.g. in com co.uk)
    #[arg(long, num_args = 1.., value_name = "TLD")]
    tld: Vec<String>,

    /// File extensions (e.g. pdf html)
    #[arg(long = "ext", num_args = 1.., value_name = "EXTENSION")]
    extension: Vec<String>,

    /// Ports (e.g. 22 8080)
    #[arg(long, num_args = 1.., value_name = "PORT")]
    port: Vec<String>,

    /// Apex domains (e.g. github.com youtube.com)
    #[arg(long, num_args = 1.., value_name = "APEX")]
    apex: Vec<String>,

    /// Fully qualified domain names (e.g. api.github.com)
    #[arg(long, num_args = 1.., value_name = "FQDN")]
    fqdn: Vec<String>,

    /// Process filters as a deny-list
    #[arg(long)]
    inverse: bool,

    /// Require every filter category to match
    #[arg(long)]
    absolute: bool,

    /// Print this projection of passing URLs instead of the URL itself
    #[arg(long, value_enum, value_name = "MODE")]
    dissect: Option<DissectMode>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum DissectMode {
    Keys,
    Values,
    Params,
    Path,
    Apex,
    Fqdn,
    Json,
}

impl From<DissectMode> for Mode {
    fn from(mode: DissectMode) -> Self {
        match mode {
            DissectMode::Keys => Mode::Keys,
            DissectMode::Values => Mode::Values,
            DissectMode::Params => Mode::Params,
            DissectMode::Path => Mode::Path,
            DissectMode::Apex => Mode::Apex,
            DissectMode::Fqdn => Mode::Fqdn,
            DissectMode::Json => Mode::Json,
        }
    }
}

impl FilterArgs {
    fn to_spec(&self) -> FilterSpec {
        FilterSpec::new()
            .with(FilterCategory::Scheme, &self.scheme)
            .with(FilterCategory::Subdomain, &self.subdomain)
            .with(FilterCategory::Domain, &self.domain)
            .with(FilterCategory::Tld, &self.tld)
            .with(FilterCategory::Extension, &self.extension)
            .with(FilterCategory::Port, &self.port)
            .with(FilterCategory::Apex, &self.apex)
            .with(FilterCategory::Fqdn, &self.fqdn)
            .inverse(self.inverse)
            .absolute(self.absolute)
    }

    fn output(&self) -> Output {
        match self.dissect {
            Some(mode) => Output::Mode(mode.into()),
            None => Output::Original,
        }
    }
}

impl Commands {
    /// Filter and output selection for this command.
    fn plan(&self) -> (Option<FilterSpec>, Output) {
        let mode = match self {
            Commands::Keys => Mode::Keys,
            Commands::Values => Mode::Values,
            Commands::Params => Mode::Params,
            Commands::Path => Mode::Path,
            Commands::Apex => Mode::Apex,
            Commands::Fqdn => Mode::Fqdn,
            Commands::Json => Mode::Json,
            Commands::Filter(args) => return (Some(args.to_spec()), args.output()),
        };
        (None, Output::Mode(mode))
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("Warning: {e}");
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let custom = match &cli.psl {
        Some(path) => Some(SuffixList::from_file(path)?),
        None => None,
    };
    let list = suffix_list(custom.as_ref());

    let (filter, output) = cli.command.plan();
    if let Some(spec) = &filter {
        info!(
            "filtering on [{}] with flags {:?}",
            spec.categories().map(|c| c.as_str()).collect::<Vec<_>>().join(", "),
            spec.flags()
        );
    }

    let pipeline = Pipeline::new(list, filter, output);
    let stdout = io::stdout();

    let stats = match &cli.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Input {
                path: path.display().to_string(),
                source,
            })?;
            pipeline.run(BufReader::new(file), stdout.lock())?
        }
        None => pipeline.run(io::stdin().lock(), stdout.lock())?,
    };

    info!(
        "{} urls read, {} lines written, {} rejected",
        stats.read, stats.emitted, stats.rejected
    );
    Ok(())
}

/// A loaded list, or the built-in rules when none was given.
fn suffix_list(custom: Option<&SuffixList>) -> &SuffixList {
    match custom {
        Some(list) => list,
        None => SuffixList::builtin(),
    }
}
