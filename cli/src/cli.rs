use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "oxshape")]
/// OxShape command line toolkit
///
/// Shapes and data are read as JSON documents.
/// Set the RUST_LOG environment variable to enable logging (e.g. RUST_LOG=debug).
pub struct Args {
    /// Format of the log events written to stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate data against a shape
    ///
    /// Guards of the shape are first redacted using the given bindings.
    /// The violations are written to stdout and the command fails if there is any.
    Validate {
        /// File containing the shape
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        shape: PathBuf,
        /// File containing the data
        ///
        /// If no file is given, stdin is read.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        data: Option<PathBuf>,
        #[command(flatten)]
        bindings: Bindings,
    },
    /// Compile a query against a base shape
    Compile {
        /// File containing the base shape
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        shape: PathBuf,
        /// The query, as URL query parameters or as a JSON object
        query: String,
    },
    /// Redact the guards of a shape and optimize the result
    Redact {
        /// File containing the shape
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        shape: PathBuf,
        #[command(flatten)]
        bindings: Bindings,
    },
    /// Keep only the branches of a shape relevant to a mode
    Prune {
        /// File containing the shape
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        shape: PathBuf,
        /// The mode to keep
        #[arg(long, value_enum)]
        mode: Mode,
    },
    /// Write the statements described by a shape for the given focus resources as N-Triples
    Outline {
        /// File containing the shape
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        shape: PathBuf,
        /// IRIs of the focus resources
        #[arg(short, long, num_args = 1.., required = true, value_hint = ValueHint::Url)]
        focus: Vec<String>,
    },
    /// Optimize a shape
    Optimize {
        /// File containing the shape
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        shape: PathBuf,
    },
    /// Add the constraints implied by a shape and optimize the result
    Expand {
        /// File containing the shape
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        shape: PathBuf,
    },
}

/// Values accepted on each guard axis.
///
/// `*` accepts any value. Axes without values are left untouched.
#[derive(ClapArgs, Default)]
pub struct Bindings {
    /// Roles of the user
    #[arg(long, value_delimiter = ',')]
    pub role: Vec<String>,
    /// Task being performed (create, relate, update, delete)
    #[arg(long, value_delimiter = ',')]
    pub task: Vec<String>,
    /// Area of the resource (target, digest, detail)
    #[arg(long, value_delimiter = ',')]
    pub area: Vec<String>,
    /// Mode of the shape (convey, filter)
    #[arg(long, value_delimiter = ',')]
    pub mode: Vec<String>,
    /// Views of the resource
    #[arg(long, value_delimiter = ',')]
    pub view: Vec<String>,
}

#[derive(Copy, Clone, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, ValueEnum)]
pub enum Mode {
    Convey,
    Filter,
}
