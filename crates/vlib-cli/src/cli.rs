use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vlib",
    about = "Virtual Library: shelve books in bookcases and give them covers",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to ./vlib.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory from the config
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the library and its first bookcase
    Init(InitArgs),
    /// Show shelf usage
    Status(StatusArgs),
    /// List books in shelf order
    List(ListArgs),
    /// Show one book
    Show(ShowArgs),
    /// Add a book to the first free slot
    Add(AddArgs),
    /// Move a book to another slot
    Move(MoveArgs),
    /// Delete a book
    Delete(DeleteArgs),
    /// Add an empty bookcase
    AddBookcase(AddBookcaseArgs),
    /// List free slots
    Slots(SlotsArgs),
    /// Show where the next book will go
    NextSlot(NextSlotArgs),
    /// Generate a new cover for a book
    Cover(CoverArgs),
    /// Replace the library with an exported file
    Import(ImportArgs),
    /// Export the library as JSON
    Export(ExportArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Also write the effective config to ./vlib.toml
    #[arg(long)]
    pub write_config: bool,
}

#[derive(Args)]
pub struct StatusArgs {}

#[derive(Args)]
pub struct ListArgs {}

#[derive(Args)]
pub struct ShowArgs {
    /// Book id or unique id prefix
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    pub title: String,
    pub author: String,
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Use this cover locator instead of generating one
    #[arg(long)]
    pub cover_url: Option<String>,
    /// Embed this image file as the cover
    #[arg(long, conflicts_with = "cover_url")]
    pub cover_file: Option<PathBuf>,
}

#[derive(Args)]
pub struct MoveArgs {
    pub id: String,
    pub bookcase: String,
    pub shelf: u32,
    pub slot: u32,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: String,
}

#[derive(Args)]
pub struct AddBookcaseArgs {}

#[derive(Args)]
pub struct SlotsArgs {
    #[arg(short = 'n', long, default_value = "20")]
    pub limit: usize,
}

#[derive(Args)]
pub struct NextSlotArgs {}

#[derive(Args)]
pub struct CoverArgs {
    pub id: String,
}

#[derive(Args)]
pub struct ImportArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file or directory; prints to stdout when omitted
    pub file: Option<PathBuf>,
}
