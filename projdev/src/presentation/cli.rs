use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "projdev CLI: inspect and pack project folders", long_about = None)]
pub struct Cli {
    /// Directory holding the project folders
    #[arg(long, global = true, default_value = "projects")]
    pub root: PathBuf,

    /// Surface symlinks that stay inside the root
    #[arg(long, global = true)]
    pub allow_symlinks: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the immediate, non-hidden entries of a folder
    Ls {
        folder: String,
        /// print the same JSON rows the HTTP API returns
        #[arg(long)]
        json: bool,
        /// URL prefix used for the `path` field in JSON output
        #[arg(long, default_value = "/projects")]
        public_prefix: String,
    },

    /// Stream a folder's files into a zip archive ("-" writes to stdout)
    Pack {
        folder: String,
        out: PathBuf,
        #[arg(long, default_value_t = 64 * 1024)]
        chunk_size: usize,
    },
}
