pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use projd_core::Result;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ls {
            folder,
            json,
            public_prefix,
        } => handlers::handle_ls(cli.root, folder, json, public_prefix, cli.allow_symlinks),
        Commands::Pack {
            folder,
            out,
            chunk_size,
        } => handlers::handle_pack(cli.root, folder, out, chunk_size, cli.allow_symlinks),
    }
}
