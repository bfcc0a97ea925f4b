use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// timestamp LEVEL target: message
    Compact,
    /// JSON lines
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Serve project folders as listings and zip downloads", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "PROJD_BIND", default_value = "127.0.0.1:3000")]
    pub bind: SocketAddr,

    /// Directory holding one sub-directory per project
    #[arg(long, env = "PROJD_PROJECT_ROOT", default_value = "projects")]
    pub project_root: PathBuf,

    /// Directory served for every path the API does not handle (the UI)
    #[arg(long, env = "PROJD_STATIC_DIR", default_value = ".")]
    pub static_dir: PathBuf,

    /// URL prefix the raw project files are mounted under
    #[arg(long, env = "PROJD_PUBLIC_PREFIX", default_value = "/projects")]
    pub public_prefix: String,

    /// Bytes read from disk per step while building an archive
    #[arg(long, env = "PROJD_CHUNK_SIZE", default_value_t = 64 * 1024)]
    pub chunk_size: usize,

    /// Capacity of the pipe between the archive builder and the response body
    #[arg(long, env = "PROJD_STREAM_BUFFER", default_value_t = 64 * 1024)]
    pub stream_buffer: usize,

    /// List and archive symlinks that stay inside the project root
    #[arg(long, env = "PROJD_ALLOW_SYMLINKS")]
    pub allow_symlinks: bool,

    /// Base log level; RUST_LOG overrides it when set
    #[arg(long, env = "PROJD_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "PROJD_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// `/projects`, `projects/` and `//projects//` all become `/projects`.
    pub fn normalized_prefix(&self) -> Result<String, String> {
        let trimmed = self.public_prefix.trim_matches('/');
        if trimmed.is_empty() {
            return Err(format!(
                "public prefix {:?} would shadow the whole site",
                self.public_prefix
            ));
        }
        Ok(format!("/{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["projd-http"];
        argv.extend_from_slice(args);
        ServerConfig::try_parse_from(argv).unwrap()
    }

    #[test]
    fn defaults_match_the_documented_layout() {
        let cfg = parse(&["--project-root", "p", "--bind", "127.0.0.1:3000"]);
        assert_eq!(cfg.bind.port(), 3000);
        assert_eq!(cfg.project_root, PathBuf::from("p"));
        assert_eq!(cfg.normalized_prefix().unwrap(), "/projects");
    }

    #[test]
    fn prefix_is_normalized() {
        let cfg = parse(&["--public-prefix", "files/raw/"]);
        assert_eq!(cfg.normalized_prefix().unwrap(), "/files/raw");
    }

    #[test]
    fn root_prefix_is_rejected() {
        let cfg = parse(&["--public-prefix", "/"]);
        assert!(cfg.normalized_prefix().is_err());
    }

    #[test]
    fn log_format_parses() {
        let cfg = parse(&["--log-format", "json"]);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }
}
