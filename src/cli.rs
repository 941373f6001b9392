//! Command line interface for the membership node.
//!
//! Every flag can also be supplied through a `CLIP_*` environment variable,
//! which is how containerized deployments configure nodes.

use clap::Parser;

use crate::config::Config;

/// Peer-to-peer cluster membership node
#[derive(Parser, Debug)]
#[command(name = "clip", version, about = "Peer-to-peer cluster membership node")]
pub struct Args {
    /// Unique identifier for this service instance
    #[arg(long, env = "CLIP_ID")]
    pub id: String,

    /// IP address to bind to (0.0.0.0 for all interfaces)
    #[arg(long = "address", default_value = "0.0.0.0", env = "CLIP_BIND_ADDRESS")]
    pub address: String,

    /// IP address to advertise to other peers (auto-detected if not specified)
    #[arg(long, default_value = "", env = "CLIP_ADVERTISE_ADDRESS")]
    pub advertise: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080, env = "CLIP_PORT")]
    pub port: u16,

    /// Comma-separated list of seed node addresses
    /// (e.g. http://192.168.1.100:8080,http://192.168.1.101:8080)
    #[arg(long, default_value = "", env = "CLIP_SEED_NODES")]
    pub seeds: String,

    /// Log level (debug, info, warn, error)
    #[arg(long = "log-level", default_value = "info", env = "CLIP_LOG_LEVEL")]
    pub log_level: String,

    /// Log format (text, json)
    #[arg(long = "log-format", default_value = "text", env = "CLIP_LOG_FORMAT")]
    pub log_format: String,
}

impl Args {
    pub fn into_config(self) -> Config {
        Config {
            id: self.id,
            bind_address: self.address,
            advertise_address: self.advertise,
            port: self.port,
            seed_nodes: parse_seed_list(&self.seeds),
            log_level: self.log_level,
            log_format: self.log_format,
            ..Config::default()
        }
    }
}

/// Splits a comma-separated seed list, trimming whitespace around entries.
pub fn parse_seed_list(seeds: &str) -> Vec<String> {
    seeds
        .split(',')
        .map(str::trim)
        .filter(|seed| !seed.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed_list_trims_entries() {
        let seeds = parse_seed_list("http://a:8080, http://b:8081 ,http://c:8082");
        assert_eq!(seeds, vec!["http://a:8080", "http://b:8081", "http://c:8082"]);
    }

    #[test]
    fn test_parse_seed_list_empty() {
        assert!(parse_seed_list("").is_empty());
        assert!(parse_seed_list(" , ").is_empty());
    }

    #[test]
    fn test_args_into_config() {
        let args = Args::try_parse_from([
            "clip",
            "--id",
            "node-1",
            "--port",
            "9090",
            "--seeds",
            "http://10.0.0.1:8080",
        ])
        .unwrap();

        let config = args.into_config();
        assert_eq!(config.id, "node-1");
        assert_eq!(config.port, 9090);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.seed_nodes, vec!["http://10.0.0.1:8080"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_id_is_required() {
        assert!(Args::try_parse_from(["clip"]).is_err());
    }
}
