//! Runtime configuration: command line flags with environment fallbacks.
//!
//! `main` loads `.env` through dotenv before parsing, so every flag can also
//! be set there.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Largest stdout accepted from one `aws` CLI call.
pub const MAX_CLI_OUTPUT_BYTES: usize = 5_000_000;

/// Most `describe-subnets` calls in flight at once.
pub const MAX_CONCURRENT_QUERIES: usize = 4;

/// Region used when neither flag nor environment sets one.
pub const DEFAULT_REGION: &str = "us-west-2";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
}

/// Report IP address usage of VPC subnets.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Opts {
    /// AWS region to inventory.
    #[arg(long, env = "SUBNET_REPORT_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Report the default VPC(s) instead of custom VPCs.
    #[arg(long, env = "SUBNET_REPORT_DEFAULT_VPC")]
    pub default_vpc: bool,

    /// Inventory cache file. Must exist when given.
    #[arg(long, env = "SUBNET_REPORT_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    /// Always query AWS and do not write a cache file.
    #[arg(long, conflicts_with = "cache_file")]
    pub no_cache: bool,

    #[arg(long, value_enum, env = "SUBNET_REPORT_FORMAT", default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Opts::try_parse_from(["subnet-ip-usage"]).unwrap();
        assert!(!opts.default_vpc);
        assert!(!opts.no_cache);
        assert_eq!(opts.cache_file, None);
    }

    #[test]
    fn test_flags() {
        let opts = Opts::try_parse_from([
            "subnet-ip-usage",
            "--region",
            "eu-west-1",
            "--default-vpc",
            "--format",
            "csv",
        ])
        .unwrap();
        assert_eq!(opts.region, "eu-west-1");
        assert!(opts.default_vpc);
        assert_eq!(opts.format, OutputFormat::Csv);
    }

    #[test]
    fn test_no_cache_conflicts_with_cache_file() {
        let result = Opts::try_parse_from([
            "subnet-ip-usage",
            "--no-cache",
            "--cache-file",
            "x.json",
        ]);
        assert!(result.is_err());
    }
}
