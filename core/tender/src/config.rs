use clap::Parser;
use std::time::Duration;

use tf_persistence::DbOptions;

#[derive(Parser, Clone, Debug)]
pub struct Config {
    #[clap(flatten)]
    pub decision: DecisionConfig,
    #[clap(flatten)]
    pub pagination: PaginationConfig,
    #[clap(flatten)]
    pub db: DbConfig,
}

#[derive(Parser, Clone, Debug)]
pub struct DecisionConfig {
    /// Upper bound of approvals needed to accept a bid
    #[clap(long, env = "TENDER_QUORUM_CAP", default_value = "3")]
    pub quorum_cap: u32,
}

#[derive(Parser, Clone, Debug)]
pub struct PaginationConfig {
    #[clap(long, env = "TENDER_PAGE_LIMIT_DEFAULT", default_value = "5")]
    pub page_limit_default: i64,
    #[clap(long, env = "TENDER_PAGE_LIMIT_MAX", default_value = "100")]
    pub page_limit_max: i64,
}

#[derive(Parser, Clone, Debug)]
pub struct DbConfig {
    /// How long a connection waits for the database write lock
    #[clap(long, env = "TENDER_DB_BUSY_TIMEOUT", value_parser = humantime::parse_duration, default_value = "5s")]
    pub busy_timeout: Duration,
    #[clap(long, env = "TENDER_DB_POOL_SIZE", default_value = "8")]
    pub pool_size: u32,
}

impl DbConfig {
    pub fn options(&self) -> DbOptions {
        DbOptions {
            busy_timeout: self.busy_timeout,
            pool_size: self.pool_size,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config, clap::Error> {
        // Empty command line arguments, because we want to use ENV fallback
        // or default values if ENV variables are not set.
        Config::try_parse_from([""])
    }
}
