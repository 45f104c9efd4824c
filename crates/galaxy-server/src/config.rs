use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::time::Duration;
use galaxy_auth::JwtConfig;
use std::{net::SocketAddr, path::PathBuf};

/// How a request waits out an exhausted sequence without blocking the
/// runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SequenceWait {
    /// Yield back to the scheduler and poll again.
    #[default]
    Yield,
    /// Sleep on a timer for the generator's hint (one millisecond).
    Sleep,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Runtime configuration for the `galaxy-server` binary.
///
/// Every value can be given as a flag or through the environment (a `.env`
/// file is loaded first if present).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "galaxy-server",
    version,
    about = "Galaxy ID generation and session revocation service"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Explicit worker ID (0-31). When absent or invalid, the last octet of
    /// the host's first non-loopback IPv4 address is used.
    ///
    /// Environment variable: `SNOWFLAKE_WORKER_ID`
    #[arg(long, env = "SNOWFLAKE_WORKER_ID")]
    pub worker_id: Option<String>,

    /// Explicit datacenter ID (0-31). When absent or invalid, a hash of the
    /// hostname is used.
    ///
    /// Environment variable: `SNOWFLAKE_DATACENTER_ID`
    #[arg(long, env = "SNOWFLAKE_DATACENTER_ID")]
    pub datacenter_id: Option<String>,

    /// HMAC secret for session tokens. At least 32 bytes.
    ///
    /// Environment variable: `JWT_SECRET`
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: String,

    /// Lifetime of issued session tokens, in hours.
    ///
    /// Environment variable: `JWT_EXPIRE_HOURS`
    #[arg(long, env = "JWT_EXPIRE_HOURS", default_value_t = 24)]
    pub jwt_expire_hours: u64,

    /// Redis holding the deny-list and invalidation marks. Without it,
    /// revocation state lives in process memory and is not shared.
    ///
    /// Environment variable: `REDIS_URL`
    #[arg(long, env = "REDIS_URL", hide_env_values = true)]
    pub redis_url: Option<String>,

    /// JSON array of `{account_id, username, password_hash}` loaded at
    /// startup. Accounts registered at runtime are kept in memory only.
    ///
    /// Environment variable: `ACCOUNTS_FILE`
    #[arg(long, env = "ACCOUNTS_FILE")]
    pub accounts_file: Option<PathBuf>,

    /// How long an account's "log out everywhere" mark is kept, in days.
    ///
    /// Environment variable: `INVALIDATION_TTL_DAYS`
    #[arg(long, env = "INVALIDATION_TTL_DAYS", default_value_t = 365)]
    pub invalidation_ttl_days: u64,

    /// Wait strategy when 4096 IDs are requested within one millisecond.
    ///
    /// Environment variable: `SEQUENCE_WAIT`
    #[arg(long, env = "SEQUENCE_WAIT", value_enum, default_value_t = SequenceWait::Yield)]
    pub sequence_wait: SequenceWait,

    /// Log output format. Filtering follows `RUST_LOG` (default `info`).
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: SocketAddr,
    pub worker_id: Option<String>,
    pub datacenter_id: Option<String>,
    pub jwt: JwtConfig,
    pub redis_url: Option<String>,
    pub accounts_file: Option<PathBuf>,
    pub invalidation_ttl: Duration,
    pub sequence_wait: SequenceWait,
    pub log_format: LogFormat,
}

const SECS_PER_DAY: u64 = 24 * 60 * 60;

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let Ok(server_addr) = args.server_addr.parse::<SocketAddr>() else {
            bail!("SERVER_ADDR ({}) is not a socket address", args.server_addr);
        };

        let jwt = JwtConfig::new(args.jwt_secret, args.jwt_expire_hours);
        if let Err(e) = jwt.validate() {
            bail!("JWT_SECRET / JWT_EXPIRE_HOURS rejected: {e}");
        }

        if args.invalidation_ttl_days == 0 {
            bail!("INVALIDATION_TTL_DAYS must be greater than 0");
        }
        let Some(ttl_secs) = args.invalidation_ttl_days.checked_mul(SECS_PER_DAY) else {
            bail!(
                "INVALIDATION_TTL_DAYS ({}) is too large",
                args.invalidation_ttl_days
            );
        };

        let redis_url = args.redis_url.filter(|url| !url.trim().is_empty());

        Ok(Self {
            server_addr,
            worker_id: args.worker_id,
            datacenter_id: args.datacenter_id,
            jwt,
            redis_url,
            accounts_file: args.accounts_file,
            invalidation_ttl: Duration::from_secs(ttl_secs),
            sequence_wait: args.sequence_wait,
            log_format: args.log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn parse(extra: &[&str]) -> anyhow::Result<ServerConfig> {
        let mut argv = vec!["galaxy-server", "--jwt-secret", SECRET];
        argv.extend_from_slice(extra);
        ServerConfig::try_from(CliArgs::try_parse_from(argv)?)
    }

    #[test]
    fn defaults_are_valid() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.server_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.jwt.expire_hours, 24);
        assert_eq!(config.invalidation_ttl, Duration::from_secs(365 * SECS_PER_DAY));
        assert_eq!(config.sequence_wait, SequenceWait::Yield);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn overrides_are_kept_verbatim() {
        let config = parse(&[
            "--worker-id",
            "7",
            "--datacenter-id",
            "x",
            "--sequence-wait",
            "sleep",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(config.worker_id.as_deref(), Some("7"));
        // Validated later, during node resolution.
        assert_eq!(config.datacenter_id.as_deref(), Some("x"));
        assert_eq!(config.sequence_wait, SequenceWait::Sleep);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse(&["--server-addr", "not-an-addr"]).is_err());
        assert!(parse(&["--jwt-expire-hours", "0"]).is_err());
        assert!(parse(&["--invalidation-ttl-days", "0"]).is_err());
        assert!(
            ServerConfig::try_from(
                CliArgs::try_parse_from(["galaxy-server", "--jwt-secret", "short"]).unwrap()
            )
            .is_err()
        );
    }

    #[test]
    fn blank_redis_url_means_memory() {
        let config = parse(&["--redis-url", " "]).unwrap();
        assert_eq!(config.redis_url, None);
    }
}
