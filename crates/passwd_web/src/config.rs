use clap::Parser;
use std::path::PathBuf;

/// Command-line and environment configuration for the `passwd-web` binary.
#[derive(Parser, Debug)]
#[command(
    name = "passwd-web",
    version,
    about = "Random password service with a persisted request counter"
)]
pub struct CliArgs {
    /// HTTP listen address
    #[arg(long = "http", env = "PASSWD_WEB_HTTP", default_value = "0.0.0.0:8080")]
    pub http: String,

    /// File used to persist the password counter across restarts; omit to
    /// keep the counter in memory only
    #[arg(long = "counter", env = "PASSWD_WEB_COUNTER")]
    pub counter: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply() {
        let args = CliArgs::try_parse_from(["passwd-web"]).expect("parse");
        assert_eq!(args.http, "0.0.0.0:8080");
        assert!(args.counter.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let args = CliArgs::try_parse_from([
            "passwd-web",
            "--http",
            "127.0.0.1:9000",
            "--counter",
            "/var/lib/passwd-web/counter",
        ])
        .expect("parse");
        assert_eq!(args.http, "127.0.0.1:9000");
        assert_eq!(
            args.counter.as_deref(),
            Some(std::path::Path::new("/var/lib/passwd-web/counter"))
        );
    }
}
