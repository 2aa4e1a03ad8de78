use std::env;
use std::time::Duration;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub listen_addr: String,
    pub bucket: String,
    pub pdf_url: String,
    pub spreadsheet_url: String,
    pub submission_topic_arn: String,
    pub callback_queue_url: String,
    pub email_queue_url: String,
    pub email_recipient: String,
    pub pool_workers: usize,
    pub pool_queue_depth: usize,
    pub rpc_timeout: Duration,
    pub join_timeout: Duration,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            listen_addr: var_or("DUPLEX_LISTEN_ADDR", "0.0.0.0:8080"),
            bucket: var_or("DUPLEX_BUCKET", "duplex"),
            pdf_url: var_or("DUPLEX_PDF_URL", "http://localhost:9999"),
            spreadsheet_url: var_or("DUPLEX_SPREADSHEET_URL", "http://localhost:8888"),
            submission_topic_arn: var_or("DUPLEX_SUBMISSION_TOPIC_ARN", ""),
            callback_queue_url: var_or("DUPLEX_CALLBACK_QUEUE_URL", ""),
            email_queue_url: var_or("DUPLEX_EMAIL_QUEUE_URL", ""),
            email_recipient: var_or("DUPLEX_EMAIL_RECIPIENT", "reports@localhost"),
            pool_workers: parsed_or("DUPLEX_POOL_WORKERS", 4),
            pool_queue_depth: parsed_or("DUPLEX_POOL_QUEUE_DEPTH", 16),
            rpc_timeout: Duration::from_secs(parsed_or("DUPLEX_RPC_TIMEOUT_SECS", 30)),
            join_timeout: Duration::from_secs(parsed_or("DUPLEX_JOIN_TIMEOUT_SECS", 60)),
        }
    }
}
