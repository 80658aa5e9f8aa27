use std::{error::Error, io::stdout, iter};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use social_accounts_application::infrastructure_config::{Config, LogFormat};

const SERVICE_NAME: &str = "social-accounts";

// Account lifecycle events are the audit trail; keep them even when the
// configured level is quieter than info.
const DEFAULT_DIRECTIVES: [&str; 2] = ["account_events=info", "sqlx=warn"];

fn filter_directives(level: &str) -> String {
    iter::once(level.trim())
        .chain(DEFAULT_DIRECTIVES)
        .collect::<Vec<_>>()
        .join(",")
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(level)))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn setup_logging(config: &Config) -> Result<(), Box<dyn Error>> {
    let env_filter = build_env_filter(&config.logging.level);

    match config.logging.format {
        LogFormat::Json => {
            let formatting_layer = BunyanFormattingLayer::new(SERVICE_NAME.to_string(), stdout);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(JsonStorageLayer)
                .with(formatting_layer)
                .init();
        }
        LogFormat::Pretty => {
            let format = fmt::format().with_target(true).compact();

            let mut subscriber = tracing_subscriber::fmt()
                .event_format(format)
                .with_env_filter(env_filter);

            if config.logging.include_location {
                subscriber = subscriber.with_file(true).with_line_number(true);
            }

            subscriber.init();
        }
    }

    Ok(())
}
