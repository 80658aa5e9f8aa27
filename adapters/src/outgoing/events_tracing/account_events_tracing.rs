use tracing::{info, warn};

use domain::events::AccountEvent;
use social_accounts_application::ports::outgoing::account_events::AccountEventsPort;

/// Emits account events as structured log records under the
/// `account_events` target.
#[derive(Default)]
pub struct TracingAccountEventsAdapter;

impl TracingAccountEventsAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl AccountEventsPort for TracingAccountEventsAdapter {
    fn emit(&self, event: AccountEvent) {
        let account_id = event.account_id();
        let provider = event.provider().map_or("none", |provider| provider.as_str());

        match &event {
            AccountEvent::LinkSkipped { .. } => warn!(
                target: "account_events",
                event = event.name(),
                %account_id,
                provider,
                "External id not linked: account already holds a different id for this provider"
            ),
            _ => info!(
                target: "account_events",
                event = event.name(),
                %account_id,
                provider,
                "Account event"
            ),
        }
    }
}
