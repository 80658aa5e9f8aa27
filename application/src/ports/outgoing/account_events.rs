use std::sync::Arc;

use domain::events::AccountEvent;

/// Observability sink for reconciliation and edit outcomes. Emission never
/// fails the calling operation.
pub trait AccountEventsPort: Send + Sync {
    fn emit(&self, event: AccountEvent);
}

pub type DynAccountEventsPort = Arc<dyn AccountEventsPort>;
