pub mod account_events_tracing;
