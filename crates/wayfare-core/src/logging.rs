//! Structured logging schema shared by every wayfare crate.
//!
//! `tracing` field names are identifiers at the call site, so this module is
//! the reference for them rather than a set of constants. Log queries can rely
//! on the same names across subsystems.
//!
//! ## Log level contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events, completed writes |
//! | DEBUG | Stage decisions, pool usage, request parameters |
//!
//! ## Fields
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `subsystem` | `"api"`, `"search"` or `"database"` |
//! | `component` | Part of the subsystem: `"fallback"`, `"pool"`, `"locations"`, `"currencies"`, `"health"` |
//! | `op` | Operation name: `"search"`, `"create"`, `"update"`, `"delete"`, ... |
//! | `location_id` | Location UUID being written |
//! | `currency_id`, `currency_code` | Currency being written |
//! | `query` | Raw search text |
//! | `query_kind` | Input classification: `code`, `chinese`, `pinyin_or_english` |
//! | `search_stage` | Stage that answered: `text_index`, `regex_prefix`, `regex_contains`, `listing` |
//! | `clause_count`, `prefix_only` | Shape of a regex stage query |
//! | `total`, `result_count` | Matches before pagination, rows returned |
//! | `duration_ms` | Wall-clock time of the operation |
//! | `pool_size`, `pool_idle` | Connection pool usage |
//! | `error` | Display form of the failure |
//!
//! Request ids travel in the `x-request-id` header (UUIDv7) and show up in
//! the `tower_http` trace spans.
