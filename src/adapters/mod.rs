// Adapters layer: concrete formats for external systems (CSV tables in, CSV/JSON/ZIP out).

pub mod tables;
