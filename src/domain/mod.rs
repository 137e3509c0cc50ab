// Domain layer: pricing models, ports (interfaces) and the pure pricing services.
// Services do no I/O and do not log; orchestration lives in `core`.

pub mod model;
pub mod ports;

pub mod services;
