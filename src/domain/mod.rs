// Domain layer: observer, catalog and chart models plus the ports the core depends on.

pub mod model;
pub mod observer;
pub mod ports;
