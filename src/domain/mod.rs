// Domain layer: validated host records and the command-runner port.

pub mod model;
pub mod ports;
