// Domain layer: experiment models and the ports the driver talks through.

pub mod model;
pub mod ports;
