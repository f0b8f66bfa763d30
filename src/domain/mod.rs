// Domain layer: model types and the object-storage port.

pub mod model;
pub mod ports;
