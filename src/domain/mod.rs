// Domain layer: core models and ports (interfaces). No adapters here.

pub mod model;
pub mod ports;
