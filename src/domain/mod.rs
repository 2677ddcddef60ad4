// Domain layer: core models and ports (interfaces) shared by adapters and the router.

pub mod model;
pub mod ports;
