// Domain layer: shared API models and the ports every Terraform resource implements.

pub mod model;
pub mod ports;
