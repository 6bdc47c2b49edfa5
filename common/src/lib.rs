pub mod proto {
    tonic::include_proto!("snek");
}

pub mod collision;
pub mod config;
pub mod games;
pub mod identifiers;
pub mod logger;

pub use proto::*;
pub use identifiers::*;
