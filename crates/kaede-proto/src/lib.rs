//! gRPC definitions for the kaede scheduler.
//!
//! Messages, the `Scheduler` client and the server trait are generated from
//! `proto/kaede.proto` at build time.

/// Generated code for the `kaede.grpc` package.
pub mod kaede {
    pub mod grpc {
        tonic::include_proto!("kaede.grpc");
    }
}

pub use kaede::grpc::*;
pub use prost_types::Timestamp;
