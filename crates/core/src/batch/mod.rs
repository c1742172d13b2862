//! Batch orchestration engine
//!
//! Up to 25 heterogeneous operations travel in one request; the response is
//! split back into one result per item id.

pub mod assembler;
pub mod context;
pub mod correlator;
pub mod errors;
pub mod fault;
pub mod item;
pub mod orchestrator;
pub mod result;

pub use assembler::RequestAssembler;
pub use context::{BatchEndpoint, ServiceContext};
pub use correlator::ResponseCorrelator;
pub use errors::{AssemblyError, BatchError};
pub use fault::{ErrorList, Fault, FaultEntry, FaultError, FaultType, MISSING_FAULT_TYPE};
pub use item::{BatchItem, BatchPayload};
pub use orchestrator::Batch;
pub use result::{BatchItemResult, BatchResults, CorrelatedResult};
