//! A Universal Machine (UM-32) interpreter: segmented memory plus a
//! fetch-decode-execute loop for the 14-opcode UM architecture.

pub mod decode;
pub mod error;
pub mod image;
pub mod segment;
pub mod vm;

pub use decode::{Instruction, Opcode};
pub use error::{HostError, ImageError, ProgramFault, ResourceError, RumError};
pub use segment::SegmentStore;
pub use vm::Vm;
