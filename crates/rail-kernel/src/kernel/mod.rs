//! Mesh kernel abstraction and backends

mod memory;
mod traits;

pub use memory::InMemoryKernel;
pub use traits::{KernelError, KernelResult, MeshKernel, NullKernel, ReferencePointId};
