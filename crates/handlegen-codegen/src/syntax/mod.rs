//! Method descriptors.
//!
//! Descriptors can be built directly or loaded from a JSON
//! descriptor file (see [`raw`]).

mod descriptor;
mod dispatch;
pub mod raw;

pub use descriptor::{
    ItemKind, MethodDescriptor, Param, ParamKind, QualifiedName, Shape, TwoCall,
};
pub use dispatch::DispatchRegistry;
