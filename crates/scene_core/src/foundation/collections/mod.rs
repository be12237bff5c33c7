//! Specialized collection types
//!
//! - [`VectorList`]: slab with an intrusive free list and skip-aware iteration
//! - [`GenerationalVectorList`]: slab whose [`GenRef`] handles detect stale use
//! - [`TypedRef`]: a `GenRef` tagged with the table it belongs to

pub mod vector_list;
pub mod generational;
pub mod typed_ref;

pub use generational::{GenRef, GenerationalVectorList};
pub use typed_ref::TypedRef;
pub use vector_list::VectorList;
