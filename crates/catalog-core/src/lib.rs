pub mod error;
pub mod id;
pub mod product;

// Re-export commonly used types
pub use error::{CoreError, FieldError};
pub use id::{IdAllocation, IdAllocator, ProductId};
pub use product::{Product, ProductDraft, ProductPatch};
