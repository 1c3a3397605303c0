//! `paramap`: convenience façade that re-exports `paramap-core` and `paramap-shared`.

#![deny(missing_docs)]

/// Re-export **everything** from paramap-core at the crate root, so users can `use paramap::*;`.
#[doc(inline)]
pub use paramap_core::*;

pub use paramap_core::query::{Join, TagKind, TemplateTag};
pub use paramap_core::resolver::{output_columns, ResultColumn};

/// Also expose paramap-core as a nested module if you like `paramap::core::...` paths.
pub use paramap_core as core;

/// Configuration loading and logging setup.
pub use paramap_shared as shared;
