//! Shared building blocks for sharenote: layered settings, the slug resolver
//! used as the join key between publisher and site, and the module registry
//! the site server is assembled from.

pub mod module;
pub mod registry;
pub mod settings;
pub mod slug;

pub use module::{InitCtx, Module};
pub use registry::ModuleRegistry;
pub use slug::slugify;
