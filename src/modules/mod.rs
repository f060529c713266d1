pub mod notes;

use std::sync::Arc;

use sharenote_kernel::ModuleRegistry;
use sharenote_store::RecordStore;

/// Register all site modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: Arc<dyn RecordStore>) -> anyhow::Result<()> {
    registry.register(notes::create_module(store))
}
