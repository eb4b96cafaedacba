use crate::asset_registry::AssetRegistry;
use crate::registry::PackageRegistry;
use crate::resolver::ProcessingOrder;

/// All state of one import session: the loaded packages, the assets they
/// produced, and the order they were processed in.
///
/// Passed by `&mut` into the importer, so no other reader can observe the
/// session while a reimport tears it down and rebuilds it.
#[derive(Debug, Default)]
pub struct Session {
    pub packages: PackageRegistry,
    pub assets: AssetRegistry,
    pub order: ProcessingOrder,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unload every package and its assets and forget the processing order.
    pub fn unload_all(&mut self) {
        self.packages.unload_all(&mut self.assets);
        // Assets registered directly, outside any package.
        self.assets.clear();
        self.order = ProcessingOrder::default();
    }
}
