use crate::ethos_client::EthosClient;
use crate::services::price_updater::PriceUpdater;
use std::sync::Arc;

/// Shared handles passed to every route. Both services are constructed
/// exactly once, in main, and live for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub ethos: Arc<EthosClient>,
    pub price: Arc<PriceUpdater>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            ethos: Arc::new(EthosClient::new()),
            price: Arc::new(PriceUpdater::new()),
        }
    }
}
