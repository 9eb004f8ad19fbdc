use std::sync::Arc;

use crate::services::market_data::MarketDataService;
use crate::services::scan_state::SharedScanState;

#[derive(Clone)]
pub struct AppState {
    pub scan_state: SharedScanState,
    pub market_data: Arc<MarketDataService>,
}
