pub mod hyperliquid;
pub mod market_data;
pub mod scan_state;
pub mod scanner;
