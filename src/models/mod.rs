pub mod candle;
pub mod double_top;
pub mod health;
pub mod interval;
pub mod series;
