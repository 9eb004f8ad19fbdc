pub mod double_top;
pub mod health;
