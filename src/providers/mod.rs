pub mod deepseek;
pub mod screener_api;
pub mod util;
