mod client;
pub mod tibber;
pub mod wallbox;
