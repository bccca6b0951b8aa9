pub mod card_info;
pub mod gateway;
pub mod order;
pub mod ports;
pub mod token;
