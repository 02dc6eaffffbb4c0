pub mod payment_order;
pub mod session;
pub mod setting;
