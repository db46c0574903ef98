pub mod payment;
pub mod response;
