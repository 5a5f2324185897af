pub mod client;
pub mod company_profile;
pub mod draft;
pub mod financial_config;
pub mod follow_up;
pub mod quote;
pub mod quote_event;
pub mod quote_file;
pub mod quote_share;
pub mod quote_signature;
pub mod quote_status;
