pub mod client_service;
pub mod company_service;
pub mod draft_service;
pub mod follow_up_service;
pub mod notification_service;
pub mod quote_calculator;
pub mod quote_service;
pub mod scheduler;
pub mod share_service;
