pub mod client_router;
pub mod company_router;
pub mod draft_router;
pub mod follow_up_router;
pub mod quote_router;
pub mod share_router;
