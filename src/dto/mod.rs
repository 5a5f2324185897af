pub mod client_dto;
pub mod company_dto;
pub mod draft_dto;
pub mod follow_up_dto;
pub mod quote_dto;
pub mod share_dto;
