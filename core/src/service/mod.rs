pub mod dto;
pub mod ledger_service;
