pub mod record;
pub mod repository;
