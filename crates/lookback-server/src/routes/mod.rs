pub mod capture;
pub mod health;
pub mod records;
pub mod search;
