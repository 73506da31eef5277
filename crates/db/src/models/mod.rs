pub mod franchise;
pub mod franchise_phone;
pub mod lead_distribution;
pub mod server;
