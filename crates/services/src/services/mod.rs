pub mod config;
pub mod distribution;

pub use config::Config;
pub use distribution::{
    AssignLeads, DistributionError, DistributionService, PhoneSelectionStrategy, SelectedPhone,
};
