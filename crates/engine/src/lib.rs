//! Scheduling engine for the examination calendar: resolves the target academic period,
//! expands a program's teaching schedule into exam units, places them onto dates and rooms,
//! assigns invigilators and jury, and persists the result inside one transaction.

pub mod assignment;
pub mod days;
pub mod error;
pub mod generate;
pub mod ids;
pub mod ledger;
pub mod period;
pub mod placement;
pub mod regenerate;
pub mod window;
pub mod workload;

pub use error::EngineError;
pub use generate::GenerationService;
