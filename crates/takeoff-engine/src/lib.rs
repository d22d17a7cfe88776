//! takeoff_engine - Formula evaluation and bill-of-materials resolution.

pub mod engine;
