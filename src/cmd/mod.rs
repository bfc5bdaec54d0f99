//! Command module structure for the driftcheck CLI

pub mod validate;
