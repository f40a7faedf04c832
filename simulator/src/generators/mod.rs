pub mod machines;
pub mod medications;
pub mod transactions;
