//! Outbound adapters implementing the domain's driven ports.
//!
//! Only PostgreSQL persistence lives here; adapters translate between rows
//! and domain types and hold no business rules.

pub mod persistence;
