//! API endpoint implementations for the order ledger service.

/// Order endpoints: creation, retrieval, listing, transitions, assignment.
pub mod order;
/// Authorization policy for lifecycle operations.
pub mod policy;
