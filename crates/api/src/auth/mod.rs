//! Access-token verification.
//!
//! Tokens are issued by the account service; this server only verifies them.

pub mod jwt;
