//! Instance catalog adapter implementations.

#[cfg(feature = "ec2")]
pub mod ec2;

pub mod fixture;
