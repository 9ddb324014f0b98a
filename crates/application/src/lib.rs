//! dnscached application layer: the ports the infrastructure implements and
//! the background jobs drive.
pub mod ports;
