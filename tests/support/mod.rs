pub mod range_server;
pub mod socket_guard;
