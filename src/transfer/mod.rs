//! Transfer module for FTP server
//!
//! Handles data channel negotiation (PASV/PORT), connection establishment,
//! and the byte transfers of LIST, RETR and STOR.

pub mod data_channel;
pub mod modes;
pub mod operations;
pub mod transport;

// Re-export key types and functions
pub use data_channel::{
    encode_pasv_address, open_data_connection, parse_port_argument, setup_active_mode,
    setup_passive_mode,
};
pub use modes::TransferMode;
pub use operations::{close_data_stream, receive_file, send_file, send_listing};
pub use transport::{TcpTransport, Transport};
