pub mod client_message;
pub mod run_state;
pub mod server_message;
