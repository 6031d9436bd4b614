pub mod agent;
pub mod backend_client;
pub mod promise;
pub mod session_manager;
