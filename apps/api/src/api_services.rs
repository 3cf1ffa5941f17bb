mod database;
mod http_client;
mod state_builder;

pub use database::connect_and_migrate;
pub use http_client::build_http_client;
pub use state_builder::build_app_state;
