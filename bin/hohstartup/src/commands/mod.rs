pub mod completions_cmd;
pub mod config_cmd;
pub mod credentials_cmd;
pub mod history_cmd;
pub mod run_cmd;
pub mod status;
