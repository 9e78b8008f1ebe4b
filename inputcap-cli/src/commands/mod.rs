pub mod config_cmd;
pub mod monitor_cmd;
pub mod replay_cmd;
