//! Command handlers for the Greenfelt CLI.
//!
//! Each subcommand lives in its own module and exposes a single
//! `handle_*_command` entry point taking explicit output streams, so the
//! dispatcher and the tests drive them the same way.

pub mod cfg;
pub mod deal;
pub mod doctor;
pub mod export;
pub mod play;
pub mod rng;
pub mod sim;
pub mod stats;
pub mod verify;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use doctor::handle_doctor_command;
pub use export::handle_export_command;
pub use play::handle_play_command;
pub use rng::handle_rng_command;
pub use sim::handle_sim_command;
pub use stats::handle_stats_command;
pub use verify::handle_verify_command;
