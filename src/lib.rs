pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::HttpAttendanceApi;
pub use config::{cli::LocalStorage, CliConfig, Settings};
pub use core::dashboard::Dashboard;
pub use core::form::{ActionOutcome, FormController, FormEvent};
pub use core::report::AttendanceReport;
pub use utils::error::{AppError, Result};
