#![forbid(unsafe_code)]

pub mod app_services;
pub mod arcade_driver;
pub mod context;
pub mod error;
pub mod gate_service;
pub mod notice;
pub mod settings_service;

pub use palace_core::Clock;

pub use app_services::AppServices;
pub use arcade_driver::ArcadeDriver;
pub use context::SessionContext;
pub use error::{AppServicesError, GateError, SettingsError};
pub use gate_service::{GateOutcome, GateService, GateSession, Persistence};
pub use notice::{Notice, NoticeLevel};
pub use settings_service::SettingsService;
