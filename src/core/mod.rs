/// コアシステムモジュール
pub mod app_controller;
pub mod capture_policy;
pub mod capture_service;
pub mod clock;
pub mod config;
pub mod config_validation;
pub mod domain_logic;
pub mod retry_policy;
pub mod task_state;

pub use app_controller::{AppController, TickOutcome};
pub use capture_policy::{is_photo_size_valid, CapturePolicy, MIN_PHOTO_SIZE_BYTES, POST_CAPTURE_DELAY_MS};
pub use capture_service::{CaptureManager, CaptureOutcome};
pub use clock::Clock;
pub use config::{AppConfig, ConfigError};
pub use domain_logic::{is_clock_synced, local_datetime, object_name_for_key, remote_object_key};
pub use retry_policy::WaitPolicy;
pub use task_state::{CycleAction, TaskState};
