pub mod restart;

pub use restart::{RestartController, RestartPlatform};

#[cfg(target_os = "espidf")]
pub use restart::{disable_brownout_detector, EspIdfRestart};
