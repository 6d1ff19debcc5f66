//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::OrthoError;
use wlanmgr_config::Config;

use crate::bootstrap::ConfigLoader;

/// Configuration with readiness polling shortened for tests.
pub fn test_config() -> Config {
    Config {
        log_filter: "warn".to_owned(),
        daemon_connect_retries: 2,
        daemon_connect_interval_ms: 1,
        ..Config::default()
    }
}

/// Loader returning [`test_config`], optionally adjusted.
pub struct TestConfigLoader {
    config: Config,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: test_config(),
        }
    }

    #[must_use]
    pub fn with(adjust: impl FnOnce(&mut Config)) -> Self {
        let mut config = test_config();
        adjust(&mut config);
        Self { config }
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Loader that intentionally fails by passing an unknown hardware profile.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("wlanmgrd"),
            OsString::from("--hardware-profile"),
            OsString::from("quantum"),
        ];
        Config::load_from_iter(args)
    }
}
