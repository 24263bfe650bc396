// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::Config;
use crate::utils::report;

/// Validate configuration and log what a run would use.
pub fn run_validate(config: &Config) -> Result<()> {
    report::header("Validating configuration");

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    log::info!("✓ Config OK");
    report::sub_item(&format!("Base URL: {}", config.site.base_url));
    report::sub_item(&format!("User agent: {}", config.crawler.user_agent));
    report::sub_item(&format!("Timeout: {}s", config.crawler.timeout_secs));
    report::sub_item(&format!("Max concurrent: {}", config.crawler.max_concurrent));
    report::sub_item(&format!("Max races per state: {}", config.selection.max_races));
    report::sub_item(&format!("Min finishers: {}", config.selection.min_finishers));
    report::sub_item(&format!(
        "Course types: {}",
        config.selection.course_types.join(", ")
    ));
    report::sub_item(&format!("States: {}", config.states.len()));
    report::sub_item(&format!("Output: {}", config.output.path.display()));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default() {
        assert!(run_validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_reports_error() {
        let mut config = Config::default();
        config.states.clear();
        assert!(run_validate(&config).is_err());
    }
}
