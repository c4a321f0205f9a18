//! Environment overrides live in their own test binary: env vars are
//! process-wide and would leak into the other config tests.

use svcpick::config::Settings;

#[test]
fn given_svcpick_env_vars_when_load_then_replace_values() {
    // Arrange
    let xdg = tempfile::TempDir::new().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", xdg.path());
    std::env::set_var("SVCPICK_CURRENCY_SYMBOL", "CHF ");
    std::env::set_var("SVCPICK_COLOR", "false");

    // Act
    let settings = Settings::load(None).expect("load settings");

    // Assert
    assert_eq!(settings.currency_symbol, "CHF ");
    assert!(!settings.color);

    std::env::remove_var("SVCPICK_CURRENCY_SYMBOL");
    std::env::remove_var("SVCPICK_COLOR");
}
