use std::path::Path;

use mailcraft_cli::config::{Config, ConfigError, DEFAULT_CONFIG_FILE, SmtpConfig};
use pretty_assertions::assert_eq;

#[test]
fn missing_default_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(None, dir.path()).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.export.content_width, 600);
}

#[test]
fn default_file_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(DEFAULT_CONFIG_FILE),
        "[export]\ncontent_width = 640\nunsubscribe_url = \"https://example.com/u\"\n\n[delivery]\noutbox = \"out\"\n",
    )
    .unwrap();

    let config = Config::load(None, dir.path()).unwrap();
    assert_eq!(config.export.content_width, 640);
    assert_eq!(
        config.export.unsubscribe_url.as_deref(),
        Some("https://example.com/u")
    );
    // Unset fields keep their defaults.
    assert_eq!(config.export.title, "Newsletter");
    assert_eq!(config.delivery.outbox, Path::new("out"));
    assert_eq!(config.import_options().content_width, 640);
}

#[test]
fn explicit_path_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = Config::load(Some(missing.as_path()), dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = Config::parse("[export]\nwidth = 600\n", Path::new("mailcraft.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("invalid config mailcraft.toml"));

    assert!(Config::parse("[smtp]\nhost = \"x\"\n", Path::new("mailcraft.toml")).is_err());
}

#[test]
fn smtp_relay_section() {
    let config = Config::parse(
        "[delivery]\nfrom = \"News <news@example.com>\"\n\n[delivery.smtp]\nhost = \"smtp.example.com\"\nusername = \"news\"\npassword = \"secret\"\n",
        Path::new("mailcraft.toml"),
    )
    .unwrap();
    let smtp = config.delivery.smtp.unwrap();
    assert_eq!(
        smtp,
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: Some("news".to_string()),
            password: Some("secret".to_string()),
            starttls: true,
        }
    );
    assert_eq!(Config::default().delivery.smtp, None);
}
