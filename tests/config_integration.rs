use pdf_assistant::chat::ReplyOverlap;
use pdf_assistant::config::AppConfig;
use serial_test::serial;
use std::env;
use std::fs;

const ARGS: [&str; 1] = ["pdf-assistant"];

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("PDF_ASSISTANT_SERVER__PORT");
        env::remove_var("PDF_ASSISTANT_CHAT__REPLY_DELAY_MS");
        env::remove_var("PDF_ASSISTANT_UPLOAD__PROGRESS_STEP");
        env::remove_var("PDF_ASSISTANT_UPLOAD__SINK_ENABLED");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
        env::remove_var("UPLOAD_SINK_URL");
        env::remove_var("REPLY_OVERLAP");
        env::remove_var("LOG_JSON");
    }
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();

    let config = AppConfig::load_from_args(ARGS).expect("defaults should load");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.chat.reply_delay_ms, 1200);
    assert_eq!(config.chat.reply_overlap, ReplyOverlap::Concurrent);
    assert_eq!(
        config.chat.welcome_text,
        "Welcome! Upload your PDF to start chatting."
    );
    assert_eq!(config.upload.sink_url, "http://localhost:8000");
    assert_eq!(config.upload.field_name, "pdf");
    assert_eq!(config.upload.progress_step, 10);
    assert_eq!(config.upload.ticks_to_complete(), 10);
    assert_eq!(config.auth.session_cookie, "__session");
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    unsafe {
        env::set_var("PDF_ASSISTANT_SERVER__PORT", "9090");
        env::set_var("PDF_ASSISTANT_CHAT__REPLY_DELAY_MS", "50");
        env::set_var("PDF_ASSISTANT_UPLOAD__SINK_ENABLED", "false");
    }

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.chat.reply_delay_ms, 50);
    assert!(!config.upload.sink_enabled);

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_flags_win() {
    clear_env_vars();
    unsafe {
        env::set_var("PDF_ASSISTANT_SERVER__PORT", "9090");
    }

    let config = AppConfig::load_from_args([
        "pdf-assistant",
        "--port",
        "4000",
        "--sink-url",
        "http://sink.internal:9000",
        "--reply-overlap",
        "Serialized",
    ])
    .expect("Failed to load config");

    assert_eq!(config.server.port, 4000);
    assert_eq!(config.upload.sink_url, "http://sink.internal:9000");
    assert_eq!(config.chat.reply_overlap, ReplyOverlap::Serialized);

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("assistant.yaml");
    fs::write(
        &file_path,
        r#"
server:
  port: 7070
chat:
  reply_overlap: reject
upload:
  progress_step: 25
"#,
    )
    .expect("Failed to write temp config");

    unsafe {
        env::set_var("CONFIG_FILE", &file_path);
    }

    let config = AppConfig::load_from_args(ARGS).expect("Failed to load config from file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.chat.reply_overlap, ReplyOverlap::Reject);
    assert_eq!(config.upload.progress_step, 25);
    assert_eq!(config.upload.ticks_to_complete(), 4);

    clear_env_vars();
}

#[test]
#[serial]
fn test_invalid_progress_step_rejected() {
    clear_env_vars();
    unsafe {
        env::set_var("PDF_ASSISTANT_UPLOAD__PROGRESS_STEP", "0");
    }

    let err = AppConfig::load_from_args(ARGS).expect_err("zero step must be rejected");
    assert!(err.to_string().contains("progress_step"));

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_fails() {
    clear_env_vars();

    let result = AppConfig::load_from_args(["pdf-assistant", "--config", "/nonexistent/pdf.yaml"]);
    assert!(result.is_err());
}
