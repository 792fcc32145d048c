use super::build;
use super::setup_logging;
use crate::configuration::ConfigKey;

#[test]
fn it_builds_a_valid_command() {
    build().debug_assert();
}

#[test]
fn it_reads_config_flags_on_subcommands() {
    let matches = build()
        .try_get_matches_from(vec!["chatbot", "chat", "--backend", "mock", "-q", "code"])
        .unwrap();
    let (name, chat_matches) = matches.subcommand().unwrap();

    assert_eq!(name, "chat");
    assert_eq!(
        chat_matches
            .get_one::<String>(&ConfigKey::Backend.to_string())
            .unwrap(),
        "mock"
    );
    assert_eq!(
        chat_matches
            .get_one::<String>(&ConfigKey::QueryType.to_string())
            .unwrap(),
        "code"
    );
}

#[test]
fn it_rejects_unknown_backends() {
    let res = build().try_get_matches_from(vec!["chatbot", "--backend", "openai"]);
    assert!(res.is_err());
}

#[test]
fn it_includes_chat_help() {
    let help = build().render_long_help().to_string();
    assert!(help.contains("/copy (/c)"));
    assert!(help.contains("CHATBOT_BACKEND"));
}

#[test]
fn it_skips_logging_without_rust_log() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");

    let guard = setup_logging("", &log_dir).unwrap();
    assert!(guard.is_none());
    assert!(!log_dir.exists());

    let guard = setup_logging("reqwest=debug", &log_dir).unwrap();
    assert!(guard.is_none());
    assert!(!log_dir.exists());
}

#[test]
fn it_reports_unwritable_log_dirs() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let log_dir = file.path().join("logs");

    assert!(setup_logging("chatbot=debug", &log_dir).is_err());
}
