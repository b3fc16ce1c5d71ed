//! CLI Tests
//!
//! Argument parsing and command execution against a temporary data directory.

use medflow_cli::{command, execute, Action, Settings};
use medflow_core::{Portal, PortalConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn parse(args: &[&str]) -> (Settings, Action) {
    let matches = command().try_get_matches_from(args).unwrap();
    let (name, sub) = matches.subcommand().unwrap();
    (
        Settings::from_matches(sub),
        Action::from_subcommand(name, sub).unwrap(),
    )
}

async fn portal_in(dir: &TempDir) -> Portal {
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        config: None,
    };
    let store = settings.open_store().await.unwrap();
    Portal::new(Arc::new(store), PortalConfig::immediate())
}

async fn run(portal: &Portal, args: &[&str]) -> (bool, String) {
    let (_, action) = parse(args);
    let mut out = Vec::new();
    let accepted = execute(portal, action, &mut out).await.unwrap();
    (accepted, String::from_utf8(out).unwrap())
}

#[test]
fn test_parse_request() {
    let (settings, action) = parse(&[
        "medflow",
        "--data-dir",
        "/tmp/mf",
        "request",
        "--specialty",
        "Cardiología",
        "--date",
        "2025-05-01",
        "--time",
        "09:00",
        "--doctor",
        "Dr. Elena Torres",
    ]);

    assert_eq!(settings.data_dir, PathBuf::from("/tmp/mf"));
    assert_eq!(settings.config, None);
    match action {
        Action::Request(request) => {
            assert_eq!(request.specialty, "Cardiología");
            assert_eq!(request.practitioner.as_deref(), Some("Dr. Elena Torres"));
            assert_eq!(request.notes, None);
        }
        other => panic!("unexpected action: {other:?}"),
    }
}

#[test]
fn test_global_flag_after_subcommand() {
    let (settings, action) = parse(&["medflow", "list", "--history", "--data-dir", "/tmp/x"]);
    assert_eq!(settings.data_dir, PathBuf::from("/tmp/x"));
    assert_eq!(action, Action::List { history: true });
}

#[test]
fn test_missing_required_argument() {
    let result = command().try_get_matches_from(["medflow", "cancel"]);
    assert!(result.is_err());
}

#[tokio::test]
async fn test_session_flow() {
    let dir = TempDir::new().unwrap();
    let portal = portal_in(&dir).await;

    let (accepted, out) = run(&portal, &["medflow", "whoami"]).await;
    assert!(!accepted);
    assert!(out.contains("Sesión requerida"));

    let (accepted, out) = run(
        &portal,
        &["medflow", "login", "admin123", "--password", "demo1234"],
    )
    .await;
    assert!(accepted);
    assert!(out.contains("Bienvenido/a, Ana García."));

    let (accepted, out) = run(&portal, &["medflow", "whoami"]).await;
    assert!(accepted);
    assert!(out.starts_with("Ana García (C.C. admin123)"));

    let (accepted, _) = run(&portal, &["medflow", "logout"]).await;
    assert!(accepted);
    assert!(portal.current().await.is_none());
}

#[tokio::test]
async fn test_request_list_cancel() {
    let dir = TempDir::new().unwrap();
    let portal = portal_in(&dir).await;
    run(&portal, &["medflow", "login", "admin123", "--password", "demo1234"]).await;

    let (accepted, out) = run(
        &portal,
        &[
            "medflow",
            "request",
            "--specialty",
            "Nutrición",
            "--date",
            "2025-05-01",
            "--time",
            "14:00",
            "--notes",
            "En ayunas",
        ],
    )
    .await;
    assert!(accepted);
    assert!(out.contains("Nutrición"));
    assert!(out.contains("[upcoming]"));
    assert!(out.contains("En ayunas"));
    assert!(out.contains("Cita solicitada"));

    let id = portal.upcoming().await.unwrap()[0].id.to_string();

    let (_, out) = run(&portal, &["medflow", "list"]).await;
    assert!(out.contains(&id));

    let (accepted, out) = run(&portal, &["medflow", "cancel", &id]).await;
    assert!(accepted);
    assert!(out.contains("[cancelled]"));

    let (_, out) = run(&portal, &["medflow", "list"]).await;
    assert!(out.contains("No hay citas."));
    let (_, out) = run(&portal, &["medflow", "list", "--history"]).await;
    assert!(out.contains(&id));

    let (accepted, out) = run(&portal, &["medflow", "complete", &id]).await;
    assert!(!accepted);
    assert!(out.contains("Cambio no permitido"));
}

#[tokio::test]
async fn test_rejected_request_prints_notice() {
    let dir = TempDir::new().unwrap();
    let portal = portal_in(&dir).await;
    run(&portal, &["medflow", "login", "admin123", "--password", "demo1234"]).await;

    let (accepted, out) = run(
        &portal,
        &[
            "medflow",
            "request",
            "--specialty",
            "Astrología",
            "--date",
            "2025-05-01",
            "--time",
            "09:00",
        ],
    )
    .await;
    assert!(!accepted);
    assert!(out.contains("no está disponible"));
}

#[tokio::test]
async fn test_specialties_lists_catalog() {
    let dir = TempDir::new().unwrap();
    let portal = portal_in(&dir).await;

    let (accepted, out) = run(&portal, &["medflow", "specialties"]).await;
    assert!(accepted);
    assert!(out.starts_with("Cardiología\n  Dr. Elena Torres\n"));
    assert!(out.contains("Oftalmología"));
}

#[tokio::test]
async fn test_config_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("medflow.toml");
    std::fs::write(
        &config_path,
        "commit_delay_ms = 0\nauth_delay_ms = 0\ntransition_policy = \"lenient\"\n",
    )
    .unwrap();

    let settings = Settings {
        data_dir: dir.path().join("data"),
        config: Some(config_path),
    };
    let portal = settings.open_portal().await.unwrap();
    assert_eq!(portal.config().commit_delay_ms, 0);
    assert!(dir.path().join("data").is_dir());
}

#[tokio::test]
async fn test_bad_config_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        config: Some(dir.path().join("missing.toml")),
    };
    let err = settings.open_portal().await.unwrap_err();
    assert!(err.to_string().contains("failed to load configuration"));
}
