//! Integration tests for the ESO build engine.
//!
//! The server is bound to an ephemeral loopback port and exercised over real
//! HTTP, both directly and through the display client.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use eso_build_engine::aggregate::{aggregate_effects, render_build_md};
use eso_build_engine::api::{create_router, AppState};
use eso_build_engine::data::{Collection, DataRoot};
use eso_build_engine::display::{DisplayClient, FetchState};
use eso_build_engine::validate::build::BuildContext;
use eso_build_engine::validate::{check_build, check_data, Status};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;

/// Repository root with the checked-in data.
fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Copy the checked-in data and builds into a scratch root.
fn scratch_copy() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["data", "builds"] {
        let target = dir.path().join(sub);
        std::fs::create_dir_all(&target).unwrap();
        for entry in std::fs::read_dir(repo_root().join(sub)).unwrap() {
            let entry = entry.unwrap();
            std::fs::copy(entry.path(), target.join(entry.file_name())).unwrap();
        }
    }
    dir
}

async fn spawn_server(root: &Path) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = create_router(AppState::new(DataRoot::new(root)));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn display_client_renders_checked_in_build() {
    let addr = spawn_server(&repo_root()).await;
    let client = DisplayClient::new(&format!("http://{addr}")).unwrap();

    let page = client.load().await;

    let FetchState::Loaded(health) = &page.health else {
        panic!("health not loaded: {:?}", page.health);
    };
    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "eso-build-engine-backend");

    let FetchState::Loaded(build) = &page.build else {
        panic!("build not loaded: {:?}", page.build);
    };
    assert_eq!(build.id.as_deref(), Some("permafrost-marshal"));
    assert!(page.render().contains("Name: Permafrost Marshal"));
}

#[tokio::test]
async fn display_client_reports_build_failure_independently() {
    let dir = scratch_copy();
    std::fs::remove_file(dir.path().join("builds/permafrost-marshal.json")).unwrap();
    let addr = spawn_server(dir.path()).await;
    let client = DisplayClient::new(&format!("http://{addr}")).unwrap();

    let page = client.load().await;

    assert!(matches!(page.health, FetchState::Loaded(_)));
    assert_eq!(
        page.build,
        FetchState::Failed("Build request failed with 500".to_string())
    );
}

#[tokio::test]
async fn summary_tracks_files_without_caching() {
    let dir = scratch_copy();
    let addr = spawn_server(dir.path()).await;
    let url = format!("http://{addr}/api/data/summary");

    let store = DataRoot::new(dir.path());
    let skills = store.load_collection(Collection::Skills).await.unwrap().len();
    let effects = store.load_collection(Collection::Effects).await.unwrap().len();
    let sets = store.load_collection(Collection::Sets).await.unwrap().len();
    let cp_stars = store.load_collection(Collection::CpStars).await.unwrap().len();

    let body: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "skillsCount": skills,
            "effectsCount": effects,
            "setsCount": sets,
            "cpStarsCount": cp_stars
        })
    );

    std::fs::write(dir.path().join("data/sets.json"), r#"{"sets":[]}"#).unwrap();
    let body: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(body["setsCount"], 0);
}

#[tokio::test]
async fn every_checked_in_build_is_served_by_id() {
    let root = repo_root();
    let addr = spawn_server(&root).await;

    let ids = DataRoot::new(&root).list_builds().await.unwrap();
    assert!(!ids.is_empty());

    for id in ids {
        let response = reqwest::get(format!("http://{addr}/api/builds/{id}")).await.unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK, "{id}");
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["id"], id.as_str());
    }
}

#[tokio::test]
async fn checked_in_data_passes_integrity_checks() {
    let report = check_data(&DataRoot::new(repo_root())).await;
    assert!(report.errors.is_empty(), "{:#?}", report.errors);
    assert_eq!(report.status, Status::Ok);
}

#[tokio::test]
async fn checked_in_build_is_valid() {
    let report = check_build(&DataRoot::new(repo_root()), "permafrost-marshal").await;
    assert_eq!(report.errors, Vec::<String>::new());
    assert_eq!(report.build_name.as_deref(), Some("Permafrost Marshal"));
}

#[tokio::test]
async fn checked_in_build_aggregates_and_exports() {
    let store = DataRoot::new(repo_root());
    let context = BuildContext::load(&store).await.unwrap();
    let build = store.load_build("permafrost-marshal").await.unwrap();

    let effects = aggregate_effects(&build, &context);
    assert!(effects.iter().any(|e| e.source == "skill.frozen_gate"));
    assert!(effects.iter().any(|e| e.source.starts_with("set.")));
    assert!(effects.iter().any(|e| e.source.starts_with("cp.")));

    let md = render_build_md(&build, &context);
    assert!(md.starts_with("# Permafrost Marshal\n"));
    assert!(md.contains("| 1 | Frozen Gate |"));
}
