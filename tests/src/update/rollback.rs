use std::error::Error as _;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use uhf_common::error::{Error, ErrorKind, IoContext, Result, Stage};
use uhf_common::fetch::SourceFetcher;
use uhf_common::module::ModuleKind;
use uhf_core::update::UpdateService;

use crate::fixture::{FakeFetcher, FakeSystem, Fixture, ORIGINAL_HOSTS, preferences};

#[tokio::test]
async fn unreachable_web_module_restores_original_bytes() {
    let fx = Fixture::new(&preferences(5, Some("false")));
    fx.module(ModuleKind::Local, "lan", "10.0.0.1 nas.lan\n", true)
        .module(ModuleKind::Web, "down", "https://down.example/hosts", true);
    let fetcher = FakeFetcher::new().unreachable("https://down.example/hosts");

    let err = fx
        .service(FakeSystem::online("box"), fetcher)
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RunFatal);
    assert_eq!(err.stage(), Some(Stage::CandidateBuilt));
    let cause = err.source().expect("run fatal carries its cause");
    assert!(cause.to_string().contains("down"));

    assert_eq!(fx.hosts(), ORIGINAL_HOSTS.as_bytes());
    assert_eq!(fx.staging_leftovers(), 0);
}

#[tokio::test]
async fn unreadable_enabled_directory_triggers_rollback() {
    let fx = Fixture::new(&preferences(5, None));
    fs::remove_dir(fx.layout.enabled_dir(ModuleKind::Web)).unwrap();

    let err = fx
        .service(FakeSystem::online("box"), FakeFetcher::new())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::CandidateBuilt));
    assert_eq!(fx.hosts(), ORIGINAL_HOSTS.as_bytes());
    assert_eq!(fx.staging_leftovers(), 0);
}

#[tokio::test]
async fn failed_connectivity_check_touches_nothing() {
    let fx = Fixture::new(&preferences(5, None));
    fx.module(ModuleKind::Local, "lan", "10.0.0.1 nas.lan\n", true);

    let err = fx
        .service(FakeSystem::offline(), FakeFetcher::new())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::ConnectivityCheck));
    assert_eq!(fx.hosts(), ORIGINAL_HOSTS.as_bytes());
    assert!(fx.backups().is_empty());
    assert_eq!(fx.staging_leftovers(), 0);
}

#[tokio::test]
async fn missing_target_fails_backup_without_creating_it() {
    let fx = Fixture::new(&preferences(5, None));
    fs::remove_file(fx.layout.hosts_file()).unwrap();

    let err = fx
        .service(FakeSystem::online("box"), FakeFetcher::new())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::BackedUp));
    match err {
        Error::RunFatal { source, .. } => assert_eq!(source.kind(), ErrorKind::SourceMissing),
        other => panic!("unexpected error: {other}"),
    }
    assert!(!fx.layout.hosts_file().exists());
    assert!(fx.backups().is_empty());
    assert_eq!(fx.staging_leftovers(), 0);
}

#[tokio::test]
async fn invalid_retention_count_stops_before_backup() {
    let fx = Fixture::new("IP_TEST=192.0.2.1\nMAX_BACKUP_FILES=-1\n");

    let err = fx
        .service(FakeSystem::online("box"), FakeFetcher::new())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::BackedUp));
    assert_eq!(fx.hosts(), ORIGINAL_HOSTS.as_bytes());
    assert!(fx.backups().is_empty());
}

#[tokio::test]
async fn missing_module_tree_fails_integrity_check() {
    let fx = Fixture::new(&preferences(5, None));
    fs::remove_dir_all(fx.layout.module_root(ModuleKind::Web)).unwrap();

    let err = fx
        .service(FakeSystem::online("box"), FakeFetcher::new())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::IntegrityVerified));
    assert_eq!(fx.hosts(), ORIGINAL_HOSTS.as_bytes());
    assert!(fx.backups().is_empty());
    assert_eq!(fx.staging_leftovers(), 0);
}

#[tokio::test]
async fn missing_preferences_fail_before_staging() {
    let fx = Fixture::new("");
    fs::remove_file(fx.layout.preferences_file()).unwrap();

    let err = fx
        .service(FakeSystem::online("box"), FakeFetcher::new())
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::ConnectivityCheck));
    assert_eq!(fx.staging_leftovers(), 0);
}

/// Serves a payload, but deletes the staged candidate first so the commit
/// has nothing to copy.
struct CandidateRemover;

#[async_trait]
impl SourceFetcher for CandidateRemover {
    async fn fetch(&self, _source: &str, destination: &Path) -> Result<()> {
        let staging = destination
            .parent()
            .and_then(Path::parent)
            .expect("payloads live in the staging directory");
        fs::remove_file(staging.join("hosts")).io_context(|| "failed to remove candidate")?;
        tokio::fs::write(destination, "0.0.0.0 ads.example\n")
            .await
            .io_context(|| "failed to write payload")
    }
}

/// Deletes every snapshot, then reports the source as unreachable.
struct SnapshotRemover {
    backup_dir: PathBuf,
}

#[async_trait]
impl SourceFetcher for SnapshotRemover {
    async fn fetch(&self, source: &str, _destination: &Path) -> Result<()> {
        for entry in fs::read_dir(&self.backup_dir).io_context(|| "failed to list backups")? {
            let path = entry.io_context(|| "failed to read backup entry")?.path();
            fs::remove_file(&path).io_context(|| "failed to remove backup")?;
        }
        Err(Error::network_status(source, "connection refused"))
    }
}

#[tokio::test]
async fn failed_commit_restores_original_bytes() {
    let fx = Fixture::new(&preferences(5, None));
    fx.module(ModuleKind::Web, "ads", "https://ads.example/hosts", true);
    let service = UpdateService::new(
        fx.config(),
        Box::new(FakeSystem::online("box")),
        Box::new(CandidateRemover),
    );

    let err = service.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RunFatal);
    assert_eq!(err.stage(), Some(Stage::Committed));
    assert_eq!(fx.hosts(), ORIGINAL_HOSTS.as_bytes());
    assert_eq!(fx.staging_leftovers(), 0);
}

#[tokio::test]
async fn failed_restore_keeps_staging_for_diagnosis() {
    let fx = Fixture::new(&preferences(5, Some("false")));
    fx.module(ModuleKind::Web, "down", "https://down.example/hosts", true);
    let fetcher = SnapshotRemover {
        backup_dir: fx.layout.backup_dir(),
    };
    let service = UpdateService::new(
        fx.config(),
        Box::new(FakeSystem::online("box")),
        Box::new(fetcher),
    );

    let err = service.run().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RollbackFailed);
    assert_eq!(err.stage(), Some(Stage::CandidateBuilt));
    match &err {
        Error::RollbackFailed { cause, source } => {
            assert_eq!(cause.kind(), ErrorKind::RunFatal);
            assert_eq!(source.kind(), ErrorKind::Io);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(fx.hosts(), ORIGINAL_HOSTS.as_bytes());
    assert_eq!(fx.staging_leftovers(), 1);
}
