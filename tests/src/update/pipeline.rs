use std::fs::{self, File};
use std::time::{Duration, SystemTime};

use uhf_common::module::ModuleKind;

use crate::fixture::{FakeFetcher, FakeSystem, Fixture, HEADER_LINES, ORIGINAL_HOSTS, preferences};

fn position(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|line| line == needle)
        .unwrap_or_else(|| panic!("`{needle}` not found in hosts file"))
}

#[tokio::test]
async fn run_backs_up_then_writes_modules_in_order() {
    let fx = Fixture::new(&preferences(5, Some("true")));
    fx.module(ModuleKind::Local, "charlie", "10.0.0.3 charlie.lan\n", true)
        .module(ModuleKind::Local, "alpha", "# lan hosts\n10.0.0.1 alpha.lan\n", true)
        .module(ModuleKind::Local, "unused", "10.0.0.9 unused.lan\n", false)
        .module(ModuleKind::Web, "bravo", "https://bravo.example/hosts\n", true);
    let fetcher =
        FakeFetcher::new().serve("https://bravo.example/hosts", "0.0.0.0 ads.bravo.example\n");

    let report = fx
        .service(FakeSystem::online("box"), fetcher)
        .run()
        .await
        .expect("run should succeed");

    let lines = fx.hosts_lines();
    assert_eq!(report.lines_written, lines.len());
    assert!(lines[0].starts_with("# This file was edited by update-hosts-file"));

    let hostname = position(&lines, "127.0.0.1 box");
    let alpha = position(&lines, "10.0.0.1 alpha.lan");
    let charlie = position(&lines, "10.0.0.3 charlie.lan");
    let bravo = position(&lines, "0.0.0.0 ads.bravo.example");
    assert!(hostname < alpha && alpha < charlie && charlie < bravo);

    assert!(lines.contains(&"# Hosts from local module 'alpha'".to_string()));
    assert!(lines.contains(&"# Hosts from web module 'bravo'".to_string()));
    assert!(!lines.contains(&"# lan hosts".to_string()));
    assert!(!lines.contains(&"10.0.0.9 unused.lan".to_string()));

    let backups = fx.backups();
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0], report.backup.path);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), ORIGINAL_HOSTS);
    assert_eq!(report.loaded.len(), 3);
    assert!(report.skipped.is_empty());
    assert_eq!(fx.staging_leftovers(), 0);
}

#[tokio::test]
async fn repeated_runs_produce_the_same_entries() {
    let fx = Fixture::new(&preferences(5, Some("true")));
    fx.module(ModuleKind::Local, "lan", "10.0.0.1 nas.lan\n10.0.0.2 tv.lan\n", true)
        .module(ModuleKind::Web, "ads", "https://ads.example/hosts", true);
    let fetcher =
        FakeFetcher::new().serve("https://ads.example/hosts", "0.0.0.0 tracker.example\n");

    fx.service(FakeSystem::online("box"), fetcher.clone())
        .run()
        .await
        .unwrap();
    let first = fx.hosts_lines();

    fx.service(FakeSystem::online("box"), fetcher).run().await.unwrap();
    let second = fx.hosts_lines();

    assert_eq!(first[HEADER_LINES..], second[HEADER_LINES..]);
    assert_eq!(fx.backups().len(), 2);
}

#[tokio::test]
async fn malformed_lines_are_copied_verbatim() {
    let fx = Fixture::new(&preferences(5, None));
    fx.module(ModuleKind::Local, "odd", "lonelytoken\n  0.0.0.0   spaced.example  \n", true);

    fx.service(FakeSystem::online("box"), FakeFetcher::new())
        .run()
        .await
        .unwrap();

    let lines = fx.hosts_lines();
    assert!(lines.contains(&"lonelytoken".to_string()));
    assert!(lines.contains(&"  0.0.0.0   spaced.example  ".to_string()));
}

#[tokio::test]
async fn unreachable_web_module_is_skipped_when_allowed() {
    for keep in [Some("true"), Some("maybe"), None] {
        let fx = Fixture::new(&preferences(5, keep));
        fx.module(ModuleKind::Web, "down", "https://down.example/hosts", true)
            .module(ModuleKind::Web, "up", "https://up.example/hosts", true);
        let fetcher = FakeFetcher::new()
            .unreachable("https://down.example/hosts")
            .serve("https://up.example/hosts", "0.0.0.0 up.example\n");

        let report = fx
            .service(FakeSystem::online("box"), fetcher)
            .run()
            .await
            .unwrap_or_else(|e| panic!("run with KEEP_ON_HOST_UNREACHABLE={keep:?} failed: {e}"));

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].name, "down");

        let lines = fx.hosts_lines();
        assert!(!lines.contains(&"# Hosts from web module 'down'".to_string()));
        assert!(lines.contains(&"0.0.0.0 up.example".to_string()));
    }
}

#[tokio::test]
async fn broken_modules_are_skipped_without_partial_sections() {
    let fx = Fixture::new(&preferences(5, Some("false")));
    fx.module(ModuleKind::Web, "missing", "https://missing.example/hosts", true)
        .module(ModuleKind::Local, "good", "10.0.0.1 good.lan\n", true);
    // Dangling link: the definition is gone but the module is still enabled.
    fs::remove_file(fx.layout.available_dir(ModuleKind::Local).join("good")).unwrap();
    fx.module(ModuleKind::Local, "kept", "10.0.0.2 kept.lan\n", true);

    let report = fx
        .service(FakeSystem::online("box"), FakeFetcher::new())
        .run()
        .await
        .unwrap();

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(skipped, vec!["good", "missing"]);

    let lines = fx.hosts_lines();
    assert!(!lines.contains(&"# Hosts from local module 'good'".to_string()));
    assert!(!lines.contains(&"# Hosts from web module 'missing'".to_string()));
    assert!(lines.contains(&"10.0.0.2 kept.lan".to_string()));
}

#[tokio::test]
async fn missing_hostname_omits_the_hostname_entry() {
    let fx = Fixture::new(&preferences(5, None));
    let system = FakeSystem {
        hostname: None,
        reachable: true,
    };

    fx.service(system, FakeFetcher::new()).run().await.unwrap();

    let lines = fx.hosts_lines();
    assert!(!lines.contains(&"# Hostname".to_string()));
    assert_eq!(lines.len(), HEADER_LINES);
}

#[tokio::test]
async fn retention_drops_oldest_snapshots_first() {
    let fx = Fixture::new(&preferences(2, None));
    let now = SystemTime::now();
    for (name, age) in [("old", 300), ("older", 600), ("newest", 60)] {
        let path = fx.layout.backup_dir().join(format!("{name}.BACKUP"));
        let file = File::create(&path).unwrap();
        file.set_modified(now - Duration::from_secs(age)).unwrap();
    }
    fs::write(fx.layout.backup_dir().join("notes.txt"), "keep me").unwrap();

    let report = fx
        .service(FakeSystem::online("box"), FakeFetcher::new())
        .run()
        .await
        .unwrap();

    assert_eq!(report.rotated, vec![fx.layout.backup_dir().join("older.BACKUP")]);

    let names: Vec<String> = fx
        .backups()
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names.len(), 4);
    assert!(names.contains(&"newest.BACKUP".to_string()));
    assert!(names.contains(&"old.BACKUP".to_string()));
    assert!(names.contains(&"notes.txt".to_string()));
    assert!(names.contains(&report.backup.filename));
}

#[tokio::test]
async fn missing_backup_directory_is_created() {
    let fx = Fixture::new(&preferences(5, None));
    fs::remove_dir(fx.layout.backup_dir()).unwrap();

    let report = fx
        .service(FakeSystem::online("box"), FakeFetcher::new())
        .run()
        .await
        .unwrap();

    assert!(report.backup.path.starts_with(fx.layout.backup_dir()));
    assert_eq!(fx.backups().len(), 1);
}
