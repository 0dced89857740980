mod common;

use common::{isolated_settings, scanner, touch};
use optiscaler_manager::{spawn_scan, CancelToken, Platform, ScanEvent};

#[tokio::test]
async fn spawned_scan_streams_events_then_reports() {
    let dir = tempfile::tempdir().unwrap();
    let ubisoft = dir.path().join("Ubisoft Game Launcher").join("games");
    touch(ubisoft.join("Anno 1800").join("Bin").join("Win64").join("Anno1800.exe"));
    touch(ubisoft.join("Anno 1800").join("Anno1800.exe"));
    touch(ubisoft.join("Far Cry 6").join("bin").join("FarCry6.exe"));

    let mut settings = isolated_settings(dir.path(), &[Platform::Ubisoft]);
    settings.roots.ubisoft = vec![ubisoft];

    let (handle, mut events) = spawn_scan(scanner(settings), CancelToken::new());
    let mut discovered = Vec::new();
    let mut progress = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            ScanEvent::GameDiscovered(game) => discovered.push(game.name),
            ScanEvent::Progress(p) => progress.push(p),
            ScanEvent::Warning(w) => panic!("unexpected warning: {}", w),
        }
    }
    let report = handle.await.unwrap();

    assert_eq!(discovered, vec!["Anno 1800", "Far Cry 6"]);
    assert_eq!(report.games.len(), 2);
    assert!(!report.cancelled);
    assert_eq!(progress.last().map(|p| p.percentage()), Some(100.0));
}

#[tokio::test]
async fn cancelled_before_start_returns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path().join("EA Games").join("Game").join("Game.exe"));
    let mut settings = isolated_settings(dir.path(), &[Platform::Ea]);
    settings.roots.ea = vec![dir.path().join("EA Games")];

    let cancel = CancelToken::new();
    cancel.cancel();
    let (handle, _events) = spawn_scan(scanner(settings), cancel);
    let report = handle.await.unwrap();

    assert!(report.cancelled);
    assert!(report.games.is_empty());
}
