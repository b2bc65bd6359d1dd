//! Many devices scanning one zone at once.

use std::sync::Arc;

use tally_core::{CoordinatorBuilder, Manifest, ManifestRow, ScanOutcome, TaskKind};

fn manifest(lines: usize, qty: u32) -> Manifest {
    Manifest {
        source: None,
        rows: (0..lines)
            .map(|i| ManifestRow::new(format!("P{i}"), format!("Item {i}"), format!("{}", 5000 + i), qty))
            .collect(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_scans_on_different_lines_both_land() {
    let c = Arc::new(CoordinatorBuilder::new().build().unwrap());
    c.create_task("anymall", TaskKind::Inspection, manifest(2, 3))
        .await
        .unwrap();

    let a = tokio::spawn({
        let c = Arc::clone(&c);
        async move { c.record_scan("anymall", "5000").await.unwrap() }
    });
    let b = tokio::spawn({
        let c = Arc::clone(&c);
        async move { c.record_scan("anymall", "5001").await.unwrap() }
    });

    assert_eq!(a.await.unwrap().outcome, ScanOutcome::Matched);
    assert_eq!(b.await.unwrap().outcome, ScanOutcome::Matched);

    let snap = c.get_task("anymall").await.unwrap().unwrap();
    assert_eq!(snap.line_by_code("P0").unwrap().scanned_qty, 1);
    assert_eq!(snap.line_by_code("P1").unwrap().scanned_qty, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn contended_line_never_exceeds_target() {
    let c = Arc::new(CoordinatorBuilder::new().build().unwrap());
    c.create_task("anymall", TaskKind::Inspection, manifest(1, 10))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let c = Arc::clone(&c);
        handles.push(tokio::spawn(async move {
            let mut outcomes = Vec::new();
            for _ in 0..5 {
                outcomes.push(c.record_scan("anymall", "5000").await.unwrap().outcome);
            }
            outcomes
        }));
    }

    let mut matched = 0;
    let mut overscanned = 0;
    for handle in handles {
        for outcome in handle.await.unwrap() {
            match outcome {
                ScanOutcome::Matched => matched += 1,
                ScanOutcome::Overscanned => overscanned += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }
    }

    assert_eq!(matched, 10);
    assert_eq!(overscanned, 70);
    let snap = c.get_task("anymall").await.unwrap().unwrap();
    assert_eq!(snap.lines[0].scanned_qty, 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn polling_readers_see_monotonic_progress() {
    let c = Arc::new(CoordinatorBuilder::new().build().unwrap());
    c.create_task("anymall", TaskKind::Inspection, manifest(4, 25))
        .await
        .unwrap();

    let writer = tokio::spawn({
        let c = Arc::clone(&c);
        async move {
            for round in 0..25 {
                for i in 0..4 {
                    let code = format!("{}", 5000 + i);
                    c.record_scan("anymall", &code).await.unwrap();
                }
                if round % 5 == 0 {
                    tokio::task::yield_now().await;
                }
            }
        }
    });

    let reader = tokio::spawn({
        let c = Arc::clone(&c);
        async move {
            let mut last = 0;
            loop {
                let snap = c.get_task("anymall").await.unwrap().unwrap();
                let scanned = snap.progress.total_scanned;
                assert!(scanned >= last);
                for line in &snap.lines {
                    assert!(line.scanned_qty <= line.target_qty);
                }
                last = scanned;
                if snap.progress.is_complete {
                    break;
                }
                tokio::task::yield_now().await;
            }
        }
    });

    writer.await.unwrap();
    reader.await.unwrap();
}
