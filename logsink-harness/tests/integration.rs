//! End-to-end tests for the log sink
//!
//! These tests run a real sink on an ephemeral loopback port and drive it
//! over HTTP the way the component under test would:
//! 1. Deliver batches through the client or the batching emitter
//! 2. Verify the stored batch in-process and through the remote read path
//! 3. Tear the sink down and check the port is released

use std::time::{Duration, Instant};

use logsink_client::{EmitterConfig, LogEmitter, SinkClient};
use logsink_core::{LogBatch, LogEntry};
use logsink_harness::scenario::{SendBatch, SinkStep, Sleep, VerifyLogs};
use logsink_harness::{Scenario, VerifyError, VerifyPolicy, verify};
use logsink_server::{ServerConfig, SinkHandle, SinkService};

/// The entry a proxy in front of the echo server is expected to report
fn echo_entry() -> LogEntry {
    LogEntry {
        destination_workload: "echo-server".to_string(),
        destination_namespace: "test".to_string(),
        destination_address: "127.0.0.1:20243".to_string(),
        host: "127.0.0.1:20243".to_string(),
        path: "/".to_string(),
        response_code: 200,
        ..Default::default()
    }
}

/// The same entry with the run-specific values a real peer fills in
fn reported_entry() -> LogEntry {
    LogEntry {
        timestamp: Some(chrono::Utc::now()),
        latency: Some(Duration::from_micros(2718)),
        source_address: "127.0.0.1:49152".to_string(),
        request_id: uuid::Uuid::new_v4().to_string(),
        ..echo_entry()
    }
}

fn policy(max_attempts: u32, interval_ms: u64) -> VerifyPolicy {
    VerifyPolicy::new(max_attempts, Duration::from_millis(interval_ms))
}

async fn start_sink() -> SinkHandle {
    SinkService::new(ServerConfig::localhost(0))
        .start()
        .await
        .expect("Failed to start sink")
}

#[tokio::test]
async fn test_echo_server_entry_is_verified() {
    let mut sink = start_sink().await;
    let client = SinkClient::new(sink.url());

    client
        .write_log(&LogBatch::new(vec![reported_entry()]))
        .await
        .expect("Failed to deliver batch");

    let expected = LogBatch::new(vec![echo_entry()]);

    // In-process and remote read paths agree
    let local = verify(&expected, sink.state(), &policy(20, 50)).await.unwrap();
    let remote = verify(&expected, &client, &policy(20, 50)).await.unwrap();
    assert_eq!(local.attempts, 1);
    assert_eq!(remote.attempts, 1);
    assert_eq!(sink.state().write_count(), 1);

    sink.stop().await.unwrap();
}

#[tokio::test]
async fn test_eventual_match_within_budget() {
    let mut sink = start_sink().await;
    let client = SinkClient::new(sink.url());

    let interval = Duration::from_millis(50);
    let delivery = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(180)).await;
        client
            .write_log(&LogBatch::new(vec![reported_entry()]))
            .await
    });

    let started = Instant::now();
    let verified = verify(
        &LogBatch::new(vec![echo_entry()]),
        sink.state(),
        &VerifyPolicy::new(40, interval),
    )
    .await
    .unwrap();

    delivery.await.unwrap().unwrap();
    assert!(verified.attempts > 1);
    assert!(started.elapsed() <= interval * verified.attempts + Duration::from_millis(500));
    assert_eq!(sink.state().write_count(), 1);

    sink.stop().await.unwrap();
}

#[tokio::test]
async fn test_timeout_is_not_a_mismatch() {
    let mut sink = start_sink().await;
    let client = SinkClient::new(sink.url());

    let err = verify(&LogBatch::new(vec![echo_entry()]), &client, &policy(4, 25))
        .await
        .unwrap_err();

    assert!(matches!(err, VerifyError::TimedOut { attempts: 4 }));
    sink.stop().await.unwrap();
}

#[tokio::test]
async fn test_latest_batch_wins() {
    let mut sink = start_sink().await;
    let client = SinkClient::new(sink.url());

    let first = LogBatch::new(vec![LogEntry {
        path: "/first".to_string(),
        ..reported_entry()
    }]);
    client.write_log(&first).await.unwrap();
    client
        .write_log(&LogBatch::new(vec![reported_entry()]))
        .await
        .unwrap();

    assert!(
        verify(&LogBatch::new(vec![echo_entry()]), sink.state(), &policy(1, 10))
            .await
            .is_ok()
    );
    assert_eq!(sink.state().write_count(), 2);

    sink.stop().await.unwrap();
}

#[tokio::test]
async fn test_concurrent_writers_are_never_torn() {
    let mut sink = start_sink().await;
    let url = sink.url();

    let writers: Vec<_> = (0..8)
        .map(|w| {
            let client = SinkClient::new(url.clone());
            tokio::spawn(async move {
                for i in 0..10 {
                    let code = 200 + w * 10 + i;
                    let batch: LogBatch = (0..(code % 5 + 1))
                        .map(|_| LogEntry {
                            response_code: code,
                            ..reported_entry()
                        })
                        .collect();
                    client.write_log(&batch).await.unwrap();
                }
            })
        })
        .collect();

    let reader = {
        let client = SinkClient::new(url.clone());
        tokio::spawn(async move {
            for _ in 0..50 {
                if let Some(batch) = client.current_batch().await.unwrap() {
                    let code = batch.log_entries[0].response_code;
                    assert_eq!(batch.len() as i64, code % 5 + 1);
                    assert!(batch.log_entries.iter().all(|e| e.response_code == code));
                }
            }
        })
    };

    for writer in writers {
        writer.await.unwrap();
    }
    reader.await.unwrap();

    assert_eq!(sink.state().write_count(), 80);
    sink.stop().await.unwrap();
}

#[tokio::test]
async fn test_emitter_delivers_to_sink() {
    let mut sink = start_sink().await;

    let emitter = LogEmitter::new(
        SinkClient::new(sink.url()),
        EmitterConfig {
            flush_threshold: 500,
            flush_interval: Duration::from_secs(3600),
        },
    )
    .start()
    .unwrap();

    emitter.record(reported_entry());
    let report = emitter.shutdown().await;
    assert_eq!(report.sent, 1);

    verify(&LogBatch::new(vec![echo_entry()]), sink.state(), &policy(5, 20))
        .await
        .unwrap();

    sink.stop().await.unwrap();
}

#[tokio::test]
async fn test_full_scenario() {
    let sink = SinkStep::new(ServerConfig::localhost(0));
    let state = sink.state();
    let endpoint = sink.endpoint();

    Scenario::new()
        .step(sink)
        .step(
            SendBatch::new(endpoint.clone(), LogBatch::new(vec![reported_entry()]))
                .after(Duration::from_millis(150)),
        )
        .step(Sleep(Duration::from_millis(10)))
        .step(VerifyLogs::new(LogBatch::new(vec![echo_entry()]), state).with_policy(policy(40, 25)))
        .run()
        .await
        .unwrap();

    // The sink was torn down with the scenario
    let client = SinkClient::new(endpoint.url().unwrap());
    assert!(client.health().await.is_err());
}

#[tokio::test]
async fn test_port_conflict_aborts_scenario() {
    let mut occupied = start_sink().await;
    let port = occupied.local_addr().port();

    let sink = SinkStep::new(ServerConfig::localhost(port));
    let state = sink.state();

    let err = Scenario::new()
        .step(sink)
        .step(VerifyLogs::new(LogBatch::default(), state).with_policy(policy(1, 10)))
        .run()
        .await
        .unwrap_err();

    let sink_err = err.downcast_ref::<logsink_server::SinkError>().unwrap();
    assert!(sink_err.is_fatal());

    occupied.stop().await.unwrap();
}
