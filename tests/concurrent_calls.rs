//! Many tasks sharing one client instance.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;

use inference_failover::{ChatMessage, ChatOptions, InferenceClient};

mod common;

const CHAT_PATH: &str = "/v1/chat/completions";

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_client_under_concurrency() {
    let primary_chats = Arc::new(AtomicU32::new(0));
    let primary_probes = Arc::new(AtomicU32::new(0));
    let (pc, pp) = (primary_chats.clone(), primary_probes.clone());
    let primary = common::start_programmable_backend(move |req| {
        let (pc, pp) = (pc.clone(), pp.clone());
        async move {
            if req.path == CHAT_PATH {
                pc.fetch_add(1, Ordering::SeqCst);
                (502, "upstream gone".into())
            } else {
                pp.fetch_add(1, Ordering::SeqCst);
                (200, "ok".into())
            }
        }
    })
    .await;

    let secondary_probes = Arc::new(AtomicU32::new(0));
    let sp = secondary_probes.clone();
    let secondary = common::start_programmable_backend(move |req| {
        let sp = sp.clone();
        async move {
            if req.path != CHAT_PATH {
                sp.fetch_add(1, Ordering::SeqCst);
            }
            (200, json!({"served_by": "secondary"}).to_string())
        }
    })
    .await;

    let client = Arc::new(
        InferenceClient::from_config(&common::test_config(primary, Some(secondary))).unwrap(),
    );

    let concurrency = 16;
    let requests_per_task = 5;
    let start = Instant::now();

    let mut tasks = Vec::new();
    for task_id in 0..concurrency {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            let mut latencies = Vec::new();
            for i in 0..requests_per_task {
                let messages = vec![ChatMessage::user(format!("task {} request {}", task_id, i))];
                let req_start = Instant::now();
                let response = client
                    .chat_completion("llama3", &messages, &ChatOptions::new())
                    .await
                    .expect("every call should fail over to the secondary");
                assert_eq!(response["served_by"], "secondary");
                latencies.push(req_start.elapsed());
            }
            latencies
        }));
    }

    let mut all_latencies: Vec<Duration> = Vec::new();
    for task in tasks {
        all_latencies.extend(task.await.unwrap());
    }

    assert_eq!(all_latencies.len(), concurrency * requests_per_task);
    assert!(!client.get_hosts_status()["primary"]);
    assert!(client.get_hosts_status()["secondary"]);
    assert!(primary_chats.load(Ordering::SeqCst) >= 3);
    // Probe slots are claimed atomically, so racing callers probe once
    assert_eq!(primary_probes.load(Ordering::SeqCst), 1);
    assert_eq!(secondary_probes.load(Ordering::SeqCst), 1);

    all_latencies.sort();
    println!("\n--- Shared Client Results ---");
    println!("Total Requests: {}", all_latencies.len());
    println!("Total Duration: {:?}", start.elapsed());
    println!("P50 Latency:    {:?}", all_latencies[all_latencies.len() / 2]);
    println!("Max Latency:    {:?}", all_latencies[all_latencies.len() - 1]);
    println!("-----------------------------\n");
}
