//! Wire codec benchmark suite.
//!
//! Measures the per-message cost on both sides of the socket:
//! - Command encoding at several payload sizes
//! - Response decoding at several payload sizes
//! - Line splitting across fragmented reads
//! - Request round trip against an in-process peer
//!
//! Run with: cargo bench --bench codec
//! Results saved to: target/criterion/

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gui_bridge::protocol::LineBuffer;
use gui_bridge::protocol::codec::{decode, encode};
use gui_bridge::{Client, ExecuteJsParams};
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::runtime::Runtime;

// ============================================================================
// Benchmark Parameters
// ============================================================================

const PAYLOAD_SIZES: &[usize] = &[64, 4 * 1024, 256 * 1024];
const LINES_PER_BUFFER: usize = 100;
const READ_FRAGMENT: usize = 1500;

fn payload(size: usize) -> Value {
    json!({
        "code": "x".repeat(size),
        "window_label": "main",
        "timeout_ms": 5000,
    })
}

fn response_line(size: usize) -> Vec<u8> {
    let mut line = serde_json::to_vec(&json!({
        "success": true,
        "data": {"result": "y".repeat(size), "type": "string"},
        "error": null,
    }))
    .expect("serialize");
    line.push(b'\n');
    line
}

// ============================================================================
// Benchmark: Encode
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for &size in PAYLOAD_SIZES {
        let value = payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &value, |b, value| {
            b.iter(|| encode("EXECUTE_JS", value).expect("encode"));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Decode
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for &size in PAYLOAD_SIZES {
        let line = response_line(size);
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &line, |b, line| {
            b.iter(|| decode(line).expect("decode"));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Line Splitting
// ============================================================================

fn bench_line_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_buffer");

    for &size in &PAYLOAD_SIZES[..2] {
        let stream: Vec<u8> = (0..LINES_PER_BUFFER)
            .flat_map(|_| response_line(size))
            .collect();

        group.throughput(Throughput::Bytes(stream.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &stream, |b, stream| {
            b.iter(|| {
                let mut buffer = LineBuffer::new();
                let mut lines = 0;
                for fragment in stream.chunks(READ_FRAGMENT) {
                    buffer.extend(fragment);
                    while buffer.next_line().is_some() {
                        lines += 1;
                    }
                }
                assert_eq!(lines, LINES_PER_BUFFER);
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Round Trip
// ============================================================================

fn bench_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().expect("runtime");

    let dir = tempfile::Builder::new()
        .prefix("gb")
        .tempdir_in("/tmp")
        .expect("tempdir");
    let path = dir.path().join("bench.sock");

    let client = rt.block_on(async {
        let listener = UnixListener::bind(&path).expect("bind");
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let (reader, mut writer) = stream.into_split();
                    let mut lines = BufReader::new(reader).lines();
                    while let Ok(Some(_)) = lines.next_line().await {
                        let reply = b"{\"success\":true,\"data\":{\"result\":1,\"type\":\"number\"},\"error\":null}\n";
                        if writer.write_all(reply).await.is_err() {
                            break;
                        }
                    }
                });
            }
        });

        let client = Client::with_socket_path(&path);
        client.connect().await.expect("connect");
        client
    });

    let mut group = c.benchmark_group("round_trip");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("execute_js", |b| {
        b.to_async(&rt).iter(|| async {
            client
                .execute_js(ExecuteJsParams::new("1"))
                .await
                .expect("execute")
        });
    });

    group.finish();
    rt.block_on(client.disconnect());
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_line_buffer,
    bench_round_trip
);
criterion_main!(benches);
