use criterion::{Criterion, Throughput};
use libat::network::application::http::{Method, Request, response};
use std::hint::black_box;

const MESSAGE: &str = "\r\n+IPD,120:HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 40\r\nServer: bench\r\n\r\n{\"temperature\":21.5,\"humidity\":40.25}\r\nCLOSED\r\n";

pub fn bench_parse_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_response");
    group.throughput(Throughput::Bytes(MESSAGE.len() as u64));
    group.bench_function("parse_response", |b| {
        b.iter(|| {
            let parsed = response::parse(black_box(MESSAGE), ["CLOSED"]).expect("Failed to parse");
            black_box(parsed.status_code);
        })
    });
    group.finish();
}

pub fn bench_encode_request(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_request");
    let request = Request::new("api.example.com", 8080, Method::Post, "/telemetry")
        .expect("Failed to build request")
        .with_query("device=7")
        .expect("Failed to add query")
        .with_body("{\"temperature\":21.5,\"humidity\":40.25}")
        .expect("Failed to add body");
    group.throughput(Throughput::Bytes(request.encoded_len("libat") as u64));

    group.bench_function("encoded_len", |b| {
        b.iter(|| black_box(request.encoded_len(black_box("libat"))))
    });
    group.bench_function("write_payload", |b| {
        b.iter(|| {
            let mut payload: heapless::String<512> = heapless::String::new();
            request
                .write_payload(&mut payload, black_box("libat"))
                .expect("Failed to encode");
            black_box(payload.len())
        })
    });
    group.finish();
}
