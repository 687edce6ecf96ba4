use criterion::{criterion_group, criterion_main};

mod modem;
mod network;

criterion_group!(
    benches,
    network::http::bench_parse_response,
    network::http::bench_encode_request,
    modem::session::bench_read_exchange,
    modem::session::bench_keyword_scan
);
criterion_main!(benches);
