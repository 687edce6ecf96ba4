use criterion::{BatchSize, Criterion, Throughput};
use libat::modem::{CommandSession, Config, KeywordSet};
use libat::network::{Read, Transport, Write};
use std::hint::black_box;

/// Serial port that hands out a canned reply in UART-sized slices.
struct Replay {
    data: &'static [u8],
    pos: usize,
    slice: usize,
}

impl Read for Replay {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.slice).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for Replay {
    type Error = ();

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Transport for Replay {}

const REPLY: &[u8] = b"\r\n+IPD,120:HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 40\r\nServer: bench\r\n\r\n{\"temperature\":21.5,\"humidity\":40.25}\r\nCLOSED\r\n";

pub fn bench_read_exchange(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_exchange");
    let config = Config::default();
    group.throughput(Throughput::Bytes(REPLY.len() as u64));

    for slice in [8usize, 64] {
        group.bench_function(format!("slice_{}", slice), |b| {
            b.iter_batched_ref(
                || Replay {
                    data: REPLY,
                    pos: 0,
                    slice,
                },
                |port| {
                    let mut session: CommandSession<(), 512> = CommandSession::new();
                    session.arm(port, b"", &config.read_message, 0, ());
                    black_box(session.poll(port, 1).expect("Exchange did not resolve"));
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

pub fn bench_keyword_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("keyword_scan");
    let keywords = KeywordSet::new(&["SEND OK", "SEND FAIL", "ERROR"]).expect("Failed to build keywords");
    let mut haystack = vec![b'.'; 500];
    haystack.extend_from_slice(b"SEND OK\r\n");
    group.throughput(Throughput::Bytes(haystack.len() as u64));
    group.bench_function("keyword_scan", |b| {
        b.iter(|| black_box(keywords.matches(black_box(&haystack))))
    });
    group.finish();
}
