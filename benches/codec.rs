//! Benchmarks for the CSV codec
//!
//! Run with: cargo bench codec

use csvpad::csv::{decode, encode_with, LineEnding};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn sample_csv(rows: usize) -> String {
    let mut text = String::from("id,name,comment,amount\n");
    for i in 0..rows {
        text.push_str(&format!(
            "{},User {},\"says \"\"hi\"\", then leaves\",{}.50\n",
            i, i, i * 3
        ));
    }
    text
}

// ============================================================================
// Decoding
// ============================================================================

#[divan::bench(args = [100, 1_000, 10_000])]
fn decode_table(bencher: divan::Bencher, rows: usize) {
    let text = sample_csv(rows);
    bencher.bench(|| divan::black_box(decode(divan::black_box(&text))));
}

// ============================================================================
// Encoding
// ============================================================================

#[divan::bench(args = [100, 1_000, 10_000])]
fn encode_table(bencher: divan::Bencher, rows: usize) {
    let table = decode(&sample_csv(rows)).unwrap();
    bencher.bench(|| {
        divan::black_box(encode_with(&table.header, &table.rows, LineEnding::Lf))
    });
}

#[divan::bench(args = [1_000, 10_000])]
fn round_trip(bencher: divan::Bencher, rows: usize) {
    let text = sample_csv(rows);
    bencher.bench(|| {
        let table = decode(&text).unwrap();
        divan::black_box(encode_with(&table.header, &table.rows, LineEnding::Lf).unwrap())
    });
}
