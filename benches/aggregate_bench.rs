use criterion::{criterion_group, criterion_main, Criterion};
use prefix_export::{normalize, Aggregator, ContinentMembership, CountryRecord, MemorySource};
use std::hint::black_box;

const REGIONS: [&str; 5] = ["Africa", "Americas", "Asia", "Europe", "Oceania"];

fn country_code(i: usize) -> String {
    let a = (b'A' + (i / 26) as u8 % 26) as char;
    let b = (b'A' + (i % 26) as u8) as char;
    format!("{a}{b}")
}

fn fixture() -> (ContinentMembership, MemorySource) {
    let mut records = Vec::new();
    let mut source = MemorySource::new();

    for i in 0..250 {
        let cc = country_code(i);
        records.push(CountryRecord::new(cc.clone(), REGIONS[i % REGIONS.len()]));

        let ipv4: Vec<String> = (0..200).map(|n| format!("10.{}.{}.0/24", i % 256, n)).collect();
        let ipv6: Vec<String> = (0..50).map(|n| format!("2001:db8:{i:x}:{n:x}::/64")).collect();
        let asn: Vec<String> = (0..20).map(|n| (i * 100 + n).to_string()).collect();
        source = source.with_country(&cc, ipv4, ipv6, asn);
    }

    (ContinentMembership::build(&records), source)
}

fn benchmark_normalize(c: &mut Criterion) {
    c.bench_function("normalize_region_names", |b| {
        b.iter(|| {
            for name in [
                "Latin America and the Caribbean",
                "  Sub-Saharan Africa ",
                "Northern Europe",
            ] {
                black_box(normalize(black_box(name)));
            }
        })
    });
}

fn benchmark_aggregate(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let (membership, source) = fixture();
    let aggregator = Aggregator::new();

    c.bench_function("aggregate_250_countries", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let result = aggregator.aggregate(black_box(&membership), &source).await;
                black_box(result);
            })
        })
    });
}

criterion_group!(benches, benchmark_normalize, benchmark_aggregate);
criterion_main!(benches);
