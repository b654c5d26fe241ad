use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use agora_ledger::{CheckpointHistory, TokenLedger};
use agora_types::Address;

fn make_history(n: u64) -> CheckpointHistory {
    let mut history = CheckpointHistory::new();
    for i in 1..=n {
        history.push(i * 2, u128::from(i));
    }
    history
}

fn bench_checkpoint_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("checkpoint_lookup");

    for count in [1u64, 10, 100, 1000, 10_000] {
        let history = make_history(count);
        // Midpoint forces the binary search path.
        let query = count;

        group.bench_with_input(BenchmarkId::new("at", count), &count, |b, _| {
            b.iter(|| black_box(history.at(black_box(query))));
        });
    }

    group.finish();
}

fn bench_transfer_with_delegates(c: &mut Criterion) {
    let alice = Address::new("alice");
    let bob = Address::new("bob");
    let mut ledger = TokenLedger::new();
    ledger.mint(&alice, u128::from(u64::MAX)).unwrap();
    ledger.delegate(&alice, &alice).unwrap();
    ledger.delegate(&bob, &bob).unwrap();

    c.bench_function("transfer_delegated", |b| {
        b.iter(|| {
            ledger.transfer(&alice, &bob, black_box(1)).unwrap();
            ledger.transfer(&bob, &alice, black_box(1)).unwrap();
        });
    });
}

criterion_group!(benches, bench_checkpoint_lookup, bench_transfer_with_delegates);
criterion_main!(benches);
