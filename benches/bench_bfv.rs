use bfv_rns::{BfvContext, Ciphertext, Feature, PublicKey, SecretKey};
use criterion::{criterion_group, criterion_main, Criterion};

fn setup(depth: usize, n: usize) -> (BfvContext, PublicKey, SecretKey) {
    let mut cc = BfvContext::with_ring_dim(65537, depth, n).unwrap();
    cc.enable(Feature::Encryption);
    cc.enable(Feature::KeySwitching);
    cc.enable(Feature::LeveledEvaluation);
    let (pk, sk) = cc.key_gen().unwrap();
    cc.eval_mult_key_gen(&sk).unwrap();
    (cc, pk, sk)
}

fn encrypt_range(cc: &BfvContext, pk: &PublicKey, len: i64) -> Ciphertext {
    let values: Vec<i64> = (1..=len).collect();
    let pt = cc.make_packed_plaintext(&values).unwrap();
    cc.encrypt(pk, &pt).unwrap()
}

fn bench_depth2(c: &mut Criterion, n: usize) {
    let (cc, pk, sk) = setup(2, n);
    let pt = cc.make_packed_plaintext(&(1..=12).collect::<Vec<_>>()).unwrap();
    let ct1 = encrypt_range(&cc, &pk, 12);
    let ct2 = encrypt_range(&cc, &pk, 12);

    let mut group = c.benchmark_group(format!("BFV N={n} depth=2"));
    group.bench_function("KeyGen", |b| b.iter(|| cc.key_gen()));
    group.bench_function("EvalMultKeyGen", |b| {
        let (mut cc, _, sk) = setup(2, n);
        b.iter(move || cc.eval_mult_key_gen(&sk))
    });
    group.bench_function("Encrypt", |b| b.iter(|| cc.encrypt(&pk, &pt)));
    group.bench_function("EvalAdd", |b| b.iter(|| cc.eval_add(&ct1, &ct2)));
    group.bench_function("EvalMult", |b| b.iter(|| cc.eval_mult(&ct1, &ct2)));
    group.bench_function("Decrypt", |b| b.iter(|| cc.decrypt(&sk, &ct1)));
    group.finish();
}

pub fn bench_bfv_1024(c: &mut Criterion) {
    bench_depth2(c, 1024);
}

pub fn bench_bfv_2048(c: &mut Criterion) {
    bench_depth2(c, 2048);
}

criterion_group! {
    name = bfv;
    config = Criterion::default().sample_size(10);
    targets = bench_bfv_1024, bench_bfv_2048
}

criterion_main!(bfv);
