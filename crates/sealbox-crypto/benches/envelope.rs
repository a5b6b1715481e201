use secrecy::SecretString;

use sealbox_crypto::{derive_key, EnvelopeCodec, MasterSecret, SALT_SIZE};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench]
fn bench_derive_key(bencher: divan::Bencher) {
    let secret = MasterSecret::new(SecretString::from("bench-password"));
    let salt = [0xABu8; SALT_SIZE];
    bencher.bench(|| derive_key(divan::black_box(&secret), divan::black_box(&salt)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let codec = EnvelopeCodec::new(MasterSecret::new(SecretString::from("bench-password")));
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| codec.encrypt(divan::black_box(&data)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let codec = EnvelopeCodec::new(MasterSecret::new(SecretString::from("bench-password")));
    let data = make_data(size);
    let envelope = codec.encrypt(&data).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            codec
                .decrypt(
                    divan::black_box(&envelope.ciphertext),
                    divan::black_box(&envelope.record),
                )
                .unwrap()
        });
}

fn main() {
    divan::main();
}
