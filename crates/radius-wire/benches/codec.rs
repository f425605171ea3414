use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use radius_wire::attributes::{Attribute, StandardAttribute};
use radius_wire::auth;
use radius_wire::dictionary::default_dictionary;
use radius_wire::packet::{Code, Packet};

fn build_packet(num_attributes: usize) -> Packet {
    let authenticator = auth::generate_request_authenticator(b"testing123");
    let mut packet = Packet::new(Code::AccessRequest, 1);
    packet.authenticator = Some(authenticator);

    packet.add_attribute(Attribute::string(
        StandardAttribute::UserName as u8,
        "testuser",
    ));
    let encrypted = auth::encrypt_password("testpassword", b"testing123", &authenticator);
    packet.add_attribute(Attribute::octets(
        StandardAttribute::UserPassword as u8,
        encrypted,
    ));

    for i in 0..num_attributes {
        packet.add_attribute(Attribute::string(
            StandardAttribute::ReplyMessage as u8,
            format!("attribute_{i}"),
        ));
    }

    packet
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_encode");
    for num_attrs in [0usize, 5, 10, 20] {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_attrs),
            &num_attrs,
            |b, &num_attrs| {
                let packet = build_packet(num_attrs);
                b.iter(|| packet.encode().expect("encode"));
            },
        );
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("packet_decode");
    let dict = default_dictionary();
    for num_attrs in [0usize, 5, 10, 20] {
        group.bench_with_input(
            BenchmarkId::from_parameter(num_attrs),
            &num_attrs,
            |b, &num_attrs| {
                let encoded = build_packet(num_attrs).encode().expect("encode");
                b.iter(|| Packet::decode(black_box(&encoded), dict).expect("decode"));
            },
        );
    }
    group.finish();
}

fn bench_password_obfuscation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pap_encrypt");
    let authenticator = [0x42u8; 16];
    for (label, password) in [
        ("one_block", "test".to_string()),
        ("two_blocks", "a-password-over-16-bytes".to_string()),
        ("eight_blocks", "x".repeat(128)),
    ] {
        group.bench_with_input(
            BenchmarkId::from_parameter(label),
            &password,
            |b, password| {
                b.iter(|| {
                    auth::encrypt_password(black_box(password), b"testing123", &authenticator)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_password_obfuscation
);
criterion_main!(benches);
