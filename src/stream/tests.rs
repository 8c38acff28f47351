use super::*;
use hex_literal::hex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Test vectors from draft-irtf-cfrg-kangarootwelve-10 §4 (identical in RFC 9861).
fn ptn(n: usize) -> Vec<u8> {
    (0..n).map(|i| (i % 0xfb) as u8).collect()
}

fn hash(
    message: &[u8],
    context: &[u8],
    len: usize,
    lanes: u8,
    workers: usize,
    write_size: usize,
) -> Vec<u8> {
    let config = Config::new()
        .with_context(context)
        .with_lanes(lanes)
        .with_workers(workers);
    let mut hasher = Kt128::new(config).unwrap();

    for part in message.chunks(write_size) {
        assert_eq!(hasher.write(part).unwrap(), part.len());
    }

    let mut out = vec![0u8; len];
    assert_eq!(hasher.read(&mut out).unwrap(), len);
    out
}

fn host_workers() -> usize {
    Config::default().workers()
}

/// Every lane width, 1, 4 and host-many workers, and writes that are shorter than, equal to
/// and longer than a chunk.
fn check(message: &[u8], context: &[u8], expected: &[u8]) {
    for lanes in [1u8, 2, 4, 8] {
        for workers in [1, 4, host_workers()] {
            for write_size in [7919, 1024, 8 * 1024, CHUNK_SIZE * lanes as usize] {
                let got = hash(message, context, expected.len(), lanes, workers, write_size);
                assert_eq!(
                    got,
                    expected,
                    "lanes={lanes} workers={workers} write_size={write_size} len={}",
                    message.len()
                );
            }
        }
    }

    let mut oneshot = vec![0u8; expected.len()];
    kt128(message, context, &mut oneshot);
    assert_eq!(oneshot, expected, "one-shot len={}", message.len());
}

/// Reduced matrix for the multi-megabyte vectors.
fn check_large(message: &[u8], expected: &[u8]) {
    for (lanes, workers, write_size) in [
        (1, 1, 7919),
        (8, host_workers(), CHUNK_SIZE * 8),
        (4, 4, 1 << 20),
    ] {
        let got = hash(message, b"", expected.len(), lanes, workers, write_size);
        assert_eq!(got, expected, "lanes={lanes} workers={workers} write_size={write_size}");
    }
}

#[test]
fn test_vector_empty() {
    check(
        b"",
        b"",
        &hex!("1ac2d450fc3b4205d19da7bfca1b37513c0803577ac7167f06fe2ce1f0ef39e5"),
    );
}

#[test]
fn test_vector_ptn_17() {
    check(
        &ptn(17),
        b"",
        &hex!("6bf75fa2239198db4772e36478f8e19b0f371205f6a9a93a273f51df37122888"),
    );
}

#[test]
fn test_vector_ptn_17_pow_2() {
    check(
        &ptn(17 * 17),
        b"",
        &hex!("0c315ebcdedbf61426de7dcf8fb725d1e74675d7f5327a5067f367b108ecb67c"),
    );
}

#[test]
fn test_vector_ptn_17_pow_3() {
    check(
        &ptn(17 * 17 * 17),
        b"",
        &hex!("cb552e2ec77d9910701d578b457ddf772c12e322e4ee7fe417f92c758f0d59d0"),
    );
}

#[test]
fn test_vector_ptn_17_pow_4() {
    check(
        &ptn(17 * 17 * 17 * 17),
        b"",
        &hex!("8701045e22205345ff4dda05555cbb5c3af1a771c2b89baef37db43d9998b9fe"),
    );
}

#[test]
fn test_vector_ptn_17_pow_5() {
    check_large(
        &ptn(17 * 17 * 17 * 17 * 17),
        &hex!("844d610933b1b9963cbdeb5ae3b6b05cc7cbd67ceedf883eb678a0a8e0371682"),
    );
}

#[test]
fn test_vector_ptn_17_pow_6() {
    let message = ptn(17 * 17 * 17 * 17 * 17 * 17);
    let got = hash(&message, b"", 32, 8, host_workers(), 1 << 20);
    assert_eq!(
        got,
        hex!("3c390782a8a4e89fa6367f72feaaf13255c8d95878481d3cd8ce85f58e880af8")
    );
}

#[test]
fn test_vector_context_ptn_1() {
    check(
        b"",
        &ptn(1),
        &hex!("fab658db63e94a246188bf7af69a133045f46ee984c56e3c3328caaf1aa1a583"),
    );
}

#[test]
fn test_vector_context_ptn_41() {
    check(
        &[0xff],
        &ptn(41),
        &hex!("d848c5068ced736f4462159b9867fd4c20b808acc3d5bc48e0b06ba0a3762ec4"),
    );
}

#[test]
fn test_vector_context_ptn_41_pow_2() {
    check(
        &[0xff; 3],
        &ptn(41 * 41),
        &hex!("c389e5009ae57120854c2e8c64670ac01358cf4c1baf89447a724234dc7ced74"),
    );
}

#[test]
fn test_vector_context_ptn_41_pow_3() {
    // The customization string alone spans several chunks.
    check(
        &[0xff; 7],
        &ptn(41 * 41 * 41),
        &hex!("75d2f86a2e644566726b4fbcfc5657b9dbcf070c7b0dca06450ab291d7443bcf"),
    );
}

#[test]
fn test_chunk_boundaries() {
    let vectors: [(usize, [u8; 16]); 6] = [
        (CHUNK_SIZE, hex!("48f256f6772f9edfb6a8b661ec92dc93")),
        (CHUNK_SIZE + 1, hex!("bb66fe72eaea5179418d5295ee134485")),
        (2 * CHUNK_SIZE, hex!("82778f7f7234c83352e76837b721fbdb")),
        (2 * CHUNK_SIZE + 1, hex!("5f8d2b943922b451842b4e82740d0236")),
        (3 * CHUNK_SIZE, hex!("f4082a8fe7d1635aa042cd1da63bf235")),
        (3 * CHUNK_SIZE + 1, hex!("38cb940999aca742d69dd79298c6051c")),
    ];

    for (len, expected) in vectors {
        check(&ptn(len), b"", &expected);
    }
}

#[test]
fn test_chunk_boundaries_distinct() {
    let mut seen = Vec::new();
    for k in 1..=3 {
        for len in [k * CHUNK_SIZE - 1, k * CHUNK_SIZE, k * CHUNK_SIZE + 1] {
            let mut out = [0u8; 16];
            kt128(&ptn(len), b"", &mut out);
            assert!(!seen.contains(&out), "collision at len={len}");
            seen.push(out);

            assert_eq!(hash(&ptn(len), b"", 16, 2, 3, 5000), out, "len={len}");
        }
    }
}

#[test]
fn test_read_concatenation() {
    let message = ptn(3 * CHUNK_SIZE + 5);
    let whole = hash(&message, b"ctx", 1000, 2, 2, 4096);

    let mut hasher = Kt128::new(Config::new().with_context(b"ctx").with_lanes(2)).unwrap();
    hasher.write(&message).unwrap();

    let mut parts = Vec::new();
    for size in [1, 167, 168, 169, 0, 495] {
        let mut part = vec![0u8; size];
        hasher.read(&mut part).unwrap();
        parts.extend_from_slice(&part);
    }

    assert_eq!(parts, whole);
}

#[test]
fn test_random_write_splits() {
    let message = ptn(5 * CHUNK_SIZE + 123);
    let mut expected = [0u8; 32];
    kt128(&message, b"split", &mut expected);

    let mut rng = StdRng::seed_from_u64(0x6b31_3200);
    for _ in 0..8 {
        let lanes = [1u8, 2, 4, 8][rng.gen_range(0..4)];
        let config = Config::new()
            .with_context(b"split")
            .with_lanes(lanes)
            .with_workers(rng.gen_range(1..=4));
        let mut hasher = Kt128::new(config).unwrap();

        let mut rest = message.as_slice();
        while !rest.is_empty() {
            let size = rng.gen_range(0..=(2 * CHUNK_SIZE).min(rest.len()));
            let (part, tail) = rest.split_at(size);
            hasher.write(part).unwrap();
            rest = tail;
        }

        let mut out = [0u8; 32];
        hasher.read(&mut out).unwrap();
        assert_eq!(out, expected, "lanes={lanes}");
    }
}

#[test]
fn test_write_after_read_rejected() {
    let mut hasher = Kt128::new(Config::new().with_workers(1)).unwrap();
    hasher.write(b"message").unwrap();

    let mut first = [0u8; 16];
    hasher.read(&mut first).unwrap();

    assert!(matches!(hasher.write(b"more"), Err(Error::AlreadyFinalized)));
    assert!(matches!(hasher.write(b""), Err(Error::AlreadyFinalized)));

    // Reading carries on where it left off.
    let mut second = [0u8; 16];
    hasher.read(&mut second).unwrap();

    let mut expected = [0u8; 32];
    kt128(b"message", b"", &mut expected);
    assert_eq!(first, expected[..16]);
    assert_eq!(second, expected[16..]);
}

#[test]
fn test_failed_read_poisons_hasher() {
    let mut hasher = Kt128::new(Config::new().with_workers(1)).unwrap();
    hasher.scheduler.fail_dispatch = true;

    // The held-back chunk only reaches a worker when the read finalizes.
    hasher.write(&ptn(CHUNK_SIZE)).unwrap();
    let mut out = [0u8; 16];
    assert!(matches!(hasher.read(&mut out), Err(Error::WorkerLost(_))));

    assert!(matches!(hasher.write(b"more"), Err(Error::Poisoned)));
    assert!(matches!(hasher.read(&mut out), Err(Error::Poisoned)));
    assert!(matches!(hasher.read(&mut out), Err(Error::Poisoned)));

    hasher.scheduler.fail_dispatch = false;
    hasher.reset();
    hasher.write(&ptn(CHUNK_SIZE + 1)).unwrap();
    hasher.read(&mut out).unwrap();
    assert_eq!(out, hex!("bb66fe72eaea5179418d5295ee134485"));
}

#[test]
fn test_failed_write_poisons_hasher() {
    let mut hasher = Kt128::new(Config::new().with_workers(1)).unwrap();
    hasher.scheduler.fail_dispatch = true;

    assert!(matches!(
        hasher.write(&ptn(3 * CHUNK_SIZE)),
        Err(Error::WorkerLost(_))
    ));
    assert_eq!(hasher.written, 0);

    assert!(matches!(hasher.write(b""), Err(Error::Poisoned)));
    let mut out = [0u8; 16];
    assert!(matches!(hasher.read(&mut out), Err(Error::Poisoned)));

    hasher.scheduler.fail_dispatch = false;
    hasher.reset();
    hasher.write(&ptn(17)).unwrap();
    let mut out = [0u8; 32];
    hasher.read(&mut out).unwrap();
    assert_eq!(
        out,
        hex!("6bf75fa2239198db4772e36478f8e19b0f371205f6a9a93a273f51df37122888")
    );
}

#[test]
fn test_invalid_configuration() {
    for lanes in [0u8, 3, 5, 16] {
        assert!(matches!(
            Kt128::new(Config::new().with_lanes(lanes)),
            Err(Error::UnsupportedLanes(l)) if l == lanes
        ));
    }
    assert!(matches!(Kt128::new(Config::new().with_workers(0)), Err(Error::NoWorkers)));
}

#[test]
fn test_reset() {
    let mut hasher = Kt128::new(Config::new().with_lanes(4).with_workers(2)).unwrap();

    // Leave batches in flight, a partial batch and a held-back chunk behind.
    hasher.write(&ptn(9 * CHUNK_SIZE)).unwrap();
    hasher.reset();

    hasher.write(&ptn(17)).unwrap();
    let mut out = [0u8; 32];
    hasher.read(&mut out).unwrap();
    assert_eq!(
        out,
        hex!("6bf75fa2239198db4772e36478f8e19b0f371205f6a9a93a273f51df37122888")
    );

    // Reset after reading accepts writes again.
    hasher.reset();
    hasher.write(&ptn(CHUNK_SIZE + 1)).unwrap();
    let mut out = [0u8; 16];
    hasher.read(&mut out).unwrap();
    assert_eq!(out, hex!("bb66fe72eaea5179418d5295ee134485"));
}

#[test]
fn test_write_size_hints() {
    let mut hasher = Kt128::new(Config::new().with_lanes(4).with_workers(3)).unwrap();
    assert_eq!(hasher.max_write_size(), CHUNK_SIZE * 4 * 3);
    assert_eq!(hasher.next_write_size(), CHUNK_SIZE);

    hasher.write(&[0u8; 100]).unwrap();
    assert_eq!(hasher.next_write_size(), CHUNK_SIZE - 100);

    hasher.write(&vec![0u8; CHUNK_SIZE - 100]).unwrap();
    assert_eq!(hasher.next_write_size(), 4 * CHUNK_SIZE);

    hasher.write(&vec![0u8; CHUNK_SIZE]).unwrap();
    assert_eq!(hasher.next_write_size(), 3 * CHUNK_SIZE);

    // Following the hint never changes the result.
    let message = ptn(20 * CHUNK_SIZE + 77);
    let mut hinted = Kt128::new(Config::new().with_lanes(4).with_workers(3)).unwrap();
    let mut rest = message.as_slice();
    while !rest.is_empty() {
        let size = hinted.next_write_size().min(rest.len());
        let (part, tail) = rest.split_at(size);
        hinted.write(part).unwrap();
        rest = tail;
    }
    let mut out = [0u8; 32];
    hinted.read(&mut out).unwrap();

    let mut expected = [0u8; 32];
    kt128(&message, b"", &mut expected);
    assert_eq!(out, expected);
}

#[test]
fn test_io_traits() {
    use std::io::{Read, Write};

    let message = ptn(2 * CHUNK_SIZE + 3);
    let mut hasher = Kt128::new(Config::new().with_lanes(2).with_workers(2)).unwrap();
    Write::write_all(&mut hasher, &message).unwrap();
    Write::flush(&mut hasher).unwrap();

    let mut out = [0u8; 48];
    Read::read_exact(&mut hasher, &mut out).unwrap();

    let mut expected = [0u8; 48];
    kt128(&message, b"", &mut expected);
    assert_eq!(out, expected);

    let err = Write::write(&mut hasher, b"late").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::Other);
}

#[test]
fn test_default_hasher() {
    let mut hasher = Kt128::default();
    assert_eq!(hasher.config(), &Config::default());

    hasher.write(&ptn(17)).unwrap();
    let mut out = [0u8; 32];
    hasher.read(&mut out).unwrap();
    assert_eq!(
        out,
        hex!("6bf75fa2239198db4772e36478f8e19b0f371205f6a9a93a273f51df37122888")
    );
}
