//! Integration tests for the full catc pipeline.
//!
//! These tests verify end-to-end behavior: input -> encode -> frame ->
//! attach -> extract -> unframe -> decode, with verification that output
//! matches input.

use catc_core::{
    carrier::{self, MARKER},
    codec::{decode, encode, CompressedBlock, MAX_BLOCK_LEN},
    container::{frame, unframe, Container, ContainerEntry, SEPARATOR},
    error::{ContainerError, Error, HuffmanError},
    tree::{FrequencyTable, HuffmanTree},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CARRIER: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR\x00\x00\x00\x10\x00\x00\x00\x10IEND";

/// Mixed inputs: runs, small alphabets, skewed and uniform bytes.
fn sample_inputs(seed: u64) -> Vec<Vec<u8>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut inputs = Vec::new();

    for _ in 0..64 {
        let len = rng.gen_range(1..=2048);
        let data: Vec<u8> = match rng.gen_range(0..4) {
            0 => vec![rng.gen(); len],
            1 => {
                let alphabet = b"abcdefghijklmnopqrstuvwxyz .!,\n";
                (0..len).map(|_| alphabet[rng.gen_range(0..alphabet.len())]).collect()
            }
            // Power-law: many symbols with geometric frequencies
            2 => (0..len)
                .map(|_| {
                    let r: f64 = rng.gen();
                    (r.ln() / 0.5f64.ln()).min(255.0) as u8
                })
                .collect(),
            _ => (0..len).map(|_| rng.gen()).collect(),
        };
        inputs.push(data);
    }

    inputs
}

#[test]
fn test_round_trip_random_inputs() {
    for data in sample_inputs(42) {
        let block = encode(&data).expect("encode failed");
        assert_eq!(block.len(), data.len() as u64);
        assert_eq!(decode(&block).expect("decode failed"), data);
    }
}

#[test]
fn test_round_trip_through_wire_format() {
    for data in sample_inputs(7) {
        let bytes = encode(&data).unwrap().to_bytes().unwrap();
        let block = CompressedBlock::from_bytes(&bytes).expect("block parse failed");
        assert_eq!(decode(&block).unwrap(), data);
    }
}

#[test]
fn test_encoding_is_deterministic() {
    for data in sample_inputs(99).iter().take(8) {
        let a = encode(data).unwrap().to_bytes().unwrap();
        let b = encode(data).unwrap().to_bytes().unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_empty_input_fails() {
    let result = encode(b"");
    assert!(matches!(
        result,
        Err(Error::Huffman(HuffmanError::EmptyInput))
    ));
    assert!(result.unwrap_err().is_empty_input());
}

#[test]
fn test_degenerate_alphabet() {
    let block = encode(b"aaaa").unwrap();
    assert_eq!(decode(&block).unwrap(), b"aaaa");

    let bytes = block.to_bytes().unwrap();
    let parsed = CompressedBlock::from_bytes(&bytes).unwrap();
    assert_eq!(decode(&parsed).unwrap(), b"aaaa");
}

#[test]
fn test_abracadabra() {
    let data = b"abracadabra";
    let freqs = FrequencyTable::from_bytes(data);
    let expected: Vec<(u8, u64)> = vec![(b'a', 5), (b'b', 2), (b'c', 1), (b'd', 1), (b'r', 2)];
    assert_eq!(freqs.iter().collect::<Vec<_>>(), expected);

    let block = encode(data).unwrap();
    assert_eq!(block.tree.leaf_count(), 5);

    // a:1 bit x5, b/r/c/d: 3 bits x (2+2+1+1) = 23 bits -> 3 bytes
    let bits = block.tree.encoded_bit_len().unwrap();
    assert_eq!(bits, 23);
    assert_eq!(block.packed.len(), 3);
    assert_eq!(decode(&block).unwrap(), data);
}

#[test]
fn test_container_scenario() {
    let entries = vec![
        ContainerEntry::new("x.txt", encode(b"hello").unwrap()),
        ContainerEntry::new("y.txt", encode(b"world").unwrap()),
    ];

    let parsed = unframe(&frame(&entries).unwrap()).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].name, "x.txt");
    assert_eq!(parsed[1].name, "y.txt");
    assert_eq!(decode(&parsed[0].block).unwrap(), b"hello");
    assert_eq!(decode(&parsed[1].block).unwrap(), b"world");
}

#[test]
fn test_full_pipeline() {
    let inputs = sample_inputs(2024);
    let container = Container::from_entries(
        inputs
            .iter()
            .enumerate()
            .map(|(i, data)| ContainerEntry::compress(format!("file_{i:03}.txt"), data).unwrap()),
    )
    .unwrap();

    let framed = container.frame().unwrap();
    let combined = carrier::attach(CARRIER, &framed);
    assert!(combined.starts_with(CARRIER));

    let extracted = carrier::extract(&combined).expect("extract failed");
    assert_eq!(extracted, framed.as_slice());

    let recovered = Container::unframe(extracted).expect("unframe failed");
    assert_eq!(recovered.len(), inputs.len());
    for (i, (entry, data)) in recovered.iter().zip(&inputs).enumerate() {
        assert_eq!(entry.name, format!("file_{i:03}.txt"));
        assert_eq!(&entry.decompress().unwrap(), data);
    }
}

#[test]
fn test_payload_engineered_with_marker_and_separator() {
    // File content that contains both reserved tokens verbatim
    let mut nasty = b"before".to_vec();
    nasty.extend_from_slice(MARKER);
    nasty.extend_from_slice(SEPARATOR);
    nasty.extend_from_slice(MARKER);
    nasty.extend_from_slice(b"after");

    // Raw payload that opens with the marker itself
    let mut raw_payload = MARKER.to_vec();
    raw_payload.extend_from_slice(b"not a container");
    let combined = carrier::attach(CARRIER, &raw_payload);
    assert_eq!(carrier::extract(&combined).unwrap(), raw_payload.as_slice());

    let container =
        Container::from_entries([ContainerEntry::compress("nasty.bin", &nasty).unwrap()]).unwrap();
    let combined = carrier::attach(CARRIER, &container.frame().unwrap());
    let recovered = Container::unframe(carrier::extract(&combined).unwrap()).unwrap();
    assert_eq!(recovered.get("nasty.bin").unwrap().decompress().unwrap(), nasty);
}

#[test]
fn test_corruption_detected() {
    let container = Container::from_entries([
        ContainerEntry::compress("a.txt", b"some text that compresses").unwrap(),
    ])
    .unwrap();
    let framed = container.frame().unwrap();

    // Flip a byte in the block length field of the record header
    let mut corrupt = framed.clone();
    corrupt[6] ^= 0x01;
    assert!(matches!(
        Container::unframe(&corrupt),
        Err(Error::CorruptContainer(_))
    ));

    // Truncate in the middle of the block
    let truncated = &framed[..framed.len() / 2];
    assert!(matches!(
        Container::unframe(truncated),
        Err(Error::CorruptContainer(_))
    ));
}

#[test]
fn test_forged_symbol_count_never_allocates() {
    for weight in [MAX_BLOCK_LEN + 1, 1 << 40, u64::MAX] {
        let forged = CompressedBlock {
            packed: Vec::new(),
            tree: HuffmanTree::Leaf { symbol: b'a', weight },
        };

        // Raw block: 16 bytes that decode would expand to `weight` bytes
        let bytes = forged.to_bytes().unwrap();
        assert_eq!(bytes.len(), 16);
        assert!(matches!(
            CompressedBlock::from_bytes(&bytes),
            Err(Error::CorruptContainer(ContainerError::TooManySymbols { .. }))
        ));
        assert!(matches!(
            decode(&forged),
            Err(Error::Huffman(HuffmanError::BlockTooLarge { .. }))
        ));

        // Same block framed and hidden in a carrier
        let framed = frame(&[ContainerEntry::new("forged.txt", forged)]).unwrap();
        let combined = carrier::attach(CARRIER, &framed);
        assert!(matches!(
            Container::unframe(carrier::extract(&combined).unwrap()),
            Err(Error::CorruptContainer(_))
        ));
    }
}

#[test]
fn test_missing_marker() {
    let result = carrier::extract(CARRIER);
    assert!(result.is_err());
    assert!(result.unwrap_err().is_marker_not_found());
}
