use lega_pgp::composed::{Esk, Message, SecretKeyBlock};
use lega_pgp::config::{DecryptOptions, DecryptOptionsBuilder};
use lega_pgp::errors::ErrorKind;
use lega_pgp::packet::{CompressionAlgorithm, DataMode};
use pretty_assertions::assert_eq;

const SMALL_PLAINTEXT: &[u8] = b"genome sample 42: ACGTACGTTTGA\n";
const PASSWORD: &[u8] = b"submission secret";

fn fixture(name: &str) -> Vec<u8> {
    let _ = pretty_env_logger::try_init();
    std::fs::read(format!("tests/unit-tests/{name}")).expect("fixture")
}

fn rsa_key() -> SecretKeyBlock {
    let (key, _) = SecretKeyBlock::from_armor_single(&fixture("rsa-1024-sec.asc")).expect("key");
    key
}

fn big_plaintext() -> Vec<u8> {
    fixture("skesk-seipd-partial.txt")
}

#[test]
fn pkesk_seipd() {
    let (msg, _) = Message::from_armor_single(&fixture("pkesk-seipd.asc")).unwrap();
    let Message::Encrypted { esk, .. } = &msg else {
        panic!("expected an encrypted message");
    };
    match &esk[..] {
        [Esk::PublicKeyEncryptedSessionKey(pkesk)] => {
            assert_eq!(pkesk.id().to_string(), "04A5830AD938364C");
        }
        other => panic!("unexpected session keys {other:?}"),
    }

    let lit = msg
        .decrypt_with_key(
            &[rsa_key()],
            b"correct horse battery staple",
            &DecryptOptions::default(),
        )
        .unwrap();
    assert_eq!(lit.mode(), DataMode::Binary);
    assert_eq!(lit.file_name(), b"plain.txt");
    assert_eq!(lit.data(), SMALL_PLAINTEXT);
}

#[test]
fn pkesk_wrong_passphrase_or_key() {
    let (msg, _) = Message::from_armor_single(&fixture("pkesk-seipd.asc")).unwrap();
    let options = DecryptOptions::default();

    let err = msg
        .decrypt_with_key(&[rsa_key()], b"not it", &options)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);

    let (dsa, _) = SecretKeyBlock::from_armor_single(&fixture("dsa-1024-sec.asc")).unwrap();
    let err = msg
        .decrypt_with_key(&[dsa], b"dsa pass", &options)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedPacket);
}

#[test]
fn pkesk_seipd_zip() {
    let msg = Message::from_bytes(fixture("pkesk-seipd-zip.gpg")).unwrap();
    let lit = msg
        .decrypt_with_key(
            &[rsa_key()],
            b"correct horse battery staple",
            &DecryptOptions::default(),
        )
        .unwrap();
    assert_eq!(lit.file_name(), b"big.txt");
    assert_eq!(lit.data(), &big_plaintext()[..]);
}

#[test]
fn skesk_seipd() {
    let (msg, headers) = Message::from_armor_single(&fixture("skesk-seipd.asc")).unwrap();
    assert!(headers.values().all(|v| !v.is_empty()));

    let lit = msg
        .decrypt_with_password(PASSWORD, &DecryptOptions::default())
        .unwrap();
    assert_eq!(lit.file_name(), b"plain.txt");
    assert_eq!(lit.data(), SMALL_PLAINTEXT);

    let err = msg
        .decrypt_with_password(b"submission secret!", &DecryptOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PrefixCheckFailed);
}

#[test]
fn skesk_s2k_count_limit() {
    let (msg, _) = Message::from_armor_single(&fixture("skesk-seipd.asc")).unwrap();
    let options = DecryptOptionsBuilder::default()
        .max_s2k_count(1024)
        .build()
        .unwrap();
    let err = msg.decrypt_with_password(PASSWORD, &options).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    // coded count 0x60 is exactly 65536
    let options = DecryptOptionsBuilder::default()
        .max_s2k_count(65536)
        .build()
        .unwrap();
    assert!(msg.decrypt_with_password(PASSWORD, &options).is_ok());
}

#[test]
fn protected_keys_pass_strict_policy() {
    let msg = Message::from_bytes(fixture("pkesk-seipd-zip.gpg")).unwrap();
    let strict = DecryptOptionsBuilder::default()
        .allow_unprotected_keys(false)
        .build()
        .unwrap();
    let lit = msg
        .decrypt_with_key(&[rsa_key()], b"correct horse battery staple", &strict)
        .unwrap();
    assert_eq!(lit.data().len(), big_plaintext().len());
}

#[test]
fn password_message_has_no_key_session() {
    let (msg, _) = Message::from_armor_single(&fixture("skesk-seipd.asc")).unwrap();
    assert!(msg.is_encrypted());
    let err = msg
        .decrypt_with_key(&[rsa_key()], b"correct horse battery staple", &DecryptOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedPacket);
}

#[test]
fn skesk_seipd_partial_lengths() {
    let msg = Message::from_bytes(fixture("skesk-seipd-partial.gpg")).unwrap();
    let lit = msg
        .decrypt_with_password(PASSWORD, &DecryptOptions::default())
        .unwrap();
    assert!(lit.file_name().is_empty());
    assert_eq!(lit.data(), &big_plaintext()[..]);
}

#[test]
fn skesk_seipd_zlib() {
    let data = fixture("skesk-seipd-zlib.gpg");
    let msg = Message::from_bytes(data).unwrap();
    let lit = msg
        .decrypt_with_password(PASSWORD, &DecryptOptions::default())
        .unwrap();
    assert_eq!(lit.file_name(), b"big.txt");
    assert_eq!(lit.data(), &big_plaintext()[..]);

    let tight = DecryptOptionsBuilder::default()
        .max_decompressed_size(100)
        .build()
        .unwrap();
    let err = msg.decrypt_with_password(PASSWORD, &tight).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedPacket);
}

#[test]
fn compression_algorithms_in_fixtures() {
    use lega_pgp::packet::{CompressedData, PacketParser};
    use lega_pgp::types::Tag;

    let plain = b"\xA3\x01\x73\x74\x76\x0f\x01\x00";
    let (header, body) = PacketParser::new(plain.to_vec()).next().unwrap().unwrap();
    assert_eq!(header.tag(), Tag::CompressedData);
    let compressed = CompressedData::from_body(body).unwrap();
    assert_eq!(compressed.compression_algorithm(), CompressionAlgorithm::ZIP);
    assert_eq!(&compressed.decompress_bounded(16).unwrap()[..], b"ACGT");
}
