use std::collections::BTreeMap;

use lega_pgp::armor::{self, BlockType};
use lega_pgp::crc24::crc24;
use lega_pgp::errors::ErrorKind;
use pretty_assertions::assert_eq;

fn read_fixture(name: &str) -> String {
    let _ = pretty_env_logger::try_init();
    std::fs::read_to_string(format!("tests/unit-tests/{name}")).unwrap()
}

#[test]
fn fixtures_unarmor() {
    for (name, typ, first) in [
        ("rsa-1024-sec.asc", BlockType::PrivateKey, 0x95),
        ("dsa-1024-sec.asc", BlockType::PrivateKey, 0x95),
        ("pkesk-seipd.asc", BlockType::Message, 0x84),
        ("skesk-seipd.asc", BlockType::Message, 0x8c),
    ] {
        let armored = armor::unarmor(read_fixture(name).as_bytes()).unwrap();
        assert_eq!(armored.typ, typ, "{name}");
        assert!(armored.headers.is_empty(), "{name}");
        assert_eq!(armored.checksum, crc24(&armored.body), "{name}");
        assert_eq!(armored.body[0], first, "{name}");
    }
}

#[test]
fn leading_text_and_crlf() {
    let fixture = read_fixture("skesk-seipd.asc");
    let expected = armor::unarmor(fixture.as_bytes()).unwrap();

    let mangled = format!("received from the outbox\n\n{}", fixture.replace('\n', "\r\n"));
    let armored = armor::unarmor(mangled.as_bytes()).unwrap();
    assert_eq!(armored.body, expected.body);
}

#[test]
fn rewrapped_with_headers() {
    let original = armor::unarmor(read_fixture("pkesk-seipd.asc").as_bytes()).unwrap();

    let mut headers = BTreeMap::new();
    headers.insert("Comment".to_string(), "submission 7".to_string());
    headers.insert("Version".to_string(), "lega".to_string());
    let text = armor::to_armored_string(&original.body, BlockType::Message, Some(&headers)).unwrap();

    let armored = armor::unarmor(text.as_bytes()).unwrap();
    assert_eq!(armored.body, original.body);
    assert_eq!(armored.headers["Comment"], vec!["submission 7".to_string()]);
    assert_eq!(armored.headers["Version"], vec!["lega".to_string()]);
}

#[test]
fn checksum_mismatch() {
    let fixture = read_fixture("skesk-seipd.asc");
    let checksum_line = fixture
        .lines()
        .find(|line| line.starts_with('=') && line.len() == 5)
        .unwrap()
        .to_string();
    let replacement = if checksum_line == "=AAAA" { "=AAAB" } else { "=AAAA" };
    let broken = fixture.replace(&checksum_line, replacement);

    let err = armor::unarmor(broken.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Crc24Mismatch);
}

#[test]
fn footer_must_match() {
    let fixture = read_fixture("skesk-seipd.asc");
    let broken = fixture.replace("-----END PGP MESSAGE-----", "-----END PGP SIGNATURE-----");
    let err = armor::unarmor(broken.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedArmor);
}
