use std::{collections::BTreeMap, fmt, str};

use base64::engine::{general_purpose::STANDARD, Engine as _};
use log::debug;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while, take_while1, take_while_m_n},
    character::complete::{digit1, line_ending, not_line_ending, space0},
    combinator::{map, map_res, opt, recognize, value, verify},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
    IResult, Parser,
};
use snafu::ResultExt;

use crate::crc24::crc24;
use crate::crypto::hash::HashAlgorithm;
use crate::errors::{BadBase64Snafu, Error, Result};

/// Maximum number of base64 characters on a single body line.
pub const MAX_LINE_LEN: usize = 76;

/// Armor block types.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum BlockType {
    /// PGP public key
    PublicKey,
    /// PGP private key
    PrivateKey,
    /// PGP message
    Message,
    /// One part of a split message, `(part, total)` with `0` for an unknown total.
    MultiPartMessage(usize, usize),
    /// PGP signature
    Signature,
    // gnupg extension
    File,
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockType::PublicKey => f.write_str("PGP PUBLIC KEY BLOCK"),
            BlockType::PrivateKey => f.write_str("PGP PRIVATE KEY BLOCK"),
            BlockType::MultiPartMessage(x, y) => write!(f, "PGP MESSAGE, PART {x}/{y}"),
            BlockType::Message => f.write_str("PGP MESSAGE"),
            BlockType::Signature => f.write_str("PGP SIGNATURE"),
            BlockType::File => f.write_str("PGP ARMORED FILE"),
        }
    }
}

/// Armor Headers.
pub type Headers = BTreeMap<String, Vec<String>>;

/// A decoded ASCII armor block.
#[derive(derive_more::Debug, Clone, PartialEq, Eq)]
pub struct Armored {
    pub typ: BlockType,
    pub headers: Headers,
    /// Hash algorithms announced by a cleartext signed message.
    pub hashes: Option<Vec<String>>,
    /// The signed text of a cleartext signed message, dash escaping removed.
    pub cleartext: Option<String>,
    #[debug("{} bytes", body.len())]
    pub body: Vec<u8>,
    /// The declared CRC-24, already checked against `body`.
    pub checksum: u32,
}

impl Armored {
    pub fn from_string(input: &str) -> Result<Self> {
        unarmor(input.as_bytes())
    }

    /// Resolves the `Hash:` names of a cleartext signed message.
    ///
    /// Empty when no `Hash:` header was given, in which case MD5 is implied.
    pub fn hash_algorithms(&self) -> Result<Vec<HashAlgorithm>> {
        self.hashes
            .iter()
            .flatten()
            .map(|name| name.parse())
            .collect()
    }
}

fn malformed(context: impl Into<String>) -> Error {
    Error::MalformedArmor {
        context: context.into(),
    }
}

/// Parses a single ascii armor header separator.
fn armor_header_sep(i: &[u8]) -> IResult<&[u8], &[u8]> {
    tag("-----").parse(i)
}

fn parse_digit(x: &[u8]) -> std::result::Result<usize, Error> {
    str::from_utf8(x)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| malformed("invalid part number"))
}

/// Parses the type inside of an ascii armor header.
fn armor_header_type(i: &[u8]) -> IResult<&[u8], BlockType> {
    alt((
        value(BlockType::PublicKey, tag("PGP PUBLIC KEY BLOCK")),
        value(BlockType::PrivateKey, tag("PGP PRIVATE KEY BLOCK")),
        map(
            preceded(
                tag("PGP MESSAGE, PART "),
                pair(
                    map_res(digit1, parse_digit),
                    opt(preceded(tag("/"), map_res(digit1, parse_digit))),
                ),
            ),
            |(x, y)| BlockType::MultiPartMessage(x, y.unwrap_or(0)),
        ),
        value(BlockType::Message, tag("PGP MESSAGE")),
        value(BlockType::Signature, tag("PGP SIGNATURE")),
        value(BlockType::File, tag("PGP ARMORED FILE")),
    ))
    .parse(i)
}

/// Parses a single armor header line.
fn armor_header_line(i: &[u8]) -> IResult<&[u8], BlockType> {
    delimited(
        pair(armor_header_sep, tag("BEGIN ")),
        armor_header_type,
        pair(pair(armor_header_sep, space0), line_ending),
    )
    .parse(i)
}

/// Parses a single armor footer line.
fn armor_footer_line(i: &[u8]) -> IResult<&[u8], BlockType> {
    delimited(
        pair(armor_header_sep, tag("END ")),
        armor_header_type,
        pair(armor_header_sep, opt(pair(space0, line_ending))),
    )
    .parse(i)
}

/// Parses a single `Key: Value` pair.
fn key_value_pair(i: &[u8]) -> IResult<&[u8], (&str, &str)> {
    terminated(
        separated_pair(
            map_res(
                verify(take_until(": "), |k: &[u8]| {
                    !k.is_empty() && !k.contains(&b'\n')
                }),
                str::from_utf8,
            ),
            tag(": "),
            map_res(not_line_ending, str::from_utf8),
        ),
        line_ending,
    )
    .parse(i)
}

/// Parses the armor headers, merging repeated keys.
fn armor_headers(i: &[u8]) -> IResult<&[u8], Headers> {
    map(many0(key_value_pair), |pairs| {
        let mut out = Headers::new();
        for (k, v) in pairs {
            out.entry(k.to_string()).or_default().push(v.to_string());
        }
        out
    })
    .parse(i)
}

/// "A blank (zero length or containing only whitespace) line"
fn blank_lines(i: &[u8]) -> IResult<&[u8], ()> {
    value((), many0(pair(space0, line_ending))).parse(i)
}

fn is_base64_token(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'+' || c == b'/'
}

/// A body line: base64 characters, optional padding, at most [`MAX_LINE_LEN`] long.
fn base64_line(i: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(
        verify(
            recognize(pair(take_while1(is_base64_token), take_while(|c| c == b'='))),
            |line: &[u8]| line.len() <= MAX_LINE_LEN,
        ),
        pair(space0, line_ending),
    )
    .parse(i)
}

fn armor_body(i: &[u8]) -> IResult<&[u8], Vec<&[u8]>> {
    many0(base64_line).parse(i)
}

/// The `=XXXX` checksum line.
fn armor_checksum(i: &[u8]) -> IResult<&[u8], &[u8]> {
    delimited(
        tag("="),
        take_while_m_n(4, 4, is_base64_token),
        pair(space0, line_ending),
    )
    .parse(i)
}

fn cleartext_header_line(i: &[u8]) -> IResult<&[u8], &[u8]> {
    terminated(
        tag("-----BEGIN PGP SIGNED MESSAGE-----"),
        pair(space0, line_ending),
    )
    .parse(i)
}

fn hash_header_line(i: &[u8]) -> IResult<&[u8], Vec<&str>> {
    delimited(
        tag("Hash: "),
        separated_list1(
            pair(tag(","), space0),
            map_res(
                take_while1(|c: u8| c.is_ascii_alphanumeric() || c == b'-'),
                str::from_utf8,
            ),
        ),
        line_ending,
    )
    .parse(i)
}

/// The signed text up to the line that starts the signature block.
fn cleartext_body(i: &[u8]) -> IResult<&[u8], &[u8]> {
    if i.starts_with(b"-----BEGIN PGP ") {
        return Ok((i, &i[..0]));
    }
    terminated(take_until("\n-----BEGIN PGP "), tag("\n")).parse(i)
}

fn leading_text(i: &[u8]) -> IResult<&[u8], &[u8]> {
    take_until("-----BEGIN PGP ").parse(i)
}

fn hash_headers(i: &[u8]) -> IResult<&[u8], Vec<Vec<&str>>> {
    many0(hash_header_line).parse(i)
}

fn blank_line(i: &[u8]) -> IResult<&[u8], ()> {
    value((), pair(space0, line_ending)).parse(i)
}

/// Removes dash escaping ("- " prefixes) and normalizes line endings to `\n`.
fn dash_unescape(text: &[u8]) -> Result<String> {
    let text = str::from_utf8(text).map_err(|_| malformed("cleartext is not valid utf-8"))?;
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .map(|line| line.strip_prefix("- ").unwrap_or(line))
        .collect();
    Ok(lines.join("\n"))
}

/// Decodes the first ASCII armor block found in `input`.
///
/// Text before the first `-----BEGIN PGP ` line is ignored, as is anything
/// after the footer. A cleartext signed message yields the signature block
/// with the signed text in [`Armored::cleartext`].
pub fn unarmor(input: &[u8]) -> Result<Armored> {
    let (i, _) = leading_text(input).map_err(|_| malformed("no armor header line found"))?;

    let (i, hashes, cleartext) = match cleartext_header_line(i) {
        Ok((i, _)) => {
            let (i, hashes) = hash_headers(i)
                .map_err(|_| malformed("invalid Hash header in cleartext signed message"))?;
            let (i, _) = blank_line(i)
                .map_err(|_| malformed("missing blank line after the cleartext header"))?;
            let (i, text) = cleartext_body(i)
                .map_err(|_| malformed("cleartext is not followed by a signature"))?;
            let hashes: Vec<String> = hashes.into_iter().flatten().map(str::to_string).collect();
            let hashes = (!hashes.is_empty()).then_some(hashes);
            (i, hashes, Some(dash_unescape(text)?))
        }
        Err(_) => (i, None, None),
    };

    let (i, typ) = armor_header_line(i).map_err(|_| malformed("invalid armor header line"))?;
    if cleartext.is_some() && typ != BlockType::Signature {
        return Err(malformed(format!(
            "cleartext signed message followed by {typ} instead of a signature"
        )));
    }
    let (i, headers) = armor_headers(i).map_err(|_| malformed("invalid armor headers"))?;
    let (i, _) = blank_lines(i).map_err(|_| malformed("missing blank line"))?;
    let (i, lines) = armor_body(i).map_err(|_| malformed("invalid armor body"))?;
    let (i, checksum) = armor_checksum(i).map_err(|_| malformed("missing or invalid checksum line"))?;
    let (_, footer) = armor_footer_line(i).map_err(|_| malformed("missing armor footer line"))?;
    if footer != typ {
        return Err(malformed(format!(
            "footer {footer} does not match header {typ}"
        )));
    }

    let encoded: Vec<u8> = lines.concat();
    let body = STANDARD
        .decode(&encoded)
        .context(BadBase64Snafu {
            context: "armor body",
        })?;

    let checksum_bytes = STANDARD
        .decode(checksum)
        .context(BadBase64Snafu {
            context: "armor checksum",
        })?;
    let expected = checksum_bytes
        .iter()
        .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));
    let actual = crc24(&body);
    if actual != expected {
        return Err(Error::Crc24Mismatch { expected, actual });
    }

    debug!("unarmored {} block, {} bytes", typ, body.len());

    Ok(Armored {
        typ,
        headers,
        hashes,
        cleartext,
        body,
        checksum: expected,
    })
}
