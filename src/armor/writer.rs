use std::collections::BTreeMap;
use std::hash::Hasher;
use std::io::Write;

use base64::engine::{general_purpose, Engine as _};

use crate::armor::{BlockType, MAX_LINE_LEN};
use crate::crc24::Crc24Hasher;
use crate::errors::Result;

/// Writes `body` as an ASCII armor block of type `typ`.
pub fn write(
    body: &[u8],
    typ: BlockType,
    headers: Option<&BTreeMap<String, String>>,
    writer: &mut impl Write,
) -> Result<()> {
    // write armor header
    writeln!(writer, "-----BEGIN {typ}-----")?;

    // write armor headers
    if let Some(headers) = headers {
        for (key, value) in headers.iter() {
            crate::ensure!(
                !key.contains(':') && !key.contains('\n') && !value.contains('\n'),
                "invalid armor header {:?}",
                key
            );
            writer.write_all(key.as_bytes())?;
            writer.write_all(&b": "[..])?;
            writer.write_all(value.as_bytes())?;
            writer.write_all(&b"\n"[..])?;
        }
    }

    writer.write_all(&b"\n"[..])?;

    // write body
    let encoded = general_purpose::STANDARD.encode(body);
    for line in encoded.as_bytes().chunks(MAX_LINE_LEN) {
        writer.write_all(line)?;
        writer.write_all(&b"\n"[..])?;
    }

    // write crc
    let mut crc_hasher = Crc24Hasher::new();
    crc_hasher.write(body);
    let crc = crc_hasher.finish() as u32;
    let crc_buf = [(crc >> 16) as u8, (crc >> 8) as u8, crc as u8];
    writer.write_all(b"=")?;
    writer.write_all(general_purpose::STANDARD.encode(crc_buf).as_bytes())?;
    writer.write_all(&b"\n"[..])?;

    // write footer
    writeln!(writer, "-----END {typ}-----")?;
    writer.flush()?;

    Ok(())
}

/// Convenience wrapper around [`write`] producing a `String`.
pub fn to_armored_string(
    body: &[u8],
    typ: BlockType,
    headers: Option<&BTreeMap<String, String>>,
) -> Result<String> {
    let mut buf = Vec::new();
    write(body, typ, headers, &mut buf)?;
    // only ascii is ever written
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
