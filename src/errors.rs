use snafu::{Backtrace, Snafu};

pub type Result<T, E = Error> = ::std::result::Result<T, E>;

/// Error types
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display(
        "short read: {context} at offset {offset}: needed {needed}, remaining {remaining}"
    ))]
    ShortRead {
        context: &'static str,
        offset: usize,
        needed: usize,
        remaining: usize,
    },
    #[snafu(display("malformed armor: {context}"))]
    MalformedArmor { context: String },
    #[snafu(display("bad base64 in {context}: {source}"))]
    BadBase64 {
        context: &'static str,
        source: base64::DecodeError,
    },
    #[snafu(display("crc24 mismatch: declared {expected:06X}, computed {actual:06X}"))]
    Crc24Mismatch { expected: u32, actual: u32 },
    /// Nearly always a wrong key or passphrase.
    #[snafu(display("prefix check failed: {context}"))]
    PrefixCheckFailed { context: String },
    #[snafu(display("modification detection code mismatch: {context}"))]
    MdcMismatch { context: String },
    #[snafu(display("checksum mismatch: {context}"))]
    ChecksumMismatch { context: String },
    #[snafu(display("unsupported algorithm: {context}"))]
    UnsupportedAlgorithm { context: String },
    #[snafu(display("malformed packet: {context}"))]
    MalformedPacket { context: String },
    #[snafu(display("invalid key material: {context}"))]
    InvalidKeyMaterial { context: String },
    #[snafu(display("invalid input: {context}"))]
    InvalidInput { context: String },
    #[snafu(transparent)]
    Io {
        source: std::io::Error,
        backtrace: Backtrace,
    },
}

/// Discriminant of [`Error`], for callers that branch on the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ShortRead,
    MalformedArmor,
    BadBase64,
    Crc24Mismatch,
    PrefixCheckFailed,
    MdcMismatch,
    ChecksumMismatch,
    UnsupportedAlgorithm,
    MalformedPacket,
    InvalidKeyMaterial,
    InvalidInput,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ShortRead { .. } => ErrorKind::ShortRead,
            Self::MalformedArmor { .. } => ErrorKind::MalformedArmor,
            Self::BadBase64 { .. } => ErrorKind::BadBase64,
            Self::Crc24Mismatch { .. } => ErrorKind::Crc24Mismatch,
            Self::PrefixCheckFailed { .. } => ErrorKind::PrefixCheckFailed,
            Self::MdcMismatch { .. } => ErrorKind::MdcMismatch,
            Self::ChecksumMismatch { .. } => ErrorKind::ChecksumMismatch,
            Self::UnsupportedAlgorithm { .. } => ErrorKind::UnsupportedAlgorithm,
            Self::MalformedPacket { .. } => ErrorKind::MalformedPacket,
            Self::InvalidKeyMaterial { .. } => ErrorKind::InvalidKeyMaterial,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Io { .. } => ErrorKind::Io,
        }
    }
}

impl From<cipher::InvalidLength> for Error {
    fn from(_: cipher::InvalidLength) -> Error {
        Error::InvalidInput {
            context: "cfb: invalid key or iv length".to_string(),
        }
    }
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(err: derive_builder::UninitializedFieldError) -> Error {
        Error::InvalidInput {
            context: err.to_string(),
        }
    }
}

#[macro_export]
macro_rules! unsupported_err {
    ($e:expr) => {
        return Err($crate::errors::Error::UnsupportedAlgorithm { context: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::UnsupportedAlgorithm { context: format!($fmt, $($arg)+) })
    };
}

#[macro_export]
macro_rules! malformed_err {
    ($e:expr) => {
        return Err($crate::errors::Error::MalformedPacket { context: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::MalformedPacket { context: format!($fmt, $($arg)+) })
    };
}

#[macro_export]
macro_rules! bail {
    ($e:expr) => {
        return Err($crate::errors::Error::InvalidInput { context: $e.to_string() })
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::errors::Error::InvalidInput { context: format!($fmt, $($arg)+) })
    };
}

#[macro_export]
macro_rules! format_err {
    ($e:expr) => {
        $crate::errors::Error::InvalidInput { context: $e.to_string() }
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::errors::Error::InvalidInput { context: format!($fmt, $($arg)+) }
    };
}

#[macro_export(local_inner_macros)]
macro_rules! ensure {
    ($cond:expr, $e:expr) => {
        if !($cond) {
            bail!($e);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)+) => {
        if !($cond) {
            bail!($fmt, $($arg)+);
        }
    };
}
