use std::{
    fs::{self, File},
    io::{self, Read},
    path::{Path, PathBuf},
};

use encoding_rs::DecoderResult;
use log::{debug, trace};
use strum::Display;
use thiserror::Error;

/// Text encodings recognized from the first bytes of an export.
///
/// Display names follow the usual codec names so that they can be shown to
/// the operator as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Encoding {
    #[strum(to_string = "utf-16")]
    Utf16Le,
    #[strum(to_string = "utf-16")]
    Utf16Be,
    #[strum(to_string = "utf-8-sig")]
    Utf8Sig,
    #[strum(to_string = "utf-8")]
    Utf8,
}

impl Encoding {
    /// Sniffs a byte order mark. Anything unknown is plain UTF-8.
    pub fn from_bom(prefix: &[u8]) -> Self {
        if prefix.starts_with(&[0xff, 0xfe]) {
            Encoding::Utf16Le
        } else if prefix.starts_with(&[0xfe, 0xff]) {
            Encoding::Utf16Be
        } else if prefix.starts_with(&[0xef, 0xbb, 0xbf]) {
            Encoding::Utf8Sig
        } else {
            Encoding::Utf8
        }
    }

    pub fn bom_len(&self) -> usize {
        match self {
            Encoding::Utf16Le | Encoding::Utf16Be => 2,
            Encoding::Utf8Sig => 3,
            Encoding::Utf8 => 0,
        }
    }

    fn codec(&self) -> &'static encoding_rs::Encoding {
        match self {
            Encoding::Utf16Le => encoding_rs::UTF_16LE,
            Encoding::Utf16Be => encoding_rs::UTF_16BE,
            Encoding::Utf8Sig | Encoding::Utf8 => encoding_rs::UTF_8,
        }
    }

    /// Decodes a whole file content (BOM included) without any replacement
    /// character: the first malformed sequence aborts decoding.
    pub fn decode(&self, data: &[u8]) -> Result<String, LoadError> {
        let body = data.get(self.bom_len()..).unwrap_or_default();
        let mut decoder = self.codec().new_decoder_without_bom_handling();
        let capacity = decoder
            .max_utf8_buffer_length_without_replacement(body.len())
            .ok_or(LoadError::Decode {
                encoding: *self,
                offset: self.bom_len(),
            })?;
        let mut decoded = String::with_capacity(capacity);
        let (result, read) = decoder.decode_to_string_without_replacement(body, &mut decoded, true);
        match result {
            DecoderResult::InputEmpty => Ok(decoded),
            DecoderResult::Malformed(bad, extra) => Err(LoadError::Decode {
                encoding: *self,
                offset: self.bom_len() + read - bad as usize - extra as usize,
            }),
            // Capacity is computed for the worst case
            DecoderResult::OutputFull => Err(LoadError::Decode {
                encoding: *self,
                offset: self.bom_len() + read,
            }),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("File '{}' not found. Please check.", .0.display())]
    FileNotFound(PathBuf),
    #[error("Error reading the file: invalid {encoding} data at byte {offset}")]
    Decode { encoding: Encoding, offset: usize },
    #[error("Error reading the file: {0}")]
    Io(#[from] io::Error),
}

fn map_open_error(path: &Path, err: io::Error) -> LoadError {
    if err.kind() == io::ErrorKind::NotFound {
        LoadError::FileNotFound(path.to_path_buf())
    } else {
        LoadError::Io(err)
    }
}

/// Reads the first four bytes of `path` and guesses its encoding.
pub fn detect_encoding(path: &Path) -> Result<Encoding, LoadError> {
    let file = File::open(path).map_err(|err| map_open_error(path, err))?;
    let mut prefix = Vec::with_capacity(4);
    file.take(4).read_to_end(&mut prefix)?;
    trace!("First bytes of {}: {:02x?}", path.display(), prefix);
    Ok(Encoding::from_bom(&prefix))
}

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    encoding: Encoding,
    content: String,
}

impl LoadedDocument {
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Loads and decodes the whole file.
pub fn load(path: &Path) -> Result<LoadedDocument, LoadError> {
    let encoding = detect_encoding(path)?;
    debug!("Detected encoding {:?} for {}", encoding, path.display());

    let data = fs::read(path).map_err(|err| map_open_error(path, err))?;
    debug!("Read {} bytes from {}", data.len(), path.display());

    let content = encoding.decode(&data)?;
    Ok(LoadedDocument { encoding, content })
}
