use crate::document::store::document_id;
use crate::utils::error::{Result, SanitizerError};
use encoding_rs::{Encoding, UTF_16LE, UTF_8};
use mime_guess::mime;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, error, info};
use walkdir::WalkDir;

/// Encodings the loader knows how to try, in strict (non-replacing) mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Ascii,
    Utf16,
}

impl TextEncoding {
    /// Decode without replacement characters; `None` means the bytes are not
    /// valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => decode_strict(UTF_8, bytes),
            // ISO-8859-1 maps every byte to the code point of the same value
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Utf16 => match Encoding::for_bom(bytes) {
                Some((encoding, bom_len)) if encoding != UTF_8 => {
                    decode_strict(encoding, bytes.get(bom_len..)?)
                }
                _ => decode_strict(UTF_16LE, bytes),
            },
        }
    }
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

impl FromStr for TextEncoding {
    type Err = SanitizerError;

    fn from_str(label: &str) -> Result<Self> {
        match label.trim().to_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            "utf-16" | "utf16" => Ok(Self::Utf16),
            other => Err(SanitizerError::UnknownEncoding(other.to_string())),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Ascii => "ascii",
            Self::Utf16 => "utf-16",
        };
        f.write_str(name)
    }
}

pub struct DocumentLoader {
    encodings: Vec<TextEncoding>,
}

impl DocumentLoader {
    pub fn new(encodings: Vec<TextEncoding>) -> Self {
        Self { encodings }
    }

    /// Read a text file, trying each configured encoding in order.
    pub async fn read_with_fallback(&self, path: &Path) -> Result<String> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SanitizerError::FileNotFound(path.display().to_string())
            } else {
                SanitizerError::IoError(e)
            }
        })?;

        for encoding in &self.encodings {
            match encoding.decode(&bytes) {
                Some(text) => {
                    info!("Successfully read file {:?} with encoding {}", path, encoding);
                    return Ok(text);
                }
                None => debug!("Failed to read {:?} with encoding {}", path, encoding),
            }
        }

        error!("Unable to read the file {:?} with any of the attempted encodings", path);
        Err(SanitizerError::UnreadableEncoding(path.to_path_buf()))
    }

    /// Check whether a path carries one of the accepted extensions.
    pub fn is_supported(path: &Path, extensions: &[String]) -> bool {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension {
            Some(ext) => extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext)),
            None => false,
        }
    }

    /// Resolve the user-supplied path into the document list and the
    /// directory the output folders are created under.
    pub fn collect_inputs(path: &Path, extensions: &[String]) -> Result<(Vec<PathBuf>, PathBuf)> {
        if path.is_file() {
            if !Self::is_supported(path, extensions) {
                return Err(SanitizerError::ConfigError(format!(
                    "Unsupported file type: {:?}",
                    path
                )));
            }
            let source_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            return Ok((vec![path.to_path_buf()], source_dir));
        }

        if !path.is_dir() {
            return Err(SanitizerError::FileNotFound(path.display().to_string()));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|p| Self::is_supported(p, extensions) && Self::looks_like_text(p))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(SanitizerError::ConfigError(format!(
                "No text files found in the specified folder: {:?}",
                path
            )));
        }

        Self::ensure_unique_ids(&files)?;

        info!("Found {} text files in {:?}", files.len(), path);
        Ok((files, path.to_path_buf()))
    }

    /// Two inputs sharing a document id would write the same chunk folder,
    /// output and log, so such a batch is refused up front.
    fn ensure_unique_ids(files: &[PathBuf]) -> Result<()> {
        let mut seen: HashMap<String, &PathBuf> = HashMap::with_capacity(files.len());
        for file in files {
            let id = document_id(file);
            if let Some(previous) = seen.insert(id.clone(), file) {
                return Err(SanitizerError::ConfigError(format!(
                    "{:?} and {:?} both map to document id '{}'; rename one of them",
                    previous, file, id
                )));
            }
        }
        Ok(())
    }

    fn looks_like_text(path: &Path) -> bool {
        match mime_guess::from_path(path).first() {
            Some(m) => m.type_() == mime::TEXT,
            // Unknown extensions were explicitly configured, trust them
            None => true,
        }
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new(vec![
            TextEncoding::Utf8,
            TextEncoding::Latin1,
            TextEncoding::Ascii,
            TextEncoding::Utf16,
        ])
    }
}
