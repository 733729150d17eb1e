//! Session signing key loading.

use std::path::{Path, PathBuf};

use actix_web::cookie::Key;
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_MIN_LEN: usize = 64;

/// Failures resolving the cookie signing key.
#[derive(Debug, thiserror::Error)]
pub enum SessionKeyError {
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} is {length} bytes; at least {min_len} required")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Read the key material at `path`.
///
/// A missing, unreadable, or short key file yields a random key when
/// `allow_ephemeral` is set and an error otherwise.
pub fn load_session_key(path: &Path, allow_ephemeral: bool) -> Result<Key, SessionKeyError> {
    match std::fs::read(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                if allow_ephemeral {
                    warn!(
                        path = %path.display(),
                        length,
                        "session key too short; using temporary key (dev only)"
                    );
                    return Ok(Key::generate());
                }
                return Err(SessionKeyError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionKeyError::KeyRead {
            path: path.to_path_buf(),
            source: error,
        }),
    }
}
