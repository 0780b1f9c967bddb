use std::env;
use std::path::PathBuf;

/// Where organization partitions are persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process memory only; state is lost on restart.
    Memory,
    /// One JSON document per organization under `dir`.
    File { dir: PathBuf },
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl StoreConfig {
    pub fn from_env() -> Self {
        let dir = env::var("STORE_DIR").unwrap_or_else(|_| "storage/partitions".to_string());
        let backend = env::var("STORE_BACKEND").unwrap_or_else(|_| "memory".to_string());

        Self {
            backend: parse_backend(&backend, dir),
        }
    }

    pub fn memory() -> Self {
        Self {
            backend: StoreBackend::Memory,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::memory()
    }
}

fn parse_backend(name: &str, dir: String) -> StoreBackend {
    match name.trim().to_lowercase().as_str() {
        "file" | "json" => StoreBackend::File {
            dir: PathBuf::from(dir),
        },
        _ => StoreBackend::Memory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend() {
        assert_eq!(
            parse_backend("FILE", "data".to_string()),
            StoreBackend::File {
                dir: PathBuf::from("data")
            }
        );
        assert_eq!(parse_backend("memory", "data".to_string()), StoreBackend::Memory);
        assert_eq!(parse_backend("unknown", "data".to_string()), StoreBackend::Memory);
    }
}
