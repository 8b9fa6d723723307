//! Dataset loader: local file or remote server with an on-disk HTTP cache.
//!
//! Uses `ureq` for synchronous HTTP requests. Cached responses are stored as
//! `<cache_dir>/<database>.json` next to the ETag they were served with, and
//! revalidated with `If-None-Match` on every fetch. If the server cannot be
//! reached, a cached copy is used instead.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::DatasetConfig;
use crate::dataset::RawDataset;
use crate::error::{LoadError, LoadResult, MovieQueryResult};

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetSource {
    /// A JSON file on disk.
    File(PathBuf),
    /// A dataset server endpoint.
    Remote {
        url: String,
        /// Cache file stem, e.g. `database_small`.
        name: String,
        cache_dir: Option<PathBuf>,
        timeout: Duration,
    },
}

impl DatasetSource {
    /// Select the source described by a dataset config.
    pub fn from_config(config: &DatasetConfig) -> Self {
        match &config.file {
            Some(path) => DatasetSource::File(path.clone()),
            None => DatasetSource::Remote {
                url: config.url(),
                name: config.size.database_name().to_string(),
                cache_dir: config.resolved_cache_dir(),
                timeout: Duration::from_secs(config.timeout_secs),
            },
        }
    }
}

/// Load the dataset described by `config`.
pub fn load(config: &DatasetConfig) -> MovieQueryResult<RawDataset> {
    load_source(&DatasetSource::from_config(config))
}

/// Load a dataset from an explicit source.
pub fn load_source(source: &DatasetSource) -> MovieQueryResult<RawDataset> {
    match source {
        DatasetSource::File(path) => load_file(path),
        DatasetSource::Remote {
            url,
            name,
            cache_dir,
            timeout,
        } => {
            let cache = cache_dir.as_deref().map(|dir| HttpCache::new(dir, name));
            let body = fetch(url, *timeout, cache.as_ref())?;
            Ok(RawDataset::from_json_str(&body)?)
        }
    }
}

/// Read a dataset from a local JSON file.
pub fn load_file(path: &Path) -> MovieQueryResult<RawDataset> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let dataset = RawDataset::from_reader(file)?;
    tracing::info!(
        path = %path.display(),
        movies = dataset.movies.len(),
        actors = dataset.actors.len(),
        "loaded dataset file"
    );
    Ok(dataset)
}

struct HttpCache {
    body: PathBuf,
    etag: PathBuf,
}

impl HttpCache {
    fn new(dir: &Path, name: &str) -> Self {
        Self {
            body: dir.join(format!("{name}.json")),
            etag: dir.join(format!("{name}.etag")),
        }
    }

    fn etag(&self) -> Option<String> {
        if !self.body.is_file() {
            return None;
        }
        std::fs::read_to_string(&self.etag)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn read(&self) -> LoadResult<String> {
        std::fs::read_to_string(&self.body).map_err(|source| LoadError::Cache {
            path: self.body.display().to_string(),
            source,
        })
    }

    fn store(&self, body: &str, etag: Option<&str>) -> LoadResult<()> {
        let cache_err = |path: &Path| {
            let path = path.display().to_string();
            move |source: std::io::Error| LoadError::Cache { path, source }
        };
        if let Some(dir) = self.body.parent() {
            std::fs::create_dir_all(dir).map_err(cache_err(dir))?;
        }
        std::fs::write(&self.body, body).map_err(cache_err(&self.body))?;
        match etag {
            Some(tag) => std::fs::write(&self.etag, tag).map_err(cache_err(&self.etag))?,
            // A stale tag must not validate the new body.
            None => match std::fs::remove_file(&self.etag) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        path = %self.etag.display(),
                        error = %e,
                        "failed to remove stale ETag"
                    );
                }
            },
        }
        Ok(())
    }
}

fn fetch(url: &str, timeout: Duration, cache: Option<&HttpCache>) -> LoadResult<String> {
    let agent = ureq::AgentBuilder::new().timeout(timeout).build();
    let mut request = agent.get(url);
    if let Some(tag) = cache.and_then(HttpCache::etag) {
        request = request.set("If-None-Match", &tag);
    }

    match request.call() {
        Ok(response) if response.status() == 304 => {
            tracing::info!(url, "dataset not modified, using cache");
            match cache {
                Some(cache) => cache.read(),
                None => Err(LoadError::HttpStatus {
                    url: url.to_string(),
                    status: 304,
                }),
            }
        }
        Ok(response) => {
            let etag = response.header("ETag").map(str::to_string);
            let mut body = String::new();
            response
                .into_reader()
                .read_to_string(&mut body)
                .map_err(|e| LoadError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            tracing::info!(url, bytes = body.len(), "fetched dataset");

            if let Some(cache) = cache {
                if let Err(e) = cache.store(&body, etag.as_deref()) {
                    tracing::warn!(error = %e, "failed to write dataset cache");
                }
            }
            Ok(body)
        }
        Err(ureq::Error::Status(status, _)) => Err(LoadError::HttpStatus {
            url: url.to_string(),
            status,
        }),
        Err(ureq::Error::Transport(transport)) => match cache {
            Some(cache) if cache.body.is_file() => {
                tracing::warn!(url, error = %transport, "server unreachable, using cached dataset");
                cache.read()
            }
            _ => Err(LoadError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetSize;
    use crate::error::MovieQueryError;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;

    const SMALL: &str = r#"{"movies": {"m1": {"title": "Apollo 13", "actors": ["1"]}},
                             "actors": {"1": "Tom Hanks"}}"#;

    fn unreachable_source(cache_dir: Option<PathBuf>) -> DatasetSource {
        DatasetSource::Remote {
            url: "http://127.0.0.1:1/database_small".into(),
            name: "database_small".into(),
            cache_dir,
            timeout: Duration::from_secs(2),
        }
    }

    #[test]
    fn file_source_wins_over_remote() {
        let cfg = DatasetConfig {
            file: Some(PathBuf::from("db.json")),
            ..Default::default()
        };
        assert_eq!(
            DatasetSource::from_config(&cfg),
            DatasetSource::File(PathBuf::from("db.json"))
        );
    }

    #[test]
    fn remote_source_uses_size_name() {
        let cfg = DatasetConfig {
            size: DatasetSize::Large,
            cache: false,
            ..Default::default()
        };
        match DatasetSource::from_config(&cfg) {
            DatasetSource::Remote {
                url,
                name,
                cache_dir,
                ..
            } => {
                assert!(url.ends_with("/database_large"));
                assert_eq!(name, "database_large");
                assert_eq!(cache_dir, None);
            }
            other => panic!("expected remote source, got {other:?}"),
        }
    }

    #[test]
    fn loads_local_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, SMALL).unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.movies.len(), 1);
        assert_eq!(ds.actors["1"], "Tom Hanks");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_file(Path::new("/no/such/db.json")).unwrap_err();
        assert!(matches!(err, MovieQueryError::Load(LoadError::Io { .. })));
    }

    #[test]
    fn unreachable_server_falls_back_to_cache() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = HttpCache::new(dir.path(), "database_small");
        cache.store(SMALL, Some("\"abc\"")).unwrap();
        assert_eq!(cache.etag().as_deref(), Some("\"abc\""));

        let ds = load_source(&unreachable_source(Some(dir.path().to_path_buf()))).unwrap();
        assert_eq!(ds.actors.len(), 1);
    }

    #[test]
    fn unreachable_server_without_cache_fails() {
        let err = load_source(&unreachable_source(None)).unwrap_err();
        assert!(matches!(err, MovieQueryError::Load(LoadError::Transport { .. })));
    }

    #[test]
    fn storing_without_etag_clears_old_tag() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = HttpCache::new(dir.path(), "db");
        cache.store("{}", Some("v1")).unwrap();
        cache.store("{}", None).unwrap();
        assert_eq!(cache.etag(), None);
    }

    #[test]
    fn etag_directory_does_not_fail_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = HttpCache::new(dir.path(), "db");
        // A directory where the tag file should be cannot be removed as a file.
        std::fs::create_dir_all(&cache.etag).unwrap();
        cache.store("{}", None).unwrap();
        assert_eq!(cache.etag(), None);
        assert_eq!(cache.read().unwrap(), "{}");
    }

    #[test]
    fn malformed_remote_document_is_relation_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = HttpCache::new(dir.path(), "database_small");
        cache.store(r#"{"movies": [], "actors": {}}"#, None).unwrap();

        let err = load_source(&unreachable_source(Some(dir.path().to_path_buf()))).unwrap_err();
        assert!(matches!(err, MovieQueryError::Relation(_)));
    }

    /// Serve one canned response per connection, reporting each request head.
    fn serve(responses: Vec<String>) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for response in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut head = String::new();
                loop {
                    let mut line = String::new();
                    if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                        break;
                    }
                    head.push_str(&line);
                }
                tx.send(head).unwrap();
                stream.write_all(response.as_bytes()).unwrap();
                stream.flush().unwrap();
            }
        });
        (format!("http://{addr}/database_small"), rx)
    }

    fn response(status: &str, headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\n{headers}Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    #[test]
    fn fetch_caches_and_revalidates() {
        let (url, requests) = serve(vec![
            response("200 OK", "ETag: \"v1\"\r\n", SMALL),
            response("304 Not Modified", "ETag: \"v1\"\r\n", ""),
            response("404 Not Found", "", ""),
        ]);
        let dir = tempfile::TempDir::new().unwrap();
        let cache = HttpCache::new(dir.path(), "database_small");
        let timeout = Duration::from_secs(5);

        let body = fetch(&url, timeout, Some(&cache)).unwrap();
        assert_eq!(body, SMALL);
        assert_eq!(cache.read().unwrap(), SMALL);
        assert_eq!(cache.etag().as_deref(), Some("\"v1\""));
        let first = requests.recv().unwrap().to_ascii_lowercase();
        assert!(!first.contains("if-none-match"));

        let body = fetch(&url, timeout, Some(&cache)).unwrap();
        assert_eq!(body, SMALL);
        let second = requests.recv().unwrap().to_ascii_lowercase();
        assert!(second.contains("if-none-match: \"v1\""), "{second}");

        let err = fetch(&url, timeout, Some(&cache)).unwrap_err();
        assert!(matches!(err, LoadError::HttpStatus { status: 404, .. }));
        assert_eq!(cache.read().unwrap(), SMALL);
    }
}
