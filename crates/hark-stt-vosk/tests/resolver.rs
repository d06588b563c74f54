//! End-to-end model resolution: download, extraction, caching.
//!
//! A throwaway HTTP server on a loopback port serves a crafted model
//! archive so the tests can observe exactly how many network fetches a
//! resolution performs.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use hark_stt_vosk::model::{ModelError, ModelReference, ModelResolver};

fn model_zip_bytes(dir_name: &str) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        let options = zip::write::SimpleFileOptions::default();
        zip.add_directory(format!("{dir_name}/"), options).unwrap();
        zip.start_file(format!("{dir_name}/am/final.mdl"), options)
            .unwrap();
        zip.write_all(b"fake acoustic model").unwrap();
        zip.start_file(format!("{dir_name}/conf/model.conf"), options)
            .unwrap();
        zip.write_all(b"--sample-frequency=16000").unwrap();
        zip.finish().unwrap();
    }
    buf
}

/// Serve `body` for up to `max_requests` GETs, counting the hits.
fn serve(body: Vec<u8>, status_line: &'static str, max_requests: usize) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_in_thread = hits.clone();

    thread::spawn(move || {
        for stream in listener.incoming().take(max_requests) {
            let Ok(mut stream) = stream else { break };
            hits_in_thread.fetch_add(1, Ordering::SeqCst);

            // Drain the request head.
            let mut buf = [0u8; 1024];
            let mut head = Vec::new();
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }

            let _ = write!(
                stream,
                "{}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status_line,
                body.len()
            );
            let _ = stream.write_all(&body);
        }
    });

    (format!("http://127.0.0.1:{port}"), hits)
}

fn assert_complete_model(path: &Path) {
    assert!(path.join("am/final.mdl").is_file());
    assert!(path.join("conf/model.conf").is_file());
}

#[test]
fn resolving_a_url_twice_downloads_exactly_once() {
    let (base, hits) = serve(
        model_zip_bytes("vosk-model-small-xx-0.1"),
        "HTTP/1.1 200 OK",
        8,
    );
    let cache = tempfile::tempdir().unwrap();
    let resolver = ModelResolver::with_cache_root(cache.path());
    let reference = ModelReference::Url(format!("{base}/vosk-model-small-xx-0.1.zip"));

    let first = resolver.resolve(&reference).unwrap();
    assert_complete_model(&first.path);
    assert_eq!(first.path, cache.path().join("vosk-model-small-xx-0.1"));

    let second = resolver.resolve(&reference).unwrap();
    assert_eq!(first, second);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn interrupted_extraction_leads_to_a_clean_redownload() {
    let (base, hits) = serve(
        model_zip_bytes("vosk-model-small-yy-0.2"),
        "HTTP/1.1 200 OK",
        8,
    );
    let cache = tempfile::tempdir().unwrap();
    let resolver = ModelResolver::with_cache_root(cache.path());
    let reference = ModelReference::Url(format!("{base}/vosk-model-small-yy-0.2.zip"));

    let first = resolver.resolve(&reference).unwrap();
    assert_complete_model(&first.path);

    // Simulate a crash between download and rename-into-place: the final
    // entry is gone and a half-extracted temp directory is left behind.
    fs::remove_dir_all(&first.path).unwrap();
    fs::create_dir_all(cache.path().join(".tmp-crashed/vosk-model-small-yy-0.2/am")).unwrap();

    let again = resolver.resolve(&reference).unwrap();
    assert_complete_model(&again.path);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[test]
fn non_success_response_is_a_download_failure() {
    let (base, _hits) = serve(b"gone".to_vec(), "HTTP/1.1 404 Not Found", 8);
    let cache = tempfile::tempdir().unwrap();
    let resolver = ModelResolver::with_cache_root(cache.path());
    let reference = ModelReference::Url(format!("{base}/vosk-model-zz.zip"));

    let err = resolver.resolve(&reference).unwrap_err();
    assert!(matches!(err, ModelError::DownloadFailed { .. }));
    // Nothing half-usable was left in the cache.
    assert!(!cache.path().join("vosk-model-zz").exists());
}

#[test]
fn corrupted_download_is_rejected_and_leaves_no_entry() {
    let (base, _hits) = serve(b"definitely not a zip".to_vec(), "HTTP/1.1 200 OK", 8);
    let cache = tempfile::tempdir().unwrap();
    let resolver = ModelResolver::with_cache_root(cache.path());
    let reference = ModelReference::Url(format!("{base}/vosk-model-bad.zip"));

    let err = resolver.resolve(&reference).unwrap_err();
    assert!(matches!(err, ModelError::ExtractionFailed(_)));
    assert!(!cache.path().join("vosk-model-bad").exists());

    // The temporary archive was cleaned up as well.
    let stray: Vec<_> = fs::read_dir(cache.path())
        .unwrap()
        .filter_map(Result::ok)
        .collect();
    assert!(stray.is_empty(), "unexpected cache leftovers: {stray:?}");
}
