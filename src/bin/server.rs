#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::io::Cursor;
#[cfg(not(target_arch = "wasm32"))]
use std::path::{Path, PathBuf};
#[cfg(not(target_arch = "wasm32"))]
use tiny_http::{Header, Response, Server, StatusCode};

/// Serves the browser bundle (index.html, app.js and the wasm-pack output).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug)]
struct Opts {
    /// Address to listen on
    #[arg(default_value = "127.0.0.1:8080")]
    addr: String,
    /// Directory holding the bundle
    #[arg(long, default_value = "web")]
    root: PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    let root = std::env::current_dir()?.join(&opts.root);
    if !root.exists() {
        anyhow::bail!("web directory not found at {}", root.display());
    }

    println!("Serving {} on http://{}", root.display(), opts.addr);
    let server = Server::http(&opts.addr).map_err(|e| anyhow::anyhow!(e))?;
    for request in server.incoming_requests() {
        let url = request.url().to_string();
        let method = request.method().to_string();
        let status = match sanitize_path(&root, url.split('?').next().unwrap_or("/")) {
            Some(p) => match fs::File::open(&p) {
                Ok(file) => {
                    let mut resp = Response::from_file(file).with_status_code(StatusCode(200));
                    if let Ok(h) = Header::from_bytes("Content-Type", content_type_for(&p).as_bytes())
                    {
                        resp.add_header(h);
                    }
                    let _ = request.respond(resp);
                    200
                }
                Err(_) => {
                    let _ = request.respond(not_found_response());
                    404
                }
            },
            None => {
                let _ = request.respond(not_found_response());
                404
            }
        };
        println!("{} {} -> {}", method, url, status);
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn sanitize_path(root: &Path, url: &str) -> Option<PathBuf> {
    let rel = if url == "/" { "index.html" } else { url.trim_start_matches('/') };
    if rel.split('/').any(|part| part == "..") {
        return None;
    }
    let full = root.join(rel);
    let path = if full.is_dir() {
        full.join("index.html")
    } else {
        full
    };
    if path.exists() && path.starts_with(root) {
        Some(path)
    } else {
        None
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
        "html" => "text/html; charset=utf-8",
        "js" => "application/javascript",
        "css" => "text/css",
        "wasm" => "application/wasm",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn not_found_response() -> Response<Cursor<Vec<u8>>> {
    Response::from_string("Not Found").with_status_code(StatusCode(404))
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn content_types_for_bundle_files() {
        assert_eq!(content_type_for(Path::new("pkg/blockfall_bg.wasm")), "application/wasm");
        assert_eq!(content_type_for(Path::new("app.js")), "application/javascript");
        assert_eq!(content_type_for(Path::new("index.html")), "text/html; charset=utf-8");
    }

    #[test]
    fn parent_segments_are_rejected() {
        let root = std::env::temp_dir();
        assert_eq!(sanitize_path(&root, "/../etc/passwd"), None);
    }
}
