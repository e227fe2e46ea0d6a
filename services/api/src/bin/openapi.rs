//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the configuration endpoints. The output
//! path is the first argument, `openapi.json` by default.

use api_lib::web::rest::ApiDoc;
use std::{env, fs, io, path::PathBuf};
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

fn main() -> io::Result<()> {
    let output = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let document = ApiDoc::openapi();
    let route_count = document.paths.paths.len();
    let json = document.to_pretty_json().map_err(io::Error::other)?;
    fs::write(&output, json)?;

    println!("Wrote {route_count} routes to {}", output.display());
    Ok(())
}
