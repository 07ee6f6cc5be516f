use axum::http::header;
use axum::Json;
use serde_json::{json, Value};

/// Farcaster Mini App manifest, served at /.well-known/farcaster.json.
/// Clients must always see the current version, hence the no-store headers.
pub async fn farcaster_manifest() -> ([(header::HeaderName, &'static str); 2], Json<Value>) {
    let manifest = json!({
        "accountAssociation": {
            "header": "eyJmaWQiOjE5MDUyMiwidHlwZSI6ImF1dGgiLCJrZXkiOiIweDk5RjZGZTYwZTJCYTM0MzI1MTI5ZEJEMmNEZGM0NTdEMjk3MzY4RjgifQ",
            "payload": "eyJkb21haW4iOiJldGhvc3JhZGFyLmNvbSJ9",
            "signature": "Ap2jpG3Hb7ifpde/kd56Hr6Z8e4mOnSi7tQZU25LYsVtsveU1T2LyfqQmB1oy0w1Mwm31IDlQlWKuAoOIquj0Bs="
        },
        "miniapp": {
            "version": "1",
            "name": "EthosRadar",
            "homeUrl": "https://ethosradar.vercel.app",
            "iconUrl": "https://ethosradar.vercel.app/logo1.png",
            "subtitle": "Trust Score Scanner for Web3",
            "description": "Generate your personalized trust reputation card on Ethos Protocol",
            "buttonTitle": "Scan Your Trust Score",
            "primaryCategory": "utility",
            "tags": ["trust", "reputation", "ethos", "crypto", "web3"]
        }
    });

    (
        [
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(manifest),
    )
}
