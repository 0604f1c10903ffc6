use std::path::Path;
use std::process::{Command, Output};

use serde_json::json;
use wiremock::MockServer;

/// Base URL of the mock server, with a trailing slash.
pub fn mock_base(server: &MockServer) -> String {
    format!("http://127.0.0.1:{}/", server.address().port())
}

/// Authorized-user JSON whose token endpoint is the mock server.
pub fn token_json(server: &MockServer, token: &str, expiry: &str) -> String {
    json!({
        "token": token,
        "refresh_token": "r1",
        "token_uri": format!("{}token", mock_base(server)),
        "client_id": "c",
        "client_secret": "s",
        "scopes": ["https://www.googleapis.com/auth/calendar.readonly"],
        "expiry": expiry
    })
    .to_string()
}

/// Run the CLI binary with a clean environment plus `envs`.
///
/// Runs on a blocking thread so the mock server keeps serving.
pub async fn run_cli(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wsrelay"));
    cmd.args(args);
    for name in [
        "GOOGLE_TOKEN",
        "RAILWAY_TOKEN_JSON",
        "WSRELAY_TOKEN_FILE",
        "WSRELAY_API_BASE",
        "WSRELAY_MAX_PAGES",
        "WSRELAY_PAGE_TIMEOUT",
        "RUST_LOG",
    ] {
        cmd.env_remove(name);
    }
    cmd.env("NO_COLOR", "1");
    cmd.envs(envs.iter().copied());

    tokio::task::spawn_blocking(move || cmd.output().expect("Failed to execute CLI"))
        .await
        .expect("CLI thread panicked")
}

/// Write `contents` to `name` under `dir`, returning the path as a string.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
