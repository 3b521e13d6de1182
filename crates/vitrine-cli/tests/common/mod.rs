#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

pub const SHELL: &str = r##"<!doctype html>
<html>
<head>
  <title>Boulangerie Martin</title>
  <meta name="description" content="">
  <link rel="stylesheet" href="css/site.css">
</head>
<body>
  <nav><ul class="menu">
    <li><a href="#/">Accueil</a></li>
    <li><a href="#/about">À propos</a></li>
    <li><a href="#/contact">Contact</a></li>
  </ul></nav>
  <main>
    <header><h1>Chargement…</h1></header>
    <div class="corps">Chargement…</div>
  </main>
</body>
</html>"##;

fn config_dir() -> &'static Path {
    static CONFIG_DIR: OnceLock<TempDir> = OnceLock::new();
    CONFIG_DIR
        .get_or_init(|| tempfile::tempdir().expect("failed to create config dir for tests"))
        .path()
}

/// Create a `vitrine` command isolated from the user's configuration.
pub fn vitrine_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vitrine"));
    cmd.timeout(CMD_TIMEOUT);
    cmd.env("VITRINE_CONFIG", config_dir().join("absent.toml"));
    cmd.env_remove("VITRINE_BASE_URL");
    cmd.env_remove("VITRINE_DEFAULT_PAGE");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Serve `body` at `file` with `status`.
#[allow(dead_code)]
pub async fn mount(server: &MockServer, file: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(file))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

/// A server hosting the shell, three menu pages and the not-found page.
#[allow(dead_code)]
pub async fn bakery_site() -> MockServer {
    let server = MockServer::start().await;
    mount(&server, "/index.html", 200, SHELL).await;
    mount(
        &server,
        "/pages/accueil.html",
        200,
        "<h1>Bienvenue</h1><meta-description>X</meta-description><template><p>Hi</p></template>",
    )
    .await;
    mount(&server, "/pages/about.html", 200, "<h1>À propos</h1>").await;
    mount(&server, "/pages/contact.html", 200, "<h1>Contact</h1>").await;
    mount(&server, "/pages/@404.html", 200, "<h1>Page introuvable</h1>").await;
    server
}
