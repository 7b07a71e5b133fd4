use std::net::TcpStream;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PASSWORD: &str = "password123";
pub const HOSTED_IMAGE_URL: &str =
    "https://res.cloudinary.com/demo/image/upload/v1712/books/cli-cover.png";

const STARTUP_TIMEOUT: Duration = Duration::from_secs(20);

/// A `bookshelf serve` child process backed by a temporary database and a mocked
/// Cloudinary. The process is killed on drop.
pub struct TestServer {
    pub url: String,
    child: Child,
    _data_dir: TempDir,
    _cloudinary: MockServer,
    _runtime: Runtime,
}

impl TestServer {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("tokio runtime");
        let cloudinary = runtime.block_on(mock_cloudinary());

        let data_dir = tempfile::tempdir().expect("temp dir");
        let database_url = format!("sqlite://{}", data_dir.path().join("bookshelf.db").display());
        let port = portpicker::pick_unused_port().expect("free port");
        let bind_address = format!("127.0.0.1:{port}");

        let child = Command::new(env!("CARGO_BIN_EXE_bookshelf"))
            .arg("serve")
            .env("BOOKSHELF_DATABASE_URL", &database_url)
            .env("BOOKSHELF_BIND_ADDRESS", &bind_address)
            .env("BOOKSHELF_JWT_SECRET", "cli-test-secret")
            .env("BOOKSHELF_JWT_EXPIRES_IN", "1h")
            .env("BOOKSHELF_CLOUDINARY_CLOUD_NAME", "demo")
            .env("BOOKSHELF_CLOUDINARY_API_KEY", "cli-key")
            .env("BOOKSHELF_CLOUDINARY_API_SECRET", "cli-secret")
            .env("BOOKSHELF_CLOUDINARY_API_URL", cloudinary.uri())
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn bookshelf serve");

        wait_for_port(&bind_address);

        Self {
            url: format!("http://{bind_address}"),
            child,
            _data_dir: data_dir,
            _cloudinary: cloudinary,
            _runtime: runtime,
        }
    }

    /// Runs the CLI against this server. `BOOKSHELF_TOKEN` is cleared unless given in `envs`.
    pub fn run(&self, args: &[&str], envs: &[(&str, &str)]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_bookshelf"))
            .args(args)
            .env("BOOKSHELF_URL", &self.url)
            .env_remove("BOOKSHELF_TOKEN")
            .env_remove("BOOKSHELF_PASSWORD")
            .env("RUST_LOG", "off")
            .envs(envs.iter().copied())
            .output()
            .expect("failed to run bookshelf")
    }

    /// Registers `username` and returns its token.
    pub fn register(&self, username: &str) -> String {
        let email = format!("{username}@example.com");
        let output = self.run(
            &[
                "register",
                "--email",
                &email,
                "--username",
                username,
                "--password",
                PASSWORD,
            ],
            &[],
        );
        let body = stdout_json(&output);
        body["token"].as_str().expect("token in output").to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

async fn mock_cloudinary() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/demo/image/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": HOSTED_IMAGE_URL,
            "public_id": "books/cli-cover",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/demo/image/destroy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "ok"})))
        .mount(&server)
        .await;
    server
}

fn wait_for_port(address: &str) {
    let deadline = Instant::now() + STARTUP_TIMEOUT;
    while Instant::now() < deadline {
        if TcpStream::connect(address).is_ok() {
            return;
        }
        thread::sleep(Duration::from_millis(50));
    }
    panic!("server did not start listening on {address}");
}
