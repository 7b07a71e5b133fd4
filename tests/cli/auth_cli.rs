use crate::helpers::{PASSWORD, TestServer, stdout_json};

#[test]
fn register_prints_token_and_user() {
    let server = TestServer::start();

    let output = server.run(
        &[
            "register",
            "--email",
            "cli@example.com",
            "--username",
            "cli-reader",
            "--password",
            PASSWORD,
        ],
        &[],
    );

    let body = stdout_json(&output);
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], "cli-reader");
    assert!(body["user"].get("password").is_none());
}

#[test]
fn login_reads_password_from_environment() {
    let server = TestServer::start();
    server.register("cli-reader");

    let output = server.run(
        &["login", "--email", "cli-reader@example.com"],
        &[("BOOKSHELF_PASSWORD", PASSWORD)],
    );

    let body = stdout_json(&output);
    assert_eq!(body["user"]["email"], "cli-reader@example.com");
}

#[test]
fn failed_login_reports_server_message() {
    let server = TestServer::start();
    server.register("cli-reader");

    let output = server.run(
        &[
            "login",
            "--email",
            "cli-reader@example.com",
            "--password",
            "wrong-password",
        ],
        &[],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid email or password"),
        "unexpected stderr: {stderr}"
    );
}
