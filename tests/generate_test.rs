#![cfg(unix)]

use base64::{engine::general_purpose::STANDARD, Engine};
use gemini_relay::{ChatContentPart, ChatMessage, ClientConfig, Error, GeminiClient, LlmProvider};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::tempdir;

/// Client whose "CLI" is a shell snippet; the generated flags land in `$1..`
fn fake_cli(script: &str, attachment_dir: &Path) -> ClientConfig {
    ClientConfig {
        executable: "sh".to_string(),
        timeout_secs: 10.0,
        attachment_dir: attachment_dir.to_path_buf(),
        extra_args: vec!["-c".to_string(), script.to_string(), "fake-gemini".to_string()],
        ..Default::default()
    }
}

fn client(config: &ClientConfig) -> GeminiClient {
    GeminiClient::from_config(config).unwrap()
}

#[tokio::test]
async fn returns_trimmed_stdout() {
    let dir = tempdir().unwrap();
    let client = client(&fake_cli(r"printf '  The answer is 42.\n\n'", dir.path()));

    let answer = client
        .generate(&[ChatMessage::user("Hello World!")], "gemini-2.5-pro")
        .await
        .unwrap();

    assert_eq!(answer, "The answer is 42.");
}

#[tokio::test]
async fn passes_model_and_prompt_as_arguments() {
    let dir = tempdir().unwrap();
    let client = client(&fake_cli(r#"printf '%s|' "$@""#, dir.path()));

    let answer = client
        .generate(
            &[
                ChatMessage::system("Be brief."),
                ChatMessage::user("Hello World!"),
            ],
            "gemini-2.5-flash",
        )
        .await
        .unwrap();

    assert_eq!(
        answer,
        "-m|gemini-2.5-flash|-p|system: Be brief.\nuser: Hello World!|"
    );
}

#[tokio::test]
async fn non_zero_exit_reports_code_and_stderr() {
    let dir = tempdir().unwrap();
    let client = client(&fake_cli(
        "echo 'partial output'; echo 'Quota exceeded for model' >&2; exit 3",
        dir.path(),
    ));

    let err = client
        .generate(&[ChatMessage::user("hi")], "gemini-2.5-pro")
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains('3'), "{}", message);
    assert!(message.contains("Quota exceeded for model"), "{}", message);
    match err {
        Error::ExecutionFailed { code, stderr } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "Quota exceeded for model");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn timeout_kills_the_subprocess() {
    let dir = tempdir().unwrap();
    let pid_file = dir.path().join("pid");
    let script = format!("echo $$ > '{}'; exec sleep 30", pid_file.display());
    let mut config = fake_cli(&script, dir.path());
    config.timeout_secs = 0.5;
    let client = client(&config);

    let started = Instant::now();
    let err = client
        .generate(&[ChatMessage::user("hi")], "gemini-2.5-pro")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(500)));
    assert!(started.elapsed() < Duration::from_secs(10));

    let pid = fs::read_to_string(&pid_file).unwrap();
    let alive = std::process::Command::new("kill")
        .args(["-0", pid.trim()])
        .stderr(std::process::Stdio::null())
        .status()
        .unwrap()
        .success();
    assert!(!alive, "subprocess {} still running", pid.trim());
}

#[tokio::test]
async fn stdin_mode_feeds_prompt_on_stdin() {
    let dir = tempdir().unwrap();
    let mut config = fake_cli(r#"printf '%s ' "$@"; cat"#, dir.path());
    config.prompt_via_stdin = true;
    let client = client(&config);

    let answer = client
        .generate(
            &[
                ChatMessage::user("ping"),
                ChatMessage::assistant("pong"),
                ChatMessage::user("again"),
            ],
            "gemini-2.5-pro",
        )
        .await
        .unwrap();

    assert_eq!(answer, "-m gemini-2.5-pro user: ping\nassistant: pong\nuser: again");
}

#[tokio::test]
async fn child_ignoring_stdin_still_succeeds() {
    let dir = tempdir().unwrap();
    let mut config = fake_cli("exec 0<&-; echo done", dir.path());
    config.prompt_via_stdin = true;
    let client = client(&config);

    let long_prompt = "x".repeat(1 << 20);
    let answer = client
        .generate(&[ChatMessage::user(long_prompt)], "gemini-2.5-pro")
        .await
        .unwrap();

    assert_eq!(answer, "done");
}

#[tokio::test]
async fn data_uri_image_reaches_cli_as_file() {
    let dir = tempdir().unwrap();
    // $4 is the prompt; print the file referenced after '@'.
    let client = client(&fake_cli(r#"cat "${4#*@}""#, dir.path()));
    let payload = STANDARD.encode("raw image bytes");

    let answer = client
        .generate(
            &[ChatMessage::user(vec![
                ChatContentPart::text("What is in this picture?"),
                ChatContentPart::image_url(format!("data:image/png;base64,{}", payload)),
            ])],
            "gemini-2.5-pro",
        )
        .await
        .unwrap();

    assert_eq!(answer, "raw image bytes");
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn attachments_are_removed_after_failure() {
    let dir = tempdir().unwrap();
    let client = client(&fake_cli("exit 1", dir.path()));

    let result = client
        .generate(
            &[ChatMessage::user(vec![ChatContentPart::image_url(
                "data:image/jpeg;base64,/9j/4AAQ",
            )])],
            "gemini-2.5-pro",
        )
        .await;

    assert!(matches!(result, Err(Error::ExecutionFailed { code: Some(1), .. })));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn remote_image_url_is_passed_verbatim() {
    let dir = tempdir().unwrap();
    let client = client(&fake_cli(r#"printf '%s' "$4""#, dir.path()));
    let url = "https://example.com/photos/cat.jpg?w=640";

    let answer = client
        .generate(
            &[ChatMessage::user(vec![
                ChatContentPart::text("Describe"),
                ChatContentPart::image_url(url),
            ])],
            "gemini-2.5-pro",
        )
        .await
        .unwrap();

    assert_eq!(answer, format!("user: Describe <image>{}</image>", url));
}

#[tokio::test]
async fn concurrent_calls_are_independent() {
    let dir = tempdir().unwrap();
    let client = client(&fake_cli(r#"sleep 0.3; printf '%s' "$4""#, dir.path()));

    let first = [ChatMessage::user("first")];
    let second = [ChatMessage::user("second")];
    let (a, b) = tokio::join!(
        client.generate(&first, "gemini-2.5-pro"),
        client.generate(&second, "gemini-2.5-pro"),
    );

    assert_eq!(a.unwrap(), "user: first");
    assert_eq!(b.unwrap(), "user: second");
}

#[tokio::test]
async fn works_behind_provider_trait() {
    let dir = tempdir().unwrap();
    let mut config = fake_cli(r#"printf '%s' "$2""#, dir.path());
    config.model = "gemini-2.5-flash-lite".to_string();
    let provider: Box<dyn LlmProvider> = Box::new(client(&config));

    let answer = provider
        .call_llm_api(vec![ChatMessage::user("hi")])
        .await
        .unwrap();

    assert_eq!(answer, "gemini-2.5-flash-lite");
}
