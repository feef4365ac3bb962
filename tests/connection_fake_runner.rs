// tests/connection_fake_runner.rs

use std::error::Error;

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

use shell_agent::exec::CommandRunner;
use shell_agent::protocol::Response;
use shell_agent::server::{
    ConnectionOutcome, ShutdownReason, handle_connection, shutdown_channel,
};
use shell_agent_test_utils::fake_runner::ScriptedRunner;
use shell_agent_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Send `input` on a duplex pipe, run the handler on the other end and
/// return what it wrote back plus its outcome.
async fn exchange(
    input: &[u8],
    runner: &dyn CommandRunner,
) -> Result<(String, ConnectionOutcome, Option<ShutdownReason>), Box<dyn Error>> {
    let (trigger, _signal) = shutdown_channel();
    let (mut client, server): (DuplexStream, DuplexStream) = tokio::io::duplex(4096);

    client.write_all(input).await?;

    let client_side = async move {
        let mut reply = String::new();
        client.read_to_string(&mut reply).await?;
        Ok::<String, std::io::Error>(reply)
    };

    let (outcome, reply) =
        with_timeout(async { tokio::join!(handle_connection(server, runner, &trigger), client_side) })
            .await;

    Ok((reply?, outcome?, trigger.reason()))
}

#[tokio::test]
async fn ping_gets_pong_and_nothing_else() -> TestResult {
    init_tracing();
    let runner = ScriptedRunner::new(vec![Response::ExitCode(0)]);
    let seen = runner.seen();

    let (reply, outcome, reason) = exchange(b"AGENT_PING\n", &runner).await?;

    assert_eq!(reply, "PONG\n");
    assert_eq!(outcome, ConnectionOutcome::Pinged);
    assert_eq!(reason, None);
    assert!(seen.lock().unwrap().is_empty(), "ping must not run a command");
    Ok(())
}

#[tokio::test]
async fn exit_says_bye_and_requests_shutdown() -> TestResult {
    init_tracing();
    let runner = ScriptedRunner::new(vec![]);

    let (reply, outcome, reason) = exchange(b"AGENT_EXIT\n", &runner).await?;

    assert_eq!(reply, "BYE\n");
    assert_eq!(outcome, ConnectionOutcome::ExitRequested);
    assert_eq!(reason, Some(ShutdownReason::ExitRequested));
    Ok(())
}

#[tokio::test]
async fn immediate_eof_gets_no_response() -> TestResult {
    init_tracing();
    let runner = ScriptedRunner::new(vec![Response::ExitCode(0)]);
    let seen = runner.seen();

    let (trigger, _signal) = shutdown_channel();
    let (client, server) = tokio::io::duplex(64);
    let (mut read_half, mut write_half) = tokio::io::split(client);
    write_half.shutdown().await?;

    let client_side = async move {
        let mut reply = Vec::new();
        read_half.read_to_end(&mut reply).await?;
        Ok::<Vec<u8>, std::io::Error>(reply)
    };
    let (outcome, reply) =
        with_timeout(async { tokio::join!(handle_connection(server, &runner, &trigger), client_side) })
            .await;

    assert_eq!(outcome?, ConnectionOutcome::NoRequest);
    assert!(reply?.is_empty());
    assert!(seen.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn empty_line_gets_no_response() -> TestResult {
    init_tracing();
    let runner = ScriptedRunner::new(vec![Response::ExitCode(0)]);
    let seen = runner.seen();

    let (reply, outcome, _) = exchange(b"\r\n", &runner).await?;

    assert_eq!(reply, "");
    assert_eq!(outcome, ConnectionOutcome::NoRequest);
    assert!(seen.lock().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn command_output_is_forwarded_in_order() -> TestResult {
    init_tracing();
    let runner = ScriptedRunner::new(vec![
        Response::Stdout("a".into()),
        Response::Stdout("b".into()),
        Response::Stderr("x".into()),
        Response::ExitCode(2),
    ]);
    let seen = runner.seen();

    let (reply, outcome, reason) = exchange(b"do something\r\n", &runner).await?;

    assert_eq!(reply, "a\nb\nERR: x\nEXIT_CODE: 2\n");
    assert_eq!(outcome, ConnectionOutcome::CommandReported);
    assert_eq!(reason, None);
    assert_eq!(*seen.lock().unwrap(), vec!["do something".to_string()]);
    Ok(())
}

#[tokio::test]
async fn only_the_first_line_is_processed() -> TestResult {
    init_tracing();
    let runner = ScriptedRunner::new(vec![Response::ExitCode(0)]);
    let seen = runner.seen();

    let (reply, _, reason) = exchange(b"first\nAGENT_EXIT\n", &runner).await?;

    assert_eq!(reply, "EXIT_CODE: 0\n");
    assert_eq!(reason, None, "second line must be ignored");
    assert_eq!(*seen.lock().unwrap(), vec!["first".to_string()]);
    Ok(())
}

#[tokio::test]
async fn command_without_trailing_newline_still_runs() -> TestResult {
    init_tracing();
    let runner = ScriptedRunner::new(vec![Response::failure("cannot run program 'x'")]);

    let (trigger, _signal) = shutdown_channel();
    let (client, server) = tokio::io::duplex(4096);
    let (mut read_half, mut write_half) = tokio::io::split(client);
    write_half.write_all(b"x").await?;
    write_half.shutdown().await?;

    let client_side = async move {
        let mut reply = String::new();
        read_half.read_to_string(&mut reply).await?;
        Ok::<String, std::io::Error>(reply)
    };
    let (outcome, reply) =
        with_timeout(async { tokio::join!(handle_connection(server, &runner, &trigger), client_side) })
            .await;

    assert_eq!(outcome?, ConnectionOutcome::CommandReported);
    assert_eq!(reply?, "ERR: cannot run program 'x'\n");
    Ok(())
}
