//! # REPL
//!
//! Reads queries line by line and runs one conversation turn per query.
//! Ctrl-C during a turn cancels that turn; at the prompt it ends the session.

use std::future::Future;
use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::application::session::Session;
use crate::domain::errors::{Error, Result};
use crate::strings::messages;

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Skip,
    Query(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        Input::Skip
    } else if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
        Input::Quit
    } else {
        Input::Query(line)
    }
}

/// Run the loop on stdin/stdout with Ctrl-C as the interrupt.
pub async fn run(session: &mut Session) -> Result<()> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_with(session, stdin, &mut stdout, || async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Drive the loop over any line source. `interrupt` yields a future that
/// resolves when the user asks to stop.
pub async fn run_with<R, W, I, F>(session: &mut Session, input: R, out: &mut W, interrupt: I) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Fn() -> F,
    F: Future<Output = ()>,
{
    writeln!(out, "{}", messages::BANNER)?;
    writeln!(out, "{}", messages::USAGE_HINT)?;

    let mut lines = input.lines();
    loop {
        write!(out, "{}", messages::PROMPT)?;
        out.flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = interrupt() => None,
        };
        let Some(line) = line else {
            break;
        };

        let query = match classify(&line) {
            Input::Quit => break,
            Input::Skip => continue,
            Input::Query(query) => query,
        };

        let cancel = CancellationToken::new();
        let outcome = {
            let turn = session.ask(query, &cancel);
            tokio::pin!(turn);
            tokio::select! {
                outcome = &mut turn => outcome,
                _ = interrupt() => {
                    cancel.cancel();
                    turn.await
                }
            }
        };

        match outcome {
            Ok(answer) => writeln!(out, "{}", messages::answer(&answer))?,
            Err(Error::Cancelled) => writeln!(out, "{}", messages::CANCELLED)?,
            Err(e) if e.is_session_fatal() => return Err(e),
            Err(e) => writeln!(out, "{}", messages::turn_failed(&e.to_string()))?,
        }
    }

    writeln!(out, "{}", messages::GOODBYE)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{MockModel, MockProvider, invocation};
    use crate::domain::config::ConversationConfig;
    use crate::domain::types::ModelReply;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_classify() {
        assert_eq!(classify("  "), Input::Skip);
        assert_eq!(classify("quit"), Input::Quit);
        assert_eq!(classify("EXIT\n"), Input::Quit);
        assert_eq!(classify(" weather in Paris? "), Input::Query("weather in Paris?"));
    }

    #[tokio::test]
    async fn test_loop_answers_and_reports_errors() {
        let provider = Arc::new(MockProvider::new().with_tool("get_weather", "city", "sunny, 22°C"));
        let model = Arc::new(MockModel::new());
        model.queue_reply(ModelReply::with_calls(vec![invocation(
            "call_0",
            "get_weather",
            json!({"city": "Paris"}),
        )]));
        model.queue_reply(ModelReply::text("Sunny in Paris."));
        model.queue_reply(ModelReply::with_calls(vec![invocation("call_0", "teleport", json!({}))]));

        let mut session = Session::from_parts(provider, model, &ConversationConfig::default())
            .await
            .unwrap();

        let input = tokio::io::BufReader::new(&b"weather in Paris?\n\nbeam me up\nquit\nnever read\n"[..]);
        let mut out = Vec::new();
        run_with(&mut session, input, &mut out, std::future::pending::<()>)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Sunny in Paris."));
        assert!(printed.contains("Error: unknown tool `teleport`"));
        assert!(printed.ends_with("Goodbye!\n"));
        assert_eq!(session.transcript().turns(), 2);
    }

    struct ClosedTerminal;

    impl Write for ClosedTerminal {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_closed_terminal_ends_loop() {
        let provider = Arc::new(MockProvider::new().with_tool("get_weather", "city", "sunny"));
        let mut session = Session::from_parts(provider, Arc::new(MockModel::new()), &ConversationConfig::default())
            .await
            .unwrap();

        let input = tokio::io::BufReader::new(&b"weather in Paris?\n"[..]);
        let err = run_with(&mut session, input, &mut ClosedTerminal, std::future::pending::<()>)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Terminal(ref e) if e.kind() == std::io::ErrorKind::BrokenPipe));
        assert_eq!(session.transcript().turns(), 0);
    }
}
