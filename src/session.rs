use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::analyzer::Analyzer;
use crate::llm::CompletionClient;

/// One line typed at the prompt.
#[derive(Debug, PartialEq)]
pub enum Input {
    /// `exit` or `quit`, any case.
    Exit,
    /// Blank line; re-prompt without asking anything.
    Empty,
    Question(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            Input::Exit
        } else if trimmed.is_empty() {
            Input::Empty
        } else {
            Input::Question(trimmed.to_string())
        }
    }
}

/// Read questions from `input` until exit or end of input, writing answers to `output`.
pub async fn run<C, R, W>(analyzer: &Analyzer<C>, mut input: R, output: &mut W) -> Result<()>
where
    C: CompletionClient,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut asked = 0u32;

    say(output, "\nEnter questions about the table data (type 'exit' to quit)\n").await?;
    loop {
        say(output, "\nYour question: ").await?;
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .await
            .context("Failed to read input")?;
        if read == 0 {
            break;
        }
        let Ok(line) = std::str::from_utf8(&buf) else {
            warn!(bytes = buf.len(), "discarding input line that is not UTF-8");
            say(output, "Please enter valid UTF-8 text\n").await?;
            continue;
        };

        match Input::parse(line) {
            Input::Exit => break,
            Input::Empty => say(output, "Please enter a question\n").await?,
            Input::Question(question) => {
                asked += 1;
                let answer = analyzer.ask(&question).await;
                say(output, &format!("\nAnswer: {}\n", answer)).await?;
            }
        }
    }
    say(output, "\nGoodbye!\n").await?;

    info!(questions = asked, "session ended");
    Ok(())
}

async fn say<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
