//! Terminal implementations of the engine's user-facing collaborators.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use docflow_documents::{
    Confirm, ConfirmationPrompt, NotificationKind, Notifier, PdfRenderer, RenderError,
    RenderHandle,
};

/// Asks on stdin; anything other than `y`/`yes` is a "no".
pub struct TerminalConfirm;

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        let question = format!(
            "{}: {} [{}/{}] (y/N) ",
            prompt.title, prompt.message, prompt.confirm_text, prompt.cancel_text
        );
        let answer = tokio::task::spawn_blocking(move || {
            let mut stdout = std::io::stdout();
            let _ = write!(stdout, "{question}");
            let _ = stdout.flush();
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => is_yes(&line),
            Ok(Err(err)) => {
                tracing::warn!("could not read confirmation: {err}");
                false
            }
            Err(err) => {
                tracing::warn!("confirmation prompt aborted: {err}");
                false
            }
        }
    }
}

fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Fixed answer, for `--yes` and scripted use.
pub struct AutoConfirm(pub bool);

#[async_trait]
impl Confirm for AutoConfirm {
    async fn confirm(&self, prompt: &ConfirmationPrompt) -> bool {
        tracing::debug!(title = %prompt.title, answer = self.0, "auto-confirming");
        self.0
    }
}

/// Success and info on stdout, errors on stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => println!("✔ {message}"),
            NotificationKind::Info => println!("{message}"),
            NotificationKind::Error => eprintln!("✘ {message}"),
        }
    }
}

/// A terminal cannot display a PDF; it prints where to fetch it instead.
#[derive(Default)]
pub struct LinkRenderer {
    next: AtomicU64,
}

#[async_trait]
impl PdfRenderer for LinkRenderer {
    async fn load(&self, _container: &str, url: &str) -> Result<RenderHandle, RenderError> {
        if url.trim().is_empty() {
            return Err(RenderError("document has no file".to_string()));
        }
        println!("File: {url}");
        Ok(RenderHandle(self.next.fetch_add(1, Ordering::Relaxed) + 1))
    }

    fn unload(&self, handle: RenderHandle) {
        tracing::debug!(handle = handle.0, "released file link");
    }
}
