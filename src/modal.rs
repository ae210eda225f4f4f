//! Modal Requests
//!
//! Blocking confirm/prompt/alert dialogs expressed as deferred results so
//! actions can be driven by a terminal, a script, or a test.
//!
//! Closing a modal only hides it: the form modals (event, notes) keep
//! their contents and are never destroyed by a close.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Mutex as AsyncMutex};

/// Source of user answers to modal requests
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Yes/no question; dismissing counts as no
    async fn confirm(&self, message: &str) -> bool;

    /// Free-text question; `None` when dismissed
    async fn prompt(&self, message: &str, default: &str) -> Option<String>;

    /// Pick one of several options; `None` when dismissed
    async fn choose(&self, message: &str, options: &[&str]) -> Option<usize>;

    /// Show a message and wait for acknowledgement
    async fn alert(&self, message: &str);
}

/// Lines typed by the user, shared between the command loop and modals
pub struct LineInput {
    rx: AsyncMutex<mpsc::UnboundedReceiver<String>>,
}

impl LineInput {
    pub fn new(rx: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            rx: AsyncMutex::new(rx),
        }
    }

    /// Spawn a blocking stdin reader feeding a new [`LineInput`]
    pub fn stdin() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            let mut line = String::new();
            loop {
                line.clear();
                match stdin.read_line(&mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {
                        if tx.send(line.trim_end().to_string()).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        Arc::new(Self::new(rx))
    }

    /// Next line, or `None` once input is closed
    pub async fn next_line(&self) -> Option<String> {
        self.rx.lock().await.recv().await
    }
}

/// Prompter reading answers from the terminal
pub struct ConsolePrompter {
    input: Arc<LineInput>,
}

impl ConsolePrompter {
    pub fn new(input: Arc<LineInput>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn confirm(&self, message: &str) -> bool {
        println!("{} [y/N]", message);
        match self.input.next_line().await {
            Some(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }

    async fn prompt(&self, message: &str, default: &str) -> Option<String> {
        println!("{} [{}] (empty line keeps default, '.' cancels)", message, default);
        let answer = self.input.next_line().await?;
        match answer.trim() {
            "." => None,
            "" => Some(default.to_string()),
            other => Some(other.to_string()),
        }
    }

    async fn choose(&self, message: &str, options: &[&str]) -> Option<usize> {
        println!("{}", message);
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }
        let answer = self.input.next_line().await?;
        let index: usize = answer.trim().parse().ok()?;
        (1..=options.len()).contains(&index).then(|| index - 1)
    }

    async fn alert(&self, message: &str) {
        println!("{}", message);
    }
}

/// Scripted answer for [`ScriptedPrompter`]
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Yes,
    No,
    Text(String),
    Choice(usize),
    Dismiss,
}

/// Prompter answering from a queue and recording every message shown
///
/// Running out of answers behaves like the user dismissing the dialog.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<Answer>>,
    shown: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into_iter().collect()),
            shown: Mutex::new(Vec::new()),
        }
    }

    /// Every confirm/prompt/choose/alert message shown so far
    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Alert messages only
    pub fn alerts(&self) -> Vec<String> {
        self.shown()
            .into_iter()
            .filter_map(|m| m.strip_prefix("alert: ").map(str::to_string))
            .collect()
    }

    fn next(&self, shown: String) -> Answer {
        if let Ok(mut log) = self.shown.lock() {
            log.push(shown);
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut a| a.pop_front())
            .unwrap_or(Answer::Dismiss)
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn confirm(&self, message: &str) -> bool {
        matches!(self.next(format!("confirm: {}", message)), Answer::Yes)
    }

    async fn prompt(&self, message: &str, default: &str) -> Option<String> {
        match self.next(format!("prompt: {}", message)) {
            Answer::Text(text) => Some(text),
            Answer::Yes => Some(default.to_string()),
            _ => None,
        }
    }

    async fn choose(&self, message: &str, options: &[&str]) -> Option<usize> {
        match self.next(format!("choose: {}", message)) {
            Answer::Choice(i) if i < options.len() => Some(i),
            _ => None,
        }
    }

    async fn alert(&self, message: &str) {
        if let Ok(mut log) = self.shown.lock() {
            log.push(format!("alert: {}", message));
        }
    }
}
