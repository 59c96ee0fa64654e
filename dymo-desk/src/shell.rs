//! Interactive label desk
//!
//! Line-oriented stand-in for the desktop form: pick a label type, enter a
//! SKU and quantity, print, read the status line.

use std::time::Duration;

use crossterm::style::Stylize;
use dymo_printer::{
    BatchEvent, BatchPrinter, CancellationToken, DymoClient, LabelRequest, LabelService,
    Preferences, PreferencesStore, StatusKind, StatusMessage, batch_summary, parse_quantity,
    print_action_caption,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

const HELP: &str = "\
Commands:
  print <TYPE> <SKU> [QTY]   print QTY labels (1-99, default 1)
                             quote values with spaces: print \"POWER SUPPLY\" \"AB 12\" 2
  types                      list label types
  add <TYPE>                 add a label type
  ontop [on|off]             show or set the always-on-top preference
  status                     check DYMO Connect
  help                       show this help
  quit                       exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Print {
        label_type: String,
        sku: String,
        quantity: String,
    },
    Types,
    Add(String),
    OnTop(Option<bool>),
    Status,
    Help,
    Quit,
}

/// Split a line into words; single or double quotes group words with spaces
fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Parse one input line. `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let words = split_words(line)?;
    let Some((verb, rest)) = words.split_first() else {
        return Ok(None);
    };
    let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

    let command = match (verb.to_lowercase().as_str(), rest.as_slice()) {
        ("print" | "p", [label_type, sku]) => Command::Print {
            label_type: label_type.to_string(),
            sku: sku.to_string(),
            quantity: "1".to_string(),
        },
        ("print" | "p", [label_type, sku, quantity]) => Command::Print {
            label_type: label_type.to_string(),
            sku: sku.to_string(),
            quantity: quantity.to_string(),
        },
        ("print" | "p", _) => return Err("Usage: print <TYPE> <SKU> [QTY]".to_string()),
        ("types", []) => Command::Types,
        ("add", []) => return Err("Please enter a label type".to_string()),
        ("add", words) => Command::Add(words.join(" ")),
        ("ontop", []) => Command::OnTop(None),
        ("ontop", ["on" | "true" | "yes"]) => Command::OnTop(Some(true)),
        ("ontop", ["off" | "false" | "no"]) => Command::OnTop(Some(false)),
        ("ontop", _) => return Err("Usage: ontop [on|off]".to_string()),
        ("status", []) => Command::Status,
        ("help" | "?", _) => Command::Help,
        ("quit" | "exit" | "q", _) => Command::Quit,
        (other, _) => return Err(format!("Unknown command: {} (try `help`)", other)),
    };

    Ok(Some(command))
}

/// Print a status line, colored by kind
pub fn render(status: &StatusMessage) {
    match status.kind {
        StatusKind::Info => println!("{}", status.text),
        StatusKind::Success => println!("{}", status.text.as_str().green()),
        StatusKind::Error => println!("{}", status.text.as_str().red()),
    }
}

pub struct Shell {
    client: DymoClient,
    pacing: Duration,
    store: PreferencesStore,
    preferences: Preferences,
}

impl Shell {
    pub fn new(client: DymoClient, pacing: Duration, store: PreferencesStore) -> Self {
        let preferences = store.load();
        Self {
            client,
            pacing,
            store,
            preferences,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Read commands from stdin until `quit`, EOF or Ctrl-C
    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("{}", "DYMO Label Printer".bold());
        println!("{}", HELP);
        render(&StatusMessage::ready());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                break;
            };

            match parse_command(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => {
                    let status = self.execute(command).await;
                    render(&status);
                }
                Ok(None) => {}
                Err(message) => render(&StatusMessage::error(message)),
            }
        }

        Ok(())
    }

    /// Run one command and return its final status line
    pub async fn execute(&mut self, command: Command) -> StatusMessage {
        match command {
            Command::Print {
                label_type,
                sku,
                quantity,
            } => self.print(&label_type, &sku, &quantity).await,
            Command::Types => StatusMessage::info(self.preferences.label_types().join(", ")),
            Command::Add(label_type) => self.add_label_type(&label_type),
            Command::OnTop(value) => self.set_always_on_top(value),
            Command::Status => {
                render(&StatusMessage::info("Connecting to DYMO Connect..."));
                if self.client.probe_availability().await {
                    StatusMessage::success("DYMO Connect is running")
                } else {
                    StatusMessage::error("DYMO Connect is not running")
                }
            }
            Command::Help => StatusMessage::info(HELP),
            Command::Quit => StatusMessage::ready(),
        }
    }

    async fn print(&self, label_type: &str, sku: &str, quantity: &str) -> StatusMessage {
        let label_type = label_type.trim().to_uppercase();
        if !label_type.is_empty() && !self.preferences.contains(&label_type) {
            return StatusMessage::error(format!(
                "Unknown label type: {} (add it with `add {}`)",
                label_type, label_type
            ));
        }

        let quantity = match parse_quantity(quantity) {
            Ok(quantity) => quantity,
            Err(e) => return StatusMessage::from(&e),
        };

        let request = LabelRequest::new(label_type, sku, quantity);
        info!(action = %print_action_caption(quantity), label_type = %request.label_type, sku = %request.sku, "Print requested");

        let (tx, mut rx) = mpsc::unbounded_channel::<BatchEvent>();
        let reporter = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Some(status) = event.status() {
                    render(&status);
                }
            }
        });

        let token = CancellationToken::new();
        let interrupt = {
            let token = token.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    token.cancel();
                }
            })
        };

        let printer = BatchPrinter::new(self.client.clone())
            .with_pacing(self.pacing)
            .with_events(tx)
            .with_cancellation(token);
        let result = printer.print_batch(&request).await;

        interrupt.abort();
        // Closing the channel lets the reporter finish printing
        drop(printer);
        if let Err(e) = reporter.await {
            warn!(error = %e, "Status reporter failed");
        }

        match result {
            Ok(result) => batch_summary(&request, &result),
            Err(e) => StatusMessage::from(&e),
        }
    }

    fn add_label_type(&mut self, label_type: &str) -> StatusMessage {
        match self.preferences.add_label_type(label_type) {
            Ok(added) => {
                self.save();
                StatusMessage::success(format!("Added label type: {}", added))
            }
            Err(e) => StatusMessage::from(&e),
        }
    }

    fn set_always_on_top(&mut self, value: Option<bool>) -> StatusMessage {
        if let Some(value) = value {
            self.preferences.always_on_top = value;
            self.save();
        }

        if self.preferences.always_on_top {
            StatusMessage::success("Window will stay on top")
        } else {
            StatusMessage::info("Window will not stay on top")
        }
    }

    /// Persist preferences; failures are logged, never fatal
    pub fn save(&self) {
        if let Err(e) = self.store.save(&self.preferences) {
            warn!(path = %self.store.path().display(), error = %e, "Error saving preferences");
        }
    }
}
