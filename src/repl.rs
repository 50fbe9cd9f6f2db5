//! Interactive chat loop.
//!
//! A thin readline-based front end over the session core: slash commands
//! for schema management and clipboard access, everything else forwarded to
//! the backend as a natural-language request. All conversation invariants
//! live in [`crate::chat::session`]; this module only renders.

use arboard::Clipboard;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::QueryService;
use crate::chat::ChatSession;
use crate::error::{DeskError, Result};
use crate::schema::SchemaRegistry;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand<'a> {
    Help,
    Schemas,
    Use(Option<&'a str>),
    Upload(&'a str),
    Copy,
    Clear,
    Quit,
    Ask(&'a str),
    Unknown(&'a str),
}

/// Parses one input line into a command.
///
/// Lines starting with '/' are commands; everything else is a request for
/// the backend.
fn parse_command(line: &str) -> ReplCommand<'_> {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return ReplCommand::Ask(line);
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "help" => ReplCommand::Help,
        "schemas" => ReplCommand::Schemas,
        "use" => ReplCommand::Use(match arg {
            "" | "none" => None,
            name => Some(name),
        }),
        "upload" => ReplCommand::Upload(arg),
        "copy" => ReplCommand::Copy,
        "clear" => ReplCommand::Clear,
        "quit" | "exit" => ReplCommand::Quit,
        _ => ReplCommand::Unknown(name),
    }
}

/// Runs the interactive loop until the user quits.
pub async fn run(
    service: &dyn QueryService,
    session: &mut ChatSession,
    registry: &mut SchemaRegistry,
) -> Result<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| DeskError::internal(format!("Failed to initialize line editor: {e}")))?;

    println!("sqldesk — describe the query you need; /help for commands");

    loop {
        match editor.readline("sqldesk> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());

                match parse_command(&line) {
                    ReplCommand::Help => print_help(),
                    ReplCommand::Schemas => print_schemas(registry),
                    ReplCommand::Use(name) => match registry.select(name) {
                        Ok(()) => match registry.selected() {
                            Some(schema) => println!("Using schema '{schema}'"),
                            None => println!("Schema context cleared"),
                        },
                        Err(e) => println!("{e}"),
                    },
                    ReplCommand::Upload(path) => {
                        if path.is_empty() {
                            println!("Usage: /upload <path-to-schema.txt>");
                        } else if let Err(e) = upload_schema(service, registry, path).await {
                            println!("{e}");
                        }
                    }
                    ReplCommand::Copy => match session.copy_text() {
                        Some(sql) => match copy_to_clipboard(&sql) {
                            Ok(()) => println!("Copied to clipboard"),
                            Err(e) => println!("{e}"),
                        },
                        None => println!("No SQL to copy yet"),
                    },
                    ReplCommand::Clear => {
                        session.clear();
                        println!("Conversation cleared");
                    }
                    ReplCommand::Quit => break,
                    ReplCommand::Unknown(name) => {
                        println!("Unknown command '/{name}'; /help for commands");
                    }
                    ReplCommand::Ask(text) => {
                        ask(service, session, registry, text).await;
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                return Err(DeskError::internal(format!("Readline error: {e}")));
            }
        }
    }

    Ok(())
}

/// Sends one request to the backend and prints the reply.
///
/// Ctrl-C while the request is in flight cancels it; the session treats
/// cancellation like any other failed turn.
async fn ask(
    service: &dyn QueryService,
    session: &mut ChatSession,
    registry: &SchemaRegistry,
    text: &str,
) {
    let cancel = CancellationToken::new();
    let canceller = cancel.clone();

    let send = session.send_with_cancel(service, registry, text, &cancel);
    tokio::pin!(send);

    let result = tokio::select! {
        result = &mut send => result,
        _ = tokio::signal::ctrl_c() => {
            canceller.cancel();
            send.await
        }
    };

    match result {
        Ok(extracted) => {
            let explanation = extracted.explanation.trim();
            if !explanation.is_empty() {
                println!("{explanation}");
            }
            match extracted.copy_text() {
                Some(sql) => {
                    println!("\n{sql}\n");
                    println!("(/copy to copy the statement)");
                }
                None => debug!("Reply carried no SQL block"),
            }
        }
        Err(e) => println!("{e}"),
    }
}

/// Uploads a schema file and reports the updated list.
async fn upload_schema(
    service: &dyn QueryService,
    registry: &mut SchemaRegistry,
    path: &str,
) -> Result<()> {
    let path = std::path::Path::new(path);
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DeskError::validation(format!("invalid path '{}'", path.display())))?
        .to_string();

    let contents = std::fs::read(path)
        .map_err(|e| DeskError::validation(format!("cannot read '{}': {e}", path.display())))?;

    registry.upload(service, &filename, contents).await?;
    println!("Uploaded '{filename}' ({} schemas known)", registry.known().len());
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  /schemas           list schemas known to the backend");
    println!("  /use <name|none>   set or clear the schema context");
    println!("  /upload <path>     upload a .txt schema file");
    println!("  /copy              copy the last generated SQL");
    println!("  /clear             discard the conversation");
    println!("  /quit              exit");
    println!("Anything else is sent to the backend as a request.");
}

fn print_schemas(registry: &SchemaRegistry) {
    if registry.known().is_empty() {
        println!("No schemas on the backend yet; /upload one");
        return;
    }
    for schema in registry.known() {
        if registry.selected() == Some(schema.as_str()) {
            println!("* {schema}");
        } else {
            println!("  {schema}");
        }
    }
}

/// Puts text on the system clipboard.
fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new()
        .map_err(|e| DeskError::internal(format!("Clipboard unavailable: {e}")))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| DeskError::internal(format!("Clipboard write failed: {e}")))
}
