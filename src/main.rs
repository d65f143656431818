use anyhow::{Context, Result};
use saarthi::language::Language;
use saarthi::llm::GeminiClient;
use saarthi::session::{
    Role, SessionCommand, SessionController, SessionDeps, SessionEvent, SessionHandle,
};
use saarthi::speech::{NullRecognizer, NullSynthesizer};
use saarthi::store::{keys, FileStore, KeyValueStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "saarthi=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Saarthi assistant console");

    let model = GeminiClient::from_env().context("Cannot reach the language model")?;

    let state_path = state_file_path();
    let store = FileStore::open(&state_path)
        .with_context(|| format!("Failed to open state file at {:?}", state_path))?;
    let needs_language = store.load(keys::LANGUAGE).is_none();

    let (controller, handle, mut events) = SessionController::new(SessionDeps {
        store: Box::new(store),
        model: Arc::new(model),
        recognizer: Arc::new(NullRecognizer),
        synthesizer: Arc::new(NullSynthesizer),
    });
    tokio::spawn(controller.run());

    // Print assistant output and notices as they arrive.
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::MessageAppended(m) if m.role == Role::Assistant => {
                    println!("saarthi> {}", m.text);
                }
                SessionEvent::Notice(text) => println!("! {}", text),
                SessionEvent::Shutdown => break,
                _ => {}
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if needs_language {
        pick_language(&handle, &mut lines).await?;
    }

    println!("Type a message, /doc <path> to explain a document, /language, /reset, /quit.");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => {}
            "/quit" => {
                handle.send(SessionCommand::Shutdown);
                break;
            }
            "/reset" => handle.send(SessionCommand::ResetAll),
            "/language" => {
                handle.send(SessionCommand::ResetLanguage);
                pick_language(&handle, &mut lines).await?;
            }
            _ if line.starts_with("/doc ") => {
                let path = line.trim_start_matches("/doc ").trim();
                match std::fs::read(path) {
                    Ok(data) => handle.send(SessionCommand::ExplainDocument {
                        data,
                        mime_type: guess_mime_type(Path::new(path)).to_string(),
                    }),
                    Err(e) => println!("! Could not read {}: {}", path, e),
                }
            }
            _ => handle.send(SessionCommand::SendText(line.to_string())),
        }
    }

    Ok(())
}

async fn pick_language(handle: &SessionHandle, lines: &mut Lines<BufReader<Stdin>>) -> Result<()> {
    println!("Please choose your language to start:");
    for (i, lang) in Language::ALL.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, lang.native_name(), lang.name());
    }
    while let Some(line) = lines.next_line().await? {
        let choice = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| Language::ALL.get(n.wrapping_sub(1)));
        match choice {
            Some(lang) => {
                handle.send(SessionCommand::ChooseLanguage(*lang));
                return Ok(());
            }
            None => println!("Enter a number between 1 and {}.", Language::ALL.len()),
        }
    }
    Ok(())
}

fn state_file_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("saarthi")
        .join("state.json")
}

fn guess_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
