//! Command-line client for a running DocuMind server.
//!
//! `documind-cli upload report.pdf` prints the summary; `documind-cli ask "..."` prints the
//! answer. Both talk to the same shared document slot as the web frontend.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use reqwest::{
    Client, Response,
    multipart::{Form, Part},
};
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "documind-cli", about = "Upload PDFs to DocuMind and ask questions")]
struct Cli {
    /// Base URL of the DocuMind server.
    #[arg(long, env = "DOCUMIND_SERVER", default_value = "http://127.0.0.1:8000")]
    server: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a PDF and print its summary.
    Upload { path: PathBuf },
    /// Ask a question about the most recently uploaded PDF.
    Ask { question: String },
}

#[derive(Deserialize)]
struct UploadResponse {
    summary: String,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: String,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::builder()
        .user_agent("documind-cli")
        .build()
        .context("failed to build HTTP client")?;
    let base = cli.server.trim_end_matches('/');

    match cli.command {
        Command::Upload { path } => {
            let summary = upload(&client, base, &path).await?;
            println!("{summary}");
        }
        Command::Ask { question } => {
            let answer = ask(&client, base, &question).await?;
            println!("{answer}");
        }
    }
    Ok(())
}

async fn upload(client: &Client, base: &str, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string());
    let part = Part::bytes(bytes)
        .file_name(filename)
        .mime_str("application/pdf")
        .context("invalid mime type")?;
    let response = client
        .post(format!("{base}/api/upload"))
        .multipart(Form::new().part("file", part))
        .send()
        .await
        .context("upload request failed")?;
    let body: UploadResponse = decode(response).await?;
    Ok(body.summary)
}

async fn ask(client: &Client, base: &str, question: &str) -> Result<String> {
    let response = client
        .post(format!("{base}/api/ask"))
        .form(&[("question", question)])
        .send()
        .await
        .context("ask request failed")?;
    let body: AskResponse = decode(response).await?;
    Ok(body.answer)
}

async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json()
            .await
            .context("failed to decode server response");
    }
    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorResponse>(&text)
        .map(|error| error.detail)
        .unwrap_or(text);
    bail!("server returned {status}: {detail}")
}
