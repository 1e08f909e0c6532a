//! CLI `listen` command: read transcripts from stdin, one per line.
//!
//! An empty line stands for "no speech recognized". A leading `[xx] ` tag
//! sets the language for that line only.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use careminder::config::CareConfig;
use careminder::intent::Transcript;
use careminder::notify::ConsoleSink;

pub async fn listen(config: &CareConfig, lang: Option<&str>) -> Result<()> {
    let engine = super::start_engine(config, Arc::new(ConsoleSink)).await?;
    let language = super::pick_language(&engine, lang);

    let mut events = engine.subscribe();
    let event_log = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => tracing::debug!(?event, "scheduler event"),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "event log lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    engine.greet(language);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let transcript = transcript_from_line(&line, language.as_str());
                if let Err(e) = engine.handle(transcript).await {
                    tracing::warn!(error = %e, "command rejected");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                engine.shutdown();
                event_log.abort();
                return Ok(());
            }
        }
    }

    let pending = engine.scheduler().armed_ids();
    if !pending.is_empty() {
        eprintln!(
            "Input closed; {} reminder(s) still armed. Press Ctrl-C to stop.",
            pending.len()
        );
        tokio::signal::ctrl_c().await?;
    }

    engine.shutdown();
    event_log.abort();
    Ok(())
}

/// Turn one input line into a transcript. `[hi] text` overrides the language.
fn transcript_from_line(line: &str, default_tag: &str) -> Transcript {
    let line = line.trim();
    if line.is_empty() {
        return Transcript::NoSpeech;
    }

    if let Some(rest) = line.strip_prefix('[') {
        if let Some((tag, text)) = rest.split_once(']') {
            let text = text.trim();
            if text.is_empty() {
                return Transcript::NoSpeech;
            }
            return Transcript::speech(text, tag.trim());
        }
    }
    Transcript::speech(line, default_tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_line_is_no_speech() {
        assert_eq!(transcript_from_line("   ", "en"), Transcript::NoSpeech);
        assert_eq!(transcript_from_line("[mr]  ", "en"), Transcript::NoSpeech);
    }

    #[test]
    fn tag_prefix_overrides_language() {
        assert_eq!(
            transcript_from_line("[hi] मेरे रिमाइंडर", "en"),
            Transcript::speech("मेरे रिमाइंडर", "hi")
        );
        assert_eq!(
            transcript_from_line("my reminders", "mr"),
            Transcript::speech("my reminders", "mr")
        );
    }
}
