//! Local fallback video rendering through the `ffmpeg` binary.

use adcampaign_core::{AdapterError, AdapterResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

#[async_trait]
pub trait VideoSynthesizer: Send + Sync {
    /// Renders `caption` over `background` (or a plain backdrop) into `output`.
    async fn render(&self, caption: &str, background: Option<&Path>, output: &Path)
    -> AdapterResult<()>;
}

#[derive(Debug, Clone)]
pub struct FfmpegSynthesizer {
    binary: PathBuf,
    duration_secs: u32,
    width: u32,
    height: u32,
}

impl Default for FfmpegSynthesizer {
    fn default() -> Self {
        Self { binary: PathBuf::from("ffmpeg"), duration_secs: 10, width: 1280, height: 720 }
    }
}

impl FfmpegSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration_secs: u32) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    fn args(&self, caption_file: &Path, background: Option<&Path>, output: &Path) -> Vec<String> {
        let (w, h, d) = (self.width, self.height, self.duration_secs);
        let mut args = vec!["-y".to_string()];
        match background {
            Some(image) => {
                args.extend(["-loop", "1", "-i"].map(String::from));
                args.push(image.to_string_lossy().into_owned());
            }
            None => {
                args.extend(["-f", "lavfi", "-i"].map(String::from));
                args.push(format!("color=c=black:s={w}x{h}:d={d}"));
            }
        }
        let filter = format!(
            "scale={w}:{h},drawtext=textfile={}:fontcolor=white:fontsize=36:\
             box=1:boxcolor=black@0.5:boxborderw=20:x=(w-text_w)/2:y=h-text_h-60",
            escape_filter_value(&caption_file.to_string_lossy())
        );
        args.extend(["-vf".to_string(), filter]);
        args.extend(["-t".to_string(), d.to_string()]);
        args.extend(["-r", "24", "-pix_fmt", "yuv420p"].map(String::from));
        args.push(output.to_string_lossy().into_owned());
        args
    }
}

fn backslash_escape(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escapes a filter option value for use inside a `-vf` filtergraph: once
/// for the option parser, then again for the graph parser.
pub fn escape_filter_value(value: &str) -> String {
    let option = backslash_escape(value, &['\\', '\'', ':']);
    backslash_escape(&option, &['\\', '\'', '[', ']', ',', ';'])
}

/// Breaks text into lines no wider than `width` characters.
pub fn wrap_caption(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

#[async_trait]
impl VideoSynthesizer for FfmpegSynthesizer {
    async fn render(
        &self,
        caption: &str,
        background: Option<&Path>,
        output: &Path,
    ) -> AdapterResult<()> {
        let caption_file = output.with_extension("caption.txt");
        tokio::fs::write(&caption_file, wrap_caption(caption, 48)).await?;

        let result = Command::new(&self.binary)
            .args(self.args(&caption_file, background, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;
        let _ = tokio::fs::remove_file(&caption_file).await;

        let out = result.map_err(|e| {
            AdapterError::Unavailable(format!("failed to run {}: {e}", self.binary.display()))
        })?;
        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let tail: String = stderr.lines().rev().take(5).collect::<Vec<_>>().join(" | ");
            return Err(AdapterError::OperationFailed(format!(
                "ffmpeg exited with {}: {tail}",
                out.status
            )));
        }
        Ok(())
    }
}
