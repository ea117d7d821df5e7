use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::debug;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// First line of every generated document.
pub const OUTPUT_HEADER: &str = "# Repository Overview\n\n";

/// Everything the overview document reports, already rendered to text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overview {
    pub summary: String,
    pub tech_stack: String,
    pub directory_tree: String,
    pub entry_points: Vec<String>,
    pub features: String,
}

pub struct MarkdownWriter<W: AsyncWrite + Unpin> {
    writer: BufWriter<W>,
}

impl MarkdownWriter<File> {
    pub async fn create(path: &std::path::Path) -> Result<Self> {
        let file = File::create(path)
            .await
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: AsyncWrite + Unpin> MarkdownWriter<W> {
    pub fn new(writer: BufWriter<W>) -> Self {
        Self { writer }
    }

    pub async fn write_overview(
        &mut self,
        overview: &Overview,
        generated_at: DateTime<Utc>,
    ) -> Result<()> {
        self.write(OUTPUT_HEADER, "document header").await?;
        self.write(
            &format!(
                "> Auto-generated by llmmd on {}\n\n",
                generated_at.format("%Y-%m-%d")
            ),
            "attribution",
        )
        .await?;

        self.write_section("Purpose", &overview.summary).await?;
        self.write_section("Tech Stack", &overview.tech_stack).await?;

        debug!("Writing directory tree");
        self.write("## Directory Structure\n\n```\n", "tree heading")
            .await?;
        self.write(&overview.directory_tree, "directory tree")
            .await?;
        self.write("```\n\n", "tree fence").await?;

        self.write("## Key Entry Points\n\n", "entry point heading")
            .await?;
        for entry_point in &overview.entry_points {
            self.write(&format!("- `{entry_point}`\n"), "entry point")
                .await?;
        }
        self.write("\n", "entry point list").await?;

        self.write_section("Features (from tests)", &overview.features)
            .await?;

        self.flush().await
    }

    async fn write_section(&mut self, heading: &str, body: &str) -> Result<()> {
        debug!("Writing section: {heading}");
        self.write(&format!("## {heading}\n\n{body}\n\n"), heading)
            .await
    }

    async fn write(&mut self, text: &str, what: &str) -> Result<()> {
        self.writer
            .write_all(text.as_bytes())
            .await
            .with_context(|| format!("Failed to write {what}"))
    }

    pub async fn flush(&mut self) -> Result<()> {
        self.writer.flush().await.context("Failed to flush output")
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}
