use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "llm-seo")]
#[command(about = "Audit a website for LLM discoverability, generate llm.txt, and recommendations.")]
#[command(version)]
pub struct Args {
    /// Website/page URL to audit (e.g., https://example.com)
    pub url: String,

    /// Maximum number of same-origin pages to audit
    #[arg(short, long)]
    pub max_pages: Option<usize>,

    /// Output a JSON report to stdout
    #[arg(long = "json")]
    pub as_json: bool,

    /// Write the generated llm.txt to the output directory
    #[arg(long)]
    pub save_llm_txt: bool,

    /// Directory to write outputs
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Path to an audit configuration file (JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Check how well the primary page aligns with a search query
    #[arg(short, long)]
    pub query: Option<String>,

    /// Contact address for the llm.txt draft
    #[arg(long)]
    pub contact: Option<String>,

    /// License URL for the llm.txt draft
    #[arg(long)]
    pub license_url: Option<String>,
}
