mod display;
mod ucp;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use lcreview_ai::chat::{DEFAULT_MODEL, GROQ_BASE_URL};
use lcreview_ai::{
    ChatClient, ChatConfig, ComplianceEvaluator, ContextProvider, Embedder, Reasoner, Resilient,
    ReviewPipeline, TextSource, UcpAssistant,
};
use lcreview_core::{
    Attachment, DiscrepancyTable, DocumentRole, FieldMap, ReviewLimits, ValidationRecord,
};
use lcreview_store::{UcpIndex, read_pdf_text_async};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Completion budget for the compliance verdict.
const COMPLIANCE_MAX_TOKENS: u32 = 512;

#[derive(Parser)]
#[command(name = "lcreview")]
#[command(
    about = "Review letters of credit against supporting documents and UCP 600",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API key for the chat-completions endpoint
    #[arg(long, global = true, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long, global = true, env = "LCREVIEW_BASE_URL", default_value = GROQ_BASE_URL)]
    base_url: String,

    /// Chat model name
    #[arg(long, global = true, env = "LCREVIEW_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Per-call timeout in seconds
    #[arg(long, global = true, env = "LCREVIEW_TIMEOUT_SECS", default_value_t = 60)]
    timeout_secs: u64,

    /// Embedding model directory (model.onnx + tokenizer.json)
    #[arg(
        long,
        global = true,
        env = "LCREVIEW_MODEL_DIR",
        default_value = "models/all-MiniLM-L6-v2"
    )]
    model_dir: PathBuf,

    /// LanceDB directory holding the UCP 600 passage index
    #[arg(long, global = true, env = "LCREVIEW_UCP_INDEX", default_value = "storage/ucp600")]
    ucp_index: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract LC terms from the credit's PDF
    #[command(name = "extract-lc")]
    ExtractLc(ExtractArgs),

    /// Extract fields from a supporting document's PDF
    #[command(name = "extract-doc")]
    ExtractDoc(ExtractArgs),

    /// Compare LC fields against supporting documents
    Compare(CompareArgs),

    /// Evaluate UCP 600 compliance from LC fields and discrepancy tables
    Check(CheckArgs),

    /// Full review: extract the credit, compare attachments, evaluate compliance
    Review(ReviewArgs),

    /// Build the UCP 600 passage index from the rulebook PDF
    #[command(name = "ucp-index")]
    UcpIndex(UcpIndexArgs),

    /// Ask a question about an LC and UCP 600
    Ask(AskArgs),
}

#[derive(Args)]
struct ExtractArgs {
    pdf: PathBuf,
    /// Print JSON instead of a card
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AttachmentArgs {
    /// Attachment files; a name containing "lc" on a .pdf path is taken to be the credit
    files: Vec<PathBuf>,

    /// Always treat this file as a supporting document
    #[arg(long = "supporting", value_name = "FILE")]
    supporting: Vec<PathBuf>,

    /// Always treat this file as the credit (skipped during comparison)
    #[arg(long = "credit", value_name = "FILE")]
    credit: Vec<PathBuf>,
}

impl AttachmentArgs {
    fn attachments(&self) -> Vec<Attachment> {
        let untagged = self.files.iter().map(Attachment::from_path);
        let supporting = self
            .supporting
            .iter()
            .map(|p| Attachment::from_path(p).with_role(DocumentRole::Supporting));
        let credit = self
            .credit
            .iter()
            .map(|p| Attachment::from_path(p).with_role(DocumentRole::Credit));
        untagged.chain(supporting).chain(credit).collect()
    }
}

#[derive(Args)]
struct CompareArgs {
    /// LC fields as a JSON object (output of `extract-lc --json`)
    #[arg(long, value_name = "JSON")]
    lc_fields: PathBuf,

    #[command(flatten)]
    attachments: AttachmentArgs,

    /// Skip the model and compare field values directly
    #[arg(long)]
    rule_based: bool,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CheckArgs {
    #[arg(long, value_name = "JSON")]
    lc_fields: PathBuf,

    /// Discrepancy tables (output of `compare --json`)
    #[arg(long, value_name = "JSON")]
    tables: Option<PathBuf>,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ReviewArgs {
    /// The letter of credit PDF
    lc: PathBuf,

    #[command(flatten)]
    attachments: AttachmentArgs,

    #[arg(long)]
    rule_based: bool,

    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct UcpIndexArgs {
    /// UCP 600 rulebook PDF
    pdf: PathBuf,
}

#[derive(Args)]
struct AskArgs {
    question: String,

    /// LC fields to answer against
    #[arg(long, value_name = "JSON")]
    lc_fields: Option<PathBuf>,
}

/// Plain text from stored PDFs, with the error sentinel on failure.
struct PdfText;

#[async_trait]
impl TextSource for PdfText {
    async fn extract_text(&self, path: &Path) -> String {
        read_pdf_text_async(path.to_path_buf()).await
    }
}

impl Cli {
    fn chat_client(&self) -> ChatClient {
        if self.api_key.is_none() {
            warn!("GROQ_API_KEY not set, sending unauthenticated requests");
        }
        ChatClient::new(ChatConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            ..ChatConfig::default()
        })
    }

    fn resilient(&self, client: ChatClient) -> Arc<dyn Reasoner> {
        Arc::new(Resilient::new(client, Duration::from_secs(self.timeout_secs)))
    }

    fn reasoner(&self) -> Arc<dyn Reasoner> {
        self.resilient(self.chat_client())
    }

    fn compliance_reasoner(&self) -> Arc<dyn Reasoner> {
        self.resilient(self.chat_client().with_max_tokens(COMPLIANCE_MAX_TOKENS))
    }

    /// The persisted UCP index, or `None` (with a warning) when it cannot be opened.
    async fn ucp_context(&self) -> Option<Arc<dyn ContextProvider>> {
        match ucp::LanceUcpContext::open(&self.ucp_index, &self.model_dir).await {
            Ok(ctx) => Some(Arc::new(ctx)),
            Err(e) => {
                warn!(error = %e, "UCP index unavailable, evaluating without context");
                None
            }
        }
    }

    fn extraction_pipeline(&self) -> ReviewPipeline {
        ReviewPipeline::new(self.reasoner(), Arc::new(PdfText))
    }

    async fn pipeline(&self, rule_based: bool) -> ReviewPipeline {
        let mut pipeline = self
            .extraction_pipeline()
            .with_compliance_reasoner(self.compliance_reasoner());
        if rule_based {
            pipeline = pipeline.rule_based_comparison();
        }
        match self.ucp_context().await {
            Some(ctx) => pipeline.with_context(ctx),
            None => pipeline,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("lcreview v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::ExtractLc(args) => {
            let fields = cli.extraction_pipeline().extract_credit(&args.pdf).await;
            emit_fields("Letter of Credit", &fields, args.json)?;
        }
        Commands::ExtractDoc(args) => {
            let attachment = Attachment::from_path(&args.pdf).with_role(DocumentRole::Supporting);
            let documents = cli
                .extraction_pipeline()
                .extract_supporting(std::slice::from_ref(&attachment))
                .await;
            for doc in &documents {
                emit_fields(&doc.file_name, &doc.data, args.json)?;
            }
        }
        Commands::Compare(args) => {
            let lc_fields = read_fields(&args.lc_fields)?;
            let mut pipeline = cli.extraction_pipeline();
            if args.rule_based {
                pipeline = pipeline.rule_based_comparison();
            }
            let (_, tables) = pipeline
                .discrepancies(&lc_fields, &args.attachments.attachments())
                .await;
            if args.json {
                print_json(&tables)?;
            } else {
                display::print_tables(&tables);
            }
        }
        Commands::Check(args) => {
            let lc_fields = read_fields(&args.lc_fields)?;
            let tables: Vec<DiscrepancyTable> = match &args.tables {
                Some(path) => read_json(path)?,
                None => Vec::new(),
            };
            let context = cli.ucp_context().await;
            let outcome = ComplianceEvaluator::new(cli.compliance_reasoner())
                .evaluate(&lc_fields, &tables, context.as_deref())
                .await;
            let record = ValidationRecord::from_outcome(&outcome, now());
            if args.json {
                print_json(&outcome)?;
            } else {
                display::print_outcome(&outcome);
                display::print_record(&record);
            }
        }
        Commands::Review(args) => {
            let start = Instant::now();
            let pipeline = cli.pipeline(args.rule_based).await;
            let report = pipeline
                .review_credit(&args.lc, &args.attachments.attachments())
                .await;
            let record = report.validation_record(now());
            if args.json {
                print_json(&report)?;
            } else {
                display::print_report(&report, &record, &ReviewLimits::default());
            }
            info!(elapsed_secs = start.elapsed().as_secs_f64(), "review finished");
        }
        Commands::UcpIndex(args) => {
            eprintln!("Building UCP index at {}", cli.ucp_index.display());
            let index = UcpIndex::create(&cli.ucp_index).await?;
            let mut embedder = Embedder::load(&cli.model_dir).with_context(|| {
                format!("loading embedding model from {}", cli.model_dir.display())
            })?;
            let stats = ucp::build_index(&index, &mut embedder, &args.pdf).await?;
            eprintln!(
                "  Indexed {} passages in {:.1}s",
                stats.passages, stats.elapsed_secs
            );
        }
        Commands::Ask(args) => {
            let lc_fields = args.lc_fields.as_deref().map(read_fields).transpose()?;
            let context = cli.ucp_context().await;
            let answer = UcpAssistant::new(cli.reasoner())
                .answer(&args.question, lc_fields.as_ref(), context.as_deref())
                .await
                .context("asking the model")?;
            println!("{answer}");
        }
    }
    Ok(())
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_fields(path: &Path) -> anyhow::Result<FieldMap> {
    read_json(path)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn emit_fields(title: &str, fields: &FieldMap, json: bool) -> anyhow::Result<()> {
    if json {
        print_json(fields)
    } else {
        display::print_fields(title, fields);
        Ok(())
    }
}
