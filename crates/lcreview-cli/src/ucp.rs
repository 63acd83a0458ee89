//! UCP 600 index: build from the rulebook PDF, query during reviews.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use anyhow::Context;
use async_trait::async_trait;
use lcreview_ai::{ContextError, ContextProvider, Embedder};
use lcreview_core::chunk::{UCP_CHUNK_OVERLAP, UCP_CHUNK_SIZE, split_text};
use lcreview_store::{UcpIndex, is_extraction_error, read_pdf_text_async};
use tracing::info;

const EMBED_BATCH_SIZE: usize = 64;

pub struct IndexStats {
    pub passages: usize,
    pub elapsed_secs: f64,
}

/// Read the rulebook → split into overlapping passages → embed → replace the index table.
pub async fn build_index(
    index: &UcpIndex,
    embedder: &mut Embedder,
    rulebook: &Path,
) -> anyhow::Result<IndexStats> {
    let start = Instant::now();

    let text = read_pdf_text_async(rulebook.to_path_buf()).await;
    anyhow::ensure!(!is_extraction_error(&text), "{text}");
    eprintln!("  Read {} chars from {}", text.chars().count(), rulebook.display());

    let passages = split_text(&text, UCP_CHUNK_SIZE, UCP_CHUNK_OVERLAP);
    anyhow::ensure!(!passages.is_empty(), "no text found in {}", rulebook.display());
    eprintln!("  Split into {} passages", passages.len());

    let embeddings = embedder
        .embed_passages(&passages, EMBED_BATCH_SIZE)
        .context("generating passage embeddings")?;

    eprintln!("  Writing to LanceDB...");
    let passages = index
        .write_passages(&passages, &embeddings)
        .await
        .context("writing UCP passage table")?;

    Ok(IndexStats {
        passages,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

/// [`ContextProvider`] over a persisted index, embedding queries with the
/// same model the index was built with.
///
/// Query embedding runs on the blocking pool so ONNX inference never
/// stalls a runtime worker.
pub struct LanceUcpContext {
    index: UcpIndex,
    embedder: Arc<Mutex<Embedder>>,
}

impl LanceUcpContext {
    pub async fn open(index_dir: &Path, model_dir: &Path) -> anyhow::Result<Self> {
        let index = UcpIndex::open(index_dir).await?;
        let embedder = Embedder::load(model_dir)?;
        info!(index = %index_dir.display(), "opened UCP index");
        Ok(Self {
            index,
            embedder: Arc::new(Mutex::new(embedder)),
        })
    }
}

#[async_trait]
impl ContextProvider for LanceUcpContext {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<String>, ContextError> {
        let vector = embed_query(Arc::clone(&self.embedder), query.to_string()).await?;
        self.index
            .search(&vector, k)
            .await
            .map_err(|e| ContextError::Search(e.to_string()))
    }
}

async fn embed_query(
    embedder: Arc<Mutex<Embedder>>,
    query: String,
) -> Result<Vec<f32>, ContextError> {
    with_locked(embedder, move |embedder| {
        embedder
            .embed(&query)
            .map_err(|e| ContextError::Search(format!("embed query: {e}")))
    })
    .await
}

/// Run `f` against the shared value on the blocking pool.
async fn with_locked<T, R, F>(shared: Arc<Mutex<T>>, f: F) -> Result<R, ContextError>
where
    T: Send + 'static,
    R: Send + 'static,
    F: FnOnce(&mut T) -> Result<R, ContextError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = shared
            .lock()
            .map_err(|_| ContextError::Search("embedder lock poisoned".into()))?;
        f(&mut guard)
    })
    .await
    .map_err(|e| ContextError::Search(format!("embedding task failed: {e}")))?
}
