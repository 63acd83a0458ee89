//! LanceDB index of UCP 600 rulebook passages.
//!
//! One table, `ucp600`, holding a `text` column and a fixed-size
//! `embedding` column. Built once per uploaded rulebook, then queried by
//! vector similarity during compliance checks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, FixedSizeListBuilder, Float32Builder, LargeStringArray, RecordBatchIterator,
    StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use tracing::info;

use crate::StoreError;

/// Name of the passage table.
pub const UCP_TABLE: &str = "ucp600";

/// LanceDB store for UCP rulebook passages.
pub struct UcpIndex {
    db: lancedb::Connection,
    path: PathBuf,
}

impl UcpIndex {
    /// Connect to an index directory, creating it if needed. Used when building.
    pub async fn create(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;
        Self::connect(path).await
    }

    /// Connect to an existing index directory.
    ///
    /// Fails with [`StoreError::IndexNotFound`] when the directory is absent.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::IndexNotFound(path.to_path_buf()));
        }
        Self::connect(path).await
    }

    async fn connect(path: &Path) -> Result<Self, StoreError> {
        let uri = path
            .to_str()
            .ok_or_else(|| StoreError::Other("non-UTF8 index path".into()))?;
        let db = lancedb::connect(uri).execute().await?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Replace the passage table with `passages` and their embeddings.
    ///
    /// Returns the number of passages written.
    pub async fn write_passages(
        &self,
        passages: &[String],
        embeddings: &[Vec<f32>],
    ) -> Result<usize, StoreError> {
        let batch = passages_batch(passages, embeddings)?;
        let rows = batch.num_rows();
        let schema = batch.schema();
        let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);

        let existing = self.db.table_names().execute().await?;
        if existing.contains(&UCP_TABLE.to_string()) {
            self.db.drop_table(UCP_TABLE, &[]).await?;
        }

        self.db
            .create_table(UCP_TABLE, Box::new(reader))
            .execute()
            .await?;

        info!(
            index = %self.path.display(),
            rows,
            "wrote UCP passage table"
        );
        Ok(rows)
    }

    /// Number of indexed passages.
    #[cfg(test)]
    async fn passage_count(&self) -> Result<usize, StoreError> {
        let table = self.db.open_table(UCP_TABLE).execute().await?;
        Ok(table.count_rows(None).await?)
    }

    /// The `k` passages nearest to `query_vector`, closest first.
    pub async fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<String>, StoreError> {
        let table = self.db.open_table(UCP_TABLE).execute().await?;
        let batches: Vec<RecordBatch> = table
            .vector_search(query_vector)?
            .limit(k)
            .execute()
            .await?
            .try_collect()
            .await?;
        Ok(texts_from_batches(&batches))
    }
}

/// Build a `text` + `embedding` RecordBatch.
fn passages_batch(passages: &[String], embeddings: &[Vec<f32>]) -> Result<RecordBatch, StoreError> {
    if passages.len() != embeddings.len() {
        return Err(StoreError::LengthMismatch {
            passages: passages.len(),
            embeddings: embeddings.len(),
        });
    }
    if passages.is_empty() {
        return Err(StoreError::Other("no passages provided".into()));
    }

    let dim = embeddings[0].len();
    if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
        return Err(StoreError::Other(format!(
            "inconsistent embedding dimension: expected {dim}, got {}",
            bad.len()
        )));
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("text", DataType::Utf8, false),
        Field::new(
            "embedding",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                dim as i32,
            ),
            true,
        ),
    ]));

    let text = StringArray::from(passages.to_vec());

    let mut emb_builder = FixedSizeListBuilder::new(Float32Builder::new(), dim as i32);
    for emb in embeddings {
        let values = emb_builder.values();
        for &val in emb {
            values.append_value(val);
        }
        emb_builder.append(true);
    }

    Ok(RecordBatch::try_new(
        schema,
        vec![Arc::new(text), Arc::new(emb_builder.finish())],
    )?)
}

/// Pull the `text` column out of search results (Utf8 or LargeUtf8).
fn texts_from_batches(batches: &[RecordBatch]) -> Vec<String> {
    let mut out = Vec::new();
    for batch in batches {
        let Some(col) = batch.column_by_name("text") else {
            continue;
        };
        if let Some(arr) = col.as_any().downcast_ref::<StringArray>() {
            out.extend(arr.iter().flatten().map(str::to_string));
        } else if let Some(arr) = col.as_any().downcast_ref::<LargeStringArray>() {
            out.extend(arr.iter().flatten().map(str::to_string));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn passages() -> Vec<String> {
        vec![
            "Article 6: A credit must state an expiry date for presentation.".into(),
            "Article 14: Documents must be presented within 21 days after shipment.".into(),
            "Article 20: A bill of lading must indicate the name of the carrier.".into(),
        ]
    }

    fn unit(i: usize) -> Vec<f32> {
        let mut v = vec![0.0; 4];
        v[i] = 1.0;
        v
    }

    #[tokio::test]
    async fn open_missing_directory_errors() {
        let tmp = TempDir::new().unwrap();
        let result = UcpIndex::open(&tmp.path().join("absent")).await;
        assert!(matches!(result, Err(StoreError::IndexNotFound(_))));
    }

    #[tokio::test]
    async fn write_then_count() {
        let tmp = TempDir::new().unwrap();
        let index = UcpIndex::create(&tmp.path().join("ucp")).await.unwrap();
        let written = index
            .write_passages(&passages(), &[unit(0), unit(1), unit(2)])
            .await
            .unwrap();
        assert_eq!(written, 3);
        assert_eq!(index.passage_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn rewrite_replaces_table() {
        let tmp = TempDir::new().unwrap();
        let index = UcpIndex::create(&tmp.path().join("ucp")).await.unwrap();
        index
            .write_passages(&passages(), &[unit(0), unit(1), unit(2)])
            .await
            .unwrap();
        index
            .write_passages(&passages()[..1], &[unit(0)])
            .await
            .unwrap();
        assert_eq!(index.passage_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn search_returns_nearest_first() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("ucp");
        {
            let index = UcpIndex::create(&dir).await.unwrap();
            index
                .write_passages(&passages(), &[unit(0), unit(1), unit(2)])
                .await
                .unwrap();
        }

        let index = UcpIndex::open(&dir).await.unwrap();
        let hits = index.search(&[0.1, 0.9, 0.0, 0.0], 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].starts_with("Article 14"));
    }

    #[tokio::test]
    async fn mismatched_lengths_rejected() {
        let tmp = TempDir::new().unwrap();
        let index = UcpIndex::create(&tmp.path().join("ucp")).await.unwrap();
        let result = index.write_passages(&passages(), &[unit(0)]).await;
        assert!(matches!(
            result,
            Err(StoreError::LengthMismatch {
                passages: 3,
                embeddings: 1
            })
        ));
    }
}
