//! Sentence embeddings for UCP passages and retrieval queries.
//!
//! Mean-pooled, L2-normalised output of a sentence-transformers ONNX export
//! (all-MiniLM-L6-v2 by default, 384 dimensions). The model directory must
//! contain `model.onnx` and `tokenizer.json`.

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::{debug, info};

/// Passage embedder backed by ONNX Runtime.
///
/// Index construction and query-time search must use the same model, or
/// distances in the UCP table are meaningless.
pub struct Embedder {
    session: Session,
    tokenizer: Tokenizer,
    dim: usize,
}

impl Embedder {
    /// Load an embedding model from a directory containing `model.onnx` and `tokenizer.json`.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let model_path = model_dir.join("model.onnx");
        let tokenizer_path = model_dir.join("tokenizer.json");

        anyhow::ensure!(model_path.exists(), "model.onnx not found in {model_dir:?}");
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer.json not found in {model_dir:?}"
        );

        let session = Session::builder()?.commit_from_file(&model_path)?;

        // Infer embedding dimension from model output shape.
        let dim = infer_dim(session.outputs()[0].dtype()).unwrap_or(384);

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))?;

        // Configure truncation to model's max length (256 for MiniLM).
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: 256,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;

        // Configure padding to pad all inputs in a batch to the same length.
        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            ..Default::default()
        }));

        info!(dim, model = %model_path.display(), "loaded embedding model");
        Ok(Self {
            session,
            tokenizer,
            dim,
        })
    }

    /// Embedding dimensionality (384 for all-MiniLM-L6-v2).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embed one query string.
    pub fn embed(&mut self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.embed_batch(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("model returned no embedding"))
    }

    /// Embed passages in fixed-size batches, keeping input order.
    pub fn embed_passages(
        &mut self,
        passages: &[String],
        batch_size: usize,
    ) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(passages.len());
        for (i, chunk) in passages.chunks(batch_size.max(1)).enumerate() {
            let texts: Vec<&str> = chunk.iter().map(String::as_str).collect();
            vectors.extend(self.embed_batch(&texts)?);
            debug!(
                batch = i,
                embedded = vectors.len(),
                total = passages.len(),
                "embedded passages"
            );
        }
        Ok(vectors)
    }

    /// Embed a batch of texts, returning one normalised vector per input.
    pub fn embed_batch(&mut self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;
        let inputs = BatchInputs::from_encodings(&encodings);
        let shape = [inputs.rows as i64, inputs.seq_len as i64];

        let outputs = self.session.run(ort::inputs![
            "input_ids" => Tensor::from_array((shape, inputs.ids.into_boxed_slice()))?,
            "attention_mask" =>
                Tensor::from_array((shape, inputs.mask.clone().into_boxed_slice()))?,
            "token_type_ids" => Tensor::from_array((shape, inputs.type_ids.into_boxed_slice()))?,
        ])?;

        // Token embeddings: [rows, seq_len, dim].
        let (output_shape, token_vectors) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] as usize == inputs.rows && dims[2] as usize == self.dim,
            "unexpected output shape: {dims:?}, expected [{}, {}, {}]",
            inputs.rows,
            inputs.seq_len,
            self.dim
        );

        Ok(mean_pool(
            token_vectors,
            &inputs.mask,
            inputs.seq_len,
            dims[1] as usize,
            self.dim,
        ))
    }
}

/// Row-major `[rows, seq_len]` model inputs, zero-padded.
struct BatchInputs {
    rows: usize,
    seq_len: usize,
    ids: Vec<i64>,
    mask: Vec<i64>,
    type_ids: Vec<i64>,
}

impl BatchInputs {
    fn from_encodings(encodings: &[tokenizers::Encoding]) -> Self {
        let rows = encodings.len();
        let seq_len = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0);
        let mut inputs = Self {
            rows,
            seq_len,
            ids: vec![0; rows * seq_len],
            mask: vec![0; rows * seq_len],
            type_ids: vec![0; rows * seq_len],
        };
        for (i, encoding) in encodings.iter().enumerate() {
            let start = i * seq_len;
            copy_widened(&mut inputs.ids[start..], encoding.get_ids());
            copy_widened(&mut inputs.mask[start..], encoding.get_attention_mask());
            copy_widened(&mut inputs.type_ids[start..], encoding.get_type_ids());
        }
        inputs
    }
}

fn copy_widened(dst: &mut [i64], src: &[u32]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = s as i64;
    }
}

/// Attention-masked mean over tokens, then L2 normalisation.
///
/// `mask` is laid out with `mask_seq_len` columns; `token_vectors` with
/// `out_seq_len` tokens of `dim` floats per row. The two lengths differ
/// only if the model trims its input.
fn mean_pool(
    token_vectors: &[f32],
    mask: &[i64],
    mask_seq_len: usize,
    out_seq_len: usize,
    dim: usize,
) -> Vec<Vec<f32>> {
    let rows = mask.len().checked_div(mask_seq_len).unwrap_or(0);
    (0..rows)
        .map(|row| {
            let mut pooled = vec![0.0f32; dim];
            let mut weight = 0.0f32;
            for tok in 0..out_seq_len.min(mask_seq_len) {
                let m = mask[row * mask_seq_len + tok] as f32;
                if m <= 0.0 {
                    continue;
                }
                let base = (row * out_seq_len + tok) * dim;
                for (p, x) in pooled.iter_mut().zip(&token_vectors[base..base + dim]) {
                    *p += x * m;
                }
                weight += m;
            }
            if weight > 0.0 {
                pooled.iter_mut().for_each(|p| *p /= weight);
            }
            normalize(&mut pooled);
            pooled
        })
        .collect()
}

/// L2-normalise a vector in place.
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Try to infer the embedding dimension from the ONNX model output type.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => {
            // Last dimension is the embedding dim.
            shape
                .last()
                .and_then(|&d| if d > 0 { Some(d as usize) } else { None })
        }
        _ => None,
    }
}
