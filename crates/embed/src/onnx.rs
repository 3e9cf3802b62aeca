use once_cell::sync::OnceCell;
use onnxruntime::{
    environment::Environment, ndarray::Array, session::Session, GraphOptimizationLevel,
};
use std::cell::RefCell;
use tokenizers::{Tokenizer, TruncationParams};

use crate::assets::ModelAssets;
use crate::EmbedError;

static ORT_ENV: OnceCell<Environment> = OnceCell::new();
const ORT_NAME: &str = "hnfeat_embed";

/// Outputs that already carry the pooled dense vector, checked before falling back to output 0.
const DENSE_OUTPUT_NAMES: [&str; 2] = ["dense_vecs", "sentence_embedding"];

/// Tokenizer + ONNX session pair, loaded once per process.
pub struct OnnxEmbedder {
    tokenizer: Tokenizer,
    session: RefCell<Session<'static>>,
    output_index: usize,
}

impl std::fmt::Debug for OnnxEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbedder")
            .field("output_index", &self.output_index)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbedder {
    pub(crate) fn load(
        assets: &ModelAssets,
        max_sequence_length: usize,
    ) -> Result<Self, EmbedError> {
        let mut tokenizer = Tokenizer::from_file(&assets.tokenizer_path)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| EmbedError::InvalidConfig(e.to_string()))?;

        let env = ort_environment()?;
        let session = env
            .new_session_builder()
            .map_err(|e| EmbedError::Inference(e.to_string()))?
            .with_optimization_level(GraphOptimizationLevel::Basic)
            .map_err(|e| EmbedError::Inference(e.to_string()))?
            .with_model_from_file(assets.model_path.clone())
            .map_err(|e| EmbedError::Inference(e.to_string()))?;

        if session.outputs.is_empty() {
            return Err(EmbedError::Inference(
                "model did not declare any outputs".into(),
            ));
        }
        let output_index = session
            .outputs
            .iter()
            .position(|output| DENSE_OUTPUT_NAMES.contains(&output.name.as_str()))
            .unwrap_or(0);

        Ok(Self {
            tokenizer,
            session: RefCell::new(session),
            output_index,
        })
    }

    /// Runs a single text (batch of one) and returns the raw dense vector.
    pub(crate) fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let enc = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        let ids: Vec<i64> = enc.get_ids().iter().map(|&x| x as i64).collect();
        let mask: Vec<i64> = enc.get_attention_mask().iter().map(|&x| x as i64).collect();
        if ids.is_empty() || ids.len() != mask.len() {
            return Err(EmbedError::Inference(
                "tokenizer produced mismatched id/mask lengths".into(),
            ));
        }
        let seq_len = ids.len();

        let input_ids = Array::from_shape_vec((1, seq_len), ids)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        let attn_mask = Array::from_shape_vec((1, seq_len), mask)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;

        let mut guard = self.session.borrow_mut();
        let session = &mut *guard;
        let mut runtime_inputs = Vec::with_capacity(session.inputs.len());
        let mut input_ids_tensor = Some(input_ids);
        let mut attn_mask_tensor = Some(attn_mask);

        for input in &session.inputs {
            match input.name.as_str() {
                "input_ids" => {
                    let tensor = input_ids_tensor.take().ok_or_else(|| {
                        EmbedError::InvalidConfig(
                            "model requested `input_ids` multiple times".into(),
                        )
                    })?;
                    runtime_inputs.push(tensor.into_dyn());
                }
                "attention_mask" => {
                    let tensor = attn_mask_tensor.take().ok_or_else(|| {
                        EmbedError::InvalidConfig(
                            "model requested `attention_mask` multiple times".into(),
                        )
                    })?;
                    runtime_inputs.push(tensor.into_dyn());
                }
                "token_type_ids" => {
                    let tensor = Array::from_elem((1, seq_len), 0_i64);
                    runtime_inputs.push(tensor.into_dyn());
                }
                other => {
                    return Err(EmbedError::Inference(format!(
                        "unsupported model input '{other}'"
                    )))
                }
            }
        }

        if runtime_inputs.is_empty() {
            return Err(EmbedError::Inference(
                "model did not declare any inputs".into(),
            ));
        }

        let outputs = session
            .run::<i64, f32, _>(runtime_inputs)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        let tensor = outputs
            .get(self.output_index)
            .ok_or_else(|| EmbedError::Inference("model returned no outputs".into()))?;
        let shape = tensor.shape().to_vec();
        let flat: Vec<f32> = tensor.iter().copied().collect();

        dense_from_output(&shape, &flat)
    }
}

/// Picks the dense vector out of a batch-of-one output tensor. Token-level outputs
/// (`[1, seq, hidden]`) use the `[CLS]` position.
pub(crate) fn dense_from_output(shape: &[usize], flat: &[f32]) -> Result<Vec<f32>, EmbedError> {
    let hidden = match shape {
        [1, _, hidden] | [1, hidden] | [hidden] => *hidden,
        other => {
            return Err(EmbedError::Inference(format!(
                "unsupported output shape {other:?} for a single input"
            )))
        }
    };
    flat.get(..hidden)
        .filter(|slice| !slice.is_empty())
        .map(<[f32]>::to_vec)
        .ok_or_else(|| {
            EmbedError::Inference(format!(
                "output holds {} values, expected at least {hidden}",
                flat.len()
            ))
        })
}

/// Lazily constructs the process-wide ONNX Runtime environment.
fn ort_environment() -> Result<&'static Environment, EmbedError> {
    ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name(ORT_NAME)
            .build()
            .map_err(|e| EmbedError::Inference(e.to_string()))
    })
}
