//! Pretrained RoBERTa GoEmotions classifier, run on CPU with candle.
//!
//! Loads `config.json`, `tokenizer.json` and `model.safetensors` from a
//! Hugging Face snapshot. The label vocabulary comes from the model's own
//! `id2label` table.

use super::EmotionClassifier;
use crate::error::ClassifierError;
use candle::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as RobertaConfig, XLMRobertaForSequenceClassification};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;
use tracing::info;

/// Characters are bounded generously; the token cut below is the real limit.
const MAX_INPUT_CHARS: usize = 4096;

#[derive(Deserialize)]
struct LabelConfig {
    id2label: HashMap<String, String>,
}

pub struct RobertaClassifier {
    model: XLMRobertaForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    labels: Vec<String>,
    max_tokens: usize,
}

impl RobertaClassifier {
    /// Download (or reuse the cached) snapshot of `repo_id` and load it.
    pub fn from_hub(repo_id: &str) -> Result<Self, ClassifierError> {
        let api = hf_hub::api::sync::Api::new()
            .map_err(|e| ClassifierError::Load(format!("hub client: {e}")))?;
        let repo = api.model(repo_id.to_string());

        let fetch = |name: &str| -> Result<PathBuf, ClassifierError> {
            repo.get(name)
                .map_err(|e| ClassifierError::Load(format!("{repo_id}/{name}: {e}")))
        };

        let config = fetch("config.json")?;
        let tokenizer = fetch("tokenizer.json")?;
        let weights = fetch("model.safetensors")?;

        info!("Loading emotion model {}", repo_id);
        Self::load(&config, &tokenizer, &weights)
    }

    /// Load from explicit file paths.
    pub fn load(config_path: &Path, tokenizer_path: &Path, weights_path: &Path) -> Result<Self, ClassifierError> {
        let device = Device::Cpu;

        let raw_config = std::fs::read(config_path)
            .map_err(|e| ClassifierError::Load(format!("{}: {e}", config_path.display())))?;
        let config: RobertaConfig = serde_json::from_slice(&raw_config)
            .map_err(|e| ClassifierError::Load(format!("model config: {e}")))?;
        let label_config: LabelConfig = serde_json::from_slice(&raw_config)
            .map_err(|e| ClassifierError::Load(format!("id2label: {e}")))?;
        let labels = ordered_labels(label_config.id2label)?;

        let tokenizer = Tokenizer::from_file(tokenizer_path).map_err(|e| {
            ClassifierError::Load(format!("tokenizer ({}): {e}", tokenizer_path.display()))
        })?;

        // RoBERTa position ids start after the padding index
        let max_tokens = config
            .max_position_embeddings
            .saturating_sub(config.pad_token_id as usize + 1)
            .max(16);

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(|e| ClassifierError::Load(format!("weights: {e}")))?
        };
        let model = XLMRobertaForSequenceClassification::new(labels.len(), &config, vb)
            .map_err(|e| ClassifierError::Load(format!("model: {e}")))?;

        Ok(Self {
            model,
            tokenizer,
            device,
            labels,
            max_tokens,
        })
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>, ClassifierError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ClassifierError::Tokenizer(e.to_string()))?;

        let mut ids = encoding.get_ids().to_vec();
        if ids.len() > self.max_tokens {
            // Keep the end-of-sequence token after the cut
            let eos = ids[ids.len() - 1];
            ids.truncate(self.max_tokens - 1);
            ids.push(eos);
        }
        Ok(ids)
    }

    fn forward(&self, ids: &[u32]) -> candle::Result<Vec<f32>> {
        let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
        let attention_mask = input_ids.ones_like()?;
        let token_type_ids = input_ids.zeros_like()?;

        let logits = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids)?;
        logits.squeeze(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()
    }
}

impl EmotionClassifier for RobertaClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn max_input_chars(&self) -> usize {
        MAX_INPUT_CHARS
    }

    fn logits(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let ids = self.encode(text)?;
        self.forward(&ids)
            .map_err(|e| ClassifierError::Inference(e.to_string()))
    }
}

/// Turn `{"0": "admiration", ...}` into a dense, index-ordered label list.
fn ordered_labels(id2label: HashMap<String, String>) -> Result<Vec<String>, ClassifierError> {
    let mut labels = vec![String::new(); id2label.len()];
    for (id, label) in id2label {
        let index: usize = id
            .parse()
            .map_err(|e| ClassifierError::Load(format!("label id {id:?}: {e}")))?;
        let slot = labels
            .get_mut(index)
            .ok_or_else(|| ClassifierError::Load(format!("label id {index} out of range")))?;
        *slot = label;
    }
    if labels.iter().any(|l| l.is_empty()) {
        return Err(ClassifierError::Load("id2label has gaps".into()));
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_labels() {
        let map = HashMap::from([
            ("1".to_string(), "amusement".to_string()),
            ("0".to_string(), "admiration".to_string()),
            ("2".to_string(), "anger".to_string()),
        ]);
        let labels = ordered_labels(map).expect("labels");
        assert_eq!(labels, vec!["admiration", "amusement", "anger"]);
    }

    #[test]
    fn test_ordered_labels_out_of_range() {
        let map = HashMap::from([("5".to_string(), "joy".to_string())]);
        assert!(ordered_labels(map).is_err());
    }

    #[test]
    fn test_ordered_labels_bad_id() {
        let map = HashMap::from([("zero".to_string(), "joy".to_string())]);
        assert!(ordered_labels(map).is_err());
    }
}
