//! Keyword tables.
//!
//! The category table is the single source of truth for category tagging
//! and for the keyword term of the scorer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Label assigned when no category matches.
pub const OTHER_CATEGORY: &str = "Other";

/// One category and the substrings that identify it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    pub keywords: Vec<String>,
}

impl Category {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// `category -> keyword set` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeywordTable {
    categories: Vec<Category>,
}

impl KeywordTable {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// Every distinct keyword of the table, in table order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        let mut seen = BTreeSet::new();
        self.categories
            .iter()
            .flat_map(|c| c.keywords.iter())
            .filter(move |k| seen.insert(k.as_str()))
            .map(String::as_str)
    }

    /// Number of distinct keywords occurring in `text`.
    pub fn count_matches(&self, text: &str) -> usize {
        let lowered = text.to_lowercase();
        self.keywords().filter(|k| lowered.contains(k)).count()
    }

    /// Whether any keyword occurs in `text`.
    pub fn any_match(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.keywords().any(|k| lowered.contains(k))
    }

    /// Labels of all categories with at least one keyword in `text`,
    /// or the `Other` sentinel.
    pub fn categorize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let labels: Vec<String> = self
            .categories
            .iter()
            .filter(|c| c.matches(&lowered))
            .map(|c| c.label.clone())
            .collect();

        if labels.is_empty() {
            vec![OTHER_CATEGORY.to_string()]
        } else {
            labels
        }
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(vec![
            Category::new(
                "OpenAI",
                &[
                    "chatgpt", "gpt", "openai", "dall-e", "whisper", "sora",
                ],
            ),
            Category::new(
                "Gemini",
                &["gemini", "google-gemini", "bard", "palm-2"],
            ),
            Category::new("Claude", &["claude", "anthropic"]),
            Category::new("Mistral", &["mistral", "mixtral"]),
            Category::new("Llama", &["llama", "meta-llama", "meta-ai"]),
            Category::new(
                "Chinese Models",
                &[
                    "文心一言", "文心", "ernie", "wenxin", "通义千问", "qwen", "讯飞星火",
                    "sparkdesk", "腾讯混元", "hunyuan", "混元", "智谱", "chatglm", "moonshot",
                    "kimi", "deepseek",
                ],
            ),
            Category::new(
                "Dev Tools",
                &["cursor", "copilot", "tabnine", "codeium", "vscode"],
            ),
            Category::new(
                "Agents & RAG",
                &["agent", "rag", "retrieval-augmented", "langchain", "prompt", "llm"],
            ),
            Category::new(
                "Generative Media",
                &[
                    "diffusion", "text-to-image", "text-to-video", "stable-diffusion",
                    "midjourney", "multimodal",
                ],
            ),
            Category::new(
                "Foundations",
                &[
                    "transformer", "bert", "nlp", "fine-tuning", "rlhf", "agi",
                    "language-model",
                ],
            ),
        ])
    }
}

/// Strong signals: one of these alone marks a repository as AI-related.
const CORE_AI_TERMS: &[&str] = &[
    "llm",
    "ai",
    "ml",
    "gpt",
    "bert",
    "nlp",
    "language-model",
    "machine-learning",
    "deep-learning",
];

/// Broad AI vocabulary for the weaker relevance match.
const BROAD_AI_TERMS: &[&str] = &[
    "transformer", "neural-network", "artificial-intelligence", "agi", "agent",
    "reinforcement-learning", "diffusion", "generative", "stable-diffusion", "openai",
    "huggingface", "langchain", "chatgpt", "claude", "gemini", "mistral", "multimodal",
    "rlhf", "alignment", "prompt-engineering", "fine-tuning", "vector-database",
    "semantic-search", "embedding", "llama", "mixtral", "vicuna", "falcon", "qwen", "glm",
    "ernie", "tokenizer", "attention", "vllm", "rag", "text-to-image", "text-to-speech",
    "speech-to-text", "computer-vision", "knowledge-graph", "tensor", "neural", "gan",
    "inference", "tensorflow", "pytorch", "onnx", "jax", "keras", "scikit-learn", "cuda",
    "tensorrt", "openvino", "opencv", "ollama", "faiss", "milvus", "weaviate",
];

/// Terms used to decide whether an article title is about AI.
const ARTICLE_AI_TERMS: &[&str] = &[
    "ai", "artificial intelligence", "machine learning", "ml", "llm", "language model",
    "chatgpt", "gpt", "claude", "gemini", "openai", "anthropic", "llama", "mistral",
    "huggingface", "neural network", "deep learning", "diffusion", "transformer", "nlp",
    "bert", "rlhf", "fine-tuning", "rag", "agent",
];

/// Terms that suggest newer techniques, used for paper novelty.
pub const EMERGING_TERMS: &[&str] = &[
    "gpt-4", "claude 3", "gemini", "llama 3", "mistral", "mixtral", "multimodal", "vision",
    "audio", "video", "agents", "rag", "sora", "generative", "diffusion", "mamba",
    "state space model", "tokens", "novel", "state-of-the-art",
];

/// Terms that suggest released code or data.
pub const REPRODUCIBILITY_TERMS: &[&str] = &[
    "code", "github", "implementation", "dataset", "public", "available", "open-source",
    "repository", "replicate", "reproduce",
];

/// Technique names surfaced on papers.
pub const TECHNIQUE_TERMS: &[&str] = &[
    "transformer",
    "attention mechanism",
    "fine-tuning",
    "reinforcement learning",
    "diffusion model",
    "generative model",
    "multi-modal",
    "rlhf",
    "contrastive learning",
];

/// Search terms for the on-demand model lookup.
const MODEL_SEARCH_TERMS: &[(&str, &[&str])] = &[
    ("cursor", &["getcursor", "cursor-ai", "cursor ai", "cursor-editor"]),
    (
        "deepseek",
        &["deepseek-ai", "deepseek coder", "deepseek-coder", "deepseek llm"],
    ),
    (
        "hunyuan",
        &["tencent hunyuan", "hunyuanvideo", "hunyuandit", "tencent-hunyuan"],
    ),
    (
        "claude",
        &["anthropic claude", "claude-3", "claude-instant", "anthropic-claude"],
    ),
    (
        "gemini",
        &["google gemini", "google-gemini", "gemini-pro", "gemini-ultra"],
    ),
    ("llama", &["meta-llama", "llama3", "llama-3", "llama-2", "meta llama"]),
    (
        "qwen",
        &["alibaba qwen", "qwenlm", "qwen-vl", "qwen-7b", "aliyun qwen"],
    ),
    ("gpt", &["chatgpt", "gpt-4", "gpt-3.5", "openai gpt", "gpt-turbo"]),
    ("文心一言", &["文心一言", "baidu ernie", "wenxin", "百度文心"]),
];

/// Search terms for a model name; unknown models search for the raw name.
pub fn model_search_terms(model: &str) -> Vec<String> {
    MODEL_SEARCH_TERMS
        .iter()
        .find(|(name, _)| *name == model)
        .map(|(_, terms)| terms.iter().map(|t| t.to_string()).collect())
        .unwrap_or_else(|| vec![model.to_string()])
}

/// AI relevance gate for repositories.
pub fn is_ai_repository(name: &str, description: &str) -> bool {
    let text = format!("{} {}", name, description).to_lowercase();
    CORE_AI_TERMS.iter().any(|t| text.contains(t)) || BROAD_AI_TERMS.iter().any(|t| text.contains(t))
}

/// AI relevance gate for article titles.
pub fn is_ai_article(title: &str) -> bool {
    let lowered = title.to_lowercase();
    ARTICLE_AI_TERMS.iter().any(|t| lowered.contains(t))
}

/// Count how many of `terms` occur in `text`, case-insensitively.
pub fn count_terms(text: &str, terms: &[&str]) -> usize {
    let lowered = text.to_lowercase();
    terms.iter().filter(|t| lowered.contains(&t.to_lowercase())).count()
}
