//! The instruction sent alongside every sample image.

/// Prompt asking the model for a three-section contaminant report.
pub const ANALYSIS_PROMPT: &str = "
You are a laboratory assistant. Analyze this microscopic image of a water sample and provide a concise conclusion.

Your response must only include these three sections:
- Identification: State the most likely contaminant.
- Risk Assessment: Briefly describe the potential risk associated with this contaminant.
- Reasoning: Summarize the key visual evidence that led to your identification.

This is a visual assessment, not a definitive lab test.
";
