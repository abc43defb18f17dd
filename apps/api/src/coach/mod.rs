// LLM-backed coaching features: resume analysis, interview evaluation,
// roadmap generation. All LLM calls go through llm_client — no direct
// Gemini calls here.

pub mod handlers;
pub mod interview;
pub mod prompts;
pub mod resume;
pub mod roadmap;
