use crate::context::ContextPayload;
use crate::prompts;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five LLM-backed operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Bulleted TL;DR of a document
    Summarize,
    /// Starter or improved README
    GenerateDocs,
    /// Documentation drift report
    DetectDrift,
    /// Translation preserving code blocks
    Translate,
    /// Question answering over the context
    Answer,
}

impl CapabilityKind {
    /// Stable name used in logs and responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::GenerateDocs => "generate_docs",
            Self::DetectDrift => "detect_drift",
            Self::Translate => "translate",
            Self::Answer => "answer",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A capability together with the material its prompt needs
#[derive(Debug, Clone)]
pub enum CapabilityRequest {
    /// Summarise free text
    Summarize {
        /// Document to summarise
        text: String,
    },
    /// Write a starter README, or improve the existing one
    GenerateDocs {
        /// Repository context
        context: ContextPayload,
        /// Whether the context already has a README to improve
        has_readme: bool,
        /// Emoji tone switch
        emoji: bool,
    },
    /// Compare docs against code and commits
    DetectDrift {
        /// Repository context
        context: ContextPayload,
    },
    /// Translate free text
    Translate {
        /// Document to translate
        text: String,
        /// Target language, e.g. "French"
        language: String,
    },
    /// Answer a question about the repository
    Answer {
        /// The user's question
        question: String,
        /// Repository context
        context: ContextPayload,
    },
}

impl CapabilityRequest {
    /// Which capability this is
    pub fn kind(&self) -> CapabilityKind {
        match self {
            Self::Summarize { .. } => CapabilityKind::Summarize,
            Self::GenerateDocs { .. } => CapabilityKind::GenerateDocs,
            Self::DetectDrift { .. } => CapabilityKind::DetectDrift,
            Self::Translate { .. } => CapabilityKind::Translate,
            Self::Answer { .. } => CapabilityKind::Answer,
        }
    }

    /// Renders the prompt sent to the model
    pub fn prompt(&self) -> String {
        match self {
            Self::Summarize { text } => prompts::render(prompts::SUMMARISE, &[("text", text.as_str())]),
            Self::GenerateDocs {
                context,
                has_readme,
                emoji,
            } => {
                let template = if *has_readme {
                    prompts::GENERATE_UPDATE
                } else {
                    prompts::GENERATE_STARTER
                };
                let tone = if *emoji {
                    prompts::TONE_EMOJI
                } else {
                    prompts::TONE_PLAIN
                };
                prompts::render(template, &[("tone", tone), ("context", context.as_str())])
            }
            Self::DetectDrift { context } => {
                prompts::render(prompts::DRIFT, &[("context", context.as_str())])
            }
            Self::Translate { text, language } => {
                prompts::render(prompts::TRANSLATE, &[("language", language.as_str()), ("text", text.as_str())])
            }
            Self::Answer { question, context } => prompts::render(
                prompts::ANSWER,
                &[("question", question.as_str()), ("context", context.as_str())],
            ),
        }
    }
}
