//! # Avaliação de Acurácia
//!
//! Roda o estágio sobre um corpus anotado e compara o sentido atribuído a
//! cada posição anotada com o esperado. Uma classificação conta como certa
//! se for igual ao sentido ou ao seu sinônimo.
//!
//! $$ \text{Acurácia} = \frac{\text{certos}}{\text{anotações avaliadas}} $$
//!
//! Posições sem sentido atribuído entram no total e também são contadas à
//! parte (`null_values`). Uma sentença que falha (erro do classificador,
//! posição fora da sentença) é registrada e pulada inteira.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::corpus::TaggedSentence;
use crate::error::Result;
use crate::pipeline::Disambiguator;
use crate::token::{Token, TokenId};

/// Sentido esperado em uma posição da sentença.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedSense {
    pub position: usize,
    pub word: String,
    pub meaning: String,
    #[serde(default)]
    pub meaning_syn: String,
}

/// Sentença marcada com as anotações esperadas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationEntry {
    pub id: String,
    pub tokens: Vec<Token>,
    pub annotations: Vec<ExpectedSense>,
}

impl From<&TaggedSentence> for EvaluationEntry {
    fn from(sentence: &TaggedSentence) -> Self {
        Self {
            id: sentence.id.to_string(),
            tokens: sentence.to_tokens(),
            annotations: sentence
                .senses
                .iter()
                .map(|(position, word, meaning, syn)| ExpectedSense {
                    position: *position,
                    word: word.to_string(),
                    meaning: meaning.to_string(),
                    meaning_syn: syn.to_string(),
                })
                .collect(),
        }
    }
}

/// Lê um corpus de avaliação em JSON (lista de [`EvaluationEntry`]).
pub fn load_entries(reader: impl Read) -> Result<Vec<EvaluationEntry>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Uma classificação errada ou ausente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mistake {
    pub sentence: String,
    pub position: usize,
    pub expected: String,
    pub got: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub correct: usize,
    pub null_values: usize,
    pub total: usize,
    pub failed_sentences: Vec<String>,
    pub mistakes: Vec<Mistake>,
}

impl EvaluationReport {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64
    }
}

/// Avalia o estágio sobre as entradas; as sentenças rodam em paralelo.
pub fn evaluate(wsd: &Disambiguator, entries: &[EvaluationEntry]) -> EvaluationReport {
    let sentences: Vec<Vec<Token>> = entries.iter().map(|e| e.tokens.clone()).collect();
    let outcomes = wsd.disambiguate_document(&sentences);

    let mut report = EvaluationReport::default();
    for (entry, outcome) in entries.iter().zip(outcomes) {
        let results = match outcome {
            Ok(results) => results,
            Err(e) => {
                warn!(sentence = %entry.id, error = %e, "exception at sentence");
                report.failed_sentences.push(entry.id.clone());
                continue;
            }
        };

        if let Some(bad) = entry.annotations.iter().find(|a| a.position >= entry.tokens.len()) {
            warn!(sentence = %entry.id, position = bad.position, "annotation outside the sentence");
            report.failed_sentences.push(entry.id.clone());
            continue;
        }

        for annotation in &entry.annotations {
            let id: TokenId = entry.tokens[annotation.position].id;
            let got = results.sense(id);
            report.total += 1;
            if got == Some(annotation.meaning.as_str()) || got == Some(annotation.meaning_syn.as_str()) {
                report.correct += 1;
                continue;
            }
            if got.is_none() {
                report.null_values += 1;
            }
            info!(
                sentence = %entry.id,
                position = annotation.position,
                expected = %annotation.meaning,
                got = got.unwrap_or("null"),
                "wrong sense"
            );
            report.mistakes.push(Mistake {
                sentence: entry.id.clone(),
                position: annotation.position,
                expected: annotation.meaning.clone(),
                got: got.map(str::to_string),
            });
        }
    }

    info!(
        correct = report.correct,
        total = report.total,
        null_values = report.null_values,
        "evaluation result: {:.4}",
        report.accuracy()
    );
    report
}
