//! # Naive Bayes para Sentidos
//!
//! Modelo generativo sobre atributos nominais. Para um vetor `x` e um
//! sentido `c`:
//!
//! $$ \log P(c|x) \propto \log P(c) + \sum_a w_a \cdot \log P(x_a | c) $$
//!
//! - `w_a` é o peso do atributo (o lema alvo pesa 10).
//! - Slots ausentes e o atributo de classe não contribuem.
//! - Atributos que o modelo nunca viu são ignorados.
//! - Todas as probabilidades usam *Add-1 Smoothing* (Laplace).
//!
//! ## Restrição por lema
//!
//! `lemma_senses` liga cada lema aos sentidos observados no treino. Ao
//! classificar, só os sentidos do lema alvo competem; um lema desconhecido
//! libera todos os sentidos.
//!
//! As contagens vivem em `BTreeMap`, então a iteração (e o desempate entre
//! sentidos de mesma probabilidade) é determinística.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WsdError};
use crate::features::FeatureVector;
use crate::schema::{AttributeSchema, CLASS_SLOT};

/// Contagens de um atributo: `sentido -> valor -> contagem`.
pub type AttributeCounts = BTreeMap<String, BTreeMap<String, f64>>;

/// Modelo Naive Bayes serializável.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesModel {
    /// Layout de atributos sobre o qual as contagens foram feitas.
    pub attributes: Vec<String>,
    /// Contagem de instâncias por sentido.
    pub class_counts: BTreeMap<String, f64>,
    /// Sentidos possíveis de cada lema.
    #[serde(default)]
    pub lemma_senses: BTreeMap<String, Vec<String>>,
    /// `likelihoods[slot]` são as contagens do atributo naquele slot.
    #[serde(default)]
    pub likelihoods: BTreeMap<usize, AttributeCounts>,
    /// Número de valores distintos vistos em cada slot, calculado na carga.
    #[serde(skip)]
    vocabulary_sizes: BTreeMap<usize, usize>,
}

impl NaiveBayesModel {
    /// Modelo vazio sobre o layout do header.
    pub fn new(schema: &AttributeSchema) -> Self {
        Self {
            attributes: schema.attributes.clone(),
            ..Self::default()
        }
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let mut model: Self = serde_json::from_reader(reader)?;
        model.index_vocabulary();
        Ok(model)
    }

    fn index_vocabulary(&mut self) {
        self.vocabulary_sizes = self
            .likelihoods
            .iter()
            .map(|(&slot, counts)| {
                let values: BTreeSet<&str> = counts
                    .values()
                    .flat_map(|values| values.keys().map(String::as_str))
                    .collect();
                (slot, values.len())
            })
            .collect();
    }

    /// Define a contagem de instâncias de um sentido.
    #[cfg(test)]
    fn set_prior(&mut self, sense: &str, count: f64) {
        self.class_counts.insert(sense.to_string(), count);
    }

    /// Associa um sentido a um lema.
    #[cfg(test)]
    fn add_sense(&mut self, lemma: &str, sense: &str) {
        let senses = self.lemma_senses.entry(lemma.to_string()).or_default();
        if !senses.iter().any(|s| s == sense) {
            senses.push(sense.to_string());
        }
    }

    /// Define quantas vezes o valor apareceu no slot para o sentido.
    #[cfg(test)]
    fn set_likelihood(&mut self, slot: usize, sense: &str, value: &str, count: f64) {
        self.likelihoods
            .entry(slot)
            .or_default()
            .entry(sense.to_string())
            .or_default()
            .insert(value.to_string(), count);
        self.index_vocabulary();
    }

    /// Confere se o modelo foi treinado sobre o mesmo layout do header.
    pub fn validate(&self, schema: &AttributeSchema) -> Result<()> {
        if self.attributes != schema.attributes {
            return Err(WsdError::Initialization(
                "classifier was trained on a different attribute layout than the header".to_string(),
            ));
        }
        if let Some(slot) = self.likelihoods.keys().find(|&&s| s >= schema.len() || s == CLASS_SLOT) {
            return Err(WsdError::Initialization(format!(
                "classifier has counts for invalid attribute slot {slot}"
            )));
        }
        if self.class_counts.is_empty() {
            return Err(WsdError::Initialization("classifier has no senses".to_string()));
        }
        // Contagens precisam ser finitas e não negativas para o log e o softmax.
        let invalid = |count: &f64| !count.is_finite() || *count < 0.0;
        if let Some((sense, _)) = self.class_counts.iter().find(|(_, c)| invalid(c)) {
            return Err(WsdError::Initialization(format!(
                "classifier has an invalid instance count for sense '{sense}'"
            )));
        }
        for (slot, counts) in &self.likelihoods {
            for (sense, values) in counts {
                if let Some((value, _)) = values.iter().find(|(_, c)| invalid(c)) {
                    return Err(WsdError::Initialization(format!(
                        "classifier has an invalid count for '{value}' in slot {slot}, sense '{sense}'"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Sentidos que competem para o lema.
    pub fn candidates(&self, lemma: &str) -> Vec<&str> {
        let restricted: Vec<&str> = self
            .lemma_senses
            .get(lemma)
            .map(|senses| {
                senses
                    .iter()
                    .filter(|s| self.class_counts.contains_key(s.as_str()))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default();
        if restricted.is_empty() {
            self.class_counts.keys().map(String::as_str).collect()
        } else {
            restricted
        }
    }

    /// Distribuição posterior sobre os candidatos do lema, ordenada por
    /// probabilidade decrescente (empate: ordem do rótulo).
    pub fn posterior(&self, vector: &FeatureVector, lemma: &str) -> Result<Vec<(String, f64)>> {
        let candidates = self.candidates(lemma);
        if candidates.is_empty() {
            return Err(WsdError::Classification {
                lemma: lemma.to_string(),
                reason: "model has no senses".to_string(),
            });
        }

        let total: f64 = self.class_counts.values().sum();
        let n_classes = self.class_counts.len() as f64;

        let log_scores: Vec<(String, f64)> = candidates
            .iter()
            .map(|&sense| {
                let prior = self.class_counts.get(sense).copied().unwrap_or(0.0);
                let mut score = ((prior + 1.0) / (total + n_classes)).ln();
                for (slot, value) in vector.slots.iter().enumerate() {
                    if slot == CLASS_SLOT {
                        continue;
                    }
                    let Some(value) = value else { continue };
                    let Some(counts) = self.likelihoods.get(&slot) else { continue };
                    let weight = vector.attribute_weights.get(slot).copied().unwrap_or(1.0);
                    let vocabulary = self.vocabulary_sizes.get(&slot).copied().unwrap_or(0);
                    score += weight * Self::log_likelihood(counts, vocabulary, sense, value);
                }
                (sense.to_string(), score)
            })
            .collect();

        let mut probs = softmax(log_scores);
        probs.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        Ok(probs)
    }

    fn log_likelihood(counts: &AttributeCounts, vocabulary: usize, sense: &str, value: &str) -> f64 {
        // +1 reserva massa para valores nunca vistos
        let v = vocabulary as f64 + 1.0;
        let (seen, total) = match counts.get(sense) {
            Some(values) => (
                values.get(value).copied().unwrap_or(0.0),
                values.values().sum::<f64>(),
            ),
            None => (0.0, 0.0),
        };
        ((seen + 1.0) / (total + v)).ln()
    }
}

fn softmax(scores: Vec<(String, f64)>) -> Vec<(String, f64)> {
    let max = scores.iter().map(|(_, s)| *s).fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<(String, f64)> = scores.into_iter().map(|(l, s)| (l, (s - max).exp())).collect();
    let sum: f64 = exps.iter().map(|(_, e)| e).sum();
    exps.into_iter().map(|(l, e)| (l, e / sum)).collect()
}
