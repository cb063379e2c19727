//! # Serviço de Classificação
//!
//! O [`Disambiguator`](crate::pipeline::Disambiguator) não conhece o modelo:
//! ele conversa com um [`SenseClassifier`], injetado como
//! `Arc<dyn SenseClassifier>`. A implementação de produção é o
//! [`ClassifierService`], que junta três recursos:
//!
//! | Recurso           | Conteúdo                                       |
//! |-------------------|------------------------------------------------|
//! | header            | layout de atributos ([`AttributeSchema`])      |
//! | filtro            | pré-processamento ([`InputFilter`])            |
//! | classificador     | contagens Naive Bayes ([`NaiveBayesModel`])    |
//!
//! Os três precisam carregar e ser consistentes entre si; qualquer falha é
//! [`WsdError::Initialization`]. Depois de carregado o serviço é somente
//! leitura e pode ser compartilhado entre threads.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, WsdError};
use crate::features::FeatureVector;
use crate::filter::InputFilter;
use crate::naive_bayes::NaiveBayesModel;
use crate::schema::AttributeSchema;

const BUNDLED_CLASSIFIER: &str = include_str!("../resources/default.classifier.json");
const BUNDLED_FILTER: &str = include_str!("../resources/default.filter.json");
const BUNDLED_HEADER: &str = include_str!("../resources/default.instanceheader.json");

/// Um sentido com a probabilidade atribuída pelo classificador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: String,
    pub probability: f64,
}

/// Entrada de uma lista top-K.
pub type RankedSense = Classification;

/// Contrato do classificador de sentidos.
pub trait SenseClassifier: Send + Sync {
    /// Sentido mais provável para o vetor do alvo `lemma`.
    fn classify(&self, vector: &FeatureVector, lemma: &str) -> Result<Classification>;

    /// Até `k` sentidos em ordem de probabilidade não crescente.
    fn classify_top_k(&self, vector: &FeatureVector, lemma: &str, k: usize) -> Result<Vec<RankedSense>>;

    /// Layout de atributos que o classificador espera.
    fn schema(&self) -> &AttributeSchema;
}

/// Classificador Naive Bayes com filtro e header.
#[derive(Debug, Clone)]
pub struct ClassifierService {
    model: NaiveBayesModel,
    filter: InputFilter,
    header: AttributeSchema,
}

impl ClassifierService {
    /// Carrega os três recursos de streams JSON e valida a consistência.
    pub fn load(classifier: impl Read, filter: impl Read, header: impl Read) -> Result<Self> {
        let header = AttributeSchema::from_reader(header).map_err(|e| init_error("header", e))?;
        let filter = InputFilter::from_reader(filter).map_err(|e| init_error("filter", e))?;
        filter.validate(&header)?;
        let model = NaiveBayesModel::from_reader(classifier).map_err(|e| init_error("classifier", e))?;
        model.validate(&header)?;

        info!(
            senses = model.class_counts.len(),
            lemmas = model.lemma_senses.len(),
            attributes = header.len(),
            "classificador carregado"
        );
        Ok(Self { model, filter, header })
    }

    /// Modelo de cozinha embutido no binário.
    pub fn bundled() -> Result<Self> {
        Self::load(
            BUNDLED_CLASSIFIER.as_bytes(),
            BUNDLED_FILTER.as_bytes(),
            BUNDLED_HEADER.as_bytes(),
        )
    }

    /// Carrega de arquivos; `None` usa o recurso embutido correspondente.
    ///
    /// Um caminho que não existe é erro, nunca cai no recurso embutido.
    pub fn from_paths(
        classifier: Option<&Path>,
        filter: Option<&Path>,
        header: Option<&Path>,
    ) -> Result<Self> {
        let classifier = open_or_bundled(classifier, BUNDLED_CLASSIFIER)?;
        let filter = open_or_bundled(filter, BUNDLED_FILTER)?;
        let header = open_or_bundled(header, BUNDLED_HEADER)?;
        Self::load(classifier, filter, header)
    }

    #[cfg(test)]
    fn model(&self) -> &NaiveBayesModel {
        &self.model
    }

    fn ranked(&self, vector: &FeatureVector, lemma: &str) -> Result<Vec<RankedSense>> {
        if vector.len() != self.header.len() {
            return Err(WsdError::Classification {
                lemma: lemma.to_string(),
                reason: format!(
                    "vector has {} slots, header has {}",
                    vector.len(),
                    self.header.len()
                ),
            });
        }
        let filtered = self.filter.apply(vector);
        let posterior = self.model.posterior(&filtered, lemma)?;
        Ok(posterior
            .into_iter()
            .map(|(label, probability)| Classification { label, probability })
            .collect())
    }
}

impl SenseClassifier for ClassifierService {
    fn classify(&self, vector: &FeatureVector, lemma: &str) -> Result<Classification> {
        self.ranked(vector, lemma)?
            .into_iter()
            .next()
            .ok_or_else(|| WsdError::Classification {
                lemma: lemma.to_string(),
                reason: "no candidate sense".to_string(),
            })
    }

    fn classify_top_k(&self, vector: &FeatureVector, lemma: &str, k: usize) -> Result<Vec<RankedSense>> {
        let mut ranked = self.ranked(vector, lemma)?;
        ranked.truncate(k);
        Ok(ranked)
    }

    fn schema(&self) -> &AttributeSchema {
        &self.header
    }
}

fn init_error(resource: &str, err: WsdError) -> WsdError {
    match err {
        WsdError::Initialization(_) => err,
        other => WsdError::Initialization(format!("could not read {resource}: {other}")),
    }
}

fn open_or_bundled(path: Option<&Path>, bundled: &'static str) -> Result<Box<dyn Read>> {
    match path {
        None => Ok(Box::new(bundled.as_bytes())),
        Some(path) if !path.exists() => Err(WsdError::MissingResource(path.to_path_buf())),
        Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
    }
}
