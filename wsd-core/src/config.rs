//! # Configuração
//!
//! Arquivo JSON com as mesmas chaves do arquivo de propriedades do estágio:
//!
//! ```json
//! {
//!   "CLASSIFIER": "models/kitchen.classifier.json",
//!   "FILTER": "",
//!   "INSTANCESHEADER": "",
//!   "STORE_TOP_X": 3
//! }
//! ```
//!
//! Caminho vazio (ou ausente) usa o recurso embutido. Caminho que não
//! existe é erro de inicialização. As variáveis `WSD_CLASSIFIER`,
//! `WSD_FILTER`, `WSD_INSTANCESHEADER` e `WSD_STORE_TOP_X` sobrescrevem o
//! arquivo.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::ClassifierService;
use crate::context::NeighborFilterPolicy;
use crate::error::{Result, WsdError};
use crate::gate::{NamedEntityGate, DEFAULT_WAKE_WORDS};
use crate::lexicon::{Lexicon, DEFAULT_FILTER_WORDS};
use crate::pipeline::Disambiguator;

/// Configuração do estágio de desambiguação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WsdConfig {
    #[serde(default)]
    pub classifier: String,
    #[serde(default)]
    pub filter: String,
    #[serde(rename = "INSTANCESHEADER", default)]
    pub instances_header: String,
    /// Tamanho da lista `wsd-top-x`; `<= 0` desliga.
    #[serde(default = "default_store_top_x")]
    pub store_top_x: i32,
    #[serde(default)]
    pub compound_nouns: bool,
    #[serde(default)]
    pub neighbor_policy: NeighborFilterPolicy,
    #[serde(default = "default_filter_words")]
    pub filter_words: Vec<String>,
    #[serde(default = "default_wake_words")]
    pub wake_words: Vec<String>,
}

fn default_store_top_x() -> i32 {
    -1
}

fn default_filter_words() -> Vec<String> {
    DEFAULT_FILTER_WORDS.iter().map(|w| w.to_string()).collect()
}

fn default_wake_words() -> Vec<String> {
    DEFAULT_WAKE_WORDS.iter().map(|w| w.to_string()).collect()
}

impl Default for WsdConfig {
    fn default() -> Self {
        Self {
            classifier: String::new(),
            filter: String::new(),
            instances_header: String::new(),
            store_top_x: default_store_top_x(),
            compound_nouns: false,
            neighbor_policy: NeighborFilterPolicy::default(),
            filter_words: default_filter_words(),
            wake_words: default_wake_words(),
        }
    }
}

impl WsdConfig {
    /// Lê o arquivo e aplica as variáveis de ambiente.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(WsdError::MissingResource(path.to_path_buf()));
        }
        let mut config: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Padrões mais variáveis de ambiente, sem arquivo.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Sobrescreve campos com os valores de `lookup("WSD_<CHAVE>")`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("WSD_CLASSIFIER") {
            self.classifier = v;
        }
        if let Some(v) = lookup("WSD_FILTER") {
            self.filter = v;
        }
        if let Some(v) = lookup("WSD_INSTANCESHEADER") {
            self.instances_header = v;
        }
        if let Some(v) = lookup("WSD_STORE_TOP_X") {
            self.store_top_x = v.trim().parse().map_err(|_| {
                WsdError::Initialization(format!("WSD_STORE_TOP_X is not an integer: '{v}'"))
            })?;
        }
        Ok(())
    }

    pub fn classifier_path(&self) -> Option<PathBuf> {
        resource_path(&self.classifier)
    }

    pub fn filter_path(&self) -> Option<PathBuf> {
        resource_path(&self.filter)
    }

    pub fn header_path(&self) -> Option<PathBuf> {
        resource_path(&self.instances_header)
    }

    /// Carrega os recursos e monta o estágio.
    pub fn build(&self) -> Result<Disambiguator> {
        let classifier = ClassifierService::from_paths(
            self.classifier_path().as_deref(),
            self.filter_path().as_deref(),
            self.header_path().as_deref(),
        )?;
        info!(
            store_top_x = self.store_top_x,
            compound_nouns = self.compound_nouns,
            policy = ?self.neighbor_policy,
            "estágio WSD configurado"
        );
        Ok(Disambiguator::new(Arc::new(classifier))
            .with_lexicon(Lexicon::with_filter_words(&self.filter_words))
            .with_gate(NamedEntityGate::with_wake_words(&self.wake_words))
            .with_store_top_x(self.store_top_x)
            .with_policy(self.neighbor_policy)
            .with_compound_nouns(self.compound_nouns))
    }
}

fn resource_path(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    (!value.is_empty()).then(|| PathBuf::from(value))
}
