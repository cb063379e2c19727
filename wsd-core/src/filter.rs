//! # Filtro de Pré-processamento
//!
//! Aplicado a cada vetor antes da classificação, reproduzindo o
//! pré-processamento usado no treino: normalização de caixa dos valores e
//! remoção de atributos que o modelo não usa.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WsdError};
use crate::features::FeatureVector;
use crate::schema::{AttributeSchema, CLASS_SLOT};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFilter {
    /// Converte todos os valores para minúsculas (POS incluída).
    #[serde(default)]
    pub lowercase_values: bool,
    /// Atributos descartados antes da classificação.
    #[serde(default)]
    pub ignored_attributes: Vec<usize>,
}

impl InputFilter {
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Confere se o filtro é compatível com o header.
    pub fn validate(&self, schema: &AttributeSchema) -> Result<()> {
        for &index in &self.ignored_attributes {
            if index >= schema.len() {
                return Err(WsdError::Initialization(format!(
                    "filter ignores attribute {index}, header has {}",
                    schema.len()
                )));
            }
            if index == CLASS_SLOT {
                return Err(WsdError::Initialization(
                    "filter cannot remove the class attribute".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Devolve uma cópia filtrada do vetor.
    pub fn apply(&self, vector: &FeatureVector) -> FeatureVector {
        let mut out = vector.clone();
        for &index in &self.ignored_attributes {
            if let Some(slot) = out.slots.get_mut(index) {
                *slot = None;
            }
        }
        if self.lowercase_values {
            for value in out.slots.iter_mut().flatten() {
                *value = value.to_lowercase();
            }
        }
        out
    }
}
