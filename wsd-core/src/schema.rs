//! # Header de Atributos
//!
//! O classificador foi treinado sobre um layout fixo de atributos. O header
//! descreve esse layout e é carregado junto com o modelo; qualquer
//! divergência entre o header, o modelo e o layout que o montador de vetores
//! produz é erro fatal de inicialização.
//!
//! | Slot  | Atributo        | Slot  | Atributo        |
//! |-------|-----------------|-------|-----------------|
//! | 0     | sense (classe)  | 9/10  | right1 / pos    |
//! | 1     | word            | 11/12 | right2 / pos    |
//! | 2     | word_pos        | 13/14 | right3 / pos    |
//! | 3/4   | left3 / pos     | 15    | left_noun       |
//! | 5/6   | left2 / pos     | 16    | left_verb       |
//! | 7/8   | left1 / pos     | 17    | right_noun      |
//! |       |                 | 18    | right_verb      |

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WsdError};

/// Nomes dos atributos na ordem em que o modelo foi treinado.
pub const ATTRIBUTE_LAYOUT: [&str; 19] = [
    "sense",
    "word",
    "word_pos",
    "left3",
    "left3_pos",
    "left2",
    "left2_pos",
    "left1",
    "left1_pos",
    "right1",
    "right1_pos",
    "right2",
    "right2_pos",
    "right3",
    "right3_pos",
    "left_noun",
    "left_verb",
    "right_noun",
    "right_verb",
];

pub const CLASS_SLOT: usize = 0;
pub const TARGET_LEMMA_SLOT: usize = 1;
pub const TARGET_POS_SLOT: usize = 2;
pub const LEFT_NOUN_SLOT: usize = 15;
pub const LEFT_VERB_SLOT: usize = 16;
pub const RIGHT_NOUN_SLOT: usize = 17;
pub const RIGHT_VERB_SLOT: usize = 18;

/// Slot do lema à esquerda na distância `d` (o POS fica no slot seguinte).
pub const fn left_slot(distance: usize) -> usize {
    9 - 2 * distance
}

/// Slot do lema à direita na distância `d` (o POS fica no slot seguinte).
pub const fn right_slot(distance: usize) -> usize {
    7 + 2 * distance
}

/// Header de atributos (esquema das instâncias).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSchema {
    /// Nome da relação de treino (informativo).
    #[serde(default)]
    pub relation: String,
    pub attributes: Vec<String>,
    #[serde(default)]
    pub class_index: usize,
}

impl AttributeSchema {
    /// O layout padrão produzido pelo montador de vetores.
    pub fn standard() -> Self {
        Self {
            relation: "wsd".to_string(),
            attributes: ATTRIBUTE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            class_index: CLASS_SLOT,
        }
    }

    /// Lê o header de um stream JSON e valida o layout.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let schema: Self = serde_json::from_reader(reader)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.attributes.get(index).map(String::as_str)
    }

    /// Confere se o header corresponde exatamente ao layout esperado.
    pub fn validate(&self) -> Result<()> {
        if self.class_index != CLASS_SLOT {
            return Err(WsdError::Initialization(format!(
                "class attribute must be slot {CLASS_SLOT}, header says {}",
                self.class_index
            )));
        }
        if self.attributes.len() != ATTRIBUTE_LAYOUT.len() {
            return Err(WsdError::Initialization(format!(
                "header has {} attributes, expected {}",
                self.attributes.len(),
                ATTRIBUTE_LAYOUT.len()
            )));
        }
        for (i, (found, expected)) in self.attributes.iter().zip(ATTRIBUTE_LAYOUT).enumerate() {
            if found != expected {
                return Err(WsdError::Initialization(format!(
                    "header attribute {i} is '{found}', expected '{expected}'"
                )));
            }
        }
        Ok(())
    }
}

impl Default for AttributeSchema {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_mapping() {
        assert_eq!(left_slot(1), 7);
        assert_eq!(left_slot(2), 5);
        assert_eq!(left_slot(3), 3);
        assert_eq!(right_slot(1), 9);
        assert_eq!(right_slot(2), 11);
        assert_eq!(right_slot(3), 13);
        assert_eq!(ATTRIBUTE_LAYOUT[left_slot(1)], "left1");
        assert_eq!(ATTRIBUTE_LAYOUT[right_slot(3) + 1], "right3_pos");
    }

    #[test]
    fn test_standard_schema_validates() {
        assert!(AttributeSchema::standard().validate().is_ok());
    }

    #[test]
    fn test_mismatched_header_is_fatal() {
        let mut schema = AttributeSchema::standard();
        schema.attributes.swap(7, 9);
        let err = schema.validate().unwrap_err();
        assert!(err.is_fatal());

        let mut short = AttributeSchema::standard();
        short.attributes.pop();
        assert!(short.validate().is_err());
    }

    #[test]
    fn test_from_reader() {
        let json = serde_json::to_string(&AttributeSchema::standard()).unwrap();
        let schema = AttributeSchema::from_reader(json.as_bytes()).unwrap();
        assert_eq!(schema.len(), 19);
        assert_eq!(schema.name(1), Some("word"));
    }
}
