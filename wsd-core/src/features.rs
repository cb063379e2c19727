//! # Montagem do Vetor de Features
//!
//! Converte o [`ContextFeatures`] de um alvo em um vetor posicional no
//! layout do header ([`crate::schema`]). Cada slot é um valor nominal
//! (string) ou ausente; o sentinela NONE nunca é escrito, o slot apenas
//! continua ausente.
//!
//! ## Pesos
//!
//! O modelo espera que a instância tenha peso 2 e que o atributo do lema
//! alvo (slot 1) pese 10 vezes mais que os atributos de contexto.

use serde::{Deserialize, Serialize};

use crate::context::{ContextFeatures, ContextWord};
use crate::schema::{
    left_slot, right_slot, AttributeSchema, LEFT_NOUN_SLOT, LEFT_VERB_SLOT, RIGHT_NOUN_SLOT,
    RIGHT_VERB_SLOT, TARGET_LEMMA_SLOT, TARGET_POS_SLOT,
};

/// Peso da instância.
///
/// O Naive Bayes só usa o peso da instância no treino. Na classificação ele
/// apenas acompanha o vetor serializado, para que vetores exportados possam
/// voltar ao treino com o mesmo peso.
pub const INSTANCE_WEIGHT: f64 = 2.0;
/// Peso do atributo do lema alvo.
pub const TARGET_LEMMA_WEIGHT: f64 = 10.0;

/// Vetor posicional de valores nominais.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// `slots[i]` é o valor do atributo `i`; `None` = ausente.
    pub slots: Vec<Option<String>>,
    /// Peso da instância ([`INSTANCE_WEIGHT`]); não entra no cálculo da posterior.
    pub weight: f64,
    /// Peso de cada atributo, alinhado com `slots`.
    pub attribute_weights: Vec<f64>,
}

impl FeatureVector {
    /// Vetor vazio com o comprimento do header e os pesos padrão.
    pub fn empty(schema: &AttributeSchema) -> Self {
        let len = schema.len();
        let mut attribute_weights = vec![1.0; len];
        if TARGET_LEMMA_SLOT < len {
            attribute_weights[TARGET_LEMMA_SLOT] = TARGET_LEMMA_WEIGHT;
        }
        Self {
            slots: vec![None; len],
            weight: INSTANCE_WEIGHT,
            attribute_weights,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).and_then(|v| v.as_deref())
    }

    /// Escreve um valor; slots fora do header são ignorados.
    pub fn set(&mut self, slot: usize, value: impl Into<String>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            *entry = Some(value.into());
        }
    }

    fn set_optional(&mut self, slot: usize, value: &Option<String>) {
        if let Some(v) = value {
            self.set(slot, v.clone());
        }
    }

    fn set_word(&mut self, slot: usize, word: &Option<ContextWord>) {
        if let Some(w) = word {
            self.set(slot, w.lemma.clone());
            self.set(slot + 1, w.pos.clone());
        }
    }

    /// Pares (nome do atributo, valor) dos slots preenchidos, para exibição.
    pub fn named_values<'a>(&'a self, schema: &'a AttributeSchema) -> Vec<(&'a str, &'a str)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, v)| Some((schema.name(i)?, v.as_deref()?)))
            .collect()
    }
}

/// Monta o vetor de features de um contexto.
pub fn assemble(schema: &AttributeSchema, context: &ContextFeatures) -> FeatureVector {
    let mut fv = FeatureVector::empty(schema);

    fv.set(TARGET_LEMMA_SLOT, context.target_lemma.clone());
    fv.set(TARGET_POS_SLOT, context.target_pos.clone());

    for (i, word) in context.left.iter().enumerate() {
        fv.set_word(left_slot(i + 1), word);
    }
    for (i, word) in context.right.iter().enumerate() {
        fv.set_word(right_slot(i + 1), word);
    }

    fv.set_optional(LEFT_NOUN_SLOT, &context.left_noun);
    fv.set_optional(LEFT_VERB_SLOT, &context.left_verb);
    fv.set_optional(RIGHT_NOUN_SLOT, &context.right_noun);
    fv.set_optional(RIGHT_VERB_SLOT, &context.right_verb);

    fv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(lemma: &str, pos: &str) -> Option<ContextWord> {
        Some(ContextWord {
            lemma: lemma.into(),
            pos: pos.into(),
        })
    }

    fn context() -> ContextFeatures {
        ContextFeatures {
            target_lemma: "fridge".into(),
            target_pos: "NN".into(),
            left: [word("open", "VB"), None, word("go", "VB")],
            right: [word("take", "VB"), word("orange", "NN"), None],
            left_noun: None,
            left_verb: Some("open".into()),
            right_noun: Some("orange".into()),
            right_verb: None,
        }
    }

    #[test]
    fn test_slot_layout() {
        let schema = AttributeSchema::standard();
        let fv = assemble(&schema, &context());

        assert_eq!(fv.len(), 19);
        assert_eq!(fv.get(0), None);
        assert_eq!(fv.get(1), Some("fridge"));
        assert_eq!(fv.get(2), Some("NN"));
        // esquerda: distância 1 → 7/8, distância 3 → 3/4
        assert_eq!(fv.get(7), Some("open"));
        assert_eq!(fv.get(8), Some("VB"));
        assert_eq!(fv.get(5), None);
        assert_eq!(fv.get(6), None);
        assert_eq!(fv.get(3), Some("go"));
        // direita: distância 1 → 9/10, distância 2 → 11/12
        assert_eq!(fv.get(9), Some("take"));
        assert_eq!(fv.get(11), Some("orange"));
        assert_eq!(fv.get(13), None);
        assert_eq!(fv.get(15), None);
        assert_eq!(fv.get(16), Some("open"));
        assert_eq!(fv.get(17), Some("orange"));
        assert_eq!(fv.get(18), None);
    }

    #[test]
    fn test_none_is_never_written() {
        let schema = AttributeSchema::standard();
        let fv = assemble(&schema, &context());
        assert!(fv.slots.iter().flatten().all(|v| v != "NONE"));
    }

    #[test]
    fn test_weights() {
        let fv = FeatureVector::empty(&AttributeSchema::standard());
        assert_eq!(fv.weight, INSTANCE_WEIGHT);
        assert_eq!(fv.attribute_weights[1], TARGET_LEMMA_WEIGHT);
        assert_eq!(fv.attribute_weights[7], 1.0);
    }

    #[test]
    fn test_named_values() {
        let schema = AttributeSchema::standard();
        let fv = assemble(&schema, &context());
        let named = fv.named_values(&schema);
        assert_eq!(named[0], ("word", "fridge"));
        assert!(named.contains(&("right_noun", "orange")));
    }
}
