//! # Resultados da Desambiguação
//!
//! Os tokens de entrada nunca são mutados. O sentido de cada alvo vai para
//! uma tabela lateral indexada por [`TokenId`], com os mesmos nomes de
//! atributo que o restante do pipeline usa:
//!
//! - `wsd`: rótulo do sentido escolhido
//! - `wsd-top-x`: lista ranqueada (só quando top-X está ligado)
//!
//! Alvos compostos ficam numa lista separada, indexada pelo par de tokens.
//! Escrever de novo no mesmo token sobrescreve o valor anterior.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::classifier::{Classification, RankedSense};
use crate::token::{Token, TokenId};

/// Nome do atributo com o sentido escolhido.
pub const WSD_ATTRIBUTE: &str = "wsd";
/// Nome do atributo com a lista top-X.
pub const WSD_TOP_X_ATTRIBUTE: &str = "wsd-top-x";

/// Anotação de um alvo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenseAnnotation {
    pub wsd: String,
    #[serde(rename = "wsd-top-x", default, skip_serializing_if = "Option::is_none")]
    pub wsd_top_x: Option<Vec<RankedSense>>,
}

/// Anotação de um par de substantivos adjacentes tratado como um alvo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundAnnotation {
    pub first: TokenId,
    pub second: TokenId,
    pub lemma: String,
    #[serde(flatten)]
    pub annotation: SenseAnnotation,
}

/// Destino das anotações produzidas pelo pipeline.
pub trait ResultWriter {
    fn write_sense(&mut self, token: TokenId, sense: &Classification);
    fn write_top_x(&mut self, token: TokenId, ranked: Vec<RankedSense>);
    fn write_compound(&mut self, first: TokenId, second: TokenId, lemma: &str, sense: &Classification);
}

/// Tabela lateral com as anotações de uma sentença.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisambiguationResults {
    pub senses: BTreeMap<TokenId, SenseAnnotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compounds: Vec<CompoundAnnotation>,
}

impl DisambiguationResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.senses.is_empty() && self.compounds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.senses.len()
    }

    /// Sentido atribuído ao token, se houver.
    pub fn sense(&self, token: TokenId) -> Option<&str> {
        self.senses.get(&token).map(|a| a.wsd.as_str())
    }

    pub fn top_x(&self, token: TokenId) -> Option<&[RankedSense]> {
        self.senses.get(&token)?.wsd_top_x.as_deref()
    }

    pub fn compound(&self, first: TokenId, second: TokenId) -> Option<&CompoundAnnotation> {
        self.compounds
            .iter()
            .find(|c| c.first == first && c.second == second)
    }

    /// Junta tokens e anotações numa visão serializável.
    pub fn annotate(&self, tokens: &[Token]) -> Vec<AnnotatedToken> {
        tokens
            .iter()
            .map(|token| {
                let annotation = self.senses.get(&token.id);
                AnnotatedToken {
                    token: token.clone(),
                    wsd: annotation.map(|a| a.wsd.clone()),
                    wsd_top_x: annotation.and_then(|a| a.wsd_top_x.clone()),
                }
            })
            .collect()
    }
}

impl ResultWriter for DisambiguationResults {
    fn write_sense(&mut self, token: TokenId, sense: &Classification) {
        self.senses
            .entry(token)
            .and_modify(|a| a.wsd = sense.label.clone())
            .or_insert_with(|| SenseAnnotation {
                wsd: sense.label.clone(),
                wsd_top_x: None,
            });
    }

    /// Só tem efeito se o token já recebeu um sentido.
    fn write_top_x(&mut self, token: TokenId, ranked: Vec<RankedSense>) {
        if let Some(annotation) = self.senses.get_mut(&token) {
            annotation.wsd_top_x = Some(ranked);
        }
    }

    fn write_compound(&mut self, first: TokenId, second: TokenId, lemma: &str, sense: &Classification) {
        let annotation = SenseAnnotation {
            wsd: sense.label.clone(),
            wsd_top_x: None,
        };
        match self
            .compounds
            .iter_mut()
            .find(|c| c.first == first && c.second == second)
        {
            Some(existing) => {
                existing.lemma = lemma.to_string();
                existing.annotation = annotation;
            }
            None => self.compounds.push(CompoundAnnotation {
                first,
                second,
                lemma: lemma.to_string(),
                annotation,
            }),
        }
    }
}

/// Token com os atributos de sentido, no formato de saída.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedToken {
    #[serde(flatten)]
    pub token: Token,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wsd: Option<String>,
    #[serde(rename = "wsd-top-x", default, skip_serializing_if = "Option::is_none")]
    pub wsd_top_x: Option<Vec<RankedSense>>,
}
