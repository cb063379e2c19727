//! # Tokens Anotados
//!
//! O estágio de WSD não tokeniza nada: ele recebe tokens já marcados pelos
//! estágios anteriores (lematizador, POS tagger, NER). Cada token carrega:
//!
//! - `value`: a forma de superfície ("Fridge", "took")
//! - `lemma`: forma canônica ("fridge", "take")
//! - `pos`: tag Penn Treebank (`NN*` = substantivo, `VB*` = verbo)
//! - `ner`: tag de entidade nomeada (`"O"` = não é entidade)
//!
//! Os campos `lemma`, `pos` e `ner` são opcionais no tipo porque o tagger
//! upstream pode deixar de preenchê-los. Ler um campo ausente onde ele é
//! necessário gera [`WsdError::MissingFeature`]: os slots do vetor de
//! features são posicionais, então um valor "inventado" deslocaria o sentido.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WsdError};

/// Prefixo de POS para substantivos comuns e próprios.
pub const NOUN_PREFIX: &str = "NN";
/// Prefixo de POS para verbos.
pub const VERB_PREFIX: &str = "VB";
/// Tag NER que indica "não é entidade".
pub const NO_ENTITY: &str = "O";

/// Identidade de um token dentro de um grafo ou sequência.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenId(pub usize);

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Um token marcado pelos estágios anteriores do pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Identidade do token (chave da tabela de resultados).
    pub id: TokenId,
    /// Forma de superfície, como apareceu na entrada.
    #[serde(rename = "value", alias = "surface")]
    pub surface: String,
    #[serde(default)]
    pub lemma: Option<String>,
    #[serde(default)]
    pub pos: Option<String>,
    #[serde(default)]
    pub ner: Option<String>,
}

impl Token {
    /// Cria um token completamente anotado.
    pub fn new(
        id: usize,
        surface: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<String>,
        ner: impl Into<String>,
    ) -> Self {
        Self {
            id: TokenId(id),
            surface: surface.into(),
            lemma: Some(lemma.into()),
            pos: Some(pos.into()),
            ner: Some(ner.into()),
        }
    }

    /// Lemma do token, exigido.
    pub fn lemma(&self) -> Result<&str> {
        self.require(self.lemma.as_deref(), "lemma")
    }

    /// Lemma em minúsculas, forma usada em todas as features.
    pub fn lower_lemma(&self) -> Result<String> {
        self.lemma().map(str::to_lowercase)
    }

    /// Tag de POS do token, exigida.
    pub fn pos(&self) -> Result<&str> {
        self.require(self.pos.as_deref(), "pos")
    }

    /// Tag NER do token, exigida.
    pub fn ner(&self) -> Result<&str> {
        self.require(self.ner.as_deref(), "ner")
    }

    pub fn is_noun(&self) -> Result<bool> {
        Ok(self.pos()?.starts_with(NOUN_PREFIX))
    }

    pub fn is_verb(&self) -> Result<bool> {
        Ok(self.pos()?.starts_with(VERB_PREFIX))
    }

    fn require<'a>(&self, value: Option<&'a str>, attribute: &'static str) -> Result<&'a str> {
        value.ok_or_else(|| WsdError::MissingFeature {
            token: self.id.0,
            surface: self.surface.clone(),
            attribute,
        })
    }
}

/// Reatribui ids sequenciais (0, 1, 2...) a uma lista de tokens.
///
/// Útil quando o host entrega a sentença já ordenada, sem grafo.
pub fn reindex(tokens: &mut [Token]) {
    for (i, token) in tokens.iter_mut().enumerate() {
        token.id = TokenId(i);
    }
}
