//! # Filtro de Entidades Nomeadas
//!
//! Substantivos que são entidades nomeadas não têm sentido a desambiguar.
//! Além da tag NER, dois nomes próprios são tratados como entidade de forma
//! fixa: os nomes pelos quais o usuário chama o robô/assistente ("armar",
//! "alexa"), que o NER costuma marcar como `O`.

use std::collections::HashSet;

use crate::error::Result;
use crate::token::{Token, NO_ENTITY};

/// Nomes de ativação tratados sempre como entidade nomeada.
pub const DEFAULT_WAKE_WORDS: &[&str] = &["armar", "alexa"];

/// Decide se um token substantivo deve ser pulado por ser entidade nomeada.
#[derive(Debug, Clone)]
pub struct NamedEntityGate {
    wake_words: HashSet<String>,
}

impl NamedEntityGate {
    pub fn new() -> Self {
        Self::with_wake_words(DEFAULT_WAKE_WORDS.iter().copied())
    }

    pub fn with_wake_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            wake_words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    /// `true` se a tag NER não é `"O"` ou se a forma de superfície é um
    /// nome de ativação (sem diferenciar maiúsculas).
    pub fn is_named_entity(&self, token: &Token) -> Result<bool> {
        let ner = token.ner()?;
        Ok(ner != NO_ENTITY || self.wake_words.contains(&token.surface.to_lowercase()))
    }
}

impl Default for NamedEntityGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ner_tag_marks_entity() {
        let gate = NamedEntityGate::new();
        let paris = Token::new(0, "Paris", "paris", "NNP", "LOCATION");
        let cup = Token::new(1, "cup", "cup", "NN", "O");
        assert!(gate.is_named_entity(&paris).unwrap());
        assert!(!gate.is_named_entity(&cup).unwrap());
    }

    #[test]
    fn test_wake_words_case_insensitive() {
        let gate = NamedEntityGate::new();
        assert!(gate.is_named_entity(&Token::new(0, "Armar", "armar", "NNP", "O")).unwrap());
        assert!(gate.is_named_entity(&Token::new(1, "ALEXA", "alexa", "NN", "O")).unwrap());
    }

    #[test]
    fn test_missing_ner_is_error() {
        let gate = NamedEntityGate::new();
        let mut token = Token::new(0, "cup", "cup", "NN", "O");
        token.ner = None;
        assert!(gate.is_named_entity(&token).is_err());
    }
}
