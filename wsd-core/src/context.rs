//! # Janela de Contexto
//!
//! Para cada substantivo alvo, coleta o contexto léxico que alimenta o
//! classificador:
//!
//! 1. **Janela fixa (distância 1..3)** à esquerda e à direita, pulando
//!    stopwords e palavras filtradas.
//! 2. **Substantivo e verbo mais próximos** em cada direção, sem limite de
//!    distância.
//! 3. **Alvo composto**: dois substantivos adjacentes viram um único lema
//!    ("orange juice").
//!
//! ## Cursor de salto
//!
//! A janela fixa usa um contador de salto que só cresce dentro de uma mesma
//! direção. Para a distância `i`, o token lido primeiro é `alvo - i`; se ele
//! é filtrado, o contador avança e o token lido passa a ser
//! `alvo - i - salto`. Como o contador nunca volta a zero, as posições
//! seguintes já começam a procurar a partir do salto acumulado.
//!
//! ```text
//! tokens:  [A] [the] [quick] [fox]      alvo = 3 (fox)
//! dist 1:  quick                         (índice 2, sem salto)
//! dist 2:  the → salto=1 → A → salto=2 → fora → NONE
//! dist 3:  A   → salto=3 → fora → NONE
//! ```
//!
//! O cursor é estado local de uma chamada de [`ContextWindowBuilder::build`];
//! nada é guardado entre chamadas.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WsdError};
use crate::lexicon::Lexicon;
use crate::token::Token;

/// Tamanho da janela fixa em cada direção.
pub const WINDOW: usize = 3;

/// O que fazer quando o vizinho mais próximo encontrado é palavra filtrada.
///
/// Classificadores treinados com o extrator legado de vetores esperam o
/// comportamento de [`KeepSearching`](Self::KeepSearching): lá um vizinho
/// filtrado não encerra a busca. Use `"NEIGHBOR_POLICY": "keep_searching"`
/// para gerar os mesmos vetores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborFilterPolicy {
    /// O slot é encerrado como NONE; nenhum substituto é procurado.
    #[default]
    DiscardFiltered,
    /// O slot continua aberto e o próximo candidato do mesmo tipo pode ocupá-lo.
    KeepSearching,
}

/// Uma palavra de contexto: lema em minúsculas e a POS do token de origem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextWord {
    pub lemma: String,
    pub pos: String,
}

/// Contexto completo de um alvo, pronto para a montagem do vetor.
///
/// `None` representa o sentinela NONE: o slot correspondente fica sem valor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFeatures {
    pub target_lemma: String,
    pub target_pos: String,
    /// `left[d - 1]` é a palavra na distância `d` à esquerda.
    pub left: [Option<ContextWord>; WINDOW],
    /// `right[d - 1]` é a palavra na distância `d` à direita.
    pub right: [Option<ContextWord>; WINDOW],
    pub left_noun: Option<String>,
    pub left_verb: Option<String>,
    pub right_noun: Option<String>,
    pub right_verb: Option<String>,
}

/// Estado de um slot de vizinho durante a varredura.
enum NeighborSlot {
    Open,
    Found(String),
    Discarded,
}

impl NeighborSlot {
    fn is_open(&self) -> bool {
        matches!(self, NeighborSlot::Open)
    }

    fn into_value(self) -> Option<String> {
        match self {
            NeighborSlot::Found(lemma) => Some(lemma),
            _ => None,
        }
    }
}

/// Constrói o contexto de alvos simples ou compostos.
#[derive(Debug, Clone, Copy)]
pub struct ContextWindowBuilder<'a> {
    lexicon: &'a Lexicon,
    policy: NeighborFilterPolicy,
}

impl<'a> ContextWindowBuilder<'a> {
    pub fn new(lexicon: &'a Lexicon, policy: NeighborFilterPolicy) -> Self {
        Self { lexicon, policy }
    }

    /// Constrói o contexto do alvo `first..=second`.
    ///
    /// `first == second` para um alvo simples; `first < second` para um
    /// composto. A janela esquerda parte de `first` e a direita de `second`.
    pub fn build(&self, tokens: &[Token], first: usize, second: usize) -> Result<ContextFeatures> {
        if first > second || second >= tokens.len() {
            return Err(WsdError::Structural(format!(
                "invalid target {first}..={second} for sequence of {} tokens",
                tokens.len()
            )));
        }

        let (target_lemma, target_pos) = if first == second {
            let token = &tokens[first];
            (token.lower_lemma()?, token.pos()?.to_string())
        } else {
            // O POS reportado é o do segundo token.
            let lemma = format!(
                "{} {}",
                tokens[first].lower_lemma()?,
                tokens[second].lower_lemma()?
            );
            (lemma, tokens[second].pos()?.to_string())
        };

        let (left_noun, left_verb) = self.nearest_neighbors(tokens, (0..first).rev())?;
        let (right_noun, right_verb) = self.nearest_neighbors(tokens, second + 1..tokens.len())?;

        Ok(ContextFeatures {
            target_lemma,
            target_pos,
            left: self.left_window(tokens, first)?,
            right: self.right_window(tokens, second)?,
            left_noun,
            left_verb,
            right_noun,
            right_verb,
        })
    }

    fn left_window(&self, tokens: &[Token], index: usize) -> Result<[Option<ContextWord>; WINDOW]> {
        let mut window: [Option<ContextWord>; WINDOW] = Default::default();
        let mut skip = 0usize;
        for distance in 1..=WINDOW {
            let Some(base) = index.checked_sub(distance) else {
                continue;
            };
            window[distance - 1] =
                self.first_unfiltered(tokens, base, &mut skip, |base, skip| base.checked_sub(skip))?;
        }
        Ok(window)
    }

    fn right_window(&self, tokens: &[Token], index: usize) -> Result<[Option<ContextWord>; WINDOW]> {
        let mut window: [Option<ContextWord>; WINDOW] = Default::default();
        let mut skip = 0usize;
        let len = tokens.len();
        for distance in 1..=WINDOW {
            let base = index + distance;
            if base >= len {
                continue;
            }
            window[distance - 1] = self.first_unfiltered(tokens, base, &mut skip, |base, skip| {
                Some(base + skip).filter(|&i| i < len)
            })?;
        }
        Ok(window)
    }

    /// Lê `base` e, enquanto o lema for filtrado, avança o cursor e lê
    /// `step(base, skip)`. Passar da borda devolve NONE.
    fn first_unfiltered(
        &self,
        tokens: &[Token],
        base: usize,
        skip: &mut usize,
        step: impl Fn(usize, usize) -> Option<usize>,
    ) -> Result<Option<ContextWord>> {
        let mut token = &tokens[base];
        let mut lemma = token.lower_lemma()?;
        while self.lexicon.is_skipped(&lemma) {
            *skip += 1;
            let Some(next) = step(base, *skip) else {
                return Ok(None);
            };
            token = &tokens[next];
            lemma = token.lower_lemma()?;
        }
        Ok(Some(ContextWord {
            lemma,
            pos: token.pos()?.to_string(),
        }))
    }

    /// Varre os índices em ordem e devolve (substantivo, verbo) mais próximos.
    ///
    /// Um token é testado primeiro como substantivo e só depois como verbo.
    /// A varredura para assim que os dois slots estão encerrados.
    fn nearest_neighbors(
        &self,
        tokens: &[Token],
        indices: impl Iterator<Item = usize>,
    ) -> Result<(Option<String>, Option<String>)> {
        let mut noun = NeighborSlot::Open;
        let mut verb = NeighborSlot::Open;

        for i in indices {
            let token = &tokens[i];
            if noun.is_open() && token.is_noun()? {
                noun = self.settle(token)?;
            } else if verb.is_open() && token.is_verb()? {
                verb = self.settle(token)?;
            }
            if !noun.is_open() && !verb.is_open() {
                break;
            }
        }

        Ok((noun.into_value(), verb.into_value()))
    }

    fn settle(&self, token: &Token) -> Result<NeighborSlot> {
        let lemma = token.lower_lemma()?;
        if !self.lexicon.is_filter_word(&lemma) {
            return Ok(NeighborSlot::Found(lemma));
        }
        Ok(match self.policy {
            NeighborFilterPolicy::DiscardFiltered => NeighborSlot::Discarded,
            NeighborFilterPolicy::KeepSearching => NeighborSlot::Open,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(words: &[(&str, &str)]) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(i, (lemma, pos))| Token::new(i, *lemma, *lemma, *pos, "O"))
            .collect()
    }

    fn lemma(word: &Option<ContextWord>) -> Option<&str> {
        word.as_ref().map(|w| w.lemma.as_str())
    }

    #[test]
    fn test_stopword_is_skipped_on_the_left() {
        let tokens = sentence(&[("A", "DT"), ("the", "DT"), ("quick", "JJ"), ("fox", "NN")]);
        let lex = Lexicon::new();
        let ctx = ContextWindowBuilder::new(&lex, NeighborFilterPolicy::default())
            .build(&tokens, 3, 3)
            .unwrap();
        assert_eq!(lemma(&ctx.left[0]), Some("quick"));
        assert_eq!(ctx.left[0].as_ref().unwrap().pos, "JJ");
        assert_eq!(ctx.left[1], None);
        assert_eq!(ctx.left[2], None);
    }

    #[test]
    fn test_skip_cursor_is_not_reset() {
        // dist 1: "the" filtrado → salto=1 → "red" (índice 1)
        // dist 2: índice 1 ("red") não é filtrado → "red" de novo
        // dist 3: índice 0 ("cup") → "cup"
        let tokens = sentence(&[
            ("cup", "NN"),
            ("red", "JJ"),
            ("the", "DT"),
            ("fridge", "NN"),
        ]);
        let lex = Lexicon::new();
        let ctx = ContextWindowBuilder::new(&lex, NeighborFilterPolicy::default())
            .build(&tokens, 3, 3)
            .unwrap();
        assert_eq!(lemma(&ctx.left[0]), Some("red"));
        assert_eq!(lemma(&ctx.left[1]), Some("red"));
        assert_eq!(lemma(&ctx.left[2]), Some("cup"));
    }

    #[test]
    fn test_accumulated_skip_applies_to_later_positions() {
        // dist 1: "the" → salto=1 → "a" → salto=2 → "red" (índice 4)
        // dist 2: índice 3 ("a") filtrado → salto=3 → índice 6 ("water")
        // dist 3: índice 4 ("red") não é filtrado
        let tokens = sentence(&[
            ("open", "VB"),
            ("fridge", "NN"),
            ("the", "DT"),
            ("a", "DT"),
            ("red", "JJ"),
            ("big", "JJ"),
            ("water", "NN"),
            ("bottle", "NN"),
        ]);
        let lex = Lexicon::new();
        let builder = ContextWindowBuilder::new(&lex, NeighborFilterPolicy::default());
        let ctx = builder.build(&tokens, 1, 1).unwrap();
        assert_eq!(lemma(&ctx.right[0]), Some("red"));
        assert_eq!(lemma(&ctx.right[1]), Some("water"));
        assert_eq!(lemma(&ctx.right[2]), Some("red"));
    }

    #[test]
    fn test_skip_past_right_boundary_is_none() {
        let tokens = sentence(&[("open", "VB"), ("fridge", "NN"), ("please", "UH"), ("the", "DT")]);
        let lex = Lexicon::new();
        let ctx = ContextWindowBuilder::new(&lex, NeighborFilterPolicy::default())
            .build(&tokens, 1, 1)
            .unwrap();
        assert_eq!(ctx.right, [None, None, None]);
    }

    #[test]
    fn test_target_at_start_has_no_left_context() {
        let tokens = sentence(&[("fridge", "NN"), ("open", "VB"), ("door", "NN")]);
        let lex = Lexicon::new();
        let ctx = ContextWindowBuilder::new(&lex, NeighborFilterPolicy::default())
            .build(&tokens, 0, 0)
            .unwrap();
        assert_eq!(ctx.left, [None, None, None]);
        assert_eq!(ctx.left_noun, None);
        assert_eq!(ctx.left_verb, None);
        assert_eq!(ctx.right_noun.as_deref(), Some("door"));
        assert_eq!(ctx.right_verb.as_deref(), Some("open"));
    }

    #[test]
    fn test_nearest_neighbors_are_unbounded() {
        let tokens = sentence(&[
            ("grab", "VB"),
            ("very", "RB"),
            ("very", "RB"),
            ("very", "RB"),
            ("very", "RB"),
            ("very", "RB"),
            ("popcorn", "NN"),
        ]);
        let lex = Lexicon::new();
        let ctx = ContextWindowBuilder::new(&lex, NeighborFilterPolicy::default())
            .build(&tokens, 6, 6)
            .unwrap();
        assert_eq!(ctx.left_verb.as_deref(), Some("grab"));
        assert_eq!(ctx.left_noun, None);
    }

    #[test]
    fn test_filtered_neighbor_policies() {
        let tokens = sentence(&[
            ("table", "NN"),
            ("thing", "NN"),
            ("take", "VB"),
            ("cup", "NN"),
        ]);
        let lex = Lexicon::with_filter_words(["thing"]);

        let discard = ContextWindowBuilder::new(&lex, NeighborFilterPolicy::DiscardFiltered)
            .build(&tokens, 3, 3)
            .unwrap();
        assert_eq!(discard.left_noun, None);
        assert_eq!(discard.left_verb.as_deref(), Some("take"));

        let keep = ContextWindowBuilder::new(&lex, NeighborFilterPolicy::KeepSearching)
            .build(&tokens, 3, 3)
            .unwrap();
        assert_eq!(keep.left_noun.as_deref(), Some("table"));
    }

    #[test]
    fn test_compound_target_merges_lemmas_and_takes_second_pos() {
        let tokens = sentence(&[
            ("take", "VB"),
            ("the", "DT"),
            ("Orange", "NN"),
            ("juice", "NNS"),
            ("now", "RB"),
        ]);
        let lex = Lexicon::new();
        let ctx = ContextWindowBuilder::new(&lex, NeighborFilterPolicy::default())
            .build(&tokens, 2, 3)
            .unwrap();
        assert_eq!(ctx.target_lemma, "orange juice");
        assert_eq!(ctx.target_pos, "NNS");
        // A janela esquerda parte do primeiro token, a direita do segundo.
        assert_eq!(ctx.right_noun, None);
        assert_eq!(ctx.left_noun, None);
    }

    #[test]
    fn test_invalid_target_range() {
        let tokens = sentence(&[("cup", "NN")]);
        let lex = Lexicon::new();
        let builder = ContextWindowBuilder::new(&lex, NeighborFilterPolicy::default());
        assert!(builder.build(&tokens, 0, 1).is_err());
        assert!(builder.build(&tokens, 1, 0).is_err());
    }
}
