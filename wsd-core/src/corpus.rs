//! # Corpus de Comandos de Cozinha
//!
//! Comandos falados para um robô doméstico, já marcados pelos estágios
//! anteriores (lema, POS Penn Treebank, NER). Cada sentença traz também o
//! sentido esperado dos substantivos anotados, no formato usado pela
//! avaliação de acurácia:
//!
//! | Campo      | Exemplo            |
//! |------------|--------------------|
//! | posição    | `4`                |
//! | palavra    | `"fridge"`         |
//! | sentido    | `"Refrigerator"`   |
//! | sinônimo   | `"Fridge"`         |
//!
//! Os rótulos seguem títulos de artigos da Wikipédia.

use crate::token::Token;

/// Um comando marcado com os sentidos esperados.
pub struct TaggedSentence {
    /// O texto original da transcrição.
    pub text: &'static str,
    /// Identificador curto usado nos relatórios.
    pub id: &'static str,
    /// Quádruplas (superfície, lema, POS, NER).
    pub tokens: &'static [(&'static str, &'static str, &'static str, &'static str)],
    /// Quádruplas (posição, palavra, sentido, sinônimo do sentido).
    pub senses: &'static [(usize, &'static str, &'static str, &'static str)],
}

impl TaggedSentence {
    /// Converte as quádruplas em tokens com ids sequenciais.
    pub fn to_tokens(&self) -> Vec<Token> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, (surface, lemma, pos, ner))| Token::new(i, *surface, *lemma, *pos, *ner))
            .collect()
    }
}

/// Retorna o corpus completo.
pub fn get_corpus() -> Vec<TaggedSentence> {
    vec![
        TaggedSentence {
            text: "armar go to the fridge and take the orange juice",
            id: "kitchen-1",
            tokens: &[
                ("armar", "armar", "NN", "O"), ("go", "go", "VB", "O"), ("to", "to", "TO", "O"),
                ("the", "the", "DT", "O"), ("fridge", "fridge", "NN", "O"), ("and", "and", "CC", "O"),
                ("take", "take", "VB", "O"), ("the", "the", "DT", "O"), ("orange", "orange", "NN", "O"),
                ("juice", "juice", "NN", "O"),
            ],
            senses: &[
                (4, "fridge", "Refrigerator", "Fridge"),
                (8, "orange", "Orange (fruit)", "Orange"),
                (9, "juice", "Juice", "Orange juice"),
            ],
        },
        TaggedSentence {
            text: "Armar would you please go to the fridge and open it take out the orange juice and bring it to me",
            id: "kitchen-2",
            tokens: &[
                ("Armar", "Armar", "NNP", "O"), ("would", "would", "MD", "O"), ("you", "you", "PRP", "O"),
                ("please", "please", "VB", "O"), ("go", "go", "VB", "O"), ("to", "to", "TO", "O"),
                ("the", "the", "DT", "O"), ("fridge", "fridge", "NN", "O"), ("and", "and", "CC", "O"),
                ("open", "open", "VB", "O"), ("it", "it", "PRP", "O"), ("take", "take", "VB", "O"),
                ("out", "out", "RP", "O"), ("the", "the", "DT", "O"), ("orange", "orange", "NN", "O"),
                ("juice", "juice", "NN", "O"), ("and", "and", "CC", "O"), ("bring", "bring", "VB", "O"),
                ("it", "it", "PRP", "O"), ("to", "to", "TO", "O"), ("me", "me", "PRP", "O"),
            ],
            senses: &[
                (7, "fridge", "Refrigerator", "Fridge"),
                (14, "orange", "Orange (fruit)", "Orange"),
                (15, "juice", "Juice", "Orange juice"),
            ],
        },
        TaggedSentence {
            text: "go to the table take the green cup standing on the table and go to the fridge",
            id: "kitchen-3",
            tokens: &[
                ("go", "go", "VB", "O"), ("to", "to", "TO", "O"), ("the", "the", "DT", "O"),
                ("table", "table", "NN", "O"), ("take", "take", "VB", "O"), ("the", "the", "DT", "O"),
                ("green", "green", "JJ", "O"), ("cup", "cup", "NN", "O"), ("standing", "stand", "VBG", "O"),
                ("on", "on", "IN", "O"), ("the", "the", "DT", "O"), ("table", "table", "NN", "O"),
                ("and", "and", "CC", "O"), ("go", "go", "VB", "O"), ("to", "to", "TO", "O"),
                ("the", "the", "DT", "O"), ("fridge", "fridge", "NN", "O"),
            ],
            senses: &[
                (3, "table", "Table (furniture)", "Table"),
                (7, "cup", "Cup", "Mug"),
                (11, "table", "Table (furniture)", "Table"),
                (16, "fridge", "Refrigerator", "Fridge"),
            ],
        },
        TaggedSentence {
            text: "open the fridge door then take the water bottle out",
            id: "kitchen-4",
            tokens: &[
                ("open", "open", "VB", "O"), ("the", "the", "DT", "O"), ("fridge", "fridge", "NN", "O"),
                ("door", "door", "NN", "O"), ("then", "then", "RB", "O"), ("take", "take", "VB", "O"),
                ("the", "the", "DT", "O"), ("water", "water", "NN", "O"), ("bottle", "bottle", "NN", "O"),
                ("out", "out", "RP", "O"),
            ],
            senses: &[
                (2, "fridge", "Refrigerator", "Fridge"),
                (3, "door", "Door", "Door"),
                (7, "water", "Water", "Water"),
                (8, "bottle", "Bottle", "Bottle"),
            ],
        },
        TaggedSentence {
            text: "hello alexa please put the plate in the microwave and warm the popcorn",
            id: "kitchen-5",
            tokens: &[
                ("hello", "hello", "UH", "O"), ("alexa", "alexa", "NN", "O"), ("please", "please", "VB", "O"),
                ("put", "put", "VB", "O"), ("the", "the", "DT", "O"), ("plate", "plate", "NN", "O"),
                ("in", "in", "IN", "O"), ("the", "the", "DT", "O"), ("microwave", "microwave", "NN", "O"),
                ("and", "and", "CC", "O"), ("warm", "warm", "VB", "O"), ("the", "the", "DT", "O"),
                ("popcorn", "popcorn", "NN", "O"),
            ],
            senses: &[
                (5, "plate", "Plate (dishware)", "Plate"),
                (8, "microwave", "Microwave oven", "Microwave"),
                (12, "popcorn", "Popcorn", "Popcorn"),
            ],
        },
        TaggedSentence {
            text: "please read the table and then put the cup in the dishwasher",
            id: "kitchen-6",
            tokens: &[
                ("please", "please", "VB", "O"), ("read", "read", "VB", "O"), ("the", "the", "DT", "O"),
                ("table", "table", "NN", "O"), ("and", "and", "CC", "O"), ("then", "then", "RB", "O"),
                ("put", "put", "VB", "O"), ("the", "the", "DT", "O"), ("cup", "cup", "NN", "O"),
                ("in", "in", "IN", "O"), ("the", "the", "DT", "O"), ("dishwasher", "dishwasher", "NN", "O"),
            ],
            senses: &[
                (3, "table", "Table (information)", "Table (database)"),
                (8, "cup", "Cup", "Mug"),
                (11, "dishwasher", "Dishwasher", "Dishwasher"),
            ],
        },
        TaggedSentence {
            text: "hello armar bring me a vodka with fresh orange from the cupboard",
            id: "kitchen-7",
            tokens: &[
                ("hello", "hello", "UH", "O"), ("armar", "armar", "NN", "O"), ("bring", "bring", "VB", "O"),
                ("me", "me", "PRP", "O"), ("a", "a", "DT", "O"), ("vodka", "vodka", "NN", "O"),
                ("with", "with", "IN", "O"), ("fresh", "fresh", "JJ", "O"), ("orange", "orange", "NN", "O"),
                ("from", "from", "IN", "O"), ("the", "the", "DT", "O"), ("cupboard", "cupboard", "NN", "O"),
            ],
            senses: &[
                (5, "vodka", "Vodka", "Vodka"),
                (8, "orange", "Orange (fruit)", "Orange"),
                (11, "cupboard", "Cupboard", "Cupboard"),
            ],
        },
    ]
}

/// Textos de demonstração para a interface web: (id, texto).
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    get_corpus().iter().map(|s| (s.id, s.text)).collect()
}
