//! # Pipeline WSD: Orquestrador com Eventos Observáveis
//!
//! O [`Disambiguator`] percorre uma sentença e atribui um sentido a cada
//! substantivo comum. Para cada token:
//!
//! 1. POS fora de `NN*` → pula.
//! 2. Entidade nomeada (NER ≠ `O` ou nome de ativação) → pula.
//! 3. Constrói o contexto ([`ContextWindowBuilder`]).
//! 4. Monta o vetor ([`assemble`]).
//! 5. Classifica e grava `wsd`; com top-X ligado, grava também `wsd-top-x`.
//!
//! Uma falha do classificador aborta a sentença inteira, sem retry. Os
//! laços de documento ([`Disambiguator::disambiguate_document`]) capturam o
//! erro na fronteira da sentença e seguem para a próxima.
//!
//! Como no pipeline NER, cada passo pode ser observado através de eventos
//! enviados por um canal `mpsc` ([`Disambiguator::disambiguate_streaming`]).

use std::collections::HashSet;
use std::sync::{mpsc, Arc};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::classifier::{Classification, RankedSense, SenseClassifier};
use crate::context::{ContextWindowBuilder, NeighborFilterPolicy};
use crate::error::{Result, WsdError};
use crate::features::{assemble, FeatureVector};
use crate::gate::NamedEntityGate;
use crate::graph::{resolve_order, UtteranceGraph};
use crate::lexicon::Lexicon;
use crate::results::{AnnotatedToken, DisambiguationResults, ResultWriter};
use crate::token::Token;

/// Motivo pelo qual um token não foi classificado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotANoun,
    NamedEntity,
}

/// Eventos emitidos pelo pipeline durante o processamento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: ordem linear dos tokens reconstruída.
    OrderResolved { tokens: Vec<Token>, total: usize },
    /// Token ignorado (não é substantivo ou é entidade nomeada).
    TokenSkipped {
        token_index: usize,
        token_text: String,
        reason: SkipReason,
    },
    /// **Passo 2**: contexto e vetor de features do alvo.
    ContextBuilt {
        token_index: usize,
        token_text: String,
        target_lemma: String,
        /// Pares (atributo, valor) dos slots preenchidos.
        features: Vec<(String, String)>,
    },
    /// **Passo 3**: sentido atribuído.
    SenseAssigned {
        token_index: usize,
        token_text: String,
        sense: String,
        probability: f64,
    },
    /// Lista top-X gravada para o token.
    TopXStored {
        token_index: usize,
        ranked: Vec<RankedSense>,
    },
    /// Par de substantivos adjacentes classificado como um alvo.
    CompoundAssigned {
        first_index: usize,
        second_index: usize,
        lemma: String,
        sense: String,
        probability: f64,
    },
    /// **Conclusão**: resultados da sentença.
    Done {
        annotated_tokens: Vec<AnnotatedToken>,
        results: DisambiguationResults,
        total_tokens: usize,
        processing_ms: u64,
    },
    /// **Falha**: a sentença foi abortada.
    Error { message: String },
}

/// Resultado de uma sentença dentro de um documento.
pub type SentenceOutcome = Result<DisambiguationResults>;

/// O estágio de desambiguação.
///
/// Só guarda dados somente leitura (classificador, léxico, configuração),
/// então uma instância pode atender várias sentenças em paralelo.
pub struct Disambiguator {
    classifier: Arc<dyn SenseClassifier>,
    lexicon: Lexicon,
    gate: NamedEntityGate,
    store_top_x: i32,
    policy: NeighborFilterPolicy,
    compound_nouns: bool,
}

impl Disambiguator {
    /// Cria o estágio com o léxico e o filtro de entidades padrão, top-X
    /// desligado e modo composto desligado.
    pub fn new(classifier: Arc<dyn SenseClassifier>) -> Self {
        Self {
            classifier,
            lexicon: Lexicon::new(),
            gate: NamedEntityGate::new(),
            store_top_x: -1,
            policy: NeighborFilterPolicy::default(),
            compound_nouns: false,
        }
    }

    pub fn with_lexicon(mut self, lexicon: Lexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    pub fn with_gate(mut self, gate: NamedEntityGate) -> Self {
        self.gate = gate;
        self
    }

    /// Quantos sentidos gravar em `wsd-top-x`; `<= 0` desliga.
    pub fn with_store_top_x(mut self, k: i32) -> Self {
        self.store_top_x = k;
        self
    }

    pub fn with_policy(mut self, policy: NeighborFilterPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_compound_nouns(mut self, enabled: bool) -> Self {
        self.compound_nouns = enabled;
        self
    }

    /// Desambigua uma sentença representada como grafo.
    ///
    /// Um grafo que não forma uma sequência válida (tipo errado, ciclo,
    /// arco quebrado) é registrado e produz resultados vazios.
    pub fn disambiguate_graph(&self, graph: &dyn UtteranceGraph) -> Result<DisambiguationResults> {
        match resolve_order(graph) {
            Ok(tokens) => self.disambiguate_tokens(&tokens),
            Err(WsdError::Structural(reason)) => {
                warn!(%reason, "graph is not a valid token sequence; no senses assigned");
                Ok(DisambiguationResults::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Desambigua uma sentença já ordenada.
    pub fn disambiguate_tokens(&self, tokens: &[Token]) -> Result<DisambiguationResults> {
        self.run(tokens, &mut |_: PipelineEvent| {})
    }

    /// Classifica o alvo composto `first..=second` sem gravar nada.
    pub fn disambiguate_compound(&self, tokens: &[Token], first: usize, second: usize) -> Result<Classification> {
        let target = self.classify_target(tokens, first, second, &mut |_: PipelineEvent| {})?;
        Ok(target.sense)
    }

    /// Executa o pipeline enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `OrderResolved`
    /// 2. Por token: `TokenSkipped` ou `ContextBuilt` → `SenseAssigned`
    ///    (→ `TopXStored`) (→ `CompoundAssigned`)
    /// 3. `Done`, ou `Error` se a sentença foi abortada
    pub fn disambiguate_streaming(&self, graph: &dyn UtteranceGraph, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        let done = |tokens: &[Token], results: DisambiguationResults| PipelineEvent::Done {
            annotated_tokens: results.annotate(tokens),
            results,
            total_tokens: tokens.len(),
            processing_ms: start.elapsed().as_millis() as u64,
        };

        let tokens = match resolve_order(graph) {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "graph is not a valid token sequence; no senses assigned");
                let _ = tx.send(PipelineEvent::Error { message: e.to_string() });
                let _ = tx.send(done(&[], DisambiguationResults::new()));
                return;
            }
        };

        let _ = tx.send(PipelineEvent::OrderResolved {
            tokens: tokens.clone(),
            total: tokens.len(),
        });

        let mut emit = |event: PipelineEvent| {
            let _ = tx.send(event);
        };
        match self.run(&tokens, &mut emit) {
            Ok(results) => {
                let _ = tx.send(done(&tokens, results));
            }
            Err(e) => {
                warn!(error = %e, "sentence aborted");
                let _ = tx.send(PipelineEvent::Error { message: e.to_string() });
            }
        }
    }

    /// Processa várias sentenças em paralelo, compartilhando o classificador.
    ///
    /// O erro de uma sentença fica no seu próprio resultado e não interrompe
    /// as demais.
    pub fn disambiguate_document(&self, sentences: &[Vec<Token>]) -> Vec<SentenceOutcome> {
        sentences
            .par_iter()
            .enumerate()
            .map(|(index, tokens)| {
                let outcome = self.disambiguate_tokens(tokens);
                if let Err(e) = &outcome {
                    warn!(sentence = index, error = %e, "sentence skipped");
                }
                outcome
            })
            .collect()
    }

    fn run(&self, tokens: &[Token], emit: &mut dyn FnMut(PipelineEvent)) -> Result<DisambiguationResults> {
        // Os resultados são indexados por id: ids repetidos misturariam anotações.
        let mut seen = HashSet::with_capacity(tokens.len());
        if let Some(dup) = tokens.iter().find(|t| !seen.insert(t.id)) {
            return Err(WsdError::Structural(format!(
                "token id {} appears more than once in the sentence",
                dup.id
            )));
        }

        let mut results = DisambiguationResults::new();

        for (index, token) in tokens.iter().enumerate() {
            if let Some(reason) = self.skip_reason(token)? {
                emit(PipelineEvent::TokenSkipped {
                    token_index: index,
                    token_text: token.surface.clone(),
                    reason,
                });
                continue;
            }

            let target = self.classify_target(tokens, index, index, emit)?;
            let sense = &target.sense;
            debug!(token = %token.id, surface = %token.surface, sense = %sense.label, "sense assigned");
            results.write_sense(token.id, sense);
            emit(PipelineEvent::SenseAssigned {
                token_index: index,
                token_text: token.surface.clone(),
                sense: sense.label.clone(),
                probability: sense.probability,
            });

            if let Ok(k) = usize::try_from(self.store_top_x) {
                if k > 0 {
                    let ranked = self.classifier.classify_top_k(&target.vector, &target.lemma, k)?;
                    results.write_top_x(token.id, ranked.clone());
                    emit(PipelineEvent::TopXStored {
                        token_index: index,
                        ranked,
                    });
                }
            }

            if self.compound_nouns && index > 0 && self.skip_reason(&tokens[index - 1])?.is_none() {
                let first = index - 1;
                let compound = self.classify_target(tokens, first, index, &mut |_: PipelineEvent| {})?;
                debug!(lemma = %compound.lemma, sense = %compound.sense.label, "compound sense assigned");
                results.write_compound(tokens[first].id, token.id, &compound.lemma, &compound.sense);
                emit(PipelineEvent::CompoundAssigned {
                    first_index: first,
                    second_index: index,
                    lemma: compound.lemma,
                    sense: compound.sense.label,
                    probability: compound.sense.probability,
                });
            }
        }

        Ok(results)
    }

    fn skip_reason(&self, token: &Token) -> Result<Option<SkipReason>> {
        if !token.is_noun()? {
            return Ok(Some(SkipReason::NotANoun));
        }
        if self.gate.is_named_entity(token)? {
            return Ok(Some(SkipReason::NamedEntity));
        }
        Ok(None)
    }

    /// Contexto → vetor → classificação.
    fn classify_target(
        &self,
        tokens: &[Token],
        first: usize,
        second: usize,
        emit: &mut dyn FnMut(PipelineEvent),
    ) -> Result<Target> {
        let builder = ContextWindowBuilder::new(&self.lexicon, self.policy);
        let context = builder.build(tokens, first, second)?;
        let schema = self.classifier.schema();
        let vector = assemble(schema, &context);

        emit(PipelineEvent::ContextBuilt {
            token_index: first,
            token_text: tokens[first].surface.clone(),
            target_lemma: context.target_lemma.clone(),
            features: vector
                .named_values(schema)
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        });

        let sense = self.classifier.classify(&vector, &context.target_lemma)?;
        Ok(Target {
            lemma: context.target_lemma,
            vector,
            sense,
        })
    }
}

/// Um alvo já classificado.
struct Target {
    lemma: String,
    vector: FeatureVector,
    sense: Classification,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierService;
    use crate::corpus::get_corpus;
    use crate::graph::{ParseGraph, NEXT_RELATION};
    use crate::schema::AttributeSchema;
    use crate::token::TokenId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Classificador de teste: o sentido é `<lema>#1` e conta as chamadas.
    struct EchoClassifier {
        schema: AttributeSchema,
        calls: AtomicUsize,
    }

    impl EchoClassifier {
        fn new() -> Self {
            Self {
                schema: AttributeSchema::standard(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SenseClassifier for EchoClassifier {
        fn classify(&self, _vector: &FeatureVector, lemma: &str) -> Result<Classification> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Classification {
                label: format!("{lemma}#1"),
                probability: 0.75,
            })
        }

        fn classify_top_k(&self, _vector: &FeatureVector, lemma: &str, k: usize) -> Result<Vec<RankedSense>> {
            let ranked = vec![
                Classification {
                    label: format!("{lemma}#1"),
                    probability: 0.75,
                },
                Classification {
                    label: format!("{lemma}#2"),
                    probability: 0.25,
                },
            ];
            Ok(ranked.into_iter().take(k).collect())
        }

        fn schema(&self) -> &AttributeSchema {
            &self.schema
        }
    }

    /// Falha sempre que o lema é `"cup"`.
    struct FailOnCup(AttributeSchema);

    impl SenseClassifier for FailOnCup {
        fn classify(&self, _vector: &FeatureVector, lemma: &str) -> Result<Classification> {
            if lemma == "cup" {
                return Err(WsdError::Classification {
                    lemma: lemma.to_string(),
                    reason: "model unavailable".to_string(),
                });
            }
            Ok(Classification {
                label: lemma.to_string(),
                probability: 1.0,
            })
        }

        fn classify_top_k(&self, vector: &FeatureVector, lemma: &str, _k: usize) -> Result<Vec<RankedSense>> {
            Ok(vec![self.classify(vector, lemma)?])
        }

        fn schema(&self) -> &AttributeSchema {
            &self.0
        }
    }

    fn sentence(words: &[(&str, &str)]) -> Vec<Token> {
        words
            .iter()
            .enumerate()
            .map(|(i, (word, pos))| Token::new(i, *word, *word, *pos, "O"))
            .collect()
    }

    fn bundled() -> Disambiguator {
        Disambiguator::new(Arc::new(ClassifierService::bundled().unwrap()))
    }

    #[test]
    fn test_only_common_nouns_are_annotated() {
        let mut tokens = sentence(&[
            ("Armar", "NNP"),
            ("open", "VB"),
            ("the", "DT"),
            ("fridge", "NN"),
            ("in", "IN"),
            ("Paris", "NNP"),
        ]);
        tokens[5].ner = Some("LOCATION".into());

        let classifier = Arc::new(EchoClassifier::new());
        let wsd = Disambiguator::new(classifier.clone());
        let results = wsd.disambiguate_tokens(&tokens).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results.sense(TokenId(3)), Some("fridge#1"));
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_top_x_only_when_enabled() {
        let tokens = sentence(&[("take", "VB"), ("the", "DT"), ("cup", "NN")]);

        let off = Disambiguator::new(Arc::new(EchoClassifier::new()));
        let results = off.disambiguate_tokens(&tokens).unwrap();
        assert!(results.top_x(TokenId(2)).is_none());

        let on = Disambiguator::new(Arc::new(EchoClassifier::new())).with_store_top_x(1);
        let results = on.disambiguate_tokens(&tokens).unwrap();
        let top = results.top_x(TokenId(2)).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].label, "cup#1");
    }

    #[test]
    fn test_missing_pos_is_a_hard_error() {
        let mut tokens = sentence(&[("take", "VB"), ("cup", "NN")]);
        tokens[0].pos = None;
        let wsd = Disambiguator::new(Arc::new(EchoClassifier::new()));
        assert!(matches!(
            wsd.disambiguate_tokens(&tokens),
            Err(WsdError::MissingFeature { attribute: "pos", .. })
        ));
    }

    #[test]
    fn test_repeated_token_ids_are_rejected() {
        let mut tokens = sentence(&[("take", "VB"), ("cup", "NN"), ("and", "CC"), ("fridge", "NN")]);
        for token in &mut tokens {
            token.id = TokenId(0);
        }
        let wsd = bundled();
        assert!(matches!(
            wsd.disambiguate_tokens(&tokens),
            Err(WsdError::Structural(msg)) if msg.contains("more than once")
        ));

        let outcomes = wsd.disambiguate_document(&[tokens]);
        assert!(outcomes[0].is_err());
    }

    #[test]
    fn test_classification_error_aborts_sentence() {
        let tokens = sentence(&[("fridge", "NN"), ("and", "CC"), ("cup", "NN")]);
        let wsd = Disambiguator::new(Arc::new(FailOnCup(AttributeSchema::standard())));
        assert!(matches!(
            wsd.disambiguate_tokens(&tokens),
            Err(WsdError::Classification { .. })
        ));
    }

    #[test]
    fn test_document_isolates_failing_sentence() {
        let wsd = Disambiguator::new(Arc::new(FailOnCup(AttributeSchema::standard())));
        let sentences = vec![
            sentence(&[("open", "VB"), ("fridge", "NN")]),
            sentence(&[("take", "VB"), ("cup", "NN")]),
            sentence(&[("close", "VB"), ("door", "NN")]),
        ];
        let outcomes = wsd.disambiguate_document(&sentences);
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].as_ref().unwrap().sense(TokenId(1)), Some("fridge"));
        assert!(outcomes[1].is_err());
        assert_eq!(outcomes[2].as_ref().unwrap().sense(TokenId(1)), Some("door"));
    }

    #[test]
    fn test_idempotent() {
        let wsd = bundled().with_store_top_x(3);
        let tokens = get_corpus()[2].to_tokens();
        let first = wsd.disambiguate_tokens(&tokens).unwrap();
        let second = wsd.disambiguate_tokens(&tokens).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_fridge_and_orange_juice_end_to_end() {
        let tokens = get_corpus()[0].to_tokens();
        let graph = ParseGraph::from_tokens(tokens.clone());

        let results = bundled().disambiguate_graph(&graph).unwrap();
        assert_eq!(results.sense(TokenId(0)), None); // armar
        assert_eq!(results.sense(TokenId(4)), Some("Refrigerator"));
        assert_eq!(results.sense(TokenId(8)), Some("Orange (fruit)"));
        assert_eq!(results.sense(TokenId(9)), Some("Juice"));

        let compound = bundled().disambiguate_compound(&tokens, 8, 9).unwrap();
        assert_eq!(compound.label, "Orange juice");
    }

    #[test]
    fn test_compound_mode() {
        let tokens = get_corpus()[0].to_tokens();
        let results = bundled()
            .with_compound_nouns(true)
            .disambiguate_tokens(&tokens)
            .unwrap();
        let compound = results.compound(TokenId(8), TokenId(9)).unwrap();
        assert_eq!(compound.lemma, "orange juice");
        assert_eq!(compound.annotation.wsd, "Orange juice");
        // "armar" não forma composto com nada
        assert_eq!(results.compounds.len(), 1);
    }

    #[test]
    fn test_structural_error_yields_empty_results() {
        let mut graph = ParseGraph::new();
        let a = graph.add_token(Token::new(0, "cup", "cup", "NN", "O"));
        let b = graph.add_token(Token::new(1, "fridge", "fridge", "NN", "O"));
        graph.link(a, b, NEXT_RELATION);
        graph.link(b, a, NEXT_RELATION);
        graph.set_first_utterance(a);

        let wsd = Disambiguator::new(Arc::new(EchoClassifier::new()));
        let results = wsd.disambiguate_graph(&graph).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_streaming_events() {
        let tokens = sentence(&[("open", "VB"), ("the", "DT"), ("fridge", "NN")]);
        let graph = ParseGraph::from_tokens(tokens);
        let wsd = Disambiguator::new(Arc::new(EchoClassifier::new())).with_store_top_x(2);

        let (tx, rx) = mpsc::channel();
        wsd.disambiguate_streaming(&graph, tx);
        let events: Vec<PipelineEvent> = rx.try_iter().collect();

        assert!(matches!(events.first(), Some(PipelineEvent::OrderResolved { total: 3, .. })));
        let skipped = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::TokenSkipped { .. }))
            .count();
        assert_eq!(skipped, 2);
        assert!(events.iter().any(|e| matches!(
            e,
            PipelineEvent::SenseAssigned { token_index: 2, .. }
        )));
        assert!(events.iter().any(|e| matches!(
            e,
            PipelineEvent::TopXStored { ranked, .. } if ranked.len() == 2
        )));
        match events.last() {
            Some(PipelineEvent::Done { results, total_tokens, .. }) => {
                assert_eq!(*total_tokens, 3);
                assert_eq!(results.sense(TokenId(2)), Some("fridge#1"));
            }
            other => panic!("esperado Done, obtido {other:?}"),
        }
    }

    #[test]
    fn test_streaming_reports_aborted_sentence() {
        let tokens = sentence(&[("take", "VB"), ("cup", "NN")]);
        let graph = ParseGraph::from_tokens(tokens);
        let wsd = Disambiguator::new(Arc::new(FailOnCup(AttributeSchema::standard())));

        let (tx, rx) = mpsc::channel();
        wsd.disambiguate_streaming(&graph, tx);
        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        assert!(matches!(events.last(), Some(PipelineEvent::Error { .. })));
        assert!(!events.iter().any(|e| matches!(e, PipelineEvent::Done { .. })));
    }
}
