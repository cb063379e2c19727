//! # wsd-core: Desambiguação de Sentido de Palavras (WSD)
//!
//! Este crate implementa o estágio de desambiguação de um pipeline de
//! compreensão de linguagem para comandos falados a um robô doméstico. Cada
//! substantivo comum de uma sentença recebe um rótulo de sentido ("table" →
//! `Table (furniture)` ou `Table (information)`), escolhido por um
//! classificador estatístico a partir do contexto léxico em volta.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em uma única direção:
//!
//! 1.  **Entrada**: grafo de tokens já marcados ([`graph`], [`token`]).
//! 2.  **Ordem** ([`graph::resolve_order`]): reconstrói a sequência seguindo os arcos `NEXT`.
//! 3.  **Filtro** ([`gate`]): ignora verbos, adjetivos e entidades nomeadas.
//! 4.  **Contexto** ([`context`]): janela de 3 palavras de cada lado, pulando stopwords ([`lexicon`]), e substantivo/verbo mais próximos.
//! 5.  **Vetor** ([`features`]): layout fixo de 19 atributos ([`schema`]).
//! 6.  **Classificação** ([`classifier`]): Naive Bayes ([`naive_bayes`]) após o pré-processamento ([`filter`]).
//! 7.  **Saída** ([`results`]): atributos `wsd` e `wsd-top-x` por token.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use std::sync::Arc;
//! use wsd_core::{ClassifierService, Disambiguator, Token, TokenId};
//!
//! // 1. Carrega o modelo de cozinha embutido
//! let classifier = ClassifierService::bundled().unwrap();
//! let wsd = Disambiguator::new(Arc::new(classifier)).with_store_top_x(2);
//!
//! // 2. Sentença já marcada (superfície, lema, POS, NER)
//! let tokens = vec![
//!     Token::new(0, "open", "open", "VB", "O"),
//!     Token::new(1, "the", "the", "DT", "O"),
//!     Token::new(2, "fridge", "fridge", "NN", "O"),
//! ];
//!
//! // 3. Desambigua
//! let results = wsd.disambiguate_tokens(&tokens).unwrap();
//! assert_eq!(results.sense(TokenId(2)), Some("Refrigerator"));
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador que conecta todos os estágios.
//! - [`config`]: leitura da configuração e montagem do estágio.
//! - [`evaluation`]: acurácia sobre um corpus anotado.
//! - [`corpus`]: comandos de cozinha marcados, usados em testes e na demo.

pub mod classifier;
pub mod config;
pub mod context;
pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod filter;
pub mod gate;
pub mod graph;
pub mod lexicon;
pub mod naive_bayes;
pub mod pipeline;
pub mod results;
pub mod schema;
pub mod token;

pub use classifier::{Classification, ClassifierService, RankedSense, SenseClassifier};
pub use config::WsdConfig;
pub use context::NeighborFilterPolicy;
pub use error::{Result, WsdError};
pub use graph::{ParseGraph, UtteranceGraph};
pub use pipeline::{Disambiguator, PipelineEvent};
pub use results::{AnnotatedToken, DisambiguationResults};
pub use token::{Token, TokenId};
