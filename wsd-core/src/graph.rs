//! # Grafo de Tokens e Resolução de Ordem
//!
//! O pipeline hospedeiro entrega as sentenças como um grafo: cada token é um
//! nó e a ordem linear é codificada por arcos `relation` com valor `"NEXT"`.
//! A ordem não é inerente aos nós; ela precisa ser reconstruída caminhando
//! pelos sucessores a partir do primeiro nó do enunciado.
//!
//! ```text
//!  [go] --NEXT--> [to] --NEXT--> [the] --NEXT--> [fridge]
//!   ^ primeiro nó do enunciado
//! ```
//!
//! ## Invariante assumida do tagger upstream
//!
//! Todo token que não é o último possui exatamente um arco de saída `NEXT`.
//! Se um nó tem arcos de saída mas nenhum deles é `NEXT`, a caminhada para
//! ali (com um aviso no log) em vez de girar para sempre.
//!
//! Ciclos são detectados com um conjunto de visitados e resultam em
//! [`WsdError::Structural`]. Como nenhum nó entra duas vezes, o conjunto
//! também limita a caminhada ao número de nós do grafo.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, WsdError};
use crate::token::{Token, TokenId};

/// Valor do arco de sucessão linear.
pub const NEXT_RELATION: &str = "NEXT";

/// Um arco rotulado entre dois tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenArc {
    pub source: TokenId,
    pub target: TokenId,
    /// Valor do atributo `relation` (ex: `"NEXT"`).
    pub relation: String,
}

/// Visão mínima de um grafo entregue pelo pipeline hospedeiro.
///
/// Hosts podem entregar outros tipos de grafo; só grafos de parse carregam
/// a relação de sucessão necessária para ordenar os tokens.
pub trait UtteranceGraph {
    /// Retorna o grafo como [`ParseGraph`], se ele for um.
    fn as_parse_graph(&self) -> Option<&ParseGraph>;

    /// Nome do tipo de grafo (para mensagens de erro).
    fn kind(&self) -> &str;
}

/// Grafo de parse: nós de token, arcos rotulados e o primeiro nó do enunciado.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseGraph {
    nodes: Vec<Token>,
    arcs: Vec<TokenArc>,
    first_utterance: Option<TokenId>,
}

impl ParseGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrói um grafo encadeando os tokens com arcos `NEXT` na ordem dada.
    ///
    /// Os ids são reatribuídos sequencialmente.
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        let mut graph = Self::new();
        let mut prev: Option<TokenId> = None;
        for token in tokens {
            let id = graph.add_token(token);
            match prev {
                Some(p) => graph.link(p, id, NEXT_RELATION),
                None => graph.set_first_utterance(id),
            }
            prev = Some(id);
        }
        graph
    }

    /// Insere um token como novo nó e retorna seu id.
    pub fn add_token(&mut self, mut token: Token) -> TokenId {
        let id = TokenId(self.nodes.len());
        token.id = id;
        self.nodes.push(token);
        id
    }

    /// Cria um arco `source -> target` com o valor de relação dado.
    pub fn link(&mut self, source: TokenId, target: TokenId, relation: &str) {
        self.arcs.push(TokenArc {
            source,
            target,
            relation: relation.to_string(),
        });
    }

    pub fn set_first_utterance(&mut self, id: TokenId) {
        self.first_utterance = Some(id);
    }

    pub fn first_utterance(&self) -> Option<TokenId> {
        self.first_utterance
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.nodes.get(id.0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Arcos que saem do nó, na ordem de inserção.
    pub fn outgoing_arcs(&self, id: TokenId) -> impl Iterator<Item = &TokenArc> {
        self.arcs.iter().filter(move |arc| arc.source == id)
    }
}

impl UtteranceGraph for ParseGraph {
    fn as_parse_graph(&self) -> Option<&ParseGraph> {
        Some(self)
    }

    fn kind(&self) -> &str {
        "parse"
    }
}

/// Reconstrói a ordem linear dos tokens de uma sentença.
///
/// # Algoritmo
/// 1. Sem primeiro nó do enunciado → sequência vazia.
/// 2. Anexa o nó atual ao resultado.
/// 3. Nó sem arcos de saída → fim.
/// 4. Segue o primeiro arco cujo valor de relação é `"NEXT"`.
///
/// # Erros
/// - [`WsdError::Structural`] se o grafo não é um grafo de parse (antes de
///   qualquer iteração), se um nó se repete (ciclo) ou se um arco aponta
///   para um nó inexistente.
pub fn resolve_order(graph: &dyn UtteranceGraph) -> Result<Vec<Token>> {
    let parse_graph = graph.as_parse_graph().ok_or_else(|| {
        WsdError::Structural(format!("graph of kind '{}' is not a parse graph", graph.kind()))
    })?;

    let Some(mut current) = parse_graph.first_utterance() else {
        return Ok(Vec::new());
    };

    let node_count = parse_graph.node_count();
    let mut visited: HashSet<TokenId> = HashSet::with_capacity(node_count);
    let mut ordered = Vec::with_capacity(node_count);

    loop {
        if !visited.insert(current) {
            return Err(WsdError::Structural(format!(
                "cycle detected: token {current} visited twice"
            )));
        }
        let token = parse_graph.token(current).ok_or_else(|| {
            WsdError::Structural(format!("arc points to unknown token {current}"))
        })?;
        ordered.push(token.clone());

        let mut arcs = parse_graph.outgoing_arcs(current).peekable();
        if arcs.peek().is_none() {
            break;
        }
        match arcs.find(|arc| arc.relation == NEXT_RELATION) {
            Some(arc) => current = arc.target,
            None => {
                warn!(token = %current, "token has outgoing arcs but none is NEXT; stopping walk");
                break;
            }
        }
    }

    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(surface: &str, pos: &str) -> Token {
        Token::new(0, surface, surface, pos, "O")
    }

    fn surfaces(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.surface.as_str()).collect()
    }

    #[test]
    fn test_resolve_linear_chain() {
        let graph = ParseGraph::from_tokens(vec![
            tok("go", "VB"),
            tok("to", "TO"),
            tok("the", "DT"),
            tok("fridge", "NN"),
        ]);
        let ordered = resolve_order(&graph).unwrap();
        assert_eq!(surfaces(&ordered), vec!["go", "to", "the", "fridge"]);
    }

    #[test]
    fn test_order_is_derived_from_arcs_not_insertion() {
        let mut graph = ParseGraph::new();
        let fridge = graph.add_token(tok("fridge", "NN"));
        let open = graph.add_token(tok("open", "VB"));
        let the = graph.add_token(tok("the", "DT"));
        graph.set_first_utterance(open);
        graph.link(open, the, NEXT_RELATION);
        graph.link(the, fridge, NEXT_RELATION);

        let ordered = resolve_order(&graph).unwrap();
        assert_eq!(surfaces(&ordered), vec!["open", "the", "fridge"]);
    }

    #[test]
    fn test_non_next_arcs_are_ignored() {
        let mut graph = ParseGraph::new();
        let a = graph.add_token(tok("take", "VB"));
        let b = graph.add_token(tok("cup", "NN"));
        graph.set_first_utterance(a);
        graph.link(a, b, "dependency");
        graph.link(a, b, NEXT_RELATION);

        let ordered = resolve_order(&graph).unwrap();
        assert_eq!(surfaces(&ordered), vec!["take", "cup"]);
    }

    #[test]
    fn test_arcs_without_next_stop_the_walk() {
        let mut graph = ParseGraph::new();
        let a = graph.add_token(tok("take", "VB"));
        let b = graph.add_token(tok("cup", "NN"));
        graph.set_first_utterance(a);
        graph.link(a, b, "coref");

        let ordered = resolve_order(&graph).unwrap();
        assert_eq!(surfaces(&ordered), vec!["take"]);
    }

    #[test]
    fn test_empty_graph_yields_empty_order() {
        let graph = ParseGraph::new();
        assert!(resolve_order(&graph).unwrap().is_empty());
    }

    #[test]
    fn test_cycle_is_structural_error() {
        let mut graph = ParseGraph::new();
        let a = graph.add_token(tok("a", "DT"));
        let b = graph.add_token(tok("b", "NN"));
        graph.set_first_utterance(a);
        graph.link(a, b, NEXT_RELATION);
        graph.link(b, a, NEXT_RELATION);

        match resolve_order(&graph) {
            Err(WsdError::Structural(msg)) => assert!(msg.contains("cycle")),
            other => panic!("esperado Structural, obtido {other:?}"),
        }
    }

    #[test]
    fn test_self_loop_stops_at_node_count() {
        let mut graph = ParseGraph::new();
        let a = graph.add_token(tok("cup", "NN"));
        graph.set_first_utterance(a);
        graph.link(a, a, NEXT_RELATION);

        assert_eq!(graph.node_count(), 1);
        assert!(matches!(resolve_order(&graph), Err(WsdError::Structural(_))));
    }

    #[test]
    fn test_dangling_arc_is_structural_error() {
        let mut graph = ParseGraph::new();
        let a = graph.add_token(tok("a", "DT"));
        graph.set_first_utterance(a);
        graph.link(a, TokenId(42), NEXT_RELATION);

        assert!(matches!(resolve_order(&graph), Err(WsdError::Structural(_))));
    }

    struct DependencyGraph;

    impl UtteranceGraph for DependencyGraph {
        fn as_parse_graph(&self) -> Option<&ParseGraph> {
            None
        }

        fn kind(&self) -> &str {
            "dependency"
        }
    }

    #[test]
    fn test_wrong_graph_kind_is_structural_error() {
        match resolve_order(&DependencyGraph) {
            Err(WsdError::Structural(msg)) => assert!(msg.contains("dependency")),
            other => panic!("esperado Structural, obtido {other:?}"),
        }
    }
}
