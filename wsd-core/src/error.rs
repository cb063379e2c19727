//! # Tipos de Erro
//!
//! Taxonomia de erros do estágio de desambiguação. Cada variante tem uma
//! política de propagação própria:
//!
//! | Variante          | Quando ocorre                                   | Política                         |
//! |-------------------|-------------------------------------------------|----------------------------------|
//! | `Initialization`  | modelo, filtro ou header ausente/incompatível   | fatal, sobe imediatamente        |
//! | `Structural`      | grafo não é uma sequência de tokens válida      | vira resultado vazio na sentença |
//! | `Classification`  | o classificador falhou para um token            | aborta a sentença, sem retry     |
//! | `MissingFeature`  | token sem lemma/POS/NER quando necessário       | erro duro por token              |

use std::path::PathBuf;

/// `Result` do crate, com [`WsdError`] como erro padrão.
pub type Result<T, E = WsdError> = std::result::Result<T, E>;

/// Erro do pipeline de desambiguação.
#[derive(Debug, thiserror::Error)]
pub enum WsdError {
    /// Recurso de inicialização (classificador, filtro, header) inválido.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// Arquivo configurado não existe.
    #[error("resource file does not exist: {0}")]
    MissingResource(PathBuf),

    /// A entrada não é uma fonte ordenada de tokens válida.
    #[error("structural error: {0}")]
    Structural(String),

    /// O classificador não conseguiu produzir um sentido.
    #[error("classification failed for '{lemma}': {reason}")]
    Classification { lemma: String, reason: String },

    /// Um token não possui um atributo exigido.
    #[error("token {token} ({surface}) is missing attribute '{attribute}'")]
    MissingFeature {
        token: usize,
        surface: String,
        attribute: &'static str,
    },

    /// Erro de I/O ao ler recursos.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Erro de desserialização de recursos JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl WsdError {
    /// Indica se o erro deve impedir o processo de continuar.
    ///
    /// Erros de I/O e JSON só surgem durante o carregamento de recursos,
    /// então contam como falhas de inicialização.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WsdError::Initialization(_)
                | WsdError::MissingResource(_)
                | WsdError::Io(_)
                | WsdError::Json(_)
        )
    }
}
