use tokens_model::{Pointer, Scalar, Token, TokenMap, TokenStore};

use crate::error::{ResolveError, Result};

/// Longest reference chain followed before reporting a cycle
pub const DEFAULT_MAX_CHAIN: usize = 32;

/// Read-only pointer resolution over a loaded package tree
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a TokenStore,
    max_chain: usize,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a TokenStore) -> Self {
        Self {
            store,
            max_chain: DEFAULT_MAX_CHAIN,
        }
    }

    #[must_use]
    pub fn with_max_chain(mut self, max_chain: usize) -> Self {
        self.max_chain = max_chain.max(1);
        self
    }

    /// Follow `pointer` (and any chained references) to a literal
    pub fn resolve(&self, pointer: &str) -> Result<Scalar> {
        let mut current = pointer.to_string();
        for _ in 0..self.max_chain {
            match self.target(&current)? {
                Token::Literal(scalar) => return Ok(scalar.clone()),
                Token::Reference(next) => current = next.pointer.clone(),
                Token::Node(_) => {
                    return Err(ResolveError::PathNotFound {
                        pointer: current,
                        reason: "resolves to a container".to_string(),
                    })
                }
            }
        }
        Err(ResolveError::CycleDetected {
            pointer: pointer.to_string(),
            limit: self.max_chain,
        })
    }

    /// Literal value of any leaf token; containers have none
    pub fn resolve_token(&self, token: &Token) -> Result<Option<Scalar>> {
        match token {
            Token::Literal(scalar) => Ok(Some(scalar.clone())),
            Token::Reference(reference) => self.resolve(&reference.pointer).map(Some),
            Token::Node(_) => Ok(None),
        }
    }

    /// The token a single pointer hop lands on
    pub fn target(&self, pointer: &str) -> Result<&'a Token> {
        let parsed = Pointer::parse(pointer)?;
        let root = self
            .store
            .file(&parsed.package, &parsed.file)
            .ok_or_else(|| ResolveError::FileNotFound {
                pointer: pointer.to_string(),
                package: parsed.package.clone(),
                file: parsed.file.clone(),
            })?;

        parsed.path.iter().try_fold(root, |node, segment| {
            node.get(segment).ok_or_else(|| ResolveError::PathNotFound {
                pointer: pointer.to_string(),
                reason: format!("missing segment '{segment}'"),
            })
        })
    }

    /// Copy of `token` with every resolvable reference replaced by its literal
    pub fn resolve_all(&self, token: &Token) -> Token {
        match token {
            Token::Literal(_) => token.clone(),
            Token::Reference(reference) => match self.resolve(&reference.pointer) {
                Ok(scalar) => Token::Literal(scalar),
                Err(err) => {
                    log::warn!("Leaving unresolved reference in place: {err}");
                    token.clone()
                }
            },
            Token::Node(map) => Token::Node(
                map.iter()
                    .map(|(key, child)| (key.clone(), self.resolve_all(child)))
                    .collect::<TokenMap>(),
            ),
        }
    }
}

/// Resolve one pointer against `store` with the default chain bound
pub fn resolve(pointer: &str, store: &TokenStore) -> Result<Scalar> {
    Resolver::new(store).resolve(pointer)
}
